//! Client credential types.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// API client credentials for the client-credentials grant.
///
/// # Security
///
/// The secret is never exposed in Debug output to prevent accidental logging.
///
/// # Example
///
/// ```
/// use sfcc::Credentials;
///
/// let creds = Credentials::new("my_client_id", "my_client_secret");
/// assert_eq!(creds.client_id(), "my_client_id");
/// ```
#[derive(Clone)]
pub struct Credentials {
    client_id: String,
    client_secret: String,
}

impl Credentials {
    /// Create new credentials.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Returns the client id.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Encode `client_id:client_secret` for HTTP basic authentication.
    pub fn to_basic(&self) -> BasicCredential {
        let raw = format!("{}:{}", self.client_id, self.client_secret);
        BasicCredential(STANDARD.encode(raw))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

/// A base64 encoded `client_id:client_secret` pair.
///
/// This is the only form in which a client secret is ever persisted, and
/// only while auto-renewal is enabled.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredential(String);

impl BasicCredential {
    /// Wrap an already encoded value, e.g. one read back from the store.
    pub fn from_encoded(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Returns the encoded value for the `Authorization: Basic` header.
    ///
    /// # Security
    ///
    /// Decodes trivially to the client secret. Never log this value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BasicCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BasicCredential").field(&"[REDACTED]").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_hides_secret_in_debug() {
        let creds = Credentials::new("cid", "secret123");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("cid"));
        assert!(!debug.contains("secret123"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn basic_encoding_matches_http_basic() {
        let basic = Credentials::new("cid", "csecret").to_basic();
        assert_eq!(basic.as_str(), "Y2lkOmNzZWNyZXQ=");
    }

    #[test]
    fn basic_hides_value_in_debug() {
        let basic = BasicCredential::from_encoded("Y2lkOmNzZWNyZXQ=");
        assert!(!format!("{:?}", basic).contains("Y2lk"));
    }
}
