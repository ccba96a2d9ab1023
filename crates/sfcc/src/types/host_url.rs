//! Host URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::{Error, InvalidInputError};

/// A validated base URL for the authorization server or an instance.
///
/// Accepts either a bare host name (`account.demandware.com`), which is
/// given the `https` scheme, or an absolute URL. Plain HTTP is accepted only
/// for loopback hosts.
///
/// # Example
///
/// ```
/// use sfcc::HostUrl;
///
/// let host = HostUrl::new("account.demandware.com").unwrap();
/// assert_eq!(host.join("/dw/oauth2/access_token"),
///            "https://account.demandware.com/dw/oauth2/access_token");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HostUrl(Url);

impl HostUrl {
    /// Create a new host URL from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is empty, unparseable, or uses plain
    /// HTTP against a non-loopback host.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref().trim();
        if s.is_empty() {
            return Err(InvalidInputError::Host {
                value: s.to_string(),
                reason: "must not be empty".to_string(),
            }
            .into());
        }

        let candidate = if s.contains("://") {
            s.to_string()
        } else {
            format!("https://{}", s)
        };

        let url = Url::parse(&candidate).map_err(|e| InvalidInputError::Host {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;

        Ok(Self(url))
    }

    /// Returns the full URL for a path below this host.
    pub fn join(&self, path: &str) -> String {
        let base = self.0.as_str().trim_end_matches('/');
        format!("{}/{}", base, path.trim_start_matches('/'))
    }

    /// Returns the base URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    /// Returns true if this URL points at the given bare host over HTTPS.
    pub fn is_host(&self, host: &str) -> bool {
        self.0.scheme() == "https" && self.host() == Some(host)
    }

    fn validate(url: &Url, original: &str) -> Result<(), Error> {
        if url.cannot_be_a_base() {
            return Err(InvalidInputError::Host {
                value: original.to_string(),
                reason: "must be an absolute URL".to_string(),
            }
            .into());
        }

        let scheme = url.scheme();
        let is_loopback = url
            .host_str()
            .is_some_and(|h| h == "localhost" || h == "127.0.0.1" || h == "[::1]");

        if scheme != "https" && !(scheme == "http" && is_loopback) {
            return Err(InvalidInputError::Host {
                value: original.to_string(),
                reason: "must use HTTPS (HTTP allowed only for localhost)".to_string(),
            }
            .into());
        }

        if url.host_str().is_none_or(str::is_empty) {
            return Err(InvalidInputError::Host {
                value: original.to_string(),
                reason: "must have a host".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

impl fmt::Display for HostUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for HostUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for HostUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for HostUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        HostUrl::new(&s).map_err(serde::de::Error::custom)
    }
}
