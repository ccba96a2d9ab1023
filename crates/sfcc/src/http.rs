//! Shared HTTP client configuration.

use std::time::Duration;

use tracing::warn;

use crate::Result;
use crate::error::TransportError;

/// Default bound on every network call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for the HTTP client used by the token acquirer and API clients.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Upper bound on a single request, connect through body.
    pub timeout: Duration,
    /// Accept self-signed or otherwise invalid TLS certificates.
    pub accept_invalid_certs: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            accept_invalid_certs: false,
        }
    }
}

impl HttpConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Build a client from these settings.
    pub fn build_client(&self) -> Result<reqwest::Client> {
        if self.accept_invalid_certs {
            warn!(
                "Allowing self-signed certificates. This may expose credentials to an untrusted party"
            );
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("sfcc-ci/", env!("CARGO_PKG_VERSION")))
            .timeout(self.timeout)
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .build()
            .map_err(|e| TransportError::Setup {
                message: e.to_string(),
            })?;

        Ok(client)
    }
}
