//! Client-credentials token exchange.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use tracing::{debug, instrument, trace};

use crate::Result;
use crate::error::{AuthError, TransportError};
use crate::http::HttpConfig;
use crate::types::HostUrl;

use super::credentials::BasicCredential;
use super::tokens::AccessToken;

/// Host of the platform's account manager.
pub const DEFAULT_AUTHORITY_HOST: &str = "account.demandware.com";

/// Path of the OAuth2 token endpoint on the account manager.
pub const TOKEN_PATH: &str = "/dw/oauth2/access_token";

const GRANT_BODY: &str = "grant_type=client_credentials";

/// Success body of the token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
}

/// Error body of the token endpoint.
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Exchanges basic-encoded client credentials for a bearer token.
///
/// One call is one request. There is no retry here; renewal and retry are
/// the [`RetryCoordinator`](crate::RetryCoordinator)'s job.
#[derive(Debug, Clone)]
pub struct TokenAcquirer {
    client: reqwest::Client,
    timeout: Duration,
}

impl TokenAcquirer {
    /// Create an acquirer with its own HTTP client.
    pub fn new(config: &HttpConfig) -> Result<Self> {
        Ok(Self {
            client: config.build_client()?,
            timeout: config.timeout,
        })
    }

    /// Perform the exchange against `authority`.
    ///
    /// # Errors
    ///
    /// [`AuthError::Rejected`] for any status other than 200, or a 200
    /// without a token. [`TransportError`] when the request never completed.
    #[instrument(skip(self, basic), fields(authority = %authority))]
    pub async fn exchange_credentials(
        &self,
        basic: &BasicCredential,
        authority: &HostUrl,
    ) -> Result<AccessToken> {
        let url = authority.join(TOKEN_PATH);
        debug!(%url, "Requesting client-credentials token");

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Basic {}", basic.as_str()))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(GRANT_BODY)
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(e, self.timeout))?;

        let status = response.status();
        trace!(status = %status, "Token endpoint response");

        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::from_reqwest(e, self.timeout))?;

        if status != StatusCode::OK {
            return Err(rejection(status, &body).into());
        }

        let token = serde_json::from_slice::<TokenResponse>(&body)
            .ok()
            .and_then(|r| r.access_token)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AuthError::Rejected {
                status: status.as_u16(),
                message: "response did not contain an access token".to_string(),
            })?;

        debug!("Token obtained");
        Ok(AccessToken::new(token))
    }
}

fn rejection(status: StatusCode, body: &[u8]) -> AuthError {
    let message = serde_json::from_slice::<TokenErrorResponse>(body)
        .ok()
        .and_then(|e| e.error_description.or(e.error))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string()
        });

    AuthError::Rejected {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_prefers_error_description() {
        let body = br#"{"error":"invalid_client","error_description":"Client authentication failed"}"#;
        match rejection(StatusCode::UNAUTHORIZED, body) {
            AuthError::Rejected { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Client authentication failed");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejection_falls_back_to_status_text() {
        match rejection(StatusCode::SERVICE_UNAVAILABLE, b"<html>down</html>") {
            AuthError::Rejected { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "Service Unavailable");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
