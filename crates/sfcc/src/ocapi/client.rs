//! OCAPI data API client.

use std::time::Duration;

use reqwest::Method;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::Result;
use crate::auth::{AccessToken, SessionManager};
use crate::error::AuthError;
use crate::http::HttpConfig;
use crate::retry::RetryCoordinator;
use crate::store::SecretStore;
use crate::types::HostUrl;

use super::outcome::{ApiOutcome, ApiResponse};

/// OCAPI version used when none is configured.
pub const DEFAULT_OCAPI_VERSION: &str = "v17_7";

/// Issues authorized requests against an instance's OCAPI data API.
///
/// Every request carries the session's current bearer token. Failures are
/// handed to the [`RetryCoordinator`] before they are surfaced.
#[derive(Debug)]
pub struct OcapiClient<'a, S> {
    sessions: &'a SessionManager<S>,
    client: reqwest::Client,
    timeout: Duration,
    instance: HostUrl,
    version: String,
}

impl<'a, S: SecretStore> OcapiClient<'a, S> {
    pub fn new(sessions: &'a SessionManager<S>, instance: HostUrl, config: &HttpConfig) -> Result<Self> {
        Ok(Self {
            sessions,
            client: config.build_client()?,
            timeout: config.timeout,
            instance,
            version: DEFAULT_OCAPI_VERSION.to_string(),
        })
    }

    /// Use a specific OCAPI version, e.g. `v19_5`.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Full URL of a data API resource.
    pub fn resource_url(&self, resource: &str) -> String {
        self.instance.join(&format!(
            "s/-/dw/data/{}/{}",
            self.version,
            resource.trim_start_matches('/')
        ))
    }

    /// Send a request, renewing the token and retrying once on a token fault.
    #[instrument(skip(self, body), fields(instance = %self.instance))]
    pub async fn send(
        &self,
        method: Method,
        resource: &str,
        body: Option<&Value>,
    ) -> Result<ApiResponse> {
        let outcome = self.issue(&method, resource, body).await?;

        RetryCoordinator::new(self.sessions)
            .ensure_valid_token(outcome, || self.issue(&method, resource, body))
            .await?
            .into_result()
    }

    async fn issue(
        &self,
        method: &Method,
        resource: &str,
        body: Option<&Value>,
    ) -> Result<ApiOutcome<ApiResponse>> {
        let token: AccessToken = self.sessions.token()?.ok_or(AuthError::NotAuthenticated)?;
        let url = self.resource_url(resource);
        debug!(%method, %url, "OCAPI request");

        let mut request = self
            .client
            .request(method.clone(), &url)
            .header(AUTHORIZATION, token.bearer())
            .header(ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        Ok(ApiOutcome::from_response(request.send().await, self.timeout).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TokenAcquirer;
    use crate::store::MemorySecretStore;

    #[test]
    fn resource_url_construction() {
        let store = MemorySecretStore::new();
        let acquirer = TokenAcquirer::new(&HttpConfig::default()).unwrap();
        let sessions = SessionManager::new(
            &store,
            acquirer,
            HostUrl::new("account.demandware.com").unwrap(),
        );
        let instance = HostUrl::new("my-sandbox.demandware.net").unwrap();
        let client = OcapiClient::new(&sessions, instance, &HttpConfig::default()).unwrap();

        assert_eq!(
            client.resource_url("/jobs/my-job/executions"),
            "https://my-sandbox.demandware.net/s/-/dw/data/v17_7/jobs/my-job/executions"
        );

        let client = client.with_version("v19_5");
        assert_eq!(
            client.resource_url("code_versions"),
            "https://my-sandbox.demandware.net/s/-/dw/data/v19_5/code_versions"
        );
    }

    #[tokio::test]
    async fn send_without_token_is_not_authenticated() {
        let store = MemorySecretStore::new();
        let acquirer = TokenAcquirer::new(&HttpConfig::default()).unwrap();
        let sessions = SessionManager::new(
            &store,
            acquirer,
            HostUrl::new("http://127.0.0.1:9").unwrap(),
        );
        let instance = HostUrl::new("http://127.0.0.1:9").unwrap();
        let client = OcapiClient::new(&sessions, instance, &HttpConfig::default()).unwrap();

        let err = client.send(Method::GET, "jobs", None).await.unwrap_err();
        assert!(matches!(err, crate::Error::Auth(AuthError::NotAuthenticated)));
    }
}
