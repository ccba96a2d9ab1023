//! Renew-and-retry on token faults.

use std::future::Future;

use tracing::{debug, info, instrument};

use crate::Result;
use crate::auth::SessionManager;
use crate::ocapi::ApiOutcome;
use crate::store::SecretStore;

/// Decides what to do with a failed API outcome.
///
/// A token fault with auto-renewal enabled renews the token and re-issues the
/// request once through the caller's retry closure. Everything else passes
/// through untouched.
#[derive(Debug)]
pub struct RetryCoordinator<'a, S> {
    sessions: &'a SessionManager<S>,
}

impl<'a, S: SecretStore> RetryCoordinator<'a, S> {
    pub fn new(sessions: &'a SessionManager<S>) -> Self {
        Self { sessions }
    }

    /// Resolve `outcome`, renewing and retrying at most once.
    ///
    /// - Token fault, auto-renewal disabled: the original outcome is returned
    ///   and `retry` is never called.
    /// - Token fault, auto-renewal enabled: the token is renewed and `retry`
    ///   is called exactly once. Its outcome is returned as is, even if it is
    ///   another token fault.
    /// - Anything else: the original outcome is returned.
    ///
    /// # Errors
    ///
    /// Renewal failures, store errors and errors produced by `retry`.
    #[instrument(skip_all)]
    pub async fn ensure_valid_token<T, F, Fut>(
        &self,
        outcome: ApiOutcome<T>,
        retry: F,
    ) -> Result<ApiOutcome<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ApiOutcome<T>>>,
    {
        match &outcome {
            ApiOutcome::TokenFault(fault) => {
                if !self.sessions.auto_renew_enabled()? {
                    info!(
                        fault = %fault.kind,
                        "Authorization token missing or invalid. Please (re-)authenticate first"
                    );
                    return Ok(outcome);
                }

                info!("Authorization token invalid. Token auto-renewal enabled, renewing");
                self.sessions.renew().await?;

                debug!("Retrying request with renewed token");
                retry().await
            }
            ApiOutcome::HttpError {
                status: 401,
                fault: None,
            } => {
                info!(
                    "Request unauthorized without a token fault; no auto-renewal is performed. \
                     Re-authenticate and check the client's permissions on the instance"
                );
                Ok(outcome)
            }
            _ => Ok(outcome),
        }
    }
}
