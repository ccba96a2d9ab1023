//! Per-invocation wiring of store, HTTP settings and session manager.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context as _, Result};
use sfcc::auth::DEFAULT_AUTHORITY_HOST;
use sfcc::{FileSecretStore, HostUrl, HttpConfig, SessionManager, TokenAcquirer};
use tracing::debug;

use crate::progress::Spinner;

/// Global options shared by all commands.
#[derive(Debug, Clone)]
pub struct Context {
    store: Option<PathBuf>,
    authority: Option<HostUrl>,
    timeout: Duration,
}

impl Context {
    pub fn new(store: Option<PathBuf>, authority: Option<HostUrl>, timeout_secs: u64) -> Self {
        Self {
            store,
            authority,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Account manager given on the command line or in the environment.
    pub fn explicit_authority(&self) -> Option<&HostUrl> {
        self.authority.as_ref()
    }

    pub fn http(&self) -> HttpConfig {
        HttpConfig::default().with_timeout(self.timeout)
    }

    pub fn store(&self) -> Result<FileSecretStore> {
        let store = match &self.store {
            Some(path) => FileSecretStore::new(path),
            None => FileSecretStore::default_location().context("Failed to locate session file")?,
        };
        debug!(path = %store.path().display(), "Using session store");
        Ok(store)
    }

    pub fn sessions(&self, http: &HttpConfig) -> Result<SessionManager<FileSecretStore>> {
        let authority = match &self.authority {
            Some(authority) => authority.clone(),
            None => HostUrl::new(DEFAULT_AUTHORITY_HOST)?,
        };
        let acquirer = TokenAcquirer::new(http).context("Failed to set up HTTP client")?;

        Ok(SessionManager::new(self.store()?, acquirer, authority).with_progress(Spinner::default()))
    }
}
