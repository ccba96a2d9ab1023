//! Project configuration (`dw.json`).
//!
//! A `dw.json` in the working directory can supply default client
//! credentials, an alternative authorization host and permission to talk to
//! hosts with self-signed certificates. Only the authenticate entry point
//! consults it; renewal never does.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::Result;
use crate::auth::DEFAULT_AUTHORITY_HOST;
use crate::error::InvalidInputError;
use crate::types::HostUrl;

/// File name of the project configuration.
pub const PROJECT_FILE_NAME: &str = "dw.json";

/// Contents of `dw.json` relevant to authentication.
///
/// Unknown keys (instance host name, code version, WebDAV user) are ignored.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectConfig {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub account_manager: Option<String>,
    #[serde(default)]
    pub self_signed: bool,
}

impl ProjectConfig {
    /// Load `dw.json` from `dir`. A missing file yields `None`.
    pub fn load(dir: &Path) -> Result<Option<Self>> {
        let path = dir.join(PROJECT_FILE_NAME);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(InvalidInputError::ProjectConfig {
                    path,
                    reason: err.to_string(),
                }
                .into());
            }
        };

        let config = serde_json::from_str(&raw).map_err(|e| InvalidInputError::ProjectConfig {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        Ok(Some(config))
    }

    fn credentials(&self) -> Option<(&str, &str)> {
        match (self.client_id.as_deref(), self.client_secret.as_deref()) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => Some((id, secret)),
            _ => None,
        }
    }
}

impl fmt::Debug for ProjectConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "[REDACTED]"))
            .field("account_manager", &self.account_manager)
            .field("self_signed", &self.self_signed)
            .finish()
    }
}

/// Effective inputs for one authentication.
#[derive(Clone, Default)]
pub struct AuthSettings {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub authority: Option<HostUrl>,
    pub accept_invalid_certs: bool,
    /// Credentials were taken from the project file.
    pub from_project: bool,
}

impl AuthSettings {
    /// Merge command line values with the project configuration.
    ///
    /// The project file is used only when neither client id nor secret was
    /// given explicitly and the file provides both. In that case its
    /// authorization host applies unless one was given explicitly, and its
    /// `self-signed` flag is honoured.
    pub fn resolve(
        client_id: Option<String>,
        client_secret: Option<String>,
        authority: Option<HostUrl>,
        project: Option<&ProjectConfig>,
    ) -> Result<Self> {
        let mut settings = Self {
            client_id,
            client_secret,
            authority,
            accept_invalid_certs: false,
            from_project: false,
        };

        if settings.client_id.is_some() || settings.client_secret.is_some() {
            return Ok(settings);
        }

        let Some(project) = project else {
            return Ok(settings);
        };
        let Some((id, secret)) = project.credentials() else {
            return Ok(settings);
        };

        info!("Using client credentials from {}", PROJECT_FILE_NAME);
        settings.client_id = Some(id.to_string());
        settings.client_secret = Some(secret.to_string());
        settings.from_project = true;

        if settings.authority.is_none()
            && let Some(host) = project.account_manager.as_deref()
        {
            let host = HostUrl::new(host)?;
            if !host.is_host(DEFAULT_AUTHORITY_HOST) {
                warn!(%host, "Using alternative account manager as authorization server");
            }
            settings.authority = Some(host);
        }

        if project.self_signed {
            settings.accept_invalid_certs = true;
        }

        Ok(settings)
    }
}

impl fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSettings")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "[REDACTED]"))
            .field("authority", &self.authority)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("from_project", &self.from_project)
            .finish()
    }
}
