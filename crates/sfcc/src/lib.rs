//! sfcc - Credential lifecycle core for the Commerce Cloud CI client
//!
//! This library obtains OAuth2 client-credential tokens, keeps the session
//! persisted between invocations, and renews an expired token and retries
//! the failed request once when auto-renewal was requested.
//!
//! # Example
//!
//! ```no_run
//! use sfcc::{FileSecretStore, HostUrl, HttpConfig, Method, OcapiClient, SessionManager, TokenAcquirer};
//!
//! # async fn example() -> Result<(), sfcc::Error> {
//! let http = HttpConfig::default();
//! let sessions = SessionManager::new(
//!     FileSecretStore::default_location()?,
//!     TokenAcquirer::new(&http)?,
//!     HostUrl::new("account.demandware.com")?,
//! );
//! sessions.authenticate(Some("my_client_id"), Some("my_client_secret"), true, None).await?;
//!
//! let instance = HostUrl::new("my-sandbox.demandware.net")?;
//! let ocapi = OcapiClient::new(&sessions, instance, &http)?;
//! let jobs = ocapi.send(Method::GET, "jobs/my-job/executions", None).await?;
//! println!("{}", jobs.body);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod ocapi;
pub mod retry;
pub mod store;
pub mod types;

// Re-export primary types at crate root for convenience
pub use auth::{
    AccessToken, BasicCredential, ClearPolicy, Credentials, ProgressReporter, Session,
    SessionManager, TokenAcquirer,
};
pub use config::{AuthSettings, ProjectConfig};
pub use error::Error;
pub use http::HttpConfig;
pub use ocapi::{ApiOutcome, ApiResponse, OcapiClient};
pub use retry::RetryCoordinator;
pub use store::{FileSecretStore, MemorySecretStore, SecretStore};
pub use types::HostUrl;

pub use reqwest::Method;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
