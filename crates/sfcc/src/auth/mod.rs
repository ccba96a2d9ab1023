//! Authentication types and session management.
//!
//! This module provides the credential lifecycle: exchanging client
//! credentials for a bearer token and keeping the persisted session current.

mod acquirer;
mod credentials;
mod session;
mod tokens;

pub use acquirer::{DEFAULT_AUTHORITY_HOST, TOKEN_PATH, TokenAcquirer};
pub use credentials::{BasicCredential, Credentials};
pub use session::{ClearPolicy, NoProgress, ProgressReporter, Session, SessionManager};
pub use tokens::AccessToken;
