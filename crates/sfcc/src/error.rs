//! Error types for the sfcc library.
//!
//! This module provides a unified error type with explicit variants for
//! transport, authentication, protocol, storage and input validation errors.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// The unified error type for sfcc operations.
///
/// Every failure mode of the credential lifecycle maps onto one variant so
/// callers can tell a rejected credential from an expired token from a
/// network outage without string matching.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Authentication errors (missing or rejected credentials, expired token).
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Non-success responses from a downstream API.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Session store errors.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Input validation errors (malformed host, resource path).
    #[error(transparent)]
    InvalidInput(#[from] InvalidInputError),
}

impl Error {
    /// Returns true when the error is an authentication failure of any kind.
    pub fn is_auth(&self) -> bool {
        matches!(self, Error::Auth(_))
    }

    /// Returns true when the error came from the network layer.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}

/// Transport-level errors.
///
/// These never trigger token renewal.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// The HTTP client could not be constructed.
    #[error("HTTP client setup failed: {message}")]
    Setup { message: String },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

impl TransportError {
    /// Convert a reqwest error, recording the configured timeout when the
    /// request ran out of time.
    pub fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            TransportError::Timeout {
                duration_ms: timeout.as_millis() as u64,
            }
        } else if err.is_connect() {
            TransportError::Connection {
                message: err.to_string(),
            }
        } else {
            TransportError::Http {
                message: err.to_string(),
            }
        }
    }
}

/// Authentication-related errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Client id or secret were not supplied and no fallback was available.
    #[error("missing client {field}; pass it explicitly or provide it in dw.json")]
    MissingCredentials { field: &'static str },

    /// The authorization server did not issue a token.
    #[error("authorization server rejected the client (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    /// A downstream API reported the bearer token as invalid or expired.
    #[error("authorization token missing or invalid: {message}")]
    TokenExpired { message: String },

    /// Renewal was requested but the session was not authenticated with
    /// auto-renewal enabled.
    #[error(
        "token renewal not possible; authenticate the client with auto-renewal enabled first"
    )]
    RenewalNotPermitted,

    /// No token has been stored yet.
    #[error("not authenticated; authenticate the client first")]
    NotAuthenticated,
}

/// Protocol-level errors from downstream API responses.
#[derive(Debug)]
pub struct ProtocolError {
    /// HTTP status code.
    pub status: u16,
    /// Fault type reported in the body (if present).
    pub fault: Option<String>,
    /// Fault message reported in the body (if present).
    pub message: Option<String>,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref fault) = self.fault {
            write!(f, " [{}]", fault)?;
        }
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProtocolError {}

impl ProtocolError {
    /// Create a new protocol error.
    pub fn new(status: u16, fault: Option<String>, message: Option<String>) -> Self {
        Self {
            status,
            fault,
            message,
        }
    }

    /// Check if the server refused the request for lack of authorization.
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }
}

/// Session store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the store file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The store file exists but is not valid JSON.
    #[error("corrupt session file {}: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// No per-user configuration directory could be determined.
    #[error("could not determine the user configuration directory")]
    NoConfigDir,
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid host or URL.
    #[error("invalid host '{value}': {reason}")]
    Host { value: String, reason: String },

    /// Invalid project configuration file.
    #[error("invalid project configuration {}: {reason}", path.display())]
    ProjectConfig { path: PathBuf, reason: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}
