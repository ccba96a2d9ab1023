//! Open Commerce API access.
//!
//! [`OcapiClient`] is the reference downstream collaborator: it attaches the
//! bearer token, classifies each response into an [`ApiOutcome`] and lets the
//! [`RetryCoordinator`](crate::RetryCoordinator) resolve token faults.

mod client;
mod outcome;

pub use client::{DEFAULT_OCAPI_VERSION, OcapiClient};
pub use outcome::{ApiOutcome, ApiResponse, Fault, INVALID_ACCESS_TOKEN};
