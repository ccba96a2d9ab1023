//! Classification of API responses.
//!
//! Every response is parsed into an [`ApiOutcome`] before anything branches
//! on it. Only a structured `InvalidAccessTokenException` fault counts as a
//! token fault; bare 401s, other statuses and network failures do not.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::Result;
use crate::error::{AuthError, Error, ProtocolError, TransportError};

/// Fault type reported when the bearer token is invalid or expired.
pub const INVALID_ACCESS_TOKEN: &str = "InvalidAccessTokenException";

/// A structured fault from an OCAPI error body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Fault {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl Fault {
    /// True for the fault that signals an invalid or expired token.
    pub fn is_token_fault(&self) -> bool {
        self.kind == INVALID_ACCESS_TOKEN
    }
}

#[derive(Debug, Deserialize)]
struct FaultEnvelope {
    fault: Fault,
}

/// A successful API response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    /// Parsed JSON body; `Null` when empty, a string when not JSON.
    pub body: Value,
}

/// The classified result of one API request.
#[derive(Debug)]
pub enum ApiOutcome<T> {
    /// 2xx response.
    Ok(T),
    /// The token was rejected with a structured fault.
    TokenFault(Fault),
    /// Any other non-2xx response.
    HttpError { status: u16, fault: Option<Fault> },
    /// The request never produced a response.
    Transport(TransportError),
}

impl ApiOutcome<ApiResponse> {
    /// Classify a status and raw body.
    pub fn classify(status: u16, body: &[u8]) -> Self {
        if (200..300).contains(&status) {
            return ApiOutcome::Ok(ApiResponse {
                status,
                body: parse_body(body),
            });
        }

        let fault = serde_json::from_slice::<FaultEnvelope>(body)
            .ok()
            .map(|envelope| envelope.fault);

        match fault {
            Some(fault) if fault.is_token_fault() => ApiOutcome::TokenFault(fault),
            fault => ApiOutcome::HttpError { status, fault },
        }
    }

    /// Classify the result of sending a request.
    pub async fn from_response(
        result: std::result::Result<reqwest::Response, reqwest::Error>,
        timeout: Duration,
    ) -> Self {
        let response = match result {
            Ok(response) => response,
            Err(err) => return ApiOutcome::Transport(TransportError::from_reqwest(err, timeout)),
        };

        let status = response.status().as_u16();
        match response.bytes().await {
            Ok(body) => Self::classify(status, &body),
            Err(err) => ApiOutcome::Transport(TransportError::from_reqwest(err, timeout)),
        }
    }
}

impl<T> ApiOutcome<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, ApiOutcome::Ok(_))
    }

    pub fn is_token_fault(&self) -> bool {
        matches!(self, ApiOutcome::TokenFault(_))
    }

    /// Transform the success value.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> ApiOutcome<U> {
        match self {
            ApiOutcome::Ok(value) => ApiOutcome::Ok(f(value)),
            ApiOutcome::TokenFault(fault) => ApiOutcome::TokenFault(fault),
            ApiOutcome::HttpError { status, fault } => ApiOutcome::HttpError { status, fault },
            ApiOutcome::Transport(err) => ApiOutcome::Transport(err),
        }
    }

    /// Convert into a `Result`, mapping each failure onto the error taxonomy.
    pub fn into_result(self) -> Result<T> {
        match self {
            ApiOutcome::Ok(value) => Ok(value),
            ApiOutcome::TokenFault(fault) => Err(AuthError::TokenExpired {
                message: fault.message.unwrap_or(fault.kind),
            }
            .into()),
            ApiOutcome::HttpError { status, fault } => {
                let (kind, message) = match fault {
                    Some(fault) => (Some(fault.kind), fault.message),
                    None => (None, None),
                };
                Err(Error::Protocol(ProtocolError::new(status, kind, message)))
            }
            ApiOutcome::Transport(err) => Err(err.into()),
        }
    }
}

fn parse_body(body: &[u8]) -> Value {
    if body.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn token_fault_body() -> Vec<u8> {
        serde_json::to_vec(&json!({
            "_v": "17.7",
            "fault": {
                "arguments": {},
                "type": "InvalidAccessTokenException",
                "message": "The request is unauthorized, the access token is invalid."
            }
        }))
        .unwrap()
    }

    #[test]
    fn success_parses_json_body() {
        let outcome = ApiOutcome::classify(200, br#"{"id":"job-1"}"#);
        match outcome {
            ApiOutcome::Ok(response) => {
                assert_eq!(response.status, 200);
                assert_eq!(response.body["id"], "job-1");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn empty_success_body_is_null() {
        let outcome = ApiOutcome::classify(204, b"");
        assert!(matches!(outcome, ApiOutcome::Ok(ApiResponse { body: Value::Null, .. })));
    }

    #[test]
    fn invalid_access_token_fault_is_token_fault() {
        let outcome = ApiOutcome::classify(401, &token_fault_body());
        assert!(outcome.is_token_fault());
    }

    #[test]
    fn bare_401_is_not_a_token_fault() {
        let outcome = ApiOutcome::classify(401, b"Unauthorized");
        assert!(matches!(
            outcome,
            ApiOutcome::HttpError {
                status: 401,
                fault: None
            }
        ));
    }

    #[test]
    fn other_fault_is_http_error() {
        let body = br#"{"fault":{"type":"JobNotFoundException","message":"unknown job"}}"#;
        match ApiOutcome::classify(404, body) {
            ApiOutcome::HttpError {
                status,
                fault: Some(fault),
            } => {
                assert_eq!(status, 404);
                assert_eq!(fault.kind, "JobNotFoundException");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn token_fault_maps_to_token_expired() {
        let err = ApiOutcome::classify(401, &token_fault_body())
            .into_result()
            .unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::TokenExpired { .. })));
    }

    #[test]
    fn http_error_maps_to_protocol_error() {
        let err = ApiOutcome::classify(500, b"").into_result().unwrap_err();
        assert_eq!(err.to_string(), "protocol error: HTTP 500");
    }
}
