//! Request types for the externally-dispatched RPC surface.

use serde_json::Value;
use thiserror::Error;

/// A request handed over by the external RPC dispatcher.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: String,
    pub params: Vec<Value>,
}

impl Request {
    #[must_use]
    pub fn new(method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }
}

/// Handler-side request failures, reported back through the dispatcher's
/// own error channel. Malformed parameters are the only error the client
/// can provoke; every well-formed request succeeds or is a no-op.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("unknown method: {0}")]
    UnknownMethod(String),
    #[error("invalid parameters for {method}: {reason}")]
    InvalidParams {
        method: &'static str,
        reason: String,
    },
}

/// Extract the single string parameter of a request.
pub(crate) fn single_string_param(
    method: &'static str,
    params: &[Value],
) -> Result<String, RequestError> {
    match params {
        [Value::String(value)] => Ok(value.clone()),
        [other] => Err(RequestError::InvalidParams {
            method,
            reason: format!("expected a string, got {other}"),
        }),
        _ => Err(RequestError::InvalidParams {
            method,
            reason: format!("expected exactly one parameter, got {}", params.len()),
        }),
    }
}
