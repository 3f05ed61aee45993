use http::{HeaderMap, StatusCode};
use serde_json::Value;
use thiserror::Error;

use crate::client::types::TransportError;

/// A buffered response delivered in one piece by the transport.
#[derive(Debug, Clone)]
pub struct CompleteResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl CompleteResponse {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn is_successful(&self) -> bool {
        self.status.is_success()
    }

    /// Human-readable reason for a failed status, when the status has one.
    pub fn failure_reason(&self) -> Option<&'static str> {
        if self.is_successful() {
            None
        } else {
            self.status.canonical_reason()
        }
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Parse the body as JSON. `None` when it is not JSON or is JSON `null`.
    pub fn parse_json_body(&self) -> Option<Value> {
        match serde_json::from_slice::<Value>(&self.body) {
            Ok(Value::Null) | Err(_) => None,
            Ok(value) => Some(value),
        }
    }
}

/// Final status of a stream that completed without a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamOutcome {
    pub status: StatusCode,
}

/// Callbacks driven by a streaming transport.
///
/// `on_start` fires once before any chunk; exactly one of `on_finish` or
/// `on_failure` ends the request.
pub trait StreamHandler {
    fn on_start(&mut self);
    fn on_chunk(&mut self, chunk: &str);
    fn on_finish(&mut self, outcome: &StreamOutcome);
    fn on_failure(&mut self, error: &TransportError);
}

#[derive(Debug, Clone, Error)]
pub enum ResponseError {
    #[error("invalid UTF-8 in response body: {0}")]
    InvalidUtf8(String),

    #[error("failed to render response: {0}")]
    Render(String),
}

impl From<std::str::Utf8Error> for ResponseError {
    fn from(e: std::str::Utf8Error) -> Self {
        ResponseError::InvalidUtf8(e.to_string())
    }
}

impl From<serde_json::Error> for ResponseError {
    fn from(e: serde_json::Error) -> Self {
        ResponseError::Render(e.to_string())
    }
}
