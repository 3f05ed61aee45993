use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, Method};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

/// Everything the transport needs to issue one request.
#[derive(Debug, Clone)]
pub struct RequestInput {
    pub url: String,
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl RequestInput {
    /// A `POST` with a JSON body; `Content-Type` is always `application/json`.
    pub fn post_json(url: impl Into<String>, body: Value, headers: HeaderMap) -> Self {
        let mut headers = headers;
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Self {
            url: url.into(),
            method: Method::POST,
            headers,
            body: Some(body),
        }
    }

    /// The chat request: `{"prompt": ...}` with a bearer token.
    pub fn prompt(url: &str, token: &str, prompt: &str) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let bearer = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| TransportError::InvalidRequest(format!("invalid token: {e}")))?;
        headers.insert(AUTHORIZATION, bearer);

        Ok(Self::post_json(url, json!({ "prompt": prompt }), headers))
    }
}

#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("{reason} (HTTP {status})\n{body}")]
    HttpError {
        status: u16,
        reason: String,
        body: String,
    },

    #[error("Failed to read response body: {0}")]
    Body(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout(e.to_string())
        } else if e.is_body() || e.is_decode() {
            TransportError::Body(e.to_string())
        } else {
            TransportError::Network(e.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("prompt is empty")]
    EmptyPrompt,

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Whether a prompt is answered as a stream or as one buffered body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestMode {
    #[default]
    Stream,
    Send,
}
