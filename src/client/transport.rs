use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use tracing::{debug, warn};

use super::types::{RequestInput, TransportError};
use crate::stream::types::{CompleteResponse, StreamHandler, StreamOutcome};

/// Issues chat requests, buffered or streamed.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, input: &RequestInput) -> Result<CompleteResponse, TransportError>;

    /// Drive `handler` through one streamed request. Failures are reported
    /// through `on_failure`, never returned.
    async fn stream(&self, input: &RequestInput, handler: &mut (dyn StreamHandler + Send));
}

/// `reqwest` backed transport.
pub struct ApiClient {
    http_client: reqwest::Client,
}

impl ApiClient {
    pub fn new() -> Self {
        Self {
            http_client: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        Ok(Self { http_client })
    }

    fn request(&self, input: &RequestInput) -> reqwest::RequestBuilder {
        let builder = self
            .http_client
            .request(input.method.clone(), &input.url)
            .headers(input.headers.clone());
        match &input.body {
            Some(body) => builder.json(body),
            None => builder,
        }
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for ApiClient {
    async fn send(&self, input: &RequestInput) -> Result<CompleteResponse, TransportError> {
        debug!(url = %input.url, method = %input.method, "Sending request");
        let response = self.request(input).send().await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();
        debug!(%status, len = body.len(), "Received response");

        Ok(CompleteResponse {
            status,
            headers,
            body,
        })
    }

    async fn stream(&self, input: &RequestInput, handler: &mut (dyn StreamHandler + Send)) {
        debug!(url = %input.url, method = %input.method, "Opening stream");
        handler.on_start();

        let response = match self.request(input).send().await {
            Ok(response) => response,
            Err(e) => {
                handler.on_failure(&e.into());
                return;
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "Stream request rejected");
            handler.on_failure(&TransportError::HttpError {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown error").to_string(),
                body,
            });
            return;
        }

        let mut decoder = Utf8Carry::default();
        let mut chunks = response.bytes_stream();
        while let Some(chunk) = chunks.next().await {
            match chunk {
                Ok(bytes) => {
                    let text = decoder.decode(&bytes);
                    if !text.is_empty() {
                        handler.on_chunk(&text);
                    }
                }
                Err(e) => {
                    handler.on_failure(&e.into());
                    return;
                }
            }
        }

        let rest = decoder.finish();
        if !rest.is_empty() {
            handler.on_chunk(&rest);
        }
        handler.on_finish(&StreamOutcome { status });
    }
}

/// Holds back a multi-byte UTF-8 sequence cut by a network chunk boundary.
#[derive(Debug, Default)]
struct Utf8Carry {
    pending: Vec<u8>,
}

impl Utf8Carry {
    fn decode(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        match std::str::from_utf8(&self.pending) {
            Ok(text) => {
                let text = text.to_owned();
                self.pending.clear();
                text
            }
            // incomplete sequence at the end: emit the valid prefix, keep the rest
            Err(e) if e.error_len().is_none() => {
                let valid = e.valid_up_to();
                let text = String::from_utf8_lossy(&self.pending[..valid]).into_owned();
                self.pending.drain(..valid);
                text
            }
            Err(_) => self.finish(),
        }
    }

    fn finish(&mut self) -> String {
        let text = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        text
    }
}
