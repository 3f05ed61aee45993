use tracing::{info, warn};

use super::sink::DisplaySink;
use super::transport::Transport;
use super::types::{RequestInput, RequestMode, SessionError};
use crate::config::models::ClientConfig;
use crate::stream::{StreamAssembler, render_response};

/// One conversation against one endpoint.
///
/// Taking `&mut self` per prompt keeps a single request in flight.
pub struct ChatSession<T: Transport, S: DisplaySink> {
    transport: T,
    sink: S,
    config: ClientConfig,
}

impl<T: Transport, S: DisplaySink + Send> ChatSession<T, S> {
    pub fn new(transport: T, sink: S, config: ClientConfig) -> Self {
        Self {
            transport,
            sink,
            config,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn clear(&mut self) {
        self.sink.clear();
    }

    /// Send a prompt and route the answer into a fresh response slot.
    ///
    /// Transport and backend failures end up in the slot as visible text;
    /// only a blank prompt or an unbuildable request is returned as an error.
    pub async fn send_prompt(&mut self, prompt: &str) -> Result<(), SessionError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(SessionError::EmptyPrompt);
        }

        let input = RequestInput::prompt(&self.config.url, &self.config.token, prompt)?;
        self.sink.append_user_message(prompt);
        let slot = self.sink.create_response_slot();

        match self.config.mode {
            RequestMode::Stream => {
                let mut assembler =
                    StreamAssembler::new(&mut self.sink, slot, self.config.boundary);
                self.transport.stream(&input, &mut assembler).await;
            }
            RequestMode::Send => match self.transport.send(&input).await {
                Ok(response) => {
                    info!("Request started");
                    let text = render_response(&response);
                    self.sink.append_to_slot(slot, &text);
                    info!(status = %response.status, "Request finished");
                }
                Err(error) => {
                    warn!(%error, "Request error");
                    self.sink.append_to_slot(slot, &format!("\nError: {error}"));
                }
            },
        }

        Ok(())
    }
}
