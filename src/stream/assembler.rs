use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::extractor::extract_chunk;
use super::sanitizer::{DONE_MARKER, is_done_marker, sanitize};
use super::types::{StreamHandler, StreamOutcome};
use crate::client::sink::{DisplaySink, SlotId};
use crate::client::types::TransportError;

/// What to do with a line that is cut in two by a chunk boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryPolicy {
    /// Hold a truncated tail and prepend it to the next chunk.
    #[default]
    Carry,
    /// Process every chunk on its own; a split line yields whatever its
    /// halves yield, usually nothing.
    Discard,
}

/// Request-scoped assembly state, threaded through the line steps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssemblyState {
    /// Whether any line of this request produced text.
    pub extracted_any: bool,
    /// Unterminated tail carried over from the previous chunk.
    pub pending: String,
}

/// Run one line through sanitize + extract.
pub fn process_line(state: AssemblyState, line: &str) -> (AssemblyState, Option<String>) {
    let line = line.trim_end_matches('\r');
    if line.trim().is_empty() {
        return (state, None);
    }

    let text = extract_chunk(line);
    if text.is_empty() {
        debug!(line_len = line.len(), "Line contributed no content");
        return (state, None);
    }

    (
        AssemblyState {
            extracted_any: true,
            ..state
        },
        Some(text),
    )
}

/// Split a raw chunk into lines and extract each, keeping arrival order.
pub fn process_chunk(
    state: AssemblyState,
    chunk: &str,
    policy: BoundaryPolicy,
) -> (AssemblyState, Vec<String>) {
    let mut state = state;
    let text = match policy {
        BoundaryPolicy::Carry => {
            let mut text = std::mem::take(&mut state.pending);
            text.push_str(chunk);
            text
        }
        BoundaryPolicy::Discard => chunk.to_owned(),
    };

    let mut lines: Vec<&str> = text.split('\n').collect();
    if policy == BoundaryPolicy::Carry {
        // split always yields at least one element: the text after the last newline
        if let Some(tail) = lines.pop() {
            if is_truncated(tail) {
                state.pending = tail.to_owned();
            } else {
                lines.push(tail);
            }
        }
    }

    let mut increments = Vec::new();
    for line in lines {
        let (next, extracted) = process_line(state, line);
        state = next;
        increments.extend(extracted);
    }
    (state, increments)
}

/// Process whatever tail is still carried once the stream has ended.
pub fn flush(state: AssemblyState) -> (AssemblyState, Option<String>) {
    let mut state = state;
    let pending = std::mem::take(&mut state.pending);
    process_line(state, &pending)
}

/// Whether an unterminated tail was cut short by the chunk boundary.
/// Anything else is a whole line and is processed right away.
fn is_truncated(tail: &str) -> bool {
    let tail = tail.trim_end_matches('\r');
    if tail.trim().is_empty() || is_done_marker(tail) {
        return false;
    }
    if DONE_MARKER.starts_with(tail) {
        return true;
    }
    matches!(
        serde_json::from_str::<Value>(sanitize(tail)),
        Err(e) if e.is_eof()
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Streaming,
    Finished,
}

/// Feeds streamed text into one response slot of a display sink.
pub struct StreamAssembler<'a, S: DisplaySink + ?Sized> {
    sink: &'a mut S,
    slot: SlotId,
    policy: BoundaryPolicy,
    state: AssemblyState,
    phase: Phase,
}

impl<'a, S: DisplaySink + ?Sized> StreamAssembler<'a, S> {
    pub fn new(sink: &'a mut S, slot: SlotId, policy: BoundaryPolicy) -> Self {
        Self {
            sink,
            slot,
            policy,
            state: AssemblyState::default(),
            phase: Phase::Idle,
        }
    }

    pub fn extracted_any(&self) -> bool {
        self.state.extracted_any
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    fn append(&mut self, text: &str) {
        self.sink.append_to_slot(self.slot, text);
    }
}

impl<S: DisplaySink + ?Sized> StreamHandler for StreamAssembler<'_, S> {
    fn on_start(&mut self) {
        info!("Request started");
        self.state = AssemblyState::default();
        self.phase = Phase::Streaming;
    }

    fn on_chunk(&mut self, chunk: &str) {
        match self.phase {
            Phase::Finished => {
                warn!("Chunk received after the request finished; ignoring");
                return;
            }
            Phase::Idle => warn!("Chunk received before start"),
            Phase::Streaming => {}
        }

        let state = std::mem::take(&mut self.state);
        let (state, increments) = process_chunk(state, chunk, self.policy);
        self.state = state;
        for text in increments {
            self.append(&text);
        }
    }

    fn on_finish(&mut self, outcome: &StreamOutcome) {
        if self.phase == Phase::Finished {
            warn!("Duplicate completion signal ignored");
            return;
        }

        let state = std::mem::take(&mut self.state);
        let (state, tail) = flush(state);
        self.state = state;
        if let Some(text) = tail {
            self.append(&text);
        }

        self.phase = Phase::Finished;
        info!(
            status = %outcome.status,
            extracted = self.state.extracted_any,
            "Request finished"
        );
    }

    fn on_failure(&mut self, error: &TransportError) {
        if self.phase == Phase::Finished {
            warn!(%error, "Failure reported after the request finished; ignoring");
            return;
        }

        warn!(%error, "Request error");
        self.append(&format!("\nError: {error}"));
        self.phase = Phase::Finished;
    }
}
