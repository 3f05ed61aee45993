use serde_json::Value;
use tracing::{debug, warn};

use super::assembler::{AssemblyState, process_line};
use super::extractor::{COMPLETE_RULES, extract_with};
use super::types::{CompleteResponse, ResponseError};

/// SSE field name used to detect a streamed body returned in one piece.
const SSE_FIELD: &str = "data:";

const DUMP_HEADER: &str = "Server returned streaming data. Here's the formatted content:\n\n";

/// Text to show for a buffered response.
///
/// Failure statuses render as an error line with the raw body. A failure
/// while interpreting a successful body is shown, never propagated.
pub fn render_response(response: &CompleteResponse) -> String {
    if !response.is_successful() {
        warn!(status = %response.status, "Backend reported failure");
        return format!(
            "Error: {}\n{}",
            response.failure_reason().unwrap_or("Unknown error"),
            response.body_text()
        );
    }

    interpret_response(response).unwrap_or_else(|e| {
        warn!(error = %e, "Could not interpret response");
        format!("Error processing response: {e}")
    })
}

/// Reduce a successful response body to display text.
pub fn interpret_response(response: &CompleteResponse) -> Result<String, ResponseError> {
    let body = std::str::from_utf8(&response.body)?;

    if body.contains(SSE_FIELD) {
        return assemble_sse_body(body);
    }

    match response.parse_json_body() {
        Some(payload) => match extract_with(&COMPLETE_RULES, &payload) {
            Some((shape, text)) => {
                debug!(?shape, "Extracted buffered response");
                Ok(text)
            }
            None => Ok(serde_json::to_string_pretty(&payload)?),
        },
        None => Ok(body.to_owned()),
    }
}

/// Treat a whole body as an unsplit event stream: cut it on `data:`,
/// extract each fragment in order and concatenate. When nothing usable
/// comes out, dump every fragment instead.
pub fn assemble_sse_body(body: &str) -> Result<String, ResponseError> {
    let fragments: Vec<&str> = body
        .split(SSE_FIELD)
        .filter(|fragment| !fragment.trim().is_empty())
        .collect();

    let mut state = AssemblyState::default();
    let mut content = String::new();
    for fragment in &fragments {
        let (next, text) = process_line(state, fragment);
        state = next;
        if let Some(text) = text {
            content.push_str(&text);
        }
    }

    if state.extracted_any && !content.trim().is_empty() {
        return Ok(content);
    }

    debug!(
        fragments = fragments.len(),
        "No content in streamed body, dumping fragments"
    );
    dump_fragments(&fragments)
}

fn dump_fragments(fragments: &[&str]) -> Result<String, ResponseError> {
    let mut content = String::from(DUMP_HEADER);
    for (index, fragment) in fragments.iter().enumerate() {
        let fragment = fragment.trim();
        let position = index + 1;
        match serde_json::from_str::<Value>(fragment) {
            Ok(value) => {
                let pretty = serde_json::to_string_pretty(&value)?;
                content.push_str(&format!("Chunk {position}:\n{pretty}\n\n"));
            }
            Err(_) => {
                content.push_str(&format!(
                    "Chunk {position} (Invalid JSON):\n{fragment}\n\n"
                ));
            }
        }
    }
    Ok(content)
}
