/// Prefix carried by every Server-Sent-Events data line.
pub const DATA_PREFIX: &str = "data: ";

/// Line that terminates an SSE completion stream.
pub const DONE_MARKER: &str = "data: [DONE]";

const DONE_PAYLOAD: &str = "[DONE]";

/// Strip SSE framing from a single line of stream text.
///
/// Removes one leading `data: ` and a trailing `data: [DONE]`. A line that was
/// only the terminal marker comes back empty, so it never reaches the JSON
/// parser. Lines without framing (backends emitting bare JSON lines) are
/// returned untouched.
pub fn sanitize(line: &str) -> &str {
    let payload = line.strip_prefix(DATA_PREFIX).unwrap_or(line);
    if payload == DONE_PAYLOAD {
        return "";
    }
    payload.strip_suffix(DONE_MARKER).unwrap_or(payload)
}

/// Whether a line, once sanitized, is the end-of-stream marker.
pub fn is_done_marker(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed == DONE_MARKER || trimmed == DONE_PAYLOAD
}
