use http::StatusCode;
use relay_lib::stream::render_response;
use relay_lib::stream::response::{assemble_sse_body, interpret_response};
use relay_lib::stream::types::{CompleteResponse, ResponseError};

fn ok(body: &str) -> CompleteResponse {
    CompleteResponse::new(StatusCode::OK, body)
}

// ---------------------------------------------------------------------------
// Failure status
// ---------------------------------------------------------------------------

#[test]
fn test_failure_status_shows_reason_and_body() {
    let response = CompleteResponse::new(StatusCode::SERVICE_UNAVAILABLE, "backend down");
    assert_eq!(
        render_response(&response),
        "Error: Service Unavailable\nbackend down"
    );
}

#[test]
fn test_failure_status_without_reason() {
    let status = StatusCode::from_u16(599).unwrap();
    let response = CompleteResponse::new(status, "");
    assert_eq!(render_response(&response), "Error: Unknown error\n");
}

// ---------------------------------------------------------------------------
// Streamed body delivered in one piece
// ---------------------------------------------------------------------------

#[test]
fn test_sse_body_is_concatenated() {
    let body = r#"data: {"response":"X"}data: {"response":"Y"}data: [DONE]"#;
    assert_eq!(render_response(&ok(body)), "XY");
}

#[test]
fn test_sse_body_with_newlines_and_deltas() {
    let body = concat!(
        "data: {\"choices\":[{\"delta\":{\"content\":\"Hello\"}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\", world\"}}]}\n\n",
        "data: [DONE]\n\n",
    );
    assert_eq!(render_response(&ok(body)), "Hello, world");
}

#[test]
fn test_sse_body_without_content_falls_back_to_dump() {
    let body = "data: not-json data: {broken";
    let rendered = assemble_sse_body(body).unwrap();
    assert_eq!(
        rendered,
        "Server returned streaming data. Here's the formatted content:\n\n\
         Chunk 1 (Invalid JSON):\nnot-json\n\n\
         Chunk 2 (Invalid JSON):\n{broken\n\n"
    );
}

#[test]
fn test_dump_pretty_prints_valid_fragments() {
    let body = r#"data: {"usage":{"tokens":3}}data: [DONE]"#;
    let rendered = render_response(&ok(body));
    assert!(rendered.starts_with("Server returned streaming data."));
    assert!(rendered.contains("Chunk 1:\n{\n  \"usage\": {\n    \"tokens\": 3\n  }\n}\n\n"));
    assert!(rendered.contains("Chunk 2 (Invalid JSON):\n[DONE]\n\n"));
}

#[test]
fn test_whitespace_only_content_falls_back_to_dump() {
    let body = r#"data: {"response":"  "}"#;
    assert!(render_response(&ok(body)).contains("Chunk 1:"));
}

// ---------------------------------------------------------------------------
// Plain JSON body
// ---------------------------------------------------------------------------

#[test]
fn test_chat_completion_message() {
    let body = r#"{"choices":[{"message":{"role":"assistant","content":"complete"}}]}"#;
    assert_eq!(render_response(&ok(body)), "complete");
}

#[test]
fn test_message_and_response_shapes() {
    assert_eq!(render_response(&ok(r#"{"message":{"content":"m"}}"#)), "m");
    assert_eq!(render_response(&ok(r#"{"response":"r","done":true}"#)), "r");
}

#[test]
fn test_unknown_json_is_pretty_printed() {
    let rendered = render_response(&ok(r#"{"status":"queued"}"#));
    assert_eq!(rendered, "{\n  \"status\": \"queued\"\n}");
}

#[test]
fn test_non_json_body_is_shown_verbatim() {
    assert_eq!(render_response(&ok("plain answer")), "plain answer");
    assert_eq!(render_response(&ok("null")), "null");
    assert_eq!(render_response(&ok("")), "");
}

// ---------------------------------------------------------------------------
// Interpretation failures
// ---------------------------------------------------------------------------

#[test]
fn test_invalid_utf8_is_reported_not_raised() {
    let response = CompleteResponse::new(StatusCode::OK, vec![0xffu8, 0xfe]);
    assert!(matches!(
        interpret_response(&response),
        Err(ResponseError::InvalidUtf8(_))
    ));
    assert!(render_response(&response).starts_with("Error processing response: "));
}

#[test]
fn test_parse_json_body() {
    assert!(ok("null").parse_json_body().is_none());
    assert!(ok("nope").parse_json_body().is_none());
    assert_eq!(ok(r#"{"a":1}"#).parse_json_body().unwrap()["a"], 1);
}
