use http::StatusCode;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use relay_lib::client::sink::Role;
use relay_lib::client::types::{RequestMode, SessionError, TransportError};
use relay_lib::client::{ChatSession, Transcript};
use relay_lib::config::models::ClientConfig;
use relay_lib::stream::BoundaryPolicy;
use relay_lib::stream::types::CompleteResponse;
use serde_json::json;

use super::helpers::*;

fn client_config(mode: RequestMode) -> ClientConfig {
    ClientConfig {
        url: "http://localhost:8081/api/generate".to_string(),
        token: "test-token".to_string(),
        mode,
        boundary: BoundaryPolicy::Carry,
    }
}

fn session(script: Scripted, mode: RequestMode) -> ChatSession<FakeTransport, Transcript> {
    ChatSession::new(
        FakeTransport::new(script),
        Transcript::new(),
        client_config(mode),
    )
}

// ---------------------------------------------------------------------------
// Streaming mode
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_streamed_prompt_fills_response_slot() {
    let chunks = vec![delta_line("Hi"), delta_line(" there"), done_line()];
    let mut session = session(Scripted::Chunks(chunks), RequestMode::Stream);

    session.send_prompt("  hello  ").await.unwrap();

    let messages = session.sink().messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[0].text, "hello");
    assert_eq!(messages[1].role, Role::Assistant);
    assert_eq!(messages[1].text, "Hi there");
}

#[tokio::test]
async fn test_request_carries_prompt_and_bearer_token() {
    let mut session = session(Scripted::Chunks(vec![done_line()]), RequestMode::Stream);
    session.send_prompt("question").await.unwrap();

    let sent = session_sent(&session);
    assert_eq!(sent.len(), 1);
    let input = &sent[0];
    assert_eq!(input.method, http::Method::POST);
    assert_eq!(input.url, "http://localhost:8081/api/generate");
    assert_eq!(input.headers[AUTHORIZATION], "Bearer test-token");
    assert_eq!(input.headers[CONTENT_TYPE], "application/json");
    assert_eq!(input.body, Some(json!({"prompt": "question"})));
}

#[tokio::test]
async fn test_stream_failure_keeps_partial_text() {
    let script = Scripted::ChunksThenFailure(
        vec![delta_line("half")],
        TransportError::Network("reset".to_string()),
    );
    let mut session = session(script, RequestMode::Stream);
    session.send_prompt("q").await.unwrap();

    assert_eq!(
        session.sink().last_response(),
        Some("half\nError: Network error: reset")
    );
}

// ---------------------------------------------------------------------------
// Buffered mode
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_buffered_prompt_renders_complete_response() {
    let response = CompleteResponse::new(
        StatusCode::OK,
        r#"{"choices":[{"message":{"content":"whole answer"}}]}"#,
    );
    let mut session = session(Scripted::Complete(response), RequestMode::Send);
    session.send_prompt("q").await.unwrap();

    assert_eq!(session.sink().last_response(), Some("whole answer"));
}

#[tokio::test]
async fn test_buffered_backend_error_is_visible() {
    let response = CompleteResponse::new(StatusCode::UNAUTHORIZED, "bad token");
    let mut session = session(Scripted::Complete(response), RequestMode::Send);
    session.send_prompt("q").await.unwrap();

    assert_eq!(
        session.sink().last_response(),
        Some("Error: Unauthorized\nbad token")
    );
}

#[tokio::test]
async fn test_buffered_transport_error_is_visible() {
    let script = Scripted::Failure(TransportError::Timeout("too slow".to_string()));
    let mut session = session(script, RequestMode::Send);
    session.send_prompt("q").await.unwrap();

    assert_eq!(session.sink().last_response(), Some("\nError: Timeout: too slow"));
}

// ---------------------------------------------------------------------------
// Session rules
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_blank_prompt_is_rejected_without_request() {
    let mut session = session(Scripted::Chunks(vec![]), RequestMode::Stream);
    let result = session.send_prompt("   ").await;

    assert!(matches!(result, Err(SessionError::EmptyPrompt)));
    assert!(session.sink().messages().is_empty());
    assert!(session_sent(&session).is_empty());
}

#[tokio::test]
async fn test_invalid_token_is_rejected_before_display() {
    let mut config = client_config(RequestMode::Stream);
    config.token = "bad\ntoken".to_string();
    let mut session = ChatSession::new(
        FakeTransport::new(Scripted::Chunks(vec![])),
        Transcript::new(),
        config,
    );

    let result = session.send_prompt("q").await;
    assert!(matches!(
        result,
        Err(SessionError::Transport(TransportError::InvalidRequest(_)))
    ));
    assert!(session.sink().messages().is_empty());
}

#[tokio::test]
async fn test_clear_empties_transcript() {
    let mut session = session(
        Scripted::Chunks(vec![delta_line("x")]),
        RequestMode::Stream,
    );
    session.send_prompt("q").await.unwrap();
    assert_eq!(session.sink().messages().len(), 2);

    session.clear();
    assert!(session.sink().messages().is_empty());
}

fn session_sent(
    session: &ChatSession<FakeTransport, Transcript>,
) -> Vec<relay_lib::client::RequestInput> {
    session.transport().sent.lock().unwrap().clone()
}
