use crate::config::constants::API_PREFIX;
use crate::state::AppState;

use axum::body::{Body, to_bytes};
use axum::extract::{Request, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_MAX_AGE, CONNECTION, CONTENT_LENGTH, CONTENT_TYPE, HOST, TRANSFER_ENCODING,
};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use http_body_util::LengthLimitError;
use std::error::Error as StdError;
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::services::ServeDir;
use tracing::{debug, error, info};

/// Request headers never copied upstream.
const SKIPPED_REQUEST_HEADERS: [HeaderName; 4] =
    [HOST, CONTENT_LENGTH, CONNECTION, TRANSFER_ENCODING];

/// Upstream response headers replaced or recomputed by the proxy.
const SKIPPED_RESPONSE_HEADERS: [HeaderName; 4] = [
    ACCESS_CONTROL_ALLOW_ORIGIN,
    CONTENT_LENGTH,
    CONNECTION,
    TRANSFER_ENCODING,
];

/// Entry point for everything that is not `/health`.
pub async fn dispatch(State(state): State<Arc<AppState>>, req: Request) -> Response {
    let method = req.method().clone();
    let is_api = is_api_path(req.uri().path());

    match method {
        Method::OPTIONS => preflight(),
        Method::GET | Method::POST if is_api => forward(&state, req).await,
        Method::GET | Method::HEAD => serve_static(&state, req).await,
        Method::POST => (StatusCode::NOT_FOUND, "Not Found").into_response(),
        _ => (StatusCode::NOT_IMPLEMENTED, "Not Implemented").into_response(),
    }
}

fn is_api_path(path: &str) -> bool {
    path.strip_prefix(API_PREFIX)
        .is_some_and(|rest| rest.starts_with('/'))
}

fn preflight() -> Response {
    (
        StatusCode::OK,
        [
            (ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, OPTIONS"),
            (ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type, Authorization"),
            (ACCESS_CONTROL_MAX_AGE, "86400"),
        ],
    )
        .into_response()
}

async fn serve_static(state: &AppState, req: Request) -> Response {
    match ServeDir::new(&state.config.static_dir).oneshot(req).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}

/// Upstream URL for an `/api/...` path: the prefix is dropped, the query kept.
pub fn target_url(api_host: &str, path_and_query: &str) -> String {
    let rest = path_and_query
        .strip_prefix(API_PREFIX)
        .unwrap_or(path_and_query);
    format!("{}{}", api_host.trim_end_matches('/'), rest)
}

/// Copy the client headers for the upstream request.
pub fn upstream_headers(incoming: &HeaderMap, method: &Method, has_body: bool) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(incoming.len());
    for (name, value) in incoming {
        if !SKIPPED_REQUEST_HEADERS.contains(name) {
            headers.append(name.clone(), value.clone());
        }
    }

    if *method == Method::POST && has_body && !headers.contains_key(CONTENT_TYPE) {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }
    headers
}

async fn forward(state: &AppState, req: Request) -> Response {
    let (parts, body) = req.into_parts();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or(API_PREFIX);
    let target = target_url(&state.config.api_host, path_and_query);
    info!(
        "Proxying {} request: {} -> {}",
        parts.method, path_and_query, target
    );

    let body = match to_bytes(body, state.config.max_body_bytes).await {
        Ok(body) => body,
        Err(e) => {
            error!("Failed to read request body: {}", e);
            return (body_error_status(&e), format!("Proxy Error: {e}")).into_response();
        }
    };

    let headers = upstream_headers(&parts.headers, &parts.method, !body.is_empty());
    let mut upstream = state
        .http_client
        .request(parts.method.clone(), &target)
        .headers(headers);
    if !body.is_empty() {
        upstream = upstream.body(body);
    }

    match upstream.send().await {
        Ok(response) => relay(response),
        Err(e) => {
            error!("Proxy request to {} failed: {}", target, e);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Proxy Error: {e}")).into_response()
        }
    }
}

/// 413 when the body ran over `max_body_bytes`, 400 for any other read failure.
fn body_error_status(error: &axum::Error) -> StatusCode {
    let root: &(dyn StdError + 'static) = error;
    let over_limit = std::iter::successors(Some(root), |e| (*e).source())
        .any(|e| e.is::<LengthLimitError>());
    if over_limit {
        StatusCode::PAYLOAD_TOO_LARGE
    } else {
        StatusCode::BAD_REQUEST
    }
}

/// Pass the upstream answer through, success or error, chunk by chunk.
fn relay(response: reqwest::Response) -> Response {
    let status = response.status();
    debug!(%status, "Relaying upstream response");

    let mut headers = HeaderMap::with_capacity(response.headers().len() + 1);
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    for (name, value) in response.headers() {
        if !SKIPPED_RESPONSE_HEADERS.contains(name) {
            headers.append(name.clone(), value.clone());
        }
    }

    let mut relayed = Response::new(Body::from_stream(response.bytes_stream()));
    *relayed.status_mut() = status;
    *relayed.headers_mut() = headers;
    relayed
}
