use crate::{routers::proxy, state::AppState};
use axum::http::header::AUTHORIZATION;
use axum::{Router, routing::get};
use std::iter::once;
use std::sync::Arc;
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(|| async { "Working!" }))
        .fallback(proxy::dispatch)
        .layer(SetSensitiveRequestHeadersLayer::new(once(AUTHORIZATION)))
        .with_state(state)
}
