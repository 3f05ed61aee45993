use std::env;

pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Requests under this prefix are forwarded upstream with the prefix removed.
pub const API_PREFIX: &str = "/api";

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

pub fn port() -> u16 {
    env_or("PORT", 8081)
}

pub fn api_host() -> String {
    env::var("API_HOST").unwrap_or_else(|_| "http://localhost:8080".to_string())
}

pub fn static_dir() -> String {
    env::var("STATIC_DIR").unwrap_or_else(|_| ".".to_string())
}

pub fn proxy_timeout_seconds() -> u64 {
    env_or("PROXY_TIMEOUT_SECONDS", 300)
}

pub fn max_request_body_bytes() -> usize {
    env_or("MAX_REQUEST_BODY_BYTES", 10 * 1024 * 1024)
}

pub fn chat_url() -> String {
    env::var("CHAT_URL").unwrap_or_else(|_| "http://localhost:8081/api/generate".to_string())
}

pub fn chat_token() -> String {
    env::var("CHAT_TOKEN").unwrap_or_default()
}

pub fn chat_mode() -> String {
    env::var("CHAT_MODE").unwrap_or_else(|_| "stream".to_string())
}

pub fn chat_boundary() -> String {
    env::var("CHAT_BOUNDARY").unwrap_or_else(|_| "carry".to_string())
}
