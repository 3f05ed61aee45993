use crate::config::models::ProxyConfig;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ProxyConfig>,
    pub http_client: reqwest::Client,
}

impl AppState {
    pub fn new(config: ProxyConfig) -> Result<Self> {
        // Relayed streams may outlive the timeout; only connecting and
        // each read between chunks are bounded.
        let timeout = Duration::from_secs(config.timeout_seconds);
        let http_client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .build()?;

        Ok(Self {
            config: Arc::new(config),
            http_client,
        })
    }
}
