use relay_lib::client::{ApiClient, ChatSession, SessionError, TerminalSink};
use relay_lib::config;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

const CLEAR_COMMAND: &str = "/clear";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout is the conversation; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = std::env::var("CONFIG_FILE_PATH")
        .unwrap_or_else(|_| config::constants::DEFAULT_CONFIG_PATH.to_string());
    let app_config = config::load_or_default(&config_path)
        .map_err(|e| anyhow::anyhow!("Failed to load configuration from {}: {}", config_path, e))?;

    if let Err(val_errors) = config::validation::validate_config(&app_config) {
        error!("Configuration is invalid: {:?}. Halting.", val_errors);
        return Err(anyhow::anyhow!("Invalid config: {:?}", val_errors));
    }

    let client_config = app_config.client;
    let timeout = Duration::from_secs(app_config.proxy.timeout_seconds);
    info!(url = %client_config.url, mode = ?client_config.mode, "Starting chat session");

    let transport = ApiClient::with_timeout(timeout)?;
    let sink = TerminalSink::new(std::io::stdout());
    let mut session = ChatSession::new(transport, sink, client_config);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim() == CLEAR_COMMAND {
            session.clear();
            continue;
        }

        match session.send_prompt(&line).await {
            Ok(()) => {}
            Err(SessionError::EmptyPrompt) => debug!("Ignoring empty prompt"),
            Err(e) => error!("Could not send prompt: {}", e),
        }
    }

    Ok(())
}
