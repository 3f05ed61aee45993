use relay_lib::{config, routes, state::AppState};
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, TraceLayer};
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutting down server");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting relay proxy...");

    let config_path = std::env::var("CONFIG_FILE_PATH")
        .unwrap_or_else(|_| config::constants::DEFAULT_CONFIG_PATH.to_string());
    let app_config = config::load_or_default(&config_path)
        .map_err(|e| anyhow::anyhow!("Failed to load configuration from {}: {}", config_path, e))?;

    if let Err(val_errors) = config::validation::validate_config(&app_config) {
        error!("Configuration is invalid: {:?}. Halting.", val_errors);
        return Err(anyhow::anyhow!("Invalid config: {:?}", val_errors));
    }
    info!("Configuration validated successfully.");

    let proxy_config = app_config.proxy;
    let port = proxy_config.port;
    let api_host = proxy_config.api_host.clone();
    let app_state = Arc::new(
        AppState::new(proxy_config)
            .map_err(|e| anyhow::anyhow!("Failed to create app state: {}", e))?,
    );

    let app = routes::create_router(app_state).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_response(()),
    );

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to port {}: {}", port, e))?;

    info!("Serving at http://localhost:{}", port);
    info!("API requests will be proxied to {}", api_host);
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
