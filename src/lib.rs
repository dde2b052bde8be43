pub mod cli;
pub mod commands;
pub mod error;
pub mod models;
pub mod services;

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use commands::{router, AppState};
use models::config::{AppConfig, LogFormat, LoggingConfig};
use services::model_server::ModelServerManager;
use services::ocr::HttpOcrClient;

/// Install the global tracing subscriber
pub fn init_logging(config: &LoggingConfig) {
    let level: tracing::Level = config.level.into();
    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false);

    match config.format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Bring up the model server, then serve until Ctrl+C / SIGTERM
pub async fn run(config: AppConfig) -> Result<()> {
    tokio::fs::create_dir_all(&config.upload.dir)
        .await
        .with_context(|| format!("Failed to create upload directory {}", config.upload.dir.display()))?;

    let client = HttpOcrClient::new(&config.model_server).context("Failed to build model server client")?;

    let model_server = ModelServerManager::new(client.clone(), config.model_server.clone());
    model_server.start().await?;

    let state = Arc::new(AppState::new(config.upload.clone(), client));
    let app = router(state);

    let address = config.server.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    model_server.stop();
    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    tokio::select! {
        _ = signal::ctrl_c() => info!("Received Ctrl+C signal"),
        _ = wait_for_term_signal() => info!("Received TERM signal"),
    }
}

#[cfg(unix)]
async fn wait_for_term_signal() {
    use tokio::signal::unix::{signal, SignalKind};
    if let Ok(mut stream) = signal(SignalKind::terminate()) {
        stream.recv().await;
    }
}

#[cfg(not(unix))]
async fn wait_for_term_signal() {
    std::future::pending::<()>().await;
}
