//! Process startup shared by the three binaries.

use axum::Router;

use crate::config::ConfigError;
use crate::llm::types::LlmError;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("LLM client error: {0}")]
    Llm(#[from] LlmError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Load `.env` if present and install the fmt subscriber. `RUST_LOG`
/// overrides the default `info` filter.
pub fn init_tracing() {
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "loaded .env");
    }
}

/// Bind `0.0.0.0:{port}` and serve until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the listener cannot bind or the server fails.
pub async fn serve(app: Router, port: u16, name: &'static str) -> Result<(), StartupError> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(%port, service = name, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(name))
        .await?;
    Ok(())
}

async fn shutdown_signal(name: &'static str) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!(service = name, "shutting down");
}
