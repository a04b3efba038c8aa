//! Sentiment server - text classification behind an API-key gate
//!
//! Serves a pre-trained linear text classifier over HTTP. The model artifact
//! is loaded once per process, eagerly at startup unless `EAGER_LOAD=false`.

use anyhow::Result;
use sentiment_server::{api, config::ServiceConfig};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServiceConfig::load()?;

    // RUST_LOG wins over LOG_LEVEL
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(config.log_filter()))
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(fmt::layer().json())
        .init();

    info!(config = ?config, "Service configured");

    let state = Arc::new(api::AppState::from_config(&config));
    state.logger.log_startup(
        SERVICE_VERSION,
        &config.model_path.display().to_string(),
        state.authenticator.is_enabled(),
    );

    if config.eager_load {
        let warm_state = state.clone();
        let loaded = tokio::task::spawn_blocking(move || api::warm(&warm_state)).await?;
        if !loaded {
            info!("Serving without a model; prediction routes return 503 until it loads");
        }
    }

    api::serve(&config.bind_addr(), state).await
}
