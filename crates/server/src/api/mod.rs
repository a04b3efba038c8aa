//! HTTP API: prediction, metadata, health and Prometheus metrics

pub mod error;
pub mod handlers;
pub mod middleware;

use crate::config::ServiceConfig;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use sentiment_lib::{
    metadata, ArtifactCache, Authenticator, ClassificationService, RequestValidator,
    ServiceMetrics, StructuredLogger,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

/// Shared application state
pub struct AppState {
    pub service: ClassificationService,
    pub authenticator: Authenticator,
    pub metrics: ServiceMetrics,
    pub logger: StructuredLogger,
    pub max_body_bytes: usize,
    model_reported: AtomicBool,
}

impl AppState {
    pub fn new(
        service: ClassificationService,
        authenticator: Authenticator,
        max_body_bytes: usize,
    ) -> Self {
        Self {
            service,
            authenticator,
            metrics: ServiceMetrics::new(),
            logger: StructuredLogger::new("sentiment-server"),
            max_body_bytes,
            model_reported: AtomicBool::new(false),
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        let service = ClassificationService::new(
            ArtifactCache::new(config.artifact_source()),
            RequestValidator::new(config.limits()),
        );
        Self::new(
            service,
            Authenticator::new(config.api_key.clone()),
            config.max_body_bytes,
        )
    }

    /// Publish model info the first time the artifact is seen loaded
    pub fn note_model_loaded(&self) {
        let Some(artifact) = self.service.cache().get() else {
            return;
        };
        if self.model_reported.swap(true, Ordering::AcqRel) {
            return;
        }
        let info = metadata::describe(artifact);
        self.metrics.set_model_info(&info.model_name, &info.version);
        self.logger
            .log_model_loaded(&info.model_name, &info.version, artifact.scoring.capability());
    }
}

/// Load the artifact ahead of the first request.
///
/// Failure is logged and the server keeps running; prediction routes answer
/// 503 and later requests retry the load.
pub fn warm(state: &AppState) -> bool {
    match state.service.cache().ensure_loaded() {
        Ok(_) => {
            state.note_model_loaded();
            true
        }
        Err(e) => {
            state.logger.log_model_load_failed(
                &state.service.cache().path().display().to_string(),
                &e.to_string(),
            );
            false
        }
    }
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/readyz", get(handlers::readyz))
        .route("/metrics", get(handlers::metrics))
        .route("/meta", get(handlers::meta))
        .route("/predict", post(handlers::predict))
        .route("/predict/batch", post(handlers::predict_batch))
        // Bodies without a Content-Length still stop at the same cap
        .layer(DefaultBodyLimit::max(state.max_body_bytes))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::body_limit,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::request_logging,
        ))
        .with_state(state)
}

/// Start the API server and run until SIGINT or SIGTERM
pub async fn serve(addr: &str, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state.clone());

    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await?;

    Ok(())
}

async fn shutdown_signal(state: Arc<AppState>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let reason = tokio::select! {
        _ = ctrl_c => "SIGINT received",
        _ = terminate => "SIGTERM received",
    };
    state.logger.log_shutdown(reason);
}
