//! Route handlers

use super::error::ApiError;
use super::AppState;
use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequestParts, State},
    http::{request::Parts, StatusCode},
    response::IntoResponse,
    Json,
};
use prometheus::{Encoder, TextEncoder};
use sentiment_lib::{
    BatchItem, BatchRequest, HealthResponse, ModelInfo, PredictRequest, PredictResponse,
    ServiceError, API_KEY_HEADER,
};
use std::sync::Arc;

/// Extractor that rejects the request unless `X-API-Key` matches the configured secret
pub struct RequireApiKey;

#[async_trait]
impl FromRequestParts<Arc<AppState>> for RequireApiKey {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let provided = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok());
        state.authenticator.check(provided)?;
        Ok(RequireApiKey)
    }
}

/// Run a service call on the blocking pool.
///
/// The first call may read and parse the artifact, and scoring is CPU-bound;
/// neither may stall the async workers.
async fn run_blocking<T, F>(state: &Arc<AppState>, call: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&AppState) -> Result<T, ServiceError> + Send + 'static,
{
    let state = state.clone();
    let result = tokio::task::spawn_blocking(move || call(state.as_ref()))
        .await
        .map_err(|e| ApiError::internal(format!("Worker task failed: {}", e)))?;
    Ok(result?)
}

/// Liveness; never touches the model
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// Readiness - 200 once the artifact is loaded, 503 otherwise
pub async fn readyz(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let readiness = run_blocking(&state, |state| Ok(state.service.readiness())).await?;
    let status_code = if readiness.ready {
        state.note_model_loaded();
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    Ok((status_code, Json(readiness)))
}

/// Prometheus metrics endpoint
pub async fn metrics() -> Result<impl IntoResponse, ApiError> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| ApiError::internal(format!("Failed to encode metrics: {}", e)))?;

    Ok((
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    ))
}

pub async fn meta(State(state): State<Arc<AppState>>) -> Result<Json<ModelInfo>, ApiError> {
    let info = run_blocking(&state, |state| state.service.describe()).await?;
    state.note_model_loaded();
    Ok(Json(info))
}

pub async fn predict(
    State(state): State<Arc<AppState>>,
    _auth: RequireApiKey,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(PredictRequest { text }) = payload?;
    let text_chars = text.chars().count();
    let response = run_blocking(&state, move |state| state.service.predict(&text)).await?;
    state.note_model_loaded();

    state.metrics.inc_prediction(&response.label);
    state.logger.log_prediction(
        &response.label,
        response.score,
        text_chars,
        &response.explain.top_tokens,
    );

    Ok(Json(response))
}

pub async fn predict_batch(
    State(state): State<Arc<AppState>>,
    _auth: RequireApiKey,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> Result<Json<Vec<BatchItem>>, ApiError> {
    let Json(BatchRequest { texts }) = payload?;
    let items = run_blocking(&state, move |state| state.service.predict_batch(&texts)).await?;
    state.note_model_loaded();

    state.metrics.observe_batch_size(items.len());
    for item in &items {
        state.metrics.inc_prediction(&item.label);
    }
    state.logger.log_batch(items.len());

    Ok(Json(items))
}
