//! Observability infrastructure for the classification service
//!
//! Provides:
//! - Prometheus metrics (request latency, predictions by label, errors by kind,
//!   batch sizes, loaded model info)
//! - Structured JSON logging with tracing

use prometheus::{
    register_gauge_vec, register_histogram, register_histogram_vec, register_int_counter_vec,
    GaugeVec, Histogram, HistogramVec, IntCounterVec,
};
use std::sync::OnceLock;
use tracing::{error, info, warn};

/// Histogram buckets for request latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5,
];

/// Histogram buckets for batch sizes
const BATCH_SIZE_BUCKETS: &[f64] = &[1.0, 2.0, 5.0, 10.0, 25.0, 50.0, 100.0, 200.0, 500.0];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<ServiceMetricsInner> = OnceLock::new();

struct ServiceMetricsInner {
    request_duration_seconds: HistogramVec,
    predictions_total: IntCounterVec,
    request_errors_total: IntCounterVec,
    batch_size: Histogram,
    model_info: GaugeVec,
}

impl ServiceMetricsInner {
    fn new() -> Self {
        Self {
            request_duration_seconds: register_histogram_vec!(
                "sentiment_request_duration_seconds",
                "HTTP request latency",
                &["method", "route", "status"],
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register request_duration_seconds"),

            predictions_total: register_int_counter_vec!(
                "sentiment_predictions_total",
                "Texts scored, by predicted label",
                &["label"]
            )
            .expect("Failed to register predictions_total"),

            request_errors_total: register_int_counter_vec!(
                "sentiment_request_errors_total",
                "Rejected or failed requests, by error kind",
                &["kind"]
            )
            .expect("Failed to register request_errors_total"),

            batch_size: register_histogram!(
                "sentiment_batch_size",
                "Number of texts per batch request",
                BATCH_SIZE_BUCKETS.to_vec()
            )
            .expect("Failed to register batch_size"),

            model_info: register_gauge_vec!(
                "sentiment_model_info",
                "Information about the currently loaded model",
                &["model_name", "version"]
            )
            .expect("Failed to register model_info"),
        }
    }
}

/// Service metrics for Prometheus exposition
///
/// This is a lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct ServiceMetrics {
    _private: (),
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(ServiceMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &ServiceMetricsInner {
        GLOBAL_METRICS.get_or_init(ServiceMetricsInner::new)
    }

    pub fn observe_request(&self, method: &str, route: &str, status: u16, duration_secs: f64) {
        self.inner()
            .request_duration_seconds
            .with_label_values(&[method, route, &status.to_string()])
            .observe(duration_secs);
    }

    pub fn inc_prediction(&self, label: &str) {
        self.inner().predictions_total.with_label_values(&[label]).inc();
    }

    pub fn inc_error(&self, kind: &str) {
        self.inner().request_errors_total.with_label_values(&[kind]).inc();
    }

    pub fn observe_batch_size(&self, size: usize) {
        self.inner().batch_size.observe(size as f64);
    }

    /// Replace the model info series
    pub fn set_model_info(&self, model_name: &str, version: &str) {
        self.inner().model_info.reset();
        self.inner()
            .model_info
            .with_label_values(&[model_name, version])
            .set(1.0);
    }
}

/// Request summary written by the HTTP logging middleware
#[derive(Debug, Clone)]
pub struct RequestLog<'a> {
    pub request_id: &'a str,
    pub method: &'a str,
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub status: u16,
    pub duration_ms: f64,
    pub user_agent: Option<&'a str>,
}

/// Structured logger for service events
///
/// Provides consistent JSON-formatted logging for requests, predictions,
/// and model lifecycle events.
#[derive(Clone)]
pub struct StructuredLogger {
    service: String,
}

impl StructuredLogger {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    /// Log one served HTTP request
    pub fn log_request(&self, request: &RequestLog<'_>) {
        let duration_ms = (request.duration_ms * 100.0).round() / 100.0;
        if request.status >= 500 {
            warn!(
                event = "request",
                service = %self.service,
                request_id = %request.request_id,
                method = %request.method,
                path = %request.path,
                query = ?request.query,
                status = request.status,
                duration_ms = duration_ms,
                user_agent = ?request.user_agent,
                "Request failed"
            );
        } else {
            info!(
                event = "request",
                service = %self.service,
                request_id = %request.request_id,
                method = %request.method,
                path = %request.path,
                query = ?request.query,
                status = request.status,
                duration_ms = duration_ms,
                user_agent = ?request.user_agent,
                "Request completed"
            );
        }
    }

    /// Log a served prediction. Only the text length is recorded, never the text.
    pub fn log_prediction(
        &self,
        label: &str,
        score: f64,
        text_chars: usize,
        top_tokens: &[String],
    ) {
        info!(
            event = "prediction_served",
            service = %self.service,
            label = %label,
            score = score,
            text_chars = text_chars,
            top_tokens = ?top_tokens,
            "Served prediction"
        );
    }

    /// Log a served batch
    pub fn log_batch(&self, size: usize) {
        info!(
            event = "prediction_served",
            service = %self.service,
            batch_size = size,
            "Served batch prediction"
        );
    }

    /// Log service startup
    pub fn log_startup(&self, version: &str, model_path: &str, auth_enabled: bool) {
        info!(
            event = "service_started",
            service = %self.service,
            service_version = %version,
            model_path = %model_path,
            auth_enabled = auth_enabled,
            "Sentiment service started"
        );
        if !auth_enabled {
            warn!(
                event = "auth_disabled",
                service = %self.service,
                "API_KEY is empty; prediction endpoints accept unauthenticated requests"
            );
        }
    }

    /// Log service shutdown
    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            service = %self.service,
            reason = %reason,
            "Sentiment service shutting down"
        );
    }

    /// Log a successful artifact load
    pub fn log_model_loaded(&self, model_name: &str, version: &str, capability: &str) {
        info!(
            event = "model_loaded",
            service = %self.service,
            model_name = %model_name,
            model_version = %version,
            capability = %capability,
            "Model artifact ready"
        );
    }

    /// Log a failed artifact load
    pub fn log_model_load_failed(&self, model_path: &str, reason: &str) {
        error!(
            event = "model_load_failed",
            service = %self.service,
            model_path = %model_path,
            reason = %reason,
            "Model artifact unavailable; predictions will fail until it is in place"
        );
    }
}
