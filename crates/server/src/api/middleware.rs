//! Request middleware: payload pre-filter and request logging

use super::error::{ApiError, ErrorKind};
use super::AppState;
use axum::{
    body::Body,
    extract::{MatchedPath, State},
    http::{header, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use sentiment_lib::{RequestLog, ServiceError};
use std::sync::Arc;
use std::time::Instant;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Declared size of the request body, if the header is present and well formed
fn declared_length(request: &Request<Body>) -> Option<usize> {
    request
        .headers()
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Reject requests whose `Content-Length` exceeds `max_body_bytes`.
///
/// A missing or unparsable header lets the request through; field limits
/// still apply downstream.
pub async fn body_limit(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if let Some(length) = declared_length(&request) {
        if length > state.max_body_bytes {
            return ApiError::from(ServiceError::PayloadTooLarge {
                limit: state.max_body_bytes,
            })
            .into_response();
        }
    }
    next.run(request).await
}

/// Log every request, record latency and error metrics, echo `X-Request-ID`
pub async fn request_logging(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();

    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string());
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let query = request.uri().query().map(str::to_string);
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let user_agent = request
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let mut response = next.run(request).await;

    let elapsed = start.elapsed();
    let status = response.status().as_u16();

    state
        .metrics
        .observe_request(&method, &route, status, elapsed.as_secs_f64());
    if let Some(ErrorKind(kind)) = response.extensions().get::<ErrorKind>() {
        state.metrics.inc_error(kind);
    }

    state.logger.log_request(&RequestLog {
        request_id: &request_id,
        method: &method,
        path: &path,
        query: query.as_deref(),
        status,
        duration_ms: elapsed.as_secs_f64() * 1000.0,
        user_agent: user_agent.as_deref(),
    });

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
