//! HTTP mapping of service errors
//!
//! Bodies are `{"detail": "..."}`, plus `"field"` for validation failures.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sentiment_lib::{ServiceError, ValidationError};
use serde::{Deserialize, Serialize};

/// Error kind attached to error responses so middleware can count them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorKind(pub &'static str);

/// JSON error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub kind: &'static str,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, kind: &'static str, detail: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            body: ErrorBody {
                detail: detail.into(),
                field: None,
            },
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.body.field = Some(field.into());
        self
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", detail)
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let kind = err.kind();
        match err {
            ServiceError::Unauthorized => {
                Self::new(StatusCode::UNAUTHORIZED, kind, err.to_string())
            }
            ServiceError::Validation(ref validation) => {
                let field = validation.field();
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, kind, err.to_string()).with_field(field)
            }
            ServiceError::PayloadTooLarge { .. } => {
                Self::new(StatusCode::PAYLOAD_TOO_LARGE, kind, err.to_string())
            }
            // Prediction cannot proceed until the artifact is fixed
            ServiceError::Artifact(_) => {
                Self::new(StatusCode::SERVICE_UNAVAILABLE, kind, err.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return Self::new(
                StatusCode::PAYLOAD_TOO_LARGE,
                "payload_too_large",
                rejection.body_text(),
            );
        }
        // Malformed bodies, missing fields and wrong types are all field-level failures
        ServiceError::from(ValidationError::Malformed(rejection.body_text())).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.body)).into_response();
        response.extensions_mut().insert(ErrorKind(self.kind));
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(ServiceError::Unauthorized).status,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(ServiceError::PayloadTooLarge { limit: 10 }).status,
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            ApiError::from(ServiceError::Artifact(
                sentiment_lib::ArtifactError::NotFound {
                    path: "missing.json".into()
                }
            ))
            .status,
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_validation_carries_field() {
        let err = ApiError::from(ServiceError::from(ValidationError::TextBlank));
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.body.field.as_deref(), Some("text"));
        assert_eq!(err.body.detail, "text must not be blank");
    }

    #[test]
    fn test_response_tags_error_kind() {
        let response = ApiError::from(ServiceError::Unauthorized).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.extensions().get::<ErrorKind>(),
            Some(&ErrorKind("unauthorized"))
        );
    }
}
