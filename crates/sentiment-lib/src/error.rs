//! Error taxonomy for the classification service
//!
//! Artifact errors are fatal for prediction until the artifact is fixed,
//! validation and auth errors are local to a single request.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while locating, verifying, or parsing the model artifact
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("model artifact not found at {path}; run the offline training job to produce it")]
    NotFound { path: PathBuf },

    #[error("failed to read model artifact at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("model artifact at {path} expected SHA-256 {expected} but found {actual}")]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("failed to parse model artifact at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid model artifact: {0}")]
    Invalid(String),
}

impl ArtifactError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}

/// A broken request-field constraint
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("text must contain at least 1 character")]
    TextEmpty,

    #[error("text must not be blank")]
    TextBlank,

    #[error("text has {len} characters, maximum is {max}")]
    TextTooLong { len: usize, max: usize },

    #[error("texts must contain at least 1 item")]
    BatchEmpty,

    #[error("texts has {len} items, maximum is {max}")]
    BatchTooLarge { len: usize, max: usize },

    #[error("texts[{index}]: {source}")]
    BatchItem {
        index: usize,
        #[source]
        source: Box<ValidationError>,
    },

    #[error("{0}")]
    Malformed(String),
}

impl ValidationError {
    /// Name of the request field that broke the constraint
    pub fn field(&self) -> String {
        match self {
            Self::TextEmpty | Self::TextBlank | Self::TextTooLong { .. } => "text".to_string(),
            Self::BatchEmpty | Self::BatchTooLarge { .. } => "texts".to_string(),
            Self::BatchItem { index, .. } => format!("texts[{}]", index),
            Self::Malformed(_) => "body".to_string(),
        }
    }
}

/// Request-level failures surfaced by the serving pipeline
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid or missing API key")]
    Unauthorized,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Payload too large (>{limit} bytes)")]
    PayloadTooLarge { limit: usize },

    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

impl ServiceError {
    /// Short machine-readable kind, used as a metrics label
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::Validation(_) => "validation",
            Self::PayloadTooLarge { .. } => "payload_too_large",
            Self::Artifact(_) => "artifact",
        }
    }
}

pub type Result<T, E = ServiceError> = std::result::Result<T, E>;
