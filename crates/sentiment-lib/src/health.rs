//! Liveness and readiness reporting
//!
//! Liveness is static. Readiness depends on whether the model artifact can
//! be served.

use crate::artifact::ArtifactCache;
use serde::{Deserialize, Serialize};

/// Liveness body: always `{"status":"ok"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

/// Readiness body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capability: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loaded_at: Option<i64>,
}

impl ReadinessResponse {
    /// Check readiness, loading the artifact if it is not cached yet
    pub fn probe(cache: &ArtifactCache) -> Self {
        match cache.ensure_loaded() {
            Ok(artifact) => Self {
                ready: true,
                reason: None,
                model_version: artifact.metadata.version.clone(),
                capability: Some(artifact.scoring.capability().to_string()),
                loaded_at: Some(artifact.loaded_at),
            },
            Err(err) => Self {
                ready: false,
                reason: Some(err.to_string()),
                model_version: None,
                capability: None,
                loaded_at: None,
            },
        }
    }
}
