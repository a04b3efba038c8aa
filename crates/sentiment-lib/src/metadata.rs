//! Artifact provenance reporting
//!
//! Reads only what the cache already holds; never re-scores or reloads.

use crate::artifact::ModelArtifact;
use crate::models::ModelInfo;

pub const DEFAULT_MODEL_NAME: &str = "tfidf + linear";
pub const DEFAULT_VERSION: &str = "0.0.0";
pub const DEFAULT_TRAINED_ON: &str = "unknown";
pub const DEFAULT_LABELS: [&str; 2] = ["negative", "positive"];

/// Describe an artifact, filling gaps in its metadata.
///
/// Labels come from the metadata, then from the scoring object's classes,
/// then from [`DEFAULT_LABELS`]. An empty list counts as absent.
pub fn describe(artifact: &ModelArtifact) -> ModelInfo {
    let meta = &artifact.metadata;

    let labels = match &meta.labels {
        Some(labels) if !labels.is_empty() => labels.clone(),
        _ if !artifact.scoring.classes().is_empty() => artifact.scoring.classes().to_vec(),
        _ => DEFAULT_LABELS.iter().map(|s| s.to_string()).collect(),
    };

    ModelInfo {
        model_name: meta
            .model_name
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL_NAME.to_string()),
        version: meta
            .version
            .clone()
            .unwrap_or_else(|| DEFAULT_VERSION.to_string()),
        trained_on: meta
            .trained_on
            .clone()
            .unwrap_or_else(|| DEFAULT_TRAINED_ON.to_string()),
        labels,
        metrics: meta.metrics.clone(),
    }
}
