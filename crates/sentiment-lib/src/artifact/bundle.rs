//! On-disk artifact format and metadata

use crate::error::ArtifactError;
use crate::scoring::{PipelineSpec, ScoringObject};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Training metrics recorded alongside the model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub f1_macro: Option<f64>,
}

/// Dataset split used during training
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_train: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_test: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub random_state: Option<u64>,
}

/// Artifact provenance. Every field is optional; the metadata reporter
/// supplies defaults for missing values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trained_on: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<ModelMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<TrainingData>,
}

/// Wrapped artifact layout: `{"pipeline": ..., "meta": ...}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactBundle {
    pub pipeline: PipelineSpec,
    #[serde(default)]
    pub meta: Metadata,
}

/// Which layout the artifact file used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactFormat {
    Bundle,
    /// Bare pipeline without a metadata wrapper
    Legacy,
}

/// A loaded, validated, immutable model artifact
#[derive(Debug, Clone)]
pub struct ModelArtifact {
    pub scoring: ScoringObject,
    pub metadata: Metadata,
    pub format: ArtifactFormat,
    /// SHA-256 of the artifact bytes, lowercase hex
    pub checksum: String,
    pub loaded_at: i64,
}

impl ModelArtifact {
    /// Parse artifact bytes in either the bundle or the legacy layout
    pub fn from_slice(path: &Path, bytes: &[u8]) -> Result<Self, ArtifactError> {
        let parse_error = |source| ArtifactError::Parse {
            path: path.to_path_buf(),
            source,
        };

        let value: serde_json::Value = serde_json::from_slice(bytes).map_err(parse_error)?;
        let is_bundle = value
            .as_object()
            .map(|object| object.contains_key("pipeline"))
            .unwrap_or(false);

        let (pipeline, metadata, format) = if is_bundle {
            let bundle: ArtifactBundle = serde_json::from_value(value).map_err(parse_error)?;
            (bundle.pipeline, bundle.meta, ArtifactFormat::Bundle)
        } else {
            let pipeline: PipelineSpec = serde_json::from_value(value).map_err(parse_error)?;
            (pipeline, Metadata::default(), ArtifactFormat::Legacy)
        };

        Ok(Self {
            scoring: pipeline.into_scoring_object()?,
            metadata,
            format,
            checksum: compute_checksum(bytes),
            loaded_at: chrono::Utc::now().timestamp(),
        })
    }
}

/// SHA-256 of `data` as lowercase hex
pub fn compute_checksum(data: &[u8]) -> String {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

pub fn normalise_hex(value: &str) -> String {
    value.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pipeline() -> serde_json::Value {
        json!({
            "features": {"kind": "tfidf", "vocabulary": ["bad", "good"], "idf": [1.0, 1.0]},
            "classifier": {
                "kind": "logistic_regression",
                "classes": ["negative", "positive"],
                "coef": [[-1.0, 1.0]],
                "intercept": [0.0]
            }
        })
    }

    #[test]
    fn test_bundle_with_metadata() {
        let bytes = serde_json::to_vec(&json!({
            "pipeline": pipeline(),
            "meta": {
                "model_name": "LogisticRegression + TFIDF",
                "version": "1.0.0",
                "trained_on": "tiny_sentiment_demo",
                "labels": ["negative", "positive"],
                "metrics": {"accuracy": 0.9, "f1_macro": 0.89},
                "unknown_key": true
            }
        }))
        .unwrap();

        let artifact = ModelArtifact::from_slice(Path::new("a.json"), &bytes).unwrap();
        assert_eq!(artifact.format, ArtifactFormat::Bundle);
        assert_eq!(artifact.metadata.version.as_deref(), Some("1.0.0"));
        assert_eq!(
            artifact.metadata.metrics.as_ref().and_then(|m| m.accuracy),
            Some(0.9)
        );
        assert_eq!(artifact.checksum, compute_checksum(&bytes));
    }

    #[test]
    fn test_bundle_without_meta_defaults() {
        let bytes = serde_json::to_vec(&json!({"pipeline": pipeline()})).unwrap();
        let artifact = ModelArtifact::from_slice(Path::new("a.json"), &bytes).unwrap();
        assert_eq!(artifact.format, ArtifactFormat::Bundle);
        assert_eq!(artifact.metadata, Metadata::default());
    }

    #[test]
    fn test_legacy_bare_pipeline() {
        let bytes = serde_json::to_vec(&pipeline()).unwrap();
        let artifact = ModelArtifact::from_slice(Path::new("a.json"), &bytes).unwrap();
        assert_eq!(artifact.format, ArtifactFormat::Legacy);
        assert_eq!(artifact.metadata, Metadata::default());
        assert_eq!(artifact.scoring.capability(), "probabilistic");
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let result = ModelArtifact::from_slice(Path::new("a.json"), b"not json");
        assert!(matches!(result, Err(ArtifactError::Parse { .. })));
    }

    #[test]
    fn test_unknown_classifier_is_parse_error() {
        let bytes = serde_json::to_vec(&json!({
            "features": {"kind": "tfidf", "vocabulary": ["good"], "idf": [1.0]},
            "classifier": {"kind": "random_forest", "classes": [], "coef": [], "intercept": []}
        }))
        .unwrap();
        let result = ModelArtifact::from_slice(Path::new("a.json"), &bytes);
        assert!(matches!(result, Err(ArtifactError::Parse { .. })));
    }

    #[test]
    fn test_checksum_is_lowercase_hex() {
        let checksum = compute_checksum(b"abc");
        assert_eq!(
            checksum,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_normalise_hex_lowercases_and_trims() {
        assert_eq!(normalise_hex(" ABCDEF "), "abcdef");
    }
}
