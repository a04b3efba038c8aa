//! Validate → load → score → assemble
//!
//! Authentication and payload-size checks happen in front of this, at the
//! HTTP boundary.

use crate::artifact::ArtifactCache;
use crate::error::ServiceError;
use crate::health::ReadinessResponse;
use crate::inference::InferenceEngine;
use crate::metadata::describe;
use crate::models::{BatchItem, ModelInfo, PredictResponse};
use crate::response::{assemble_batch, assemble_single};
use crate::validation::RequestValidator;

#[derive(Debug)]
pub struct ClassificationService {
    cache: ArtifactCache,
    validator: RequestValidator,
    engine: InferenceEngine,
}

impl ClassificationService {
    pub fn new(cache: ArtifactCache, validator: RequestValidator) -> Self {
        Self {
            cache,
            validator,
            engine: InferenceEngine::new(),
        }
    }

    pub fn cache(&self) -> &ArtifactCache {
        &self.cache
    }

    pub fn predict(&self, text: &str) -> Result<PredictResponse, ServiceError> {
        self.validator.validate_text(text)?;
        let artifact = self.cache.ensure_loaded()?;
        Ok(assemble_single(self.engine.score(&artifact.scoring, text)))
    }

    /// Scores every text or none; results are index-aligned with `texts`
    pub fn predict_batch(&self, texts: &[String]) -> Result<Vec<BatchItem>, ServiceError> {
        self.validator.validate_batch(texts)?;
        let artifact = self.cache.ensure_loaded()?;
        let results = texts
            .iter()
            .map(|text| self.engine.classify(&artifact.scoring, text))
            .collect();
        Ok(assemble_batch(results))
    }

    pub fn describe(&self) -> Result<ModelInfo, ServiceError> {
        Ok(describe(self.cache.ensure_loaded()?))
    }

    pub fn readiness(&self) -> ReadinessResponse {
        ReadinessResponse::probe(&self.cache)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ArtifactSource;
    use crate::error::{ArtifactError, ValidationError};
    use crate::validation::Limits;

    const ARTIFACT: &str = r#"{
        "pipeline": {
            "features": {
                "kind": "tfidf",
                "vocabulary": ["love", "terrible", "product", "this"],
                "idf": [1.5, 1.5, 1.2, 1.0]
            },
            "classifier": {
                "kind": "logistic_regression",
                "classes": ["negative", "positive"],
                "coef": [[3.0, -3.0, -0.2, 0.1]],
                "intercept": [0.0]
            }
        },
        "meta": {"model_name": "test model", "version": "1.2.3"}
    }"#;

    fn service_with(dir: &tempfile::TempDir, limits: Limits) -> ClassificationService {
        let path = dir.path().join("pipeline.json");
        std::fs::write(&path, ARTIFACT).unwrap();
        ClassificationService::new(
            ArtifactCache::new(ArtifactSource::new(path)),
            RequestValidator::new(limits),
        )
    }

    #[test]
    fn test_predict_happy_path() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(&dir, Limits::default());

        let response = service.predict("i love this").unwrap();
        assert_eq!(response.label, "positive");
        assert!((0.0..=1.0).contains(&response.score));
        assert_eq!(response.explain.top_tokens[0], "love");
    }

    #[test]
    fn test_validation_runs_before_loading() {
        let dir = tempfile::tempdir().unwrap();
        let service = ClassificationService::new(
            ArtifactCache::new(ArtifactSource::new(dir.path().join("missing.json"))),
            RequestValidator::default(),
        );

        assert!(matches!(
            service.predict("  "),
            Err(ServiceError::Validation(ValidationError::TextBlank))
        ));
        assert_eq!(service.cache().load_attempts(), 0);

        assert!(matches!(
            service.predict("fine"),
            Err(ServiceError::Artifact(ArtifactError::NotFound { .. }))
        ));
    }

    #[test]
    fn test_batch_is_index_aligned() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(&dir, Limits::default());

        let texts = vec!["i love this".to_string(), "terrible product".to_string()];
        let items = service.predict_batch(&texts).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].label, "positive");
        assert_eq!(items[1].label, "negative");
    }

    #[test]
    fn test_batch_over_limit_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(
            &dir,
            Limits {
                max_text_len: 100,
                max_batch: 1,
            },
        );

        let texts = vec!["one".to_string(), "two".to_string()];
        assert!(matches!(
            service.predict_batch(&texts),
            Err(ServiceError::Validation(ValidationError::BatchTooLarge { .. }))
        ));
    }

    #[test]
    fn test_repeated_predictions_identical() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(&dir, Limits::default());

        let first = service.predict("terrible product").unwrap();
        let second = service.predict("terrible product").unwrap();
        assert_eq!(first, second);
        assert_eq!(service.cache().load_attempts(), 1);
    }

    #[test]
    fn test_describe_uses_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(&dir, Limits::default());

        let info = service.describe().unwrap();
        assert_eq!(info.model_name, "test model");
        assert_eq!(info.version, "1.2.3");
        assert_eq!(info.trained_on, "unknown");
        assert_eq!(info.labels, vec!["negative", "positive"]);
    }
}
