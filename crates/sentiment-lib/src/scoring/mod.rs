//! Scoring objects
//!
//! A trained artifact exposes exactly one scoring capability: a probability
//! distribution over labels, or a signed decision margin with a hard label.
//! The capability is resolved once when the artifact is loaded and carried as
//! a [`ScoringObject`] variant, so the inference path never probes for it.

mod features;
mod linear;

pub use features::{
    FeatureStage, FeatureStageSpec, HashingParams, HashingVectorizer, Norm, TfidfParams,
    TfidfVectorizer,
};
pub use linear::{argmax, sigmoid, ClassifierSpec, LinearModel, LinearParams};

use crate::error::ArtifactError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Feature weights as `(feature index, weight)` pairs sorted by index
pub type SparseVector = Vec<(usize, f64)>;

/// Capabilities shared by every scoring object
pub trait Scorer: Send + Sync {
    /// Known class names, in model order
    fn classes(&self) -> &[String];

    /// TF-IDF stage used to explain predictions, if the pipeline has one
    fn tfidf(&self) -> Option<&TfidfVectorizer> {
        None
    }
}

/// Scorer that yields a probability distribution over its classes
pub trait ProbabilisticScorer: Scorer {
    /// Probabilities index-aligned with [`Scorer::classes`]
    fn predict_proba(&self, text: &str) -> Vec<f64>;
}

/// Scorer that yields only a decision margin and a hard label
pub trait MarginScorer: Scorer {
    fn decision_margin(&self, text: &str) -> f64;

    fn predict_label(&self, text: &str) -> String;
}

/// A scoring object tagged with its capability
#[derive(Clone)]
pub enum ScoringObject {
    Probabilistic(Arc<dyn ProbabilisticScorer>),
    Margin(Arc<dyn MarginScorer>),
}

impl ScoringObject {
    pub fn classes(&self) -> &[String] {
        match self {
            Self::Probabilistic(scorer) => scorer.classes(),
            Self::Margin(scorer) => scorer.classes(),
        }
    }

    pub fn tfidf(&self) -> Option<&TfidfVectorizer> {
        match self {
            Self::Probabilistic(scorer) => scorer.tfidf(),
            Self::Margin(scorer) => scorer.tfidf(),
        }
    }

    /// Capability name, for logs and readiness output
    pub fn capability(&self) -> &'static str {
        match self {
            Self::Probabilistic(_) => "probabilistic",
            Self::Margin(_) => "margin",
        }
    }
}

impl std::fmt::Debug for ScoringObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoringObject")
            .field("capability", &self.capability())
            .field("classes", &self.classes())
            .finish()
    }
}

/// Serialized pipeline: a feature stage followed by a linear estimator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSpec {
    pub features: FeatureStageSpec,
    pub classifier: ClassifierSpec,
}

/// Feature stage plus linear model
#[derive(Debug, Clone)]
pub struct TextPipeline {
    features: FeatureStage,
    model: LinearModel,
}

impl TextPipeline {
    fn new(features: FeatureStageSpec, params: LinearParams) -> Result<Self, ArtifactError> {
        let features = FeatureStage::from_spec(features)?;
        let model = LinearModel::from_params(params, features.dimension())?;
        Ok(Self { features, model })
    }
}

impl Scorer for TextPipeline {
    fn classes(&self) -> &[String] {
        self.model.classes()
    }

    fn tfidf(&self) -> Option<&TfidfVectorizer> {
        self.features.tfidf()
    }
}

impl ProbabilisticScorer for TextPipeline {
    fn predict_proba(&self, text: &str) -> Vec<f64> {
        self.model.predict_proba(&self.features.transform(text))
    }
}

impl MarginScorer for TextPipeline {
    fn decision_margin(&self, text: &str) -> f64 {
        self.model.margin(&self.features.transform(text)).0
    }

    fn predict_label(&self, text: &str) -> String {
        self.model.margin(&self.features.transform(text)).1.to_string()
    }
}

impl PipelineSpec {
    /// Validate the pipeline and resolve its scoring capability
    pub fn into_scoring_object(self) -> Result<ScoringObject, ArtifactError> {
        match self.classifier {
            ClassifierSpec::LogisticRegression(params) => Ok(ScoringObject::Probabilistic(
                Arc::new(TextPipeline::new(self.features, params)?),
            )),
            ClassifierSpec::LinearSvc(params) => Ok(ScoringObject::Margin(Arc::new(
                TextPipeline::new(self.features, params)?,
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(kind: &str) -> PipelineSpec {
        serde_json::from_value(serde_json::json!({
            "features": {"kind": "tfidf", "vocabulary": ["bad", "good"], "idf": [1.0, 1.0]},
            "classifier": {
                "kind": kind,
                "classes": ["negative", "positive"],
                "coef": [[-2.0, 2.0]],
                "intercept": [0.0]
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_logistic_regression_resolves_to_probabilistic() {
        let scoring = spec("logistic_regression").into_scoring_object().unwrap();
        assert_eq!(scoring.capability(), "probabilistic");
        assert_eq!(scoring.classes(), ["negative", "positive"]);
        assert!(scoring.tfidf().is_some());
    }

    #[test]
    fn test_linear_svc_resolves_to_margin() {
        let scoring = spec("linear_svc").into_scoring_object().unwrap();
        assert_eq!(scoring.capability(), "margin");

        let ScoringObject::Margin(scorer) = scoring else {
            panic!("expected margin scorer");
        };
        assert!(scorer.decision_margin("good") > 0.0);
        assert_eq!(scorer.predict_label("good"), "positive");
        assert_eq!(scorer.predict_label("bad"), "negative");
    }

    #[test]
    fn test_hashing_pipeline_has_no_tfidf() {
        let spec: PipelineSpec = serde_json::from_value(serde_json::json!({
            "features": {"kind": "hashing", "n_features": 4},
            "classifier": {
                "kind": "logistic_regression",
                "classes": ["negative", "positive"],
                "coef": [[0.1, 0.2, 0.3, 0.4]],
                "intercept": [0.0]
            }
        }))
        .unwrap();

        let scoring = spec.into_scoring_object().unwrap();
        assert!(scoring.tfidf().is_none());
    }

    #[test]
    fn test_width_mismatch_is_invalid() {
        let spec: PipelineSpec = serde_json::from_value(serde_json::json!({
            "features": {"kind": "tfidf", "vocabulary": ["good"], "idf": [1.0]},
            "classifier": {
                "kind": "linear_svc",
                "classes": ["negative", "positive"],
                "coef": [[1.0, 2.0]],
                "intercept": [0.0]
            }
        }))
        .unwrap();

        assert!(matches!(
            spec.into_scoring_object(),
            Err(ArtifactError::Invalid(_))
        ));
    }
}
