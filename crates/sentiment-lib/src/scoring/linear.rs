//! Linear estimators over sparse feature vectors

use super::SparseVector;
use crate::error::ArtifactError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Serialized form of an estimator; the kind decides the scoring capability
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierSpec {
    /// Produces a probability distribution over classes
    LogisticRegression(LinearParams),
    /// Produces a signed margin and a hard label only
    LinearSvc(LinearParams),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearParams {
    pub classes: Vec<String>,
    pub coef: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
}

/// Validated weight matrix shared by both estimator kinds.
///
/// Binary models carry a single row scoring `classes[1]` against `classes[0]`;
/// multiclass models carry one row per class.
#[derive(Debug, Clone)]
pub struct LinearModel {
    classes: Vec<String>,
    coef: Vec<Vec<f64>>,
    intercept: Vec<f64>,
}

impl LinearModel {
    pub fn from_params(params: LinearParams, dimension: usize) -> Result<Self, ArtifactError> {
        let LinearParams {
            classes,
            coef,
            intercept,
        } = params;

        if classes.len() < 2 {
            return Err(ArtifactError::invalid(format!(
                "classifier needs at least 2 classes, found {}",
                classes.len()
            )));
        }
        let unique: HashSet<&String> = classes.iter().collect();
        if unique.len() != classes.len() {
            return Err(ArtifactError::invalid("classifier classes must be unique"));
        }

        let expected_rows = if classes.len() == 2 { 1 } else { classes.len() };
        if coef.len() != expected_rows {
            return Err(ArtifactError::invalid(format!(
                "classifier with {} classes needs {} coefficient rows, found {}",
                classes.len(),
                expected_rows,
                coef.len()
            )));
        }
        if intercept.len() != expected_rows {
            return Err(ArtifactError::invalid(format!(
                "classifier needs {} intercepts, found {}",
                expected_rows,
                intercept.len()
            )));
        }
        if let Some(row) = coef.iter().find(|row| row.len() != dimension) {
            return Err(ArtifactError::invalid(format!(
                "coefficient row has {} weights but the feature stage produces {}",
                row.len(),
                dimension
            )));
        }
        let all_finite = coef.iter().flatten().chain(intercept.iter()).all(|w| w.is_finite());
        if !all_finite {
            return Err(ArtifactError::invalid("classifier weights must be finite"));
        }

        Ok(Self {
            classes,
            coef,
            intercept,
        })
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    fn is_binary(&self) -> bool {
        self.coef.len() == 1
    }

    /// Raw decision value per coefficient row
    pub fn decision_function(&self, features: &SparseVector) -> Vec<f64> {
        self.coef
            .iter()
            .zip(&self.intercept)
            .map(|(row, bias)| {
                features
                    .iter()
                    .filter_map(|(index, weight)| row.get(*index).map(|w| w * weight))
                    .sum::<f64>()
                    + bias
            })
            .collect()
    }

    /// Class probabilities, index-aligned with `classes()`
    pub fn predict_proba(&self, features: &SparseVector) -> Vec<f64> {
        let scores = self.decision_function(features);
        if self.is_binary() {
            let positive = sigmoid(scores[0]);
            vec![1.0 - positive, positive]
        } else {
            softmax(&scores)
        }
    }

    /// Signed margin of the winning class and its label
    pub fn margin(&self, features: &SparseVector) -> (f64, &str) {
        let scores = self.decision_function(features);
        if self.is_binary() {
            let margin = scores[0];
            let label = if margin > 0.0 {
                &self.classes[1]
            } else {
                &self.classes[0]
            };
            (margin, label)
        } else {
            let best = argmax(&scores);
            (scores[best], &self.classes[best])
        }
    }
}

/// Logistic function
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

/// Index of the first maximum
pub fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, value) in values.iter().enumerate() {
        if *value > values[best] {
            best = i;
        }
    }
    best
}
