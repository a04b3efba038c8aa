//! Request and response bodies of the prediction API

use crate::artifact::ModelMetrics;
use serde::{Deserialize, Serialize};

/// Single prediction input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub text: String,
}

/// Batch prediction input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequest {
    pub texts: Vec<String>,
}

/// Salient tokens behind a prediction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub top_tokens: Vec<String>,
}

/// Single prediction output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub label: String,
    pub score: f64,
    pub explain: Explanation,
}

/// One element of a batch prediction output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchItem {
    pub label: String,
    pub score: f64,
}

/// Artifact provenance reported by `/meta`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub model_name: String,
    pub version: String,
    pub trained_on: String,
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<ModelMetrics>,
}
