//! Inference over a cached scoring object
//!
//! Probabilistic scorers report the probability of their top class. Margin
//! scorers have no probabilities, so confidence is `sigmoid(|margin|)`, which
//! always lands in `[0.5, 1)`.

use crate::scoring::{argmax, sigmoid, ScoringObject, TfidfVectorizer};
use tracing::warn;

/// Maximum salient tokens in an explanation
pub const MAX_EXPLAIN_TOKENS: usize = 3;

/// Label and unrounded confidence
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub label: String,
    pub score: f64,
}

/// Classification plus the tokens that weighed most in the input
#[derive(Debug, Clone, PartialEq)]
pub struct Inference {
    pub label: String,
    pub score: f64,
    pub top_tokens: Vec<String>,
}

/// Stateless scorer; inputs are assumed to be validated already
#[derive(Debug, Clone)]
pub struct InferenceEngine {
    max_explain_tokens: usize,
}

impl Default for InferenceEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl InferenceEngine {
    pub fn new() -> Self {
        Self {
            max_explain_tokens: MAX_EXPLAIN_TOKENS,
        }
    }

    /// Label, confidence, and explanation for one text
    pub fn score(&self, scoring: &ScoringObject, text: &str) -> Inference {
        let Classification { label, score } = self.classify(scoring, text);
        Inference {
            label,
            score,
            top_tokens: self.explain(scoring, text),
        }
    }

    /// Label and confidence only
    pub fn classify(&self, scoring: &ScoringObject, text: &str) -> Classification {
        match scoring {
            ScoringObject::Probabilistic(scorer) => {
                let probabilities = scorer.predict_proba(text);
                let best = argmax(&probabilities);
                let label = match scorer.classes().get(best) {
                    Some(label) => label.clone(),
                    None => {
                        warn!(
                            index = best,
                            classes = scorer.classes().len(),
                            "Probability index has no class name"
                        );
                        best.to_string()
                    }
                };
                Classification {
                    label,
                    score: probabilities.get(best).copied().unwrap_or(0.0),
                }
            }
            ScoringObject::Margin(scorer) => Classification {
                label: scorer.predict_label(text),
                score: sigmoid(scorer.decision_margin(text).abs()),
            },
        }
    }

    /// Highest-weighted TF-IDF features in the text; empty when the
    /// pipeline has no TF-IDF stage
    pub fn explain(&self, scoring: &ScoringObject, text: &str) -> Vec<String> {
        match scoring.tfidf() {
            Some(vectorizer) => top_tokens(vectorizer, text, self.max_explain_tokens),
            None => Vec::new(),
        }
    }
}

/// Up to `limit` feature names by descending weight; equal weights keep
/// feature-index order
pub fn top_tokens(vectorizer: &TfidfVectorizer, text: &str, limit: usize) -> Vec<String> {
    let mut weights: Vec<(usize, f64)> = vectorizer
        .transform(text)
        .into_iter()
        .filter(|(_, weight)| *weight > 0.0)
        .collect();
    weights.sort_by(|a, b| b.1.total_cmp(&a.1));

    weights
        .into_iter()
        .filter_map(|(index, _)| vectorizer.feature_name(index).map(str::to_string))
        .take(limit)
        .collect()
}
