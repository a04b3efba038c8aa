//! Response assembly
//!
//! Scores are clamped to `[0, 1]` and rounded to six decimals so identical
//! inputs against the same artifact serialize identically.

use crate::inference::{Classification, Inference};
use crate::models::{BatchItem, Explanation, PredictResponse};

/// Decimal places kept in reported scores
pub const SCORE_DECIMALS: i32 = 6;

/// Clamp into `[0, 1]` and round to [`SCORE_DECIMALS`] places
pub fn round_score(score: f64) -> f64 {
    if score.is_nan() {
        return 0.0;
    }
    let factor = 10f64.powi(SCORE_DECIMALS);
    (score.clamp(0.0, 1.0) * factor).round() / factor
}

/// Single prediction body, explanation included
pub fn assemble_single(inference: Inference) -> PredictResponse {
    PredictResponse {
        label: inference.label,
        score: round_score(inference.score),
        explain: Explanation {
            top_tokens: inference.top_tokens,
        },
    }
}

/// Batch body, index-aligned with the input; explanations are omitted
pub fn assemble_batch(results: Vec<Classification>) -> Vec<BatchItem> {
    results
        .into_iter()
        .map(|result| BatchItem {
            label: result.label,
            score: round_score(result.score),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_score_six_decimals() {
        assert_eq!(round_score(0.123_456_789), 0.123457);
        assert_eq!(round_score(0.982_013_790_037_908_4), 0.982014);
    }

    #[test]
    fn test_round_score_clamps() {
        assert_eq!(round_score(1.000_000_1), 1.0);
        assert_eq!(round_score(-0.2), 0.0);
        assert_eq!(round_score(f64::NAN), 0.0);
    }

    #[test]
    fn test_single_keeps_tokens() {
        let response = assemble_single(Inference {
            label: "positive".into(),
            score: 0.731_058_578_6,
            top_tokens: vec!["love".into()],
        });

        assert_eq!(response.score, 0.731059);
        assert_eq!(response.explain.top_tokens, vec!["love"]);

        let body = serde_json::to_value(&response).unwrap();
        assert_eq!(body["explain"]["top_tokens"][0], "love");
    }

    #[test]
    fn test_batch_preserves_order_without_explanations() {
        let items = assemble_batch(vec![
            Classification {
                label: "positive".into(),
                score: 0.9,
            },
            Classification {
                label: "negative".into(),
                score: 0.8,
            },
        ]);

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].label, "positive");
        assert_eq!(items[1].label, "negative");

        let body = serde_json::to_value(&items).unwrap();
        assert!(body[0].get("explain").is_none());
    }
}
