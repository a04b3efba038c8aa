//! Request validation
//!
//! Field-level constraints checked before any inference work. Lengths count
//! Unicode scalar values, not bytes.

use crate::error::ValidationError;

/// Default maximum characters per text
pub const DEFAULT_MAX_TEXT_LEN: usize = 10_000;

/// Default maximum texts per batch
pub const DEFAULT_MAX_BATCH: usize = 200;

/// Configured request bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_text_len: usize,
    pub max_batch: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_text_len: DEFAULT_MAX_TEXT_LEN,
            max_batch: DEFAULT_MAX_BATCH,
        }
    }
}

/// Validates single and batch prediction inputs
#[derive(Debug, Clone, Default)]
pub struct RequestValidator {
    limits: Limits,
}

impl RequestValidator {
    pub fn new(limits: Limits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// Text must hold 1..=max_text_len characters and not be blank
    pub fn validate_text(&self, text: &str) -> Result<(), ValidationError> {
        if text.is_empty() {
            return Err(ValidationError::TextEmpty);
        }

        let len = text.chars().count();
        if len > self.limits.max_text_len {
            return Err(ValidationError::TextTooLong {
                len,
                max: self.limits.max_text_len,
            });
        }

        if text.trim().is_empty() {
            return Err(ValidationError::TextBlank);
        }

        Ok(())
    }

    /// Batch must hold 1..=max_batch texts, each valid on its own.
    /// The first bad element fails the whole batch.
    pub fn validate_batch(&self, texts: &[String]) -> Result<(), ValidationError> {
        if texts.is_empty() {
            return Err(ValidationError::BatchEmpty);
        }
        if texts.len() > self.limits.max_batch {
            return Err(ValidationError::BatchTooLarge {
                len: texts.len(),
                max: self.limits.max_batch,
            });
        }

        for (index, text) in texts.iter().enumerate() {
            self.validate_text(text)
                .map_err(|source| ValidationError::BatchItem {
                    index,
                    source: Box::new(source),
                })?;
        }

        Ok(())
    }
}
