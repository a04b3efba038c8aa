//! Text feature transforms
//!
//! Turns raw text into a sparse feature-weight vector. The TF-IDF stage keeps
//! its vocabulary so weights can be mapped back to feature names; the hashing
//! stage has no vocabulary and therefore cannot explain predictions.

use super::SparseVector;
use crate::error::ArtifactError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Tokens are runs of two or more word characters
static TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("token pattern is a valid regex"));

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Vector normalization applied after weighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    L2,
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

fn default_true() -> bool {
    true
}

fn default_norm() -> Option<Norm> {
    Some(Norm::L2)
}

/// Serialized form of a feature stage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureStageSpec {
    Tfidf(TfidfParams),
    Hashing(HashingParams),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfParams {
    /// Feature name for each column index
    pub vocabulary: Vec<String>,
    pub idf: Vec<f64>,
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    #[serde(default = "default_true")]
    pub lowercase: bool,
    #[serde(default)]
    pub sublinear_tf: bool,
    #[serde(default = "default_norm")]
    pub norm: Option<Norm>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashingParams {
    pub n_features: usize,
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    #[serde(default = "default_true")]
    pub lowercase: bool,
    #[serde(default = "default_norm")]
    pub norm: Option<Norm>,
}

/// Splits text into word n-grams
#[derive(Debug, Clone)]
struct Analyzer {
    min_n: usize,
    max_n: usize,
    lowercase: bool,
}

impl Analyzer {
    fn new(ngram_range: (usize, usize), lowercase: bool) -> Result<Self, ArtifactError> {
        let (min_n, max_n) = ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(ArtifactError::invalid(format!(
                "ngram_range ({}, {}) must satisfy 1 <= min <= max",
                min_n, max_n
            )));
        }
        Ok(Self {
            min_n,
            max_n,
            lowercase,
        })
    }

    fn terms(&self, text: &str) -> Vec<String> {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };
        let tokens: Vec<&str> = TOKEN_PATTERN.find_iter(&text).map(|m| m.as_str()).collect();

        let mut terms = Vec::new();
        for n in self.min_n..=self.max_n.min(tokens.len()) {
            for window in tokens.windows(n) {
                terms.push(window.join(" "));
            }
        }
        terms
    }

    /// Term counts keyed by term, in deterministic order
    fn counts(&self, text: &str) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for term in self.terms(text) {
            *counts.entry(term).or_insert(0) += 1;
        }
        counts
    }
}

fn normalize(vector: &mut SparseVector, norm: Option<Norm>) {
    let total = match norm {
        Some(Norm::L2) => vector.iter().map(|(_, w)| w * w).sum::<f64>().sqrt(),
        Some(Norm::L1) => vector.iter().map(|(_, w)| w.abs()).sum::<f64>(),
        None => return,
    };
    if total > 0.0 {
        for (_, weight) in vector.iter_mut() {
            *weight /= total;
        }
    }
}

/// TF-IDF vectorizer with a fixed vocabulary
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    analyzer: Analyzer,
    feature_names: Vec<String>,
    index: HashMap<String, usize>,
    idf: Vec<f64>,
    sublinear_tf: bool,
    norm: Option<Norm>,
}

impl TfidfVectorizer {
    pub fn from_params(params: TfidfParams) -> Result<Self, ArtifactError> {
        let analyzer = Analyzer::new(params.ngram_range, params.lowercase)?;

        if params.vocabulary.len() != params.idf.len() {
            return Err(ArtifactError::invalid(format!(
                "tfidf vocabulary has {} terms but idf has {} weights",
                params.vocabulary.len(),
                params.idf.len()
            )));
        }
        if params.idf.iter().any(|w| !w.is_finite()) {
            return Err(ArtifactError::invalid("tfidf idf weights must be finite"));
        }

        let mut index = HashMap::with_capacity(params.vocabulary.len());
        for (i, term) in params.vocabulary.iter().enumerate() {
            if index.insert(term.clone(), i).is_some() {
                return Err(ArtifactError::invalid(format!(
                    "tfidf vocabulary contains duplicate term {:?}",
                    term
                )));
            }
        }

        Ok(Self {
            analyzer,
            feature_names: params.vocabulary,
            index,
            idf: params.idf,
            sublinear_tf: params.sublinear_tf,
            norm: params.norm,
        })
    }

    pub fn dimension(&self) -> usize {
        self.feature_names.len()
    }

    pub fn feature_name(&self, index: usize) -> Option<&str> {
        self.feature_names.get(index).map(String::as_str)
    }

    /// Transform text into feature weights sorted by feature index
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut vector: SparseVector = self
            .analyzer
            .counts(text)
            .into_iter()
            .filter_map(|(term, count)| {
                let index = *self.index.get(&term)?;
                let tf = if self.sublinear_tf {
                    1.0 + (count as f64).ln()
                } else {
                    count as f64
                };
                Some((index, tf * self.idf[index]))
            })
            .collect();
        vector.sort_by_key(|(index, _)| *index);
        normalize(&mut vector, self.norm);
        vector
    }
}

/// Stateless hashing vectorizer; term frequencies folded into a fixed width
#[derive(Debug, Clone)]
pub struct HashingVectorizer {
    analyzer: Analyzer,
    n_features: usize,
    norm: Option<Norm>,
}

impl HashingVectorizer {
    pub fn from_params(params: HashingParams) -> Result<Self, ArtifactError> {
        if params.n_features == 0 {
            return Err(ArtifactError::invalid("hashing n_features must be at least 1"));
        }
        Ok(Self {
            analyzer: Analyzer::new(params.ngram_range, params.lowercase)?,
            n_features: params.n_features,
            norm: params.norm,
        })
    }

    pub fn dimension(&self) -> usize {
        self.n_features
    }

    pub fn transform(&self, text: &str) -> SparseVector {
        let mut buckets: BTreeMap<usize, f64> = BTreeMap::new();
        for (term, count) in self.analyzer.counts(text) {
            let bucket = (fnv1a(term.as_bytes()) % self.n_features as u64) as usize;
            *buckets.entry(bucket).or_insert(0.0) += count as f64;
        }
        let mut vector: SparseVector = buckets.into_iter().collect();
        normalize(&mut vector, self.norm);
        vector
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Feature stage of a text pipeline
#[derive(Debug, Clone)]
pub enum FeatureStage {
    Tfidf(TfidfVectorizer),
    Hashing(HashingVectorizer),
}

impl FeatureStage {
    pub fn from_spec(spec: FeatureStageSpec) -> Result<Self, ArtifactError> {
        match spec {
            FeatureStageSpec::Tfidf(params) => {
                Ok(Self::Tfidf(TfidfVectorizer::from_params(params)?))
            }
            FeatureStageSpec::Hashing(params) => {
                Ok(Self::Hashing(HashingVectorizer::from_params(params)?))
            }
        }
    }

    pub fn dimension(&self) -> usize {
        match self {
            Self::Tfidf(v) => v.dimension(),
            Self::Hashing(v) => v.dimension(),
        }
    }

    pub fn transform(&self, text: &str) -> SparseVector {
        match self {
            Self::Tfidf(v) => v.transform(text),
            Self::Hashing(v) => v.transform(text),
        }
    }

    /// The TF-IDF stage, when this pipeline has one
    pub fn tfidf(&self) -> Option<&TfidfVectorizer> {
        match self {
            Self::Tfidf(v) => Some(v),
            Self::Hashing(_) => None,
        }
    }
}
