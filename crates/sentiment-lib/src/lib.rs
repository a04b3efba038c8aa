//! Core library for the text classification service
//!
//! This crate provides the serving pipeline behind the HTTP API:
//! - Load-once model artifact cache
//! - Scoring objects (TF-IDF / hashing features, linear estimators)
//! - Request validation and API key authentication
//! - Inference with probability or margin-based confidence
//! - Response assembly and metadata reporting
//! - Health checks and observability

pub mod artifact;
pub mod auth;
pub mod error;
pub mod health;
pub mod inference;
pub mod metadata;
pub mod models;
pub mod observability;
pub mod response;
pub mod scoring;
pub mod service;
pub mod validation;

pub use artifact::{ArtifactCache, ArtifactSource, Metadata, ModelArtifact};
pub use auth::{Authenticator, API_KEY_HEADER};
pub use error::{ArtifactError, ServiceError, ValidationError};
pub use health::{HealthResponse, ReadinessResponse};
pub use inference::{Classification, Inference, InferenceEngine};
pub use models::*;
pub use observability::{RequestLog, ServiceMetrics, StructuredLogger};
pub use scoring::ScoringObject;
pub use service::ClassificationService;
pub use validation::{Limits, RequestValidator};
