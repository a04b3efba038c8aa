//! Versioned model artifact: on-disk format, metadata, and the load-once cache

mod bundle;
mod cache;

pub use bundle::{
    compute_checksum, normalise_hex, ArtifactBundle, ArtifactFormat, Metadata, ModelArtifact,
    ModelMetrics, TrainingData,
};
pub use cache::{ArtifactCache, ArtifactSource};
