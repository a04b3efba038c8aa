//! Process-lifetime artifact cache
//!
//! The artifact is read from disk on first use and then shared read-only by
//! every request. Concurrent first callers block behind a single load; a
//! failed load leaves the cache empty so a later call can try again once the
//! file is in place. There is no reload or eviction.

use super::bundle::{compute_checksum, normalise_hex, ModelArtifact};
use crate::error::ArtifactError;
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

/// Where the artifact lives and what checksum it must have
#[derive(Debug, Clone)]
pub struct ArtifactSource {
    pub path: PathBuf,
    /// Expected SHA-256, lowercase or uppercase hex
    pub sha256: Option<String>,
}

impl ArtifactSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sha256: None,
        }
    }

    pub fn with_sha256(mut self, sha256: impl Into<String>) -> Self {
        self.sha256 = Some(sha256.into());
        self
    }

    /// Read, verify, and parse the artifact
    pub fn load(&self) -> Result<ModelArtifact, ArtifactError> {
        let bytes = std::fs::read(&self.path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ArtifactError::NotFound {
                    path: self.path.clone(),
                }
            } else {
                ArtifactError::Io {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;

        if let Some(expected) = &self.sha256 {
            let expected = normalise_hex(expected);
            let actual = compute_checksum(&bytes);
            if actual != expected {
                return Err(ArtifactError::ChecksumMismatch {
                    path: self.path.clone(),
                    expected,
                    actual,
                });
            }
        }

        ModelArtifact::from_slice(&self.path, &bytes)
    }
}

/// Single-initialization holder for the model artifact
#[derive(Debug)]
pub struct ArtifactCache {
    source: ArtifactSource,
    artifact: OnceCell<ModelArtifact>,
    load_attempts: AtomicU64,
}

impl ArtifactCache {
    pub fn new(source: ArtifactSource) -> Self {
        Self {
            source,
            artifact: OnceCell::new(),
            load_attempts: AtomicU64::new(0),
        }
    }

    pub fn path(&self) -> &Path {
        &self.source.path
    }

    /// Return the cached artifact, loading it on the first call
    pub fn ensure_loaded(&self) -> Result<&ModelArtifact, ArtifactError> {
        self.artifact.get_or_try_init(|| {
            let attempt = self.load_attempts.fetch_add(1, Ordering::SeqCst) + 1;
            debug!(path = %self.source.path.display(), attempt, "Loading model artifact");

            let artifact = self.source.load()?;
            info!(
                path = %self.source.path.display(),
                format = ?artifact.format,
                capability = artifact.scoring.capability(),
                checksum = %artifact.checksum,
                "Model artifact loaded"
            );
            Ok(artifact)
        })
    }

    /// The artifact if it has been loaded; never touches storage
    pub fn get(&self) -> Option<&ModelArtifact> {
        self.artifact.get()
    }

    pub fn is_loaded(&self) -> bool {
        self.artifact.get().is_some()
    }

    /// Number of times storage has been read
    pub fn load_attempts(&self) -> u64 {
        self.load_attempts.load(Ordering::SeqCst)
    }
}
