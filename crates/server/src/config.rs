//! Service configuration
//!
//! Read from the process environment (after an optional `.env` file).
//! Keys are the upper-case field names: `API_KEY`, `MODEL_PATH`, ...

use anyhow::{bail, Context, Result};
use sentiment_lib::{
    validation::{DEFAULT_MAX_BATCH, DEFAULT_MAX_TEXT_LEN},
    ArtifactSource, Limits,
};
use serde::Deserialize;
use std::path::PathBuf;

/// Service configuration
#[derive(Clone, Deserialize)]
pub struct ServiceConfig {
    /// Shared secret for `X-API-Key`; empty disables authentication
    #[serde(default)]
    pub api_key: String,

    /// Log level used when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Location of the model artifact
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Expected SHA-256 of the artifact, if it should be verified
    #[serde(default)]
    pub model_sha256: Option<String>,

    /// Maximum characters per text
    #[serde(default = "default_max_text_len")]
    pub max_text_len: usize,

    /// Maximum texts per batch
    #[serde(default = "default_max_batch")]
    pub max_batch: usize,

    /// Requests declaring a larger `Content-Length` are rejected with 413
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Listen address
    #[serde(default = "default_host")]
    pub host: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Load the artifact at startup instead of on the first request
    #[serde(default = "default_eager_load")]
    pub eager_load: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_model_path() -> PathBuf {
    PathBuf::from("model/pipeline.json")
}

fn default_max_text_len() -> usize {
    DEFAULT_MAX_TEXT_LEN
}

fn default_max_batch() -> usize {
    DEFAULT_MAX_BATCH
}

fn default_max_body_bytes() -> usize {
    10_240
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_eager_load() -> bool {
    true
}

impl ServiceConfig {
    /// Load configuration from `.env` and the process environment
    pub fn load() -> Result<Self> {
        // A missing .env file is normal
        let _ = dotenvy::dotenv();
        Self::from_environment(config::Environment::default())
    }

    /// Load configuration from an environment source
    pub fn from_environment(environment: config::Environment) -> Result<Self> {
        let config: Self = config::Config::builder()
            .add_source(environment)
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration value")?;

        config.validate()?;
        Ok(config)
    }

    /// Reject limits that would make every request fail
    pub fn validate(&self) -> Result<()> {
        if self.max_text_len == 0 {
            bail!("MAX_TEXT_LEN must be at least 1");
        }
        if self.max_batch == 0 {
            bail!("MAX_BATCH must be at least 1");
        }
        if self.max_body_bytes == 0 {
            bail!("MAX_BODY_BYTES must be at least 1");
        }
        Ok(())
    }

    pub fn limits(&self) -> Limits {
        Limits {
            max_text_len: self.max_text_len,
            max_batch: self.max_batch,
        }
    }

    pub fn artifact_source(&self) -> ArtifactSource {
        let source = ArtifactSource::new(&self.model_path);
        match &self.model_sha256 {
            Some(sha256) if !sha256.trim().is_empty() => source.with_sha256(sha256.clone()),
            _ => source,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// `EnvFilter` directive derived from `LOG_LEVEL`
    pub fn log_filter(&self) -> String {
        self.log_level.trim().to_lowercase()
    }
}

impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("api_key", &if self.api_key.is_empty() { "" } else { "[REDACTED]" })
            .field("log_level", &self.log_level)
            .field("model_path", &self.model_path)
            .field("model_sha256", &self.model_sha256)
            .field("max_text_len", &self.max_text_len)
            .field("max_batch", &self.max_batch)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("eager_load", &self.eager_load)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_vars(vars: &[(&str, &str)]) -> Result<ServiceConfig> {
        let env: config::Map<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServiceConfig::from_environment(config::Environment::default().source(Some(env)))
    }

    #[test]
    fn test_defaults() {
        let config = from_vars(&[]).unwrap();
        assert_eq!(config.api_key, "");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.model_path, PathBuf::from("model/pipeline.json"));
        assert_eq!(config.model_sha256, None);
        assert_eq!(config.max_text_len, 10_000);
        assert_eq!(config.max_batch, 200);
        assert_eq!(config.max_body_bytes, 10_240);
        assert_eq!(config.bind_addr(), "0.0.0.0:8000");
        assert!(config.eager_load);
    }

    #[test]
    fn test_reads_environment_keys() {
        let config = from_vars(&[
            ("API_KEY", "007"),
            ("LOG_LEVEL", "DEBUG"),
            ("MODEL_PATH", "/models/sentiment.json"),
            ("MAX_TEXT_LEN", "500"),
            ("MAX_BATCH", "10"),
            ("MAX_BODY_BYTES", "2048"),
            ("PORT", "9000"),
            ("EAGER_LOAD", "false"),
        ])
        .unwrap();

        assert_eq!(config.api_key, "007");
        assert_eq!(config.log_filter(), "debug");
        assert_eq!(config.model_path, PathBuf::from("/models/sentiment.json"));
        assert_eq!(
            config.limits(),
            Limits {
                max_text_len: 500,
                max_batch: 10
            }
        );
        assert_eq!(config.max_body_bytes, 2048);
        assert_eq!(config.port, 9000);
        assert!(!config.eager_load);
    }

    #[test]
    fn test_zero_limits_rejected() {
        assert!(from_vars(&[("MAX_BATCH", "0")]).is_err());
        assert!(from_vars(&[("MAX_TEXT_LEN", "0")]).is_err());
        assert!(from_vars(&[("MAX_BODY_BYTES", "0")]).is_err());
    }

    #[test]
    fn test_non_numeric_limit_rejected() {
        assert!(from_vars(&[("MAX_BATCH", "lots")]).is_err());
    }

    #[test]
    fn test_checksum_passed_to_artifact_source() {
        let config = from_vars(&[("MODEL_SHA256", "ABC123")]).unwrap();
        assert_eq!(config.artifact_source().sha256.as_deref(), Some("ABC123"));

        let config = from_vars(&[("MODEL_SHA256", "  ")]).unwrap();
        assert!(config.artifact_source().sha256.is_none());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = from_vars(&[("API_KEY", "top-secret")]).unwrap();
        assert!(!format!("{:?}", config).contains("top-secret"));
    }
}
