//! Configuration for a rotating log instance
//!
//! A config can be built in code, deserialized from JSON, or read from
//! `ROTALOG_*` environment variables.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::retention::{RetentionCadence, RetentionLimit};
use crate::{Result, RotalogError};

/// Default number of archives kept when none is configured.
pub const DEFAULT_MAX_LOG_FILES: i64 = 30;

/// Default gzip level for record payloads.
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

pub const ENV_DIR: &str = "ROTALOG_DIR";
pub const ENV_MAX_FILES: &str = "ROTALOG_MAX_FILES";
pub const ENV_COMPRESSION_LEVEL: &str = "ROTALOG_COMPRESSION_LEVEL";
pub const ENV_RETENTION: &str = "ROTALOG_RETENTION";

fn default_max_log_files() -> i64 {
    DEFAULT_MAX_LOG_FILES
}

fn default_compression_level() -> u32 {
    DEFAULT_COMPRESSION_LEVEL
}

/// Configuration structure for a rotating log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotatingLogConfig {
    /// Directory holding the daily archives
    pub directory: PathBuf,
    /// Maximum archives to keep; negative means unlimited
    #[serde(default = "default_max_log_files")]
    pub max_log_files: i64,
    /// Gzip level (0-9) applied to each payload
    #[serde(default = "default_compression_level")]
    pub compression_level: u32,
    /// When old archives are pruned
    #[serde(default)]
    pub retention_cadence: RetentionCadence,
}

impl RotatingLogConfig {
    /// Create a configuration for `directory` with default settings
    pub fn new<P: Into<PathBuf>>(directory: P) -> Self {
        Self {
            directory: directory.into(),
            max_log_files: DEFAULT_MAX_LOG_FILES,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            retention_cadence: RetentionCadence::default(),
        }
    }

    pub fn with_max_log_files(mut self, max_log_files: i64) -> Self {
        self.max_log_files = max_log_files;
        self
    }

    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.compression_level = level;
        self
    }

    pub fn with_retention_cadence(mut self, cadence: RetentionCadence) -> Self {
        self.retention_cadence = cadence;
        self
    }

    pub fn retention_limit(&self) -> RetentionLimit {
        RetentionLimit::from_max_files(self.max_log_files)
    }

    /// Parse a JSON configuration document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Build a configuration from `ROTALOG_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from any key/value source using the `ROTALOG_*` names.
    ///
    /// `ROTALOG_DIR` is required; the rest fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let directory = lookup(ENV_DIR)
            .ok_or_else(|| RotalogError::validation(format!("{ENV_DIR} is not set")))?;
        let mut config = Self::new(directory);

        if let Some(value) = lookup(ENV_MAX_FILES) {
            config.max_log_files = value.trim().parse().map_err(|e| {
                RotalogError::validation(format!("invalid {ENV_MAX_FILES} {value:?}: {e}"))
            })?;
        }

        if let Some(value) = lookup(ENV_COMPRESSION_LEVEL) {
            config.compression_level = value.trim().parse().map_err(|e| {
                RotalogError::validation(format!("invalid {ENV_COMPRESSION_LEVEL} {value:?}: {e}"))
            })?;
        }

        if let Some(value) = lookup(ENV_RETENTION) {
            config.retention_cadence = match value.trim() {
                "on_rotation" => RetentionCadence::OnRotation,
                "manual" => RetentionCadence::Manual,
                other => {
                    return Err(RotalogError::validation(format!(
                        "invalid {ENV_RETENTION} {other:?}: expected on_rotation or manual"
                    )))
                }
            };
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.directory.as_os_str().is_empty() {
            return Err(RotalogError::validation("log directory must not be empty"));
        }
        if self.compression_level > 9 {
            return Err(RotalogError::validation(format!(
                "compression level {} is out of range 0-9",
                self.compression_level
            )));
        }
        Ok(())
    }
}
