use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::record::OutputFormat;
use crate::error::ConfigError;

/// Default cap on rejection-sampling attempts per block.
pub const DEFAULT_MAX_ATTEMPTS: usize = 100;

/// Run configuration loaded from a YAML file; CLI flags override it.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct StegoConfig {
    /// zlib-compress the payload before embedding
    pub compress_payload: bool,

    /// Write the stego shares to disk
    pub write_shares: bool,

    /// Also write the unmodified reference halftone
    pub write_reference: bool,

    /// Parent directory for run directories
    pub output_dir: PathBuf,

    /// Directory of extra kernel files (`<name>.txt`)
    pub kernels_dir: Option<PathBuf>,

    /// Rejection-sampling attempts per block before the block is skipped
    pub max_attempts: usize,

    /// Seed for the embedding RNG; random when unset
    pub seed: Option<u64>,

    /// Result record envelope
    pub output_format: OutputFormat,
}

impl Default for StegoConfig {
    fn default() -> Self {
        Self {
            compress_payload: false,
            write_shares: true,
            write_reference: false,
            output_dir: PathBuf::from("output"),
            kernels_dir: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            seed: None,
            output_format: OutputFormat::Json,
        }
    }
}

impl StegoConfig {
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration from `path`, falling back to defaults when the
    /// file cannot be read or parsed.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_yaml(&content) {
                Ok(config) => {
                    tracing::info!(path = %path.display(), "Loaded configuration");
                    config
                }
                Err(e) => {
                    tracing::warn!(%e, path = %path.display(), "Failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(%e, path = %path.display(), "Failed to read config, using defaults");
                Self::default()
            }
        }
    }
}
