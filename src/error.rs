use halftone::{HalftoneError, KernelError};
use thiserror::Error;

/// Invalid run configuration, detected before any image processing.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("--kernel is required when --htmethod is errdiff")]
    MissingKernel,

    #[error("Unknown kernel: {0}")]
    UnknownKernel(String),

    #[error("Invalid kernel name: {0}")]
    InvalidKernelName(String),

    #[error("Kernel '{name}' is invalid: {source}")]
    Kernel {
        name: String,
        #[source]
        source: KernelError,
    },

    #[error("Failed to read kernel '{name}': {source}")]
    KernelIo {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("At least {minimum} shares are required, got {requested}")]
    TooFewShares { requested: usize, minimum: usize },

    #[error("Unknown halftoning method: {0} (expected errdiff, ordered or pattern)")]
    UnknownMethod(String),

    #[error("Unknown output format: {0} (expected csv, json or xml)")]
    UnknownFormat(String),

    #[error("Invalid configuration file: {0}")]
    Parse(String),

    #[error("Invalid halftone settings: {0}")]
    Halftone(#[from] HalftoneError),
}

/// Image read/write failures.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("PNG decode error: {0}")]
    Decode(String),

    #[error("PNG encode error: {0}")]
    Encode(String),

    #[error("Unsupported image: {0}")]
    Unsupported(String),

    #[error("Invalid raster: {0}")]
    Raster(#[from] HalftoneError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
