//! Unified error type for the halftone public API.
//!
//! [`HalftoneError`] wraps kernel errors and reports invalid rendering
//! requests so application code can propagate everything with `?`.

use crate::kernel::KernelError;
use std::fmt;

/// Unified error type for the halftone public API.
///
/// # Example
///
/// ```
/// use halftone::{ColorMode, HalftoneError, HalftoneMethod, Halftoner, Raster};
///
/// let gray = Raster::new(4, 4, 1);
/// let err = Halftoner::new(HalftoneMethod::Pattern)
///     .mode(ColorMode::Color)
///     .render(&gray)
///     .unwrap_err();
/// assert_eq!(err, HalftoneError::GrayscaleToColor);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum HalftoneError {
    /// Kernel text could not be parsed or failed validation
    Kernel(KernelError),
    /// Color output was requested for a single-channel input
    GrayscaleToColor,
    /// Bayer matrix size is not a power of two in `1..=256`
    InvalidBayerSize(usize),
    /// Input raster has no samples
    EmptyRaster,
    /// Channel count other than 1 or 3
    UnsupportedChannels(usize),
    /// Sample buffer length does not match the raster dimensions
    BufferSize { expected: usize, actual: usize },
    /// Color mode name is neither `binary` nor `color`
    UnknownColorMode(String),
}

impl fmt::Display for HalftoneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HalftoneError::Kernel(err) => write!(f, "kernel error: {}", err),
            HalftoneError::GrayscaleToColor => {
                write!(f, "color output requires a color cover image")
            }
            HalftoneError::InvalidBayerSize(n) => write!(
                f,
                "bayer matrix size must be a power of two between 1 and 256, got {}",
                n
            ),
            HalftoneError::EmptyRaster => write!(f, "raster has no samples"),
            HalftoneError::UnsupportedChannels(n) => {
                write!(f, "unsupported channel count {} (expected 1 or 3)", n)
            }
            HalftoneError::BufferSize { expected, actual } => write!(
                f,
                "sample buffer holds {} values, dimensions need {}",
                actual, expected
            ),
            HalftoneError::UnknownColorMode(name) => write!(
                f,
                "unknown output color '{}' (expected binary or color)",
                name
            ),
        }
    }
}

impl std::error::Error for HalftoneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HalftoneError::Kernel(err) => Some(err),
            _ => None,
        }
    }
}

impl From<KernelError> for HalftoneError {
    fn from(err: KernelError) -> Self {
        HalftoneError::Kernel(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            HalftoneError::InvalidBayerSize(6).to_string(),
            "bayer matrix size must be a power of two between 1 and 256, got 6"
        );
        assert_eq!(
            HalftoneError::GrayscaleToColor.to_string(),
            "color output requires a color cover image"
        );
    }

    #[test]
    fn test_kernel_error_is_source() {
        use std::error::Error;
        let err: HalftoneError = KernelError::Empty.into();
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("kernel error: "));
    }
}
