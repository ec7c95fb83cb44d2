use crate::kernel::Kernel;
use crate::pattern::CELL;

/// Halftoning strategy selection for the [`Halftoner`](super::Halftoner)
/// builder.
#[derive(Debug, Clone, PartialEq)]
pub enum HalftoneMethod {
    /// Error diffusion with a data-driven kernel.
    ErrorDiffusion(Kernel),

    /// Ordered dithering against a Bayer matrix of the given size.
    Ordered { bayer_size: usize },

    /// 3x3 pattern cells. Output dimensions are tripled.
    Pattern,
}

impl HalftoneMethod {
    /// Factor by which the output is larger than the input in each
    /// dimension.
    pub fn scale(&self) -> usize {
        match self {
            HalftoneMethod::Pattern => CELL,
            _ => 1,
        }
    }

    /// Short name used in log output.
    pub fn name(&self) -> &'static str {
        match self {
            HalftoneMethod::ErrorDiffusion(_) => "errdiff",
            HalftoneMethod::Ordered { .. } => "ordered",
            HalftoneMethod::Pattern => "pattern",
        }
    }
}
