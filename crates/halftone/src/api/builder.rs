//! Halftoner builder -- the entry point for turning a cover raster into a
//! bi-level reference raster.

use crate::diffusion::diffuse_plane;
use crate::ordered::OrderedDither;
use crate::pattern::render_levels;
use crate::prepare::{level_planes, normalized_planes};
use crate::raster::{ColorMode, Raster};

use super::{HalftoneError, HalftoneMethod};

/// Halftoning builder.
///
/// - Constructor takes the [`HalftoneMethod`]
/// - [`mode()`](Self::mode) consumes and returns `self`
/// - [`render()`](Self::render) takes `&self`, so one builder can render
///   many covers
///
/// # Example
///
/// ```
/// use halftone::{ColorMode, HalftoneMethod, Halftoner, Raster, ON, OFF};
///
/// let cover = Raster::from_vec(vec![0, 255, 255, 0], 2, 2, 1).unwrap();
/// let out = Halftoner::new(HalftoneMethod::Ordered { bayer_size: 2 })
///     .mode(ColorMode::Binary)
///     .render(&cover)
///     .unwrap();
/// assert_eq!(out.data(), &[OFF, ON, ON, OFF]);
/// ```
#[derive(Debug, Clone)]
pub struct Halftoner {
    method: HalftoneMethod,
    mode: ColorMode,
}

impl Halftoner {
    /// Create a halftoner producing binary output.
    pub fn new(method: HalftoneMethod) -> Self {
        Self {
            method,
            mode: ColorMode::Binary,
        }
    }

    /// Select binary (one luminance channel) or color (three channels)
    /// output.
    pub fn mode(mut self, mode: ColorMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn method(&self) -> &HalftoneMethod {
        &self.method
    }

    pub fn color_mode(&self) -> ColorMode {
        self.mode
    }

    /// Halftone `cover` into a raster of [`OFF`](crate::OFF) and
    /// [`ON`](crate::ON) samples.
    ///
    /// The output has one channel in binary mode and three in color mode.
    /// Pattern halftoning triples both dimensions.
    pub fn render(&self, cover: &Raster) -> Result<Raster, HalftoneError> {
        let (width, height) = (cover.width(), cover.height());
        match &self.method {
            HalftoneMethod::ErrorDiffusion(kernel) => {
                let planes = normalized_planes(cover, self.mode)?;
                let out: Vec<Vec<u8>> = planes
                    .iter()
                    .map(|plane| diffuse_plane(plane, width, height, kernel))
                    .collect();
                Raster::from_planes(&out, width, height)
            }
            HalftoneMethod::Ordered { bayer_size } => {
                let dither = OrderedDither::new(*bayer_size)?;
                let planes = normalized_planes(cover, self.mode)?;
                let out: Vec<Vec<u8>> = planes
                    .iter()
                    .map(|plane| dither.dither_plane(plane, width, height))
                    .collect();
                Raster::from_planes(&out, width, height)
            }
            HalftoneMethod::Pattern => {
                let levels = level_planes(cover, self.mode)?;
                Ok(render_levels(&levels, width, height))
            }
        }
    }
}
