//! Integer raster shared by every halftoning strategy.
//!
//! [`Raster`] stores 8-bit samples in row-major order with interleaved
//! channels, the same layout PNG uses for gray and RGB images. Halftoned
//! rasters only ever contain the two levels [`OFF`] and [`ON`].

use std::fmt;
use std::str::FromStr;

use crate::api::HalftoneError;

/// Sample value of a dot that is off (black).
pub const OFF: u8 = 0;

/// Sample value of a dot that is on (white).
pub const ON: u8 = 255;

/// Output color mode for a halftoning run.
///
/// - `Binary`: the cover is reduced to a single luminance channel
/// - `Color`: each RGB channel is halftoned independently
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    #[default]
    Binary,
    Color,
}

impl ColorMode {
    /// Full name as used on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorMode::Binary => "binary",
            ColorMode::Color => "color",
        }
    }

    /// Three-letter tag used in share file names.
    pub fn short_tag(&self) -> &'static str {
        match self {
            ColorMode::Binary => "bin",
            ColorMode::Color => "col",
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColorMode {
    type Err = HalftoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "binary" => Ok(ColorMode::Binary),
            "color" => Ok(ColorMode::Color),
            other => Err(HalftoneError::UnknownColorMode(other.to_string())),
        }
    }
}

/// A `height x width x channels` array of 8-bit samples.
///
/// Samples are stored row-major with channels interleaved:
/// `index = (y * width + x) * channels + c`. The flattened pixel index
/// `y * width + x` is what the share embedder calls a *unit* for
/// sample-level strategies.
///
/// # Example
///
/// ```
/// use halftone::Raster;
///
/// let mut raster = Raster::new(4, 2, 3);
/// raster.set(1, 2, 0, 255);
/// assert_eq!(raster.get(1, 2, 0), 255);
/// assert_eq!(raster.data().len(), 4 * 2 * 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    data: Vec<u8>,
    width: usize,
    height: usize,
    channels: usize,
}

impl Raster {
    /// Create a zero-filled raster.
    pub fn new(width: usize, height: usize, channels: usize) -> Self {
        debug_assert!(channels > 0, "raster needs at least one channel");
        Self {
            data: vec![0; width * height * channels],
            width,
            height,
            channels,
        }
    }

    /// Wrap an existing sample buffer.
    ///
    /// Fails if the buffer length does not match the dimensions or the
    /// channel count is zero.
    pub fn from_vec(
        data: Vec<u8>,
        width: usize,
        height: usize,
        channels: usize,
    ) -> Result<Self, HalftoneError> {
        if channels == 0 {
            return Err(HalftoneError::UnsupportedChannels(channels));
        }
        let expected = width * height * channels;
        if data.len() != expected {
            return Err(HalftoneError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            channels,
        })
    }

    /// Build a raster by evaluating `f(y, x, c)` for every sample.
    pub fn from_fn(
        width: usize,
        height: usize,
        channels: usize,
        mut f: impl FnMut(usize, usize, usize) -> u8,
    ) -> Self {
        let mut data = Vec::with_capacity(width * height * channels);
        for y in 0..height {
            for x in 0..width {
                for c in 0..channels {
                    data.push(f(y, x, c));
                }
            }
        }
        Self {
            data,
            width,
            height,
            channels,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Number of pixels (`width * height`).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// `(height, width, channels)`, the order used in diagnostics.
    #[inline]
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.height, self.width, self.channels)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// True if both rasters have identical dimensions and channel count.
    pub fn same_shape(&self, other: &Raster) -> bool {
        self.shape() == other.shape()
    }

    #[inline]
    fn index(&self, y: usize, x: usize, c: usize) -> usize {
        debug_assert!(y < self.height && x < self.width && c < self.channels);
        (y * self.width + x) * self.channels + c
    }

    #[inline]
    pub fn get(&self, y: usize, x: usize, c: usize) -> u8 {
        self.data[self.index(y, x, c)]
    }

    #[inline]
    pub fn set(&mut self, y: usize, x: usize, c: usize, value: u8) {
        let idx = self.index(y, x, c);
        self.data[idx] = value;
    }

    /// Sample at flattened pixel index `pixel` (row-major) and channel `c`.
    #[inline]
    pub fn sample(&self, pixel: usize, c: usize) -> u8 {
        self.data[pixel * self.channels + c]
    }

    #[inline]
    pub fn set_sample(&mut self, pixel: usize, c: usize, value: u8) {
        let channels = self.channels;
        self.data[pixel * channels + c] = value;
    }

    /// Copy one channel out as a row-major plane.
    pub fn plane(&self, c: usize) -> Vec<u8> {
        self.data
            .iter()
            .skip(c)
            .step_by(self.channels)
            .copied()
            .collect()
    }

    /// Assemble a raster from equally sized row-major planes.
    pub fn from_planes(
        planes: &[Vec<u8>],
        width: usize,
        height: usize,
    ) -> Result<Self, HalftoneError> {
        let channels = planes.len();
        if channels == 0 {
            return Err(HalftoneError::UnsupportedChannels(0));
        }
        let mut raster = Raster::new(width, height, channels);
        for (c, plane) in planes.iter().enumerate() {
            if plane.len() != width * height {
                return Err(HalftoneError::BufferSize {
                    expected: width * height,
                    actual: plane.len(),
                });
            }
            for (pixel, &v) in plane.iter().enumerate() {
                raster.set_sample(pixel, c, v);
            }
        }
        Ok(raster)
    }
}
