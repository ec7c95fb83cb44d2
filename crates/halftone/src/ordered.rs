//! Ordered (threshold) dithering with a Bayer matrix.
//!
//! Every sample is compared against a fixed threshold, so there is no
//! error propagation and no dependency between samples.

use crate::api::HalftoneError;
use crate::bayer::bayer_matrix;
use crate::raster::{OFF, ON};

/// Bayer ordered ditherer for a given matrix size.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedDither {
    matrix: Vec<Vec<f64>>,
    size: usize,
}

impl OrderedDither {
    pub fn new(size: usize) -> Result<Self, HalftoneError> {
        Ok(Self {
            matrix: bayer_matrix(size)?,
            size,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Threshold for the sample at row `y`, column `x`.
    ///
    /// The matrix is indexed column first (`matrix[x mod n][y mod n]`).
    #[inline]
    pub fn threshold(&self, y: usize, x: usize) -> f64 {
        self.matrix[x % self.size][y % self.size]
    }

    /// Dither a normalized plane: ON where the sample strictly exceeds
    /// its threshold.
    pub fn dither_plane(&self, plane: &[f64], width: usize, height: usize) -> Vec<u8> {
        let mut output = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let value = plane[y * width + x];
                output.push(if value > self.threshold(y, x) { ON } else { OFF });
            }
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transposed_lookup() {
        let dither = OrderedDither::new(2).unwrap();
        // matrix = [[0, 0.75], [0.5, 0.25]]
        assert_eq!(dither.threshold(0, 1), 0.5);
        assert_eq!(dither.threshold(1, 0), 0.75);
        assert_eq!(dither.threshold(3, 2), 0.75);
    }

    #[test]
    fn test_zero_never_on() {
        let dither = OrderedDither::new(4).unwrap();
        let out = dither.dither_plane(&[0.0; 16], 4, 4);
        assert!(out.iter().all(|&v| v == OFF));
    }

    #[test]
    fn test_full_white_always_on() {
        let dither = OrderedDither::new(8).unwrap();
        let out = dither.dither_plane(&[1.0; 64], 8, 8);
        assert!(out.iter().all(|&v| v == ON));
    }

    #[test]
    fn test_half_gray_gives_half_coverage() {
        let dither = OrderedDither::new(4).unwrap();
        let out = dither.dither_plane(&[0.5; 16], 4, 4);
        // thresholds are k/16; 0.5 exceeds k = 0..=7
        assert_eq!(out.iter().filter(|&&v| v == ON).count(), 8);
    }
}
