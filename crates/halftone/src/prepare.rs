//! Cover preparation: channel selection and normalization.
//!
//! Binary output works on a single luminance plane, color output on the
//! three RGB planes. Diffusion and ordered dithering consume normalized
//! `[0, 1]` planes; pattern halftoning consumes 8-bit values quantized to
//! pattern levels.

use crate::api::HalftoneError;
use crate::pattern::quantize;
use crate::raster::{ColorMode, Raster};

/// Rec. 709 luma weights applied to normalized RGB.
const LUMA: [f64; 3] = [0.2125, 0.7154, 0.0721];

fn check_input(raster: &Raster, mode: ColorMode) -> Result<(), HalftoneError> {
    if raster.is_empty() {
        return Err(HalftoneError::EmptyRaster);
    }
    match (raster.channels(), mode) {
        (1, ColorMode::Color) => Err(HalftoneError::GrayscaleToColor),
        (1, _) | (3, _) => Ok(()),
        (n, _) => Err(HalftoneError::UnsupportedChannels(n)),
    }
}

fn luminance(raster: &Raster, pixel: usize) -> f64 {
    (0..3)
        .map(|c| LUMA[c] * (raster.sample(pixel, c) as f64 / 255.0))
        .sum()
}

/// Normalized planes for diffusion or ordered dithering.
pub fn normalized_planes(raster: &Raster, mode: ColorMode) -> Result<Vec<Vec<f64>>, HalftoneError> {
    check_input(raster, mode)?;
    let pixels = raster.pixel_count();
    let planes = match (mode, raster.channels()) {
        (ColorMode::Binary, 3) => vec![(0..pixels).map(|p| luminance(raster, p)).collect()],
        _ => (0..raster.channels())
            .map(|c| {
                (0..pixels)
                    .map(|p| raster.sample(p, c) as f64 / 255.0)
                    .collect()
            })
            .collect(),
    };
    Ok(planes)
}

/// Pattern level planes (`0..=9`) for pattern halftoning.
pub fn level_planes(raster: &Raster, mode: ColorMode) -> Result<Vec<Vec<u8>>, HalftoneError> {
    check_input(raster, mode)?;
    let pixels = raster.pixel_count();
    let planes = match (mode, raster.channels()) {
        (ColorMode::Binary, 3) => vec![(0..pixels)
            .map(|p| quantize((luminance(raster, p) * 255.0) as u8))
            .collect()],
        _ => (0..raster.channels())
            .map(|c| (0..pixels).map(|p| quantize(raster.sample(p, c))).collect())
            .collect(),
    };
    Ok(planes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_from_rgb_uses_luminance() {
        let raster = Raster::from_vec(vec![255, 0, 0, 0, 255, 0, 0, 0, 255], 3, 1, 3).unwrap();
        let planes = normalized_planes(&raster, ColorMode::Binary).unwrap();
        assert_eq!(planes.len(), 1);
        assert!((planes[0][0] - 0.2125).abs() < 1e-12);
        assert!((planes[0][1] - 0.7154).abs() < 1e-12);
        assert!((planes[0][2] - 0.0721).abs() < 1e-12);
    }

    #[test]
    fn test_binary_from_gray_is_passthrough() {
        let raster = Raster::from_vec(vec![0, 51, 255], 3, 1, 1).unwrap();
        let planes = normalized_planes(&raster, ColorMode::Binary).unwrap();
        assert_eq!(planes, vec![vec![0.0, 0.2, 1.0]]);
    }

    #[test]
    fn test_color_keeps_three_planes() {
        let raster = Raster::from_fn(2, 2, 3, |_, _, c| (c * 100) as u8);
        let planes = normalized_planes(&raster, ColorMode::Color).unwrap();
        assert_eq!(planes.len(), 3);
        assert!(planes[2].iter().all(|&v| (v - 200.0 / 255.0).abs() < 1e-12));
    }

    #[test]
    fn test_color_from_gray_fails() {
        let raster = Raster::new(2, 2, 1);
        assert_eq!(
            normalized_planes(&raster, ColorMode::Color).unwrap_err(),
            HalftoneError::GrayscaleToColor
        );
        assert_eq!(
            level_planes(&raster, ColorMode::Color).unwrap_err(),
            HalftoneError::GrayscaleToColor
        );
    }

    #[test]
    fn test_rejects_two_channel_input() {
        let raster = Raster::new(2, 2, 2);
        assert_eq!(
            level_planes(&raster, ColorMode::Binary).unwrap_err(),
            HalftoneError::UnsupportedChannels(2)
        );
    }

    #[test]
    fn test_level_planes_quantize() {
        let raster = Raster::from_vec(vec![0, 26, 130, 255], 2, 2, 1).unwrap();
        let levels = level_planes(&raster, ColorMode::Binary).unwrap();
        assert_eq!(levels, vec![vec![0, 1, 5, 9]]);
    }

    #[test]
    fn test_empty_raster() {
        let raster = Raster::new(0, 0, 1);
        assert_eq!(
            normalized_planes(&raster, ColorMode::Binary).unwrap_err(),
            HalftoneError::EmptyRaster
        );
    }
}
