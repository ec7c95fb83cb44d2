//! Share fidelity metrics against the reference halftone.
//!
//! SSIM follows the common reference formulation: 7x7 uniform window,
//! sample covariance, `K1 = 0.01`, `K2 = 0.03`, data range 255, reflected
//! borders, mean over the interior (a 3-sample border is cropped) and over
//! channels.

use halftone::Raster;

const DATA_RANGE: f64 = 255.0;
const WINDOW: usize = 7;
const K1: f64 = 0.01;
const K2: f64 = 0.03;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum FidelityError {
    #[error("images differ in shape: {reference:?} vs {share:?}")]
    ShapeMismatch {
        reference: (usize, usize, usize),
        share: (usize, usize, usize),
    },

    #[error("image {width}x{height} is smaller than the {window}x{window} SSIM window")]
    TooSmall {
        width: usize,
        height: usize,
        window: usize,
    },
}

fn check_shape(reference: &Raster, share: &Raster) -> Result<(), FidelityError> {
    if reference.same_shape(share) {
        Ok(())
    } else {
        Err(FidelityError::ShapeMismatch {
            reference: reference.shape(),
            share: share.shape(),
        })
    }
}

fn mean_squared_error(reference: &Raster, share: &Raster) -> f64 {
    let sum: f64 = reference
        .data()
        .iter()
        .zip(share.data())
        .map(|(&a, &b)| {
            let d = a as f64 - b as f64;
            d * d
        })
        .sum();
    sum / reference.data().len() as f64
}

/// `10 log10(mean(ref²) / mean((ref - share)²))`; infinite for identical
/// images.
pub fn snr(reference: &Raster, share: &Raster) -> Result<f64, FidelityError> {
    check_shape(reference, share)?;
    let noise = mean_squared_error(reference, share);
    if noise == 0.0 {
        return Ok(f64::INFINITY);
    }
    let signal: f64 = reference
        .data()
        .iter()
        .map(|&a| (a as f64) * (a as f64))
        .sum::<f64>()
        / reference.data().len() as f64;
    Ok(10.0 * (signal / noise).log10())
}

/// Peak signal-to-noise ratio with data range 255; infinite for identical
/// images.
pub fn psnr(reference: &Raster, share: &Raster) -> Result<f64, FidelityError> {
    check_shape(reference, share)?;
    let mse = mean_squared_error(reference, share);
    if mse == 0.0 {
        return Ok(f64::INFINITY);
    }
    Ok(10.0 * (DATA_RANGE * DATA_RANGE / mse).log10())
}

/// Mirror an out-of-range index back into `0..n` (`d c b a | a b c d`).
#[inline]
fn reflect(i: isize, n: usize) -> usize {
    let n = n as isize;
    let mut i = i;
    loop {
        if i < 0 {
            i = -i - 1;
        } else if i >= n {
            i = 2 * n - i - 1;
        } else {
            return i as usize;
        }
    }
}

/// Separable `WINDOW`-wide mean filter with reflected borders.
fn uniform_filter(plane: &[f64], width: usize, height: usize) -> Vec<f64> {
    let half = (WINDOW / 2) as isize;
    let norm = WINDOW as f64;
    let mut rows = vec![0.0; plane.len()];
    for y in 0..height {
        for x in 0..width {
            let sum: f64 = (-half..=half)
                .map(|d| plane[y * width + reflect(x as isize + d, width)])
                .sum();
            rows[y * width + x] = sum / norm;
        }
    }
    let mut out = vec![0.0; plane.len()];
    for y in 0..height {
        for x in 0..width {
            let sum: f64 = (-half..=half)
                .map(|d| rows[reflect(y as isize + d, height) * width + x])
                .sum();
            out[y * width + x] = sum / norm;
        }
    }
    out
}

fn ssim_plane(a: &[f64], b: &[f64], width: usize, height: usize) -> f64 {
    let c1 = (K1 * DATA_RANGE).powi(2);
    let c2 = (K2 * DATA_RANGE).powi(2);
    let samples = (WINDOW * WINDOW) as f64;
    let cov_norm = samples / (samples - 1.0);

    let aa: Vec<f64> = a.iter().map(|v| v * v).collect();
    let bb: Vec<f64> = b.iter().map(|v| v * v).collect();
    let ab: Vec<f64> = a.iter().zip(b).map(|(x, y)| x * y).collect();

    let ux = uniform_filter(a, width, height);
    let uy = uniform_filter(b, width, height);
    let uxx = uniform_filter(&aa, width, height);
    let uyy = uniform_filter(&bb, width, height);
    let uxy = uniform_filter(&ab, width, height);

    let pad = (WINDOW - 1) / 2;
    let mut total = 0.0;
    let mut count = 0usize;
    for y in pad..height - pad {
        for x in pad..width - pad {
            let i = y * width + x;
            let vx = cov_norm * (uxx[i] - ux[i] * ux[i]);
            let vy = cov_norm * (uyy[i] - uy[i] * uy[i]);
            let vxy = cov_norm * (uxy[i] - ux[i] * uy[i]);
            let num = (2.0 * ux[i] * uy[i] + c1) * (2.0 * vxy + c2);
            let den = (ux[i] * ux[i] + uy[i] * uy[i] + c1) * (vx + vy + c2);
            total += num / den;
            count += 1;
        }
    }
    total / count as f64
}

/// Mean structural similarity, averaged over channels.
pub fn ssim(reference: &Raster, share: &Raster) -> Result<f64, FidelityError> {
    check_shape(reference, share)?;
    let (width, height) = (reference.width(), reference.height());
    if width < WINDOW || height < WINDOW {
        return Err(FidelityError::TooSmall {
            width,
            height,
            window: WINDOW,
        });
    }
    let channels = reference.channels();
    let total: f64 = (0..channels)
        .map(|c| {
            let a: Vec<f64> = reference.plane(c).into_iter().map(f64::from).collect();
            let b: Vec<f64> = share.plane(c).into_iter().map(f64::from).collect();
            ssim_plane(&a, &b, width, height)
        })
        .sum();
    Ok(total / channels as f64)
}

/// Metrics for one share.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShareFidelity {
    pub snr: f64,
    pub psnr: f64,
    /// `None` when the image is smaller than the SSIM window
    pub ssim: Option<f64>,
}

/// Per-share metrics and their averages.
#[derive(Debug, Clone, PartialEq)]
pub struct FidelityReport {
    pub shares: Vec<ShareFidelity>,
    pub avg_snr: f64,
    pub avg_psnr: f64,
    pub avg_ssim: Option<f64>,
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        f64::NAN
    } else {
        sum / n as f64
    }
}

/// Compare every share against the reference.
pub fn evaluate(reference: &Raster, shares: &[Raster]) -> Result<FidelityReport, FidelityError> {
    let mut per_share = Vec::with_capacity(shares.len());
    for share in shares {
        let ssim = match ssim(reference, share) {
            Ok(value) => Some(value),
            Err(FidelityError::TooSmall { .. }) => None,
            Err(e) => return Err(e),
        };
        per_share.push(ShareFidelity {
            snr: snr(reference, share)?,
            psnr: psnr(reference, share)?,
            ssim,
        });
    }

    let avg_ssim = if per_share.iter().all(|s| s.ssim.is_some()) && !per_share.is_empty() {
        Some(mean(per_share.iter().filter_map(|s| s.ssim)))
    } else {
        None
    };
    let report = FidelityReport {
        avg_snr: mean(per_share.iter().map(|s| s.snr)),
        avg_psnr: mean(per_share.iter().map(|s| s.psnr)),
        avg_ssim,
        shares: per_share,
    };
    tracing::debug!(
        avg_snr = report.avg_snr,
        avg_psnr = report.avg_psnr,
        avg_ssim = ?report.avg_ssim,
        "Fidelity evaluated"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use halftone::{OFF, ON};

    fn checkerboard(size: usize) -> Raster {
        Raster::from_fn(size, size, 1, |y, x, _| if (x + y) % 2 == 0 { ON } else { OFF })
    }

    #[test]
    fn test_identical_images() {
        let a = checkerboard(8);
        assert_eq!(snr(&a, &a).unwrap(), f64::INFINITY);
        assert_eq!(psnr(&a, &a).unwrap(), f64::INFINITY);
        assert!((ssim(&a, &a).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_psnr_single_flip() {
        let a = checkerboard(10);
        let mut b = a.clone();
        b.set(0, 0, 0, OFF);
        // mse = 255² / 100 -> psnr = 10 log10(100) = 20
        assert!((psnr(&a, &b).unwrap() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_snr_single_flip() {
        let a = checkerboard(10);
        let mut b = a.clone();
        b.set(0, 0, 0, OFF);
        // signal = 255² / 2, noise = 255² / 100 -> 10 log10(50)
        assert!((snr(&a, &b).unwrap() - 10.0 * 50f64.log10()).abs() < 1e-9);
    }

    #[test]
    fn test_ssim_drops_with_changes() {
        let a = checkerboard(16);
        let mut b = a.clone();
        for x in 0..16 {
            b.set(8, x, 0, ON);
        }
        let value = ssim(&a, &b).unwrap();
        assert!(value < 1.0 && value > 0.0, "ssim {}", value);
    }

    #[test]
    fn test_ssim_too_small() {
        let a = checkerboard(6);
        assert_eq!(
            ssim(&a, &a).unwrap_err(),
            FidelityError::TooSmall {
                width: 6,
                height: 6,
                window: 7
            }
        );
    }

    #[test]
    fn test_shape_mismatch() {
        let a = checkerboard(8);
        let b = checkerboard(9);
        assert!(matches!(psnr(&a, &b), Err(FidelityError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_reflect() {
        assert_eq!(reflect(-1, 5), 0);
        assert_eq!(reflect(-3, 5), 2);
        assert_eq!(reflect(5, 5), 4);
        assert_eq!(reflect(7, 5), 2);
    }

    #[test]
    fn test_evaluate_averages() {
        let a = checkerboard(10);
        let mut b = a.clone();
        b.set(0, 0, 0, OFF);
        let report = evaluate(&a, &[a.clone(), b]).unwrap();
        assert_eq!(report.shares.len(), 2);
        assert_eq!(report.avg_psnr, f64::INFINITY);
        let ssim = report.avg_ssim.unwrap();
        assert!(ssim < 1.0);
    }

    #[test]
    fn test_evaluate_small_images_skip_ssim() {
        let a = checkerboard(4);
        let report = evaluate(&a, &[a.clone(), a.clone(), a.clone()]).unwrap();
        assert_eq!(report.avg_ssim, None);
    }
}
