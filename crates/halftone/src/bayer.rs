//! Recursive Bayer threshold matrices.
//!
//! The index matrix of size `n` is built from four copies of the size
//! `n/2` matrix `P`:
//!
//! ```text
//!   4P     4P + 3
//!   4P + 2 4P + 1
//! ```
//!
//! starting from `[[0]]`. Dividing by `n²` gives thresholds in `[0, 1)`.

use crate::api::HalftoneError;

/// Largest supported matrix size.
pub const MAX_BAYER_SIZE: usize = 256;

/// Check that `n` is a power of two in `1..=MAX_BAYER_SIZE`.
pub fn validate_size(n: usize) -> Result<(), HalftoneError> {
    if n == 0 || !n.is_power_of_two() || n > MAX_BAYER_SIZE {
        return Err(HalftoneError::InvalidBayerSize(n));
    }
    Ok(())
}

/// Integer index matrix of size `n`, a permutation of `0..n²`.
pub fn bayer_indices(n: usize) -> Result<Vec<Vec<u32>>, HalftoneError> {
    validate_size(n)?;
    Ok(build_indices(n))
}

fn build_indices(n: usize) -> Vec<Vec<u32>> {
    if n == 1 {
        return vec![vec![0]];
    }
    let half = n / 2;
    let prev = build_indices(half);
    let mut out = vec![vec![0u32; n]; n];
    for (r, row) in prev.iter().enumerate() {
        for (c, &p) in row.iter().enumerate() {
            out[r][c] = 4 * p;
            out[r][c + half] = 4 * p + 3;
            out[r + half][c] = 4 * p + 2;
            out[r + half][c + half] = 4 * p + 1;
        }
    }
    out
}

/// Threshold matrix of size `n` with values `index / n²`.
///
/// # Example
///
/// ```
/// use halftone::bayer_matrix;
///
/// let m = bayer_matrix(2).unwrap();
/// assert_eq!(m, vec![vec![0.0, 0.75], vec![0.5, 0.25]]);
/// ```
pub fn bayer_matrix(n: usize) -> Result<Vec<Vec<f64>>, HalftoneError> {
    let scale = (n * n) as f64;
    Ok(bayer_indices(n)?
        .into_iter()
        .map(|row| row.into_iter().map(|i| i as f64 / scale).collect())
        .collect())
}
