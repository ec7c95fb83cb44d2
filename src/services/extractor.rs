//! Share extractor: recover payload bits by comparing shares.
//!
//! Shares agree everywhere except at the units the embedder changed. For
//! sample layouts the value held by exactly one share is the bit; for
//! pattern cells the on-counts are compared against their mode.

use std::fmt;
use std::path::Path;

use halftone::{cell_on_count, Raster, CELL, OFF};

use crate::models::UnitLayout;
use crate::rendering::load_png;
use crate::services::payload_codec::decode_text;
use crate::services::share_store::{check_share_set, list_share_files};

/// Message reported when recovered bytes are not text.
pub const UNDECODABLE_MESSAGE: &str = "Cannot extract payload";

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ExtractError {
    #[error("no shares to extract from")]
    NoShares,

    #[error("share {index} has shape {actual:?}, expected {expected:?}")]
    ShapeMismatch {
        index: usize,
        expected: (usize, usize, usize),
        actual: (usize, usize, usize),
    },

    #[error("ambiguous divergent sample at row {row}, column {col}, channel {channel}")]
    AmbiguousSample {
        row: usize,
        col: usize,
        channel: usize,
    },
}

/// Outcome of extracting from a directory of shares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// Payload text recovered
    Recovered(String),
    /// Shares were read but the payload could not be decoded
    Undecodable,
    /// Nothing to extract from (missing directory, unreadable or
    /// inconsistent shares)
    Missing,
}

impl fmt::Display for Extraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Extraction::Recovered(text) => f.write_str(text),
            Extraction::Undecodable => f.write_str(UNDECODABLE_MESSAGE),
            Extraction::Missing => Ok(()),
        }
    }
}

fn check_shapes(shares: &[Raster]) -> Result<&Raster, ExtractError> {
    let first = shares.first().ok_or(ExtractError::NoShares)?;
    for (index, share) in shares.iter().enumerate().skip(1) {
        if !share.same_shape(first) {
            return Err(ExtractError::ShapeMismatch {
                index,
                expected: first.shape(),
                actual: share.shape(),
            });
        }
    }
    Ok(first)
}

/// Recover the embedded bit sequence from a share set.
pub fn extract_bits(shares: &[Raster], layout: UnitLayout) -> Result<Vec<bool>, ExtractError> {
    let first = check_shapes(shares)?;
    match layout {
        UnitLayout::Samples => sample_bits(shares, first),
        UnitLayout::Cells => Ok(cell_bits(shares, first)),
    }
}

fn sample_bits(shares: &[Raster], first: &Raster) -> Result<Vec<bool>, ExtractError> {
    let mut bits = Vec::new();
    let mut values = Vec::with_capacity(shares.len());
    for pixel in 0..first.pixel_count() {
        for channel in 0..first.channels() {
            values.clear();
            values.extend(shares.iter().map(|s| s.sample(pixel, channel)));
            if values.iter().all(|&v| v == values[0]) {
                continue;
            }
            let mut unique = values
                .iter()
                .copied()
                .filter(|&v| values.iter().filter(|&&w| w == v).count() == 1);
            match (unique.next(), unique.next()) {
                (Some(outlier), None) => bits.push(outlier != OFF),
                _ => {
                    return Err(ExtractError::AmbiguousSample {
                        row: pixel / first.width(),
                        col: pixel % first.width(),
                        channel,
                    })
                }
            }
        }
    }
    Ok(bits)
}

fn cell_bits(shares: &[Raster], first: &Raster) -> Vec<bool> {
    let (cells_high, cells_wide) = (first.height() / CELL, first.width() / CELL);
    let mut bits = Vec::new();
    let mut counts = Vec::with_capacity(shares.len());
    for cy in 0..cells_high {
        for cx in 0..cells_wide {
            for channel in 0..first.channels() {
                counts.clear();
                counts.extend(shares.iter().map(|s| cell_on_count(s, cy, cx, channel)));
                if counts.iter().all(|&n| n == counts[0]) {
                    continue;
                }
                let mean = counts.iter().map(|&n| n as f64).sum::<f64>() / counts.len() as f64;
                bits.push((mode(&counts) as f64) < mean);
            }
        }
    }
    bits
}

/// Most frequent value; the smallest one on ties.
fn mode(values: &[u8]) -> u8 {
    let mut tally = [0usize; 256];
    for &v in values {
        tally[v as usize] += 1;
    }
    let mut best = 0u8;
    for v in 0..=255u8 {
        if tally[v as usize] > tally[best as usize] {
            best = v;
        }
    }
    best
}

/// Recover the payload text from in-memory shares.
pub fn extract(shares: &[Raster], layout: UnitLayout) -> Result<Extraction, ExtractError> {
    let bits = extract_bits(shares, layout)?;
    tracing::debug!(bits = bits.len(), "Recovered bits");
    Ok(match decode_text(&bits) {
        Ok(text) => Extraction::Recovered(text),
        Err(e) => {
            tracing::debug!(%e, "Recovered bits do not decode");
            Extraction::Undecodable
        }
    })
}

/// Recover the payload from every `*.png` share in `dir`.
///
/// Operator mistakes never surface as errors: a missing directory,
/// unreadable images or mismatched shapes give [`Extraction::Missing`],
/// ambiguous or non-text data give [`Extraction::Undecodable`].
pub fn extract_from_dir(dir: &Path, layout: UnitLayout) -> Extraction {
    let files = match list_share_files(dir) {
        Ok(files) => files,
        Err(e) => {
            tracing::warn!(%e, dir = %dir.display(), "Cannot read share directory");
            return Extraction::Missing;
        }
    };

    check_share_set(&files);

    let mut shares = Vec::with_capacity(files.len());
    for file in &files {
        match load_png(file) {
            Ok(raster) => shares.push(raster),
            Err(e) => {
                tracing::warn!(%e, path = %file.display(), "Cannot read share");
                return Extraction::Missing;
            }
        }
    }
    tracing::info!(shares = shares.len(), dir = %dir.display(), "Extracting payload");

    match extract(&shares, layout) {
        Ok(extraction) => extraction,
        Err(e @ ExtractError::AmbiguousSample { .. }) => {
            tracing::warn!(%e, "Extraction failed");
            Extraction::Undecodable
        }
        Err(e) => {
            tracing::warn!(%e, "Extraction failed");
            Extraction::Missing
        }
    }
}
