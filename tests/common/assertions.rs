//! Assertion helpers for tests.

use halftone::{cell_on_count, Raster, CELL};
use pretty_assertions::assert_eq;

use htstego::services::{EmbedOutcome, RunStatus, ShareSet};

/// Assert the run embedded successfully
pub fn assert_run_ok(outcome: &EmbedOutcome) {
    assert_eq!(
        outcome.status,
        RunStatus::Ok,
        "Expected status ok. Record: {}",
        outcome.record().to_json()
    );
    assert!(outcome.share_set.is_some(), "Successful run without shares");
}

/// Number of shares whose sample differs from the reference
fn divergent_samples(set: &ShareSet, pixel: usize, channel: usize) -> usize {
    let expected = set.reference.sample(pixel, channel);
    set.shares
        .iter()
        .filter(|s| s.sample(pixel, channel) != expected)
        .count()
}

/// Assert shares equal the reference everywhere except at most one share
/// per sample, and that exactly `bits` samples diverge in total.
pub fn assert_sample_divergence(set: &ShareSet, bits: usize) {
    let reference = &set.reference;
    let mut total = 0;
    for pixel in 0..reference.pixel_count() {
        for channel in 0..reference.channels() {
            let diverging = divergent_samples(set, pixel, channel);
            assert!(
                diverging <= 1,
                "Pixel {} channel {} diverges in {} shares",
                pixel,
                channel,
                diverging
            );
            total += diverging;
        }
    }
    assert_eq!(total, bits, "Divergent samples vs payload bits");
}

/// Cell-level version of [`assert_sample_divergence`] for pattern shares.
pub fn assert_cell_divergence(set: &ShareSet, bits: usize) {
    let reference = &set.reference;
    let mut total = 0;
    for cy in 0..reference.height() / CELL {
        for cx in 0..reference.width() / CELL {
            for channel in 0..reference.channels() {
                let expected = cell_on_count(reference, cy, cx, channel);
                let diverging = set
                    .shares
                    .iter()
                    .filter(|s| cell_on_count(s, cy, cx, channel) != expected)
                    .count();
                assert!(
                    diverging <= 1,
                    "Cell ({}, {}) channel {} diverges in {} shares",
                    cy,
                    cx,
                    channel,
                    diverging
                );
                total += diverging;
            }
        }
    }
    assert_eq!(total, bits, "Divergent cells vs payload bits");
}

/// Assert every sample of `raster` is a halftone level
pub fn assert_bilevel(raster: &Raster) {
    assert!(
        raster.data().iter().all(|&v| v == 0 || v == 255),
        "Raster holds values other than 0 and 255"
    );
}
