//! Share embedder: one payload bit per block, one divergent share per bit.
//!
//! The reference halftone is split into equal blocks of units (pixels, or
//! 3x3 cells for pattern halftoning), `capacity / bits` units each. For
//! every bit a random channel is picked, a random unit inside the block
//! that can carry the bit is found by bounded rejection sampling, and a
//! single random share is changed at that unit. Blocks that cannot carry
//! the bit are skipped and the bit moves on to the next block.

use std::ops::Range;

use halftone::{cell_on_count, write_cell, Raster, CELL, MAX_LEVEL, OFF, ON};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::{UnitLayout, DEFAULT_MAX_ATTEMPTS};

/// Fewest shares from which a single divergent share can be told apart.
pub const MIN_SHARES: usize = 3;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum EmbedError {
    #[error("payload is empty")]
    EmptyPayload,

    #[error("payload too long: {bits} bits, capacity {capacity}")]
    PayloadTooLong { bits: usize, capacity: usize },

    #[error("embedding capacity exhausted: embedded {embedded} of {total} bits")]
    CapacityExhausted { embedded: usize, total: usize },

    #[error("at least {minimum} shares are required, got {requested}")]
    TooFewShares { requested: usize, minimum: usize },
}

/// Addressing of embeddable units within a reference raster.
///
/// A unit is the smallest position the embedder changes: a pixel for
/// sample layouts, a 3x3 cell for pattern layouts. Units are numbered in
/// row-major order.
pub trait ShareEncoding {
    /// Number of units per channel.
    fn unit_count(&self) -> usize;

    /// Units available for sizing blocks.
    fn capacity(&self) -> usize;

    /// Pick a unit in `block` of `channel` that can carry `bit`, or `None`
    /// if the block has to be skipped.
    fn select_unit<R: Rng + ?Sized>(
        &self,
        block: Range<usize>,
        channel: usize,
        bit: bool,
        max_attempts: usize,
        rng: &mut R,
    ) -> Option<usize>;

    /// Write `bit` into `unit` of `channel` in `share`.
    fn write_unit(&self, share: &mut Raster, unit: usize, channel: usize, bit: bool);
}

#[inline]
fn level_for(bit: bool) -> u8 {
    if bit {
        ON
    } else {
        OFF
    }
}

/// Rejection-sample a unit of `block` accepted by `usable`.
///
/// After `max_attempts` draws the pick falls back to a uniform choice among
/// the usable units, so a block with any usable unit is never skipped.
fn draw_unit<R: Rng + ?Sized>(
    block: Range<usize>,
    max_attempts: usize,
    rng: &mut R,
    usable: impl Fn(usize) -> bool,
) -> Option<usize> {
    if let Some(unit) = (0..max_attempts)
        .map(|_| rng.gen_range(block.clone()))
        .find(|&u| usable(u))
    {
        return Some(unit);
    }
    let candidates: Vec<usize> = block.filter(|&u| usable(u)).collect();
    tracing::trace!(
        candidates = candidates.len(),
        max_attempts,
        "Attempt cap reached, choosing among usable units"
    );
    candidates.choose(rng).copied()
}

/// One unit per pixel: error diffusion and ordered dithering.
pub struct SampleEncoding<'a> {
    reference: &'a Raster,
}

impl<'a> SampleEncoding<'a> {
    pub fn new(reference: &'a Raster) -> Self {
        Self { reference }
    }
}

impl ShareEncoding for SampleEncoding<'_> {
    fn unit_count(&self) -> usize {
        self.reference.pixel_count()
    }

    fn capacity(&self) -> usize {
        self.reference.pixel_count()
    }

    fn select_unit<R: Rng + ?Sized>(
        &self,
        block: Range<usize>,
        channel: usize,
        bit: bool,
        max_attempts: usize,
        rng: &mut R,
    ) -> Option<usize> {
        let target = level_for(bit);
        if block
            .clone()
            .all(|p| self.reference.sample(p, channel) == target)
        {
            return None;
        }
        draw_unit(block, max_attempts, rng, |p| {
            self.reference.sample(p, channel) != target
        })
    }

    fn write_unit(&self, share: &mut Raster, unit: usize, channel: usize, bit: bool) {
        share.set_sample(unit, channel, level_for(bit));
    }
}

/// One unit per 3x3 pattern cell.
pub struct CellEncoding<'a> {
    reference: &'a Raster,
    cells_wide: usize,
    cells_high: usize,
}

impl<'a> CellEncoding<'a> {
    pub fn new(reference: &'a Raster) -> Self {
        Self {
            reference,
            cells_wide: reference.width() / CELL,
            cells_high: reference.height() / CELL,
        }
    }

    fn cell(&self, unit: usize) -> (usize, usize) {
        (unit / self.cells_wide, unit % self.cells_wide)
    }

    fn on_count(&self, unit: usize, channel: usize) -> u8 {
        let (cy, cx) = self.cell(unit);
        cell_on_count(self.reference, cy, cx, channel)
    }

    fn is_saturated(count: u8) -> bool {
        count == 0 || count == MAX_LEVEL
    }
}

impl ShareEncoding for CellEncoding<'_> {
    fn unit_count(&self) -> usize {
        self.cells_wide * self.cells_high
    }

    /// Cells per channel that are neither fully off nor fully on, averaged
    /// over channels.
    fn capacity(&self) -> usize {
        let channels = self.reference.channels();
        let saturated = (0..channels)
            .flat_map(|c| (0..self.unit_count()).map(move |u| (u, c)))
            .filter(|&(u, c)| Self::is_saturated(self.on_count(u, c)))
            .count();
        (self.unit_count() * channels).saturating_sub(saturated) / channels
    }

    fn select_unit<R: Rng + ?Sized>(
        &self,
        block: Range<usize>,
        channel: usize,
        _bit: bool,
        max_attempts: usize,
        rng: &mut R,
    ) -> Option<usize> {
        let total: usize = block
            .clone()
            .map(|u| self.on_count(u, channel) as usize)
            .sum();
        if total == 0 || total == block.len() * MAX_LEVEL as usize {
            return None;
        }
        draw_unit(block, max_attempts, rng, |u| {
            !Self::is_saturated(self.on_count(u, channel))
        })
    }

    fn write_unit(&self, share: &mut Raster, unit: usize, channel: usize, bit: bool) {
        let count = self.on_count(unit, channel);
        let level = if bit { count + 1 } else { count - 1 };
        let (cy, cx) = self.cell(unit);
        write_cell(share, cy, cx, channel, level);
    }
}

/// Where one payload bit was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub bit_index: usize,
    pub bit: bool,
    pub share: usize,
    pub unit: usize,
    pub channel: usize,
}

/// Summary of one embedding pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbedReport {
    pub capacity: usize,
    pub block_size: usize,
    pub blocks_visited: usize,
    pub skipped_blocks: usize,
    pub placements: Vec<Placement>,
}

/// Reference halftone plus the N stego shares derived from it.
#[derive(Debug, Clone)]
pub struct ShareSet {
    pub reference: Raster,
    pub shares: Vec<Raster>,
    pub report: EmbedReport,
}

/// Embeds payload bits across a fixed number of shares.
#[derive(Debug, Clone)]
pub struct Embedder {
    share_count: usize,
    max_attempts: usize,
}

impl Embedder {
    pub fn new(share_count: usize) -> Result<Self, EmbedError> {
        if share_count < MIN_SHARES {
            return Err(EmbedError::TooFewShares {
                requested: share_count,
                minimum: MIN_SHARES,
            });
        }
        Ok(Self {
            share_count,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        })
    }

    /// Cap on rejection-sampling draws per block.
    pub fn max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn share_count(&self) -> usize {
        self.share_count
    }

    /// Number of bits `reference` can carry under `layout`.
    pub fn capacity(reference: &Raster, layout: UnitLayout) -> usize {
        match layout {
            UnitLayout::Samples => SampleEncoding::new(reference).capacity(),
            UnitLayout::Cells => CellEncoding::new(reference).capacity(),
        }
    }

    /// Embed `bits` into copies of `reference`.
    pub fn embed<R: Rng + ?Sized>(
        &self,
        reference: &Raster,
        layout: UnitLayout,
        bits: &[bool],
        rng: &mut R,
    ) -> Result<ShareSet, EmbedError> {
        match layout {
            UnitLayout::Samples => self.embed_with(&SampleEncoding::new(reference), reference, bits, rng),
            UnitLayout::Cells => self.embed_with(&CellEncoding::new(reference), reference, bits, rng),
        }
    }

    fn embed_with<E: ShareEncoding, R: Rng + ?Sized>(
        &self,
        encoding: &E,
        reference: &Raster,
        bits: &[bool],
        rng: &mut R,
    ) -> Result<ShareSet, EmbedError> {
        if bits.is_empty() {
            return Err(EmbedError::EmptyPayload);
        }
        let capacity = encoding.capacity();
        if bits.len() > capacity {
            return Err(EmbedError::PayloadTooLong {
                bits: bits.len(),
                capacity,
            });
        }

        let block_size = capacity / bits.len();
        let block_count = encoding.unit_count() / block_size;
        let channels = reference.channels();
        let mut shares = vec![reference.clone(); self.share_count];
        let mut report = EmbedReport {
            capacity,
            block_size,
            ..EmbedReport::default()
        };

        tracing::debug!(
            bits = bits.len(),
            capacity,
            block_size,
            block_count,
            shares = self.share_count,
            "Embedding payload"
        );

        let mut cursor = 0;
        for block in 0..block_count {
            if cursor == bits.len() {
                break;
            }
            report.blocks_visited += 1;
            let range = block * block_size..(block + 1) * block_size;
            let bit = bits[cursor];
            let channel = rng.gen_range(0..channels);

            let Some(unit) =
                encoding.select_unit(range, channel, bit, self.max_attempts, rng)
            else {
                report.skipped_blocks += 1;
                tracing::trace!(block, bit_index = cursor, "Block cannot carry bit, skipping");
                continue;
            };

            let share = rng.gen_range(0..self.share_count);
            encoding.write_unit(&mut shares[share], unit, channel, bit);
            report.placements.push(Placement {
                bit_index: cursor,
                bit,
                share,
                unit,
                channel,
            });
            cursor += 1;
        }

        if cursor < bits.len() {
            tracing::warn!(
                embedded = cursor,
                total = bits.len(),
                "Ran out of blocks before the payload was embedded"
            );
            return Err(EmbedError::CapacityExhausted {
                embedded: cursor,
                total: bits.len(),
            });
        }

        tracing::info!(
            bits = bits.len(),
            skipped = report.skipped_blocks,
            "Payload embedded"
        );
        Ok(ShareSet {
            reference: reference.clone(),
            shares,
            report,
        })
    }
}
