//! Test fixtures and constants.

use halftone::Raster;

/// Payloads used across tests
pub mod payloads {
    /// Short text that does not look like a zlib header
    pub const SHORT: &str = "Hidden in plain sight";

    /// Single byte used by the 8x8 diffusion scenario
    pub const ONE_BIT: &[u8] = &[0x01];

    /// Far more than a tiny cover can carry
    pub const LONG: &str = "This payload is far too long for a four by four cover image";
}

/// Mid-tone cover: every block mixes both levels and no pattern cell
/// saturates, so embedding never runs out of blocks.
pub fn midtone_cover(width: usize, height: usize, channels: usize) -> Raster {
    Raster::from_fn(width, height, channels, |y, x, c| {
        (64 + (x * 5 + y * 3 + c * 20) % 128) as u8
    })
}

/// Uniform mid-gray cover (128)
pub fn mid_gray(width: usize, height: usize) -> Raster {
    Raster::from_fn(width, height, 1, |_, _, _| 128)
}
