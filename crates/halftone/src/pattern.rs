//! Pattern-cell halftoning.
//!
//! Each 8-bit input sample is quantized to a level `0..=9` and expanded
//! into a 3x3 cell of bi-level dots. Level `L` switches on every dot whose
//! entry in [`PATTERN_MAP`] is below `L`, so a cell with level `L` has
//! exactly `L` dots on.

use crate::raster::{Raster, OFF, ON};

/// Side length of a pattern cell.
pub const CELL: usize = 3;

/// Highest pattern level (all nine dots on).
pub const MAX_LEVEL: u8 = 9;

/// Order in which dots of a cell switch on.
///
/// ```text
///   2 0 4
///   7 8 5
///   3 6 1
/// ```
pub const PATTERN_MAP: [[u8; CELL]; CELL] = [[2, 0, 4], [7, 8, 5], [3, 6, 1]];

/// Map an 8-bit sample to a pattern level (`value / 26`).
#[inline]
pub fn quantize(value: u8) -> u8 {
    value / 26
}

/// Dots of a cell at the given level, row-major.
pub fn cell_pattern(level: u8) -> [[u8; CELL]; CELL] {
    let mut cell = [[OFF; CELL]; CELL];
    for (r, row) in PATTERN_MAP.iter().enumerate() {
        for (c, &order) in row.iter().enumerate() {
            if order < level {
                cell[r][c] = ON;
            }
        }
    }
    cell
}

/// Write the pattern for `level` into cell `(cy, cx)` of channel `c`.
pub fn write_cell(raster: &mut Raster, cy: usize, cx: usize, c: usize, level: u8) {
    let cell = cell_pattern(level);
    for (r, row) in cell.iter().enumerate() {
        for (col, &v) in row.iter().enumerate() {
            raster.set(cy * CELL + r, cx * CELL + col, c, v);
        }
    }
}

/// Number of dots that are on in cell `(cy, cx)` of channel `c`.
pub fn cell_on_count(raster: &Raster, cy: usize, cx: usize, c: usize) -> u8 {
    let mut count = 0;
    for r in 0..CELL {
        for col in 0..CELL {
            if raster.get(cy * CELL + r, cx * CELL + col, c) == ON {
                count += 1;
            }
        }
    }
    count
}

/// Expand row-major level planes (one per channel) into a halftoned
/// raster three times the size.
pub fn render_levels(levels: &[Vec<u8>], width: usize, height: usize) -> Raster {
    let mut out = Raster::new(width * CELL, height * CELL, levels.len());
    for (c, plane) in levels.iter().enumerate() {
        for cy in 0..height {
            for cx in 0..width {
                write_cell(&mut out, cy, cx, c, plane[cy * width + cx]);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantize_levels() {
        assert_eq!(quantize(0), 0);
        assert_eq!(quantize(25), 0);
        assert_eq!(quantize(26), 1);
        assert_eq!(quantize(128), 4);
        assert_eq!(quantize(255), MAX_LEVEL);
    }

    #[test]
    fn test_level_equals_on_count() {
        for level in 0..=MAX_LEVEL {
            let on = cell_pattern(level)
                .iter()
                .flatten()
                .filter(|&&v| v == ON)
                .count();
            assert_eq!(on, level as usize, "level {} has {} dots on", level, on);
        }
    }

    #[test]
    fn test_first_dot_is_top_centre() {
        let cell = cell_pattern(1);
        assert_eq!(cell, [[OFF, ON, OFF], [OFF, OFF, OFF], [OFF, OFF, OFF]]);
    }

    #[test]
    fn test_write_and_count_cell() {
        let mut raster = Raster::new(6, 3, 1);
        write_cell(&mut raster, 0, 1, 0, 5);
        assert_eq!(cell_on_count(&raster, 0, 1, 0), 5);
        assert_eq!(cell_on_count(&raster, 0, 0, 0), 0);
    }

    #[test]
    fn test_render_levels_triples_size() {
        let out = render_levels(&[vec![0, 9, 4, 2]], 2, 2);
        assert_eq!((out.width(), out.height()), (6, 6));
        assert_eq!(cell_on_count(&out, 0, 1, 0), 9);
        assert_eq!(cell_on_count(&out, 1, 0, 0), 4);
    }
}
