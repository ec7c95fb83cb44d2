//! Bi-level error diffusion.
//!
//! Each channel plane is scanned in row-major order. The pending value of
//! a sample is rounded to the nearest level (0 or 1, ties to even), and
//! the rounding error is spread over the not-yet-visited neighbours named
//! by the [`Kernel`]. Contributions falling outside the image are dropped.

use crate::kernel::Kernel;
use crate::raster::{OFF, ON};

/// Sliding window of pending sample values.
///
/// Holds only the rows the kernel can reach (`max_dy + 1`). Rows enter the
/// window already holding their input values, so diffused error is added
/// on top of the input in scan order.
///
/// # Usage Pattern
///
/// 1. Create with `new(plane, width, height, row_depth)`
/// 2. For each row:
///    a. Read the pending value with `pending(x)`
///    b. Spread the rounding error with `add_error(x, dy, error)`
///    c. Call `advance_row()` once the row is done
#[derive(Debug)]
struct PendingRows<'a> {
    /// rows[0] is the current row, rows[1] the next, etc.
    rows: Vec<Vec<f64>>,
    plane: &'a [f64],
    width: usize,
    height: usize,
    /// Index of the image row held in rows[0].
    current: usize,
}

impl<'a> PendingRows<'a> {
    fn new(plane: &'a [f64], width: usize, height: usize, row_depth: usize) -> Self {
        let rows = (0..row_depth)
            .map(|dy| Self::input_row(plane, width, height, dy))
            .collect();
        Self {
            rows,
            plane,
            width,
            height,
            current: 0,
        }
    }

    fn input_row(plane: &[f64], width: usize, height: usize, y: usize) -> Vec<f64> {
        if y < height {
            plane[y * width..(y + 1) * width].to_vec()
        } else {
            vec![0.0; width]
        }
    }

    #[inline]
    fn pending(&self, x: usize) -> f64 {
        self.rows[0][x]
    }

    /// Add error to a later sample. Out-of-bounds targets are ignored.
    #[inline]
    fn add_error(&mut self, x: i64, row_offset: usize, error: f64) {
        if x < 0 || x as usize >= self.width || row_offset >= self.rows.len() {
            return;
        }
        if self.current + row_offset >= self.height {
            return;
        }
        self.rows[row_offset][x as usize] += error;
    }

    fn advance_row(&mut self) {
        self.rows.rotate_left(1);
        self.current += 1;
        let incoming = self.current + self.rows.len() - 1;
        let row = Self::input_row(self.plane, self.width, self.height, incoming);
        if let Some(last) = self.rows.last_mut() {
            *last = row;
        }
    }
}

/// Diffuse one normalized plane (values nominally in `[0, 1]`) into a
/// bi-level plane of [`OFF`]/[`ON`] samples.
pub fn diffuse_plane(plane: &[f64], width: usize, height: usize, kernel: &Kernel) -> Vec<u8> {
    let mut output = vec![OFF; width * height];
    let mut window = PendingRows::new(plane, width, height, kernel.max_dy() + 1);

    for y in 0..height {
        for x in 0..width {
            let value = window.pending(x);
            let level = value.round_ties_even().clamp(0.0, 1.0);
            let error = value - level;
            output[y * width + x] = if level >= 1.0 { ON } else { OFF };

            if error != 0.0 {
                for &(dx, dy, weight) in kernel.entries() {
                    window.add_error(x as i64 + dx as i64, dy, error * weight);
                }
            }
        }
        window.advance_row();
    }

    output
}
