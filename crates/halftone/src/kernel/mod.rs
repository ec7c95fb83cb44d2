//! Error diffusion kernels.
//!
//! A kernel is plain data: a grid of weights with an `X` marking the
//! sample being quantized. Parsing turns the grid into a list of
//! `(dx, dy, weight)` entries so the diffusion engine never needs to know
//! which named kernel it is running.
//!
//! # Text format
//!
//! One row per line, entries separated by whitespace. Entries are
//! fractions (`7/16`), integers or decimals. Blank lines and lines
//! starting with `#` are ignored.
//!
//! ```text
//! # Floyd-Steinberg
//! 0     X     7/16
//! 3/16  5/16  1/16
//! ```

mod error;

pub use error::KernelError;

/// Tolerance used when checking that kernel weights sum to one.
const SUM_TOLERANCE: f64 = 1e-9;

/// A parsed error diffusion kernel.
///
/// # Buffer Sizing
///
/// `max_dy` is how many rows below the current one the kernel reaches;
/// the diffusion engine keeps `max_dy + 1` rows of pending values.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    name: String,
    /// (dx, dy, weight) entries, in grid order.
    ///
    /// - `dx`: horizontal offset from the current sample
    /// - `dy`: rows below the current sample (0 = same row)
    entries: Vec<(i32, usize, f64)>,
    max_dy: usize,
}

impl Kernel {
    /// Parse kernel text under the given name.
    ///
    /// The `X` marker must sit in the centre column of an odd-width grid.
    /// Rows above it and entries left of it in its own row describe
    /// samples that were already visited and must be zero.
    ///
    /// # Example
    ///
    /// ```
    /// use halftone::Kernel;
    ///
    /// let kernel = Kernel::parse("floyd", "0 X 7/16\n3/16 5/16 1/16").unwrap();
    /// assert_eq!(kernel.entries().len(), 4);
    /// assert_eq!(kernel.max_dy(), 1);
    /// ```
    pub fn parse(name: &str, text: &str) -> Result<Self, KernelError> {
        let rows: Vec<Vec<&str>> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| line.split_whitespace().collect())
            .collect();

        let width = match rows.first() {
            Some(first) => first.len(),
            None => return Err(KernelError::Empty),
        };
        for (row, tokens) in rows.iter().enumerate() {
            if tokens.len() != width {
                return Err(KernelError::RaggedRows {
                    row,
                    expected: width,
                    actual: tokens.len(),
                });
            }
        }
        if width % 2 == 0 {
            return Err(KernelError::EvenWidth(width));
        }

        // Locate the marker and parse every other entry.
        let mut origin = None;
        let mut grid = Vec::with_capacity(rows.len());
        for (row, tokens) in rows.iter().enumerate() {
            let mut weights = Vec::with_capacity(width);
            for (col, token) in tokens.iter().enumerate() {
                if token.eq_ignore_ascii_case("x") {
                    if origin.is_some() {
                        return Err(KernelError::MultipleOrigins);
                    }
                    origin = Some((row, col));
                    weights.push(0.0);
                } else {
                    let weight = parse_weight(token).ok_or_else(|| KernelError::BadWeight {
                        row,
                        col,
                        token: token.to_string(),
                    })?;
                    weights.push(weight);
                }
            }
            grid.push(weights);
        }

        let (oy, ox) = origin.ok_or(KernelError::MissingOrigin)?;
        if ox != width / 2 {
            return Err(KernelError::MisplacedOrigin { row: oy, col: ox });
        }

        let mut entries = Vec::new();
        let mut sum = 0.0;
        for (row, weights) in grid.iter().enumerate() {
            for (col, &weight) in weights.iter().enumerate() {
                if weight == 0.0 {
                    continue;
                }
                let visited = row < oy || (row == oy && col <= ox);
                if visited {
                    return Err(KernelError::VisitedWeight { row, col });
                }
                entries.push((col as i32 - ox as i32, row - oy, weight));
                sum += weight;
            }
        }
        if (sum - 1.0).abs() > SUM_TOLERANCE {
            return Err(KernelError::WeightSum(sum));
        }

        let max_dy = entries.iter().map(|&(_, dy, _)| dy).max().unwrap_or(0);
        Ok(Self {
            name: name.to_string(),
            entries,
            max_dy,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entries(&self) -> &[(i32, usize, f64)] {
        &self.entries
    }

    pub fn max_dy(&self) -> usize {
        self.max_dy
    }
}

/// Parse `a/b`, an integer or a decimal into a finite weight.
fn parse_weight(token: &str) -> Option<f64> {
    let value = match token.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => token.parse().ok()?,
    };
    value.is_finite().then_some(value)
}
