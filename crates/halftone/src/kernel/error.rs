//! Kernel parsing and validation errors.

use std::fmt;

/// Error returned when kernel text cannot be turned into a [`Kernel`](super::Kernel).
#[derive(Debug, Clone, PartialEq)]
pub enum KernelError {
    /// No coefficient rows after stripping blanks and comments
    Empty,
    /// A row has a different number of entries than the first row
    RaggedRows { row: usize, expected: usize, actual: usize },
    /// Kernel width is even, so no centre column exists
    EvenWidth(usize),
    /// No `X` marker in the grid
    MissingOrigin,
    /// More than one `X` marker
    MultipleOrigins,
    /// `X` is not in the centre column
    MisplacedOrigin { row: usize, col: usize },
    /// Non-zero weight on a sample that has already been visited
    VisitedWeight { row: usize, col: usize },
    /// Entry is neither `X` nor a number or fraction
    BadWeight { row: usize, col: usize, token: String },
    /// Weights do not sum to 1
    WeightSum(f64),
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelError::Empty => write!(f, "kernel has no rows"),
            KernelError::RaggedRows {
                row,
                expected,
                actual,
            } => write!(
                f,
                "row {} has {} entries, expected {}",
                row + 1,
                actual,
                expected
            ),
            KernelError::EvenWidth(w) => write!(f, "kernel width {} is not odd", w),
            KernelError::MissingOrigin => write!(f, "kernel has no X marker"),
            KernelError::MultipleOrigins => write!(f, "kernel has more than one X marker"),
            KernelError::MisplacedOrigin { row, col } => write!(
                f,
                "X marker at row {}, column {} is not in the centre column",
                row + 1,
                col + 1
            ),
            KernelError::VisitedWeight { row, col } => write!(
                f,
                "weight at row {}, column {} targets an already visited sample",
                row + 1,
                col + 1
            ),
            KernelError::BadWeight { row, col, token } => write!(
                f,
                "invalid weight '{}' at row {}, column {}",
                token,
                row + 1,
                col + 1
            ),
            KernelError::WeightSum(sum) => write!(f, "weights sum to {}, expected 1", sum),
        }
    }
}

impl std::error::Error for KernelError {}
