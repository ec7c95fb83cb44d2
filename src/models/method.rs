use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Halftoning strategy as named on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    ErrDiff,
    Ordered,
    Pattern,
}

/// Smallest unit the embedder and extractor address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitLayout {
    /// One sample per pixel and channel (error diffusion, ordered).
    Samples,
    /// One 3x3 pattern cell per channel.
    Cells,
}

impl MethodKind {
    pub const ALL: [MethodKind; 3] = [MethodKind::ErrDiff, MethodKind::Ordered, MethodKind::Pattern];

    pub fn as_str(&self) -> &'static str {
        match self {
            MethodKind::ErrDiff => "errdiff",
            MethodKind::Ordered => "ordered",
            MethodKind::Pattern => "pattern",
        }
    }

    /// Tag used in share file names (`_ht{tag}{bin|col}_`).
    pub fn file_tag(&self) -> &'static str {
        match self {
            MethodKind::ErrDiff => "errdiff",
            MethodKind::Ordered => "ordered",
            MethodKind::Pattern => "pat",
        }
    }

    pub fn layout(&self) -> UnitLayout {
        match self {
            MethodKind::Pattern => UnitLayout::Cells,
            _ => UnitLayout::Samples,
        }
    }
}

impl fmt::Display for MethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MethodKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "errdiff" => Ok(MethodKind::ErrDiff),
            "ordered" => Ok(MethodKind::Ordered),
            "pattern" | "pat" => Ok(MethodKind::Pattern),
            _ => Err(ConfigError::UnknownMethod(s.to_string())),
        }
    }
}
