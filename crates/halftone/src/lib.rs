#![allow(clippy::module_inception, clippy::needless_range_loop)]

//! halftone: bi-level halftoning on integer rasters
//!
//! This library turns continuous-tone covers into rasters that only hold
//! the two levels [`OFF`] and [`ON`], using one of three strategies:
//!
//! - **Error diffusion** with any [`Kernel`] parsed from text
//! - **Ordered dithering** against a recursive Bayer matrix
//! - **Pattern cells**, expanding every sample into a 3x3 dot cell
//!
//! # Quick Start
//!
//! ```
//! use halftone::{ColorMode, HalftoneMethod, Halftoner, Kernel, Raster};
//!
//! let kernel = Kernel::parse("floyd", "0 X 7/16\n3/16 5/16 1/16").unwrap();
//! let cover = Raster::from_fn(8, 8, 3, |y, x, _| (y * 32 + x * 4) as u8);
//!
//! let shares = Halftoner::new(HalftoneMethod::ErrorDiffusion(kernel))
//!     .mode(ColorMode::Binary)
//!     .render(&cover)
//!     .unwrap();
//!
//! assert_eq!(shares.channels(), 1);
//! assert_eq!((shares.width(), shares.height()), (8, 8));
//! ```
//!
//! # Color Modes
//!
//! [`ColorMode::Binary`] reduces the cover to luminance first;
//! [`ColorMode::Color`] halftones each RGB channel on its own and fails
//! with [`HalftoneError::GrayscaleToColor`] for single-channel covers.

pub mod api;
pub mod bayer;
pub mod diffusion;
pub mod kernel;
pub mod ordered;
pub mod pattern;
pub mod prepare;
pub mod raster;


pub use api::{HalftoneError, HalftoneMethod, Halftoner};
pub use bayer::{bayer_indices, bayer_matrix, MAX_BAYER_SIZE};
pub use kernel::{Kernel, KernelError};
pub use ordered::OrderedDither;
pub use pattern::{cell_on_count, write_cell, CELL, MAX_LEVEL, PATTERN_MAP};
pub use raster::{ColorMode, Raster, OFF, ON};
