//! Public API for the halftone crate.
//!
//! This module provides the [`Halftoner`] builder, the
//! [`HalftoneMethod`] selection and the [`HalftoneError`] unified error
//! type.

mod builder;
mod error;
mod method;

pub use builder::Halftoner;
pub use error::HalftoneError;
pub use method::HalftoneMethod;
