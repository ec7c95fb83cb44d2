//! htstego - halftone steganography
//!
//! Hides a payload across a set of visually identical halftoned shares of
//! one cover image. Each share on its own is an ordinary halftone; the
//! payload only appears when the whole set is compared.
//! This library exposes modules for integration testing.

pub mod assets;
pub mod error;
pub mod models;
pub mod rendering;
pub mod services;
