//! # rescale-core
//!
//! Core types for streaming image resampling.
//!
//! This crate provides the foundational types shared by every pipeline
//! stage:
//!
//! - [`PixelSource`] - The pull-based `size` / `format` / `copy_pixels` contract
//! - [`PixelFormat`], [`BitDepth`], [`AlphaMode`] - Interleaved pixel layouts
//! - [`Rect`] - Pixel request rectangles
//! - [`ImageBuffer`], [`ImageView`] - In-memory sources and sinks
//! - [`Error`], [`Result`] - Shared error type
//!
//! ## Crate Structure
//!
//! ```text
//! rescale-core (this crate)
//!    ^
//!    |
//!    +-- rescale-ops (kernel maps, convolution, unsharp mask)
//!    +-- rescale-tests (end-to-end tests)
//!    +-- rescale-bench (benchmarks)
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod format;
pub mod image;
pub mod rect;
pub mod source;

// Re-exports for convenience
pub use error::*;
pub use format::*;
pub use image::*;
pub use rect::*;
pub use source::*;

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```
/// use rescale_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::format::{AlphaMode, BitDepth, PixelFormat};
    pub use crate::image::{ImageBuffer, ImageView};
    pub use crate::rect::Rect;
    pub use crate::source::{validate_request, PixelSource};
}
