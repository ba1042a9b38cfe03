//! Error types for rescale-core operations.
//!
//! This module provides the error type shared by every stage of a pixel
//! pipeline. Because stages compose through the [`crate::PixelSource`]
//! trait, an error raised deep inside an upstream stage surfaces unchanged
//! at the downstream caller of `copy_pixels`.
//!
//! # Overview
//!
//! The [`Error`] enum covers all failure modes that can occur during:
//! - Pixel requests (rectangle and buffer validation)
//! - Pixel format negotiation between stages
//! - Buffer construction (dimension and stride checks)
//!
//! # Usage
//!
//! ```rust
//! use rescale_core::{Error, Rect, Result};
//!
//! fn check(rect: Rect, width: u32, height: u32) -> Result<()> {
//!     if !Rect::from_size(width, height).contains_rect(&rect) {
//!         return Err(Error::invalid_region(rect, width, height));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check(Rect::new(0, 0, 4, 4), 4, 4).is_ok());
//! assert!(check(Rect::new(1, 0, 4, 4), 4, 4).is_err());
//! ```
//!
//! # Dependencies
//!
//! - [`thiserror`] - For derive macro error implementation

use crate::rect::Rect;
use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while producing or consuming pixels.
///
/// # Categories
///
/// - **Request errors**: [`InvalidRegion`](Error::InvalidRegion),
///   [`InvalidStride`](Error::InvalidStride), [`BufferTooSmall`](Error::BufferTooSmall)
/// - **Format errors**: [`UnsupportedFormat`](Error::UnsupportedFormat)
/// - **Dimension errors**: [`InvalidDimensions`](Error::InvalidDimensions)
#[derive(Debug, Error)]
pub enum Error {
    /// Requested rectangle extends beyond the source bounds.
    ///
    /// Returned before any byte of the destination buffer is written.
    #[error("region ({rx}, {ry}, {rw}x{rh}) exceeds image bounds {width}x{height}")]
    InvalidRegion {
        /// Region X origin
        rx: u32,
        /// Region Y origin
        ry: u32,
        /// Region width
        rw: u32,
        /// Region height
        rh: u32,
        /// Image width
        width: u32,
        /// Image height
        height: u32,
    },

    /// Pixel format is not supported by this stage.
    #[error("unsupported pixel format: {format}")]
    UnsupportedFormat {
        /// Format name or description
        format: String,
    },

    /// Invalid image dimensions.
    ///
    /// Returned when width or height is zero, or dimensions would cause
    /// integer overflow in buffer size calculations.
    #[error("invalid dimensions: {width}x{height} ({reason})")]
    InvalidDimensions {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
        /// Reason why dimensions are invalid
        reason: String,
    },

    /// Stride is too small for the requested width and pixel size.
    #[error("stride {stride} is less than minimum {min_stride} for width {width}")]
    InvalidStride {
        /// Provided stride
        stride: usize,
        /// Minimum required stride
        min_stride: usize,
        /// Requested width
        width: u32,
    },

    /// Destination buffer cannot hold the requested rectangle.
    #[error("buffer of {len} bytes is too small, {required} bytes required")]
    BufferTooSmall {
        /// Provided buffer length
        len: usize,
        /// Bytes required for the request
        required: usize,
    },

    /// Generic error with custom message.
    ///
    /// Catch-all for failures raised by custom upstream sources.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Creates an [`Error::InvalidRegion`] error for `rect` against an image
    /// of `width` x `height`.
    #[inline]
    pub fn invalid_region(rect: Rect, width: u32, height: u32) -> Self {
        Self::InvalidRegion {
            rx: rect.x,
            ry: rect.y,
            rw: rect.width,
            rh: rect.height,
            width,
            height,
        }
    }

    /// Creates an [`Error::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(width: u32, height: u32, reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            width,
            height,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::UnsupportedFormat`] error.
    #[inline]
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    /// Creates an [`Error::Other`] error.
    #[inline]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Returns `true` if this error describes a malformed request
    /// (rectangle, stride or buffer size) rather than a source failure.
    #[inline]
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidRegion { .. } | Self::InvalidStride { .. } | Self::BufferTooSmall { .. }
        )
    }
}
