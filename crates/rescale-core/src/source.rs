//! The pull-based pixel source contract.
//!
//! Every stage of a pipeline (decoder adapter, converter, resampler,
//! sharpener) exposes the same small interface: its size, its pixel format,
//! and a `copy_pixels` call that fills a caller-owned buffer with an
//! arbitrary rectangle. Stages hold their upstream by value and pull rows
//! from it on demand, so a pipeline is simply nested sources.
//!
//! ```text
//! consumer ──copy_pixels──► stage N ──copy_pixels──► ... ──► stage 0 (decoded image)
//! ```
//!
//! # Contract
//!
//! - `copy_pixels` either fully populates the requested rectangle in
//!   `buffer` or returns an error.
//! - Row `r` of the request is written at byte offset `r * stride`.
//! - Requests are validated with [`validate_request`] before any byte is
//!   written.
//! - Implementations are single-threaded (`&mut self`); independent
//!   instances may run on separate threads.

use crate::error::{Error, Result};
use crate::format::PixelFormat;
use crate::rect::Rect;

/// A stage that produces pixels on request.
pub trait PixelSource {
    /// Returns `(width, height)` of the produced image.
    fn size(&self) -> (u32, u32);

    /// Returns the layout of the produced pixels.
    fn format(&self) -> PixelFormat;

    /// Copies `rect` into `buffer`, one row every `stride` bytes.
    fn copy_pixels(&mut self, rect: Rect, stride: usize, buffer: &mut [u8]) -> Result<()>;

    /// Returns the full-image rectangle.
    #[inline]
    fn bounds(&self) -> Rect {
        let (width, height) = self.size();
        Rect::from_size(width, height)
    }
}

impl<T: PixelSource + ?Sized> PixelSource for Box<T> {
    #[inline]
    fn size(&self) -> (u32, u32) {
        (**self).size()
    }

    #[inline]
    fn format(&self) -> PixelFormat {
        (**self).format()
    }

    #[inline]
    fn copy_pixels(&mut self, rect: Rect, stride: usize, buffer: &mut [u8]) -> Result<()> {
        (**self).copy_pixels(rect, stride, buffer)
    }
}

impl<T: PixelSource + ?Sized> PixelSource for &mut T {
    #[inline]
    fn size(&self) -> (u32, u32) {
        (**self).size()
    }

    #[inline]
    fn format(&self) -> PixelFormat {
        (**self).format()
    }

    #[inline]
    fn copy_pixels(&mut self, rect: Rect, stride: usize, buffer: &mut [u8]) -> Result<()> {
        (**self).copy_pixels(rect, stride, buffer)
    }
}

/// Checks a `copy_pixels` request against a source of `size` and `format`.
///
/// Returns the number of bytes in one requested row on success.
///
/// # Errors
///
/// - [`Error::InvalidRegion`] if `rect` is not inside `[0, 0, width, height)`
/// - [`Error::InvalidStride`] if `stride` cannot hold one requested row
/// - [`Error::BufferTooSmall`] if `buffer_len` cannot hold the request
///
/// # Example
///
/// ```rust
/// use rescale_core::{validate_request, PixelFormat, Rect};
///
/// let row = validate_request(Rect::new(0, 0, 4, 2), 16, 32, (4, 2), PixelFormat::Bgra32).unwrap();
/// assert_eq!(row, 16);
/// assert!(validate_request(Rect::new(0, 0, 4, 2), 12, 32, (4, 2), PixelFormat::Bgra32).is_err());
/// ```
pub fn validate_request(
    rect: Rect,
    stride: usize,
    buffer_len: usize,
    size: (u32, u32),
    format: PixelFormat,
) -> Result<usize> {
    let (width, height) = size;
    if !Rect::from_size(width, height).contains_rect(&rect) {
        return Err(Error::invalid_region(rect, width, height));
    }

    let row_bytes = format
        .row_bytes(rect.width)
        .ok_or_else(|| Error::invalid_dimensions(rect.width, rect.height, "row size overflows"))?;
    if stride < row_bytes {
        return Err(Error::InvalidStride {
            stride,
            min_stride: row_bytes,
            width: rect.width,
        });
    }

    if rect.height > 0 {
        let required = (rect.height as usize - 1)
            .checked_mul(stride)
            .and_then(|v| v.checked_add(row_bytes))
            .ok_or_else(|| Error::invalid_dimensions(rect.width, rect.height, "buffer size overflows"))?;
        if buffer_len < required {
            return Err(Error::BufferTooSmall {
                len: buffer_len,
                required,
            });
        }
    }

    Ok(row_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_out_of_bounds() {
        let err = validate_request(Rect::new(0, 1, 4, 2), 4, 8, (4, 2), PixelFormat::Grey8).unwrap_err();
        assert!(matches!(err, Error::InvalidRegion { .. }));
    }

    #[test]
    fn test_validate_stride() {
        let err = validate_request(Rect::new(0, 0, 4, 1), 7, 64, (4, 1), PixelFormat::Grey16).unwrap_err();
        assert!(matches!(err, Error::InvalidStride { min_stride: 8, .. }));
    }

    #[test]
    fn test_validate_last_row_needs_no_padding() {
        // Two rows at stride 10 need 10 + 6 bytes, not 20.
        let row = validate_request(Rect::new(0, 0, 2, 2), 10, 16, (2, 2), PixelFormat::Bgr24).unwrap();
        assert_eq!(row, 6);
        let err = validate_request(Rect::new(0, 0, 2, 2), 10, 15, (2, 2), PixelFormat::Bgr24).unwrap_err();
        assert!(matches!(err, Error::BufferTooSmall { required: 16, .. }));
    }

    #[test]
    fn test_validate_empty_request() {
        assert_eq!(validate_request(Rect::new(4, 2, 0, 0), 0, 0, (4, 2), PixelFormat::Grey8).unwrap(), 0);
    }
}
