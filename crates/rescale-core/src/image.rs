//! In-memory pixel buffers.
//!
//! This module provides the two in-memory ends of a pipeline:
//! - [`ImageBuffer`] - Owned, row-major pixel storage
//! - [`ImageView`] - Borrowed, `Copy` view of the same storage
//!
//! Both implement [`PixelSource`], so a decoded image can feed a resampler
//! directly, and [`ImageBuffer::from_source`] materializes the output of any
//! pipeline.
//!
//! # Memory Layout
//!
//! Images store pixels in **row-major** order, top-to-bottom, with
//! `stride` bytes between the starts of consecutive rows:
//!
//! ```text
//! Memory: [B G R B G R B G R ... pad]  ← Row 0
//!         [B G R B G R B G R ... pad]  ← Row 1
//!         ...
//! ```
//!
//! # Usage
//!
//! ```rust
//! use rescale_core::{ImageBuffer, PixelFormat, PixelSource, Rect};
//!
//! let img = ImageBuffer::from_vec(2, 1, PixelFormat::Grey8, vec![10, 20]).unwrap();
//! let mut view = img.view();
//! let mut out = [0u8; 1];
//! view.copy_pixels(Rect::new(1, 0, 1, 1), 1, &mut out).unwrap();
//! assert_eq!(out, [20]);
//! ```

use crate::error::{Error, Result};
use crate::format::{BitDepth, PixelFormat};
use crate::rect::Rect;
use crate::source::{validate_request, PixelSource};

/// Owned pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBuffer {
    width: u32,
    height: u32,
    format: PixelFormat,
    stride: usize,
    data: Vec<u8>,
}

impl ImageBuffer {
    /// Creates a zero-filled buffer with a tightly packed stride.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] if the size overflows `usize`.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Result<Self> {
        let stride = format
            .row_bytes(width)
            .ok_or_else(|| Error::invalid_dimensions(width, height, "row size overflows"))?;
        let len = stride
            .checked_mul(height as usize)
            .ok_or_else(|| Error::invalid_dimensions(width, height, "buffer size overflows"))?;
        Ok(Self {
            width,
            height,
            format,
            stride,
            data: vec![0; len],
        })
    }

    /// Wraps tightly packed pixel bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferTooSmall`] if `data` does not hold exactly
    /// `width * height` pixels.
    pub fn from_vec(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> Result<Self> {
        let mut img = Self::new(width, height, format)?;
        if data.len() != img.data.len() {
            return Err(Error::BufferTooSmall {
                len: data.len(),
                required: img.data.len(),
            });
        }
        img.data = data;
        Ok(img)
    }

    /// Wraps 16-bit samples, storing them in native byte order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFormat`] if `format` is not 16-bit, or
    /// [`Error::BufferTooSmall`] on a sample count mismatch.
    pub fn from_u16(width: u32, height: u32, format: PixelFormat, samples: &[u16]) -> Result<Self> {
        if format.bit_depth() != BitDepth::U16 {
            return Err(Error::unsupported_format(format!("{format} is not a 16-bit format")));
        }
        let data = samples.iter().flat_map(|s| s.to_ne_bytes()).collect();
        Self::from_vec(width, height, format, data)
    }

    /// Drains `source` into a new buffer, top to bottom.
    ///
    /// # Errors
    ///
    /// Propagates any error reported by `source`.
    pub fn from_source<S: PixelSource + ?Sized>(source: &mut S) -> Result<Self> {
        let (width, height) = source.size();
        let mut img = Self::new(width, height, source.format())?;
        if !img.data.is_empty() {
            source.copy_pixels(Rect::from_size(width, height), img.stride, &mut img.data)?;
        }
        Ok(img)
    }

    /// Image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel layout.
    #[inline]
    pub fn pixel_format(&self) -> PixelFormat {
        self.format
    }

    /// Bytes between row starts.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Raw pixel bytes.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable raw pixel bytes.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consumes the buffer, returning its bytes.
    #[inline]
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Bytes of row `y`. Panics if `y` is out of range.
    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride;
        &self.data[start..start + self.stride]
    }

    /// Decodes all samples of a 16-bit image.
    pub fn samples_u16(&self) -> Vec<u16> {
        self.data
            .chunks_exact(2)
            .map(|b| u16::from_ne_bytes([b[0], b[1]]))
            .collect()
    }

    /// Returns a borrowed view of the whole image.
    #[inline]
    pub fn view(&self) -> ImageView<'_> {
        ImageView {
            width: self.width,
            height: self.height,
            format: self.format,
            stride: self.stride,
            data: &self.data,
        }
    }
}

impl PixelSource for ImageBuffer {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn format(&self) -> PixelFormat {
        self.format
    }

    fn copy_pixels(&mut self, rect: Rect, stride: usize, buffer: &mut [u8]) -> Result<()> {
        self.view().copy_pixels(rect, stride, buffer)
    }
}

/// Borrowed view of pixel storage.
///
/// Views are `Copy` and read-only, so many independent pipelines can pull
/// from the same decoded image at once.
#[derive(Debug, Clone, Copy)]
pub struct ImageView<'a> {
    width: u32,
    height: u32,
    format: PixelFormat,
    stride: usize,
    data: &'a [u8],
}

impl<'a> ImageView<'a> {
    /// Wraps raw bytes with an explicit stride.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStride`] or [`Error::BufferTooSmall`] if the
    /// bytes cannot describe a `width` x `height` image.
    pub fn new(width: u32, height: u32, format: PixelFormat, stride: usize, data: &'a [u8]) -> Result<Self> {
        validate_request(Rect::from_size(width, height), stride, data.len(), (width, height), format)?;
        Ok(Self {
            width,
            height,
            format,
            stride,
            data,
        })
    }
}

impl PixelSource for ImageView<'_> {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn format(&self) -> PixelFormat {
        self.format
    }

    fn copy_pixels(&mut self, rect: Rect, stride: usize, buffer: &mut [u8]) -> Result<()> {
        let row_bytes = validate_request(rect, stride, buffer.len(), self.size(), self.format)?;
        let offset = rect.x as usize * self.format.bytes_per_pixel();

        for r in 0..rect.height as usize {
            let src = (rect.y as usize + r) * self.stride + offset;
            let dst = r * stride;
            buffer[dst..dst + row_bytes].copy_from_slice(&self.data[src..src + row_bytes]);
        }

        Ok(())
    }
}
