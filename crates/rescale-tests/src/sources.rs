//! Instrumented pixel sources.

use rescale_core::{Error, ImageBuffer, PixelFormat, PixelSource, Rect, Result};
use tracing::trace;

/// Deterministic test image with structure in both axes.
pub fn pattern(width: u32, height: u32, format: PixelFormat) -> Result<ImageBuffer> {
    let row_bytes = format.row_bytes(width).unwrap_or(0);
    let data = (0..height as usize)
        .flat_map(|y| (0..row_bytes).map(move |x| ((x * 13 + y * 29 + (x ^ y) * 3) % 256) as u8))
        .collect();
    ImageBuffer::from_vec(width, height, format, data)
}

/// Records every row requested from the wrapped source.
#[derive(Debug)]
pub struct CountingSource<S> {
    inner: S,
    rows: Vec<u32>,
}

impl<S: PixelSource> CountingSource<S> {
    /// Wraps `inner`.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            rows: Vec::new(),
        }
    }

    /// The wrapped source.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Rows fetched so far, in request order (one entry per row per call).
    pub fn rows(&self) -> &[u32] {
        &self.rows
    }

    /// Number of row fetches.
    pub fn fetches(&self) -> usize {
        self.rows.len()
    }

    /// Number of distinct rows fetched.
    pub fn distinct(&self) -> usize {
        let mut rows = self.rows.clone();
        rows.sort_unstable();
        rows.dedup();
        rows.len()
    }
}

impl<S: PixelSource> PixelSource for CountingSource<S> {
    fn size(&self) -> (u32, u32) {
        self.inner.size()
    }

    fn format(&self) -> PixelFormat {
        self.inner.format()
    }

    fn copy_pixels(&mut self, rect: Rect, stride: usize, buffer: &mut [u8]) -> Result<()> {
        self.inner.copy_pixels(rect, stride, buffer)?;
        self.rows.extend(rect.y..rect.y + rect.height);
        Ok(())
    }
}

/// Fails the first `times` requests touching one row.
#[derive(Debug)]
pub struct FlakySource<S> {
    inner: S,
    row: u32,
    remaining: usize,
    failures: usize,
}

impl<S: PixelSource> FlakySource<S> {
    /// Wraps `inner`, failing `times` requests that include `row`.
    pub fn new(inner: S, row: u32, times: usize) -> Self {
        Self {
            inner,
            row,
            remaining: times,
            failures: 0,
        }
    }

    /// Number of failed requests.
    pub fn failures(&self) -> usize {
        self.failures
    }
}

impl<S: PixelSource> PixelSource for FlakySource<S> {
    fn size(&self) -> (u32, u32) {
        self.inner.size()
    }

    fn format(&self) -> PixelFormat {
        self.inner.format()
    }

    fn copy_pixels(&mut self, rect: Rect, stride: usize, buffer: &mut [u8]) -> Result<()> {
        if self.remaining > 0 && (rect.y..rect.y + rect.height).contains(&self.row) {
            self.remaining -= 1;
            self.failures += 1;
            trace!(row = self.row, "injected failure");
            return Err(Error::other(format!("read error at row {}", self.row)));
        }
        self.inner.copy_pixels(rect, stride, buffer)
    }
}
