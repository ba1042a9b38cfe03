//! Sliding window of horizontally convolved source rows.
//!
//! The window holds `sample_count` consecutive intermediate rows, the
//! vertical support of one output row. Moving to the next output row
//! usually shares most of those rows, so a load first shifts the retained
//! rows to the front and then pulls only the missing ones from upstream.
//!
//! ```text
//! before: start=4  [ r4 r5 r6 r7 ]
//! load 6:          [ r6 r7 .. .. ]   rotate by 2, keep 2
//!                  [ r6 r7 r8 r9 ]   fetch 8, 9
//! ```
//!
//! A request starting before the window, or past its valid rows, resets it.
//! The valid-row count advances only after a fetch succeeds, so an upstream
//! error leaves the window consistent and a retry resumes with the failed
//! row.

use rescale_core::{PixelSource, Rect, Result};
use tracing::trace;

use crate::convolver::Convolver;
use crate::kernel::KernelMap;

/// Outcome of one [`RowWindow::load`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct LoadStats {
    /// Rows kept from the previous window.
    pub reused: usize,
    /// Rows fetched from upstream.
    pub fetched: usize,
}

/// Ring of intermediate rows, optionally paired with their raw rows.
#[derive(Debug)]
pub(crate) struct RowWindow {
    samples: usize,
    row_len: usize,
    raw_len: usize,
    start: usize,
    valid: usize,
    intermediate: Vec<i32>,
    raw: Vec<u8>,
    line: Vec<u8>,
    buffered: bool,
}

impl RowWindow {
    /// Creates an empty window of `samples` rows.
    ///
    /// `row_len` is the intermediate row length in samples, `raw_len` the
    /// raw source row length in bytes. With `buffered`, every raw row is
    /// kept next to its intermediate row.
    pub(crate) fn new(samples: usize, row_len: usize, raw_len: usize, buffered: bool) -> Self {
        let raw_rows = if buffered { samples } else { 0 };
        Self {
            samples,
            row_len,
            raw_len,
            start: 0,
            valid: 0,
            intermediate: vec![0; samples * row_len],
            raw: vec![0; raw_rows * raw_len],
            line: if buffered { Vec::new() } else { vec![0; raw_len] },
            buffered,
        }
    }

    /// Ensures rows `start..start + samples` are present.
    pub(crate) fn load<S: PixelSource + ?Sized>(
        &mut self,
        start: usize,
        source: &mut S,
        convolver: &Convolver,
        map: &KernelMap,
    ) -> Result<LoadStats> {
        if start < self.start || start >= self.start + self.valid {
            self.valid = 0;
        } else if start > self.start {
            let shift = start - self.start;
            self.intermediate.rotate_left(shift * self.row_len);
            if self.buffered {
                self.raw.rotate_left(shift * self.raw_len);
            }
            self.valid -= shift;
        }
        self.start = start;

        let reused = self.valid;
        let (width, _) = source.size();
        while self.valid < self.samples {
            let y = (self.start + self.valid) as u32;
            let slot = self.valid;
            let raw = if self.buffered {
                &mut self.raw[slot * self.raw_len..(slot + 1) * self.raw_len]
            } else {
                &mut self.line[..]
            };
            source.copy_pixels(Rect::new(0, y, width, 1), self.raw_len, raw)?;
            convolver.convolve_source_line(
                raw,
                &mut self.intermediate[slot * self.row_len..(slot + 1) * self.row_len],
                map,
            );
            self.valid += 1;
        }

        let stats = LoadStats {
            reused,
            fetched: self.samples - reused,
        };
        if stats.fetched > 0 {
            trace!(start, reused = stats.reused, fetched = stats.fetched, "window load");
        }
        Ok(stats)
    }

    /// Intermediate rows of the current window, back to back.
    #[inline]
    pub(crate) fn rows(&self) -> &[i32] {
        &self.intermediate
    }

    /// Intermediate row length in samples.
    #[inline]
    pub(crate) fn row_len(&self) -> usize {
        self.row_len
    }

    /// Raw source row `y`, if held by the window.
    ///
    /// Always `None` unless the window was created with `buffered`.
    pub(crate) fn source_row(&self, y: usize) -> Option<&[u8]> {
        let index = y.checked_sub(self.start)?;
        if !self.buffered || index >= self.valid {
            return None;
        }
        Some(&self.raw[index * self.raw_len..(index + 1) * self.raw_len])
    }
}
