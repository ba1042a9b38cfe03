//! Streaming separable resampler.
//!
//! [`ConvolutionTransform`] wraps an upstream [`PixelSource`] and is itself
//! a `PixelSource` producing the resampled image. Output rows are computed
//! on demand:
//!
//! 1. look up the vertical map entry of the output row
//! 2. slide the row window to that entry's source rows, fetching and
//!    horizontally convolving only rows not already held
//! 3. run the vertical pass over the window into the caller's buffer
//!
//! Requests in non-decreasing row order fetch every source row at most
//! once. Other orders stay correct and pay a window reload.
//!
//! # Example
//!
//! ```rust
//! use rescale_core::{ImageBuffer, PixelFormat, PixelSource};
//! use rescale_ops::convolution::ConvolutionTransform;
//! use rescale_ops::interpolation::Filter;
//!
//! let src = ImageBuffer::from_vec(4, 1, PixelFormat::Grey8, vec![10, 20, 30, 40]).unwrap();
//! let settings = Filter::Average.settings().unwrap();
//! let mut half = ConvolutionTransform::new(src, 2, 1, &settings).unwrap();
//!
//! let out = ImageBuffer::from_source(&mut half).unwrap();
//! assert_eq!(out.data(), &[15, 35]);
//! ```

use std::sync::Arc;

use rescale_core::{validate_request, PixelFormat, PixelSource, Rect, Result};
use tracing::{debug, trace};

use crate::convolver::Convolver;
use crate::interpolation::InterpolationSettings;
use crate::kernel::KernelMap;
use crate::window::{LoadStats, RowWindow};
use crate::{OpsError, OpsResult};

/// Separable resampling stage.
#[derive(Debug)]
pub struct ConvolutionTransform<S> {
    source: S,
    format: PixelFormat,
    convolver: Convolver,
    xmap: Arc<KernelMap>,
    ymap: Arc<KernelMap>,
    window: RowWindow,
    fetched: u64,
}

impl<S: PixelSource> ConvolutionTransform<S> {
    /// Resamples `source` to `width` x `height` with `interpolation`.
    ///
    /// # Errors
    ///
    /// - [`OpsError::Unsupported`] if the source format has no convolver
    /// - [`OpsError::InvalidParameter`] for a zero target size
    pub fn new(source: S, width: u32, height: u32, interpolation: &InterpolationSettings) -> OpsResult<Self> {
        let convolver = Convolver::for_format(source.format())?;
        let (color, alpha) = convolver.map_layout();
        let (sw, sh) = source.size();

        let xmap = KernelMap::scale_map(sw, width, color, alpha, interpolation)?;
        let ymap = KernelMap::scale_map(sh, height, color, alpha, interpolation)?;
        Self::from_maps(source, Arc::new(xmap), Arc::new(ymap))
    }

    /// Builds a stage from prebuilt maps.
    ///
    /// Maps are immutable and may be shared between stages, e.g. one per
    /// strip of a tiled resize.
    ///
    /// # Errors
    ///
    /// - [`OpsError::Unsupported`] if the source format has no convolver or
    ///   a map's channel layout does not match it
    /// - [`OpsError::InvalidParameter`] if a map's input size differs from
    ///   the source size
    pub fn from_maps(source: S, xmap: Arc<KernelMap>, ymap: Arc<KernelMap>) -> OpsResult<Self> {
        Self::build(source, xmap, ymap, false)
    }

    /// Like [`from_maps`](Self::from_maps), but also retains the raw source
    /// rows of the current window, readable through
    /// [`buffered_row`](Self::buffered_row).
    pub fn with_buffered_source(source: S, xmap: Arc<KernelMap>, ymap: Arc<KernelMap>) -> OpsResult<Self> {
        Self::build(source, xmap, ymap, true)
    }

    fn build(source: S, xmap: Arc<KernelMap>, ymap: Arc<KernelMap>, buffered: bool) -> OpsResult<Self> {
        let format = source.format();
        let convolver = Convolver::for_format(format)?;
        convolver.check_map(&xmap)?;
        convolver.check_map(&ymap)?;

        let (sw, sh) = source.size();
        if xmap.input_size() != sw as usize || ymap.input_size() != sh as usize {
            return Err(OpsError::InvalidParameter(format!(
                "maps expect {}x{} input, source is {sw}x{sh}",
                xmap.input_size(),
                ymap.input_size()
            )));
        }

        let raw_len = format.bytes_per_pixel() * sw as usize;
        let row_len = xmap.output_size() * convolver.channels();
        let window = RowWindow::new(ymap.sample_count(), row_len, raw_len, buffered);

        debug!(
            src_width = sw,
            src_height = sh,
            dst_width = xmap.output_size(),
            dst_height = ymap.output_size(),
            x_samples = xmap.sample_count(),
            y_samples = ymap.sample_count(),
            ?convolver,
            buffered,
            "convolution transform"
        );

        Ok(Self {
            source,
            format,
            convolver,
            xmap,
            ymap,
            window,
            fetched: 0,
        })
    }

    /// Horizontal kernel map.
    pub fn horizontal_map(&self) -> &Arc<KernelMap> {
        &self.xmap
    }

    /// Vertical kernel map.
    pub fn vertical_map(&self) -> &Arc<KernelMap> {
        &self.ymap
    }

    /// Row strategy chosen for the source format.
    pub fn convolver(&self) -> Convolver {
        self.convolver
    }

    /// Upstream source rows fetched so far.
    pub fn rows_fetched(&self) -> u64 {
        self.fetched
    }

    /// Borrows the upstream source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Consumes the stage and returns the upstream source.
    pub fn into_inner(self) -> S {
        self.source
    }

    /// Raw source row `y` if it is held by the current window.
    ///
    /// Only available with [`with_buffered_source`](Self::with_buffered_source);
    /// returns `None` otherwise or when `y` is outside the window.
    pub fn buffered_row(&self, y: usize) -> Option<&[u8]> {
        self.window.source_row(y)
    }

    /// Computes output pixels `ox..ox + ow` of output row `oy` into `dst`.
    pub(crate) fn write_row(&mut self, oy: u32, dst: &mut [u8], ox: u32, ow: u32) -> Result<()> {
        let entry = self.ymap.entry(oy as usize);
        let LoadStats { fetched, .. } = self
            .window
            .load(entry.start, &mut self.source, &self.convolver, &self.xmap)?;
        self.fetched += fetched as u64;

        self.convolver.write_dest_line(
            self.window.rows(),
            self.window.row_len(),
            dst,
            ox as usize,
            ow as usize,
            entry.weights,
        );
        Ok(())
    }
}

impl<S: PixelSource> PixelSource for ConvolutionTransform<S> {
    fn size(&self) -> (u32, u32) {
        (self.xmap.output_size() as u32, self.ymap.output_size() as u32)
    }

    fn format(&self) -> PixelFormat {
        self.format
    }

    fn copy_pixels(&mut self, rect: Rect, stride: usize, buffer: &mut [u8]) -> Result<()> {
        let row_bytes = validate_request(rect, stride, buffer.len(), self.size(), self.format)?;
        trace!(%rect, "convolution copy_pixels");

        for r in 0..rect.height {
            let offset = r as usize * stride;
            self.write_row(rect.y + r, &mut buffer[offset..offset + row_bytes], rect.x, rect.width)?;
        }
        Ok(())
    }
}
