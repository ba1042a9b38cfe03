//! Unsharp-mask sharpening stage.
//!
//! [`UnsharpMask`] runs a Gaussian blur over its (already resampled)
//! upstream with a buffered-source [`ConvolutionTransform`], then combines
//! each blurred row with the matching sharp row held in the same window:
//!
//! ```text
//! upstream row y ──► window (raw rows + blurred intermediates)
//!                      │                 │
//!                   sharp row y     blurred row y
//!                      └──► sharpen_line ◄┘ ──► output row y
//! ```
//!
//! The blur window is centered on the output row and clamped at the image
//! edges, so upstream rows are never read past the top or bottom, and each
//! is read once for top-to-bottom requests.

use std::sync::Arc;

use rescale_core::{validate_request, Error, PixelFormat, PixelSource, Rect, Result};
use tracing::{debug, trace};

use crate::convolution::ConvolutionTransform;
use crate::convolver::Convolver;
use crate::kernel::KernelMap;
use crate::settings::UnsharpMaskSettings;
use crate::{OpsError, OpsResult};

/// Sharpening stage.
#[derive(Debug)]
pub struct UnsharpMask<S> {
    blur: ConvolutionTransform<S>,
    settings: UnsharpMaskSettings,
    blurred: Vec<u8>,
}

impl<S: PixelSource> UnsharpMask<S> {
    /// Sharpens `source` with `settings`.
    ///
    /// # Errors
    ///
    /// - [`OpsError::InvalidParameter`] if `settings` are invalid or disabled
    /// - [`OpsError::Unsupported`] if the source format has no convolver
    pub fn new(source: S, settings: UnsharpMaskSettings) -> OpsResult<Self> {
        settings.validate()?;
        if !settings.is_enabled() {
            return Err(OpsError::InvalidParameter(
                "unsharp mask needs amount > 0 and radius > 0".into(),
            ));
        }

        let convolver = Convolver::for_format(source.format())?;
        let (color, alpha) = convolver.map_layout();
        let (width, height) = source.size();

        let xmap = KernelMap::blur_map(width, settings.radius, color, alpha)?;
        let ymap = KernelMap::blur_map(height, settings.radius, color, alpha)?;
        debug!(
            width,
            height,
            amount = settings.amount,
            radius = settings.radius,
            threshold = settings.threshold,
            taps = ymap.sample_count(),
            "unsharp mask"
        );

        let blur = ConvolutionTransform::with_buffered_source(source, Arc::new(xmap), Arc::new(ymap))?;
        let row_bytes = convolver.bytes_per_pixel() * width as usize;
        Ok(Self {
            blur,
            settings,
            blurred: vec![0; row_bytes],
        })
    }

    /// Sharpening parameters.
    pub fn settings(&self) -> &UnsharpMaskSettings {
        &self.settings
    }

    /// Upstream source rows fetched so far.
    pub fn rows_fetched(&self) -> u64 {
        self.blur.rows_fetched()
    }

    /// Consumes the stage and returns the upstream source.
    pub fn into_inner(self) -> S {
        self.blur.into_inner()
    }
}

impl<S: PixelSource> PixelSource for UnsharpMask<S> {
    fn size(&self) -> (u32, u32) {
        self.blur.size()
    }

    fn format(&self) -> PixelFormat {
        self.blur.format()
    }

    fn copy_pixels(&mut self, rect: Rect, stride: usize, buffer: &mut [u8]) -> Result<()> {
        let format = self.format();
        let row_bytes = validate_request(rect, stride, buffer.len(), self.size(), format)?;
        trace!(%rect, "unsharp copy_pixels");

        let offset = rect.x as usize * format.bytes_per_pixel();
        let convolver = self.blur.convolver();
        for r in 0..rect.height {
            let y = rect.y + r;
            let blurred = &mut self.blurred[..row_bytes];
            self.blur.write_row(y, blurred, rect.x, rect.width)?;

            let sharp = self
                .blur
                .buffered_row(y as usize)
                .ok_or_else(|| Error::other(format!("row {y} missing from blur window")))?;
            let dst = &mut buffer[r as usize * stride..r as usize * stride + row_bytes];
            convolver.sharpen_line(
                &sharp[offset..offset + row_bytes],
                &self.blurred[..row_bytes],
                dst,
                self.settings.amount,
                self.settings.threshold,
            );
        }
        Ok(())
    }
}
