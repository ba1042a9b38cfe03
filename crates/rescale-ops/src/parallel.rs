//! Parallel resize using Rayon.
//!
//! Stages are single-threaded, so parallelism comes from running several
//! independent pipelines at once: the output is cut into horizontal strips
//! and each strip is pulled through its own [`ConvolutionTransform`] (and
//! [`UnsharpMask`]) over a shared read-only [`ImageView`]. Kernel maps are
//! built once and shared through `Arc`.
//!
//! Strips overlap in source rows, so rows near strip boundaries are
//! convolved more than once. Output is identical to [`resize`](crate::pipeline::resize).
//!
//! # Example
//!
//! ```rust
//! use rescale_core::{ImageBuffer, PixelFormat};
//! use rescale_ops::parallel::resize_par;
//! use rescale_ops::settings::ResizeSettings;
//!
//! let src = ImageBuffer::new(256, 256, PixelFormat::Bgra32).unwrap();
//! let out = resize_par(&src, &ResizeSettings::new(100, 80)).unwrap();
//! assert_eq!(out.height(), 80);
//! ```

use std::sync::Arc;

use rayon::prelude::*;
use rescale_core::{ImageBuffer, ImageView, PixelSource, Rect};
use tracing::debug;

use crate::convolution::ConvolutionTransform;
use crate::convolver::Convolver;
use crate::kernel::KernelMap;
use crate::settings::ResizeSettings;
use crate::unsharp::UnsharpMask;
use crate::OpsResult;

/// Minimum output rows per strip.
const MIN_STRIP_ROWS: usize = 16;

/// Resizes `image` on the Rayon thread pool.
///
/// # Errors
///
/// Same as [`resize`](crate::pipeline::resize).
pub fn resize_par(image: &ImageBuffer, settings: &ResizeSettings) -> OpsResult<ImageBuffer> {
    settings.validate()?;
    let format = image.pixel_format();
    let convolver = Convolver::for_format(format)?;

    let view = image.view();
    let maps = if view.size() != (settings.width, settings.height) {
        let (color, alpha) = convolver.map_layout();
        let interpolation = settings.interpolation()?;
        let xmap = KernelMap::scale_map(image.width(), settings.width, color, alpha, &interpolation)?;
        let ymap = KernelMap::scale_map(image.height(), settings.height, color, alpha, &interpolation)?;
        Some((Arc::new(xmap), Arc::new(ymap)))
    } else {
        None
    };

    let mut out = ImageBuffer::new(settings.width, settings.height, format)?;
    let stride = out.stride();
    let rows = strip_rows(settings.height as usize, rayon::current_num_threads());
    debug!(
        width = settings.width,
        height = settings.height,
        strip_rows = rows,
        "parallel resize"
    );

    out.data_mut()
        .par_chunks_mut(stride * rows)
        .enumerate()
        .try_for_each(|(i, strip)| -> OpsResult<()> {
            let rect = Rect::new(0, (i * rows) as u32, settings.width, (strip.len() / stride) as u32);
            let mut stage = strip_pipeline(view, maps.as_ref(), settings)?;
            stage.copy_pixels(rect, stride, strip)?;
            Ok(())
        })?;

    Ok(out)
}

fn strip_pipeline<'a>(
    view: ImageView<'a>,
    maps: Option<&(Arc<KernelMap>, Arc<KernelMap>)>,
    settings: &ResizeSettings,
) -> OpsResult<Box<dyn PixelSource + 'a>> {
    let staged: Box<dyn PixelSource + 'a> = match maps {
        Some((xmap, ymap)) => Box::new(ConvolutionTransform::from_maps(view, xmap.clone(), ymap.clone())?),
        None => Box::new(view),
    };
    if settings.unsharp.is_enabled() {
        Ok(Box::new(UnsharpMask::new(staged, settings.unsharp)?))
    } else {
        Ok(staged)
    }
}

/// Rows per strip: about four strips per thread, never tiny.
fn strip_rows(height: usize, threads: usize) -> usize {
    height.div_ceil(threads.max(1) * 4).max(MIN_STRIP_ROWS).min(height.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpolation::Filter;
    use crate::pipeline::resize;
    use crate::settings::UnsharpMaskSettings;
    use rescale_core::PixelFormat;

    fn pattern(width: u32, height: u32, format: PixelFormat) -> ImageBuffer {
        let len = format.row_bytes(width).unwrap() * height as usize;
        let data = (0..len).map(|i| ((i * 31) ^ (i / 7)) as u8).collect();
        ImageBuffer::from_vec(width, height, format, data).unwrap()
    }

    #[test]
    fn test_strip_rows() {
        assert_eq!(strip_rows(1000, 4), 63);
        assert_eq!(strip_rows(100, 8), 16);
        assert_eq!(strip_rows(5, 8), 5);
    }

    #[test]
    fn test_matches_sequential() {
        let src = pattern(97, 203, PixelFormat::Bgr24);
        for filter in [Filter::Linear, Filter::Lanczos, Filter::Mitchell] {
            let s = ResizeSettings::new(45, 77).with_filter(filter);
            assert_eq!(resize_par(&src, &s).unwrap(), resize(&src, &s).unwrap());
        }
    }

    #[test]
    fn test_matches_sequential_with_unsharp() {
        let src = pattern(120, 90, PixelFormat::Bgra32);
        let s = ResizeSettings::new(60, 70).with_unsharp(UnsharpMaskSettings::new(100, 0.75, 1));
        assert_eq!(resize_par(&src, &s).unwrap(), resize(&src, &s).unwrap());
    }

    #[test]
    fn test_same_size() {
        let src = pattern(20, 40, PixelFormat::Grey16);
        assert_eq!(resize_par(&src, &ResizeSettings::new(20, 40)).unwrap(), src);
    }
}
