//! Composing resample and sharpen stages from [`ResizeSettings`].
//!
//! # Example
//!
//! ```rust
//! use rescale_core::{ImageBuffer, PixelFormat};
//! use rescale_ops::pipeline::{fit_dimensions, resize};
//! use rescale_ops::settings::ResizeSettings;
//!
//! let src = ImageBuffer::new(64, 48, PixelFormat::Bgr24).unwrap();
//! let (w, h) = fit_dimensions(64, 48, 32, 32);
//! assert_eq!((w, h), (32, 24));
//!
//! let out = resize(&src, &ResizeSettings::new(w, h)).unwrap();
//! assert_eq!((out.width(), out.height()), (32, 24));
//! ```

use rescale_core::{ImageBuffer, PixelSource};
use tracing::debug;

use crate::convolution::ConvolutionTransform;
use crate::settings::ResizeSettings;
use crate::unsharp::UnsharpMask;
use crate::OpsResult;

/// Wraps `source` in the stages `settings` call for.
///
/// The resample stage is skipped when the source already has the target
/// size; the unsharp stage is added only when sharpening is enabled.
///
/// # Errors
///
/// Returns an [`OpsError`](crate::OpsError) if `settings` are invalid or the
/// source format is not supported.
pub fn build_pipeline<'a, S>(source: S, settings: &ResizeSettings) -> OpsResult<Box<dyn PixelSource + 'a>>
where
    S: PixelSource + 'a,
{
    settings.validate()?;
    let interpolation = settings.interpolation()?;
    let target = (settings.width, settings.height);
    let resample = source.size() != target;

    debug!(
        from = ?source.size(),
        to = ?target,
        filter = ?settings.filter,
        resample,
        sharpen = settings.unsharp.is_enabled(),
        "building pipeline"
    );

    let staged: Box<dyn PixelSource + 'a> = if resample {
        Box::new(ConvolutionTransform::new(source, settings.width, settings.height, &interpolation)?)
    } else {
        // Still reject formats the engine cannot process.
        crate::convolver::Convolver::for_format(source.format())?;
        Box::new(source)
    };

    if settings.unsharp.is_enabled() {
        Ok(Box::new(UnsharpMask::new(staged, settings.unsharp)?))
    } else {
        Ok(staged)
    }
}

/// Resizes an in-memory image.
///
/// # Errors
///
/// See [`build_pipeline`]; streaming errors are reported as
/// [`OpsError::Core`](crate::OpsError::Core).
pub fn resize(image: &ImageBuffer, settings: &ResizeSettings) -> OpsResult<ImageBuffer> {
    let mut pipeline = build_pipeline(image.view(), settings)?;
    Ok(ImageBuffer::from_source(&mut pipeline)?)
}

/// Largest size with the source aspect ratio that fits inside
/// `max_width` x `max_height`. Never returns a zero dimension.
pub fn fit_dimensions(src_width: u32, src_height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    scale_dimensions(src_width, src_height, max_width, max_height, f64::min)
}

/// Smallest size with the source aspect ratio that covers
/// `min_width` x `min_height`. Never returns a zero dimension.
pub fn fill_dimensions(src_width: u32, src_height: u32, min_width: u32, min_height: u32) -> (u32, u32) {
    scale_dimensions(src_width, src_height, min_width, min_height, f64::max)
}

fn scale_dimensions(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32, pick: fn(f64, f64) -> f64) -> (u32, u32) {
    if src_w == 0 || src_h == 0 {
        return (dst_w.max(1), dst_h.max(1));
    }
    let sw = f64::from(src_w);
    let sh = f64::from(src_h);
    let scale = pick(f64::from(dst_w) / sw, f64::from(dst_h) / sh);

    let w = (sw * scale).round().max(1.0) as u32;
    let h = (sh * scale).round().max(1.0) as u32;
    (w, h)
}
