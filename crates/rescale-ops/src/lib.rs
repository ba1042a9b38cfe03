//! # rescale-ops
//!
//! Streaming separable image resampling with fixed-point kernels.
//!
//! Every stage is a [`PixelSource`](rescale_core::PixelSource) pulling rows
//! from the stage before it, so a resize is a chain of small row windows
//! rather than a full-frame intermediate image.
//!
//! # Modules
//!
//! - [`interpolation`] - Weighting functions and named filter presets
//! - [`fixed`] - Q15 weight arithmetic and rounding
//! - [`kernel`] - Per-axis kernel maps (resample and Gaussian blur)
//! - [`convolver`] - Per-format row kernels
//! - [`convolution`] - The streaming resample stage
//! - [`unsharp`] - The unsharp-mask stage
//! - [`settings`] - Serde configuration
//! - [`pipeline`] - Stage composition and in-memory resize
//! - `parallel` - Strip-parallel resize (feature `parallel`)
//!
//! # Example
//!
//! ```rust
//! use rescale_core::{ImageBuffer, PixelFormat};
//! use rescale_ops::{resize, Filter, ResizeSettings, UnsharpMaskSettings};
//!
//! let src = ImageBuffer::new(640, 480, PixelFormat::Bgra32).unwrap();
//! let settings = ResizeSettings::new(160, 120)
//!     .with_filter(Filter::Lanczos)
//!     .with_unsharp(UnsharpMaskSettings::for_ratio(4.0));
//!
//! let thumb = resize(&src, &settings).unwrap();
//! assert_eq!((thumb.width(), thumb.height()), (160, 120));
//! ```
//!
//! ## Streaming
//!
//! ```rust,ignore
//! use rescale_ops::pipeline::build_pipeline;
//!
//! let mut stage = build_pipeline(decoder, &settings)?;
//! for y in 0..settings.height {
//!     stage.copy_pixels(Rect::new(0, y, settings.width, 1), stride, &mut row)?;
//!     encoder.write_row(&row)?;
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
mod window;

pub mod convolution;
pub mod convolver;
pub mod fixed;
pub mod interpolation;
pub mod kernel;
pub mod pipeline;
pub mod settings;
pub mod unsharp;

#[cfg(feature = "parallel")]
pub mod parallel;

pub use convolution::ConvolutionTransform;
pub use convolver::Convolver;
pub use error::{OpsError, OpsResult};
pub use interpolation::{Filter, InterpolationSettings, WeightingFunction};
pub use kernel::KernelMap;
pub use pipeline::{build_pipeline, fill_dimensions, fit_dimensions, resize};
pub use settings::{ResizeSettings, UnsharpMaskSettings};
pub use unsharp::UnsharpMask;
