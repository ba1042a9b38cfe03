//! Resize and sharpening configuration.
//!
//! [`ResizeSettings`] is plain serde data, so it can be embedded in a larger
//! configuration file or loaded on its own:
//!
//! ```rust
//! use rescale_ops::interpolation::Filter;
//! use rescale_ops::settings::ResizeSettings;
//!
//! let settings = ResizeSettings::from_yaml_str(
//!     "width: 320\n\
//!      height: 200\n\
//!      filter: catmull_rom\n\
//!      unsharp: { amount: 40, radius: 1.5, threshold: 0 }\n",
//! )
//! .unwrap();
//! assert_eq!(settings.filter, Filter::CatmullRom);
//! assert!(settings.unsharp.is_enabled());
//! ```
//!
//! Values are checked when a pipeline is built, not when parsed.

use serde::{Deserialize, Serialize};

use crate::interpolation::{Filter, InterpolationSettings};
use crate::{OpsError, OpsResult};

/// Unsharp-mask parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnsharpMaskSettings {
    /// Strength in percent of the detail difference added back.
    pub amount: i32,
    /// Gaussian standard deviation, in output pixels.
    pub radius: f64,
    /// Minimum difference (8-bit units) a sample needs to be sharpened.
    #[serde(default)]
    pub threshold: u8,
}

impl UnsharpMaskSettings {
    /// Creates settings from their three parameters.
    pub const fn new(amount: i32, radius: f64, threshold: u8) -> Self {
        Self {
            amount,
            radius,
            threshold,
        }
    }

    /// Sharpening disabled.
    pub const fn none() -> Self {
        Self::new(0, 0.0, 0)
    }

    /// Whether these settings sharpen at all.
    pub fn is_enabled(&self) -> bool {
        self.amount > 0 && self.radius > 0.0
    }

    /// Default sharpening for a shrink `ratio` (input size / output size).
    ///
    /// Stronger downscales lose more local contrast and get more
    /// sharpening; no resize gets none.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rescale_ops::settings::UnsharpMaskSettings;
    ///
    /// assert!(!UnsharpMaskSettings::for_ratio(1.0).is_enabled());
    /// assert_eq!(UnsharpMaskSettings::for_ratio(3.0), UnsharpMaskSettings::new(75, 0.5, 2));
    /// ```
    pub fn for_ratio(ratio: f64) -> Self {
        if ratio == 1.0 {
            Self::none()
        } else if ratio < 0.5 {
            Self::new(40, 1.5, 0)
        } else if ratio < 1.0 {
            Self::new(30, 1.0, 0)
        } else if ratio < 2.0 {
            Self::new(30, 0.75, 4)
        } else if ratio < 4.0 {
            Self::new(75, 0.5, 2)
        } else if ratio < 6.0 {
            Self::new(50, 0.75, 2)
        } else if ratio < 8.0 {
            Self::new(100, 0.6, 1)
        } else if ratio < 10.0 {
            Self::new(125, 0.5, 0)
        } else {
            Self::new(150, 0.5, 0)
        }
    }

    /// Checks parameter ranges of enabled settings.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidParameter`] for a negative amount or a
    /// non-finite radius.
    pub fn validate(&self) -> OpsResult<()> {
        if self.amount < 0 {
            return Err(OpsError::InvalidParameter(format!(
                "unsharp amount must be >= 0, got {}",
                self.amount
            )));
        }
        if !self.radius.is_finite() || self.radius < 0.0 {
            return Err(OpsError::InvalidParameter(format!(
                "unsharp radius must be finite and >= 0, got {}",
                self.radius
            )));
        }
        Ok(())
    }
}

impl Default for UnsharpMaskSettings {
    fn default() -> Self {
        Self::none()
    }
}

fn default_blur() -> f64 {
    1.0
}

/// Target geometry and quality settings for one resize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResizeSettings {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Interpolation preset.
    #[serde(default)]
    pub filter: Filter,
    /// Kernel blur factor, `0.5 < blur <= 2.0`.
    #[serde(default = "default_blur")]
    pub blur: f64,
    /// Post-resize sharpening.
    #[serde(default)]
    pub unsharp: UnsharpMaskSettings,
}

impl ResizeSettings {
    /// Resize to `width` x `height` with the default filter and no
    /// sharpening.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            filter: Filter::default(),
            blur: default_blur(),
            unsharp: UnsharpMaskSettings::none(),
        }
    }

    /// Resize from `src_width` x `src_height` with filter and sharpening
    /// chosen for the shrink ratio of the larger axis change.
    pub fn auto(src_width: u32, src_height: u32, width: u32, height: u32) -> Self {
        let rx = f64::from(src_width) / f64::from(width.max(1));
        let ry = f64::from(src_height) / f64::from(height.max(1));
        let ratio = if (rx - 1.0).abs() >= (ry - 1.0).abs() { rx } else { ry };
        Self::new(width, height)
            .with_filter(Filter::for_ratio(ratio))
            .with_unsharp(UnsharpMaskSettings::for_ratio(ratio))
    }

    /// Sets the filter.
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    /// Sets the blur factor.
    pub fn with_blur(mut self, blur: f64) -> Self {
        self.blur = blur;
        self
    }

    /// Sets the sharpening.
    pub fn with_unsharp(mut self, unsharp: UnsharpMaskSettings) -> Self {
        self.unsharp = unsharp;
        self
    }

    /// Parses settings from YAML.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::Config`] on malformed YAML or missing fields.
    pub fn from_yaml_str(yaml: &str) -> OpsResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Serializes settings to YAML.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::Config`] if serialization fails.
    pub fn to_yaml_string(&self) -> OpsResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Builds the interpolation settings named by `filter` and `blur`.
    ///
    /// A blur of exactly 1 keeps the preset's own blur.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidParameter`] for an out-of-range blur or
    /// Gaussian sigma.
    pub fn interpolation(&self) -> OpsResult<InterpolationSettings> {
        let settings = self.filter.settings()?;
        if self.blur == 1.0 {
            return Ok(settings);
        }
        settings.blurred(self.blur)
    }

    /// Checks every value.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidParameter`] for a zero output size or any
    /// invalid filter or sharpening parameter.
    pub fn validate(&self) -> OpsResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(OpsError::InvalidParameter(format!(
                "output size must be > 0, got {}x{}",
                self.width, self.height
            )));
        }
        self.interpolation()?;
        self.unsharp.validate()
    }
}
