//! Interpolation weighting functions.
//!
//! A [`WeightingFunction`] is a symmetric 1D kernel described by its support
//! radius and its value at a non-negative distance. Kernel maps sample it at
//! every tap of every output pixel, so implementations are pure and cheap.
//!
//! # Functions
//!
//! - [`Point`] - Nearest-neighbor (degenerate support)
//! - [`BoxFilter`] - Average of the covered samples
//! - [`Linear`] - Triangle (bilinear)
//! - [`Quadratic`] - Dodgson quadratic
//! - [`Cubic`] - Mitchell-Netravali family parameterized by B and C
//! - [`Lanczos`] - Windowed sinc
//! - [`Spline36`] - 6-tap spline
//! - [`Gaussian`] - Gaussian bell, also used for unsharp masking
//!
//! # Example
//!
//! ```rust
//! use rescale_ops::interpolation::{Filter, WeightingFunction};
//!
//! let settings = Filter::Lanczos.settings().unwrap();
//! assert_eq!(settings.function().support(), 3.0);
//! assert_eq!(settings.function().value(0.0), 1.0);
//! ```

use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{OpsError, OpsResult};

/// A symmetric interpolation kernel.
pub trait WeightingFunction: fmt::Debug + Send + Sync {
    /// Distance beyond which [`value`](WeightingFunction::value) is zero.
    fn support(&self) -> f64;

    /// Kernel value at `distance >= 0`.
    fn value(&self, distance: f64) -> f64;
}

// ============================================================================
// Stock functions
// ============================================================================

/// Nearest-neighbor: every covered sample weighs 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct Point;

impl WeightingFunction for Point {
    fn support(&self) -> f64 {
        0.000001
    }

    fn value(&self, _distance: f64) -> f64 {
        1.0
    }
}

/// Box: equal weight inside half a sample.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoxFilter;

impl WeightingFunction for BoxFilter {
    fn support(&self) -> f64 {
        0.5
    }

    fn value(&self, d: f64) -> f64 {
        if d <= 0.5 { 1.0 } else { 0.0 }
    }
}

/// Triangle filter.
#[derive(Debug, Clone, Copy, Default)]
pub struct Linear;

impl WeightingFunction for Linear {
    fn support(&self) -> f64 {
        1.0
    }

    fn value(&self, d: f64) -> f64 {
        if d < 1.0 { 1.0 - d } else { 0.0 }
    }
}

/// Dodgson quadratic with sharpness `r` in `[0.5, 1.0]`.
#[derive(Debug, Clone, Copy)]
pub struct Quadratic {
    r: f64,
}

impl Quadratic {
    /// Creates a quadratic kernel.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidParameter`] if `r` is outside `[0.5, 1.0]`.
    pub fn new(r: f64) -> OpsResult<Self> {
        if !(0.5..=1.0).contains(&r) {
            return Err(OpsError::InvalidParameter(format!(
                "quadratic r must be between 0.5 and 1.0, got {r}"
            )));
        }
        Ok(Self { r })
    }
}

impl Default for Quadratic {
    fn default() -> Self {
        Self { r: 1.0 }
    }
}

impl WeightingFunction for Quadratic {
    fn support(&self) -> f64 {
        1.5
    }

    fn value(&self, d: f64) -> f64 {
        let r = self.r;
        if d < 0.5 {
            (-2.0 * r) * (d * d) + 0.5 * (r + 1.0)
        } else if d < 1.5 {
            r * (d * d) + (-2.0 * r - 0.5) * d + 0.75 * (r + 1.0)
        } else {
            0.0
        }
    }
}

/// Cubic convolution kernel parameterized by B and C.
///
/// `B = C = 0` is Hermite (support 1); all other members have support 2.
#[derive(Debug, Clone, Copy)]
pub struct Cubic {
    support: f64,
    p0: f64,
    p2: f64,
    p3: f64,
    q0: f64,
    q1: f64,
    q2: f64,
    q3: f64,
}

impl Cubic {
    /// Creates a cubic kernel.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidParameter`] if `b` or `c` is negative.
    pub fn new(b: f64, c: f64) -> OpsResult<Self> {
        if b < 0.0 || c < 0.0 {
            return Err(OpsError::InvalidParameter(format!(
                "cubic B and C must be >= 0, got B={b} C={c}"
            )));
        }
        Ok(Self::from_bc(b, c))
    }

    const fn from_bc(b: f64, c: f64) -> Self {
        Self {
            support: if b == 0.0 && c == 0.0 { 1.0 } else { 2.0 },
            p0: (6.0 - 2.0 * b) / 6.0,
            p2: (-18.0 + 12.0 * b + c * 6.0) / 6.0,
            p3: (12.0 - 9.0 * b - c * 6.0) / 6.0,
            q0: (8.0 * b + c * 24.0) / 6.0,
            q1: (-12.0 * b - c * 48.0) / 6.0,
            q2: (6.0 * b + c * 30.0) / 6.0,
            q3: (-b - c * 6.0) / 6.0,
        }
    }

    /// Hermite (B=0, C=0).
    pub const HERMITE: Cubic = Cubic::from_bc(0.0, 0.0);
    /// Mitchell-Netravali (B=1/3, C=1/3).
    pub const MITCHELL: Cubic = Cubic::from_bc(1.0 / 3.0, 1.0 / 3.0);
    /// Catmull-Rom (B=0, C=1/2).
    pub const CATMULL_ROM: Cubic = Cubic::from_bc(0.0, 0.5);
    /// Cardinal (B=0, C=1), often called bicubic.
    pub const CARDINAL: Cubic = Cubic::from_bc(0.0, 1.0);
}

impl WeightingFunction for Cubic {
    fn support(&self) -> f64 {
        self.support
    }

    fn value(&self, d: f64) -> f64 {
        if d < 1.0 {
            self.p0 + d * d * (self.p2 + d * self.p3)
        } else if self.support > 1.0 && d < 2.0 {
            self.q0 + d * (self.q1 + d * (self.q2 + d * self.q3))
        } else {
            0.0
        }
    }
}

/// Lanczos windowed sinc.
#[derive(Debug, Clone, Copy)]
pub struct Lanczos {
    lobes: f64,
}

impl Lanczos {
    /// Creates a Lanczos kernel with `lobes` lobes.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidParameter`] if `lobes` is zero.
    pub fn new(lobes: u32) -> OpsResult<Self> {
        if lobes == 0 {
            return Err(OpsError::InvalidParameter("lanczos lobe count must be > 0".into()));
        }
        Ok(Self { lobes: f64::from(lobes) })
    }
}

impl Default for Lanczos {
    fn default() -> Self {
        Self { lobes: 3.0 }
    }
}

impl WeightingFunction for Lanczos {
    fn support(&self) -> f64 {
        self.lobes
    }

    fn value(&self, d: f64) -> f64 {
        if d == 0.0 {
            return 1.0;
        }
        if d < self.lobes {
            let x = d * PI;
            return (self.lobes * x.sin() * (x / self.lobes).sin()) / (x * x);
        }
        0.0
    }
}

/// Spline36 (Helmut Dersch).
#[derive(Debug, Clone, Copy, Default)]
pub struct Spline36;

impl WeightingFunction for Spline36 {
    fn support(&self) -> f64 {
        3.0
    }

    fn value(&self, d: f64) -> f64 {
        if d < 1.0 {
            ((13.0 / 11.0 * d - 453.0 / 209.0) * d - 3.0 / 209.0) * d + 1.0
        } else if d < 2.0 {
            let d = d - 1.0;
            ((-6.0 / 11.0 * d + 270.0 / 209.0) * d - 156.0 / 209.0) * d
        } else if d < 3.0 {
            let d = d - 2.0;
            ((1.0 / 11.0 * d - 45.0 / 209.0) * d + 26.0 / 209.0) * d
        } else {
            0.0
        }
    }
}

/// Gaussian bell with standard deviation `sigma`; support is `3 * sigma`.
#[derive(Debug, Clone, Copy)]
pub struct Gaussian {
    sigma: f64,
    dx: f64,
}

impl Gaussian {
    /// Creates a Gaussian kernel.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidParameter`] if `sigma` is not positive.
    pub fn new(sigma: f64) -> OpsResult<Self> {
        if !(sigma > 0.0) || !sigma.is_finite() {
            return Err(OpsError::InvalidParameter(format!(
                "gaussian sigma must be > 0, got {sigma}"
            )));
        }
        Ok(Self {
            sigma,
            dx: 1.0 / (2.0 * PI * sigma * sigma).sqrt(),
        })
    }

    /// Standard deviation.
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Builds a discrete, normalized kernel of `2 * ceil(3 * sigma) + 1` taps
    /// centered on the middle tap.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rescale_ops::interpolation::Gaussian;
    ///
    /// let k = Gaussian::new(1.0).unwrap().kernel();
    /// assert_eq!(k.len(), 7);
    /// assert!((k.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    /// ```
    pub fn kernel(&self) -> Vec<f64> {
        let dist = self.support().ceil() as i64;
        let mut kernel: Vec<f64> = (-dist..=dist).map(|i| self.bell(i as f64)).collect();
        let sum: f64 = kernel.iter().sum();
        for w in &mut kernel {
            *w /= sum;
        }
        kernel
    }

    /// One side of [`kernel`](Self::kernel) cut to `len + 1` taps.
    ///
    /// Tap `d < len` is the normalized weight at distance `d` from the
    /// center. Tap `len` holds the summed weight of every tap at distance
    /// `len` or more, so the full kernel is never materialized.
    pub fn half_kernel(&self, len: usize) -> Vec<f64> {
        let dist = self.support().ceil() as usize;
        let mut half = vec![0f64; len + 1];
        let mut sum = self.bell(0.0);
        half[0] = sum;
        for d in 1..=dist {
            let w = self.bell(d as f64);
            sum += 2.0 * w;
            half[d.min(len)] += w;
        }
        for w in &mut half {
            *w /= sum;
        }
        half
    }

    #[inline]
    fn bell(&self, d: f64) -> f64 {
        self.dx * (-(d * d) / (2.0 * self.sigma * self.sigma)).exp()
    }
}

impl WeightingFunction for Gaussian {
    fn support(&self) -> f64 {
        self.sigma * 3.0
    }

    fn value(&self, d: f64) -> f64 {
        if d < self.support() { self.bell(d) } else { 0.0 }
    }
}

// ============================================================================
// Settings
// ============================================================================

/// A weighting function plus the blur factor applied to its support.
///
/// `blur > 1` widens (softens) the kernel, `blur < 1` narrows it. Functions
/// with support of half a sample or less ignore blur.
#[derive(Debug, Clone)]
pub struct InterpolationSettings {
    function: Arc<dyn WeightingFunction>,
    blur: f64,
}

impl InterpolationSettings {
    /// Wraps `function` with no blur.
    pub fn new(function: impl WeightingFunction + 'static) -> Self {
        Self {
            function: Arc::new(function),
            blur: 1.0,
        }
    }

    /// Wraps `function` with the given blur factor.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidParameter`] unless `0.5 < blur <= 2.0`.
    pub fn with_blur(function: impl WeightingFunction + 'static, blur: f64) -> OpsResult<Self> {
        Self::new(function).blurred(blur)
    }

    /// Returns a copy with a different blur factor.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidParameter`] unless `0.5 < blur <= 2.0`.
    pub fn blurred(mut self, blur: f64) -> OpsResult<Self> {
        if !(blur > 0.5 && blur <= 2.0) {
            return Err(OpsError::InvalidParameter(format!(
                "blur must be > 0.5 and <= 2.0, got {blur}"
            )));
        }
        self.blur = blur;
        Ok(self)
    }

    /// The weighting function.
    #[inline]
    pub fn function(&self) -> &dyn WeightingFunction {
        self.function.as_ref()
    }

    /// Blur factor as configured.
    #[inline]
    pub fn blur(&self) -> f64 {
        self.blur
    }

    /// Blur factor actually applied: narrow kernels are never blurred.
    #[inline]
    pub fn effective_blur(&self) -> f64 {
        if self.function.support() > 0.5 { self.blur } else { 1.0 }
    }

    /// Settings used for alpha when the color kernel has negative lobes.
    pub fn hermite() -> Self {
        Self::new(Cubic::HERMITE)
    }
}

/// Named interpolation presets.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    /// Nearest-neighbor.
    Nearest,
    /// Box average.
    Average,
    /// Triangle, also known as bilinear.
    Linear,
    /// Hermite cubic (B=0, C=0).
    Hermite,
    /// Dodgson quadratic (r=1).
    Quadratic,
    /// Mitchell-Netravali cubic.
    Mitchell,
    /// Catmull-Rom cubic.
    CatmullRom,
    /// Cardinal cubic (B=0, C=1).
    Cubic,
    /// Soft cubic (B=0, C=0.625) with blur 1.15.
    CubicSmoother,
    /// Lanczos, 3 lobes.
    Lanczos,
    /// Spline36.
    #[default]
    Spline36,
    /// Gaussian with the given sigma.
    Gaussian {
        /// Standard deviation in samples.
        sigma: f64,
    },
}

impl Filter {
    /// Builds the settings this preset names.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidParameter`] for an invalid Gaussian sigma.
    pub fn settings(&self) -> OpsResult<InterpolationSettings> {
        Ok(match *self {
            Filter::Nearest => InterpolationSettings::new(Point),
            Filter::Average => InterpolationSettings::new(BoxFilter),
            Filter::Linear => InterpolationSettings::new(Linear),
            Filter::Hermite => InterpolationSettings::new(Cubic::HERMITE),
            Filter::Quadratic => InterpolationSettings::new(Quadratic::default()),
            Filter::Mitchell => InterpolationSettings::new(Cubic::MITCHELL),
            Filter::CatmullRom => InterpolationSettings::new(Cubic::CATMULL_ROM),
            Filter::Cubic => InterpolationSettings::new(Cubic::CARDINAL),
            Filter::CubicSmoother => InterpolationSettings::with_blur(Cubic::from_bc(0.0, 0.625), 1.15)?,
            Filter::Lanczos => InterpolationSettings::new(Lanczos::default()),
            Filter::Spline36 => InterpolationSettings::new(Spline36),
            Filter::Gaussian { sigma } => InterpolationSettings::new(Gaussian::new(sigma)?),
        })
    }

    /// Picks a preset suited to a shrink `ratio` (input size / output size).
    ///
    /// # Example
    ///
    /// ```rust
    /// use rescale_ops::interpolation::Filter;
    ///
    /// assert_eq!(Filter::for_ratio(1.0), Filter::Linear);
    /// assert_eq!(Filter::for_ratio(3.0), Filter::Spline36);
    /// assert_eq!(Filter::for_ratio(0.25), Filter::Lanczos);
    /// ```
    pub fn for_ratio(ratio: f64) -> Filter {
        if ratio == 1.0 {
            Filter::Linear
        } else if ratio < 0.5 {
            Filter::Lanczos
        } else if ratio > 16.0 {
            Filter::Quadratic
        } else if ratio > 4.0 {
            Filter::CatmullRom
        } else {
            Filter::Spline36
        }
    }
}
