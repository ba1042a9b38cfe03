//! Kernel maps: per-axis tables of source offsets and fixed-point weights.
//!
//! A [`KernelMap`] describes one resampling axis. For each of `output_size`
//! output samples it stores the first source sample of its window (`start`)
//! and `sample_count * channels` Q15 weights, tap-major with channels
//! interleaved:
//!
//! ```text
//! entry i: start | w[tap0][c0] w[tap0][c1] .. w[tap0][cN] | w[tap1][c0] .. | ..
//! ```
//!
//! # Invariants
//!
//! Established once at construction by folding out-of-range taps onto the
//! edge samples:
//!
//! - `start + sample_count <= input_size` for every entry
//! - for every entry and channel, the weights sum to exactly
//!   [`WEIGHT_ONE`](crate::fixed::WEIGHT_ONE)
//!
//! Consumers therefore index source rows without per-access bounds logic.
//!
//! # Example
//!
//! ```rust
//! use rescale_ops::interpolation::Filter;
//! use rescale_ops::kernel::KernelMap;
//! use rescale_ops::fixed::WEIGHT_ONE;
//!
//! let box_filter = Filter::Average.settings().unwrap();
//! let map = KernelMap::scale_map(4, 2, 1, false, &box_filter).unwrap();
//! assert_eq!(map.sample_count(), 2);
//! assert_eq!(map.entry(1).start, 2);
//! assert_eq!(map.entry(1).weights, &[WEIGHT_ONE / 2, WEIGHT_ONE / 2]);
//! ```

use tracing::debug;

use crate::fixed::{normalize, quantize_weights, WEIGHT_ONE};
use crate::interpolation::{Gaussian, InterpolationSettings, WeightingFunction};
use crate::{OpsError, OpsResult};

/// One output sample's window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelEntry<'a> {
    /// First source sample of the window.
    pub start: usize,
    /// `sample_count * channels` weights, tap-major.
    pub weights: &'a [i32],
}

/// Immutable per-axis resampling table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelMap {
    input_size: usize,
    output_size: usize,
    samples: usize,
    channels: usize,
    starts: Vec<usize>,
    weights: Vec<i32>,
}

impl KernelMap {
    /// Builds a resampling map from `input_size` to `output_size` samples.
    ///
    /// Color channels use `interpolation`. With `has_alpha`, one extra
    /// channel is appended whose weights come from a kernel with support of
    /// at most one sample (Hermite when the color kernel is wider), so alpha
    /// never rings or overshoots.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidParameter`] if either size or
    /// `color_channels` is zero.
    pub fn scale_map(
        input_size: u32,
        output_size: u32,
        color_channels: usize,
        has_alpha: bool,
        interpolation: &InterpolationSettings,
    ) -> OpsResult<Self> {
        Ok(RawMap::scale(input_size, output_size, color_channels, has_alpha, interpolation)?.clamp())
    }

    /// Builds a same-size Gaussian blur map with standard deviation
    /// `radius`, centered on each output sample.
    ///
    /// Every channel (alpha included, if present) uses the same kernel.
    /// A kernel wider than the axis is narrowed to `size` taps by folding
    /// the overhang onto the edge samples.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidParameter`] for a zero size, zero
    /// channels or a non-positive radius.
    pub fn blur_map(size: u32, radius: f64, color_channels: usize, has_alpha: bool) -> OpsResult<Self> {
        Ok(RawMap::blur(size, radius, color_channels, has_alpha)?.clamp())
    }

    /// Number of source samples along the axis.
    #[inline]
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    /// Number of output samples along the axis.
    #[inline]
    pub fn output_size(&self) -> usize {
        self.output_size
    }

    /// Window width (taps) shared by all entries.
    #[inline]
    pub fn sample_count(&self) -> usize {
        self.samples
    }

    /// Interleaved channels covered by each tap.
    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Returns the window of output sample `i`. Panics if out of range.
    #[inline]
    pub fn entry(&self, i: usize) -> KernelEntry<'_> {
        let len = self.samples * self.channels;
        KernelEntry {
            start: self.starts[i],
            weights: &self.weights[i * len..(i + 1) * len],
        }
    }

    /// Iterates over all entries in output order.
    pub fn entries(&self) -> impl Iterator<Item = KernelEntry<'_>> + '_ {
        (0..self.output_size).map(move |i| self.entry(i))
    }
}

/// Unclamped map under construction; starts may fall outside the input.
#[derive(Debug)]
struct RawMap {
    input_size: usize,
    output_size: usize,
    samples: usize,
    channels: usize,
    starts: Vec<isize>,
    weights: Vec<i32>,
}

impl RawMap {
    fn scale(
        input_size: u32,
        output_size: u32,
        color_channels: usize,
        has_alpha: bool,
        interpolation: &InterpolationSettings,
    ) -> OpsResult<Self> {
        check_sizes(input_size, output_size, color_channels)?;

        let function = interpolation.function();
        let alpha_settings = if function.support() > 1.0 {
            InterpolationSettings::hermite()
        } else {
            interpolation.clone()
        };

        let isize_f = f64::from(input_size);
        let osize_f = f64::from(output_size);

        let offset = if function.support() < 0.1 { 0.5 } else { 0.0 };
        let blur = interpolation.effective_blur();
        let alpha_blur = alpha_settings.effective_blur();

        let wfactor = (osize_f / isize_f).min(1.0);
        let wdist = (function.support() / wfactor * blur).min(isize_f / 2.0);
        let samples = ((wdist * 2.0).ceil() as usize).max(1);
        let channels = color_channels + usize::from(has_alpha);

        let outputs = output_size as usize;
        let mut starts = Vec::with_capacity(outputs);
        let mut weights = vec![0i32; outputs * samples * channels];

        // Per-entry scratch, reused across entries.
        let mut wp = vec![0f64; samples];
        let mut awp = vec![0f64; samples];
        let mut qw = vec![0i32; samples];
        let mut qa = vec![0i32; samples];

        let inc = isize_f / osize_f;
        let mut spoint = (isize_f - osize_f) / (osize_f * 2.0) + offset;

        for (i, entry) in weights.chunks_exact_mut(samples * channels).enumerate() {
            let start = (spoint + wdist).floor() as isize - samples as isize + 1;
            starts.push(start);

            sample_window(function, start, spoint, wfactor / blur, &mut wp);
            normalize(&mut wp);
            quantize_weights(&wp, &mut qw);

            if has_alpha {
                sample_window(alpha_settings.function(), start, spoint, wfactor / alpha_blur, &mut awp);
                normalize(&mut awp);
                quantize_weights(&awp, &mut qa);
            }

            for (j, tap) in entry.chunks_exact_mut(channels).enumerate() {
                tap[..color_channels].fill(qw[j]);
                if has_alpha {
                    tap[color_channels] = qa[j];
                }
            }

            spoint = inc * (i + 1) as f64 + (isize_f - osize_f) / (osize_f * 2.0) + offset;
        }

        debug!(
            input_size,
            output_size,
            samples,
            channels,
            support = function.support(),
            "built scale map"
        );

        Ok(Self {
            input_size: input_size as usize,
            output_size: outputs,
            samples,
            channels,
            starts,
            weights,
        })
    }

    fn blur(size: u32, radius: f64, color_channels: usize, has_alpha: bool) -> OpsResult<Self> {
        check_sizes(size, size, color_channels)?;

        let gaussian = Gaussian::new(radius)?;
        let channels = color_channels + usize::from(has_alpha);
        let dist = gaussian.support().ceil() as usize;
        if dist.saturating_mul(2) >= size as usize {
            return Ok(Self::folded_blur(&gaussian, size as usize, channels));
        }

        let kernel = gaussian.kernel();
        let samples = kernel.len();

        let mut qk = vec![0i32; samples];
        quantize_weights(&kernel, &mut qk);

        let outputs = size as usize;
        let starts = (0..outputs)
            .map(|i| i as isize - (samples / 2) as isize)
            .collect();

        let mut entry = Vec::with_capacity(samples * channels);
        for &w in &qk {
            entry.extend(std::iter::repeat_n(w, channels));
        }
        let weights = entry.repeat(outputs);

        debug!(size, radius, samples, channels, "built blur map");

        Ok(Self {
            input_size: outputs,
            output_size: outputs,
            samples,
            channels,
            starts,
            weights,
        })
    }

    /// Blur map for a kernel at least as wide as the axis.
    ///
    /// Every entry spans the whole axis from 0. Taps past either edge are
    /// summed onto the edge sample in floating point before quantization,
    /// so storage is `size * size` taps whatever the radius.
    fn folded_blur(gaussian: &Gaussian, size: usize, channels: usize) -> Self {
        let mut weights = vec![0i32; size * size * channels];
        if size == 1 {
            weights.fill(WEIGHT_ONE);
        } else {
            let half = gaussian.half_kernel(size);
            // tail[k]: weight at distance k or more on one side.
            let mut tail = vec![0f64; size + 1];
            tail[size] = half[size];
            for k in (0..size).rev() {
                tail[k] = half[k] + tail[k + 1];
            }

            let mut wp = vec![0f64; size];
            let mut qw = vec![0i32; size];
            for (i, entry) in weights.chunks_exact_mut(size * channels).enumerate() {
                for (s, w) in wp.iter_mut().enumerate() {
                    *w = half[s.abs_diff(i)];
                }
                wp[0] = tail[i];
                wp[size - 1] = tail[size - 1 - i];
                quantize_weights(&wp, &mut qw);
                for (tap, &w) in entry.chunks_exact_mut(channels).zip(&qw) {
                    tap.fill(w);
                }
            }
        }

        debug!(size, radius = gaussian.sigma(), samples = size, channels, "built folded blur map");

        Self {
            input_size: size,
            output_size: size,
            samples: size,
            channels,
            starts: vec![0; size],
            weights,
        }
    }

    /// Folds every out-of-range tap onto the nearest edge sample and
    /// re-anchors the window inside `[0, input_size)`.
    ///
    /// A window wider than the input shrinks to `input_size` taps. Folding
    /// only moves weight between taps, so per-channel sums are unchanged.
    fn clamp(self) -> KernelMap {
        let Self {
            input_size,
            output_size,
            samples,
            channels,
            starts: raw_starts,
            weights: raw_weights,
        } = self;

        let clamped = samples.min(input_size);
        let last = input_size as isize - 1;
        let max_start = (input_size - clamped) as isize;

        let mut starts = Vec::with_capacity(output_size);
        let mut weights = vec![0i32; output_size * clamped * channels];

        let raw_entries = raw_weights.chunks_exact(samples * channels);
        let entries = weights.chunks_exact_mut(clamped * channels);
        for ((&start, raw), entry) in raw_starts.iter().zip(raw_entries).zip(entries) {
            let new_start = start.clamp(0, max_start);
            starts.push(new_start as usize);

            for (j, tap) in raw.chunks_exact(channels).enumerate() {
                let src = (start + j as isize).clamp(0, last);
                let t = (src - new_start) as usize;
                for (dst, &w) in entry[t * channels..(t + 1) * channels].iter_mut().zip(tap) {
                    *dst += w;
                }
            }
        }

        KernelMap {
            input_size,
            output_size,
            samples: clamped,
            channels,
            starts,
            weights,
        }
    }
}

fn check_sizes(input_size: u32, output_size: u32, channels: usize) -> OpsResult<()> {
    if input_size == 0 || output_size == 0 {
        return Err(OpsError::InvalidParameter(format!(
            "kernel map sizes must be > 0, got {input_size} -> {output_size}"
        )));
    }
    if channels == 0 {
        return Err(OpsError::InvalidParameter("kernel map needs at least one channel".into()));
    }
    Ok(())
}

/// Evaluates `function` at every tap of the window starting at `start`.
#[inline]
fn sample_window(function: &dyn WeightingFunction, start: isize, spoint: f64, scale: f64, out: &mut [f64]) {
    for (j, w) in out.iter_mut().enumerate() {
        let distance = ((start + j as isize) as f64 - spoint).abs() * scale;
        *w = function.value(distance);
    }
}
