//! Per-row numeric kernels, one strategy per pixel layout.
//!
//! A [`Convolver`] is selected once from the source [`PixelFormat`] when a
//! stage is built. Each variant monomorphizes the same three row operations
//! for its channel count and sample width:
//!
//! - [`Convolver::convolve_source_line`] - horizontal pass, raw row to
//!   fixed-point intermediate row
//! - [`Convolver::write_dest_line`] - vertical pass over a window of
//!   intermediate rows, rounded and clamped to native samples
//! - [`Convolver::sharpen_line`] - unsharp-mask combine of an original and
//!   a blurred row
//!
//! Premultiplied formats are convolved as four color channels sharing one
//! weight set; they stay premultiplied. Straight-alpha formats carry a
//! separate alpha weight set in the last channel. 16-bit samples are
//! native-endian.

use rescale_core::{AlphaMode, BitDepth, PixelFormat};

use crate::fixed::{clamp_sample, round_shift, HORIZONTAL_SHIFT, VERTICAL_SHIFT};
use crate::kernel::KernelMap;
use crate::{OpsError, OpsResult};

/// Row kernel strategy for one pixel layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Convolver {
    /// 1 x u8.
    Grey8,
    /// 1 x u16.
    Grey16,
    /// 2 x u8 chroma pair.
    CbCr8,
    /// 3 x u8.
    Bgr8,
    /// 3 x u16.
    Bgr16,
    /// 4 x u8, straight alpha.
    Bgra8,
    /// 4 x u16, straight alpha.
    Bgra16,
    /// 4 x u8, premultiplied alpha.
    Pbgra8,
    /// 4 x u16, premultiplied alpha.
    Pbgra16,
}

impl Convolver {
    /// Selects the strategy for `format`.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::Unsupported`] for float formats.
    pub fn for_format(format: PixelFormat) -> OpsResult<Self> {
        Ok(match format {
            PixelFormat::Grey8 => Self::Grey8,
            PixelFormat::Grey16 => Self::Grey16,
            PixelFormat::CbCr8 => Self::CbCr8,
            PixelFormat::Bgr24 => Self::Bgr8,
            PixelFormat::Bgr48 => Self::Bgr16,
            PixelFormat::Bgra32 => Self::Bgra8,
            PixelFormat::Bgra64 => Self::Bgra16,
            PixelFormat::Pbgra32 => Self::Pbgra8,
            PixelFormat::Pbgra64 => Self::Pbgra16,
            PixelFormat::Grey32Float | PixelFormat::Bgra128Float => {
                return Err(OpsError::Unsupported(format!("no convolver for {format}")));
            }
        })
    }

    /// Interleaved channels per pixel.
    pub const fn channels(&self) -> usize {
        match self {
            Self::Grey8 | Self::Grey16 => 1,
            Self::CbCr8 => 2,
            Self::Bgr8 | Self::Bgr16 => 3,
            Self::Bgra8 | Self::Bgra16 | Self::Pbgra8 | Self::Pbgra16 => 4,
        }
    }

    /// Storage width of one channel.
    pub const fn bit_depth(&self) -> BitDepth {
        match self {
            Self::Grey16 | Self::Bgr16 | Self::Bgra16 | Self::Pbgra16 => BitDepth::U16,
            _ => BitDepth::U8,
        }
    }

    /// Alpha handling of the last channel.
    pub const fn alpha(&self) -> AlphaMode {
        match self {
            Self::Bgra8 | Self::Bgra16 => AlphaMode::Straight,
            Self::Pbgra8 | Self::Pbgra16 => AlphaMode::Premultiplied,
            _ => AlphaMode::None,
        }
    }

    /// Weight layout a kernel map must have to drive this convolver, as
    /// `(color_channels, has_alpha)`.
    pub const fn map_layout(&self) -> (usize, bool) {
        match self.alpha() {
            AlphaMode::Straight => (self.channels() - 1, true),
            _ => (self.channels(), false),
        }
    }

    /// Bytes per pixel.
    pub const fn bytes_per_pixel(&self) -> usize {
        self.channels() * self.bit_depth().bytes_per_channel()
    }

    /// Checks that `map` carries one weight set per channel.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::Unsupported`] on a channel-count mismatch.
    pub fn check_map(&self, map: &KernelMap) -> OpsResult<()> {
        if map.channels() != self.channels() {
            return Err(OpsError::Unsupported(format!(
                "{self:?} needs {} weight channels, map has {}",
                self.channels(),
                map.channels()
            )));
        }
        Ok(())
    }

    /// Horizontal pass: convolves one raw source row into `dst`.
    ///
    /// `src` holds `map.input_size()` pixels; `dst` receives
    /// `map.output_size() * channels` intermediate samples. Only samples
    /// inside each entry's window are read.
    pub fn convolve_source_line(&self, src: &[u8], dst: &mut [i32], map: &KernelMap) {
        match self {
            Self::Grey8 => convolve_line::<u8, 1>(src, dst, map),
            Self::Grey16 => convolve_line::<u16, 1>(src, dst, map),
            Self::CbCr8 => convolve_line::<u8, 2>(src, dst, map),
            Self::Bgr8 => convolve_line::<u8, 3>(src, dst, map),
            Self::Bgr16 => convolve_line::<u16, 3>(src, dst, map),
            Self::Bgra8 | Self::Pbgra8 => convolve_line::<u8, 4>(src, dst, map),
            Self::Bgra16 | Self::Pbgra16 => convolve_line::<u16, 4>(src, dst, map),
        }
    }

    /// Vertical pass: writes output pixels `ox..ox + ow` of one row.
    ///
    /// `window` holds `weights.len() / channels` intermediate rows of
    /// `row_len` samples each, top to bottom. `weights` is the vertical
    /// map entry for the output row.
    pub fn write_dest_line(&self, window: &[i32], row_len: usize, dst: &mut [u8], ox: usize, ow: usize, weights: &[i32]) {
        match self {
            Self::Grey8 => write_line::<u8, 1>(window, row_len, dst, ox, ow, weights),
            Self::Grey16 => write_line::<u16, 1>(window, row_len, dst, ox, ow, weights),
            Self::CbCr8 => write_line::<u8, 2>(window, row_len, dst, ox, ow, weights),
            Self::Bgr8 => write_line::<u8, 3>(window, row_len, dst, ox, ow, weights),
            Self::Bgr16 => write_line::<u16, 3>(window, row_len, dst, ox, ow, weights),
            Self::Bgra8 | Self::Pbgra8 => write_line::<u8, 4>(window, row_len, dst, ox, ow, weights),
            Self::Bgra16 | Self::Pbgra16 => write_line::<u16, 4>(window, row_len, dst, ox, ow, weights),
        }
    }

    /// Unsharp-mask combine of `original` and `blurred` into `dst`.
    ///
    /// For each color sample, if `|o - b| >= threshold` the output is
    /// `o + (o - b) * amount / 100`, rounded half up and clamped to range,
    /// otherwise `o`. Alpha
    /// is copied. `threshold` is in 8-bit units and scaled for 16-bit
    /// samples. Premultiplied color is additionally capped at its alpha.
    pub fn sharpen_line(&self, original: &[u8], blurred: &[u8], dst: &mut [u8], amount: i32, threshold: u8) {
        let p = (original, blurred, dst, amount, threshold);
        match self {
            Self::Grey8 => sharpen::<u8, 1>(p, Alpha::None),
            Self::Grey16 => sharpen::<u16, 1>(p, Alpha::None),
            Self::CbCr8 => sharpen::<u8, 2>(p, Alpha::None),
            Self::Bgr8 => sharpen::<u8, 3>(p, Alpha::None),
            Self::Bgr16 => sharpen::<u16, 3>(p, Alpha::None),
            Self::Bgra8 => sharpen::<u8, 4>(p, Alpha::Straight),
            Self::Bgra16 => sharpen::<u16, 4>(p, Alpha::Straight),
            Self::Pbgra8 => sharpen::<u8, 4>(p, Alpha::Premultiplied),
            Self::Pbgra16 => sharpen::<u16, 4>(p, Alpha::Premultiplied),
        }
    }
}

/// Native sample storage.
trait Sample {
    const BYTES: usize;
    const MAX: u32;
    const THRESHOLD_SCALE: i64;

    fn load(row: &[u8], i: usize) -> i64;
    fn store(row: &mut [u8], i: usize, v: u32);
}

impl Sample for u8 {
    const BYTES: usize = 1;
    const MAX: u32 = u8::MAX as u32;
    const THRESHOLD_SCALE: i64 = 1;

    #[inline(always)]
    fn load(row: &[u8], i: usize) -> i64 {
        i64::from(row[i])
    }

    #[inline(always)]
    fn store(row: &mut [u8], i: usize, v: u32) {
        row[i] = v as u8;
    }
}

impl Sample for u16 {
    const BYTES: usize = 2;
    const MAX: u32 = u16::MAX as u32;
    const THRESHOLD_SCALE: i64 = 257;

    #[inline(always)]
    fn load(row: &[u8], i: usize) -> i64 {
        i64::from(u16::from_ne_bytes([row[2 * i], row[2 * i + 1]]))
    }

    #[inline(always)]
    fn store(row: &mut [u8], i: usize, v: u32) {
        row[2 * i..2 * i + 2].copy_from_slice(&(v as u16).to_ne_bytes());
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Alpha {
    None,
    Straight,
    Premultiplied,
}

fn convolve_line<T: Sample, const CH: usize>(src: &[u8], dst: &mut [i32], map: &KernelMap) {
    for (x, out) in dst.chunks_exact_mut(CH).take(map.output_size()).enumerate() {
        let entry = map.entry(x);
        let mut acc = [0i64; CH];
        for (j, taps) in entry.weights.chunks_exact(CH).enumerate() {
            let base = (entry.start + j) * CH;
            for (c, a) in acc.iter_mut().enumerate() {
                *a += T::load(src, base + c) * i64::from(taps[c]);
            }
        }
        for (o, a) in out.iter_mut().zip(acc) {
            *o = round_shift(a, HORIZONTAL_SHIFT) as i32;
        }
    }
}

fn write_line<T: Sample, const CH: usize>(
    window: &[i32],
    row_len: usize,
    dst: &mut [u8],
    ox: usize,
    ow: usize,
    weights: &[i32],
) {
    for x in 0..ow {
        let base = (ox + x) * CH;
        let mut acc = [0i64; CH];
        for (row, taps) in window.chunks_exact(row_len).zip(weights.chunks_exact(CH)) {
            let px = &row[base..base + CH];
            for c in 0..CH {
                acc[c] += i64::from(px[c]) * i64::from(taps[c]);
            }
        }
        for (c, a) in acc.into_iter().enumerate() {
            T::store(dst, x * CH + c, clamp_sample(round_shift(a, VERTICAL_SHIFT), T::MAX));
        }
    }
}

fn sharpen<T: Sample, const CH: usize>(
    (original, blurred, dst, amount, threshold): (&[u8], &[u8], &mut [u8], i32, u8),
    alpha: Alpha,
) {
    let pixels = dst.len() / (CH * T::BYTES);
    let threshold = i64::from(threshold) * T::THRESHOLD_SCALE;
    let amount = i64::from(amount);

    for x in 0..pixels {
        let base = x * CH;
        let color = if alpha == Alpha::None { CH } else { CH - 1 };
        let limit = match alpha {
            Alpha::Premultiplied => T::load(original, base + CH - 1),
            _ => i64::from(T::MAX),
        };

        for c in 0..color {
            let o = T::load(original, base + c);
            let diff = o - T::load(blurred, base + c);
            let v = if diff.abs() >= threshold {
                (o + (diff * amount + 50).div_euclid(100)).clamp(0, limit.max(o))
            } else {
                o
            };
            T::store(dst, base + c, v as u32);
        }
        if color < CH {
            T::store(dst, base + CH - 1, T::load(original, base + CH - 1) as u32);
        }
    }
}
