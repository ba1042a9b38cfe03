//! Fixed-point arithmetic shared by kernel maps and convolvers.
//!
//! Weights are signed Q15 integers: `1.0` is [`WEIGHT_ONE`] (`1 << 15`).
//! The horizontal pass accumulates `sample * weight` in `i64` and keeps
//! [`INTERMEDIATE_BITS`] fractional bits in its `i32` output; the vertical
//! pass accumulates `intermediate * weight` in `i64` and drops all
//! fractional bits when writing native samples.
//!
//! Worst-case magnitudes (16-bit samples, summed absolute weight below 4):
//!
//! ```text
//! horizontal acc   65535 * 2^15 * 4      < 2^34   (i64)
//! intermediate     65535 * 2^8  * 4      < 2^26   (i32)
//! vertical acc     2^26  * 2^15 * 4      < 2^43   (i64)
//! ```
//!
//! Rounding is round-half-up everywhere: add half an output unit, then
//! arithmetic shift right.

/// Fractional bits of a weight.
pub const WEIGHT_SHIFT: u32 = 15;

/// Fixed-point `1.0` for weights.
pub const WEIGHT_ONE: i32 = 1 << WEIGHT_SHIFT;

/// Fractional bits kept in intermediate (horizontally convolved) samples.
pub const INTERMEDIATE_BITS: u32 = 8;

/// Shift applied when storing a horizontal accumulator.
pub const HORIZONTAL_SHIFT: u32 = WEIGHT_SHIFT - INTERMEDIATE_BITS;

/// Shift applied when storing a vertical accumulator as a native sample.
pub const VERTICAL_SHIFT: u32 = WEIGHT_SHIFT + INTERMEDIATE_BITS;

/// Divides by `2^shift`, rounding half up.
#[inline(always)]
pub fn round_shift(acc: i64, shift: u32) -> i64 {
    (acc + (1i64 << (shift - 1))) >> shift
}

/// Clamps `v` into `[0, max]`.
#[inline(always)]
pub fn clamp_sample(v: i64, max: u32) -> u32 {
    v.clamp(0, i64::from(max)) as u32
}

/// Quantizes normalized weights to Q15 so that they sum to exactly
/// [`WEIGHT_ONE`].
///
/// Each weight is rounded to nearest; the residual left by rounding (at most
/// half a unit per tap) is added to the tap of largest magnitude, which
/// distorts the kernel shape the least.
///
/// # Example
///
/// ```rust
/// use rescale_ops::fixed::{quantize_weights, WEIGHT_ONE};
///
/// let mut q = [0i32; 3];
/// quantize_weights(&[1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0], &mut q);
/// assert_eq!(q.iter().sum::<i32>(), WEIGHT_ONE);
/// ```
pub fn quantize_weights(weights: &[f64], out: &mut [i32]) {
    debug_assert_eq!(weights.len(), out.len());

    let mut sum = 0i32;
    let mut peak = 0usize;
    for (j, (&w, q)) in weights.iter().zip(out.iter_mut()).enumerate() {
        *q = (w * f64::from(WEIGHT_ONE)).round() as i32;
        sum += *q;
        if w.abs() > weights[peak].abs() {
            peak = j;
        }
    }

    if let Some(q) = out.get_mut(peak) {
        *q += WEIGHT_ONE - sum;
    }
}

/// Normalizes raw kernel samples in place so they sum to one.
///
/// A window whose samples sum to zero (possible only with degenerate
/// kernels) becomes a unit impulse at its center.
pub fn normalize(weights: &mut [f64]) {
    let sum: f64 = weights.iter().sum();
    if sum == 0.0 || !sum.is_finite() {
        let center = weights.len() / 2;
        for (j, w) in weights.iter_mut().enumerate() {
            *w = if j == center { 1.0 } else { 0.0 };
        }
        return;
    }
    let inv = 1.0 / sum;
    for w in weights.iter_mut() {
        *w *= inv;
    }
}
