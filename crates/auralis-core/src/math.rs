//! Math helpers shared by every stage.
//!
//! All functions are allocation-free and `no_std` friendly.
//!
//! - [`db_to_linear`] / [`linear_to_db`] - Level conversions
//! - [`soft_clip`] / [`hard_clip`] - Saturation and range limiting
//! - [`mid_side`] / [`mono_sum`] - Stereo decomposition
//! - [`ms_to_samples`] / [`samples_to_ms`] - Time conversions

use libm::{expf, logf, tanhf};

/// Convert decibels to linear gain.
///
/// ```rust
/// use auralis_core::db_to_linear;
///
/// assert_eq!(db_to_linear(0.0), 1.0);
/// assert!((db_to_linear(-6.02) - 0.5).abs() < 0.01);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    // 10^(dB/20) = e^(dB * ln(10)/20)
    const FACTOR: f32 = core::f32::consts::LN_10 / 20.0;
    expf(db * FACTOR)
}

/// Convert linear gain to decibels, flooring at -200 dB.
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    const FACTOR: f32 = 20.0 / core::f32::consts::LN_10;
    logf(linear.max(1e-10)) * FACTOR
}

/// Hyperbolic-tangent saturation, output in (-1, 1).
#[inline]
pub fn soft_clip(x: f32) -> f32 {
    tanhf(x)
}

/// Clamp to `[-threshold, threshold]`.
///
/// NaN maps to zero so a single bad sample cannot escape the valid range.
#[inline]
pub fn hard_clip(x: f32, threshold: f32) -> f32 {
    if x.is_nan() {
        return 0.0;
    }
    x.clamp(-threshold, threshold)
}

/// Linear interpolation between `a` (t=0) and `b` (t=1).
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Milliseconds to (fractional) samples.
#[inline]
pub fn ms_to_samples(ms: f32, sample_rate: f32) -> f32 {
    ms * sample_rate / 1000.0
}

/// Samples to milliseconds.
#[inline]
pub fn samples_to_ms(samples: f32, sample_rate: f32) -> f32 {
    samples * 1000.0 / sample_rate
}

/// Flush values below 1e-20 to zero to keep feedback paths out of the
/// subnormal range.
#[allow(clippy::inline_always)]
#[inline(always)]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

/// Average of left and right.
#[inline]
pub fn mono_sum(left: f32, right: f32) -> f32 {
    (left + right) * 0.5
}

/// Mid/side decomposition: `((L+R)/2, (L-R)/2)`.
#[inline]
pub fn mid_side(left: f32, right: f32) -> (f32, f32) {
    ((left + right) * 0.5, (left - right) * 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_linear_roundtrip() {
        let original = 0.5;
        let back = db_to_linear(linear_to_db(original));
        assert!((original - back).abs() < 1e-5);
    }

    #[test]
    fn zero_db_is_exact_unity() {
        assert_eq!(db_to_linear(0.0), 1.0);
    }

    #[test]
    fn hard_clip_limits_and_scrubs_nan() {
        assert_eq!(hard_clip(2.0, 1.0), 1.0);
        assert_eq!(hard_clip(-3.0, 1.0), -1.0);
        assert_eq!(hard_clip(0.25, 1.0), 0.25);
        assert_eq!(hard_clip(f32::NAN, 1.0), 0.0);
        assert_eq!(hard_clip(f32::INFINITY, 1.0), 1.0);
    }

    #[test]
    fn mid_side_of_identical_channels_has_no_side() {
        let (m, s) = mid_side(0.3, 0.3);
        assert_eq!(m, 0.3);
        assert_eq!(s, 0.0);
    }

    #[test]
    fn time_conversions_invert() {
        let samples = ms_to_samples(0.4, 48000.0);
        assert!((samples - 19.2).abs() < 1e-4);
        assert!((samples_to_ms(samples, 48000.0) - 0.4).abs() < 1e-5);
    }
}
