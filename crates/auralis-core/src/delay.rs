//! Fractional delay line.
//!
//! Used by the virtualizer for every time-variant or fixed short delay
//! (ITD, crossfeed, reflections, rear channels, pinna comb).
//!
//! | Use | Delay range |
//! |-----|-------------|
//! | ITD | 0-0.7 ms |
//! | Crossfeed | 0.4 ms |
//! | Pinna comb | ~18 samples |
//! | Early reflections | 2-25 ms |
//! | Rear / rear-back | 5-30 ms |

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

/// Mono circular delay line with linear interpolation between taps.
///
/// The buffer is allocated once; [`tick`](Self::tick), [`read`](Self::read)
/// and [`write`](Self::write) never allocate.
///
/// # Example
///
/// ```rust
/// use auralis_core::FractionalDelay;
///
/// let mut delay = FractionalDelay::new(64);
/// delay.tick(1.0, 2.0);
/// delay.tick(0.0, 2.0);
/// assert_eq!(delay.tick(0.0, 2.0), 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct FractionalDelay {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl FractionalDelay {
    /// Creates a delay line able to delay up to `max_delay_samples`.
    pub fn new(max_delay_samples: usize) -> Self {
        // one extra slot for the interpolation partner of the oldest tap
        Self {
            buffer: vec![0.0; max_delay_samples + 2],
            write_pos: 0,
        }
    }

    /// Creates a delay line sized for `max_ms` at `sample_rate`.
    pub fn from_time(sample_rate: f32, max_ms: f32) -> Self {
        Self::new((max_ms * sample_rate / 1000.0) as usize + 1)
    }

    /// Longest supported delay in samples.
    pub fn max_delay(&self) -> usize {
        self.buffer.len() - 2
    }

    /// Appends a sample.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    /// Reads `delay_samples` behind the most recent write (0 = latest).
    ///
    /// The delay is clamped to `[0, max_delay()]`.
    #[inline]
    pub fn read(&self, delay_samples: f32) -> f32 {
        let len = self.buffer.len();
        let delay = delay_samples.clamp(0.0, self.max_delay() as f32);
        let delay_int = delay as usize;
        let frac = delay - delay_int as f32;

        let newer = (self.write_pos + len - delay_int - 1) % len;
        let older = (newer + len - 1) % len;
        let a = self.buffer[newer];
        let b = self.buffer[older];
        a + (b - a) * frac
    }

    /// Writes `input` then reads `delay_samples` behind it.
    ///
    /// A delay of zero returns `input` unchanged.
    #[inline]
    pub fn tick(&mut self, input: f32, delay_samples: f32) -> f32 {
        self.write(input);
        self.read(delay_samples)
    }

    /// Zeroes the line.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_delay_is_identity() {
        let mut delay = FractionalDelay::new(16);
        for i in 0..40 {
            let x = i as f32 * 0.1;
            assert_eq!(delay.tick(x, 0.0), x);
        }
    }

    #[test]
    fn integer_delay_shifts_impulse() {
        let mut delay = FractionalDelay::new(16);
        let mut out = [0.0; 10];
        for (i, o) in out.iter_mut().enumerate() {
            *o = delay.tick(if i == 0 { 1.0 } else { 0.0 }, 5.0);
        }
        assert_eq!(out[5], 1.0);
        assert_eq!(out.iter().sum::<f32>(), 1.0);
    }

    #[test]
    fn fractional_delay_splits_energy() {
        let mut delay = FractionalDelay::new(16);
        let mut out = [0.0; 6];
        for (i, o) in out.iter_mut().enumerate() {
            *o = delay.tick(if i == 0 { 1.0 } else { 0.0 }, 2.5);
        }
        assert!((out[2] - 0.5).abs() < 1e-6);
        assert!((out[3] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn delay_is_clamped_to_capacity() {
        let mut delay = FractionalDelay::new(4);
        for _ in 0..10 {
            assert!(delay.tick(1.0, 100.0).is_finite());
        }
        assert_eq!(delay.max_delay(), 4);
    }

    #[test]
    fn clear_silences_line() {
        let mut delay = FractionalDelay::new(8);
        delay.tick(1.0, 0.0);
        delay.clear();
        assert_eq!(delay.read(0.0), 0.0);
    }
}
