//! Pinna comb filter for the height cue.
//!
//! ```text
//! d    = 18 * rate / 48000             (samples)
//! diff = x[n] - x[n - d]
//! y    = x + diff * height * 0.25
//! ```

use auralis_core::FractionalDelay;

/// Comb delay at 48 kHz, in samples.
pub const PINNA_DELAY_48K: f32 = 18.0;
const HEIGHT_SCALE: f32 = 0.25;

/// Comb length at `sample_rate`, in samples.
pub fn pinna_delay_samples(sample_rate: f32) -> f32 {
    PINNA_DELAY_48K * sample_rate / 48000.0
}

/// One ear's height cue.
#[derive(Debug, Clone)]
pub struct PinnaCue {
    line: FractionalDelay,
    delay: f32,
    amount: f32,
}

impl PinnaCue {
    /// Allocates a comb long enough for `max_rate`.
    pub fn new(max_rate: f32) -> Self {
        Self {
            line: FractionalDelay::new(pinna_delay_samples(max_rate).ceil() as usize + 1),
            delay: PINNA_DELAY_48K,
            amount: 0.0,
        }
    }

    /// Retunes for a processing rate and height (0-1).
    pub fn configure(&mut self, sample_rate: f32, height: f32) {
        self.delay = pinna_delay_samples(sample_rate).min(self.line.max_delay() as f32);
        self.amount = height.clamp(0.0, 1.0) * HEIGHT_SCALE;
    }

    /// Processes one sample.
    #[inline]
    pub fn process(&mut self, x: f32) -> f32 {
        let delayed = self.line.tick(x, self.delay);
        x + (x - delayed) * self.amount
    }

    /// Clears the comb.
    pub fn reset(&mut self) {
        self.line.clear();
    }
}
