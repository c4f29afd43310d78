//! Peak envelope follower.
//!
//! Drives the harmonic extender's level-dependent mix: the follower rises
//! quickly on transients and decays slowly so the generated high band tracks
//! loud passages without pumping.

use libm::expf;

/// Peak envelope follower with separate attack and release time constants.
///
/// # Example
///
/// ```rust
/// use auralis_core::EnvelopeFollower;
///
/// let mut env = EnvelopeFollower::with_times(48000.0, 1.0, 50.0);
/// let level = env.process(0.5);
/// assert!(level > 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct EnvelopeFollower {
    envelope: f32,
    attack_coeff: f32,
    release_coeff: f32,
    sample_rate: f32,
    attack_ms: f32,
    release_ms: f32,
}

impl EnvelopeFollower {
    /// Default attack time in milliseconds.
    pub const DEFAULT_ATTACK_MS: f32 = 1.0;
    /// Default release time in milliseconds.
    pub const DEFAULT_RELEASE_MS: f32 = 50.0;

    /// Create a follower with 1 ms attack and 50 ms release.
    pub fn new(sample_rate: f32) -> Self {
        Self::with_times(sample_rate, Self::DEFAULT_ATTACK_MS, Self::DEFAULT_RELEASE_MS)
    }

    /// Create a follower with explicit attack and release times.
    pub fn with_times(sample_rate: f32, attack_ms: f32, release_ms: f32) -> Self {
        let mut follower = Self {
            envelope: 0.0,
            attack_coeff: 0.0,
            release_coeff: 0.0,
            sample_rate,
            attack_ms: attack_ms.max(0.01),
            release_ms: release_ms.max(0.1),
        };
        follower.recalculate_coefficients();
        follower
    }

    /// Set both time constants at once.
    pub fn set_times(&mut self, attack_ms: f32, release_ms: f32) {
        self.attack_ms = attack_ms.max(0.01);
        self.release_ms = release_ms.max(0.1);
        self.recalculate_coefficients();
    }

    /// Attack time in milliseconds.
    pub fn attack_ms(&self) -> f32 {
        self.attack_ms
    }

    /// Release time in milliseconds.
    pub fn release_ms(&self) -> f32 {
        self.release_ms
    }

    /// Update sample rate and recalculate coefficients.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate_coefficients();
    }

    /// Feed one sample; returns the rectified envelope level.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let input_abs = input.abs();
        let coeff = if input_abs > self.envelope {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.envelope = coeff * self.envelope + (1.0 - coeff) * input_abs;
        self.envelope
    }

    /// Current level without advancing.
    pub fn level(&self) -> f32 {
        self.envelope
    }

    /// Reset the envelope to zero.
    pub fn reset(&mut self) {
        self.envelope = 0.0;
    }

    // coeff = exp(-1 / (time_ms * sample_rate / 1000))
    fn recalculate_coefficients(&mut self) {
        self.attack_coeff = expf(-1.0 / (self.attack_ms * self.sample_rate / 1000.0));
        self.release_coeff = expf(-1.0 / (self.release_ms * self.sample_rate / 1000.0));
    }
}

impl Default for EnvelopeFollower {
    fn default() -> Self {
        Self::new(48000.0)
    }
}
