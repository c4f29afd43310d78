//! Early reflections and the virtual 7.1 downmix.
//!
//! Four reflection taps read the mono sum and alternate between the ears.
//! Two longer lines build virtual rear and rear-back speakers from the
//! channel history, each low-passed harder than the last, and a sub-80 Hz
//! band stands in for the LFE channel.
//!
//! | Path | Delay (ms) | Low-latency (ms) | Gain | Filter |
//! |------|------------|------------------|------|--------|
//! | reflection 1-4 | 7.3 / 11.7 / 17.9 / 23.3 | 2.1 / 3.7 / 5.3 / 7.9 | 0.5 / 0.4 / 0.32 / 0.25 | - |
//! | rear (cross-channel) | 15 | 5 | 0.3 | one-pole 6 kHz |
//! | rear-back (anti-phase) | 25 | 8 | 0.2 | one-pole 3.5 kHz |
//! | LFE | 0 | 0 | 0.15 | biquad LP 80 Hz |
//!
//! Reflections scale with `depth * 0.35`; the rear paths scale with `depth`.

use auralis_core::{Biquad, BiquadCoefficients, FractionalDelay, OnePole, mono_sum, ms_to_samples};

/// Reflection tap times.
pub const REFLECTION_MS: [f32; 4] = [7.3, 11.7, 17.9, 23.3];
/// Reflection tap times in low-latency mode.
pub const REFLECTION_MS_LOW_LATENCY: [f32; 4] = [2.1, 3.7, 5.3, 7.9];
const REFLECTION_GAINS: [f32; 4] = [0.5, 0.4, 0.32, 0.25];
const REFLECTION_SCALE: f32 = 0.35;

const REAR_MS: [f32; 2] = [15.0, 5.0];
const BACK_MS: [f32; 2] = [25.0, 8.0];
const REAR_HZ: f32 = 6000.0;
const BACK_HZ: f32 = 3500.0;
const REAR_GAIN: f32 = 0.3;
const BACK_GAIN: f32 = 0.2;
const ANTI_PHASE: f32 = 0.5;
const LFE_HZ: f32 = 80.0;
const LFE_GAIN: f32 = 0.15;
const LFE_Q: f32 = core::f32::consts::FRAC_1_SQRT_2;

/// Longest reflection time for the latency mode.
pub fn longest_reflection_ms(low_latency: bool) -> f32 {
    let taps = if low_latency {
        REFLECTION_MS_LOW_LATENCY
    } else {
        REFLECTION_MS
    };
    taps[taps.len() - 1]
}

/// Reflection network plus rear and LFE virtual speakers.
#[derive(Debug, Clone)]
pub struct RoomModel {
    mono: FractionalDelay,
    history: [FractionalDelay; 2],
    rear_lp: [OnePole; 2],
    back_lp: [OnePole; 2],
    lfe: Biquad,
    taps: [f32; 4],
    rear_delay: f32,
    back_delay: f32,
    depth: f32,
    sample_rate: f32,
}

impl RoomModel {
    /// Allocates every line for the longest delays at `max_rate`.
    pub fn new(sample_rate: f32, max_rate: f32) -> Self {
        let history = || FractionalDelay::from_time(max_rate, BACK_MS[0] + 1.0);
        let mut room = Self {
            mono: FractionalDelay::from_time(max_rate, REFLECTION_MS[3] + 1.0),
            history: [history(), history()],
            rear_lp: [
                OnePole::new(sample_rate, REAR_HZ),
                OnePole::new(sample_rate, REAR_HZ),
            ],
            back_lp: [
                OnePole::new(sample_rate, BACK_HZ),
                OnePole::new(sample_rate, BACK_HZ),
            ],
            lfe: Biquad::lowpass(LFE_HZ, LFE_Q, sample_rate),
            taps: [0.0; 4],
            rear_delay: 0.0,
            back_delay: 0.0,
            depth: 0.0,
            sample_rate,
        };
        room.configure(sample_rate, 0.0, false);
        room
    }

    /// Retunes for a processing rate, depth (0-1), and latency mode.
    pub fn configure(&mut self, sample_rate: f32, depth: f32, low_latency: bool) {
        if sample_rate != self.sample_rate {
            self.sample_rate = sample_rate;
            for f in self.rear_lp.iter_mut().chain(self.back_lp.iter_mut()) {
                f.set_sample_rate(sample_rate);
            }
            self.lfe
                .set_coefficients(BiquadCoefficients::lowpass(LFE_HZ, LFE_Q, sample_rate));
        }
        let mode = usize::from(low_latency);
        let times = if low_latency {
            REFLECTION_MS_LOW_LATENCY
        } else {
            REFLECTION_MS
        };
        let reflection_max = self.mono.max_delay() as f32;
        let history_max = self.history[0].max_delay() as f32;
        for (tap, ms) in self.taps.iter_mut().zip(times) {
            *tap = ms_to_samples(ms, sample_rate).min(reflection_max);
        }
        self.rear_delay = ms_to_samples(REAR_MS[mode], sample_rate).min(history_max);
        self.back_delay = ms_to_samples(BACK_MS[mode], sample_rate).min(history_max);
        self.depth = depth.clamp(0.0, 1.0);
    }

    /// Returns the `(left, right)` contribution for one frame.
    #[inline]
    pub fn process(&mut self, left: f32, right: f32) -> (f32, f32) {
        let mono = mono_sum(left, right);
        self.mono.write(mono);
        self.history[0].write(left);
        self.history[1].write(right);

        let mut reflections = [0.0f32; 2];
        for (k, (&tap, gain)) in self.taps.iter().zip(REFLECTION_GAINS).enumerate() {
            reflections[k % 2] += self.mono.read(tap) * gain;
        }
        let early = self.depth * REFLECTION_SCALE;

        // rear speakers hear the opposite channel
        let rear_l = self.rear_lp[0].process(self.history[1].read(self.rear_delay));
        let rear_r = self.rear_lp[1].process(self.history[0].read(self.rear_delay));
        let back_l = self.back_lp[0].process(self.history[0].read(self.back_delay));
        let back_r = self.back_lp[1].process(self.history[1].read(self.back_delay));
        let lfe = self.lfe.process(mono) * LFE_GAIN;

        let surround_l = REAR_GAIN * rear_l + BACK_GAIN * (back_l - ANTI_PHASE * back_r);
        let surround_r = REAR_GAIN * rear_r + BACK_GAIN * (back_r - ANTI_PHASE * back_l);

        (
            early * reflections[0] + self.depth * surround_l + lfe,
            early * reflections[1] + self.depth * surround_r + lfe,
        )
    }

    /// Clears every line and filter.
    pub fn reset(&mut self) {
        self.mono.clear();
        for line in &mut self.history {
            line.clear();
        }
        for f in self.rear_lp.iter_mut().chain(self.back_lp.iter_mut()) {
            f.reset();
        }
        self.lfe.reset();
    }
}
