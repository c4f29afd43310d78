//! Head model: ITD, ILD, crossfeed, and side widening.
//!
//! ```text
//! side  = (L - R) / 2
//! pan   = tanh(3 * side) * width            (-1 = hard left, +1 = hard right)
//! far   = L when pan > 0, R otherwise
//! far  <- delay(far, |pan| * ITD_MAX)       fractional delay
//! far  <- onepole(far, lerp(20 kHz, 1.5 kHz, |pan|))
//! L'    = L + xfeed * lp700(delay(R, 0.4 ms))
//! R'    = R + xfeed * lp700(delay(L, 0.4 ms))
//! (M, S) = mid_side(L', R');  L'' = M + S * (1 + width);  R'' = M - S * (1 + width)
//! ```
//!
//! The delay lines and shadow filters of both ears tick on every sample, so
//! switching the far side or leaving centre never replays stale history.

use auralis_core::{FractionalDelay, OnePole, lerp, mid_side, ms_to_samples};
use libm::tanhf;

/// Largest interaural delay, about one head width.
pub const ITD_MAX_MS: f32 = 0.66;
/// Largest interaural delay in low-latency mode.
pub const ITD_MAX_MS_LOW_LATENCY: f32 = 0.3;

const PAN_DRIVE: f32 = 3.0;
const ILD_OPEN_HZ: f32 = 20000.0;
const ILD_CLOSED_HZ: f32 = 1500.0;
const CROSSFEED_MS: f32 = 0.4;
const CROSSFEED_HZ: f32 = 700.0;
const CROSSFEED_GAIN: f32 = 0.2;

/// Interaural model for one stereo pair.
#[derive(Debug, Clone)]
pub struct HeadModel {
    itd: [FractionalDelay; 2],
    ild: [OnePole; 2],
    crossfeed: [FractionalDelay; 2],
    crossfeed_lp: [OnePole; 2],
    sample_rate: f32,
    width: f32,
    itd_max: f32,
    crossfeed_delay: f32,
}

impl HeadModel {
    /// Allocates delay lines long enough for `max_rate`.
    pub fn new(sample_rate: f32, max_rate: f32) -> Self {
        let itd_len = || FractionalDelay::from_time(max_rate, ITD_MAX_MS + 0.1);
        let xf_len = || FractionalDelay::from_time(max_rate, CROSSFEED_MS + 0.1);
        let mut model = Self {
            itd: [itd_len(), itd_len()],
            ild: [
                OnePole::new(sample_rate, ILD_OPEN_HZ),
                OnePole::new(sample_rate, ILD_OPEN_HZ),
            ],
            crossfeed: [xf_len(), xf_len()],
            crossfeed_lp: [
                OnePole::new(sample_rate, CROSSFEED_HZ),
                OnePole::new(sample_rate, CROSSFEED_HZ),
            ],
            sample_rate,
            width: 0.0,
            itd_max: 0.0,
            crossfeed_delay: 0.0,
        };
        model.configure(sample_rate, 0.0, false);
        model
    }

    /// Retunes for a processing rate, width (0-1), and latency mode.
    pub fn configure(&mut self, sample_rate: f32, width: f32, low_latency: bool) {
        if sample_rate != self.sample_rate {
            self.sample_rate = sample_rate;
            for f in self.ild.iter_mut().chain(self.crossfeed_lp.iter_mut()) {
                f.set_sample_rate(sample_rate);
            }
        }
        let itd_ms = if low_latency {
            ITD_MAX_MS_LOW_LATENCY
        } else {
            ITD_MAX_MS
        };
        self.width = width.clamp(0.0, 1.0);
        self.itd_max = ms_to_samples(itd_ms, sample_rate).min(self.itd[0].max_delay() as f32);
        self.crossfeed_delay =
            ms_to_samples(CROSSFEED_MS, sample_rate).min(self.crossfeed[0].max_delay() as f32);
    }

    /// Virtual pan position for one frame.
    #[inline]
    pub fn pan(&self, left: f32, right: f32) -> f32 {
        let side = 0.5 * (left - right);
        // positive side means left-heavy, so negate for a left = -1 convention
        -tanhf(PAN_DRIVE * side) * self.width
    }

    /// Renders one frame.
    #[inline]
    pub fn process(&mut self, left: f32, right: f32) -> (f32, f32) {
        let pan = self.pan(left, right);
        let amount = pan.abs();
        let far = usize::from(pan < 0.0);
        let delay = amount * self.itd_max;

        let mut frame = [left, right];
        for (ch, sample) in frame.iter_mut().enumerate() {
            *sample = self.itd[ch].tick(*sample, if ch == far { delay } else { 0.0 });
        }
        // head shadow is heard on the far ear only
        for (ch, sample) in frame.iter_mut().enumerate() {
            let shadow = if ch == far { amount } else { 0.0 };
            self.ild[ch].set_frequency(lerp(ILD_OPEN_HZ, ILD_CLOSED_HZ, shadow));
            let shaded = self.ild[ch].process(*sample);
            if shadow > 0.0 {
                *sample = shaded;
            }
        }

        let from_right = self.crossfeed[1].tick(frame[1], self.crossfeed_delay);
        let from_left = self.crossfeed[0].tick(frame[0], self.crossfeed_delay);
        let l = frame[0] + CROSSFEED_GAIN * self.crossfeed_lp[0].process(from_right);
        let r = frame[1] + CROSSFEED_GAIN * self.crossfeed_lp[1].process(from_left);

        let (mid, side) = mid_side(l, r);
        let spread = side * (1.0 + self.width);
        (mid + spread, mid - spread)
    }

    /// Clears every delay line and filter.
    pub fn reset(&mut self) {
        for d in self.itd.iter_mut().chain(self.crossfeed.iter_mut()) {
            d.clear();
        }
        for f in self.ild.iter_mut().chain(self.crossfeed_lp.iter_mut()) {
            f.reset();
        }
    }
}
