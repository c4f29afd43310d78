//! Spatial virtualizer stage.
//!
//! Renders any stereo or wider input to a binaural stereo pair. The mode
//! decides which parts of the model run:
//!
//! | Mode | Head model | Room + 7.1 | Pinna |
//! |------|------------|------------|-------|
//! | `off` | - | - | - |
//! | `stereo-wide` | yes | - | - |
//! | `surround-71` | yes | yes | - |
//! | `atmos` | yes | yes | yes |
//!
//! Mono input and `off` pass through unchanged. Inputs wider than stereo are
//! folded down with [`AudioBlock::fold_to_stereo`] first. All delay lines are
//! sized at construction for four times the native rate, so switching the
//! target rate never allocates.

pub mod binaural;
pub mod pinna;
pub mod room;

use auralis_config::{Config, SpatialMode};
use auralis_core::{AudioBlock, BLOCK_SIZE, hard_clip, ms_to_samples};

use crate::stage::{Stage, StageContext, StageError, StageKind};
use binaural::HeadModel;
use pinna::{PinnaCue, pinna_delay_samples};
use room::{RoomModel, longest_reflection_ms};

/// Highest processing rate relative to native.
const MAX_RATE_FACTOR: f32 = 4.0;

/// Delay the virtualizer adds at `config`, in callback samples.
///
/// Surround modes contribute the depth-scaled longest reflection; atmos
/// adds the height-scaled pinna comb. The delay lines are tuned at
/// [`Config::processing_rate`] while blocks keep arriving at the native
/// cadence, so both terms are counted at the processing rate.
pub fn spatial_latency_samples(config: &Config, native_rate: f32) -> usize {
    if !config.spatial_active() {
        return 0;
    }
    let rate = config.processing_rate(native_rate);
    let spatial = &config.spatial;
    let mut samples = 0.0;
    if spatial.mode.has_room() {
        let reflection = ms_to_samples(longest_reflection_ms(config.low_latency), rate);
        samples += spatial.depth / 100.0 * reflection;
    }
    if spatial.mode == SpatialMode::Atmos {
        samples += spatial.height / 100.0 * pinna_delay_samples(rate);
    }
    samples.round() as usize
}

/// The spatial virtualizer.
#[derive(Debug)]
pub struct SpatialVirtualizer {
    native_rate: f32,
    head: HeadModel,
    room: RoomModel,
    pinna: [PinnaCue; 2],
    folded: AudioBlock,
    mode: SpatialMode,
    active: bool,
    latency: usize,
}

impl SpatialVirtualizer {
    /// Builds the stage with delay lines for up to 4x the native rate.
    ///
    /// # Errors
    ///
    /// Any [`StageContext::check`] failure.
    pub fn new(context: &StageContext) -> Result<Self, StageError> {
        context.check()?;
        let rate = context.native_rate;
        let max_rate = rate * MAX_RATE_FACTOR;
        Ok(Self {
            native_rate: rate,
            head: HeadModel::new(rate, max_rate),
            room: RoomModel::new(rate, max_rate),
            pinna: [PinnaCue::new(max_rate), PinnaCue::new(max_rate)],
            folded: AudioBlock::new(2),
            mode: SpatialMode::Off,
            active: false,
            latency: 0,
        })
    }

    /// Mode from the last applied config.
    pub fn mode(&self) -> SpatialMode {
        self.mode
    }
}

impl Stage for SpatialVirtualizer {
    fn kind(&self) -> StageKind {
        StageKind::Spatial
    }

    fn configure(&mut self, config: &Config) {
        let active = config.spatial_active();
        let mode = if active {
            config.spatial.mode
        } else {
            SpatialMode::Off
        };
        if mode != self.mode {
            self.reset();
        }

        let rate = config.processing_rate(self.native_rate);
        let spatial = &config.spatial;
        self.head
            .configure(rate, spatial.width / 100.0, config.low_latency);
        self.room
            .configure(rate, spatial.depth / 100.0, config.low_latency);
        for cue in &mut self.pinna {
            cue.configure(rate, spatial.height / 100.0);
        }

        self.mode = mode;
        self.active = active;
        self.latency = spatial_latency_samples(config, self.native_rate);
    }

    fn process(&mut self, input: &AudioBlock, output: &mut AudioBlock) {
        if !self.active || input.channels() == 1 {
            output.copy_from(input);
            return;
        }

        let source = if input.channels() > 2 {
            input.fold_to_stereo(&mut self.folded);
            &self.folded
        } else {
            input
        };
        let room = self.mode.has_room();
        let height = self.mode == SpatialMode::Atmos;

        output.set_channels(2);
        let (out_l, out_r) = output.stereo_mut();
        let (in_l, in_r) = (source.channel(0), source.channel(1));
        for i in 0..BLOCK_SIZE {
            let (dry_l, dry_r) = (in_l[i], in_r[i]);
            let (mut l, mut r) = self.head.process(dry_l, dry_r);
            if room {
                let (room_l, room_r) = self.room.process(dry_l, dry_r);
                l += room_l;
                r += room_r;
            }
            if height {
                l = self.pinna[0].process(l);
                r = self.pinna[1].process(r);
            }
            out_l[i] = hard_clip(l, 1.0);
            out_r[i] = hard_clip(r, 1.0);
        }
    }

    fn reset(&mut self) {
        self.head.reset();
        self.room.reset();
        for cue in &mut self.pinna {
            cue.reset();
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn latency_samples(&self) -> usize {
        if self.active { self.latency } else { 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auralis_config::TargetRate;

    fn config(mode: SpatialMode) -> Config {
        let mut config = Config::default();
        config.spatial.mode = mode;
        config.spatial.width = 100.0;
        config.spatial.depth = 100.0;
        config.spatial.height = 100.0;
        config
    }

    fn noise_block(seed: u32, channels: usize) -> AudioBlock {
        let mut state = seed.wrapping_mul(747_796_405).wrapping_add(1);
        let mut rows = vec![[0.0f32; BLOCK_SIZE]; channels];
        for row in &mut rows {
            for s in row.iter_mut() {
                state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                *s = (state >> 8) as f32 / (1u32 << 24) as f32 * 2.0 - 1.0;
            }
        }
        let refs: Vec<&[f32]> = rows.iter().map(|r| r.as_slice()).collect();
        AudioBlock::from_channels(&refs)
    }

    fn stage(config: &Config, channels: usize) -> SpatialVirtualizer {
        let mut stage = SpatialVirtualizer::new(&StageContext::new(48000.0, channels)).unwrap();
        stage.configure(config);
        stage
    }

    #[test]
    fn off_and_mono_bypass() {
        let mut off = stage(&config(SpatialMode::Off), 2);
        let input = noise_block(1, 2);
        let mut out = AudioBlock::new(2);
        off.process(&input, &mut out);
        assert_eq!(out, input);

        let mut wide = stage(&config(SpatialMode::Atmos), 1);
        let mono = noise_block(2, 1);
        wide.process(&mono, &mut out);
        assert_eq!(out, mono);
    }

    #[test]
    fn stereo_wide_keeps_centered_input_centered() {
        let mut wide = stage(&config(SpatialMode::StereoWide), 2);
        let mut out = AudioBlock::new(2);
        for seed in 0..8 {
            let mono = noise_block(seed, 1);
            let input = AudioBlock::from_channels(&[mono.channel(0), mono.channel(0)]);
            wide.process(&input, &mut out);
            assert_eq!(out.channel(0), out.channel(1));
        }
    }

    #[test]
    fn every_mode_outputs_clipped_stereo() {
        for mode in [SpatialMode::StereoWide, SpatialMode::Surround71, SpatialMode::Atmos] {
            let mut spatial = stage(&config(mode), 8);
            let mut out = AudioBlock::new(2);
            for seed in 0..16 {
                spatial.process(&noise_block(seed, 8), &mut out);
                assert_eq!(out.channels(), 2);
                assert!(out.peak() <= 1.0);
            }
        }
    }

    #[test]
    fn latency_tracks_mode() {
        let native = 48000.0;
        assert_eq!(spatial_latency_samples(&config(SpatialMode::StereoWide), native), 0);
        let surround = spatial_latency_samples(&config(SpatialMode::Surround71), native);
        let atmos = spatial_latency_samples(&config(SpatialMode::Atmos), native);
        assert_eq!(surround, 1118);
        assert_eq!(atmos, 1136);

        // delay lines run at the processing rate, blocks at the native one
        let mut doubled = config(SpatialMode::Atmos);
        doubled.target_rate = TargetRate::Double;
        assert_eq!(spatial_latency_samples(&doubled, native), 2237 + 36);

        let mut low = config(SpatialMode::Atmos);
        low.low_latency = true;
        assert!(spatial_latency_samples(&low, native) < atmos);
        assert_eq!(stage(&low, 2).latency_samples(), spatial_latency_samples(&low, native));
    }

    /// Onset of the last burst where the two ears differ.
    fn last_reflection_onset(config: &Config) -> usize {
        let mut spatial = stage(config, 2);
        let mut impulse = [0.0f32; BLOCK_SIZE];
        impulse[0] = 0.5;
        let first = AudioBlock::from_channels(&[&impulse, &impulse]);
        let silence = AudioBlock::new(2);
        let mut out = AudioBlock::new(2);

        let mut onset = 0;
        let mut inside = false;
        for b in 0..48 {
            spatial.process(if b == 0 { &first } else { &silence }, &mut out);
            for i in 0..BLOCK_SIZE {
                let differs = (out.channel(0)[i] - out.channel(1)[i]).abs() > 1e-4;
                if differs && !inside {
                    onset = b * BLOCK_SIZE + i;
                }
                inside = differs;
            }
        }
        onset
    }

    #[test]
    fn reflection_arrives_at_reported_latency() {
        for target_rate in [TargetRate::Native, TargetRate::Double, TargetRate::Quadruple] {
            let mut config = config(SpatialMode::Surround71);
            config.target_rate = target_rate;
            config.spatial.width = 0.0;
            let reported = stage(&config, 2).latency_samples();
            let onset = last_reflection_onset(&config);
            assert!(
                onset.abs_diff(reported) <= 1,
                "{target_rate:?}: reflection at {onset}, reported {reported}"
            );
        }
    }

    #[test]
    fn pinna_echo_arrives_at_reported_latency() {
        for target_rate in [TargetRate::Native, TargetRate::Double, TargetRate::Quadruple] {
            let mut config = config(SpatialMode::Atmos);
            config.target_rate = target_rate;
            config.spatial.depth = 0.0;
            let mut cue = PinnaCue::new(48000.0 * MAX_RATE_FACTOR);
            cue.configure(config.processing_rate(48000.0), 1.0);

            let echo = (0..400)
                .map(|n| cue.process(if n == 0 { 1.0 } else { 0.0 }))
                .position(|y| y < -1e-3);
            assert_eq!(echo, Some(spatial_latency_samples(&config, 48000.0)));
        }
    }

    #[test]
    fn mode_change_clears_tails() {
        let mut spatial = stage(&config(SpatialMode::Surround71), 2);
        let mut out = AudioBlock::new(2);
        for seed in 0..10 {
            spatial.process(&noise_block(seed, 2), &mut out);
        }
        spatial.configure(&config(SpatialMode::StereoWide));
        spatial.configure(&config(SpatialMode::Surround71));
        spatial.process(&AudioBlock::new(2), &mut out);
        assert_eq!(out.peak(), 0.0);
    }
}
