//! The ordered stage list plus the output and analysis taps.
//!
//! ```text
//! input ─► Interpolation ─► Extender ─► Spatial ─► OutputStage ─► output
//!                                                      │
//!                                                      └─► SpectrumTap
//! ```
//!
//! Stages ping-pong between two preallocated blocks. A stage that failed to
//! build is simply absent; the blocks flow past the gap unchanged.

use auralis_analysis::SpectrumAnalyzer;
use auralis_config::Config;
use auralis_core::{AudioBlock, BLOCK_SIZE, RingBuffer, db_to_linear, hard_clip, mono_sum};
use auralis_stages::{Stage, StageContext, StageKind};

use crate::builder::StageBuilder;
use crate::shared::ConfigSnapshot;

/// Analysis frame length of the spectrum tap.
pub const SPECTRUM_FRAME: usize = 2048;
/// Bins reported by the spectrum tap.
pub const SPECTRUM_BINS: usize = SPECTRUM_FRAME / 2;
/// Blocks between spectrum updates (a quarter frame).
const SPECTRUM_HOP_BLOCKS: u64 = (SPECTRUM_FRAME / 4 / BLOCK_SIZE) as u64;

/// Final summing node: fold to stereo, apply gain, clip to `[-1, 1]`.
#[derive(Debug, Clone)]
pub struct OutputStage {
    gain: f32,
}

impl OutputStage {
    /// Unity-gain output stage.
    pub fn new() -> Self {
        Self { gain: 1.0 }
    }

    /// Picks up `output_gain_db`.
    pub fn configure(&mut self, config: &Config) {
        self.gain = db_to_linear(config.output_gain_db);
    }

    /// Writes the stereo output block.
    pub fn process(&self, input: &AudioBlock, output: &mut AudioBlock) {
        input.fold_to_stereo(output);
        let gain = self.gain;
        let (left, right) = output.stereo_mut();
        for s in left.iter_mut().chain(right.iter_mut()) {
            let scaled = if gain == 1.0 { *s } else { *s * gain };
            *s = hard_clip(scaled, 1.0);
        }
    }
}

impl Default for OutputStage {
    fn default() -> Self {
        Self::new()
    }
}

/// Rolling power spectrum of the output's mono sum.
#[derive(Debug)]
struct SpectrumTap {
    analyzer: SpectrumAnalyzer,
    history: RingBuffer,
    frame: Vec<f32>,
    bins: Vec<f32>,
    blocks: u64,
    fresh: bool,
}

impl SpectrumTap {
    fn new() -> Self {
        Self {
            analyzer: SpectrumAnalyzer::new(SPECTRUM_FRAME),
            history: RingBuffer::new(1, SPECTRUM_FRAME),
            frame: vec![0.0; SPECTRUM_FRAME],
            bins: vec![auralis_analysis::SPECTRUM_FLOOR_DB; SPECTRUM_BINS],
            blocks: 0,
            fresh: false,
        }
    }

    fn push(&mut self, block: &AudioBlock) {
        let (left, right) = (block.channel(0), block.channel(1));
        for (&l, &r) in left.iter().zip(right) {
            self.history.push(mono_sum(l, r));
        }
        self.blocks += 1;
        if self.blocks % SPECTRUM_HOP_BLOCKS == 0 {
            self.history.copy_latest(0, &mut self.frame);
            self.analyzer.analyze(&self.frame, &mut self.bins);
            self.fresh = true;
        }
    }

    fn reset(&mut self) {
        self.history.clear();
        self.bins.fill(auralis_analysis::SPECTRUM_FLOOR_DB);
        self.blocks = 0;
        self.fresh = false;
    }
}

/// Stages wired for one connection.
pub struct PipelineChain {
    context: StageContext,
    stages: Vec<Box<dyn Stage>>,
    missing: Vec<StageKind>,
    scratch: [AudioBlock; 2],
    output: OutputStage,
    tap: SpectrumTap,
    applied: Option<u64>,
}

impl core::fmt::Debug for PipelineChain {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PipelineChain")
            .field("context", &self.context)
            .field("stages", &self.stage_kinds())
            .field("missing", &self.missing)
            .field("applied", &self.applied)
            .finish_non_exhaustive()
    }
}

impl PipelineChain {
    /// Builds every stage in chain order, leaving out the ones that fail.
    pub fn build(builder: &mut dyn StageBuilder, context: StageContext) -> Self {
        let mut stages = Vec::with_capacity(StageKind::ALL.len());
        let mut missing = Vec::new();
        for kind in StageKind::ALL {
            match builder.build(kind, &context) {
                Ok(stage) => stages.push(stage),
                Err(err) => {
                    tracing::warn!(
                        stage = %kind,
                        error = %err,
                        "chain_build: stage unavailable, bypassing"
                    );
                    missing.push(kind);
                }
            }
        }
        tracing::debug!(
            "chain_build: {} stages at {} Hz x {} ch",
            stages.len(),
            context.native_rate,
            context.channels
        );
        Self {
            context,
            stages,
            missing,
            scratch: [AudioBlock::new(context.channels), AudioBlock::new(context.channels)],
            output: OutputStage::new(),
            tap: SpectrumTap::new(),
            applied: None,
        }
    }

    /// Format the chain was built for.
    pub fn context(&self) -> StageContext {
        self.context
    }

    /// Kinds of the stages present, in order.
    pub fn stage_kinds(&self) -> Vec<StageKind> {
        self.stages.iter().map(|s| s.kind()).collect()
    }

    /// Kinds that failed to build.
    pub fn missing_stages(&self) -> &[StageKind] {
        &self.missing
    }

    /// Pushes `config` to every stage and the output node.
    pub fn configure(&mut self, config: &Config) {
        for stage in &mut self.stages {
            stage.configure(config);
        }
        self.output.configure(config);
    }

    /// Applies `snapshot` if it is newer than the last one applied.
    ///
    /// Returns true when the stages were reconfigured.
    pub fn apply(&mut self, snapshot: &ConfigSnapshot) -> bool {
        if self.applied == Some(snapshot.sequence) {
            return false;
        }
        self.configure(&snapshot.config);
        self.applied = Some(snapshot.sequence);
        true
    }

    /// Runs one block through every stage and the output node.
    pub fn process(&mut self, input: &AudioBlock, output: &mut AudioBlock) {
        let [first, second] = &mut self.scratch;
        let (mut current, mut next) = (first, second);
        current.copy_from(input);
        for stage in &mut self.stages {
            stage.process(current, next);
            core::mem::swap(&mut current, &mut next);
        }
        self.output.process(current, output);
        self.tap.push(output);
    }

    /// Delay of the active stages: one block each plus the stage's own.
    pub fn latency_samples(&self) -> usize {
        self.stages
            .iter()
            .filter(|s| s.is_active())
            .map(|s| BLOCK_SIZE + s.latency_samples())
            .sum()
    }

    /// Whether any stage is on an accelerated path.
    pub fn is_accelerated(&self) -> bool {
        self.stages.iter().any(|s| s.is_accelerated())
    }

    /// Copies the latest spectrum into `out` if it changed since the last
    /// call. Returns whether anything was copied.
    pub fn take_spectrum(&mut self, out: &mut [f32]) -> bool {
        if !self.tap.fresh {
            return false;
        }
        let n = out.len().min(self.tap.bins.len());
        out[..n].copy_from_slice(&self.tap.bins[..n]);
        self.tap.fresh = false;
        true
    }

    /// Clears every stage's history and the spectrum tap.
    pub fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
        for block in &mut self.scratch {
            block.silence();
        }
        self.tap.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::DefaultStageBuilder;
    use auralis_config::{SpatialMode, TargetRate};

    fn chain(channels: usize) -> PipelineChain {
        PipelineChain::build(&mut DefaultStageBuilder, StageContext::new(48000.0, channels))
    }

    fn snapshot(sequence: u64, config: Config) -> ConfigSnapshot {
        ConfigSnapshot { sequence, config }
    }

    #[test]
    fn builds_all_stages_in_order() {
        let chain = chain(2);
        assert_eq!(chain.stage_kinds(), StageKind::ALL);
        assert!(chain.missing_stages().is_empty());
    }

    #[test]
    fn bypass_is_identity_for_stereo() {
        let mut chain = chain(2);
        chain.apply(&snapshot(1, Config::bypass()));
        let row: Vec<f32> = (0..BLOCK_SIZE).map(|i| (i as f32 * 0.1).sin() * 0.9).collect();
        let input = AudioBlock::from_channels(&[&row, &row]);
        let mut output = AudioBlock::new(2);
        chain.process(&input, &mut output);
        assert_eq!(output, input);
    }

    #[test]
    fn mono_input_is_duplicated() {
        let mut chain = chain(1);
        chain.apply(&snapshot(1, Config::bypass()));
        let input = AudioBlock::from_channels(&[&[0.25; BLOCK_SIZE]]);
        let mut output = AudioBlock::new(2);
        chain.process(&input, &mut output);
        assert_eq!(output.channels(), 2);
        assert_eq!(output.channel(1)[5], 0.25);
    }

    #[test]
    fn apply_skips_same_sequence() {
        let mut chain = chain(2);
        let snap = snapshot(4, Config::default());
        assert!(chain.apply(&snap));
        assert!(!chain.apply(&snap));
        assert!(chain.apply(&snapshot(5, Config::default())));
    }

    #[test]
    fn output_gain_and_clip() {
        let mut stage = OutputStage::new();
        let config = Config {
            output_gain_db: 12.0,
            ..Config::bypass()
        };
        stage.configure(&config);
        let input = AudioBlock::from_channels(&[&[0.5; BLOCK_SIZE], &[0.1; BLOCK_SIZE]]);
        let mut output = AudioBlock::new(2);
        stage.process(&input, &mut output);
        assert_eq!(output.channel(0)[0], 1.0);
        assert!((output.channel(1)[0] - 0.398).abs() < 1e-3);
    }

    #[test]
    fn latency_matches_active_stages() {
        let mut chain = chain(2);
        let mut config = Config {
            target_rate: TargetRate::Double,
            ..Config::default()
        };
        config.extension.enabled = true;
        config.spatial.mode = SpatialMode::Surround71;
        chain.apply(&snapshot(1, config));
        assert_eq!(
            chain.latency_samples(),
            crate::latency::latency_samples(&config, 48000.0)
        );
        assert!(chain.is_accelerated());
    }

    #[test]
    fn spectrum_updates_every_quarter_frame() {
        let mut chain = chain(2);
        chain.apply(&snapshot(1, Config::bypass()));
        let input = AudioBlock::from_channels(&[&[0.5; BLOCK_SIZE], &[0.5; BLOCK_SIZE]]);
        let mut output = AudioBlock::new(2);
        let mut bins = vec![0.0; SPECTRUM_BINS];
        for _ in 0..SPECTRUM_HOP_BLOCKS - 1 {
            chain.process(&input, &mut output);
            assert!(!chain.take_spectrum(&mut bins));
        }
        chain.process(&input, &mut output);
        assert!(chain.take_spectrum(&mut bins));
        assert!(!chain.take_spectrum(&mut bins), "consumed");
        // DC dominates
        assert!(bins[0] > bins[200]);
    }
}
