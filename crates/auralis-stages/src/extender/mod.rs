//! Bandwidth extender stage.
//!
//! Regenerates content above the source's codec cutoff with one of two
//! interchangeable algorithms:
//!
//! | Algorithm | Module | Added latency | Notes |
//! |-----------|--------|---------------|-------|
//! | `spectral` | [`spectral`] | `N` (2048, or 512 low-latency) | FFT band replication, 75 % overlap-add |
//! | `harmonic` | [`harmonic`] | 0 | tanh exciter, envelope scaled |
//!
//! Both share the same contract: the stage is a bit-exact passthrough while
//! `extension.enabled` is false or `extension.intensity` is zero, and every
//! output sample is clipped to `[-1, 1]` while it runs.
//!
//! An extender built with [`BandwidthExtender::without_fft`] has no FFT
//! plan and runs the harmonic algorithm whatever the config asks for.

pub mod harmonic;
pub mod spectral;

use auralis_analysis::Complex;
use auralis_config::{Config, ExtensionAlgorithm};
use auralis_core::{AudioBlock, hard_clip};

use crate::stage::{Stage, StageContext, StageError, StageKind};
use harmonic::HarmonicVoice;
use spectral::{
    FFT_SIZE, FFT_SIZE_LOW_LATENCY, FrameWorkspace, OverlapAdd, ReplicationPlan,
    phase_offset_table, spectral_frame_len,
};

/// FFT workspaces for both frame lengths.
#[derive(Debug)]
struct SpectralEngine {
    full: FrameWorkspace,
    short: FrameWorkspace,
    offsets: Vec<f32>,
    voices: Vec<OverlapAdd>,
    plan: ReplicationPlan,
}

impl SpectralEngine {
    fn new(channels: usize) -> Self {
        Self {
            full: FrameWorkspace::new(FFT_SIZE),
            short: FrameWorkspace::new(FFT_SIZE_LOW_LATENCY),
            offsets: phase_offset_table(FFT_SIZE),
            voices: (0..channels).map(|_| OverlapAdd::new(FFT_SIZE)).collect(),
            plan: ReplicationPlan::new(FFT_SIZE, 48000.0, 20000.0, 0.0, Default::default()),
        }
    }

    fn frame_len(&self) -> usize {
        self.voices.first().map_or(FFT_SIZE, OverlapAdd::size)
    }

    fn set_frame_len(&mut self, size: usize) {
        for voice in &mut self.voices {
            voice.set_size(size);
        }
    }

    fn reset(&mut self) {
        for voice in &mut self.voices {
            voice.reset();
        }
    }

    fn process_channel(&mut self, ch: usize, input: &[f32], output: &mut [f32]) {
        let Self {
            full,
            short,
            offsets,
            voices,
            plan,
        } = self;
        let voice = &mut voices[ch];
        let workspace = if voice.size() == FFT_SIZE_LOW_LATENCY {
            short
        } else {
            full
        };
        let mut shape = |spectrum: &mut [Complex<f32>]| plan.apply(spectrum, offsets.as_slice());
        for (o, &x) in output.iter_mut().zip(input) {
            *o = hard_clip(voice.process(x, workspace, &mut shape), 1.0);
        }
    }
}

/// The bandwidth extender.
#[derive(Debug)]
pub struct BandwidthExtender {
    native_rate: f32,
    channels: usize,
    spectral: Option<SpectralEngine>,
    harmonic: Vec<HarmonicVoice>,
    algorithm: ExtensionAlgorithm,
    active: bool,
    rate: f32,
}

impl BandwidthExtender {
    /// Builds the extender with both algorithms available.
    ///
    /// # Errors
    ///
    /// Any [`StageContext::check`] failure.
    pub fn new(context: &StageContext) -> Result<Self, StageError> {
        let mut extender = Self::without_fft(context)?;
        extender.spectral = Some(SpectralEngine::new(context.channels));
        #[cfg(feature = "tracing")]
        tracing::debug!(
            channels = context.channels,
            rate = context.native_rate,
            "extender: spectral path planned"
        );
        Ok(extender)
    }

    /// Builds the extender with only the harmonic algorithm.
    ///
    /// # Errors
    ///
    /// Any [`StageContext::check`] failure.
    pub fn without_fft(context: &StageContext) -> Result<Self, StageError> {
        context.check()?;
        Ok(Self {
            native_rate: context.native_rate,
            channels: context.channels,
            spectral: None,
            harmonic: (0..context.channels)
                .map(|_| HarmonicVoice::new(context.native_rate))
                .collect(),
            algorithm: ExtensionAlgorithm::Spectral,
            active: false,
            rate: context.native_rate,
        })
    }

    /// Algorithm currently running (after any fallback).
    pub fn algorithm(&self) -> ExtensionAlgorithm {
        self.algorithm
    }
}

impl Stage for BandwidthExtender {
    fn kind(&self) -> StageKind {
        StageKind::Extender
    }

    fn configure(&mut self, config: &Config) {
        let active = config.extension_active();
        let rate = config.processing_rate(self.native_rate);
        let algorithm = match (config.extension.algorithm, &self.spectral) {
            (ExtensionAlgorithm::Spectral, Some(_)) => ExtensionAlgorithm::Spectral,
            _ => ExtensionAlgorithm::Harmonic,
        };
        let ext = &config.extension;

        if let Some(engine) = &mut self.spectral {
            let size = spectral_frame_len(config.low_latency);
            let restarted = active != self.active || algorithm != self.algorithm || rate != self.rate;
            if size != engine.frame_len() {
                engine.set_frame_len(size);
            } else if restarted {
                engine.reset();
            }
            engine.plan = ReplicationPlan::new(size, rate, ext.ceiling_hz, ext.intensity, ext.phase);
        }

        if active != self.active || algorithm != self.algorithm {
            for voice in &mut self.harmonic {
                voice.reset();
            }
        }
        for voice in &mut self.harmonic {
            voice.configure(rate, ext.ceiling_hz, ext.intensity, !config.low_latency);
        }

        self.active = active;
        self.algorithm = algorithm;
        self.rate = rate;
    }

    fn process(&mut self, input: &AudioBlock, output: &mut AudioBlock) {
        if !self.active {
            output.copy_from(input);
            return;
        }

        output.set_channels(input.channels());
        let channels = input.channels().min(self.channels);
        match (self.algorithm, &mut self.spectral) {
            (ExtensionAlgorithm::Spectral, Some(engine)) => {
                for ch in 0..channels {
                    engine.process_channel(ch, input.channel(ch), output.channel_mut(ch));
                }
            }
            _ => {
                for (ch, voice) in self.harmonic.iter_mut().enumerate().take(channels) {
                    let src = input.channel(ch);
                    for (o, &x) in output.channel_mut(ch).iter_mut().zip(src) {
                        *o = voice.process(x);
                    }
                }
            }
        }
        for ch in channels..input.channels() {
            output.channel_mut(ch).copy_from_slice(input.channel(ch));
        }
    }

    fn reset(&mut self) {
        if let Some(engine) = &mut self.spectral {
            engine.reset();
        }
        for voice in &mut self.harmonic {
            voice.reset();
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn latency_samples(&self) -> usize {
        match (&self.spectral, self.algorithm) {
            (Some(engine), ExtensionAlgorithm::Spectral) if self.active => engine.frame_len(),
            _ => 0,
        }
    }

    fn is_accelerated(&self) -> bool {
        self.active && self.spectral.is_some() && self.algorithm == ExtensionAlgorithm::Spectral
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auralis_analysis::{Window, band_energy, magnitude_spectrum};
    use auralis_core::BLOCK_SIZE;
    use core::f32::consts::PI;

    fn config(intensity: f32, algorithm: ExtensionAlgorithm) -> Config {
        let mut config = Config::default();
        config.extension.enabled = true;
        config.extension.intensity = intensity;
        config.extension.algorithm = algorithm;
        config
    }

    fn tone_block(start: usize, freq: f32, rate: f32) -> AudioBlock {
        let row: Vec<f32> = (start..start + BLOCK_SIZE)
            .map(|n| 0.5 * (2.0 * PI * freq * n as f32 / rate).sin())
            .collect();
        AudioBlock::from_channels(&[&row, &row])
    }

    #[test]
    fn zero_intensity_is_bit_exact() {
        for algorithm in [ExtensionAlgorithm::Spectral, ExtensionAlgorithm::Harmonic] {
            let mut ext = BandwidthExtender::new(&StageContext::new(48000.0, 2)).unwrap();
            ext.configure(&config(0.0, algorithm));
            let mut out = AudioBlock::new(2);
            for b in 0..4 {
                let input = tone_block(b * BLOCK_SIZE, 3000.0, 48000.0);
                ext.process(&input, &mut out);
                assert_eq!(out, input);
            }
            assert!(!ext.is_active());
            assert_eq!(ext.latency_samples(), 0);
        }
    }

    #[test]
    fn spectral_latency_follows_frame_len() {
        let mut ext = BandwidthExtender::new(&StageContext::new(48000.0, 2)).unwrap();
        let mut config = config(50.0, ExtensionAlgorithm::Spectral);
        ext.configure(&config);
        assert_eq!(ext.latency_samples(), FFT_SIZE);
        assert!(ext.is_accelerated());
        config.low_latency = true;
        ext.configure(&config);
        assert_eq!(ext.latency_samples(), FFT_SIZE_LOW_LATENCY);
    }

    #[test]
    fn without_fft_falls_back_to_harmonic() {
        let mut ext = BandwidthExtender::without_fft(&StageContext::new(48000.0, 2)).unwrap();
        ext.configure(&config(50.0, ExtensionAlgorithm::Spectral));
        assert_eq!(ext.algorithm(), ExtensionAlgorithm::Harmonic);
        assert!(!ext.is_accelerated());
        assert_eq!(ext.latency_samples(), 0);
    }

    #[test]
    fn spectral_replicates_above_cutoff() {
        let rate = 48000.0;
        let mut ext = BandwidthExtender::new(&StageContext::new(rate, 2)).unwrap();
        ext.configure(&config(100.0, ExtensionAlgorithm::Spectral));

        let mut captured = Vec::new();
        let mut out = AudioBlock::new(2);
        for b in 0..40 {
            ext.process(&tone_block(b * BLOCK_SIZE, 9000.0, rate), &mut out);
            if b >= 24 {
                captured.extend_from_slice(out.channel(0));
            }
        }
        let spectrum = magnitude_spectrum(&captured, 2048, Window::Hann);
        let replica = band_energy(&spectrum, rate, 16000.0, 17000.0);
        let empty = band_energy(&spectrum, rate, 19000.0, 20000.0);
        assert!(replica > 100.0 * empty, "replica {replica} empty {empty}");
    }

    #[test]
    fn output_is_clipped() {
        let mut ext = BandwidthExtender::new(&StageContext::new(44100.0, 1)).unwrap();
        ext.configure(&config(100.0, ExtensionAlgorithm::Spectral));
        let loud = AudioBlock::from_channels(&[&[1.0; BLOCK_SIZE]]);
        let mut out = AudioBlock::new(1);
        for _ in 0..40 {
            ext.process(&loud, &mut out);
            assert!(out.peak() <= 1.0);
        }
    }
}
