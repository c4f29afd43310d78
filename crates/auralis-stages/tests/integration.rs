//! Integration tests chaining stages the way the engine does.

use std::f32::consts::PI;

use auralis_analysis::{Window, band_energy, magnitude_spectrum, peak_frequency};
use auralis_config::{Config, ExtensionAlgorithm, SpatialMode, TargetRate};
use auralis_core::{AudioBlock, BLOCK_SIZE};
use auralis_stages::{
    BandwidthExtender, FFT_SIZE, Interpolator, SpatialVirtualizer, Stage, StageContext,
    interpolation_half_width, spatial_latency_samples,
};

fn sine(start: usize, len: usize, freq: f32, rate: f32) -> Vec<f32> {
    (start..start + len)
        .map(|n| 0.5 * (2.0 * PI * freq * n as f32 / rate).sin())
        .collect()
}

fn stereo(row: &[f32]) -> AudioBlock {
    AudioBlock::from_channels(&[row, row])
}

#[test]
fn sinc_2x_block_peaks_at_upsampled_tone() {
    let config = Config {
        target_rate: TargetRate::Double,
        ..Config::default()
    };
    let mut interp = Interpolator::new(&StageContext::new(48000.0, 2)).unwrap();
    interp.configure(&config);

    let mut out = AudioBlock::new(2);
    interp.process(&stereo(&sine(0, BLOCK_SIZE, 1000.0, 48000.0)), &mut out);
    interp.process(&stereo(&sine(BLOCK_SIZE, BLOCK_SIZE, 1000.0, 48000.0)), &mut out);

    // the block holds 64 native samples stretched over 128 at 96 kHz
    let mut frame = out.channel(0).to_vec();
    Window::Hann.apply(&mut frame);
    let spectrum = magnitude_spectrum(&frame, 4096, Window::Rectangular);
    let peak = peak_frequency(&spectrum, 96000.0);
    assert!((peak - 1000.0).abs() < 100.0, "peak at {peak} Hz");
    assert_eq!(out.len(), BLOCK_SIZE);
}

#[test]
fn extender_then_spatial_stays_in_range() {
    let mut config = Config::default();
    config.extension.enabled = true;
    config.extension.intensity = 100.0;
    config.spatial.mode = SpatialMode::Atmos;
    config.spatial.height = 100.0;

    let context = StageContext::new(48000.0, 2);
    let mut extender = BandwidthExtender::new(&context).unwrap();
    let mut spatial = SpatialVirtualizer::new(&context).unwrap();
    extender.configure(&config);
    spatial.configure(&config);

    let mut mid = AudioBlock::new(2);
    let mut out = AudioBlock::new(2);
    for b in 0..48 {
        let left = sine(b * BLOCK_SIZE, BLOCK_SIZE, 9000.0, 48000.0);
        let right = sine(b * BLOCK_SIZE, BLOCK_SIZE, 440.0, 48000.0);
        extender.process(&AudioBlock::from_channels(&[&left, &right]), &mut mid);
        spatial.process(&mid, &mut out);
        assert!(out.peak() <= 1.0);
    }
    assert_eq!(extender.latency_samples(), FFT_SIZE);
    assert_eq!(
        spatial.latency_samples(),
        spatial_latency_samples(&config, 48000.0)
    );
}

#[test]
fn harmonic_extender_adds_high_band() {
    let rate = 48000.0;
    let mut config = Config::default();
    config.extension.enabled = true;
    config.extension.intensity = 100.0;
    config.extension.algorithm = ExtensionAlgorithm::Harmonic;

    let mut extender = BandwidthExtender::new(&StageContext::new(rate, 1)).unwrap();
    extender.configure(&config);
    assert!(!extender.is_accelerated());

    let mut dry = Vec::new();
    let mut wet = Vec::new();
    let mut out = AudioBlock::new(1);
    for b in 0..32 {
        let row = sine(b * BLOCK_SIZE, BLOCK_SIZE, 6000.0, rate);
        extender.process(&AudioBlock::from_channels(&[&row]), &mut out);
        if b >= 16 {
            dry.extend_from_slice(&row);
            wet.extend_from_slice(out.channel(0));
        }
    }
    let dry_hf = band_energy(&magnitude_spectrum(&dry, 2048, Window::Hann), rate, 15000.0, 20000.0);
    let wet_hf = band_energy(&magnitude_spectrum(&wet, 2048, Window::Hann), rate, 15000.0, 20000.0);
    assert!(wet_hf > 10.0 * dry_hf, "dry {dry_hf} wet {wet_hf}");
}

#[test]
fn surround_input_is_rendered_to_stereo() {
    let mut config = Config::default();
    config.spatial.mode = SpatialMode::Surround71;

    let mut spatial = SpatialVirtualizer::new(&StageContext::new(48000.0, 8)).unwrap();
    spatial.configure(&config);

    let rows: Vec<Vec<f32>> = (0..8)
        .map(|ch| sine(0, BLOCK_SIZE, 200.0 * (ch + 1) as f32, 48000.0))
        .collect();
    let refs: Vec<&[f32]> = rows.iter().map(Vec::as_slice).collect();
    let mut out = AudioBlock::new(8);
    spatial.process(&AudioBlock::from_channels(&refs), &mut out);
    assert_eq!(out.channels(), 2);
    assert!(out.peak() > 0.0 && out.peak() <= 1.0);
}

#[test]
fn latency_helpers_match_stages() {
    let mut config = Config {
        target_rate: TargetRate::Quadruple,
        low_latency: true,
        ..Config::default()
    };
    let mut interp = Interpolator::new(&StageContext::new(44100.0, 2)).unwrap();
    interp.configure(&config);
    assert_eq!(interp.latency_samples(), interpolation_half_width(&config));

    config.enabled = false;
    interp.configure(&config);
    assert_eq!(interp.latency_samples(), 0);
}
