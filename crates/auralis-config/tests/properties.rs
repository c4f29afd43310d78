//! Property-based tests for config validation and serialization.

use auralis_config::{Config, SpatialMode, TargetRate, validate_config, validate_for_rate};
use proptest::prelude::*;

fn spatial_mode() -> impl Strategy<Value = SpatialMode> {
    prop_oneof![
        Just(SpatialMode::Off),
        Just(SpatialMode::StereoWide),
        Just(SpatialMode::Surround71),
        Just(SpatialMode::Atmos),
    ]
}

fn target_rate() -> impl Strategy<Value = TargetRate> {
    prop_oneof![
        Just(TargetRate::Native),
        Just(TargetRate::Double),
        Just(TargetRate::Quadruple),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// In-range amounts always validate; anything outside [0, 100] never does.
    #[test]
    fn amount_ranges(width in -50.0f32..150.0, depth in 0.0f32..=100.0) {
        let mut config = Config::default();
        config.spatial.width = width;
        config.spatial.depth = depth;
        let ok = validate_config(&config).is_ok();
        prop_assert_eq!(ok, (0.0..=100.0).contains(&width));
    }

    /// Validation against a rate never passes a ceiling above output Nyquist.
    #[test]
    fn accepted_ceiling_fits_nyquist(
        ceiling in 1000.0f32..96000.0,
        rate in prop_oneof![Just(44100.0f32), Just(48000.0), Just(96000.0)],
        target in target_rate(),
    ) {
        let mut config = Config::default();
        config.extension.enabled = true;
        config.extension.ceiling_hz = ceiling;
        config.target_rate = target;
        if validate_for_rate(&config, rate).is_ok() {
            prop_assert!(ceiling <= config.output_rate(rate) / 2.0);
        }
    }

    /// Any config survives a TOML round trip unchanged.
    #[test]
    fn toml_roundtrip(
        mode in spatial_mode(),
        target in target_rate(),
        intensity in 0.0f32..=100.0,
        low_latency in any::<bool>(),
    ) {
        let mut config = Config::default();
        config.spatial.mode = mode;
        config.target_rate = target;
        config.extension.intensity = intensity;
        config.low_latency = low_latency;
        let back = Config::from_toml(&config.to_toml().unwrap()).unwrap();
        prop_assert_eq!(back, config);
    }
}
