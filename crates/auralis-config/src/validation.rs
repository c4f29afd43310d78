//! Config validation.
//!
//! Two layers run at the settings boundary:
//!
//! - [`validate_config`] checks every field on its own (ranges, finiteness)
//!   and needs nothing but the config.
//! - [`validate_for_rate`] adds the checks that depend on the source's
//!   native rate, such as keeping the extension ceiling below Nyquist.
//!
//! A rejected config never reaches the signal chain; the previous one stays
//! active.
//!
//! # Example
//!
//! ```rust
//! use auralis_config::{Config, validate_config, validate_for_rate};
//!
//! let mut config = Config::default();
//! config.extension.enabled = true;
//! config.extension.ceiling_hz = 30000.0;
//!
//! assert!(validate_config(&config).is_ok());
//! assert!(validate_for_rate(&config, 48000.0).is_err());
//! ```

use thiserror::Error;

use crate::config::Config;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Parameter value out of range.
    #[error("parameter '{param}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Dotted field name.
        param: String,
        /// The value that was out of range.
        value: f32,
        /// Minimum allowed value.
        min: f32,
        /// Maximum allowed value.
        max: f32,
    },

    /// NaN or infinite value.
    #[error("parameter '{param}' is not a finite number")]
    NonFinite {
        /// Dotted field name.
        param: String,
    },

    /// Extension ceiling above the output Nyquist frequency.
    #[error("extension ceiling {ceiling_hz} Hz is above the output Nyquist frequency {nyquist_hz} Hz")]
    CeilingAboveNyquist {
        /// Configured ceiling.
        ceiling_hz: f32,
        /// Half the output rate.
        nyquist_hz: f32,
    },

    /// Native sample rate the engine cannot run at.
    #[error("sample rate {0} Hz is not supported")]
    UnsupportedSampleRate(f32),

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Lowest extension ceiling accepted.
pub const MIN_CEILING_HZ: f32 = 1000.0;
/// Highest extension ceiling accepted (Nyquist of 4x 48 kHz).
pub const MAX_CEILING_HZ: f32 = 96000.0;
/// Output gain range in dB.
pub const OUTPUT_GAIN_RANGE_DB: (f32, f32) = (-60.0, 12.0);
/// Native sample rates the engine accepts.
pub const SAMPLE_RATE_RANGE: (f32, f32) = (8000.0, 192_000.0);

fn check_range(errors: &mut Vec<ValidationError>, param: &str, value: f32, min: f32, max: f32) {
    if !value.is_finite() {
        errors.push(ValidationError::NonFinite {
            param: param.to_string(),
        });
    } else if value < min || value > max {
        errors.push(ValidationError::OutOfRange {
            param: param.to_string(),
            value,
            min,
            max,
        });
    }
}

fn collect(mut errors: Vec<ValidationError>) -> ValidationResult<()> {
    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}

/// Validate every field of `config` in isolation.
///
/// # Errors
///
/// Returns the single failing check, or [`ValidationError::Multiple`] when
/// more than one field is invalid.
pub fn validate_config(config: &Config) -> ValidationResult<()> {
    let mut errors = Vec::new();

    check_range(
        &mut errors,
        "extension.ceiling_hz",
        config.extension.ceiling_hz,
        MIN_CEILING_HZ,
        MAX_CEILING_HZ,
    );
    check_range(
        &mut errors,
        "extension.intensity",
        config.extension.intensity,
        0.0,
        100.0,
    );
    check_range(&mut errors, "spatial.width", config.spatial.width, 0.0, 100.0);
    check_range(&mut errors, "spatial.depth", config.spatial.depth, 0.0, 100.0);
    check_range(&mut errors, "spatial.height", config.spatial.height, 0.0, 100.0);
    check_range(
        &mut errors,
        "output_gain_db",
        config.output_gain_db,
        OUTPUT_GAIN_RANGE_DB.0,
        OUTPUT_GAIN_RANGE_DB.1,
    );

    collect(errors)
}

/// Validate a native sample rate.
///
/// # Errors
///
/// [`ValidationError::UnsupportedSampleRate`] outside [`SAMPLE_RATE_RANGE`].
pub fn validate_sample_rate(native_rate: f32) -> ValidationResult<()> {
    if native_rate.is_finite()
        && native_rate >= SAMPLE_RATE_RANGE.0
        && native_rate <= SAMPLE_RATE_RANGE.1
    {
        Ok(())
    } else {
        Err(ValidationError::UnsupportedSampleRate(native_rate))
    }
}

/// Validate `config` for a source running at `native_rate`.
///
/// Runs [`validate_config`] first. The ceiling only has to fit below the
/// output Nyquist frequency while the extender is enabled.
///
/// # Errors
///
/// Any field error, [`ValidationError::UnsupportedSampleRate`], or
/// [`ValidationError::CeilingAboveNyquist`].
pub fn validate_for_rate(config: &Config, native_rate: f32) -> ValidationResult<()> {
    validate_config(config)?;
    validate_sample_rate(native_rate)?;

    let nyquist_hz = config.output_rate(native_rate) / 2.0;
    if config.extension.enabled && config.extension.ceiling_hz > nyquist_hz {
        return Err(ValidationError::CeilingAboveNyquist {
            ceiling_hz: config.extension.ceiling_hz,
            nyquist_hz,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TargetRate;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(validate_config(&Config::default()), Ok(()));
        assert_eq!(validate_for_rate(&Config::default(), 44100.0), Ok(()));
    }

    #[test]
    fn single_error_is_not_wrapped() {
        let mut config = Config::default();
        config.spatial.width = 150.0;
        assert_eq!(
            validate_config(&config),
            Err(ValidationError::OutOfRange {
                param: "spatial.width".to_string(),
                value: 150.0,
                min: 0.0,
                max: 100.0,
            })
        );
    }

    #[test]
    fn several_errors_are_collected() {
        let mut config = Config::default();
        config.spatial.depth = -1.0;
        config.extension.intensity = f32::NAN;
        match validate_config(&config) {
            Err(ValidationError::Multiple(errors)) => {
                assert_eq!(errors.len(), 2);
                assert!(errors.contains(&ValidationError::NonFinite {
                    param: "extension.intensity".to_string()
                }));
            }
            other => panic!("expected Multiple, got {other:?}"),
        }
    }

    #[test]
    fn ceiling_must_fit_output_nyquist() {
        let mut config = Config::default();
        config.extension.enabled = true;
        config.extension.ceiling_hz = 30000.0;
        assert!(matches!(
            validate_for_rate(&config, 48000.0),
            Err(ValidationError::CeilingAboveNyquist { nyquist_hz, .. }) if nyquist_hz == 24000.0
        ));

        config.target_rate = TargetRate::Double;
        assert_eq!(validate_for_rate(&config, 48000.0), Ok(()));
    }

    #[test]
    fn disabled_extension_skips_nyquist_check() {
        let mut config = Config::default();
        config.extension.ceiling_hz = 30000.0;
        assert_eq!(validate_for_rate(&config, 48000.0), Ok(()));
    }

    #[test]
    fn sample_rate_bounds() {
        assert!(validate_sample_rate(48000.0).is_ok());
        assert!(validate_sample_rate(0.0).is_err());
        assert!(validate_sample_rate(f32::INFINITY).is_err());
        assert!(validate_sample_rate(384_000.0).is_err());
    }
}
