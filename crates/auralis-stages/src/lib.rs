//! Auralis Stages - the processing stages of the signal chain
//!
//! Every stage implements [`Stage`] and is driven block by block by the
//! engine's pipeline, in this order:
//!
//! | Stage | Type | Purpose |
//! |-------|------|---------|
//! | Interpolation | [`Interpolator`] | Linear / windowed-sinc oversampling against retained history |
//! | Extender | [`BandwidthExtender`] | FFT band replication or harmonic exciter above the codec cutoff |
//! | Spatial | [`SpatialVirtualizer`] | ITD/ILD, crossfeed, reflections, 7.1 downmix, pinna cue |
//!
//! Stages are built once per connection from a [`StageContext`], receive
//! every new [`Config`](auralis_config::Config) through
//! [`Stage::configure`], and never allocate after construction.
//!
//! # Example
//!
//! ```rust
//! use auralis_config::{Config, SpatialMode};
//! use auralis_core::AudioBlock;
//! use auralis_stages::{SpatialVirtualizer, Stage, StageContext};
//!
//! let mut config = Config::default();
//! config.spatial.mode = SpatialMode::StereoWide;
//!
//! let mut stage = SpatialVirtualizer::new(&StageContext::new(48000.0, 2)).unwrap();
//! stage.configure(&config);
//!
//! let input = AudioBlock::new(2);
//! let mut output = AudioBlock::new(2);
//! stage.process(&input, &mut output);
//! assert_eq!(output.channels(), 2);
//! ```

pub mod extender;
pub mod interpolation;
pub mod spatial;
pub mod stage;

pub use extender::BandwidthExtender;
pub use extender::spectral::{FFT_SIZE, FFT_SIZE_LOW_LATENCY, spectral_frame_len};
pub use interpolation::{Interpolator, interpolation_half_width};
pub use spatial::{SpatialVirtualizer, spatial_latency_samples};
pub use stage::{Stage, StageContext, StageError, StageKind};
