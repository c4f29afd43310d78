//! Auralis Core - DSP primitives for the real-time signal chain
//!
//! This crate provides the allocation-free building blocks that every
//! processing stage of the auralis engine is assembled from. Nothing here
//! performs I/O, locks, or allocates after construction.
//!
//! # Blocks
//!
//! - [`AudioBlock`] - Fixed-length planar multichannel block ([`BLOCK_SIZE`] frames)
//!
//! # Filters
//!
//! - [`Biquad`] - Second-order IIR filter with RBJ cookbook coefficients
//! - [`OnePole`] - First-order lowpass (and complementary highpass)
//! - [`EnvelopeFollower`] - Peak envelope with separate attack/release
//!
//! # History
//!
//! - [`RingBuffer`] - Fixed-capacity multichannel circular store with read cursors
//! - [`FractionalDelay`] - Mono delay line with linearly interpolated taps
//! - [`SincTable`] - Precomputed Lanczos-windowed sinc kernel
//!
//! # no_std Support
//!
//! Disable the default `std` feature to build for embedded targets; heap
//! storage then comes from `alloc`.
//!
//! ```toml
//! [dependencies]
//! auralis-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use auralis_core::{Biquad, AudioBlock};
//!
//! let mut lp = Biquad::lowpass(700.0, 0.707, 48000.0);
//! let mut block = AudioBlock::new(2);
//! block.channel_mut(0)[0] = 1.0;
//! for sample in block.channel_mut(0).iter_mut() {
//!     *sample = lp.process(*sample);
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod biquad;
pub mod block;
pub mod delay;
pub mod envelope;
pub mod math;
pub mod one_pole;
pub mod ring;
pub mod sinc;

pub use biquad::{Biquad, BiquadCoefficients};
pub use block::{AudioBlock, BLOCK_SIZE, MAX_CHANNELS};
pub use delay::FractionalDelay;
pub use envelope::EnvelopeFollower;
pub use math::{
    db_to_linear, flush_denormal, hard_clip, lerp, linear_to_db, mid_side, mono_sum,
    ms_to_samples, samples_to_ms, soft_clip,
};
pub use one_pole::OnePole;
pub use ring::{ReadCursor, RingBuffer, RingError};
pub use sinc::{SINC_RESOLUTION, SincTable};
