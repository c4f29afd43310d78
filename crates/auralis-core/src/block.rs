//! Fixed-size multichannel audio block.
//!
//! An [`AudioBlock`] is the unit of work handed to every stage on each
//! callback. Storage is inline (no heap), planar, and sized for the largest
//! supported channel count, so moving blocks between stages never allocates.

/// Frames per channel in every block.
pub const BLOCK_SIZE: usize = 128;

/// Largest channel count a block can carry.
pub const MAX_CHANNELS: usize = 8;

/// Planar block of `BLOCK_SIZE` frames for up to `MAX_CHANNELS` channels.
///
/// Only the first [`channels()`](Self::channels) rows are meaningful; the
/// remaining rows are kept zeroed by [`set_channels`](Self::set_channels).
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBlock {
    channels: usize,
    data: [[f32; BLOCK_SIZE]; MAX_CHANNELS],
}

impl AudioBlock {
    /// Creates a silent block with the given channel count.
    ///
    /// The count is clamped to `1..=MAX_CHANNELS`.
    pub fn new(channels: usize) -> Self {
        Self {
            channels: channels.clamp(1, MAX_CHANNELS),
            data: [[0.0; BLOCK_SIZE]; MAX_CHANNELS],
        }
    }

    /// Builds a block by copying per-channel slices.
    ///
    /// Each slice contributes at most `BLOCK_SIZE` samples; shorter slices
    /// are zero-padded. Channels beyond `MAX_CHANNELS` are ignored.
    pub fn from_channels(channels: &[&[f32]]) -> Self {
        let mut block = Self::new(channels.len());
        for (dst, src) in block.data.iter_mut().zip(channels.iter()) {
            let n = src.len().min(BLOCK_SIZE);
            dst[..n].copy_from_slice(&src[..n]);
        }
        block
    }

    /// Builds a block from interleaved frames (`[L, R, L, R, ...]` for stereo).
    pub fn from_interleaved(samples: &[f32], channels: usize) -> Self {
        let mut block = Self::new(channels);
        let channels = block.channels;
        for (frame, chunk) in samples.chunks(channels).take(BLOCK_SIZE).enumerate() {
            for (ch, &s) in chunk.iter().enumerate() {
                block.data[ch][frame] = s;
            }
        }
        block
    }

    /// Writes the active channels interleaved into `out`.
    ///
    /// Writes `min(out.len() / channels, BLOCK_SIZE)` frames.
    pub fn write_interleaved(&self, out: &mut [f32]) {
        for (frame, chunk) in out.chunks_mut(self.channels).take(BLOCK_SIZE).enumerate() {
            for (ch, s) in chunk.iter_mut().enumerate() {
                *s = self.data[ch][frame];
            }
        }
    }

    /// Number of active channels.
    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Frames per channel (always [`BLOCK_SIZE`]).
    #[inline]
    pub const fn len(&self) -> usize {
        BLOCK_SIZE
    }

    /// Always false; blocks have a fixed non-zero length.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Changes the active channel count, zeroing rows that become inactive.
    pub fn set_channels(&mut self, channels: usize) {
        let channels = channels.clamp(1, MAX_CHANNELS);
        for row in self.data.iter_mut().skip(channels) {
            row.fill(0.0);
        }
        self.channels = channels;
    }

    /// Immutable access to one channel.
    ///
    /// # Panics
    ///
    /// Panics if `index >= MAX_CHANNELS`.
    #[inline]
    pub fn channel(&self, index: usize) -> &[f32; BLOCK_SIZE] {
        &self.data[index]
    }

    /// Mutable access to one channel.
    #[inline]
    pub fn channel_mut(&mut self, index: usize) -> &mut [f32; BLOCK_SIZE] {
        &mut self.data[index]
    }

    /// Mutable access to the first two channels at once.
    #[inline]
    pub fn stereo_mut(&mut self) -> (&mut [f32; BLOCK_SIZE], &mut [f32; BLOCK_SIZE]) {
        let (left, rest) = self.data.split_at_mut(1);
        (&mut left[0], &mut rest[0])
    }

    /// Iterates over the active channels.
    pub fn iter_channels(&self) -> impl Iterator<Item = &[f32; BLOCK_SIZE]> {
        self.data.iter().take(self.channels)
    }

    /// Copies channel count and samples from another block.
    pub fn copy_from(&mut self, other: &AudioBlock) {
        self.channels = other.channels;
        self.data = other.data;
    }

    /// Zeroes every sample, keeping the channel count.
    pub fn silence(&mut self) {
        for row in &mut self.data {
            row.fill(0.0);
        }
    }

    /// Largest absolute sample value across active channels.
    pub fn peak(&self) -> f32 {
        self.iter_channels()
            .flat_map(|row| row.iter())
            .fold(0.0f32, |acc, s| acc.max(s.abs()))
    }

    /// Folds the active channels down to stereo in `out`.
    ///
    /// Mono is duplicated and stereo copied unchanged. For wider layouts
    /// channels 2 and 3 (center, LFE) feed both sides at -3 dB and the
    /// remaining channels alternate left/right at -3 dB.
    pub fn fold_to_stereo(&self, out: &mut AudioBlock) {
        const SHARED: f32 = core::f32::consts::FRAC_1_SQRT_2;
        out.set_channels(2);
        match self.channels {
            1 => {
                out.data[0] = self.data[0];
                out.data[1] = self.data[0];
            }
            2 => {
                out.data[0] = self.data[0];
                out.data[1] = self.data[1];
            }
            n => {
                out.data[0] = self.data[0];
                out.data[1] = self.data[1];
                for ch in 2..n {
                    let both = ch < 4;
                    let src = self.data[ch];
                    for i in 0..BLOCK_SIZE {
                        let s = src[i] * SHARED;
                        if both || ch % 2 == 0 {
                            out.data[0][i] += s;
                        }
                        if both || ch % 2 == 1 {
                            out.data[1][i] += s;
                        }
                    }
                }
            }
        }
    }
}

impl Default for AudioBlock {
    fn default() -> Self {
        Self::new(2)
    }
}
