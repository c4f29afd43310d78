//! Fixed-capacity multichannel circular buffer.
//!
//! [`RingBuffer`] is the history store behind every stage that looks back in
//! time. Positions are absolute frame counts (`u64`), so a reader can always
//! tell how far it trails the writer:
//!
//! - the write cursor advances by exactly the number of frames written;
//! - a [`ReadCursor`] is valid while `write_position - cursor <= capacity`.
//!
//! Reading further back than `capacity` would return data that has already
//! been overwritten; [`RingBuffer::read_frame`] reports that as
//! [`RingError::Overrun`] instead of returning stale samples.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use core::fmt;

use crate::block::{AudioBlock, BLOCK_SIZE};

/// Error returned by cursor reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingError {
    /// The cursor trails the writer by more than the capacity.
    Overrun {
        /// Frames between cursor and write position.
        lag: u64,
        /// Buffer capacity in frames.
        capacity: usize,
    },
    /// The cursor has caught up with the writer; nothing to read.
    Empty,
}

impl fmt::Display for RingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RingError::Overrun { lag, capacity } => {
                write!(f, "read cursor lags writer by {lag} frames (capacity {capacity})")
            }
            RingError::Empty => f.write_str("no unread frames"),
        }
    }
}

impl core::error::Error for RingError {}

/// Absolute read position into a [`RingBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadCursor {
    position: u64,
}

impl ReadCursor {
    /// Absolute frame index of the next frame to read.
    pub fn position(&self) -> u64 {
        self.position
    }
}

/// Planar circular store, `capacity` frames per channel.
///
/// Allocates once in [`new`](Self::new); every other method is allocation-free.
#[derive(Debug, Clone)]
pub struct RingBuffer {
    data: Vec<f32>,
    channels: usize,
    capacity: usize,
    written: u64,
}

impl RingBuffer {
    /// Creates a zeroed ring.
    ///
    /// # Panics
    ///
    /// Panics if `channels` or `capacity` is zero.
    pub fn new(channels: usize, capacity: usize) -> Self {
        assert!(channels > 0, "RingBuffer needs at least one channel");
        assert!(capacity > 0, "RingBuffer capacity must be > 0");
        #[cfg(feature = "tracing")]
        tracing::debug!("ring_new: {channels} ch x {capacity} frames");
        Self {
            data: vec![0.0; channels * capacity],
            channels,
            capacity,
            written: 0,
        }
    }

    /// Channel count.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Frames retained per channel.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total frames written since creation or the last [`clear`](Self::clear).
    pub fn write_position(&self) -> u64 {
        self.written
    }

    #[inline]
    fn slot(&self, channel: usize, position: u64) -> usize {
        channel * self.capacity + (position % self.capacity as u64) as usize
    }

    /// Appends one sample to a single-channel ring.
    #[inline]
    pub fn push(&mut self, sample: f32) {
        debug_assert_eq!(self.channels, 1, "push() is for mono rings");
        let idx = self.slot(0, self.written);
        self.data[idx] = sample;
        self.written += 1;
    }

    /// Appends one frame; `frame[ch]` goes to channel `ch`.
    ///
    /// Missing channels are written as zero, extra values are ignored.
    pub fn push_frame(&mut self, frame: &[f32]) {
        for ch in 0..self.channels {
            let idx = self.slot(ch, self.written);
            self.data[idx] = frame.get(ch).copied().unwrap_or(0.0);
        }
        self.written += 1;
    }

    /// Appends a whole block (`BLOCK_SIZE` frames).
    ///
    /// Block channels beyond the ring's channel count are dropped; ring
    /// channels the block does not carry are written as zero.
    pub fn write_block(&mut self, block: &AudioBlock) {
        for ch in 0..self.channels {
            let base = ch * self.capacity;
            let src = (ch < block.channels()).then(|| block.channel(ch));
            for i in 0..BLOCK_SIZE {
                let pos = ((self.written + i as u64) % self.capacity as u64) as usize;
                self.data[base + pos] = src.map_or(0.0, |row| row[i]);
            }
        }
        self.written += BLOCK_SIZE as u64;
    }

    /// Sample written `delay` frames before the most recent one
    /// (`delay == 0` is the latest). Frames never written read as zero.
    ///
    /// `delay` must be below `capacity`.
    #[inline]
    pub fn delayed(&self, channel: usize, delay: usize) -> f32 {
        debug_assert!(delay < self.capacity, "delay {delay} exceeds ring capacity");
        let delay = delay as u64;
        if delay >= self.written {
            return 0.0;
        }
        self.data[self.slot(channel, self.written - 1 - delay)]
    }

    /// Copies the most recent `dst.len()` frames of `channel`, oldest first.
    ///
    /// Frames that were never written are returned as zero.
    ///
    /// # Panics
    ///
    /// Panics if `dst.len()` exceeds the capacity.
    pub fn copy_latest(&self, channel: usize, dst: &mut [f32]) {
        assert!(dst.len() <= self.capacity, "copy_latest longer than capacity");
        let n = dst.len() as u64;
        for (i, out) in dst.iter_mut().enumerate() {
            // absolute position of this frame = written - n + i
            let back = n - i as u64;
            *out = if back > self.written {
                0.0
            } else {
                self.data[self.slot(channel, self.written - back)]
            };
        }
    }

    /// A cursor positioned at the current write position (nothing unread).
    pub fn reader(&self) -> ReadCursor {
        ReadCursor {
            position: self.written,
        }
    }

    /// A cursor positioned `lag` frames behind the writer.
    pub fn reader_behind(&self, lag: usize) -> ReadCursor {
        ReadCursor {
            position: self.written.saturating_sub(lag as u64),
        }
    }

    /// Frames between `cursor` and the write position.
    pub fn lag(&self, cursor: &ReadCursor) -> u64 {
        self.written.saturating_sub(cursor.position)
    }

    /// Reads one frame at `cursor` into `dst` and advances the cursor.
    ///
    /// # Errors
    ///
    /// [`RingError::Empty`] if the cursor has caught up with the writer,
    /// [`RingError::Overrun`] if the frame has already been overwritten. The
    /// cursor is left untouched on error.
    pub fn read_frame(&self, cursor: &mut ReadCursor, dst: &mut [f32]) -> Result<(), RingError> {
        let lag = self.lag(cursor);
        if lag == 0 {
            return Err(RingError::Empty);
        }
        if lag > self.capacity as u64 {
            return Err(RingError::Overrun {
                lag,
                capacity: self.capacity,
            });
        }
        for (ch, out) in dst.iter_mut().enumerate().take(self.channels) {
            *out = self.data[self.slot(ch, cursor.position)];
        }
        cursor.position += 1;
        Ok(())
    }

    /// Zeroes the storage and rewinds the write cursor.
    pub fn clear(&mut self) {
        self.data.fill(0.0);
        self.written = 0;
    }

    /// True when every stored sample is zero.
    pub fn is_silent(&self) -> bool {
        self.data.iter().all(|&s| s == 0.0)
    }
}
