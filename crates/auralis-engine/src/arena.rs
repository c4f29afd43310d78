//! Connection records indexed by generational handles.
//!
//! Each connect stores a [`ConnectionRecord`] in a slot and returns a
//! [`ConnectionHandle`] naming the slot and its generation. Removing the
//! record bumps the generation, so a handle kept past its disconnect never
//! resolves to a later connection that reused the slot.

use crate::source::SourceId;

/// Opaque binding between one source and the chain built for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionHandle {
    index: u32,
    generation: u32,
}

impl ConnectionHandle {
    /// Slot index inside the arena.
    #[inline]
    pub fn index(self) -> u32 {
        self.index
    }

    /// Generation of the slot when the handle was issued.
    #[inline]
    pub fn generation(self) -> u32 {
        self.generation
    }
}

/// What the engine knows about a connected source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectionRecord {
    /// Identity of the bound source.
    pub source: SourceId,
    /// Native rate of the source in Hz.
    pub native_rate: f32,
    /// Channels per block.
    pub channels: usize,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    record: Option<ConnectionRecord>,
}

/// Slot storage for live connections.
#[derive(Debug, Clone, Default)]
pub struct ConnectionArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl ConnectionArena {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a record and returns its handle.
    pub fn insert(&mut self, record: ConnectionRecord) -> ConnectionHandle {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.record = Some(record);
            ConnectionHandle {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                record: Some(record),
            });
            ConnectionHandle {
                index,
                generation: 0,
            }
        }
    }

    /// Looks up a live record.
    pub fn get(&self, handle: ConnectionHandle) -> Option<&ConnectionRecord> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.record.as_ref())
    }

    /// Removes a record, invalidating every handle to it.
    ///
    /// Returns `None` if the handle was already stale.
    pub fn remove(&mut self, handle: ConnectionHandle) -> Option<ConnectionRecord> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let record = slot.record.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        Some(record)
    }

    /// Handle of the live connection bound to `source`, if any.
    pub fn find(&self, source: SourceId) -> Option<ConnectionHandle> {
        self.slots.iter().enumerate().find_map(|(index, slot)| {
            slot.record
                .filter(|record| record.source == source)
                .map(|_| ConnectionHandle {
                    index: index as u32,
                    generation: slot.generation,
                })
        })
    }

    /// Number of live connections.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.record.is_some()).count()
    }

    /// True when no connection is live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
