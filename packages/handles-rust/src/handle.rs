//! Generational handle table for records.
//!
//! Maps opaque [`RecordHandle`]s to live records. Slots are reused after a
//! handle is closed, but each reuse bumps the slot's generation, so a stale
//! handle never resolves to the record that replaced it.
//!
//! Each record sits behind its own [`Mutex`], which serializes operations on
//! the same record. The table lock is released before a record lock is taken,
//! and never held during stream I/O.

use std::fmt;
use std::sync::Arc;

use msirecord_core::{Record, RecordError};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::config::HandleTableConfig;

/// A record shared between the table and in-flight operations.
pub type SharedRecord = Arc<Mutex<Record>>;

/// Opaque reference to a record in a [`HandleTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordHandle {
    index: u32,
    generation: u32,
}

impl RecordHandle {
    /// A handle that never resolves.
    pub const NULL: Self = Self {
        index: 0,
        generation: 0,
    };

    /// Packs the handle into a single integer. [`RecordHandle::NULL`] packs to 0.
    #[must_use]
    pub fn to_raw(self) -> u64 {
        (u64::from(self.generation) << 32) | u64::from(self.index)
    }

    /// Unpacks a handle produced by [`RecordHandle::to_raw`].
    #[must_use]
    pub fn from_raw(raw: u64) -> Self {
        // Low and high halves by construction.
        #[allow(clippy::cast_possible_truncation)]
        let (index, generation) = (raw as u32, (raw >> 32) as u32);
        Self { index, generation }
    }

    #[must_use]
    pub fn is_null(self) -> bool {
        self == Self::NULL
    }
}

impl fmt::Display for RecordHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.index, self.generation)
    }
}

#[derive(Debug)]
struct Slot {
    /// Starts at 1, so no live slot ever matches [`RecordHandle::NULL`].
    generation: u32,
    record: Option<SharedRecord>,
}

#[derive(Debug, Default)]
struct Slots {
    entries: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

/// Arena of records addressed by generational handles.
pub struct HandleTable {
    config: HandleTableConfig,
    slots: RwLock<Slots>,
}

impl HandleTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new(config: HandleTableConfig) -> Self {
        let slots = Slots {
            entries: Vec::with_capacity(config.initial_capacity),
            ..Slots::default()
        };
        Self {
            config,
            slots: RwLock::new(slots),
        }
    }

    /// Stores `record` and returns its handle.
    ///
    /// Returns `None` when the table already holds `max_handles` records.
    pub fn insert(&self, record: Record) -> Option<RecordHandle> {
        let mut slots = self.slots.write();
        if slots.live >= self.config.max_handles {
            warn!(max_handles = self.config.max_handles, "handle table is full");
            return None;
        }
        let shared = Arc::new(Mutex::new(record));

        let handle = if let Some(index) = slots.free.pop() {
            let slot = &mut slots.entries[index as usize];
            slot.record = Some(shared);
            RecordHandle {
                index,
                generation: slot.generation,
            }
        } else {
            let Ok(index) = u32::try_from(slots.entries.len()) else {
                warn!("handle index space exhausted");
                return None;
            };
            slots.entries.push(Slot {
                generation: 1,
                record: Some(shared),
            });
            RecordHandle {
                index,
                generation: 1,
            }
        };
        slots.live += 1;
        debug!(%handle, "opened record handle");
        Some(handle)
    }

    /// Looks up the record behind `handle`.
    #[must_use]
    pub fn resolve(&self, handle: RecordHandle) -> Option<SharedRecord> {
        let slots = self.slots.read();
        let slot = slots.entries.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.record.clone()
    }

    /// Runs `f` on the record behind `handle` with the record locked.
    ///
    /// Returns `None` if the handle does not resolve.
    pub fn with_record<R>(&self, handle: RecordHandle, f: impl FnOnce(&mut Record) -> R) -> Option<R> {
        let shared = self.resolve(handle)?;
        let mut record = shared.lock();
        Some(f(&mut record))
    }

    /// Releases the record behind `handle`.
    ///
    /// The record itself, and any stream it holds, is dropped once the last
    /// in-flight operation on it finishes.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidHandle`] if `handle` does not resolve.
    pub fn close(&self, handle: RecordHandle) -> Result<(), RecordError> {
        let mut slots = self.slots.write();
        let Some(slot) = slots.entries.get_mut(handle.index as usize) else {
            return Err(RecordError::InvalidHandle);
        };
        if slot.generation != handle.generation || slot.record.is_none() {
            return Err(RecordError::InvalidHandle);
        }
        slot.record = None;
        slot.generation = slot.generation.wrapping_add(1).max(1);
        slots.free.push(handle.index);
        slots.live -= 1;
        debug!(%handle, "closed record handle");
        Ok(())
    }

    /// Releases every record and returns how many were open.
    pub fn close_all(&self) -> usize {
        let mut slots = self.slots.write();
        let mut closed = 0;
        let mut freed = Vec::new();
        for (index, slot) in slots.entries.iter_mut().enumerate() {
            if slot.record.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1).max(1);
                // Slot count never exceeds u32::MAX; see `insert`.
                #[allow(clippy::cast_possible_truncation)]
                let index = index as u32;
                freed.push(index);
                closed += 1;
            }
        }
        slots.free.extend(freed);
        slots.live = 0;
        debug!(closed, "closed all record handles");
        closed
    }

    /// Number of live handles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.read().live
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for HandleTable {
    fn default() -> Self {
        Self::new(HandleTableConfig::default())
    }
}
