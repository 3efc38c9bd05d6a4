//! Handle-level record API.
//!
//! [`RecordApi`] exposes the installer API's record calls over a
//! [`HandleTable`]. Each call resolves the handle first; what happens when it
//! does not resolve differs per call and is part of the contract:
//!
//! | Call | Unresolved handle |
//! |------|-------------------|
//! | `field_count` | [`INVALID_FIELD_COUNT`] |
//! | `is_null` | `false` |
//! | `get_integer` | [`NULL_INTEGER`] |
//! | `data_size` | `0` |
//! | everything else | [`RecordError::InvalidHandle`] |

use std::path::Path;

use msirecord_core::{
    Record, RecordError, RecordSnapshot, Result, Transfer, NULL_INTEGER,
};

use crate::config::HandleTableConfig;
use crate::handle::{HandleTable, RecordHandle};

/// Field count reported for a handle that does not resolve (all bits set).
pub const INVALID_FIELD_COUNT: u32 = u32::MAX;

/// The record calls of the installer API, addressed by handle.
#[derive(Default)]
pub struct RecordApi {
    handles: HandleTable,
}

impl RecordApi {
    #[must_use]
    pub fn new(config: HandleTableConfig) -> Self {
        Self {
            handles: HandleTable::new(config),
        }
    }

    /// The underlying handle table.
    #[must_use]
    pub fn handles(&self) -> &HandleTable {
        &self.handles
    }

    fn with<R>(&self, handle: RecordHandle, f: impl FnOnce(&mut Record) -> Result<R>) -> Result<R> {
        self.handles
            .with_record(handle, f)
            .unwrap_or(Err(RecordError::InvalidHandle))
    }

    /// Creates a record with `count` data fields.
    ///
    /// Returns `None` if `count` is out of range or the table is full.
    pub fn create_record(&self, count: i32) -> Option<RecordHandle> {
        let record = Record::new(count).ok()?;
        self.handles.insert(record)
    }

    /// Hands a record built elsewhere (e.g. a query result row) to the table.
    pub fn insert_record(&self, record: Record) -> Option<RecordHandle> {
        self.handles.insert(record)
    }

    /// Number of data fields, or [`INVALID_FIELD_COUNT`].
    #[must_use]
    pub fn field_count(&self, handle: RecordHandle) -> u32 {
        self.handles
            .with_record(handle, |r| r.field_count())
            .unwrap_or(INVALID_FIELD_COUNT)
    }

    /// Whether the field reads as null; `false` for an unresolved handle.
    #[must_use]
    pub fn is_null(&self, handle: RecordHandle, index: i32) -> bool {
        self.handles
            .with_record(handle, |r| r.is_null(index))
            .unwrap_or(false)
    }

    #[must_use]
    pub fn get_integer(&self, handle: RecordHandle, index: i32) -> i32 {
        self.handles
            .with_record(handle, |r| r.get_integer(index))
            .unwrap_or(NULL_INTEGER)
    }

    /// # Errors
    ///
    /// [`RecordError::InvalidHandle`] regardless of `index` when the handle
    /// does not resolve, otherwise as [`Record::set_integer`].
    pub fn set_integer(&self, handle: RecordHandle, index: i32, value: i32) -> Result<()> {
        self.with(handle, |r| r.set_integer(index, value))
    }

    /// # Errors
    ///
    /// As [`RecordApi::set_integer`].
    pub fn set_string(&self, handle: RecordHandle, index: i32, value: Option<&str>) -> Result<()> {
        self.with(handle, |r| r.set_string(index, value))
    }

    /// Narrow text read with size negotiation.
    ///
    /// # Errors
    ///
    /// [`RecordError::InvalidHandle`], otherwise as [`Record::get_string`].
    pub fn get_string_a(
        &self,
        handle: RecordHandle,
        index: i32,
        buf: Option<&mut [u8]>,
        capacity: &mut usize,
    ) -> Result<Transfer> {
        self.with(handle, |r| r.get_string_a(index, buf, capacity))
    }

    /// Wide text read with size negotiation.
    ///
    /// # Errors
    ///
    /// [`RecordError::InvalidHandle`], otherwise as [`Record::get_string`].
    pub fn get_string_w(
        &self,
        handle: RecordHandle,
        index: i32,
        buf: Option<&mut [u16]>,
        capacity: &mut usize,
    ) -> Result<Transfer> {
        self.with(handle, |r| r.get_string_w(index, buf, capacity))
    }

    /// Data size of the field; 0 for an unresolved handle.
    #[must_use]
    pub fn data_size(&self, handle: RecordHandle, index: i32) -> u32 {
        self.handles
            .with_record(handle, |r| r.data_size(index))
            .unwrap_or(0)
    }

    /// # Errors
    ///
    /// [`RecordError::InvalidHandle`], otherwise as [`Record::set_stream`].
    pub fn set_stream(&self, handle: RecordHandle, index: i32, path: Option<&Path>) -> Result<()> {
        self.with(handle, |r| r.set_stream(index, path))
    }

    /// # Errors
    ///
    /// [`RecordError::InvalidHandle`], otherwise as [`Record::read_stream`].
    pub fn read_stream(
        &self,
        handle: RecordHandle,
        index: i32,
        buf: Option<&mut [u8]>,
        size: Option<&mut usize>,
    ) -> Result<()> {
        self.with(handle, |r| r.read_stream(index, buf, size))
    }

    /// Resets every field of the record to null.
    ///
    /// # Errors
    ///
    /// [`RecordError::InvalidHandle`] if the handle does not resolve.
    pub fn clear_data(&self, handle: RecordHandle) -> Result<()> {
        self.with(handle, |r| {
            r.clear_data();
            Ok(())
        })
    }

    /// # Errors
    ///
    /// [`RecordError::InvalidHandle`] if the handle does not resolve.
    pub fn snapshot(&self, handle: RecordHandle) -> Result<RecordSnapshot> {
        self.with(handle, |r| Ok(r.snapshot()))
    }

    /// # Errors
    ///
    /// [`RecordError::InvalidHandle`] if the handle does not resolve.
    pub fn close_handle(&self, handle: RecordHandle) -> Result<()> {
        self.handles.close(handle)
    }

    /// Closes every open record and returns how many there were.
    pub fn close_all_handles(&self) -> usize {
        self.handles.close_all()
    }
}
