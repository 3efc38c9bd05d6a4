//! `msirecord` Handles: generational handle table and the handle-level record API.

pub mod api;
pub mod config;
pub mod handle;
pub mod logging;

pub use api::{RecordApi, INVALID_FIELD_COUNT};
pub use config::HandleTableConfig;
pub use handle::{HandleTable, RecordHandle, SharedRecord};
