//! Error taxonomy for record operations.
//!
//! [`RecordError`] is the only error channel of this crate. There is no
//! ambient "last error" state: an operation either returns a value (possibly
//! a sentinel such as [`NULL_INTEGER`](crate::NULL_INTEGER)) or an `Err`.
//!
//! [`Status`] maps results onto the numeric codes of the installer API so
//! that the handle layer can report them unchanged.

use std::io;
use std::path::PathBuf;

use crate::field::FieldKind;

/// Numeric status codes of the installer API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Status {
    /// The call completed.
    Success = 0,
    /// The record handle does not resolve to a live record.
    InvalidHandle = 6,
    /// An index is out of range or a required argument is missing.
    InvalidParameter = 87,
    /// The caller's buffer is too small; the required size was reported.
    MoreData = 234,
    /// The source backing a stream field failed.
    FunctionFailed = 1627,
    /// The operation does not apply to the stored field variant.
    InvalidDataType = 1804,
}

impl Status {
    /// Returns the raw numeric code.
    #[must_use]
    pub fn code(self) -> u32 {
        self as u32
    }
}

/// Errors returned by record operations.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// The record reference does not resolve.
    #[error("invalid record handle")]
    InvalidHandle,
    /// Index outside `[0, field_count]`, a missing required argument, or a
    /// stream aimed at field 0.
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// Which rule the call violated.
        reason: &'static str,
    },
    /// A stream source could not be opened.
    #[error("cannot open stream source {}", path.display())]
    SourceOpen {
        /// Path that was passed to `set_stream`.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The stored field variant does not support the operation.
    #[error("field {index} holds {found}, which does not support this operation")]
    InvalidDataType {
        /// Index of the offending field.
        index: i32,
        /// Variant currently stored there.
        found: FieldKind,
    },
    /// Reading from an attached stream source failed.
    #[error("stream source I/O failed: {0}")]
    Io(#[from] io::Error),
}

impl RecordError {
    pub(crate) fn invalid_argument(reason: &'static str) -> Self {
        Self::InvalidArgument { reason }
    }

    /// Maps the error onto the installer API status code.
    #[must_use]
    pub fn status(&self) -> Status {
        match self {
            Self::InvalidHandle => Status::InvalidHandle,
            Self::InvalidArgument { .. } | Self::SourceOpen { .. } => Status::InvalidParameter,
            Self::InvalidDataType { .. } => Status::InvalidDataType,
            Self::Io(_) => Status::FunctionFailed,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = RecordError> = std::result::Result<T, E>;
