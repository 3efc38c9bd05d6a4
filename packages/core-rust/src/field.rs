//! Field storage for records.
//!
//! A record slot is a [`Field`]: exactly one of null, a 32-bit integer, a
//! text value, or an attached byte stream with its own read cursor. Text to
//! integer coercion follows [`parse_strict_integer`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::source::ByteSource;

/// Sentinel returned by integer reads when a field holds no integer value.
///
/// One above `i32::MIN`, not the minimum itself.
pub const NULL_INTEGER: i32 = i32::MIN + 1;

/// Size reported by `data_size` for an integer field.
pub const INTEGER_DATA_SIZE: u32 = 4;

/// Discriminant of a [`Field`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    Null,
    Integer,
    Text,
    Stream,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "null",
            Self::Integer => "integer",
            Self::Text => "text",
            Self::Stream => "stream",
        };
        f.write_str(name)
    }
}

/// One typed slot of a record.
#[derive(Debug, Default)]
pub enum Field {
    /// No value. The state of every slot after creation or `clear_data`.
    #[default]
    Null,
    /// Exact 32-bit signed value.
    Integer(i32),
    /// Non-empty text. Empty text is stored as [`Field::Null`].
    Text(String),
    /// An open byte source and the position of the next read.
    Stream {
        /// Source the bytes are read from. Dropped with the field.
        source: Box<dyn ByteSource>,
        /// Offset of the next byte to read.
        cursor: u64,
    },
}

impl Field {
    /// Builds a text field, collapsing empty text to `Null`.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            Self::Null
        } else {
            Self::Text(value)
        }
    }

    /// Builds a stream field positioned at the start of `source`.
    #[must_use]
    pub fn stream(source: Box<dyn ByteSource>) -> Self {
        Self::Stream { source, cursor: 0 }
    }

    #[must_use]
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Null => FieldKind::Null,
            Self::Integer(_) => FieldKind::Integer,
            Self::Text(_) => FieldKind::Text,
            Self::Stream { .. } => FieldKind::Stream,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Integer view of the field, or [`NULL_INTEGER`].
    #[must_use]
    pub fn as_integer(&self) -> i32 {
        match self {
            Self::Integer(value) => *value,
            Self::Text(text) => parse_strict_integer(text).unwrap_or(NULL_INTEGER),
            Self::Null | Self::Stream { .. } => NULL_INTEGER,
        }
    }

    /// Bytes left between the cursor and the end of the source.
    ///
    /// Returns `None` for non-stream fields. A source that cannot report its
    /// length counts as empty.
    #[must_use]
    pub fn stream_remaining(&self) -> Option<u64> {
        match self {
            Self::Stream { source, cursor } => {
                let len = source.len().unwrap_or(0);
                Some(len.saturating_sub(*cursor))
            }
            _ => None,
        }
    }
}

/// Owned value used to populate a record in one step.
///
/// This is the shape in which a query layer hands over a result row.
#[derive(Debug)]
pub enum FieldValue {
    Null,
    Integer(i32),
    Text(String),
    Stream(Box<dyn ByteSource>),
}

impl From<FieldValue> for Field {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Null => Field::Null,
            FieldValue::Integer(v) => Field::Integer(v),
            FieldValue::Text(text) => Field::text(text),
            FieldValue::Stream(source) => Field::stream(source),
        }
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Integer(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Parses text as an integer the way records coerce text fields.
///
/// Accepts an optional single leading `-` followed by one or more ASCII
/// digits and nothing else. Digits accumulate with 32-bit wraparound, so
/// over-long literals wrap instead of saturating or failing.
#[must_use]
pub fn parse_strict_integer(text: &str) -> Option<i32> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let magnitude = digits.bytes().fold(0i32, |acc, b| {
        acc.wrapping_mul(10).wrapping_add(i32::from(b - b'0'))
    });
    Some(if negative {
        magnitude.wrapping_neg()
    } else {
        magnitude
    })
}
