//! The fixed-arity record.
//!
//! A [`Record`] holds `field_count + 1` [`Field`] slots. Slot 0 is the
//! record-level label and is always present; slots `1..=field_count` carry
//! the data. The field count never changes after creation.
//!
//! Read accessors are permissive: an out-of-range index reads as null and
//! integer reads degrade to [`NULL_INTEGER`]. Mutators reject an index
//! outside `[0, field_count]` with [`RecordError::InvalidArgument`].

use std::path::Path;

use tracing::{debug, trace, warn};

use crate::error::{RecordError, Result};
use crate::field::{Field, FieldKind, FieldValue, INTEGER_DATA_SIZE, NULL_INTEGER};
use crate::negotiate::{negotiate_copy, negotiate_empty, CodeUnit, Transfer};
use crate::snapshot::{FieldSnapshot, RecordSnapshot};
use crate::source::{ByteSource, FileSource};

/// Largest field count a record may be created with.
pub const MAX_FIELD_COUNT: i32 = 65_535;

/// [`MAX_FIELD_COUNT`] as a slot count.
const MAX_FIELDS: usize = 65_535;

/// A fixed-size tuple of typed fields addressed by index, with a label slot at 0.
#[derive(Debug)]
pub struct Record {
    fields: Vec<Field>,
}

impl Record {
    /// Creates a record with `count` data fields, all null.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidArgument`] if `count` is negative or
    /// exceeds [`MAX_FIELD_COUNT`].
    pub fn new(count: i32) -> Result<Self> {
        let Some(count) = usize::try_from(count)
            .ok()
            .filter(|&c| c <= MAX_FIELDS)
        else {
            debug!(count, "rejected record field count");
            return Err(RecordError::invalid_argument("field count out of range"));
        };
        let mut fields = Vec::with_capacity(count + 1);
        fields.resize_with(count + 1, Field::default);
        Ok(Self { fields })
    }

    /// Builds a populated record, e.g. a result row handed over by a query layer.
    ///
    /// `label` goes to field 0 and `values` to fields `1..=n`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidArgument`] if `label` is a stream or
    /// there are more than [`MAX_FIELD_COUNT`] values.
    pub fn from_values(
        label: FieldValue,
        values: impl IntoIterator<Item = FieldValue>,
    ) -> Result<Self> {
        if matches!(label, FieldValue::Stream(_)) {
            return Err(RecordError::invalid_argument("field 0 cannot hold a stream"));
        }
        let mut fields = vec![Field::from(label)];
        fields.extend(values.into_iter().map(Field::from));
        if fields.len() - 1 > MAX_FIELDS {
            return Err(RecordError::invalid_argument("field count out of range"));
        }
        Ok(Self { fields })
    }

    /// Number of data fields, not counting the label slot.
    #[must_use]
    pub fn field_count(&self) -> u32 {
        // At most MAX_FIELD_COUNT.
        #[allow(clippy::cast_possible_truncation)]
        let count = (self.fields.len() - 1) as u32;
        count
    }

    fn slot(index: i32, len: usize) -> Option<usize> {
        usize::try_from(index).ok().filter(|&i| i < len)
    }

    fn field(&self, index: i32) -> Option<&Field> {
        Self::slot(index, self.fields.len()).map(|i| &self.fields[i])
    }

    fn field_mut(&mut self, index: i32) -> Result<&mut Field> {
        Self::slot(index, self.fields.len())
            .map(|i| &mut self.fields[i])
            .ok_or_else(|| RecordError::invalid_argument("field index out of range"))
    }

    /// Variant stored at `index`, or `None` when out of range.
    #[must_use]
    pub fn field_kind(&self, index: i32) -> Option<FieldKind> {
        self.field(index).map(Field::kind)
    }

    /// Whether `index` reads as null. Out-of-range indices are null.
    #[must_use]
    pub fn is_null(&self, index: i32) -> bool {
        self.field(index).is_none_or(Field::is_null)
    }

    /// Integer value at `index`, coercing text strictly.
    ///
    /// Returns [`NULL_INTEGER`] for null, stream, unparsable text, or an
    /// out-of-range index.
    #[must_use]
    pub fn get_integer(&self, index: i32) -> i32 {
        self.field(index).map_or(NULL_INTEGER, Field::as_integer)
    }

    /// Stores an integer at `index`, replacing whatever was there.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidArgument`] for an index outside `[0, field_count]`.
    pub fn set_integer(&mut self, index: i32, value: i32) -> Result<()> {
        *self.field_mut(index)? = Field::Integer(value);
        Ok(())
    }

    /// Stores text at `index`. `None` and empty text both store null.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidArgument`] for an index outside `[0, field_count]`.
    pub fn set_string(&mut self, index: i32, value: Option<&str>) -> Result<()> {
        *self.field_mut(index)? = value.map_or(Field::Null, Field::text);
        Ok(())
    }

    /// Reads the field as text through the size negotiation protocol.
    ///
    /// `capacity` is the usable length of `buf` on input and the length of
    /// the value (excluding the terminator) on output. Integers are
    /// formatted in decimal. Null and out-of-range fields read as empty.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidDataType`] if the field holds a stream.
    pub fn get_string<C: CodeUnit>(
        &self,
        index: i32,
        buf: Option<&mut [C]>,
        capacity: &mut usize,
    ) -> Result<Transfer> {
        match self.field(index) {
            None | Some(Field::Null) => Ok(negotiate_empty(buf, capacity)),
            Some(Field::Integer(value)) => {
                let text = value.to_string();
                Ok(negotiate_copy(&C::encode(&text), buf, capacity))
            }
            Some(Field::Text(text)) => Ok(negotiate_copy(&C::encode(text), buf, capacity)),
            Some(field @ Field::Stream { .. }) => Err(RecordError::InvalidDataType {
                index,
                found: field.kind(),
            }),
        }
    }

    /// Narrow (UTF-8) form of [`Record::get_string`].
    ///
    /// # Errors
    ///
    /// See [`Record::get_string`].
    pub fn get_string_a(
        &self,
        index: i32,
        buf: Option<&mut [u8]>,
        capacity: &mut usize,
    ) -> Result<Transfer> {
        self.get_string(index, buf, capacity)
    }

    /// Wide (UTF-16) form of [`Record::get_string`].
    ///
    /// # Errors
    ///
    /// See [`Record::get_string`].
    pub fn get_string_w(
        &self,
        index: i32,
        buf: Option<&mut [u16]>,
        capacity: &mut usize,
    ) -> Result<Transfer> {
        self.get_string(index, buf, capacity)
    }

    /// Owned text view of a field: text as stored, integers in decimal.
    ///
    /// Returns `None` for null, stream, and out-of-range fields.
    #[must_use]
    pub fn string(&self, index: i32) -> Option<String> {
        match self.field(index)? {
            Field::Integer(value) => Some(value.to_string()),
            Field::Text(text) => Some(text.clone()),
            Field::Null | Field::Stream { .. } => None,
        }
    }

    /// Size of the field's data.
    ///
    /// 4 for integers, the UTF-8 byte length for text, and the bytes left
    /// after the cursor for streams. Null and out-of-range fields are 0.
    #[must_use]
    pub fn data_size(&self, index: i32) -> u32 {
        match self.field(index) {
            None | Some(Field::Null) => 0,
            Some(Field::Integer(_)) => INTEGER_DATA_SIZE,
            Some(Field::Text(text)) => u32::try_from(text.len()).unwrap_or(u32::MAX),
            Some(field @ Field::Stream { .. }) => field
                .stream_remaining()
                .map_or(0, |n| u32::try_from(n).unwrap_or(u32::MAX)),
        }
    }

    fn stream_slot(&mut self, index: i32) -> Result<&mut Field> {
        if index == 0 {
            return Err(RecordError::invalid_argument("field 0 cannot hold a stream"));
        }
        self.field_mut(index)
    }

    /// Attaches the file at `path` as a stream, or rewinds the current stream.
    ///
    /// With `Some(path)` the file is opened read-only and attached with its
    /// cursor at 0. With `None` the stream already stored at `index` is
    /// rewound to its start. Detaching is not supported: `None` on a field
    /// that holds no stream fails on every call instead of being a no-op.
    ///
    /// # Errors
    ///
    /// - [`RecordError::InvalidArgument`] if `index` is 0 or out of range.
    /// - [`RecordError::SourceOpen`] if the file cannot be opened.
    /// - [`RecordError::InvalidDataType`] for `None` on a non-stream field.
    pub fn set_stream(&mut self, index: i32, path: Option<&Path>) -> Result<()> {
        let slot = self.stream_slot(index)?;
        let Some(path) = path else {
            return match slot {
                Field::Stream { cursor, .. } => {
                    debug!(index, "rewound stream field");
                    *cursor = 0;
                    Ok(())
                }
                other => Err(RecordError::InvalidDataType {
                    index,
                    found: other.kind(),
                }),
            };
        };

        let source = FileSource::open(path).map_err(|source| {
            warn!(index, path = %path.display(), error = %source, "cannot open stream source");
            RecordError::SourceOpen {
                path: path.to_path_buf(),
                source,
            }
        })?;
        debug!(index, path = %path.display(), "attached file stream");
        *slot = Field::stream(Box::new(source));
        Ok(())
    }

    /// Attaches an already opened source as a stream with its cursor at 0.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidArgument`] if `index` is 0 or out of range.
    pub fn set_stream_source(&mut self, index: i32, source: Box<dyn ByteSource>) -> Result<()> {
        let slot = self.stream_slot(index)?;
        debug!(index, ?source, "attached stream source");
        *slot = Field::stream(source);
        Ok(())
    }

    /// Reads from the stream at `index`, resuming at its cursor.
    ///
    /// `size` is mandatory. Without a buffer it receives the number of bytes
    /// remaining and the cursor stays put. With a buffer, up to `*size` bytes
    /// are read, the cursor advances by the amount read, and `*size` receives
    /// that amount. Reading fewer bytes than requested, including none at the
    /// end of the stream, is not an error.
    ///
    /// # Errors
    ///
    /// - [`RecordError::InvalidArgument`] if `size` is `None` or `index` is out of range.
    /// - [`RecordError::InvalidDataType`] if the field is not a stream; `size` is left as is.
    /// - [`RecordError::Io`] if the source fails; the cursor is left as is.
    pub fn read_stream(
        &mut self,
        index: i32,
        buf: Option<&mut [u8]>,
        size: Option<&mut usize>,
    ) -> Result<()> {
        let Some(size) = size else {
            return Err(RecordError::invalid_argument("stream reads require a size"));
        };
        let (source, cursor) = match self.field_mut(index)? {
            Field::Stream { source, cursor } => (source, cursor),
            other => {
                return Err(RecordError::InvalidDataType {
                    index,
                    found: other.kind(),
                })
            }
        };

        let remaining = source.len()?.saturating_sub(*cursor);
        let remaining = usize::try_from(remaining).unwrap_or(usize::MAX);
        let Some(buf) = buf else {
            *size = remaining;
            return Ok(());
        };

        let want = (*size).min(buf.len()).min(remaining);
        let mut read = 0;
        while read < want {
            let n = source.read_at(*cursor + read as u64, &mut buf[read..want])?;
            if n == 0 {
                break;
            }
            read += n;
        }
        trace!(index, cursor = *cursor, requested = *size, read, "read stream");
        *cursor += read as u64;
        *size = read;
        Ok(())
    }

    /// Resets every field, including the label slot, to null.
    pub fn clear_data(&mut self) {
        for field in &mut self.fields {
            *field = Field::Null;
        }
    }

    /// Captures the current contents in a serializable form.
    #[must_use]
    pub fn snapshot(&self) -> RecordSnapshot {
        RecordSnapshot {
            field_count: self.field_count(),
            fields: self.fields.iter().map(FieldSnapshot::from).collect(),
        }
    }
}
