//! Serializable view of a record's contents.
//!
//! Streams are summarized by the number of bytes left to read; their content
//! is never copied into a snapshot.

use serde::{Deserialize, Serialize};

use crate::field::Field;

/// Contents of one field at snapshot time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FieldSnapshot {
    Null,
    Integer { value: i32 },
    Text { value: String },
    Stream { remaining: u64 },
}

impl From<&Field> for FieldSnapshot {
    fn from(field: &Field) -> Self {
        match field {
            Field::Null => Self::Null,
            Field::Integer(value) => Self::Integer { value: *value },
            Field::Text(text) => Self::Text {
                value: text.clone(),
            },
            Field::Stream { .. } => Self::Stream {
                remaining: field.stream_remaining().unwrap_or(0),
            },
        }
    }
}

/// All fields of a record, label slot first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSnapshot {
    /// Number of data fields, excluding the label slot.
    pub field_count: u32,
    /// `field_count + 1` entries; index 0 is the label slot.
    pub fields: Vec<FieldSnapshot>,
}

impl RecordSnapshot {
    /// The label slot (field 0), or `None` for a snapshot without fields.
    #[must_use]
    pub fn label(&self) -> Option<&FieldSnapshot> {
        self.fields.first()
    }

    /// Renders the snapshot as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;
    use crate::source::MemorySource;

    #[test]
    fn snapshot_reports_each_variant() {
        let mut record = Record::new(3).unwrap();
        record.set_string(0, Some("drone")).unwrap();
        record.set_integer(1, 7).unwrap();
        record
            .set_stream_source(2, Box::new(MemorySource::from_static(b"abc")))
            .unwrap();

        let snapshot = record.snapshot();
        assert_eq!(snapshot.field_count, 3);
        assert_eq!(
            snapshot.label(),
            Some(&FieldSnapshot::Text {
                value: "drone".to_string()
            })
        );
        assert_eq!(snapshot.fields[1], FieldSnapshot::Integer { value: 7 });
        assert_eq!(snapshot.fields[2], FieldSnapshot::Stream { remaining: 3 });
        assert_eq!(snapshot.fields[3], FieldSnapshot::Null);
    }

    #[test]
    fn snapshot_json_shape() {
        let mut record = Record::new(1).unwrap();
        record.set_integer(1, -5).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&record.snapshot().to_json().unwrap()).unwrap();
        assert_eq!(json["fieldCount"], 1);
        assert_eq!(json["fields"][0]["kind"], "null");
        assert_eq!(json["fields"][1]["kind"], "integer");
        assert_eq!(json["fields"][1]["value"], -5);
    }

    #[test]
    fn snapshot_serde_roundtrip() {
        let snapshot = RecordSnapshot {
            field_count: 1,
            fields: vec![FieldSnapshot::Null, FieldSnapshot::Stream { remaining: 26 }],
        };
        let json = serde_json::to_string(&snapshot).expect("serialize");
        let decoded: RecordSnapshot = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(snapshot, decoded);
    }

    #[test]
    fn deserialized_snapshot_without_fields_has_no_label() {
        let snapshot: RecordSnapshot =
            serde_json::from_str(r#"{"fieldCount":0,"fields":[]}"#).unwrap();
        assert_eq!(snapshot.label(), None);
    }
}
