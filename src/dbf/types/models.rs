//! Core data structures for DBF table components.
//!
//! This module defines the fundamental types used throughout the library:
//! - The file header and its field descriptor table
//! - Decoded records and their field values
//! - Decoding options

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Date of the last update, as stored in header bytes 1..4.
///
/// The year is stored as an offset from 2000, followed by the month and day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastUpdated {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl fmt::Display for LastUpdated {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Parsed table header.
///
/// Contains the record geometry needed to walk the file body and the
/// field schema used to decode each record.
#[derive(Debug, Clone)]
pub struct DbfHeader {
    /// File type byte (e.g. `0x30` for Visual FoxPro).
    pub type_tag: u8,
    pub last_updated: LastUpdated,
    /// Declared number of records. May exceed what the file actually holds.
    pub record_count: i32,
    /// Byte offset of the first record.
    pub data_start: u16,
    /// Bytes per record, including the leading delete flag.
    pub record_length: u16,
    pub codepage_tag: u8,
    pub fields: Vec<FieldDescriptor>,
}

impl DbfHeader {
    /// Number of records the header promises, with negative counts read as zero.
    pub fn declared_records(&self) -> u64 {
        u64::try_from(self.record_count).unwrap_or(0)
    }

    /// Byte offset one past the last declared record.
    pub fn data_end(&self) -> u64 {
        u64::from(self.data_start) + self.declared_records() * u64::from(self.record_length)
    }
}

/// A single column definition from the descriptor table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldType,
    /// The raw type character, kept so unknown tags remain visible.
    pub type_tag: char,
    /// Offset of the field within the record. Informational only.
    pub displacement: i32,
    pub length: u8,
    pub decimal_places: u8,
}

/// Field type, selected by the descriptor's type character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Space-padded text. Also used for any tag without a dedicated decoder.
    Character,
    /// `N`: decimal number stored as text.
    Numeric,
    /// `B`: little-endian IEEE-754 double.
    Double,
    /// `I`: little-endian signed 32-bit integer.
    Integer,
    /// `Y`: little-endian signed 64-bit integer with four implied decimals.
    Currency,
    /// `D`: `YYYYMMDD` text.
    Date,
    /// `T`: Julian day number followed by milliseconds since midnight.
    Timestamp,
    /// `M`: reference to a block in the companion memo file.
    Memo,
}

impl From<u8> for FieldType {
    fn from(tag: u8) -> Self {
        match tag {
            b'N' => Self::Numeric,
            b'B' => Self::Double,
            b'I' => Self::Integer,
            b'Y' => Self::Currency,
            b'D' => Self::Date,
            b'T' => Self::Timestamp,
            b'M' => Self::Memo,
            _ => Self::Character,
        }
    }
}

/// A decoded field value.
///
/// Decoding never fails at the field level: anomalies become `NaN`,
/// [`FieldValue::Null`] or an empty string depending on the field type.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    /// A calendar date formatted as `YYYY-MM-DD` (or with a time suffix for
    /// timestamps decoded with [`TimestampFormat::DateTime`]).
    Date(String),
    Null,
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) | FieldValue::Date(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Text(s) | FieldValue::Date(s) => serializer.serialize_str(s),
            FieldValue::Number(n) => serializer.serialize_f64(*n),
            FieldValue::Null => serializer.serialize_none(),
        }
    }
}

/// One decoded table row.
///
/// Records are handed to the caller by value; the reader keeps no reference
/// to them after emission.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// 1-based position of the record in the file.
    pub sequence_number: u64,
    pub deleted: bool,
    /// Field values in schema order.
    pub fields: Vec<(String, FieldValue)>,
}

impl Record {
    /// Looks up a field value by its column name.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(field_name, _)| field_name == name)
            .map(|(_, value)| value)
    }
}

/// Serializes as a flat object: `{"@sequenceNumber": 1, "@deleted": false, "NAME": ...}`.
impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 2))?;
        map.serialize_entry("@sequenceNumber", &self.sequence_number)?;
        map.serialize_entry("@deleted", &self.deleted)?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// How timestamp (`T`) fields are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimestampFormat {
    /// `YYYY-MM-DD`; the time of day is dropped.
    #[default]
    Date,
    /// `YYYY-MM-DDTHH:MM:SS.mmm`.
    DateTime,
}

/// Options controlling how record fields are decoded.
#[derive(Debug, Clone, Default)]
pub struct DecodeOptions {
    pub timestamps: TimestampFormat,
}
