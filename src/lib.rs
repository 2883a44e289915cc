//! # dbf-reader
//!
//! A reader for dBASE / Visual FoxPro table files (`.dbf`).
//!
//! Parses the file header and field schema, then decodes the fixed-length
//! records one at a time into typed values. Supports character, numeric,
//! double, integer, currency, date, timestamp and memo fields.
//!
//! **Note:** Memo text lives in a companion file that this crate does not
//! read; supply a [`MemoProvider`] to resolve memo fields.
pub mod dbf;

// Re-export the main types for convenience
pub use dbf::{
    DbfError, DbfReader, Result,
    iter::RecordIterator,
    types::{
        memo::{MemoProvider, MemoTable, NoMemo},
        models::{
            DbfHeader, DecodeOptions, FieldDescriptor, FieldType, FieldValue, LastUpdated,
            Record, TimestampFormat,
        },
    },
};
