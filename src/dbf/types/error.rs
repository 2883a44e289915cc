//! Custom error types for the dbf-reader crate.
//!
//! Only failures that abort a whole parse are errors. Per-field anomalies
//! (unparsable numbers, unresolved memo blocks) decode to sentinel values
//! instead, see [`FieldValue`](super::models::FieldValue).

use thiserror::Error;

/// The primary error type for all operations in this crate.
#[derive(Debug, Error)]
pub enum DbfError {
    /// The underlying byte source could not be read.
    #[error("I/O error: {0:?}")]
    Io(#[from] std::io::Error),

    /// Header offsets or lengths are inconsistent with each other.
    #[error("Invalid table geometry: {0}")]
    Geometry(String),

    /// A buffer is shorter than the structure it is supposed to hold.
    #[error("Size mismatch for {context}: expected {expected} bytes, but found {found} bytes")]
    SizeMismatch {
        context: &'static str,
        expected: u64,
        found: u64,
    },
}

/// A convenience `Result` type alias using the crate's `DbfError` type.
pub type Result<T> = std::result::Result<T, DbfError>;
