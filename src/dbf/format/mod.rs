//! File format parsing layer for DBF tables.
//!
//! This module provides the mid-level parsing layer that bridges between
//! raw byte sources and the high-level [`DbfReader`](crate::dbf::reader::DbfReader).
//!
//! # Module Organization
//!
//! - [`header`]: Parses the fixed header and the field descriptor table
//! - [`record`]: Decodes one fixed-length record into typed field values
//!
//! # Architecture
//!
//! ```text
//! File Structure:
//! ┌─────────────────┐
//! │  Header (32 B)  │ ← header::parse()
//! ├─────────────────┤
//! │  Descriptors    │
//! │  (32 B each)    │
//! ├─────────────────┤
//! │  Records        │ ← record::decode_record()
//! │  (fixed length) │
//! └─────────────────┘
//! ```

pub mod header;
pub mod record;
