//! DBF file header and field descriptor table parsing.
//!
//! # Header Structure
//! ```text
//! [0]       File type byte
//! [1..4]    Last update (year - 2000, month, day)
//! [4..8]    Record count (i32 LE)
//! [8..10]   Offset of the first record (u16 LE)
//! [10..12]  Record length including the delete flag (u16 LE)
//! [29]      Codepage byte
//! [32..]    Field descriptors, 32 bytes each, up to the first record
//! ```

use std::io::Read;

use byteorder::{ByteOrder, LittleEndian};
use log::{debug, info, trace, warn};

use crate::dbf::types::{
    error::{DbfError, Result},
    models::{DbfHeader, FieldDescriptor, FieldType, LastUpdated},
};
use crate::dbf::utils;

/// Size of the fixed header prefix and of each field descriptor.
pub const BLOCK_SIZE: usize = 32;

const NAME_LEN: usize = 11;

/// Parses the header from a buffer holding at least `data_start` bytes.
///
/// # Errors
/// - [`DbfError::SizeMismatch`] if the buffer is shorter than the header it describes
/// - [`DbfError::Geometry`] if the record offset, record length and field
///   lengths are inconsistent
pub fn parse(bytes: &[u8]) -> Result<DbfHeader> {
    let prefix = bytes.get(..BLOCK_SIZE).ok_or(DbfError::SizeMismatch {
        context: "table header",
        expected: BLOCK_SIZE as u64,
        found: bytes.len() as u64,
    })?;

    let type_tag = prefix[0];
    let last_updated = LastUpdated {
        year: 2000 + u16::from(prefix[1]),
        month: prefix[2],
        day: prefix[3],
    };
    let record_count = LittleEndian::read_i32(&prefix[4..8]);
    let data_start = LittleEndian::read_u16(&prefix[8..10]);
    let record_length = LittleEndian::read_u16(&prefix[10..12]);
    let codepage_tag = prefix[29];
    trace!(
        "Header prefix: type={:#04x}, records={}, data_start={}, record_length={}",
        type_tag, record_count, data_start, record_length
    );

    let field_count = descriptor_count(data_start)?;
    let table_end = usize::from(data_start);
    if bytes.len() < table_end {
        return Err(DbfError::SizeMismatch {
            context: "field descriptor table",
            expected: table_end as u64,
            found: bytes.len() as u64,
        });
    }

    let fields = bytes[BLOCK_SIZE..table_end]
        .chunks_exact(BLOCK_SIZE)
        .map(parse_descriptor)
        .collect::<Result<Vec<_>>>()?;
    debug_assert_eq!(fields.len(), field_count);

    let expected_length = 1 + fields.iter().map(|f| u32::from(f.length)).sum::<u32>();
    if expected_length != u32::from(record_length) {
        return Err(DbfError::Geometry(format!(
            "record length {} does not match the {} bytes declared by {} fields",
            record_length, expected_length, fields.len()
        )));
    }

    if record_count < 0 {
        warn!("Negative record count {} in header, treating as empty", record_count);
    }

    info!(
        "Header parsed: type={:#04x}, updated={}, records={}, fields={}, record_length={}",
        type_tag, last_updated, record_count, fields.len(), record_length
    );

    Ok(DbfHeader {
        type_tag,
        last_updated,
        record_count,
        data_start,
        record_length,
        codepage_tag,
        fields,
    })
}

/// Reads and parses the header from a byte source.
///
/// Consumes exactly `data_start` bytes, leaving `reader` at the first record.
pub fn read_header<R: Read>(reader: &mut R) -> Result<DbfHeader> {
    let mut buffer = vec![0u8; BLOCK_SIZE];
    reader.read_exact(&mut buffer)?;

    let data_start = LittleEndian::read_u16(&buffer[8..10]);
    descriptor_count(data_start)?;

    buffer.resize(usize::from(data_start), 0);
    reader.read_exact(&mut buffer[BLOCK_SIZE..])?;
    parse(&buffer)
}

/// Number of field descriptors that fit between the prefix and the first record.
fn descriptor_count(data_start: u16) -> Result<usize> {
    let data_start = usize::from(data_start);
    if data_start < BLOCK_SIZE {
        return Err(DbfError::Geometry(format!(
            "data start {} lies inside the {}-byte header",
            data_start, BLOCK_SIZE
        )));
    }
    if data_start % BLOCK_SIZE != 0 {
        return Err(DbfError::Geometry(format!(
            "data start {} is not aligned to {}-byte descriptors",
            data_start, BLOCK_SIZE
        )));
    }
    Ok(data_start / BLOCK_SIZE - 1)
}

fn parse_descriptor(raw: &[u8]) -> Result<FieldDescriptor> {
    let name = utils::decode_latin1(&raw[..NAME_LEN])
        .trim_end_matches('\0')
        .to_string();
    let tag = raw[11];
    let length = raw[16];
    if length == 0 {
        return Err(DbfError::Geometry(format!("field '{}' has zero length", name)));
    }

    let descriptor = FieldDescriptor {
        name,
        kind: FieldType::from(tag),
        type_tag: char::from(tag),
        displacement: LittleEndian::read_i32(&raw[12..16]),
        length,
        decimal_places: raw[17],
    };
    debug!(
        "Field '{}': type={} ({:?}), length={}, decimals={}",
        descriptor.name, descriptor.type_tag, descriptor.kind, descriptor.length, descriptor.decimal_places
    );
    Ok(descriptor)
}
