//! # Record Decoding
//!
//! Turns one record's raw bytes into a [`Record`] using the field schema.
//! Byte 0 is the delete flag; the remaining bytes are split across the
//! fields in descriptor order and decoded by field type.
//!
//! Decoding is total: a field that cannot be decoded gets a sentinel value
//! (`NaN` for numbers, [`FieldValue::Null`] for memos and timestamps, an empty
//! string for dates) and the remaining fields are decoded as usual.

use log::debug;

use crate::dbf::codec::{float, julian};
use crate::dbf::types::memo::MemoProvider;
use crate::dbf::types::models::{
    DecodeOptions, FieldDescriptor, FieldType, FieldValue, Record, TimestampFormat,
};
use crate::dbf::utils;

/// Delete-flag byte of a live record.
pub const LIVE_RECORD: u8 = b' ';

const CURRENCY_SCALE: f64 = 10_000.0;
const MILLIS_PER_DAY: u32 = 86_400_000;

/// Everything a field decoder needs besides the field bytes themselves.
pub struct DecodeContext<'a> {
    /// Identity of the table, handed to the memo provider.
    pub source: &'a str,
    pub memo: &'a dyn MemoProvider,
    pub options: &'a DecodeOptions,
}

/// Decodes a single record.
///
/// `raw` should be exactly one record long. Fields that run past the end of
/// a shorter slice decode as if their bytes were missing.
pub fn decode_record(
    fields: &[FieldDescriptor],
    raw: &[u8],
    sequence_number: u64,
    ctx: &DecodeContext<'_>,
) -> Record {
    let deleted = raw.first().is_some_and(|&flag| flag != LIVE_RECORD);

    let mut offset = 1;
    let values = fields
        .iter()
        .map(|field| {
            let end = offset + usize::from(field.length);
            let bytes = raw.get(offset..end.min(raw.len())).unwrap_or(&[]);
            offset = end;
            (field.name.clone(), decode_field(field, bytes, ctx))
        })
        .collect();

    Record {
        sequence_number,
        deleted,
        fields: values,
    }
}

/// Decodes one field's bytes according to its type.
pub fn decode_field(field: &FieldDescriptor, bytes: &[u8], ctx: &DecodeContext<'_>) -> FieldValue {
    match field.kind {
        FieldType::Character => FieldValue::Text(padded_text(bytes)),
        FieldType::Numeric => FieldValue::Number(parse_numeric(&field.name, &padded_text(bytes))),
        FieldType::Double => match bytes.get(..8) {
            Some(raw) => FieldValue::Number(float::read_double(raw)),
            None => missing_bytes(field, bytes),
        },
        FieldType::Integer => match utils::read_i32_le(bytes) {
            Some(n) => FieldValue::Number(f64::from(n)),
            None => missing_bytes(field, bytes),
        },
        FieldType::Currency => match utils::read_i64_le(bytes) {
            Some(n) => FieldValue::Number(n as f64 / CURRENCY_SCALE),
            None => missing_bytes(field, bytes),
        },
        FieldType::Date => FieldValue::Date(format_date_text(&padded_text(bytes))),
        FieldType::Timestamp => decode_timestamp(field, bytes, ctx.options.timestamps),
        FieldType::Memo => decode_memo(field, bytes, ctx),
    }
}

fn padded_text(bytes: &[u8]) -> String {
    let text = utils::decode_latin1(bytes);
    utils::trim_padding(&text).to_string()
}

fn missing_bytes(field: &FieldDescriptor, bytes: &[u8]) -> FieldValue {
    debug!(
        "Field '{}' ({:?}) has only {} bytes, decoding as null",
        field.name, field.kind, bytes.len()
    );
    FieldValue::Null
}

/// Parses numeric text. Blank text is zero; malformed text yields `NaN`.
///
/// Only decimal syntax is accepted, so `inf` or `nan` spelled out in a
/// field are malformed rather than special values.
fn parse_numeric(name: &str, text: &str) -> f64 {
    if text.is_empty() {
        return 0.0;
    }
    let decimal = text
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    let parsed = if decimal { text.parse::<f64>().ok() } else { None };
    parsed.unwrap_or_else(|| {
        debug!("Field '{}': unparsable number {:?}", name, text);
        f64::NAN
    })
}

/// Reformats `YYYYMMDD` as `YYYY-MM-DD`. Empty text stays empty.
fn format_date_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let part = |range: std::ops::Range<usize>| text.get(range).unwrap_or("");
    let (year, month, day) = (part(0..4), part(4..6), part(6..8));
    if text.len() != 8 || !text.bytes().all(|b| b.is_ascii_digit()) {
        debug!("Malformed date text {:?}", text);
    }
    format!("{}-{}-{}", year, month, day)
}

fn decode_timestamp(field: &FieldDescriptor, bytes: &[u8], format: TimestampFormat) -> FieldValue {
    let (Some(day_number), Some(millis)) = (
        utils::read_u32_le(bytes),
        bytes.get(4..).and_then(utils::read_u32_le),
    ) else {
        return missing_bytes(field, bytes);
    };
    if day_number == 0 {
        return FieldValue::Null;
    }

    // Times past midnight carry over into the following days.
    let day_number = f64::from(day_number) + f64::from(millis / MILLIS_PER_DAY);
    let millis = millis % MILLIS_PER_DAY;
    let (year, month, day) = julian::julian_day_to_gregorian(day_number);
    let date = format!("{:04}-{:02}-{:02}", year, month, day);

    FieldValue::Date(match format {
        TimestampFormat::Date => date,
        TimestampFormat::DateTime => format!(
            "{}T{:02}:{:02}:{:02}.{:03}",
            date,
            millis / 3_600_000,
            millis / 60_000 % 60,
            millis / 1_000 % 60,
            millis % 1_000
        ),
    })
}

/// Reads the memo block number stored in a memo field.
///
/// Four-byte fields hold a little-endian block number; wider fields hold it
/// as right-aligned ASCII digits. Zero means "no memo".
pub fn memo_block_reference(bytes: &[u8]) -> Option<u32> {
    let block = if bytes.len() == 4 {
        utils::read_u32_le(bytes)?
    } else {
        utils::trim_padding(&utils::decode_latin1(bytes)).parse().ok()?
    };
    (block != 0).then_some(block)
}

fn decode_memo(field: &FieldDescriptor, bytes: &[u8], ctx: &DecodeContext<'_>) -> FieldValue {
    let Some(block) = memo_block_reference(bytes) else {
        return FieldValue::Null;
    };
    match ctx.memo.resolve(ctx.source, block) {
        Some(text) => FieldValue::Text(text),
        None => {
            debug!("Field '{}': memo block {} not found in {}", field.name, block, ctx.source);
            FieldValue::Null
        }
    }
}
