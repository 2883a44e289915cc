//! Low-level byte and text helpers shared by the format parsers.

use byteorder::{ByteOrder, LittleEndian};
use encoding_rs::WINDOWS_1252;

/// Decodes single-byte text with the fixed table charset.
///
/// Uses the WHATWG `latin1` mapping, which is windows-1252: bytes
/// 0x80..=0x9F decode to printable characters (`€`, `Ÿ`, ...) rather than
/// the C1 control codes of strict ISO-8859-1.
pub fn decode_latin1(bytes: &[u8]) -> String {
    let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
    text.into_owned()
}

/// Strips leading and trailing padding: spaces, NULs and SOH bytes.
pub fn trim_padding(text: &str) -> &str {
    text.trim_matches(|c| c == ' ' || c == '\0' || c == '\u{1}')
}

/// Reads a little-endian `u32`, or `None` if fewer than 4 bytes are available.
pub fn read_u32_le(bytes: &[u8]) -> Option<u32> {
    bytes.get(..4).map(LittleEndian::read_u32)
}

/// Reads a little-endian `i32`, or `None` if fewer than 4 bytes are available.
pub fn read_i32_le(bytes: &[u8]) -> Option<i32> {
    bytes.get(..4).map(LittleEndian::read_i32)
}

/// Reads a little-endian `i64`, or `None` if fewer than 8 bytes are available.
pub fn read_i64_le(bytes: &[u8]) -> Option<i64> {
    bytes.get(..8).map(LittleEndian::read_i64)
}
