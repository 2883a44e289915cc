//! Generic IEEE-754-style floating point decoding.
//!
//! The layout (sign, exponent and fraction widths plus the exponent bias) is
//! a parameter, so the same routine reads single and double precision values.
//! Exponent fields of all ones are decoded like any normal number; the
//! format never stores infinities or NaNs.

/// Bit layout of a binary floating point format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloatLayout {
    pub sign_bits: u32,
    pub exponent_bits: u32,
    pub fraction_bits: u32,
    /// Exponent applied to denormalized values.
    pub e_min: i32,
    /// Exponent bias.
    pub e_max: i32,
}

impl FloatLayout {
    pub const SINGLE: FloatLayout = FloatLayout {
        sign_bits: 1,
        exponent_bits: 8,
        fraction_bits: 23,
        e_min: -126,
        e_max: 127,
    };

    pub const DOUBLE: FloatLayout = FloatLayout {
        sign_bits: 1,
        exponent_bits: 11,
        fraction_bits: 52,
        e_min: -1022,
        e_max: 1023,
    };

    fn total_bits(&self) -> u32 {
        self.sign_bits + self.exponent_bits + self.fraction_bits
    }
}

/// Decodes `bytes` as a floating point value with the given layout.
///
/// The bytes form one bit string, most significant byte first. When
/// `little_endian` is set the byte order is reversed before the fields are
/// read, so the sign bit is always the top bit of the last input byte.
///
/// Returns `NaN` when the span is longer than 16 bytes or too short for the
/// layout.
pub fn decode_float(bytes: &[u8], layout: FloatLayout, little_endian: bool) -> f64 {
    let total_bits = bytes.len() as u32 * 8;
    if bytes.len() > 16 || layout.total_bits() > total_bits || layout.fraction_bits >= 127 {
        return f64::NAN;
    }

    let bits = if little_endian {
        bytes.iter().rev().fold(0u128, |acc, &b| (acc << 8) | u128::from(b))
    } else {
        bytes.iter().fold(0u128, |acc, &b| (acc << 8) | u128::from(b))
    };
    let field = |start: u32, width: u32| -> u128 {
        if width == 0 {
            return 0;
        }
        let shifted = bits >> (total_bits - start - width);
        if width >= 128 { shifted } else { shifted & ((1u128 << width) - 1) }
    };

    let negative = layout.sign_bits > 0 && field(0, 1) == 1;
    let mut exponent = field(layout.sign_bits, layout.exponent_bits) as i32 - layout.e_max;
    let fraction = field(layout.sign_bits + layout.exponent_bits, layout.fraction_bits);

    let leading = if exponent == -layout.e_max {
        if fraction == 0 {
            return 0.0;
        }
        exponent = layout.e_min;
        0u128
    } else {
        1u128
    };

    let significand = (leading << layout.fraction_bits) | fraction;
    let magnitude = scale_by_pow2(
        significand as f64,
        exponent - layout.fraction_bits as i32,
    );
    if negative { -magnitude } else { magnitude }
}

/// Reads a little-endian single precision value.
pub fn read_single(bytes: &[u8]) -> f64 {
    decode_float(bytes, FloatLayout::SINGLE, true)
}

/// Reads a little-endian double precision value.
pub fn read_double(bytes: &[u8]) -> f64 {
    decode_float(bytes, FloatLayout::DOUBLE, true)
}

/// Multiplies `value` by `2^exp` in steps that stay within the normal range,
/// so only the final step rounds.
fn scale_by_pow2(mut value: f64, mut exp: i32) -> f64 {
    const STEP: i32 = 1000;
    while exp > STEP {
        value *= pow2(STEP);
        exp -= STEP;
    }
    while exp < -STEP {
        value *= pow2(-STEP);
        exp += STEP;
    }
    value * pow2(exp)
}

/// Exact power of two for `exp` in the normal range.
fn pow2(exp: i32) -> f64 {
    f64::from_bits(((exp + 1023) as u64) << 52)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_one() {
        assert_eq!(read_double(&1.0f64.to_le_bytes()), 1.0);
    }

    #[test]
    fn zero_patterns_decode_to_zero() {
        assert_eq!(read_double(&[0u8; 8]), 0.0);
        let neg_zero = (-0.0f64).to_le_bytes();
        assert_eq!(read_double(&neg_zero), 0.0);
    }

    #[test]
    fn smallest_denormal() {
        let value = read_double(&1u64.to_le_bytes());
        assert_eq!(value, f64::from_bits(1));
        assert_eq!(value, 2f64.powi(-1000) * 2f64.powi(-74));
    }

    #[test]
    fn matches_native_doubles() {
        for x in [-2.5f64, 0.1, 12345.6789, -1.0e-300, 6.02214076e23, f64::MAX, f64::MIN_POSITIVE] {
            assert_eq!(read_double(&x.to_le_bytes()), x, "decoding {}", x);
        }
    }

    #[test]
    fn big_endian_input() {
        assert_eq!(decode_float(&(-3.75f64).to_be_bytes(), FloatLayout::DOUBLE, false), -3.75);
    }

    #[test]
    fn single_precision() {
        assert_eq!(read_single(&1.5f32.to_le_bytes()), 1.5);
        assert_eq!(read_single(&(-0.15625f32).to_le_bytes()), -0.15625);
        assert_eq!(read_single(&1u32.to_le_bytes()), 2f64.powi(-149));
    }

    #[test]
    fn short_span_is_nan() {
        assert!(read_double(&[0u8; 4]).is_nan());
    }
}
