use std::io::Write;

use crate::data_source::IonDataSource;
use crate::result::{decoding_error, IonResult};

const BITS_PER_ENCODED_BYTE: usize = 7;
const BITS_PER_U64: usize = 64;
const MAX_ENCODED_SIZE_IN_BYTES: usize =
    (BITS_PER_U64 + BITS_PER_ENCODED_BYTE - 1) / BITS_PER_ENCODED_BYTE;

const LOWER_6_BITMASK: u8 = 0b0011_1111;
const LOWER_7_BITMASK: u8 = 0b0111_1111;
const HIGHEST_BIT_VALUE: u8 = 0b1000_0000;

const FIRST_BYTE_SIGN_MASK: u8 = 0b0100_0000;

/// Represents a variable-length signed integer. The framing matches [crate::binary::var_uint::VarUInt],
/// but the first byte gives up one of its value bits to carry the sign: bit `0x40` set means
/// the magnitude is negative.
///
/// A VarInt whose sign bit is set over a zero magnitude is *negative zero*, a sentinel the
/// timestamp encoding uses for "offset unknown"; [VarInt::is_negative_zero] distinguishes it
/// from ordinary zero.
#[derive(Debug)]
pub struct VarInt {
    value: i64,
    is_negative_zero: bool,
    size_in_bytes: usize,
}

impl VarInt {
    /// Reads a VarInt from the provided data source.
    pub fn read<R: IonDataSource>(data_source: &mut R) -> IonResult<VarInt> {
        let mut magnitude: u64 = 0;
        let mut sign_is_negative = false;
        let mut is_first_byte = true;
        let mut overflow_risk = false;

        let mut byte_processor = |byte: u8| {
            if is_first_byte {
                is_first_byte = false;
                sign_is_negative = byte & FIRST_BYTE_SIGN_MASK != 0;
                // In a maximum-length encoding the trailing nine bytes hold 63 bits, so the
                // first byte may contribute at most one more (bit 63, for i64::MIN).
                overflow_risk = byte & LOWER_6_BITMASK > 1;
                magnitude = (byte & LOWER_6_BITMASK) as u64;
            } else {
                magnitude <<= 7;
                magnitude |= (byte & LOWER_7_BITMASK) as u64;
            }
            byte < HIGHEST_BIT_VALUE
        };

        let encoded_size_in_bytes = data_source.read_next_byte_while(&mut byte_processor)?;

        if encoded_size_in_bytes > MAX_ENCODED_SIZE_IN_BYTES
            || encoded_size_in_bytes == MAX_ENCODED_SIZE_IN_BYTES && overflow_risk
        {
            return decoding_error(format!(
                "found a {encoded_size_in_bytes}-byte VarInt whose magnitude exceeds an i64"
            ));
        }

        let is_negative_zero = sign_is_negative && magnitude == 0;
        let value = if sign_is_negative {
            // An i64 can represent every magnitude up to 2^63; 10 bytes with an empty first
            // byte max out at 2^63 exactly, which is i64::MIN's magnitude.
            if magnitude > (i64::MAX as u64) + 1 {
                return decoding_error("found a VarInt too negative to fit in an i64");
            }
            (magnitude as i64).wrapping_neg()
        } else {
            if magnitude > i64::MAX as u64 {
                return decoding_error("found a VarInt too large to fit in an i64");
            }
            magnitude as i64
        };

        Ok(VarInt {
            value,
            is_negative_zero,
            size_in_bytes: encoded_size_in_bytes,
        })
    }

    /// Encodes the given signed value as a VarInt and writes it to the sink, returning the
    /// number of bytes written.
    pub fn write_i64<W: Write>(sink: &mut W, value: i64) -> IonResult<usize> {
        const VAR_INT_BUFFER_SIZE: usize = 10;

        let mut buffer = [0u8; VAR_INT_BUFFER_SIZE];
        let mut magnitude = value.unsigned_abs();

        let encoded_size = VarInt::encoded_size_of(value);
        let first_byte = VAR_INT_BUFFER_SIZE - encoded_size;
        // Fill from the last byte backwards; every byte but the first holds seven bits.
        for index in (first_byte + 1..VAR_INT_BUFFER_SIZE).rev() {
            buffer[index] = magnitude as u8 & LOWER_7_BITMASK;
            magnitude >>= BITS_PER_ENCODED_BYTE;
        }
        buffer[first_byte] = magnitude as u8 & LOWER_6_BITMASK;
        if value < 0 {
            buffer[first_byte] |= FIRST_BYTE_SIGN_MASK;
        }
        buffer[VAR_INT_BUFFER_SIZE - 1] |= HIGHEST_BIT_VALUE;

        let encoded_bytes = &buffer[first_byte..];
        sink.write_all(encoded_bytes)?;
        Ok(encoded_bytes.len())
    }

    /// The number of bytes that [VarInt::write_i64] would produce for `value`.
    pub fn encoded_size_of(value: i64) -> usize {
        // The first byte holds six bits of magnitude; each additional byte holds seven.
        let mut size = 1;
        let mut remaining = value.unsigned_abs() >> 6;
        while remaining > 0 {
            size += 1;
            remaining >>= BITS_PER_ENCODED_BYTE;
        }
        size
    }

    /// Returns the value of the signed integer. Negative zero reads as `0`; use
    /// [VarInt::is_negative_zero] to detect it.
    #[inline(always)]
    pub fn value(&self) -> i64 {
        self.value
    }

    /// Returns `true` if the encoded integer had its sign bit set over a zero magnitude.
    #[inline(always)]
    pub fn is_negative_zero(&self) -> bool {
        self.is_negative_zero
    }

    /// Returns the number of bytes that were read from the data source to construct this
    /// signed integer.
    #[inline(always)]
    pub fn size_in_bytes(&self) -> usize {
        self.size_in_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::VarInt;
    use crate::result::IonResult;
    use std::io::Cursor;

    const ERROR_MESSAGE: &str = "failed to read a VarInt from the provided data";

    #[test]
    fn read_positive() {
        let var_int = VarInt::read(&mut Cursor::new(&[0b0011_1100, 0b1011_1101])) // 0x3C 0xBD
            .expect(ERROR_MESSAGE);
        assert_eq!(var_int.size_in_bytes(), 2);
        assert_eq!(var_int.value(), 7_741);
    }

    #[test]
    fn read_negative() {
        let var_int = VarInt::read(&mut Cursor::new(&[0b0111_1100, 0b1011_1101]))
            .expect(ERROR_MESSAGE);
        assert_eq!(var_int.size_in_bytes(), 2);
        assert_eq!(var_int.value(), -7_741);
    }

    #[test]
    fn read_zero() {
        let var_int = VarInt::read(&mut Cursor::new(&[0b1000_0000])).expect(ERROR_MESSAGE);
        assert_eq!(var_int.size_in_bytes(), 1);
        assert_eq!(var_int.value(), 0);
        assert!(!var_int.is_negative_zero());
    }

    #[test]
    fn read_negative_zero() {
        let var_int = VarInt::read(&mut Cursor::new(&[0b1100_0000])).expect(ERROR_MESSAGE);
        assert_eq!(var_int.size_in_bytes(), 1);
        assert_eq!(var_int.value(), 0);
        assert!(var_int.is_negative_zero());
    }

    #[test]
    fn read_detects_overflow() {
        let bytes = [0b0111_1111u8; 11];
        VarInt::read(&mut Cursor::new(&bytes)).expect_err("this should have failed to parse");
    }

    fn var_int_encoding_test(value: i64, expected_encoding: &[u8]) -> IonResult<()> {
        let mut buffer = vec![];
        let encoded_size = VarInt::write_i64(&mut buffer, value)?;
        assert_eq!(buffer.as_slice(), expected_encoding);
        assert_eq!(encoded_size, expected_encoding.len());
        assert_eq!(VarInt::encoded_size_of(value), expected_encoding.len());
        Ok(())
    }

    #[test]
    fn write_single_byte_values() -> IonResult<()> {
        var_int_encoding_test(0, &[0b1000_0000])?;
        var_int_encoding_test(17, &[0b1001_0001])?;
        var_int_encoding_test(-3, &[0b1100_0011])?;
        var_int_encoding_test(63, &[0b1011_1111])?;
        var_int_encoding_test(-63, &[0b1111_1111])?;
        Ok(())
    }

    #[test]
    fn write_two_byte_values() -> IonResult<()> {
        // 64 no longer fits in the six value bits of a single byte
        var_int_encoding_test(64, &[0b0000_0000, 0b1100_0000])?;
        var_int_encoding_test(-64, &[0b0100_0000, 0b1100_0000])?;
        var_int_encoding_test(100, &[0b0000_0000, 0b1110_0100])?;
        var_int_encoding_test(-100, &[0b0100_0000, 0b1110_0100])?;
        Ok(())
    }

    #[test]
    fn sign_bit_appears_only_in_the_first_byte() -> IonResult<()> {
        let mut buffer = vec![];
        VarInt::write_i64(&mut buffer, -1_000_000)?;
        assert_ne!(buffer[0] & 0b0100_0000, 0);
        // The terminator appears only on the final byte
        for byte in &buffer[..buffer.len() - 1] {
            assert_eq!(byte & 0b1000_0000, 0);
        }
        assert_ne!(buffer[buffer.len() - 1] & 0b1000_0000, 0);
        Ok(())
    }

    #[test]
    fn round_trip_extremes() -> IonResult<()> {
        for value in [i64::MIN, i64::MIN + 1, -1, 0, 1, i64::MAX] {
            let mut buffer = Vec::new();
            VarInt::write_i64(&mut buffer, value)?;
            let decoded = VarInt::read(&mut buffer.as_slice())?;
            assert_eq!(decoded.value(), value, "round trip failed for {value}");
        }
        Ok(())
    }
}
