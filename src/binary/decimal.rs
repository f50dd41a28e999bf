use std::io::Write;

use crate::binary::constants::v1_0::MAX_INLINE_LENGTH;
use crate::binary::int::DecodedInt;
use crate::binary::var_int::VarInt;
use crate::binary::var_uint::VarUInt;
use crate::types::decimal::Decimal;
use crate::IonResult;

const DECIMAL_BUFFER_SIZE: usize = 32;

/// Provides support to write [Decimal] into [Ion binary].
///
/// [Ion binary]: https://amazon-ion.github.io/ion-docs/docs/binary.html#5-decimal
pub trait DecimalBinaryEncoder {
    /// Encodes the content of a [Decimal] as per the Ion binary encoding.
    /// Returns the length of the encoded bytes.
    ///
    /// This does not encode the type descriptor nor the associated length.
    /// Prefer [DecimalBinaryEncoder::encode_decimal_value] for that.
    fn encode_decimal(&mut self, decimal: &Decimal) -> IonResult<usize>;

    /// Encodes a [Decimal] as an Ion value with the type descriptor and length.
    /// Returns the length of the encoded bytes.
    fn encode_decimal_value(&mut self, decimal: &Decimal) -> IonResult<usize>;
}

impl<W> DecimalBinaryEncoder for W
where
    W: Write,
{
    fn encode_decimal(&mut self, decimal: &Decimal) -> IonResult<usize> {
        // The 0d0 (positive zero, exponent zero) decimal is encoded as an empty body.
        if decimal.is_zero() && decimal.exponent() == 0 && !decimal.coefficient().is_negative_zero()
        {
            return Ok(0);
        }

        let mut bytes_written: usize = 0;
        bytes_written += VarInt::write_i64(self, decimal.exponent())?;
        bytes_written += DecodedInt::write_coefficient(self, decimal.coefficient())?;
        Ok(bytes_written)
    }

    fn encode_decimal_value(&mut self, decimal: &Decimal) -> IonResult<usize> {
        let mut bytes_written: usize = 0;
        // First encode the decimal's body. We need to know its encoded length before
        // we can write out the preceding type descriptor.
        let mut encoded: Vec<u8> = Vec::with_capacity(DECIMAL_BUFFER_SIZE);
        encoded.encode_decimal(decimal)?;

        // Write the type descriptor and length
        if encoded.len() <= MAX_INLINE_LENGTH {
            self.write_all(&[0x50 | encoded.len() as u8])?;
            bytes_written += 1;
        } else {
            self.write_all(&[0x5E])?;
            bytes_written += 1;
            bytes_written += VarUInt::write_u64(self, encoded.len() as u64)?;
        }

        self.write_all(&encoded)?;
        bytes_written += encoded.len();
        Ok(bytes_written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::coefficient::Coefficient;
    use rstest::rstest;

    fn encode(decimal: &Decimal) -> Vec<u8> {
        let mut buffer = Vec::new();
        buffer
            .encode_decimal_value(decimal)
            .expect("encoding to a Vec cannot fail");
        buffer
    }

    #[rstest]
    #[case::zero(Decimal::new(0u64, 0), &[0x50])] // 0.
    #[case::zero_with_exponent(Decimal::new(0u64, -1), &[0x51, 0xC1])] // 0.0
    #[case::thousandths(Decimal::new(1000u64, -3), &[0x53, 0xC3, 0x03, 0xE8])] // 1.000
    #[case::large_exponent(Decimal::new(-1i64, 100), &[0x53, 0x00, 0xE4, 0x81])] // -1d100
    #[case::negative_zero(Decimal::negative_zero(), &[0x52, 0x80, 0x80])] // -0d0
    #[case::negative_zero_with_exponent(Decimal::negative_zero_with_exponent(-1), &[0x52, 0xC1, 0x80])] // -0d-1
    #[case::simple(Decimal::new(7i64, 0), &[0x52, 0x80, 0x07])]
    fn encodings(#[case] decimal: Decimal, #[case] expected: &[u8]) {
        assert_eq!(encode(&decimal), expected);
    }

    #[test]
    fn long_form_length() {
        // A coefficient of 14 bytes forces the VarUInt length form
        let big = num_bigint::BigInt::from(2u8).pow(110);
        let decimal = Decimal::new(Coefficient::from(big), -40);
        let encoded = encode(&decimal);
        assert_eq!(encoded[0], 0x5E);
        // 0x8F == VarUInt(15): one exponent byte plus a 14-byte coefficient
        assert_eq!(encoded[1], 0x8F);
        assert_eq!(encoded.len(), 2 + 15);
    }
}
