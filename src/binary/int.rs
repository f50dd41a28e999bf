use std::io::Write;

use num_bigint::{BigInt, BigUint, Sign as BigSign};
use num_traits::Zero;

use crate::data_source::IonDataSource;
use crate::result::{incomplete_data_error_raw, IonResult};
use crate::types::coefficient::{Coefficient, Sign};
use crate::types::integer::Int;

const SIGN_BIT: u8 = 0b1000_0000;
const MAGNITUDE_BITMASK: u8 = 0b0111_1111;

/// The maximum Int size, in bytes, that can be read into an i64 without promotion. Eight
/// bytes of sign-and-magnitude hold at most 63 bits of magnitude, which always fits.
const MAX_INT_SIZE_IN_BYTES: usize = 8;

/// Represents a fixed-length signed integer in the sign-and-magnitude encoding: the high
/// bit of the first byte is the sign and the remaining bits are the big-endian magnitude.
/// This encoding appears inside decimal values and timestamp fractions; integer *values*
/// carry their sign in the tag byte instead and use the plain UInt encoding.
#[derive(Debug)]
pub struct DecodedInt {
    size_in_bytes: usize,
    value: Int,
    is_negative_zero: bool,
}

impl DecodedInt {
    /// Reads an Int of `length` bytes from the provided data source.
    pub fn read<R: IonDataSource>(data_source: &mut R, length: usize) -> IonResult<DecodedInt> {
        if length == 0 {
            return Ok(DecodedInt {
                size_in_bytes: 0,
                value: Int::from(0i64),
                is_negative_zero: false,
            });
        }

        let first_byte = data_source
            .next_byte()?
            .ok_or_else(|| incomplete_data_error_raw(0))?;
        let is_negative = first_byte & SIGN_BIT != 0;

        if length <= MAX_INT_SIZE_IN_BYTES {
            let mut magnitude = (first_byte & MAGNITUDE_BITMASK) as u64;
            for _ in 1..length {
                let byte = data_source
                    .next_byte()?
                    .ok_or_else(|| incomplete_data_error_raw(0))?;
                magnitude = (magnitude << 8) | byte as u64;
            }
            // Eight bytes leave at most 63 bits of magnitude, so the i64 conversion is lossless.
            let value = if is_negative {
                -(magnitude as i64)
            } else {
                magnitude as i64
            };
            return Ok(DecodedInt {
                size_in_bytes: length,
                value: Int::from(value),
                is_negative_zero: is_negative && magnitude == 0,
            });
        }

        let mut buffer = Vec::with_capacity(length);
        data_source.read_exact_into(length - 1, &mut buffer)?;
        buffer.insert(0, first_byte & MAGNITUDE_BITMASK);
        let magnitude = BigUint::from_bytes_be(&buffer);
        let is_negative_zero = is_negative && magnitude.is_zero();
        let sign = if is_negative {
            BigSign::Minus
        } else {
            BigSign::Plus
        };
        Ok(DecodedInt {
            size_in_bytes: length,
            value: Int::from(BigInt::from_biguint(sign, magnitude)),
            is_negative_zero,
        })
    }

    /// Writes a sign-and-magnitude encoding of `coefficient` to the sink, returning the
    /// number of bytes written. Positive zero occupies zero bytes (the encoding where a
    /// coefficient "may be absent"); negative zero occupies a single sign-only byte.
    pub fn write_coefficient<W: Write>(sink: &mut W, coefficient: &Coefficient) -> IonResult<usize> {
        let mut bytes = coefficient.magnitude().to_be_bytes();
        if bytes.is_empty() {
            return match coefficient.sign() {
                Sign::Negative => {
                    sink.write_all(&[SIGN_BIT])?;
                    Ok(1)
                }
                Sign::Positive => Ok(0),
            };
        }
        if bytes[0] & SIGN_BIT != 0 {
            // The leading magnitude bit collides with the sign bit's position; push the
            // magnitude right by one byte.
            bytes.insert(0, 0);
        }
        if coefficient.sign() == Sign::Negative {
            bytes[0] |= SIGN_BIT;
        }
        sink.write_all(&bytes)?;
        Ok(bytes.len())
    }

    /// The number of bytes [DecodedInt::write_coefficient] would produce for `coefficient`.
    pub fn coefficient_size_in_bytes(coefficient: &Coefficient) -> usize {
        let bytes = coefficient.magnitude().to_be_bytes();
        if bytes.is_empty() {
            return match coefficient.sign() {
                Sign::Negative => 1,
                Sign::Positive => 0,
            };
        }
        if bytes[0] & SIGN_BIT != 0 {
            bytes.len() + 1
        } else {
            bytes.len()
        }
    }

    pub fn value(&self) -> &Int {
        &self.value
    }

    /// Returns `true` if the encoded integer was a sign byte over a zero magnitude.
    pub fn is_negative_zero(&self) -> bool {
        self.is_negative_zero
    }

    pub fn size_in_bytes(&self) -> usize {
        self.size_in_bytes
    }

    /// This value's coefficient form, preserving negative zero.
    pub fn into_coefficient(self) -> Coefficient {
        if self.is_negative_zero {
            Coefficient::negative_zero()
        } else {
            Coefficient::from(self.value)
        }
    }
}
