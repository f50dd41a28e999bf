use std::io::Write;

use num_bigint::BigUint;

use crate::data_source::IonDataSource;
use crate::result::{incomplete_data_error_raw, IonResult};
use crate::types::integer::{UInt, UIntData};

/// The maximum UInt size, in bytes, that can be read into a u64 without promotion.
const MAX_UINT_SIZE_IN_BYTES: usize = 8;

/// Represents a fixed-length unsigned integer: the minimal big-endian bytes of its
/// magnitude. The length is not self-delimiting; it comes from the enclosing tag byte.
#[derive(Debug)]
pub struct DecodedUInt {
    size_in_bytes: usize,
    value: UInt,
}

impl DecodedUInt {
    /// Reads a UInt of `length` bytes from the provided data source.
    pub fn read<R: IonDataSource>(data_source: &mut R, length: usize) -> IonResult<DecodedUInt> {
        if length <= MAX_UINT_SIZE_IN_BYTES {
            let mut magnitude: u64 = 0;
            for _ in 0..length {
                let byte = data_source
                    .next_byte()?
                    .ok_or_else(|| incomplete_data_error_raw(0))?;
                magnitude = (magnitude << 8) | byte as u64;
            }
            return Ok(DecodedUInt {
                size_in_bytes: length,
                value: UInt::from(magnitude),
            });
        }

        let mut buffer = Vec::with_capacity(length);
        data_source.read_exact_into(length, &mut buffer)?;
        Ok(DecodedUInt {
            size_in_bytes: length,
            value: UInt::from(BigUint::from_bytes_be(&buffer)),
        })
    }

    /// Writes the minimal big-endian encoding of `magnitude` to the sink, returning the
    /// number of bytes written. Zero encodes as zero bytes; contexts that need an explicit
    /// zero length record it in their tag byte instead.
    pub fn write_u64<W: Write>(sink: &mut W, magnitude: u64) -> IonResult<usize> {
        let encoded = encode_u64(magnitude);
        sink.write_all(encoded.as_bytes())?;
        Ok(encoded.as_bytes().len())
    }

    /// Writes the minimal big-endian encoding of the (possibly arbitrary-sized) `magnitude`.
    pub fn write<W: Write>(sink: &mut W, magnitude: &UInt) -> IonResult<usize> {
        match &magnitude.data {
            UIntData::U64(value) => Self::write_u64(sink, *value),
            UIntData::BigUInt(value) => {
                let bytes = value.to_bytes_be();
                sink.write_all(&bytes)?;
                Ok(bytes.len())
            }
        }
    }

    /// The number of bytes that [DecodedUInt::write_u64] would produce for `magnitude`.
    pub fn encoded_size_of(magnitude: u64) -> usize {
        8 - (magnitude.leading_zeros() / 8) as usize
    }

    pub fn value(&self) -> &UInt {
        &self.value
    }

    pub fn size_in_bytes(&self) -> usize {
        self.size_in_bytes
    }
}

/// A fixed-length unsigned integer encoded into a stack-allocated buffer. Values of eight
/// bytes or fewer can be laid out ahead of time without touching the heap.
#[derive(Debug)]
pub struct EncodedUInt {
    be_bytes: [u8; 8],
    first_occupied_byte: usize,
}

impl EncodedUInt {
    /// Returns the slice of the buffer that holds the encoded value.
    pub fn as_bytes(&self) -> &[u8] {
        &self.be_bytes[self.first_occupied_byte..]
    }
}

/// Lays out the minimal big-endian encoding of `magnitude`. Zero occupies zero bytes.
pub fn encode_u64(magnitude: u64) -> EncodedUInt {
    let be_bytes = magnitude.to_be_bytes();
    let first_occupied_byte = (magnitude.leading_zeros() / 8) as usize;
    EncodedUInt {
        be_bytes,
        first_occupied_byte,
    }
}
