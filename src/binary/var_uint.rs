use std::io::Write;
use std::mem;

use crate::data_source::IonDataSource;
use crate::result::{decoding_error, IonResult};

const BITS_PER_ENCODED_BYTE: usize = 7;
const STORAGE_SIZE_IN_BITS: usize = mem::size_of::<u64>() * 8;
// Ceiling division without a conversion to f64; the largest encoding of a u64 is 10 bytes.
const MAX_ENCODED_SIZE_IN_BYTES: usize =
    (STORAGE_SIZE_IN_BITS + BITS_PER_ENCODED_BYTE - 1) / BITS_PER_ENCODED_BYTE;

const LOWER_7_BITMASK: u8 = 0b0111_1111;
const HIGHEST_BIT_VALUE: u8 = 0b1000_0000;

/// Represents a variable-length unsigned integer: seven value bits per byte, terminated by
/// the byte whose high bit is set. See the [VarUInt and VarInt Fields](https://amazon-ion.github.io/ion-docs/docs/binary.html#varuint-and-varint-fields)
/// section of the binary Ion spec for more details.
#[derive(Debug)]
pub struct VarUInt {
    value: u64,
    size_in_bytes: usize,
}

impl VarUInt {
    /// Reads a VarUInt from the provided data source.
    pub fn read<R: IonDataSource>(data_source: &mut R) -> IonResult<VarUInt> {
        let mut magnitude: u64 = 0;
        let mut is_first_byte = true;
        let mut overflow_risk = false;

        let mut byte_processor = |byte: u8| {
            overflow_risk |= is_first_byte && byte > 1u8;
            is_first_byte = false;
            let lower_seven = (LOWER_7_BITMASK & byte) as u64;
            magnitude <<= 7; // Shifts 0 to 0 in the first iteration
            magnitude |= lower_seven;
            byte < HIGHEST_BIT_VALUE // If the highest bit is zero, continue reading
        };

        let encoded_size_in_bytes = data_source.read_next_byte_while(&mut byte_processor)?;

        // A 10-byte encoding can hold up to 70 bits of magnitude, so the tenth byte is only
        // legal when the first byte contributes at most the single remaining bit. Rejecting
        // anything larger also rejects inefficient over-length encodings of small values
        // (e.g. a 10-byte encoding of zero), which keeps the check to one branch on this
        // very hot path.
        if encoded_size_in_bytes > MAX_ENCODED_SIZE_IN_BYTES
            || encoded_size_in_bytes == MAX_ENCODED_SIZE_IN_BYTES && overflow_risk
        {
            return decoding_error(format!(
                "found a {encoded_size_in_bytes}-byte VarUInt; max supported size is {MAX_ENCODED_SIZE_IN_BYTES} bytes"
            ));
        }

        Ok(VarUInt {
            size_in_bytes: encoded_size_in_bytes,
            value: magnitude,
        })
    }

    /// Encodes the given unsigned value as a VarUInt and writes it to the sink, returning
    /// the number of bytes written.
    pub fn write_u64<W: Write>(sink: &mut W, mut magnitude: u64) -> IonResult<usize> {
        // A u64 is 8 bytes of data. The VarUInt encoding spreads 7 value bits across each
        // byte, so the largest encoded size of a u64 is 10 bytes.
        const VAR_UINT_BUFFER_SIZE: usize = 10;

        #[rustfmt::skip]
        let mut buffer: [u8; VAR_UINT_BUFFER_SIZE] = [
            0, 0, 0, 0, 0, 0, 0, 0, 0, 0b1000_0000
            //                           ^-- Set the 'end' flag of the final byte to 1
        ];

        if magnitude == 0 {
            sink.write_all(&[0b1000_0000])?;
            return Ok(1);
        }

        // The encoding process moves right-to-left, from the last byte in the buffer to the
        // first. `first_byte` tracks the leftmost buffer byte that contains encoded data.
        let mut first_byte = VAR_UINT_BUFFER_SIZE as u64;
        for buffer_byte in buffer.iter_mut().rev() {
            first_byte -= 1;
            *buffer_byte |= magnitude as u8 & LOWER_7_BITMASK;
            magnitude >>= BITS_PER_ENCODED_BYTE;
            if magnitude == 0 {
                break;
            }
        }

        let encoded_bytes = &buffer[(first_byte as usize)..];
        sink.write_all(encoded_bytes)?;
        Ok(encoded_bytes.len())
    }

    /// The number of bytes that [VarUInt::write_u64] would produce for `magnitude`, computed
    /// without encoding anything. The deferred-length writer uses this to size tag bytes.
    pub fn encoded_size_of(magnitude: u64) -> usize {
        let mut size = 1;
        let mut remaining = magnitude >> BITS_PER_ENCODED_BYTE;
        while remaining > 0 {
            size += 1;
            remaining >>= BITS_PER_ENCODED_BYTE;
        }
        size
    }

    /// Returns the magnitude of the unsigned integer.
    #[inline(always)]
    pub fn value(&self) -> u64 {
        self.value
    }

    /// Returns the number of bytes that were read from the data source to construct this
    /// unsigned integer.
    #[inline(always)]
    pub fn size_in_bytes(&self) -> usize {
        self.size_in_bytes
    }
}
