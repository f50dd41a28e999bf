use std::io::Write;

use chrono::{Datelike, Duration, Timelike};

use crate::binary::constants::v1_0::{MAX_INLINE_LENGTH, VAR_INT_NEGATIVE_ZERO};
use crate::binary::int::DecodedInt;
use crate::binary::var_int::VarInt;
use crate::binary::var_uint::VarUInt;
use crate::result::IonResult;
use crate::types::timestamp::{Precision, Timestamp};

const TIMESTAMP_BUFFER_SIZE: usize = 16;

/// Provides support to write [Timestamp] into [Ion binary].
///
/// [Ion binary]: https://amazon-ion.github.io/ion-docs/docs/binary.html#6-timestamp
pub trait TimestampBinaryEncoder {
    /// Encodes the content of a [Timestamp] as per the Ion binary encoding.
    /// Returns the length of the encoded bytes.
    ///
    /// This does not encode the type descriptor nor the associated length.
    /// Prefer [TimestampBinaryEncoder::encode_timestamp_value] for that.
    fn encode_timestamp(&mut self, timestamp: &Timestamp) -> IonResult<usize>;

    /// Encodes a [Timestamp] as an Ion value with the type descriptor and length.
    /// Returns the length of the encoded bytes.
    fn encode_timestamp_value(&mut self, timestamp: &Timestamp) -> IonResult<usize>;
}

impl<W> TimestampBinaryEncoder for W
where
    W: Write,
{
    fn encode_timestamp(&mut self, timestamp: &Timestamp) -> IonResult<usize> {
        let mut bytes_written: usize = 0;

        // Each component is written in UTC; the offset field tells readers how to recover
        // the local time.
        match timestamp.offset_minutes() {
            Some(minutes) => {
                bytes_written += VarInt::write_i64(self, minutes as i64)?;
            }
            None => {
                // Negative zero: the offset is unknown
                self.write_all(&[VAR_INT_NEGATIVE_ZERO])?;
                bytes_written += 1;
            }
        }

        let utc = match timestamp.offset_minutes() {
            Some(minutes) => timestamp.date_time - Duration::minutes(minutes as i64),
            None => timestamp.date_time,
        };

        bytes_written += VarUInt::write_u64(self, utc.year() as u64)?;
        if timestamp.precision() >= Precision::Month {
            bytes_written += VarUInt::write_u64(self, utc.month() as u64)?;
        }
        if timestamp.precision() >= Precision::Day {
            bytes_written += VarUInt::write_u64(self, utc.day() as u64)?;
        }
        if timestamp.precision() >= Precision::HourAndMinute {
            bytes_written += VarUInt::write_u64(self, utc.hour() as u64)?;
            bytes_written += VarUInt::write_u64(self, utc.minute() as u64)?;
        }
        if timestamp.precision() >= Precision::Second {
            bytes_written += VarUInt::write_u64(self, utc.second() as u64)?;
            if let Some(fraction) = timestamp.fractional_seconds() {
                // A fraction of zero digits (0d0) carries no information and is omitted;
                // everything else is written as (exponent, coefficient).
                let omit = fraction.is_zero()
                    && fraction.exponent() >= 0
                    && !fraction.coefficient().is_negative_zero();
                if !omit {
                    bytes_written += VarInt::write_i64(self, fraction.exponent())?;
                    bytes_written += DecodedInt::write_coefficient(self, fraction.coefficient())?;
                }
            }
        }

        Ok(bytes_written)
    }

    fn encode_timestamp_value(&mut self, timestamp: &Timestamp) -> IonResult<usize> {
        let mut bytes_written: usize = 0;

        // First encode the timestamp's body. We need to know its encoded length before
        // we can write out the preceding type descriptor.
        let mut encoded: Vec<u8> = Vec::with_capacity(TIMESTAMP_BUFFER_SIZE);
        encoded.encode_timestamp(timestamp)?;

        // Write the type descriptor and length
        if encoded.len() <= MAX_INLINE_LENGTH {
            self.write_all(&[0x60 | encoded.len() as u8])?;
            bytes_written += 1;
        } else {
            self.write_all(&[0x6E])?;
            bytes_written += 1;
            bytes_written += VarUInt::write_u64(self, encoded.len() as u64)?;
        }

        self.write_all(&encoded)?;
        bytes_written += encoded.len();
        Ok(bytes_written)
    }
}
