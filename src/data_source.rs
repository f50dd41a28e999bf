use std::fs::File;
use std::io;
use std::io::{BufRead, BufReader, Read};

use crate::result::{incomplete_data_error, IonResult};

/// Optimized read operations for parsing Ion.
///
/// The binary reader pulls individual bytes (tag bytes, variable-length integers) far more
/// often than it pulls large slices, so this trait leans on [BufRead]'s internal buffer to
/// make single-byte reads cheap.
///
/// Operations that run out of data mid-read report [crate::IonError::Incomplete] with an
/// offset of zero; the reader that invoked them rewrites the offset to its absolute stream
/// position before surfacing the error.
pub trait IonDataSource: BufRead {
    /// Returns the next byte in the stream, or `None` if the stream is exhausted.
    fn next_byte(&mut self) -> IonResult<Option<u8>>;

    /// Consumes and discards the next `number_of_bytes` bytes.
    fn skip_bytes(&mut self, number_of_bytes: usize) -> IonResult<()>;

    /// Feeds bytes to `byte_processor` one at a time until the processor returns `false`
    /// or the stream is exhausted (an error). Returns the number of bytes consumed.
    fn read_next_byte_while<F>(&mut self, byte_processor: &mut F) -> IonResult<usize>
    where
        F: FnMut(u8) -> bool;

    /// Reads exactly `length` bytes into `buffer`, replacing its contents.
    fn read_exact_into(&mut self, length: usize, buffer: &mut Vec<u8>) -> IonResult<()>;
}

impl<T: BufRead> IonDataSource for T {
    fn next_byte(&mut self) -> IonResult<Option<u8>> {
        let buffer = self.fill_buf()?;
        let byte = match buffer.first() {
            Some(byte) => *byte,
            None => return Ok(None),
        };
        self.consume(1);
        Ok(Some(byte))
    }

    fn skip_bytes(&mut self, number_of_bytes: usize) -> IonResult<()> {
        let mut remaining = number_of_bytes;
        while remaining > 0 {
            let buffer = self.fill_buf()?;
            if buffer.is_empty() {
                return incomplete_data_error(0);
            }
            let bytes_to_skip = remaining.min(buffer.len());
            self.consume(bytes_to_skip);
            remaining -= bytes_to_skip;
        }
        Ok(())
    }

    fn read_next_byte_while<F>(&mut self, byte_processor: &mut F) -> IonResult<usize>
    where
        F: FnMut(u8) -> bool,
    {
        let mut number_of_bytes_read: usize = 0;
        loop {
            match self.next_byte()? {
                Some(byte) => {
                    number_of_bytes_read += 1;
                    if !byte_processor(byte) {
                        return Ok(number_of_bytes_read);
                    }
                }
                None => return incomplete_data_error(0),
            }
        }
    }

    fn read_exact_into(&mut self, length: usize, buffer: &mut Vec<u8>) -> IonResult<()> {
        buffer.clear();
        let bytes_read = self.by_ref().take(length as u64).read_to_end(buffer)?;
        if bytes_read < length {
            return incomplete_data_error(0);
        }
        Ok(())
    }
}

/// Types that can be converted into an [IonDataSource], allowing the reader to accept byte
/// slices, byte vectors, and arbitrary `io::Read` implementations alike.
pub trait ToIonDataSource {
    type DataSource: IonDataSource;
    fn to_ion_data_source(self) -> Self::DataSource;
}

impl<'a> ToIonDataSource for &'a [u8] {
    type DataSource = io::Cursor<&'a [u8]>;

    fn to_ion_data_source(self) -> Self::DataSource {
        io::Cursor::new(self)
    }
}

impl<'a, const N: usize> ToIonDataSource for &'a [u8; N] {
    type DataSource = io::Cursor<&'a [u8]>;

    fn to_ion_data_source(self) -> Self::DataSource {
        io::Cursor::new(self.as_slice())
    }
}

impl ToIonDataSource for Vec<u8> {
    type DataSource = io::Cursor<Vec<u8>>;

    fn to_ion_data_source(self) -> Self::DataSource {
        io::Cursor::new(self)
    }
}

impl<T: Read> ToIonDataSource for BufReader<T> {
    type DataSource = Self;

    fn to_ion_data_source(self) -> Self::DataSource {
        self
    }
}

impl ToIonDataSource for File {
    type DataSource = BufReader<File>;

    fn to_ion_data_source(self) -> Self::DataSource {
        BufReader::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn next_byte_walks_the_stream() -> IonResult<()> {
        let mut source = Cursor::new(&[0x01u8, 0x02, 0x03]);
        assert_eq!(source.next_byte()?, Some(0x01));
        assert_eq!(source.next_byte()?, Some(0x02));
        assert_eq!(source.next_byte()?, Some(0x03));
        assert_eq!(source.next_byte()?, None);
        Ok(())
    }

    #[test]
    fn skip_bytes_spans_refills() -> IonResult<()> {
        // A one-byte input buffer forces a refill for every byte skipped
        let mut source = BufReader::with_capacity(1, Cursor::new(&[0x01u8, 0x02, 0x03, 0x04]));
        source.skip_bytes(3)?;
        assert_eq!(source.next_byte()?, Some(0x04));
        Ok(())
    }

    #[test]
    fn skip_past_the_end_is_incomplete() {
        let mut source = Cursor::new(&[0x01u8]);
        assert!(source.skip_bytes(2).is_err());
    }

    #[test]
    fn read_exact_into_replaces_contents() -> IonResult<()> {
        let mut source = Cursor::new(&[0x0Au8, 0x0B, 0x0C]);
        let mut buffer = vec![0xFF; 16];
        source.read_exact_into(2, &mut buffer)?;
        assert_eq!(buffer, vec![0x0A, 0x0B]);
        Ok(())
    }
}
