use std::cmp::Ordering;
use std::convert::TryFrom;

use smallvec::SmallVec;

use crate::binary::constants::v1_0::{LENGTH_CODE_NULL, LENGTH_CODE_VAR_UINT};
use crate::binary::int::DecodedInt;
use crate::binary::type_code::IonTypeCode;
use crate::binary::uint::DecodedUInt;
use crate::binary::var_int::VarInt;
use crate::binary::var_uint::VarUInt;
use crate::data_source::IonDataSource;
use crate::raw_reader::RawStreamItem;
use crate::result::{
    decoding_error, decoding_error_raw, illegal_operation, illegal_operation_raw,
    incomplete_data_error, IonError, IonResult,
};
use crate::types::integer::{Int, UIntData};
use crate::types::timestamp::{fraction_to_nanoseconds, Mantissa, Precision, Timestamp};
use crate::types::value_ref::RawValueRef;
use crate::types::{Decimal, IonType, SymbolId};

use chrono::{Duration, NaiveDate};
use num_bigint::{BigInt, Sign as BigSign};

/// Tracks where the cursor sits relative to the current value.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
enum ReaderState {
    /// Positioned before the next tag byte (or the end of the stream/container).
    Ready,
    /// Positioned on a value whose header has been read but whose body has not.
    OnValue,
    /// The current value's body has been consumed by a typed read.
    ValueConsumed,
}

/// The decoded header of the value the cursor is positioned on. The body has not
/// necessarily been read yet.
#[derive(Debug, Clone)]
struct EncodedValue {
    ion_type: IonType,
    type_code: IonTypeCode,
    length_code: u8,
    is_null: bool,
    length_in_bytes: usize,
    field_id: Option<SymbolId>,
}

#[derive(Debug, Copy, Clone)]
struct ContainerFrame {
    ion_type: IonType,
    // The absolute stream offset one past the container's final byte. Every child must
    // end at or before this offset; the container's own end-of-stream sentinel fires
    // exactly here.
    exclusive_end: usize,
}

/// A pull parser over the Ion 1.0 binary encoding.
///
/// The reader advances value by value: [RawBinaryReader::next] decodes the next tag byte
/// (transparently consuming version markers' payloads, NOP padding, and annotation wrapper
/// headers along the way), after which the typed `read_*` methods extract the value's body.
/// Values that are never extracted are skipped when the cursor moves on.
///
/// This is the symbol-unaware layer: symbol values, field names, and annotations surface
/// as symbol IDs. [crate::reader::Reader] resolves them into text.
pub struct RawBinaryReader<R: IonDataSource> {
    data_source: R,
    // Scratch space for value bodies (strings, lobs); reused across reads
    buffer: Vec<u8>,
    // The absolute offset of the next byte to be read
    bytes_read: usize,
    state: ReaderState,
    parents: Vec<ContainerFrame>,
    annotations: SmallVec<[SymbolId; 2]>,
    value: Option<EncodedValue>,
    ion_version: (u8, u8),
}

impl<R: IonDataSource> RawBinaryReader<R> {
    pub fn new(data_source: R) -> RawBinaryReader<R> {
        RawBinaryReader {
            data_source,
            buffer: Vec::with_capacity(128),
            bytes_read: 0,
            state: ReaderState::Ready,
            parents: Vec::new(),
            annotations: SmallVec::new(),
            value: None,
            ion_version: (1, 0),
        }
    }

    /// Returns the (major, minor) version of the Ion stream being read. If this is called
    /// before a version marker has been read, the version (1, 0) is returned.
    pub fn ion_version(&self) -> (u8, u8) {
        self.ion_version
    }

    /// Advances the cursor to the next item at the current depth, skipping whatever remains
    /// of the current value.
    pub fn next(&mut self) -> IonResult<RawStreamItem> {
        if self.state == ReaderState::OnValue {
            let bytes_to_skip = self
                .value
                .as_ref()
                .map(|value| value.length_in_bytes)
                .unwrap_or(0);
            self.skip_bytes(bytes_to_skip)?;
        }
        self.state = ReaderState::Ready;
        self.value = None;
        self.annotations.clear();

        let mut field_id: Option<SymbolId> = None;
        // When the cursor enters an annotation wrapper, this records the wrapper's
        // exclusive end offset; the enclosed value must finish exactly there.
        let mut annotation_wrapper_end: Option<usize> = None;

        loop {
            if annotation_wrapper_end.is_none() {
                if let Some(parent) = self.parents.last() {
                    match self.bytes_read.cmp(&parent.exclusive_end) {
                        Ordering::Equal => return Ok(RawStreamItem::Nothing),
                        Ordering::Greater => {
                            return decoding_error(format!(
                                "the value at offset {} ran past the end of its parent container ({})",
                                self.bytes_read, parent.exclusive_end
                            ));
                        }
                        Ordering::Less => {}
                    }
                }
                // Inside a struct, each value is preceded by a VarUInt field ID
                if self.is_in_struct() && field_id.is_none() {
                    field_id = Some(self.read_var_uint()?.value() as SymbolId);
                }
            }

            let header_offset = self.bytes_read;
            let tag_byte = match self.next_byte()? {
                Some(byte) => byte,
                None => {
                    if self.parents.is_empty()
                        && field_id.is_none()
                        && annotation_wrapper_end.is_none()
                    {
                        // A clean end of stream between top-level values
                        return Ok(RawStreamItem::Nothing);
                    }
                    return incomplete_data_error(self.bytes_read);
                }
            };

            // The nibble is always in 0..=15, so the conversion cannot fail
            let type_code = IonTypeCode::try_from(tag_byte >> 4)?;
            let length_code = tag_byte & 0x0F;

            match type_code {
                IonTypeCode::NullOrNop if length_code != LENGTH_CODE_NULL => {
                    // NOP padding
                    if annotation_wrapper_end.is_some() {
                        return decoding_error(format!(
                            "found padding inside an annotation wrapper at offset {header_offset}"
                        ));
                    }
                    let padding_length = self.read_length(length_code)?;
                    self.check_fits_in_parent(padding_length)?;
                    self.skip_bytes(padding_length)?;
                    // Any field ID that preceded the padding was part of it
                    field_id = None;
                    continue;
                }
                IonTypeCode::AnnotationOrIvm if length_code == 0 => {
                    // The byte 0xE0 begins a binary version marker
                    if !self.parents.is_empty() {
                        return decoding_error(format!(
                            "found a binary version marker inside a container at offset {header_offset}"
                        ));
                    }
                    if annotation_wrapper_end.is_some() {
                        return decoding_error(format!(
                            "found a binary version marker inside an annotation wrapper at offset {header_offset}"
                        ));
                    }
                    return self.read_ivm_payload(header_offset);
                }
                IonTypeCode::AnnotationOrIvm => {
                    if length_code == LENGTH_CODE_NULL {
                        return Err(IonError::InvalidTagByte {
                            byte: tag_byte,
                            offset: header_offset,
                        });
                    }
                    if annotation_wrapper_end.is_some() {
                        return decoding_error(format!(
                            "an annotation wrapper cannot directly contain another annotation wrapper (offset {header_offset})"
                        ));
                    }
                    let wrapper_length = self.read_length(length_code)?;
                    self.check_fits_in_parent(wrapper_length)?;
                    let wrapper_end = self.bytes_read + wrapper_length;

                    let annotations_length = self.read_var_uint()?.value() as usize;
                    if annotations_length == 0 {
                        return decoding_error(format!(
                            "annotation wrapper at offset {header_offset} declares zero annotations"
                        ));
                    }
                    let ids_end = self.bytes_read + annotations_length;
                    if ids_end >= wrapper_end {
                        return decoding_error(format!(
                            "annotation wrapper at offset {header_offset} leaves no room for a value"
                        ));
                    }
                    while self.bytes_read < ids_end {
                        let sid = self.read_var_uint()?;
                        self.annotations.push(sid.value() as SymbolId);
                    }
                    if self.bytes_read != ids_end {
                        return decoding_error(format!(
                            "annotation symbol IDs overran their declared length at offset {header_offset}"
                        ));
                    }
                    annotation_wrapper_end = Some(wrapper_end);
                    continue;
                }
                _ => {}
            }

            // Everything else is a value. Resolve its null flag and body length.
            let (is_null, length_in_bytes) = match type_code {
                IonTypeCode::Boolean => match length_code {
                    0 | 1 => (false, 0),
                    LENGTH_CODE_NULL => (true, 0),
                    _ => {
                        return Err(IonError::InvalidTagByte {
                            byte: tag_byte,
                            offset: header_offset,
                        });
                    }
                },
                IonTypeCode::NegativeInteger if length_code == LENGTH_CODE_NULL => {
                    // 0x3F: there is no such thing as null.negative-int
                    return Err(IonError::InvalidTagByte {
                        byte: tag_byte,
                        offset: header_offset,
                    });
                }
                IonTypeCode::NegativeInteger if length_code == 0 => {
                    return decoding_error(format!(
                        "int 0 must be encoded with the positive type code (offset {header_offset})"
                    ));
                }
                IonTypeCode::Reserved => {
                    return Err(IonError::InvalidTagByte {
                        byte: tag_byte,
                        offset: header_offset,
                    });
                }
                IonTypeCode::Float => match length_code {
                    0 => (false, 0),
                    4 | 8 => (false, length_code as usize),
                    LENGTH_CODE_NULL => (true, 0),
                    _ => {
                        return decoding_error(format!(
                            "floats must be 0, 4, or 8 bytes long; found length code {length_code} at offset {header_offset}"
                        ));
                    }
                },
                IonTypeCode::Struct if length_code == 1 => {
                    // A length code of 1 flags a struct with sorted field names; the actual
                    // length always follows as a VarUInt.
                    (false, self.read_var_uint()?.value() as usize)
                }
                _ if length_code == LENGTH_CODE_NULL => (true, 0),
                _ => (false, self.read_length(length_code)?),
            };

            if type_code == IonTypeCode::Symbol && length_in_bytes > 8 {
                return decoding_error(format!(
                    "symbol ID at offset {header_offset} is too large ({length_in_bytes} bytes; max is 8)"
                ));
            }

            self.check_fits_in_parent(length_in_bytes)?;
            if let Some(wrapper_end) = annotation_wrapper_end {
                if self.bytes_read + length_in_bytes != wrapper_end {
                    return decoding_error(format!(
                        "annotation wrapper length disagrees with its enclosed value (offset {header_offset})"
                    ));
                }
            }

            let ion_type = type_code.as_type()?;
            self.value = Some(EncodedValue {
                ion_type,
                type_code,
                length_code,
                is_null,
                length_in_bytes,
                field_id,
            });
            self.state = ReaderState::OnValue;
            return Ok(RawStreamItem::nullable_value(ion_type, is_null));
        }
    }

    /// Returns the stream item the cursor is currently positioned on.
    pub fn current(&self) -> RawStreamItem {
        match (&self.state, &self.value) {
            (ReaderState::Ready, _) | (_, None) => RawStreamItem::Nothing,
            (_, Some(value)) => RawStreamItem::nullable_value(value.ion_type, value.is_null),
        }
    }

    /// If the cursor is positioned on a value, returns that value's Ion type.
    pub fn ion_type(&self) -> Option<IonType> {
        self.value.as_ref().map(|value| value.ion_type)
    }

    /// Returns `true` if the cursor is positioned on a null of any type.
    pub fn is_null(&self) -> bool {
        self.value
            .as_ref()
            .map(|value| value.is_null)
            .unwrap_or(false)
    }

    /// The encoded length of the current value's body in bytes, before any of it has
    /// been consumed.
    pub fn value_length(&self) -> Option<usize> {
        self.value.as_ref().map(|value| value.length_in_bytes)
    }

    /// The annotations on the current value, in order, as symbol IDs.
    pub fn annotations(&self) -> &[SymbolId] {
        &self.annotations
    }

    pub fn has_annotations(&self) -> bool {
        !self.annotations.is_empty()
    }

    /// If the current value is a field of a struct, returns the symbol ID of its name.
    pub fn field_id(&self) -> Option<SymbolId> {
        self.value.as_ref().and_then(|value| value.field_id)
    }

    /// The number of containers the cursor has stepped into without stepping out.
    pub fn depth(&self) -> usize {
        self.parents.len()
    }

    /// If the cursor is inside a container, returns that container's [IonType].
    pub fn parent_type(&self) -> Option<IonType> {
        self.parents.last().map(|frame| frame.ion_type)
    }

    fn is_in_struct(&self) -> bool {
        self.parent_type() == Some(IonType::Struct)
    }

    /// Positions the cursor at the beginning of the current container value's children.
    pub fn step_in(&mut self) -> IonResult<()> {
        if self.state != ReaderState::OnValue {
            return illegal_operation("step_in is only valid when positioned on a container value");
        }
        let value = self
            .value
            .as_ref()
            .ok_or_else(|| illegal_operation_raw("the reader is not positioned on a value"))?;
        if !value.ion_type.is_container() {
            return illegal_operation(format!("cannot step into a {}", value.ion_type));
        }
        if value.is_null {
            return illegal_operation(format!("cannot step into a null.{}", value.ion_type));
        }
        self.parents.push(ContainerFrame {
            ion_type: value.ion_type,
            exclusive_end: self.bytes_read + value.length_in_bytes,
        });
        self.state = ReaderState::Ready;
        self.value = None;
        self.annotations.clear();
        Ok(())
    }

    /// Positions the cursor after the end of the container currently being traversed,
    /// skipping any of its values that have not been read.
    pub fn step_out(&mut self) -> IonResult<()> {
        let frame = self
            .parents
            .pop()
            .ok_or_else(|| illegal_operation_raw("cannot step out at the top level"))?;
        let bytes_to_skip = frame.exclusive_end - self.bytes_read;
        self.skip_bytes(bytes_to_skip)?;
        self.state = ReaderState::Ready;
        self.value = None;
        self.annotations.clear();
        Ok(())
    }

    /// Reads the current value, whatever its type.
    pub fn read_value(&mut self) -> IonResult<RawValueRef<'_>> {
        let (ion_type, is_null) = match self.value.as_ref() {
            Some(value) => (value.ion_type, value.is_null),
            None => return illegal_operation("the reader is not positioned on a value"),
        };
        if is_null {
            // Typed nulls have no body; the cursor can move straight on
            self.state = ReaderState::ValueConsumed;
            return Ok(RawValueRef::Null(ion_type));
        }
        let value_ref = match ion_type {
            IonType::Null => RawValueRef::Null(IonType::Null),
            IonType::Bool => RawValueRef::Bool(self.read_bool()?),
            IonType::Int => RawValueRef::Int(self.read_int()?),
            IonType::Float => RawValueRef::Float(self.read_f64()?),
            IonType::Decimal => RawValueRef::Decimal(self.read_decimal()?),
            IonType::Timestamp => RawValueRef::Timestamp(self.read_timestamp()?),
            IonType::Symbol => RawValueRef::Symbol(self.read_symbol_id()?),
            IonType::String => RawValueRef::String(self.read_str()?),
            IonType::Clob => RawValueRef::Clob(self.read_clob_bytes()?),
            IonType::Blob => RawValueRef::Blob(self.read_blob_bytes()?),
            IonType::List => RawValueRef::List,
            IonType::SExp => RawValueRef::SExp,
            IonType::Struct => RawValueRef::Struct,
        };
        Ok(value_ref)
    }

    /// Reads the current value as a null, returning its Ion type.
    pub fn read_null(&mut self) -> IonResult<IonType> {
        let value = self.current_value("read_null")?;
        if !value.is_null {
            return illegal_operation("the current value is not a null");
        }
        let ion_type = value.ion_type;
        self.state = ReaderState::ValueConsumed;
        Ok(ion_type)
    }

    /// Reads the current value as a boolean.
    pub fn read_bool(&mut self) -> IonResult<bool> {
        let value = self.expect_value_of_type(IonType::Bool, "read_bool")?;
        // The value lives in the tag byte's length nibble; next() already rejected
        // anything other than 0, 1, and the null marker.
        let boolean = value.length_code == 1;
        self.state = ReaderState::ValueConsumed;
        Ok(boolean)
    }

    /// Reads the current value as an integer of arbitrary size.
    pub fn read_int(&mut self) -> IonResult<Int> {
        let value = self.expect_value_of_type(IonType::Int, "read_int")?;
        let is_negative = value.type_code == IonTypeCode::NegativeInteger;
        let length = value.length_in_bytes;
        let magnitude = self.read_uint_body(length)?;
        let int = match (&magnitude.value().data, is_negative) {
            (UIntData::U64(0), true) => {
                return decoding_error("found a negative int with a zero magnitude");
            }
            (UIntData::U64(magnitude), false) => match i64::try_from(*magnitude) {
                Ok(small) => Int::from(small),
                Err(_) => Int::from(BigInt::from(*magnitude)),
            },
            (UIntData::U64(magnitude), true) => {
                if *magnitude <= i64::MAX as u64 {
                    Int::from(-(*magnitude as i64))
                } else if *magnitude == (i64::MAX as u64) + 1 {
                    Int::from(i64::MIN)
                } else {
                    Int::from(-BigInt::from(*magnitude))
                }
            }
            (UIntData::BigUInt(magnitude), negative) => {
                let sign = if negative { BigSign::Minus } else { BigSign::Plus };
                Int::from(BigInt::from_biguint(sign, magnitude.clone()))
            }
        };
        self.state = ReaderState::ValueConsumed;
        Ok(int)
    }

    /// Reads the current value as an integer, failing if it will not fit in an i64.
    pub fn read_i64(&mut self) -> IonResult<i64> {
        self.read_int()?
            .as_i64()
            .ok_or_else(|| decoding_error_raw("the current int is too large to fit in an i64"))
    }

    /// Reads the current value as a float.
    pub fn read_f64(&mut self) -> IonResult<f64> {
        let value = self.expect_value_of_type(IonType::Float, "read_f64")?;
        let length = value.length_in_bytes;
        let mut bits: u64 = 0;
        for _ in 0..length {
            bits = (bits << 8) | self.next_byte_expected()? as u64;
        }
        let float = match length {
            0 => 0f64,
            4 => f32::from_bits(bits as u32) as f64,
            8 => f64::from_bits(bits),
            // next() rejects all other lengths
            _ => return decoding_error("floats must be 0, 4, or 8 bytes long"),
        };
        self.state = ReaderState::ValueConsumed;
        Ok(float)
    }

    /// Reads the current value as a float, truncating the mantissa if needed.
    pub fn read_f32(&mut self) -> IonResult<f32> {
        self.read_f64().map(|float| float as f32)
    }

    /// Reads the current value as a [Decimal].
    pub fn read_decimal(&mut self) -> IonResult<Decimal> {
        let value = self.expect_value_of_type(IonType::Decimal, "read_decimal")?;
        let length = value.length_in_bytes;
        if length == 0 {
            self.state = ReaderState::ValueConsumed;
            return Ok(Decimal::new(0u64, 0));
        }
        let exponent_var_int = self.read_var_int()?;
        let exponent = exponent_var_int.value();
        if exponent_var_int.size_in_bytes() > length {
            return decoding_error("the decimal's exponent overran the value's length");
        }
        if exponent < i32::MIN as i64 || exponent > i32::MAX as i64 {
            return decoding_error(format!(
                "the decimal exponent {exponent} is outside the supported (i32) range"
            ));
        }
        let coefficient_length = length - exponent_var_int.size_in_bytes();
        let coefficient = self.read_int_body(coefficient_length)?;
        self.state = ReaderState::ValueConsumed;
        Ok(Decimal::new(coefficient.into_coefficient(), exponent))
    }

    /// Reads the current value as a [Timestamp].
    pub fn read_timestamp(&mut self) -> IonResult<Timestamp> {
        let value = self.expect_value_of_type(IonType::Timestamp, "read_timestamp")?;
        let length = value.length_in_bytes;
        let value_end = self.bytes_read + length;

        let offset_var_int = self.read_var_int()?;
        let offset_minutes: Option<i64> = if offset_var_int.is_negative_zero() {
            None
        } else {
            Some(offset_var_int.value())
        };

        let year = self.read_var_uint()?.value();
        if !(1..=9999).contains(&year) {
            return decoding_error(format!("the timestamp year {year} is outside the range 1-9999"));
        }

        let mut month: Option<u32> = None;
        let mut day: Option<u32> = None;
        let mut hour: Option<u32> = None;
        let mut minute: Option<u32> = None;
        let mut second: Option<u32> = None;
        let mut fraction: Option<Decimal> = None;

        if self.bytes_read < value_end {
            month = Some(self.read_var_uint()?.value() as u32);
        }
        if self.bytes_read < value_end {
            day = Some(self.read_var_uint()?.value() as u32);
        }
        if self.bytes_read < value_end {
            hour = Some(self.read_var_uint()?.value() as u32);
            if self.bytes_read >= value_end {
                return decoding_error("timestamps cannot specify an hour without a minute");
            }
            minute = Some(self.read_var_uint()?.value() as u32);
        }
        if self.bytes_read < value_end {
            second = Some(self.read_var_uint()?.value() as u32);
        }
        if self.bytes_read < value_end {
            let exponent_var_int = self.read_var_int()?;
            if self.bytes_read > value_end {
                return decoding_error("the timestamp's fraction overran the value's length");
            }
            let coefficient_length = value_end - self.bytes_read;
            let coefficient = self.read_int_body(coefficient_length)?;
            fraction = Some(Decimal::new(
                coefficient.into_coefficient(),
                exponent_var_int.value(),
            ));
        }
        if self.bytes_read != value_end {
            return decoding_error("the timestamp's components overran the value's length");
        }

        let precision = if second.is_some() {
            Precision::Second
        } else if hour.is_some() {
            Precision::HourAndMinute
        } else if day.is_some() {
            Precision::Day
        } else if month.is_some() {
            Precision::Month
        } else {
            Precision::Year
        };

        // An explicitly-encoded fraction of zero digits (0d0) adds nothing; normalize it
        // away so that equality does not depend on whether it was written.
        if let Some(ref decimal) = fraction {
            if decimal.is_zero()
                && decimal.exponent() >= 0
                && !decimal.coefficient().is_negative_zero()
            {
                fraction = None;
            }
        }

        let (fractional_seconds, nanoseconds) = match fraction {
            None => (None, 0u32),
            Some(decimal) => {
                let nanoseconds = fraction_to_nanoseconds(&decimal).ok_or_else(|| {
                    decoding_error_raw(
                        "the timestamp's fractional seconds are outside the interval [0.0, 1.0)",
                    )
                })?;
                let exponent = decimal.exponent();
                let mantissa = if (-9..=-1).contains(&exponent) {
                    // The nanosecond field can represent this fraction losslessly
                    Mantissa::Digits(-exponent as u32)
                } else {
                    Mantissa::Arbitrary(decimal)
                };
                (Some(mantissa), nanoseconds)
            }
        };

        let date = NaiveDate::from_ymd_opt(year as i32, month.unwrap_or(1), day.unwrap_or(1))
            .ok_or_else(|| decoding_error_raw("the timestamp's date components are invalid"))?;
        let utc_date_time = date
            .and_hms_nano_opt(
                hour.unwrap_or(0),
                minute.unwrap_or(0),
                second.unwrap_or(0),
                nanoseconds,
            )
            .ok_or_else(|| decoding_error_raw("the timestamp's time components are invalid"))?;

        // The encoded components are UTC; apply the offset to recover the local time
        let (date_time, offset) = match offset_minutes {
            None => (utc_date_time, None),
            Some(minutes) => {
                let offset = i32::try_from(minutes)
                    .ok()
                    .and_then(|minutes| minutes.checked_mul(60))
                    .and_then(chrono::FixedOffset::east_opt)
                    .ok_or_else(|| {
                        decoding_error_raw(format!(
                            "the timestamp offset ({minutes} minutes) is outside the supported range"
                        ))
                    })?;
                let local = utc_date_time
                    .checked_add_signed(Duration::minutes(minutes))
                    .ok_or_else(|| {
                        decoding_error_raw("applying the timestamp's offset overflowed its date")
                    })?;
                (local, Some(offset))
            }
        };

        self.state = ReaderState::ValueConsumed;
        Ok(Timestamp {
            date_time,
            offset,
            precision,
            fractional_seconds,
        })
    }

    /// Reads the current symbol value's symbol ID.
    pub fn read_symbol_id(&mut self) -> IonResult<SymbolId> {
        let value = self.expect_value_of_type(IonType::Symbol, "read_symbol_id")?;
        let length = value.length_in_bytes;
        let magnitude = self.read_uint_body(length)?;
        // next() capped symbol lengths at 8 bytes, so the u64 conversion cannot fail
        let sid = magnitude
            .value()
            .as_u64()
            .ok_or_else(|| decoding_error_raw("symbol ID does not fit in a u64"))?;
        self.state = ReaderState::ValueConsumed;
        Ok(sid as SymbolId)
    }

    /// Reads the current string value, borrowing the text from the reader's internal buffer.
    pub fn read_str(&mut self) -> IonResult<&str> {
        let value = self.expect_value_of_type(IonType::String, "read_str")?;
        let length = value.length_in_bytes;
        self.read_body_into_buffer(length)?;
        self.state = ReaderState::ValueConsumed;
        std::str::from_utf8(&self.buffer)
            .map_err(|_| decoding_error_raw("string value contains invalid UTF-8"))
    }

    /// Reads the current string value into a freshly allocated `String`.
    pub fn read_string(&mut self) -> IonResult<String> {
        self.read_str().map(str::to_string)
    }

    /// Reads the current blob value, borrowing the bytes from the reader's internal buffer.
    pub fn read_blob_bytes(&mut self) -> IonResult<&[u8]> {
        let value = self.expect_value_of_type(IonType::Blob, "read_blob_bytes")?;
        let length = value.length_in_bytes;
        self.read_body_into_buffer(length)?;
        self.state = ReaderState::ValueConsumed;
        Ok(&self.buffer)
    }

    pub fn read_blob(&mut self) -> IonResult<Vec<u8>> {
        self.read_blob_bytes().map(<[u8]>::to_vec)
    }

    /// Reads the current clob value, borrowing the bytes from the reader's internal buffer.
    pub fn read_clob_bytes(&mut self) -> IonResult<&[u8]> {
        let value = self.expect_value_of_type(IonType::Clob, "read_clob_bytes")?;
        let length = value.length_in_bytes;
        self.read_body_into_buffer(length)?;
        self.state = ReaderState::ValueConsumed;
        Ok(&self.buffer)
    }

    pub fn read_clob(&mut self) -> IonResult<Vec<u8>> {
        self.read_clob_bytes().map(<[u8]>::to_vec)
    }

    // --- helpers -------------------------------------------------------------------

    fn current_value(&self, operation: &str) -> IonResult<&EncodedValue> {
        match self.state {
            ReaderState::Ready => {
                illegal_operation(format!("{operation}: the reader is not positioned on a value"))
            }
            ReaderState::ValueConsumed => illegal_operation(format!(
                "{operation}: the current value has already been read"
            )),
            ReaderState::OnValue => self.value.as_ref().ok_or_else(|| {
                illegal_operation_raw(format!(
                    "{operation}: the reader is not positioned on a value"
                ))
            }),
        }
    }

    fn expect_value_of_type(&self, expected: IonType, operation: &str) -> IonResult<EncodedValue> {
        let value = self.current_value(operation)?;
        if value.is_null {
            return illegal_operation(format!(
                "{operation}: the current value is a null.{}",
                value.ion_type
            ));
        }
        if value.ion_type != expected {
            return illegal_operation(format!(
                "{operation}: the current value is a {}, not a {}",
                value.ion_type, expected
            ));
        }
        Ok(value.clone())
    }

    fn read_ivm_payload(&mut self, header_offset: usize) -> IonResult<RawStreamItem> {
        let major = self.next_byte_expected()?;
        let minor = self.next_byte_expected()?;
        let terminator = self.next_byte_expected()?;
        if terminator != 0xEA {
            return decoding_error(format!(
                "invalid binary version marker at offset {header_offset}"
            ));
        }
        if (major, minor) != (1, 0) {
            return decoding_error(format!(
                "cannot read Ion v{major}.{minor}; only v1.0 is supported"
            ));
        }
        self.ion_version = (major, minor);
        Ok(RawStreamItem::VersionMarker(major, minor))
    }

    /// Resolves a tag byte's length nibble, reading a trailing VarUInt when required.
    fn read_length(&mut self, length_code: u8) -> IonResult<usize> {
        if length_code == LENGTH_CODE_VAR_UINT {
            return Ok(self.read_var_uint()?.value() as usize);
        }
        Ok(length_code as usize)
    }

    /// Fails if a body of `length` bytes would run past the end of the parent container.
    fn check_fits_in_parent(&self, length: usize) -> IonResult<()> {
        if let Some(parent) = self.parents.last() {
            if self.bytes_read + length > parent.exclusive_end {
                return decoding_error(format!(
                    "the value at offset {} (length {}) runs past the end of its parent container ({})",
                    self.bytes_read, length, parent.exclusive_end
                ));
            }
        }
        Ok(())
    }

    fn next_byte(&mut self) -> IonResult<Option<u8>> {
        let byte = self.data_source.next_byte()?;
        if byte.is_some() {
            self.bytes_read += 1;
        }
        Ok(byte)
    }

    fn next_byte_expected(&mut self) -> IonResult<u8> {
        match self.next_byte()? {
            Some(byte) => Ok(byte),
            None => incomplete_data_error(self.bytes_read),
        }
    }

    fn skip_bytes(&mut self, number_of_bytes: usize) -> IonResult<()> {
        if number_of_bytes == 0 {
            return Ok(());
        }
        self.data_source
            .skip_bytes(number_of_bytes)
            .map_err(|error| self.error_at_current_offset(error))?;
        self.bytes_read += number_of_bytes;
        Ok(())
    }

    fn read_var_uint(&mut self) -> IonResult<VarUInt> {
        let var_uint = VarUInt::read(&mut self.data_source)
            .map_err(|error| self.error_at_current_offset(error))?;
        self.bytes_read += var_uint.size_in_bytes();
        Ok(var_uint)
    }

    fn read_var_int(&mut self) -> IonResult<VarInt> {
        let var_int = VarInt::read(&mut self.data_source)
            .map_err(|error| self.error_at_current_offset(error))?;
        self.bytes_read += var_int.size_in_bytes();
        Ok(var_int)
    }

    fn read_uint_body(&mut self, length: usize) -> IonResult<DecodedUInt> {
        let magnitude = DecodedUInt::read(&mut self.data_source, length)
            .map_err(|error| self.error_at_current_offset(error))?;
        self.bytes_read += magnitude.size_in_bytes();
        Ok(magnitude)
    }

    fn read_int_body(&mut self, length: usize) -> IonResult<DecodedInt> {
        let int = DecodedInt::read(&mut self.data_source, length)
            .map_err(|error| self.error_at_current_offset(error))?;
        self.bytes_read += int.size_in_bytes();
        Ok(int)
    }

    fn read_body_into_buffer(&mut self, length: usize) -> IonResult<()> {
        let offset = self.bytes_read;
        self.data_source
            .read_exact_into(length, &mut self.buffer)
            .map_err(|error| match error {
                IonError::Incomplete { .. } => IonError::Incomplete { offset },
                other => other,
            })?;
        self.bytes_read += length;
        Ok(())
    }

    /// The primitive readers do not know their position in the stream; rewrite any
    /// incomplete-data error they report to carry the reader's absolute offset.
    fn error_at_current_offset(&self, error: IonError) -> IonError {
        match error {
            IonError::Incomplete { .. } => IonError::Incomplete {
                offset: self.bytes_read,
            },
            other => other,
        }
    }
}
