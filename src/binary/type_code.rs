use std::convert::TryFrom;

use crate::result::{decoding_error, IonError, IonResult};
use crate::types::IonType;

/// Represents the possible types that can appear in a tag byte's high nibble.
/// A given [IonTypeCode] may or may not correspond to an [IonType]; for example,
/// the annotation code wraps a value of another type rather than being a type itself.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum IonTypeCode {
    NullOrNop,       // 0x0
    Boolean,         // 0x1
    PositiveInteger, // 0x2
    NegativeInteger, // 0x3
    Float,           // 0x4
    Decimal,         // 0x5
    Timestamp,       // 0x6
    Symbol,          // 0x7
    String,          // 0x8
    Clob,            // 0x9
    Blob,            // 0xA
    List,            // 0xB
    SExpression,     // 0xC
    Struct,          // 0xD
    AnnotationOrIvm, // 0xE
    Reserved,        // 0xF
}

impl IonTypeCode {
    /// Attempts to convert this type code to the [IonType] it represents.
    pub fn as_type(&self) -> IonResult<IonType> {
        use IonTypeCode::*;
        let ion_type = match self {
            NullOrNop => IonType::Null,
            Boolean => IonType::Bool,
            PositiveInteger | NegativeInteger => IonType::Int,
            Float => IonType::Float,
            Decimal => IonType::Decimal,
            Timestamp => IonType::Timestamp,
            Symbol => IonType::Symbol,
            String => IonType::String,
            Clob => IonType::Clob,
            Blob => IonType::Blob,
            List => IonType::List,
            SExpression => IonType::SExp,
            Struct => IonType::Struct,
            _ => {
                return decoding_error(format!("type code {self:?} has no corresponding Ion type"))
            }
        };
        Ok(ion_type)
    }

    /// The high nibble this type code occupies in a tag byte.
    pub fn to_nibble(self) -> u8 {
        use IonTypeCode::*;
        match self {
            NullOrNop => 0,
            Boolean => 1,
            PositiveInteger => 2,
            NegativeInteger => 3,
            Float => 4,
            Decimal => 5,
            Timestamp => 6,
            Symbol => 7,
            String => 8,
            Clob => 9,
            Blob => 10,
            List => 11,
            SExpression => 12,
            Struct => 13,
            AnnotationOrIvm => 14,
            Reserved => 15,
        }
    }
}

impl TryFrom<u8> for IonTypeCode {
    type Error = IonError;

    /// Attempts to convert the high nibble of a tag byte into an `IonTypeCode`.
    fn try_from(nibble: u8) -> Result<Self, Self::Error> {
        use IonTypeCode::*;
        let ion_type_code = match nibble {
            0 => NullOrNop,
            1 => Boolean,
            2 => PositiveInteger,
            3 => NegativeInteger,
            4 => Float,
            5 => Decimal,
            6 => Timestamp,
            7 => Symbol,
            8 => String,
            9 => Clob,
            10 => Blob,
            11 => List,
            12 => SExpression,
            13 => Struct,
            14 => AnnotationOrIvm,
            15 => Reserved,
            _ => {
                return decoding_error(format!("{nibble:?} is not a valid type code nibble"));
            }
        };
        Ok(ion_type_code)
    }
}

impl From<IonType> for IonTypeCode {
    /// The type code used when encoding a value of the given type. `Int` maps to the
    /// positive integer code; the writer switches to the negative code based on sign.
    fn from(ion_type: IonType) -> Self {
        use IonTypeCode::*;
        match ion_type {
            IonType::Null => NullOrNop,
            IonType::Bool => Boolean,
            IonType::Int => PositiveInteger,
            IonType::Float => Float,
            IonType::Decimal => Decimal,
            IonType::Timestamp => Timestamp,
            IonType::Symbol => Symbol,
            IonType::String => String,
            IonType::Clob => Clob,
            IonType::Blob => Blob,
            IonType::List => List,
            IonType::SExp => SExpression,
            IonType::Struct => Struct,
        }
    }
}
