use crate::result::{decoding_error, IonResult};
use crate::types::{Decimal, Int, IonType, SymbolId, Timestamp};

/// A reference to a value read from the raw (symbol-unaware) level of a binary stream.
/// Container variants simply indicate their Ion type; to access their nested data, the
/// reader must step in.
#[derive(Debug, PartialEq)]
pub enum RawValueRef<'a> {
    Null(IonType),
    Bool(bool),
    Int(Int),
    Float(f64),
    Decimal(Decimal),
    Timestamp(Timestamp),
    String(&'a str),
    Symbol(SymbolId),
    Blob(&'a [u8]),
    Clob(&'a [u8]),
    List,
    SExp,
    Struct,
}

impl<'a> RawValueRef<'a> {
    pub fn expect_null(self) -> IonResult<IonType> {
        if let RawValueRef::Null(ion_type) = self {
            Ok(ion_type)
        } else {
            decoding_error("expected a null")
        }
    }

    pub fn expect_bool(self) -> IonResult<bool> {
        if let RawValueRef::Bool(b) = self {
            Ok(b)
        } else {
            decoding_error("expected a bool")
        }
    }

    pub fn expect_int(self) -> IonResult<Int> {
        if let RawValueRef::Int(i) = self {
            Ok(i)
        } else {
            decoding_error("expected an int")
        }
    }

    pub fn expect_i64(self) -> IonResult<i64> {
        self.expect_int()?
            .as_i64()
            .ok_or_else(|| crate::result::decoding_error_raw("expected an int in the i64 range"))
    }

    pub fn expect_float(self) -> IonResult<f64> {
        if let RawValueRef::Float(f) = self {
            Ok(f)
        } else {
            decoding_error("expected a float")
        }
    }

    pub fn expect_decimal(self) -> IonResult<Decimal> {
        if let RawValueRef::Decimal(d) = self {
            Ok(d)
        } else {
            decoding_error("expected a decimal")
        }
    }

    pub fn expect_timestamp(self) -> IonResult<Timestamp> {
        if let RawValueRef::Timestamp(t) = self {
            Ok(t)
        } else {
            decoding_error("expected a timestamp")
        }
    }

    pub fn expect_string(self) -> IonResult<&'a str> {
        if let RawValueRef::String(s) = self {
            Ok(s)
        } else {
            decoding_error("expected a string")
        }
    }

    pub fn expect_symbol(self) -> IonResult<SymbolId> {
        if let RawValueRef::Symbol(s) = self {
            Ok(s)
        } else {
            decoding_error("expected a symbol")
        }
    }

    pub fn expect_blob(self) -> IonResult<&'a [u8]> {
        if let RawValueRef::Blob(b) = self {
            Ok(b)
        } else {
            decoding_error("expected a blob")
        }
    }

    pub fn expect_clob(self) -> IonResult<&'a [u8]> {
        if let RawValueRef::Clob(c) = self {
            Ok(c)
        } else {
            decoding_error("expected a clob")
        }
    }

    pub fn expect_list(self) -> IonResult<()> {
        if let RawValueRef::List = self {
            Ok(())
        } else {
            decoding_error("expected a list")
        }
    }

    pub fn expect_sexp(self) -> IonResult<()> {
        if let RawValueRef::SExp = self {
            Ok(())
        } else {
            decoding_error("expected a sexp")
        }
    }

    pub fn expect_struct(self) -> IonResult<()> {
        if let RawValueRef::Struct = self {
            Ok(())
        } else {
            decoding_error("expected a struct")
        }
    }
}
