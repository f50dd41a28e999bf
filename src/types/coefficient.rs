use std::fmt;

use num_bigint::{BigInt, BigUint, Sign as BigSign};

use crate::types::integer::{Int, UInt};

/// Indicates whether the `Coefficient`'s magnitude is less than 0 (negative) or not (positive).
/// When the magnitude is zero, the sign is the only thing distinguishing `0` from `-0`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Sign {
    Negative,
    Positive,
}

/// A signed integer that can be used as the coefficient of a `Decimal` value or of a
/// timestamp's fractional seconds. This type does not consider `0` and `-0` equal; the
/// wire format preserves the distinction and so does this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coefficient {
    pub(crate) sign: Sign,
    pub(crate) magnitude: UInt,
}

impl Coefficient {
    pub fn new<I: Into<UInt>>(sign: Sign, magnitude: I) -> Coefficient {
        Coefficient {
            sign,
            magnitude: magnitude.into(),
        }
    }

    /// Constructs a new Coefficient with a value of `-0`.
    pub fn negative_zero() -> Coefficient {
        Coefficient {
            sign: Sign::Negative,
            magnitude: UInt::from(0u64),
        }
    }

    pub fn sign(&self) -> Sign {
        self.sign
    }

    pub fn magnitude(&self) -> &UInt {
        &self.magnitude
    }

    pub fn is_negative(&self) -> bool {
        self.sign == Sign::Negative
    }

    /// Returns `true` if the magnitude is zero, whatever the sign.
    pub fn is_zero(&self) -> bool {
        self.magnitude.is_zero()
    }

    /// Returns true if the Coefficient represents negative zero.
    pub fn is_negative_zero(&self) -> bool {
        self.sign == Sign::Negative && self.magnitude.is_zero()
    }

    pub(crate) fn to_big_int(&self) -> BigInt {
        let magnitude = match &self.magnitude.data {
            crate::types::integer::UIntData::U64(m) => BigUint::from(*m),
            crate::types::integer::UIntData::BigUInt(m) => m.clone(),
        };
        let sign = match self.sign {
            Sign::Negative => BigSign::Minus,
            Sign::Positive => BigSign::Plus,
        };
        BigInt::from_biguint(sign, magnitude)
    }
}

impl From<u64> for Coefficient {
    fn from(value: u64) -> Self {
        Coefficient::new(Sign::Positive, value)
    }
}

impl From<i64> for Coefficient {
    fn from(value: i64) -> Self {
        let sign = if value < 0 {
            Sign::Negative
        } else {
            Sign::Positive
        };
        Coefficient::new(sign, value.unsigned_abs())
    }
}

impl From<i32> for Coefficient {
    fn from(value: i32) -> Self {
        Coefficient::from(value as i64)
    }
}

impl From<BigInt> for Coefficient {
    fn from(value: BigInt) -> Self {
        let sign = match value.sign() {
            BigSign::Minus => Sign::Negative,
            BigSign::NoSign | BigSign::Plus => Sign::Positive,
        };
        Coefficient::new(sign, UInt::from(value.magnitude().clone()))
    }
}

impl From<Int> for Coefficient {
    fn from(value: Int) -> Self {
        let sign = if value.is_negative() {
            Sign::Negative
        } else {
            Sign::Positive
        };
        Coefficient::new(sign, value.unsigned_abs())
    }
}

impl fmt::Display for Coefficient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sign == Sign::Negative {
            write!(f, "-")?;
        }
        write!(f, "{}", self.magnitude)
    }
}
