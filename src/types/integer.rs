use std::cmp::Ordering;
use std::fmt;
use std::ops::Neg;

use num_bigint::{BigInt, BigUint, Sign as BigSign};
use num_traits::{ToPrimitive, Zero};

/// An arbitrary-precision signed integer.
///
/// Most integers that appear in Ion streams fit comfortably in an `i64`; `Int` stores those
/// without allocating and transparently falls back to a [BigInt] for anything larger.
#[derive(Debug, Clone)]
pub struct Int {
    pub(crate) data: IntData,
}

#[derive(Debug, Clone)]
pub(crate) enum IntData {
    I64(i64),
    BigInt(BigInt),
}

impl Int {
    /// If this value is small enough to fit in an `i64`, returns `Some(i64)`; otherwise
    /// returns `None`.
    pub fn as_i64(&self) -> Option<i64> {
        match &self.data {
            IntData::I64(value) => Some(*value),
            IntData::BigInt(value) => value.to_i64(),
        }
    }

    pub fn is_zero(&self) -> bool {
        match &self.data {
            IntData::I64(value) => *value == 0,
            IntData::BigInt(value) => value.is_zero(),
        }
    }

    /// Returns `true` if this value is less than zero.
    pub fn is_negative(&self) -> bool {
        match &self.data {
            IntData::I64(value) => *value < 0,
            IntData::BigInt(value) => value.sign() == BigSign::Minus,
        }
    }

    /// The magnitude of this integer as an unsigned value.
    pub fn unsigned_abs(&self) -> UInt {
        match &self.data {
            IntData::I64(value) => UInt::from(value.unsigned_abs()),
            IntData::BigInt(value) => UInt::from(value.magnitude().clone()),
        }
    }

    // Used when comparing mixed representations.
    fn to_big_int(&self) -> BigInt {
        match &self.data {
            IntData::I64(value) => BigInt::from(*value),
            IntData::BigInt(value) => value.clone(),
        }
    }
}

impl PartialEq for Int {
    fn eq(&self, other: &Self) -> bool {
        use IntData::*;
        match (&self.data, &other.data) {
            (I64(this), I64(that)) => this == that,
            (BigInt(this), BigInt(that)) => this == that,
            _ => self.to_big_int() == other.to_big_int(),
        }
    }
}

impl Eq for Int {}

impl PartialOrd for Int {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Int {
    fn cmp(&self, other: &Self) -> Ordering {
        use IntData::*;
        match (&self.data, &other.data) {
            (I64(this), I64(that)) => this.cmp(that),
            (BigInt(this), BigInt(that)) => this.cmp(that),
            _ => self.to_big_int().cmp(&other.to_big_int()),
        }
    }
}

impl Neg for Int {
    type Output = Int;

    fn neg(self) -> Self::Output {
        match self.data {
            IntData::I64(value) => match value.checked_neg() {
                Some(negated) => Int::from(negated),
                // i64::MIN; its magnitude is one more than i64::MAX
                None => Int::from(-BigInt::from(value)),
            },
            IntData::BigInt(value) => Int::from(-value),
        }
    }
}

impl From<i64> for Int {
    fn from(value: i64) -> Self {
        Int {
            data: IntData::I64(value),
        }
    }
}

impl From<i32> for Int {
    fn from(value: i32) -> Self {
        Int::from(value as i64)
    }
}

impl From<BigInt> for Int {
    fn from(value: BigInt) -> Self {
        Int {
            data: IntData::BigInt(value),
        }
    }
}

impl From<UInt> for Int {
    fn from(value: UInt) -> Self {
        match value.data {
            UIntData::U64(magnitude) => match i64::try_from(magnitude) {
                Ok(value) => Int::from(value),
                Err(_) => Int::from(BigInt::from(magnitude)),
            },
            UIntData::BigUInt(magnitude) => Int::from(BigInt::from(magnitude)),
        }
    }
}

impl fmt::Display for Int {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data {
            IntData::I64(value) => write!(f, "{value}"),
            IntData::BigInt(value) => write!(f, "{value}"),
        }
    }
}

/// An arbitrary-precision unsigned integer, used to represent the magnitude component of
/// sign-and-magnitude encodings.
#[derive(Debug, Clone)]
pub struct UInt {
    pub(crate) data: UIntData,
}

#[derive(Debug, Clone)]
pub(crate) enum UIntData {
    U64(u64),
    BigUInt(BigUint),
}

impl UInt {
    pub fn as_u64(&self) -> Option<u64> {
        match &self.data {
            UIntData::U64(value) => Some(*value),
            UIntData::BigUInt(value) => value.to_u64(),
        }
    }

    pub fn is_zero(&self) -> bool {
        match &self.data {
            UIntData::U64(value) => *value == 0,
            UIntData::BigUInt(value) => value.is_zero(),
        }
    }

    /// The minimal big-endian byte representation of this magnitude. Zero produces an
    /// empty Vec; callers that need an explicit zero byte must add it themselves.
    pub(crate) fn to_be_bytes(&self) -> Vec<u8> {
        match &self.data {
            UIntData::U64(value) => {
                let leading_empty_bytes = (value.leading_zeros() / 8) as usize;
                value.to_be_bytes()[leading_empty_bytes..].to_vec()
            }
            UIntData::BigUInt(value) => {
                if value.is_zero() {
                    // BigUint::to_bytes_be() represents zero as [0u8]
                    return Vec::new();
                }
                value.to_bytes_be()
            }
        }
    }

    fn to_big_uint(&self) -> BigUint {
        match &self.data {
            UIntData::U64(value) => BigUint::from(*value),
            UIntData::BigUInt(value) => value.clone(),
        }
    }
}

impl PartialEq for UInt {
    fn eq(&self, other: &Self) -> bool {
        use UIntData::*;
        match (&self.data, &other.data) {
            (U64(this), U64(that)) => this == that,
            (BigUInt(this), BigUInt(that)) => this == that,
            _ => self.to_big_uint() == other.to_big_uint(),
        }
    }
}

impl Eq for UInt {}

impl PartialOrd for UInt {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for UInt {
    fn cmp(&self, other: &Self) -> Ordering {
        use UIntData::*;
        match (&self.data, &other.data) {
            (U64(this), U64(that)) => this.cmp(that),
            (BigUInt(this), BigUInt(that)) => this.cmp(that),
            _ => self.to_big_uint().cmp(&other.to_big_uint()),
        }
    }
}

impl From<u64> for UInt {
    fn from(value: u64) -> Self {
        UInt {
            data: UIntData::U64(value),
        }
    }
}

impl From<u32> for UInt {
    fn from(value: u32) -> Self {
        UInt::from(value as u64)
    }
}

impl From<usize> for UInt {
    fn from(value: usize) -> Self {
        UInt::from(value as u64)
    }
}

impl From<BigUint> for UInt {
    fn from(value: BigUint) -> Self {
        // Normalize small magnitudes to the u64 representation so that structural
        // comparisons and encodings do not depend on how the value was produced.
        match value.to_u64() {
            Some(small) => UInt::from(small),
            None => UInt {
                data: UIntData::BigUInt(value),
            },
        }
    }
}

impl fmt::Display for UInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data {
            UIntData::U64(value) => write!(f, "{value}"),
            UIntData::BigUInt(value) => write!(f, "{value}"),
        }
    }
}
