use std::cmp::Ordering;
use std::fmt;

use num_bigint::BigInt;

use crate::types::coefficient::Coefficient;

/// An arbitrary-precision decimal: the pair `(coefficient, exponent)` with the logical value
/// `coefficient * 10^exponent`.
///
/// Equality is structural: `1.0` and `1.00` have the same numeric value but different
/// coefficients, and a round trip through the binary encoding preserves that difference.
/// Use [Decimal::value_cmp] to compare decimals numerically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decimal {
    pub(crate) coefficient: Coefficient,
    // The exponent is stored as an i64 for convenience at the API level; the binary reader
    // rejects encoded exponents that fall outside the range of an i32.
    pub(crate) exponent: i64,
}

impl Decimal {
    pub fn new<C: Into<Coefficient>>(coefficient: C, exponent: i64) -> Decimal {
        Decimal {
            coefficient: coefficient.into(),
            exponent,
        }
    }

    /// Constructs a Decimal with the value `-0d0`.
    pub fn negative_zero() -> Decimal {
        Decimal::negative_zero_with_exponent(0)
    }

    /// Constructs a Decimal with a coefficient of `-0` and the specified exponent.
    pub fn negative_zero_with_exponent(exponent: i64) -> Decimal {
        Decimal {
            coefficient: Coefficient::negative_zero(),
            exponent,
        }
    }

    pub fn coefficient(&self) -> &Coefficient {
        &self.coefficient
    }

    pub fn exponent(&self) -> i64 {
        self.exponent
    }

    pub fn is_zero(&self) -> bool {
        self.coefficient.is_zero()
    }

    /// Compares the numeric values of two decimals, ignoring their precision. Under this
    /// comparison `1.0`, `1.00`, and `1d0` are all equal, as are `0.` and `-0.`.
    pub fn value_cmp(&self, other: &Decimal) -> Ordering {
        let negative = |d: &Decimal| d.coefficient.is_negative() && !d.coefficient.is_zero();
        match (negative(self), negative(other)) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => {}
        }
        // Same sign; scale both coefficients to the smaller exponent and compare.
        let (scaled_self, scaled_other) = Self::rescale_pair(self, other);
        scaled_self.cmp(&scaled_other)
    }

    /// Returns `true` if the two decimals have the same numeric value.
    pub fn value_eq(&self, other: &Decimal) -> bool {
        self.value_cmp(other) == Ordering::Equal
    }

    fn rescale_pair(this: &Decimal, that: &Decimal) -> (BigInt, BigInt) {
        let this_coefficient = this.coefficient.to_big_int();
        let that_coefficient = that.coefficient.to_big_int();
        match this.exponent.cmp(&that.exponent) {
            Ordering::Equal => (this_coefficient, that_coefficient),
            Ordering::Greater => {
                let scale = Self::power_of_ten((this.exponent - that.exponent) as u32);
                (this_coefficient * scale, that_coefficient)
            }
            Ordering::Less => {
                let scale = Self::power_of_ten((that.exponent - this.exponent) as u32);
                (this_coefficient, that_coefficient * scale)
            }
        }
    }

    pub(crate) fn power_of_ten(exponent: u32) -> BigInt {
        BigInt::from(10u8).pow(exponent)
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Decimal::new(value, 0)
    }
}

impl From<i32> for Decimal {
    fn from(value: i32) -> Self {
        Decimal::new(value as i64, 0)
    }
}

impl From<u64> for Decimal {
    fn from(value: u64) -> Self {
        Decimal::new(value, 0)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // A debugging-friendly rendering, not the Ion text encoding.
        write!(f, "{}d{}", self.coefficient, self.exponent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Decimal::new(1i64, 0), Decimal::new(1i64, 0), true)]
    #[case(Decimal::new(10i64, -1), Decimal::new(1i64, 0), false)] // 1.0 vs 1 differ structurally
    #[case(Decimal::new(-5i64, 2), Decimal::new(-5i64, 2), true)]
    #[case(Decimal::negative_zero(), Decimal::new(0u64, 0), false)]
    fn structural_equality(#[case] a: Decimal, #[case] b: Decimal, #[case] expected: bool) {
        assert_eq!(a == b, expected);
    }

    #[rstest]
    #[case(Decimal::new(10i64, -1), Decimal::new(1i64, 0))] // 1.0 == 1
    #[case(Decimal::new(100i64, -2), Decimal::new(1i64, 0))] // 1.00 == 1
    #[case(Decimal::negative_zero(), Decimal::new(0u64, 0))] // -0. == 0.
    #[case(Decimal::new(1500i64, -3), Decimal::new(15i64, -1))]
    fn numeric_equality(#[case] a: Decimal, #[case] b: Decimal) {
        assert!(a.value_eq(&b));
    }

    #[rstest]
    #[case(Decimal::new(1i64, 0), Decimal::new(2i64, 0), Ordering::Less)]
    #[case(Decimal::new(-1i64, 2), Decimal::new(5i64, 0), Ordering::Less)]
    #[case(Decimal::new(5i64, 1), Decimal::new(49i64, 0), Ordering::Greater)]
    fn numeric_ordering(#[case] a: Decimal, #[case] b: Decimal, #[case] expected: Ordering) {
        assert_eq!(a.value_cmp(&b), expected);
    }

    #[test]
    fn negative_zero_retains_its_sign() {
        let negative_zero = Decimal::negative_zero_with_exponent(-3);
        assert!(negative_zero.is_zero());
        assert!(negative_zero.coefficient().is_negative_zero());
        assert_eq!(negative_zero.exponent(), -3);
    }
}
