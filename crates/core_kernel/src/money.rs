//! Money types with precise decimal arithmetic
//!
//! The lifecycle engine books every amount in a single currency (INR), so
//! `Money` is a thin newtype over `rust_decimal::Decimal`. Amounts are held
//! with 4 decimal places internally and rounded half-up to whole cents
//! whenever a figure is presented to a customer or a gateway.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};
use thiserror::Error;

/// Number of decimal places for presented amounts
pub const CENT_PLACES: u32 = 2;

/// Internal precision for intermediate calculations
const INTERNAL_PLACES: u32 = 4;

/// Errors that can occur during money operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Invalid percentage {0}: must lie between 0 and 100")]
    InvalidPercentage(Decimal),
}

/// A monetary amount in the policy currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Currency symbol used when displaying amounts
    pub const SYMBOL: &'static str = "₹";

    /// Creates a new Money value
    pub fn new(amount: Decimal) -> Self {
        Self(amount.round_dp(INTERNAL_PLACES))
    }

    /// Creates Money from whole currency units
    pub fn from_units(units: i64) -> Self {
        Self(Decimal::from(units))
    }

    /// Creates Money from minor units (paise)
    pub fn from_minor(minor_units: i64) -> Self {
        Self(Decimal::new(minor_units, CENT_PLACES))
    }

    /// Creates a zero amount
    pub fn zero() -> Self {
        Self(dec!(0))
    }

    /// Returns the amount
    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is strictly positive
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Returns true if the amount is negative
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Rounds half-up (away from zero at the midpoint) to whole cents
    ///
    /// ```rust
    /// use core_kernel::Money;
    /// use rust_decimal_macros::dec;
    ///
    /// assert_eq!(Money::new(dec!(10.125)).round_to_cents().amount(), dec!(10.13));
    /// ```
    pub fn round_to_cents(&self) -> Self {
        Self::from_exact(self.0)
    }

    /// Rounds an exact amount half-up to whole cents in a single step
    ///
    /// Skips the internal 4-place precision so that a figure built from
    /// unrounded parts is rounded exactly once.
    pub fn from_exact(amount: Decimal) -> Self {
        Self(amount.round_dp_with_strategy(CENT_PLACES, RoundingStrategy::MidpointAwayFromZero))
    }

    /// Multiplies by a scalar
    pub fn multiply(&self, factor: Decimal) -> Self {
        Self::new(self.0 * factor)
    }

    /// Divides by a scalar
    pub fn divide(&self, divisor: Decimal) -> Result<Self, MoneyError> {
        if divisor.is_zero() {
            return Err(MoneyError::DivisionByZero);
        }
        Ok(Self::new(self.0 / divisor))
    }

    /// Rejects zero and negative amounts
    pub fn ensure_positive(self) -> Result<Self, MoneyError> {
        if self.is_positive() {
            Ok(self)
        } else {
            Err(MoneyError::InvalidAmount(format!(
                "amount must be positive, got {}",
                self.0
            )))
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:.2}", Self::SYMBOL, self.round_to_cents().0)
    }
}

impl From<i64> for Money {
    fn from(units: i64) -> Self {
        Self::from_units(units)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.0 + other.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.0 - other.0)
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Mul<Decimal> for Money {
    type Output = Self;

    fn mul(self, factor: Decimal) -> Self {
        self.multiply(factor)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

/// A percentage rate such as a tax, penalty or deduction
///
/// Settings are captured as percentage points (5 means 5%); the rate stores
/// the decimal fraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Rate {
    /// The rate as a decimal (e.g., 0.05 for 5%)
    value: Decimal,
}

impl Rate {
    /// Creates a rate from a decimal value (e.g., 0.05 for 5%)
    pub fn new(value: Decimal) -> Self {
        Self { value }
    }

    /// Creates a rate from a percentage (e.g., 5.0 for 5%)
    pub fn from_percentage(percentage: Decimal) -> Self {
        Self {
            value: percentage / dec!(100),
        }
    }

    /// Creates a rate from a percentage, rejecting values outside [0, 100]
    pub fn checked_percentage(percentage: Decimal) -> Result<Self, MoneyError> {
        if percentage < dec!(0) || percentage > dec!(100) {
            return Err(MoneyError::InvalidPercentage(percentage));
        }
        Ok(Self::from_percentage(percentage))
    }

    /// A zero rate
    pub fn zero() -> Self {
        Self { value: dec!(0) }
    }

    /// Returns the rate as a decimal
    pub fn as_decimal(&self) -> Decimal {
        self.value
    }

    /// Returns the rate as a percentage
    pub fn as_percentage(&self) -> Decimal {
        self.value * dec!(100)
    }

    /// Returns `1 - rate`, the share retained after a deduction
    pub fn complement(&self) -> Self {
        Self {
            value: dec!(1) - self.value,
        }
    }

    /// Applies this rate to a money amount
    pub fn apply(&self, money: &Money) -> Money {
        money.multiply(self.value)
    }

    /// The unrounded share of `money` at this rate
    pub fn exact_share(&self, money: &Money) -> Decimal {
        money.amount() * self.value
    }
}

impl Default for Rate {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percentage().normalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_creation() {
        let m = Money::new(dec!(100.50));
        assert_eq!(m.amount(), dec!(100.50));
    }

    #[test]
    fn test_money_from_minor() {
        let m = Money::from_minor(10050);
        assert_eq!(m.amount(), dec!(100.50));
    }

    #[test]
    fn test_money_arithmetic() {
        let a = Money::new(dec!(100.00));
        let b = Money::new(dec!(50.00));

        assert_eq!((a + b).amount(), dec!(150.00));
        assert_eq!((a - b).amount(), dec!(50.00));
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(Money::new(dec!(2624.995)).round_to_cents().amount(), dec!(2625.00));
        assert_eq!(Money::new(dec!(39.994)).round_to_cents().amount(), dec!(39.99));
    }

    #[test]
    fn test_rate_application() {
        let rate = Rate::from_percentage(dec!(5.0));
        let amount = Money::from_units(2500);

        assert_eq!(rate.apply(&amount).amount(), dec!(125));
    }

    #[test]
    fn test_exact_share_keeps_full_precision() {
        let rate = Rate::from_percentage(dec!(0.0121));
        let amount = Money::from_units(41);
        assert_eq!(rate.exact_share(&amount), dec!(0.004961));
        assert_eq!(rate.apply(&amount).amount(), dec!(0.0050));
    }

    #[test]
    fn test_rate_complement() {
        let deduction = Rate::from_percentage(dec!(20));
        assert_eq!(deduction.complement().as_decimal(), dec!(0.80));
    }

    #[test]
    fn test_checked_percentage_bounds() {
        assert!(Rate::checked_percentage(dec!(0)).is_ok());
        assert!(Rate::checked_percentage(dec!(100)).is_ok());
        assert!(matches!(
            Rate::checked_percentage(dec!(100.01)),
            Err(MoneyError::InvalidPercentage(_))
        ));
        assert!(Rate::checked_percentage(dec!(-1)).is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn rounding_stays_within_half_a_cent(minor in -1_000_000_000i64..1_000_000_000i64, extra in 0i64..100i64) {
            let raw = Money::new(Decimal::new(minor * 100 + extra, 4));
            let rounded = raw.round_to_cents();
            prop_assert!((rounded.amount() - raw.amount()).abs() <= dec!(0.005));
        }

        #[test]
        fn money_arithmetic_is_associative(
            a in -1_000_000i64..1_000_000i64,
            b in -1_000_000i64..1_000_000i64,
            c in -1_000_000i64..1_000_000i64
        ) {
            let ma = Money::from_minor(a);
            let mb = Money::from_minor(b);
            let mc = Money::from_minor(c);

            prop_assert_eq!((ma + mb) + mc, ma + (mb + mc));
        }
    }
}
