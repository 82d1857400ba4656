//! Value objects shared by the shop entities.

use std::iter::Sum;

use serde::{Deserialize, Serialize};

/// Money amount represented in cents to avoid floating point issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money {
    cents: i64,
}

impl Money {
    /// Creates a new Money amount from cents.
    pub const fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Returns zero money.
    pub const fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns the whole-unit portion.
    pub fn units(&self) -> i64 {
        self.cents / 100
    }

    /// Returns the cents portion (remainder after whole units).
    pub fn cents_part(&self) -> i64 {
        self.cents.abs() % 100
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        self.cents < 0
    }

    /// Multiplies by a quantity, saturating at the bounds of `i64`.
    pub fn multiply(&self, quantity: u32) -> Money {
        Money {
            cents: self.cents.saturating_mul(i64::from(quantity)),
        }
    }

    /// Multiplies by a quantity, or `None` on overflow.
    pub fn checked_multiply(&self, quantity: u32) -> Option<Money> {
        self.cents
            .checked_mul(i64::from(quantity))
            .map(Money::from_cents)
    }

    /// Adds two amounts, or `None` on overflow.
    pub fn checked_add(&self, rhs: Money) -> Option<Money> {
        self.cents.checked_add(rhs.cents).map(Money::from_cents)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.cents < 0 {
            write!(f, "-{}.{:02}", self.units().abs(), self.cents_part())
        } else {
            write!(f, "{}.{:02}", self.units(), self.cents_part())
        }
    }
}

// Operators saturate; cart totals are validated with the checked forms.
impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money {
            cents: self.cents.saturating_add(rhs.cents),
        }
    }
}

impl std::ops::Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Money {
            cents: self.cents.saturating_sub(rhs.cents),
        }
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.cents = self.cents.saturating_add(rhs.cents);
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

/// A tax rate in basis points (1 bp = 0.01%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxRate {
    basis_points: u32,
}

impl TaxRate {
    /// Creates a rate from basis points, e.g. 2000 for 20%.
    pub const fn from_basis_points(basis_points: u32) -> Self {
        Self { basis_points }
    }

    /// Creates a rate from a whole percentage.
    pub const fn from_percent(percent: u32) -> Self {
        Self {
            basis_points: percent * 100,
        }
    }

    /// A zero rate.
    pub const fn zero() -> Self {
        Self { basis_points: 0 }
    }

    /// Returns the rate in basis points.
    pub fn basis_points(&self) -> u32 {
        self.basis_points
    }

    /// Applies the rate to an amount, rounding half away from zero to the cent.
    pub fn apply(&self, amount: Money) -> Money {
        let scaled = i128::from(amount.cents()) * i128::from(self.basis_points);
        let half = if scaled < 0 { -5_000 } else { 5_000 };
        let cents = (scaled + half) / 10_000;
        Money::from_cents(cents.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64)
    }
}

impl std::fmt::Display for TaxRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}%", self.basis_points / 100, self.basis_points % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_from_cents() {
        let money = Money::from_cents(1234);
        assert_eq!(money.cents(), 1234);
        assert_eq!(money.units(), 12);
        assert_eq!(money.cents_part(), 34);
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::from_cents(1234).to_string(), "12.34");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(Money::from_cents(-1234).to_string(), "-12.34");
    }

    #[test]
    fn test_money_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!(a.multiply(3).cents(), 3000);
    }

    #[test]
    fn test_money_overflow_is_detected() {
        let big = Money::from_cents(i64::MAX / 2);
        assert_eq!(big.checked_multiply(2).map(|m| m.cents()), Some(i64::MAX - 1));
        assert_eq!(big.checked_multiply(3), None);
        assert_eq!(big.checked_add(big), Some(Money::from_cents(i64::MAX - 1)));
        assert_eq!(Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)), None);
    }

    #[test]
    fn test_money_operators_saturate() {
        let max = Money::from_cents(i64::MAX);
        assert_eq!(max + Money::from_cents(1), max);
        assert_eq!(max.multiply(3), max);
        let total: Money = [max, max].into_iter().sum();
        assert_eq!(total, max);
    }

    #[test]
    fn test_money_sum() {
        let total: Money = [100, 250, 5].into_iter().map(Money::from_cents).sum();
        assert_eq!(total.cents(), 355);
    }

    #[test]
    fn test_money_serializes_as_cents() {
        let json = serde_json::to_string(&Money::from_cents(999)).unwrap();
        assert_eq!(json, "999");
    }

    #[test]
    fn test_tax_rate_rounds_half_up() {
        let rate = TaxRate::from_percent(20);
        assert_eq!(rate.apply(Money::from_cents(1000)).cents(), 200);
        // 0.2 * 1 = 0.2 -> 0, 0.2 * 3 = 0.6 -> 1
        assert_eq!(rate.apply(Money::from_cents(1)).cents(), 0);
        assert_eq!(rate.apply(Money::from_cents(3)).cents(), 1);
        // 12.5% of 4 cents is exactly half a cent
        assert_eq!(TaxRate::from_basis_points(1250).apply(Money::from_cents(4)).cents(), 1);
    }

    #[test]
    fn test_tax_rate_clamps_huge_amounts() {
        let rate = TaxRate::from_basis_points(20_000);
        assert_eq!(rate.apply(Money::from_cents(i64::MAX)).cents(), i64::MAX);
    }

    #[test]
    fn test_tax_rate_display() {
        assert_eq!(TaxRate::from_basis_points(2000).to_string(), "20.00%");
        assert_eq!(TaxRate::from_basis_points(725).to_string(), "7.25%");
    }
}
