use std::{
    fmt,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Signed money amount represented as **integer minor units**.
///
/// Use this type for **all** monetary values in the engine (fund balances,
/// ledger amounts, prices, personal balances) to avoid floating-point drift.
///
/// The value is signed:
/// - positive = credit / increase
/// - negative = debit / decrease
///
/// # Examples
///
/// ```rust
/// use engine::Money;
///
/// let amount = Money::new(100_000);
/// assert_eq!(amount.minor(), 100_000);
/// assert_eq!(amount.to_string(), "100000₫");
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[repr(transparent)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Creates a new amount from integer minor units.
    #[must_use]
    pub const fn new(minor: i64) -> Self {
        Self(minor)
    }

    /// Returns the raw value in minor units.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the amount is positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns `true` if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// Checked subtraction (returns `None` on overflow).
    #[must_use]
    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money)
    }
}

/// Computes `quantity / total_quantity * total` in minor units, rounded
/// half-up.
///
/// The intermediate product is carried in `i128`, so any realistic
/// combination of sale proceeds and quantities is exact until the final
/// division.
///
/// Errors with [`EngineError::InvalidAmount`] when `total_quantity` is not
/// positive or `quantity` is outside `0..=total_quantity`.
pub fn proportional_share(quantity: i64, total_quantity: i64, total: Money) -> Result<Money, EngineError> {
    if total_quantity <= 0 {
        return Err(EngineError::InvalidAmount(
            "total quantity must be > 0".to_string(),
        ));
    }
    if quantity < 0 || quantity > total_quantity {
        return Err(EngineError::InvalidAmount(
            "quantity must be within the contributed total".to_string(),
        ));
    }

    let numerator = i128::from(quantity) * i128::from(total.minor());
    let denominator = i128::from(total_quantity);

    // Half-up rounding on the signed quotient.
    let half = denominator / 2;
    let rounded = if numerator >= 0 {
        (numerator + half) / denominator
    } else {
        (numerator - half) / denominator
    };

    i64::try_from(rounded)
        .map(Money::new)
        .map_err(|_| EngineError::InvalidAmount("share overflows minor units".to_string()))
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}₫", self.0)
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Money> for i64 {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Self::Output {
        Money(-self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_minor_units() {
        assert_eq!(Money::new(0).to_string(), "0₫");
        assert_eq!(Money::new(100_000).to_string(), "100000₫");
        assert_eq!(Money::new(-2500).to_string(), "-2500₫");
    }

    #[test]
    fn shares_are_proportional() {
        let proceeds = Money::new(1_000_000);
        assert_eq!(proportional_share(30, 100, proceeds).unwrap().minor(), 300_000);
        assert_eq!(proportional_share(70, 100, proceeds).unwrap().minor(), 700_000);
    }

    #[test]
    fn share_rounds_half_up() {
        // 1/3 of 100 = 33.33.. -> 33; 2/3 of 100 = 66.66.. -> 67
        let total = Money::new(100);
        assert_eq!(proportional_share(1, 3, total).unwrap().minor(), 33);
        assert_eq!(proportional_share(2, 3, total).unwrap().minor(), 67);
        // exact half rounds away from zero
        assert_eq!(proportional_share(1, 2, Money::new(5)).unwrap().minor(), 3);
    }

    #[test]
    fn share_rejects_bad_quantities() {
        assert!(proportional_share(1, 0, Money::new(100)).is_err());
        assert!(proportional_share(-1, 10, Money::new(100)).is_err());
        assert!(proportional_share(11, 10, Money::new(100)).is_err());
    }
}
