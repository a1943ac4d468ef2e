use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

use crate::error::{Result, ValueError};

/// Fixed-point token amount with 2^32 fractional sub-units
/// Internally stored as u64; amounts are non-negative by construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Amount(u64);

const SCALE: u64 = 1 << 32; // one whole token unit ("coin")

impl Amount {
    /// Zero amount
    pub const ZERO: Amount = Amount(0);

    /// Create from raw sub-units
    pub const fn from_raw(raw: u64) -> Self {
        Amount(raw)
    }

    /// Get the raw sub-unit value
    pub const fn raw(&self) -> u64 {
        self.0
    }

    /// Create from whole token units
    pub const fn from_units(units: u32) -> Self {
        Amount((units as u64) * SCALE)
    }

    /// Whole-unit part, fraction truncated
    pub const fn units(&self) -> u64 {
        self.0 / SCALE
    }

    /// Check if amount is zero
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition
    pub fn checked_add(&self, other: Self) -> Result<Self> {
        self.0
            .checked_add(other.0)
            .map(Amount)
            .ok_or(ValueError::Overflow("addition"))
    }

    /// Checked subtraction
    pub fn checked_sub(&self, other: Self) -> Result<Self> {
        self.0
            .checked_sub(other.0)
            .map(Amount)
            .ok_or(ValueError::Overflow("subtraction"))
    }

    /// Subtraction clamped at zero
    pub const fn saturating_sub(&self, other: Self) -> Self {
        Amount(self.0.saturating_sub(other.0))
    }

    /// floor(self * num / den); den == 0 yields zero
    /// Widens to u128 so the intermediate product cannot overflow
    pub fn mul_div(&self, num: Amount, den: Amount) -> Result<Self> {
        if den.is_zero() {
            return Ok(Amount::ZERO);
        }
        let wide = (self.0 as u128) * (num.0 as u128) / (den.0 as u128);
        u64::try_from(wide)
            .map(Amount)
            .map_err(|_| ValueError::Overflow("mul_div"))
    }

    pub fn min(&self, other: Self) -> Self {
        Amount(self.0.min(other.0))
    }
}

impl Add for Amount {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Amount(self.0 + other.0)
    }
}

impl Sub for Amount {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Amount(self.0 - other.0)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", (self.0 as f64) / (SCALE as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_conversions() {
        let a = Amount::from_units(100);
        assert_eq!(a.units(), 100);
        assert_eq!(a.raw(), 100 << 32);

        assert!(Amount::ZERO.is_zero());
    }

    #[test]
    fn test_checked_arithmetic() {
        let a = Amount::from_units(10);
        let b = Amount::from_units(4);

        assert_eq!(a.checked_add(b).unwrap(), Amount::from_units(14));
        assert_eq!(a.checked_sub(b).unwrap(), Amount::from_units(6));
        assert!(b.checked_sub(a).is_err());
        assert_eq!(b.saturating_sub(a), Amount::ZERO);

        let max = Amount::from_raw(u64::MAX);
        assert!(max.checked_add(Amount::from_raw(1)).is_err());
    }

    #[test]
    fn test_mul_div() {
        let a = Amount::from_units(1_000_000);
        let share = a
            .mul_div(Amount::from_units(3), Amount::from_units(4))
            .unwrap();
        assert_eq!(share, Amount::from_units(750_000));

        // floor semantics
        let third = Amount::from_raw(10)
            .mul_div(Amount::from_raw(1), Amount::from_raw(3))
            .unwrap();
        assert_eq!(third.raw(), 3);

        // division by zero yields zero
        assert_eq!(a.mul_div(a, Amount::ZERO).unwrap(), Amount::ZERO);
    }
}
