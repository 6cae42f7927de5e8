//! Fixed-point numeric types for prices and quantities
//!
//! Prices are signed integers on a fixed grid of 1/10000 of the quote
//! currency, so all book and ledger arithmetic is exact integer math.
//! Quantities are unsigned 32-bit share counts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// Number of price ticks per whole unit of the quote currency
pub const TICKS_PER_DOLLAR: i64 = 10_000;

/// Profit-and-loss figure, in price ticks times quantity
pub type Pnl = i64;

/// Signed fixed-point price, 1 tick = 1/10000 of the quote currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(i64);

impl Price {
    pub const ZERO: Price = Price(0);

    /// Create a price from raw ticks
    pub const fn from_ticks(ticks: i64) -> Self {
        Self(ticks)
    }

    /// Raw tick count
    pub const fn ticks(&self) -> i64 {
        self.0
    }

    /// Convert a quote-currency amount to the nearest tick
    pub fn from_dollars(dollars: f64) -> Self {
        Self((dollars * TICKS_PER_DOLLAR as f64).round() as i64)
    }

    /// Convert back to a quote-currency amount
    pub fn to_dollars(&self) -> f64 {
        self.0 as f64 / TICKS_PER_DOLLAR as f64
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Midpoint of two prices, truncated to the tick grid
    pub const fn midpoint(&self, other: Price) -> Price {
        Price((self.0 + other.0) / 2)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Price {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Neg for Price {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(
            f,
            "{}{}.{:04}",
            sign,
            abs / TICKS_PER_DOLLAR as u64,
            abs % TICKS_PER_DOLLAR as u64
        )
    }
}

/// Unsigned order quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(u32);

impl Quantity {
    pub const ZERO: Quantity = Quantity(0);

    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(&self) -> u32 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn min(self, other: Quantity) -> Quantity {
        Quantity(self.0.min(other.0))
    }

    pub fn saturating_sub(self, other: Quantity) -> Quantity {
        Quantity(self.0.saturating_sub(other.0))
    }
}

impl Add for Quantity {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Quantity {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl AddAssign for Quantity {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Quantity {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Quantity {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_dollar_conversion() {
        let price = Price::from_dollars(100.05);
        assert_eq!(price.ticks(), 1_000_500);
        assert!((price.to_dollars() - 100.05).abs() < 1e-9);
    }

    #[test]
    fn test_price_rounding() {
        // 0.00005 dollars is half a tick and rounds away from zero
        assert_eq!(Price::from_dollars(0.00005).ticks(), 1);
        assert_eq!(Price::from_dollars(-0.00005).ticks(), -1);
    }

    #[test]
    fn test_price_arithmetic() {
        let a = Price::from_ticks(1_000_000);
        let b = Price::from_ticks(1_001_000);
        assert_eq!(b - a, Price::from_ticks(1_000));
        assert_eq!(a + Price::from_ticks(500), Price::from_ticks(1_000_500));
        assert_eq!(a.midpoint(b), Price::from_ticks(1_000_500));
    }

    #[test]
    fn test_price_display() {
        assert_eq!(Price::from_ticks(1_000_500).to_string(), "100.0500");
        assert_eq!(Price::from_ticks(-25).to_string(), "-0.0025");
        assert_eq!(Price::ZERO.to_string(), "0.0000");
    }

    #[test]
    fn test_price_serialization_is_transparent() {
        let json = serde_json::to_string(&Price::from_ticks(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_quantity_clamping() {
        let q = Quantity::new(100);
        assert_eq!(q.min(Quantity::new(50)), Quantity::new(50));
        assert_eq!(q.saturating_sub(Quantity::new(150)), Quantity::ZERO);
    }

    #[test]
    fn test_quantity_arithmetic() {
        let mut q = Quantity::new(10);
        q += Quantity::new(5);
        assert_eq!(q, Quantity::new(15));
        q -= Quantity::new(15);
        assert!(q.is_zero());
    }
}
