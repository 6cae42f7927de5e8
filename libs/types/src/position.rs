//! Per-symbol position with gross lot accounting
//!
//! Long and short lots are tracked independently rather than netted
//! against each other: a buy grows the long lot, a sell grows the short
//! lot, and each side keeps the weighted-average price it was acquired
//! at. Net and total exposure are derived.

use crate::clock::Timestamp;
use crate::ids::SymbolId;
use crate::numeric::{Pnl, Price, Quantity};
use serde::{Deserialize, Serialize};

/// Position for a single symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    pub symbol: SymbolId,
    pub long_quantity: Quantity,
    pub short_quantity: Quantity,
    /// Weighted-average acquisition price of the long lot
    pub avg_long_price: Price,
    /// Weighted-average acquisition price of the short lot
    pub avg_short_price: Price,
    pub realized_pnl: Pnl,
    pub unrealized_pnl: Pnl,
    pub last_update: Timestamp,
}

impl Position {
    /// Net position: positive when long, negative when short
    pub fn net(&self) -> i64 {
        self.long_quantity.raw() as i64 - self.short_quantity.raw() as i64
    }

    /// Gross exposure across both lots
    pub fn total(&self) -> u64 {
        self.long_quantity.raw() as u64 + self.short_quantity.raw() as u64
    }

    pub fn is_flat(&self) -> bool {
        self.long_quantity.is_zero() && self.short_quantity.is_zero()
    }

    pub fn is_long(&self) -> bool {
        self.long_quantity > self.short_quantity
    }

    pub fn is_short(&self) -> bool {
        self.short_quantity > self.long_quantity
    }

    /// Mark-to-market value of the open lots at `mark`
    ///
    /// The long lot gains when the mark rises above its average price,
    /// the short lot gains when the mark falls below its own.
    pub fn unrealized_at(&self, mark: Price) -> Pnl {
        let mut pnl: Pnl = 0;
        if !self.long_quantity.is_zero() {
            pnl += (mark.ticks() - self.avg_long_price.ticks()) * self.long_quantity.raw() as i64;
        }
        if !self.short_quantity.is_zero() {
            pnl += (self.avg_short_price.ticks() - mark.ticks()) * self.short_quantity.raw() as i64;
        }
        pnl
    }
}
