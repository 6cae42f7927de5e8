//! Position and risk limit configuration

use crate::numeric::{Pnl, Quantity};
use serde::{Deserialize, Serialize};

/// Pre-trade position bounds and loss limits for the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionLimits {
    /// Maximum gross exposure (long + short) per symbol
    pub max_position_size: Quantity,
    /// Maximum net long position per symbol
    pub max_long_position: Quantity,
    /// Maximum net short position per symbol
    pub max_short_position: Quantity,
    /// Total PnL floor before trading halts for the day
    pub max_daily_loss: Pnl,
    /// Drawdown floor, compared against the same running total
    pub max_drawdown: Pnl,
}

impl Default for PositionLimits {
    fn default() -> Self {
        Self {
            max_position_size: Quantity::new(1_000_000),
            max_long_position: Quantity::new(500_000),
            max_short_position: Quantity::new(500_000),
            max_daily_loss: 1_000_000,
            max_drawdown: 500_000,
        }
    }
}
