//! Order side, type and lifecycle status

use serde::{Deserialize, Serialize};

/// Order side (buyer or seller)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy order (bid)
    Buy,
    /// Sell order (ask)
    Sell,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// Order type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    Market,
    Limit,
    Stop,
}

/// Order lifecycle status
///
/// A full cancel and a full fill both terminate an order as `Filled`:
/// either way the remaining quantity reaches zero and the record leaves
/// the book. `Cancelled` and `Rejected` are reserved for operator
/// cancels and validation rejects respectively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    /// Accepted but not yet resting
    Pending,
    /// Resting in the book
    Active,
    /// Remaining quantity exhausted (terminal)
    Filled,
    /// Cancelled by an operator (terminal)
    Cancelled,
    /// Failed validation (terminal)
    Rejected,
}

impl OrderStatus {
    /// Check if the status is terminal (no further transitions possible)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Filled | OrderStatus::Cancelled | OrderStatus::Rejected
        )
    }
}
