//! Historical fill record

use crate::clock::Timestamp;
use crate::ids::{OrderId, SymbolId};
use crate::numeric::{Price, Quantity};
use crate::order::Side;
use serde::{Deserialize, Serialize};

/// A single executed fill, as recorded in the ledger's trade history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub symbol: SymbolId,
    pub price: Price,
    pub quantity: Quantity,
    pub side: Side,
    pub timestamp: Timestamp,
    pub order_id: OrderId,
}

impl Trade {
    pub fn new(
        symbol: SymbolId,
        price: Price,
        quantity: Quantity,
        side: Side,
        order_id: OrderId,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            symbol,
            price,
            quantity,
            side,
            timestamp,
            order_id,
        }
    }

    /// Notional value of the fill, in ticks times quantity
    pub fn notional(&self) -> i64 {
        self.price.ticks() * self.quantity.raw() as i64
    }
}
