//! Pooled order record

use crate::pool::Handle;
use types::clock::Timestamp;
use types::ids::{OrderId, SymbolId};
use types::numeric::{Price, Quantity};
use types::order::{OrderStatus, OrderType, Side};

/// An order resting in (or passing through) a book
///
/// `filled_quantity` counts every share no longer available at the
/// level, whether consumed by an execution or removed by a cancel, so
/// `remaining()` is always what the level owes this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub symbol: SymbolId,
    pub price: Price,
    pub quantity: Quantity,
    pub filled_quantity: Quantity,
    pub side: Side,
    pub order_type: OrderType,
    pub status: OrderStatus,
    /// Time of the last state transition
    pub timestamp: Timestamp,
    /// Level this order currently rests in, if any
    pub(crate) level: Option<Handle>,
}

impl Order {
    /// Quantity still available at the level
    pub fn remaining(&self) -> Quantity {
        self.quantity.saturating_sub(self.filled_quantity)
    }

    pub fn is_filled(&self) -> bool {
        self.filled_quantity >= self.quantity
    }
}

impl Default for Order {
    fn default() -> Self {
        Self {
            id: OrderId::default(),
            symbol: SymbolId::default(),
            price: Price::ZERO,
            quantity: Quantity::ZERO,
            filled_quantity: Quantity::ZERO,
            side: Side::Buy,
            order_type: OrderType::Limit,
            status: OrderStatus::Pending,
            timestamp: 0,
            level: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remaining_tracks_fills() {
        let mut order = Order {
            quantity: Quantity::new(100),
            ..Order::default()
        };
        assert_eq!(order.remaining(), Quantity::new(100));

        order.filled_quantity = Quantity::new(40);
        assert_eq!(order.remaining(), Quantity::new(60));
        assert!(!order.is_filled());

        order.filled_quantity = Quantity::new(100);
        assert!(order.remaining().is_zero());
        assert!(order.is_filled());
    }
}
