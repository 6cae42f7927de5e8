//! Aggregated price level
//!
//! A level is the sum of the remaining quantities of every active order
//! at one price on one side. It exists only while that sum is nonzero.

use types::clock::Timestamp;
use types::numeric::{Price, Quantity};

/// One price point of a book side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PriceLevel {
    pub price: Price,
    /// Sum of remaining quantity over the level's active orders
    pub total_quantity: Quantity,
    /// Number of active orders resting at this price
    pub order_count: u32,
    pub last_update: Timestamp,
}

impl PriceLevel {
    /// Reinitialize a recycled pool slot for a fresh price
    pub(crate) fn reset(&mut self, price: Price, now: Timestamp) {
        self.price = price;
        self.total_quantity = Quantity::ZERO;
        self.order_count = 0;
        self.last_update = now;
    }

    /// An order starts resting here with `quantity` remaining
    pub(crate) fn place(&mut self, quantity: Quantity, now: Timestamp) {
        self.total_quantity += quantity;
        self.order_count += 1;
        self.last_update = now;
    }

    /// Quantity leaves the level while its order keeps resting
    pub(crate) fn reduce(&mut self, quantity: Quantity, now: Timestamp) {
        self.total_quantity = self.total_quantity.saturating_sub(quantity);
        self.last_update = now;
    }

    /// An order leaves the level with `quantity` still remaining
    pub(crate) fn withdraw(&mut self, quantity: Quantity, now: Timestamp) {
        self.total_quantity = self.total_quantity.saturating_sub(quantity);
        self.order_count = self.order_count.saturating_sub(1);
        self.last_update = now;
    }

    /// An execution consumed `quantity` here, completing `done` orders
    pub(crate) fn consume(&mut self, quantity: Quantity, done: u32, now: Timestamp) {
        self.total_quantity = self.total_quantity.saturating_sub(quantity);
        self.order_count = self.order_count.saturating_sub(done);
        self.last_update = now;
    }

    pub fn is_empty(&self) -> bool {
        self.total_quantity.is_zero()
    }
}
