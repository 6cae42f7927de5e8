//! Symbol to order book registry
//!
//! Books are created lazily on first use and live for the life of the
//! registry; there is no delete. The registry lock guards only the
//! symbol map and is always released before a book method runs, so a
//! slow book operation never blocks lookups for other symbols.

use crate::book::OrderBook;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;
use types::ids::{OrderId, SymbolId};
use types::numeric::{Price, Quantity};
use types::order::{OrderType, Side};

/// Shared registry of per-symbol order books
#[derive(Default)]
pub struct BookRegistry {
    books: Mutex<HashMap<SymbolId, Arc<OrderBook>>>,
}

impl BookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the book for `symbol`, creating it on first use
    pub fn book(&self, symbol: SymbolId) -> Arc<OrderBook> {
        let mut books = self.locked();
        books
            .entry(symbol)
            .or_insert_with(|| {
                debug!(%symbol, "creating order book");
                Arc::new(OrderBook::new(symbol))
            })
            .clone()
    }

    /// Get the book for `symbol` without creating one
    pub fn get(&self, symbol: SymbolId) -> Option<Arc<OrderBook>> {
        self.locked().get(&symbol).cloned()
    }

    pub fn add_order(
        &self,
        symbol: SymbolId,
        order_id: OrderId,
        price: Price,
        quantity: Quantity,
        side: Side,
        order_type: OrderType,
    ) -> bool {
        self.book(symbol)
            .add_order(order_id, price, quantity, side, order_type)
    }

    pub fn cancel_order(&self, symbol: SymbolId, order_id: OrderId, quantity: Quantity) -> bool {
        self.book(symbol).cancel_order(order_id, quantity)
    }

    pub fn modify_order(
        &self,
        symbol: SymbolId,
        order_id: OrderId,
        new_price: Price,
        new_quantity: Quantity,
    ) -> bool {
        self.book(symbol).modify_order(order_id, new_price, new_quantity)
    }

    pub fn execute_trade(
        &self,
        symbol: SymbolId,
        price: Price,
        quantity: Quantity,
        side: Side,
    ) -> bool {
        self.book(symbol).execute_trade(price, quantity, side)
    }

    /// Symbols with a live book, in ascending order
    pub fn active_symbols(&self) -> Vec<SymbolId> {
        let mut symbols: Vec<SymbolId> = self.locked().keys().copied().collect();
        symbols.sort_unstable();
        symbols
    }

    pub fn book_count(&self) -> usize {
        self.locked().len()
    }

    fn locked(&self) -> MutexGuard<'_, HashMap<SymbolId, Arc<OrderBook>>> {
        self.books.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
