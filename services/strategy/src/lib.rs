//! Market-making strategies
//!
//! A strategy sits above the book registry and the ledger: on each
//! tick it cancels its previous quotes and places fresh ones, and it
//! is notified of fills and position changes by the driving loop.
//! Calls are synchronous and the strategy holds no locks of its own.

mod fixed_spread;
mod inventory_skew;

pub use fixed_spread::{FixedSpreadConfig, FixedSpreadStrategy};
pub use inventory_skew::{InventorySkewConfig, InventorySkewStrategy};

use ledger::{LedgerStats, PositionLedger};
use order_book::BookRegistry;
use types::clock::Timestamp;
use types::ids::{OrderId, SymbolId};
use types::numeric::{Price, Quantity};
use types::order::Side;
use types::position::Position;

/// Contract between a quoting strategy and its driving loop
pub trait MarketMakingStrategy {
    /// Rebuild quotes for every configured symbol
    fn update_quotes(&mut self, books: &BookRegistry, ledger: &PositionLedger, now: Timestamp);

    /// Notification of a fill in the market
    fn on_trade(
        &mut self,
        symbol: SymbolId,
        price: Price,
        quantity: Quantity,
        side: Side,
        now: Timestamp,
    );

    /// Notification after a ledger change
    fn on_position_update(
        &mut self,
        symbol: SymbolId,
        position: &Position,
        stats: &LedgerStats,
        now: Timestamp,
    );
}

/// Per-symbol quote bookkeeping shared by the strategies
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct QuoteState {
    pub bid_order_id: Option<OrderId>,
    pub ask_order_id: Option<OrderId>,
    pub last_bid: Price,
    pub last_ask: Price,
    pub last_quantity: Quantity,
}

/// Cancel the previous quotes for a symbol, tolerating consumed ones
///
/// A quote that was already filled is gone from the book and its
/// cancel returns false; that is expected and ignored.
pub(crate) fn cancel_previous(books: &BookRegistry, symbol: SymbolId, state: &QuoteState) {
    if let Some(order_id) = state.bid_order_id {
        let _ = books.cancel_order(symbol, order_id, Quantity::ZERO);
    }
    if let Some(order_id) = state.ask_order_id {
        let _ = books.cancel_order(symbol, order_id, Quantity::ZERO);
    }
}
