//! Fixed-spread quoting
//!
//! Quotes a constant spread around a configured base price for each
//! symbol. Order ids are deterministic functions of the symbol index,
//! so each tick's cancel targets exactly the previous tick's quote.

use crate::{cancel_previous, MarketMakingStrategy, QuoteState};
use ledger::{LedgerStats, PositionLedger};
use order_book::BookRegistry;
use serde::{Deserialize, Serialize};
use tracing::trace;
use types::clock::Timestamp;
use types::ids::{OrderId, SymbolId};
use types::numeric::{Price, Quantity};
use types::order::{OrderType, Side};
use types::position::Position;

/// Base of the deterministic quote id range
const QUOTE_ID_BASE: u64 = 10_000;

/// Configuration for the fixed-spread strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedSpreadConfig {
    /// Price the quotes straddle
    pub base_price: Price,
    /// Full quoted spread
    pub spread: Price,
    /// Size of each quote
    pub quote_size: Quantity,
    /// Symbols to quote
    pub symbols: Vec<SymbolId>,
}

impl Default for FixedSpreadConfig {
    fn default() -> Self {
        Self {
            base_price: Price::from_ticks(1_000_000),
            spread: Price::from_ticks(1_000),
            quote_size: Quantity::new(100),
            symbols: vec![SymbolId::new(1)],
        }
    }
}

/// Symmetric quoter with a constant spread
pub struct FixedSpreadStrategy {
    config: FixedSpreadConfig,
    state: Vec<QuoteState>,
}

impl FixedSpreadStrategy {
    pub fn new(config: FixedSpreadConfig) -> Self {
        let state = vec![QuoteState::default(); config.symbols.len()];
        Self { config, state }
    }

    pub fn config(&self) -> &FixedSpreadConfig {
        &self.config
    }
}

impl MarketMakingStrategy for FixedSpreadStrategy {
    fn update_quotes(&mut self, books: &BookRegistry, _ledger: &PositionLedger, _now: Timestamp) {
        let half_spread = self.config.spread.ticks() / 2;
        let bid = Price::from_ticks(self.config.base_price.ticks() - half_spread);
        let ask = Price::from_ticks(self.config.base_price.ticks() + half_spread);
        let quantity = self.config.quote_size;

        for (index, &symbol) in self.config.symbols.iter().enumerate() {
            let state = &mut self.state[index];
            cancel_previous(books, symbol, state);

            let bid_id = OrderId::new(QUOTE_ID_BASE + 2 * index as u64 + 1);
            let ask_id = OrderId::new(QUOTE_ID_BASE + 2 * index as u64 + 2);
            books.add_order(symbol, bid_id, bid, quantity, Side::Buy, OrderType::Limit);
            books.add_order(symbol, ask_id, ask, quantity, Side::Sell, OrderType::Limit);

            state.bid_order_id = Some(bid_id);
            state.ask_order_id = Some(ask_id);
            state.last_bid = bid;
            state.last_ask = ask;
            state.last_quantity = quantity;

            trace!(%symbol, %bid, %ask, %quantity, "quotes refreshed");
        }
    }

    fn on_trade(
        &mut self,
        _symbol: SymbolId,
        _price: Price,
        _quantity: Quantity,
        _side: Side,
        _now: Timestamp,
    ) {
        // Fixed quoting ignores market prints.
    }

    fn on_position_update(
        &mut self,
        _symbol: SymbolId,
        _position: &Position,
        _stats: &LedgerStats,
        _now: Timestamp,
    ) {
        // Inventory does not move the quotes here.
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_tick_places_both_quotes() {
        let books = BookRegistry::new();
        let ledger = PositionLedger::default();
        let mut strategy = FixedSpreadStrategy::new(FixedSpreadConfig::default());

        strategy.update_quotes(&books, &ledger, 0);

        let book = books.get(SymbolId::new(1)).unwrap();
        assert_eq!(
            book.best_bid(),
            (Price::from_ticks(999_500), Quantity::new(100))
        );
        assert_eq!(
            book.best_ask(),
            (Price::from_ticks(1_000_500), Quantity::new(100))
        );
    }

    #[test]
    fn test_requote_replaces_previous_orders() {
        let books = BookRegistry::new();
        let ledger = PositionLedger::default();
        let mut strategy = FixedSpreadStrategy::new(FixedSpreadConfig::default());

        strategy.update_quotes(&books, &ledger, 0);
        strategy.update_quotes(&books, &ledger, 1);

        let book = books.get(SymbolId::new(1)).unwrap();
        // Still exactly one quote per side.
        assert_eq!(book.order_count(), 2);
        assert_eq!(book.best_bid().1, Quantity::new(100));
        assert_eq!(book.best_ask().1, Quantity::new(100));
    }

    #[test]
    fn test_multi_symbol_ids_do_not_collide() {
        let books = BookRegistry::new();
        let ledger = PositionLedger::default();
        let config = FixedSpreadConfig {
            symbols: vec![SymbolId::new(1), SymbolId::new(2), SymbolId::new(3)],
            ..FixedSpreadConfig::default()
        };
        let mut strategy = FixedSpreadStrategy::new(config);

        strategy.update_quotes(&books, &ledger, 0);

        for symbol in [1u16, 2, 3] {
            let book = books.get(SymbolId::new(symbol)).unwrap();
            assert_eq!(book.order_count(), 2);
        }
    }
}
