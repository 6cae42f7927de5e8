//! Inventory-skewed quoting
//!
//! Shifts the quoted mid against the current inventory and widens the
//! spread as inventory builds: a long book skews the mid down to bias
//! incoming buys, a short book skews it up, and at full inventory the
//! spread reaches its configured maximum.

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
const QUOTE_ID_BASE: u64 = 20_000;

/// Configuration for the inventory-skewed strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventorySkewConfig {
    /// Unskewed mid price
    pub base_price: Price,
    /// Spread quoted when flat
    pub min_spread: Price,
    /// Spread quoted at full inventory
    pub max_spread: Price,
    /// Size of each quote
    pub quote_size: Quantity,
    /// Net position treated as full inventory
    pub max_inventory: Quantity,
    /// Symbols to quote
    pub symbols: Vec<SymbolId>,
}

impl Default for InventorySkewConfig {
    fn default() -> Self {
        Self {
            base_price: Price::from_ticks(1_000_000),
            min_spread: Price::from_ticks(500),
            max_spread: Price::from_ticks(2_000),
            quote_size: Quantity::new(100),
            max_inventory: Quantity::new(1_000),
            symbols: vec![SymbolId::new(1)],
        }
    }
}

/// Per-symbol state including observed inventory
#[derive(Debug, Clone, Copy, Default)]
struct SkewState {
    quote: QuoteState,
    inventory: i64,
}

/// Quoter that leans against its own inventory
pub struct InventorySkewStrategy {
    config: InventorySkewConfig,
    state: Vec<SkewState>,
}

impl InventorySkewStrategy {
    pub fn new(config: InventorySkewConfig) -> Self {
        let state = vec![SkewState::default(); config.symbols.len()];
        Self { config, state }
    }

    pub fn config(&self) -> &InventorySkewConfig {
        &self.config
    }

    /// Net inventory last observed for a configured symbol
    pub fn inventory(&self, symbol: SymbolId) -> Option<i64> {
        self.config
            .symbols
            .iter()
            .position(|&s| s == symbol)
            .map(|index| self.state[index].inventory)
    }

    fn quote_prices(&self, inventory: i64) -> (Price, Price) {
        let skew = inventory as f64 / self.config.max_inventory.raw() as f64;
        let max_spread = self.config.max_spread.ticks() as f64;
        let min_spread = self.config.min_spread.ticks() as f64;

        let mid = self.config.base_price.ticks() - (skew * max_spread / 2.0) as i64;
        let spread = (min_spread + skew.abs() * (max_spread - min_spread)) as i64;

        (
            Price::from_ticks(mid - spread / 2),
            Price::from_ticks(mid + spread / 2),
        )
    }
}

impl MarketMakingStrategy for InventorySkewStrategy {
    fn update_quotes(&mut self, books: &BookRegistry, ledger: &PositionLedger, _now: Timestamp) {
        for (index, &symbol) in self.config.symbols.iter().enumerate() {
            let inventory = ledger.position(symbol).map(|p| p.net()).unwrap_or(0);
            let (bid, ask) = self.quote_prices(inventory);
            let quantity = self.config.quote_size;

            let state = &mut self.state[index];
            state.inventory = inventory;
            cancel_previous(books, symbol, &state.quote);

            let bid_id = OrderId::new(QUOTE_ID_BASE + 2 * index as u64 + 1);
            let ask_id = OrderId::new(QUOTE_ID_BASE + 2 * index as u64 + 2);
            books.add_order(symbol, bid_id, bid, quantity, Side::Buy, OrderType::Limit);
            books.add_order(symbol, ask_id, ask, quantity, Side::Sell, OrderType::Limit);

            state.quote.bid_order_id = Some(bid_id);
            state.quote.ask_order_id = Some(ask_id);
            state.quote.last_bid = bid;
            state.quote.last_ask = ask;
            state.quote.last_quantity = quantity;

            trace!(%symbol, inventory, %bid, %ask, "skewed quotes refreshed");
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
        // Inventory is re-read from the ledger on the next tick.
    }

    fn on_position_update(
        &mut self,
        symbol: SymbolId,
        position: &Position,
        _stats: &LedgerStats,
        _now: Timestamp,
    ) {
        if let Some(index) = self.config.symbols.iter().position(|&s| s == symbol) {
            self.state[index].inventory = position.net();
        }
    }
}
