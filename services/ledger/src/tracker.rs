//! Position ledger internals

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use tracing::trace;
use types::clock;
use types::ids::{OrderId, SymbolId};
use types::limits::PositionLimits;
use types::numeric::{Pnl, Price, Quantity};
use types::order::Side;
use types::position::Position;
use types::trade::Trade;

/// Aggregate ledger statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LedgerStats {
    pub total_symbols: usize,
    /// Positions with open exposure on either side
    pub active_positions: usize,
    pub total_realized_pnl: Pnl,
    pub total_unrealized_pnl: Pnl,
    pub total_pnl: Pnl,
    /// Largest gross exposure across symbols
    pub max_position_size: u64,
    pub largest_position_symbol: SymbolId,
}

/// Thread-safe position and PnL ledger
///
/// Every public method takes the instance lock once for its whole
/// duration. Fills always succeed in the core; limit checks are a
/// separate pre-trade call the driver makes first.
pub struct PositionLedger {
    inner: Mutex<LedgerInner>,
}

struct LedgerInner {
    positions: BTreeMap<SymbolId, Position>,
    history: BTreeMap<SymbolId, Vec<Trade>>,
    limits: PositionLimits,
}

impl PositionLedger {
    pub fn new(limits: PositionLimits) -> Self {
        Self {
            inner: Mutex::new(LedgerInner {
                positions: BTreeMap::new(),
                history: BTreeMap::new(),
                limits,
            }),
        }
    }

    /// Record a fill: append history, realize PnL, update the lot
    ///
    /// Realized PnL is computed against the opposite-side lot as it
    /// stood before this fill, but the opposite lot is not reduced:
    /// both gross lots stay open and successive closing fills keep
    /// realizing against the same average. The figure is therefore the
    /// profit of covering at the fill price, not the result of an
    /// actual unwind.
    pub fn record_trade(
        &self,
        symbol: SymbolId,
        price: Price,
        quantity: Quantity,
        side: Side,
        order_id: OrderId,
    ) -> bool {
        let now = clock::now();
        let mut inner = self.locked();

        inner
            .history
            .entry(symbol)
            .or_default()
            .push(Trade::new(symbol, price, quantity, side, order_id, now));

        let realized = inner.realized_for(symbol, price, quantity, side);
        let position = inner.positions.entry(symbol).or_default();
        position.symbol = symbol;
        position.last_update = now;
        position.realized_pnl += realized;

        match side {
            Side::Buy => {
                if position.long_quantity.is_zero() {
                    position.avg_long_price = price;
                } else {
                    position.avg_long_price = weighted_average(
                        position.avg_long_price,
                        position.long_quantity,
                        price,
                        quantity,
                    );
                }
                position.long_quantity += quantity;
            }
            Side::Sell => {
                if position.short_quantity.is_zero() {
                    position.avg_short_price = price;
                } else {
                    position.avg_short_price = weighted_average(
                        position.avg_short_price,
                        position.short_quantity,
                        price,
                        quantity,
                    );
                }
                position.short_quantity += quantity;
            }
        }

        trace!(%symbol, %price, %quantity, ?side, realized, "fill recorded");
        true
    }

    /// Mark one symbol's open lots to `mark`
    pub fn update_unrealized_pnl(&self, symbol: SymbolId, mark: Price) {
        let mut inner = self.locked();
        if let Some(position) = inner.positions.get_mut(&symbol) {
            position.unrealized_pnl = position.unrealized_at(mark);
            position.last_update = clock::now();
        }
    }

    /// Mark every symbol present in `marks`
    pub fn update_all_unrealized_pnl(&self, marks: &BTreeMap<SymbolId, Price>) {
        let now = clock::now();
        let mut inner = self.locked();
        for (symbol, position) in inner.positions.iter_mut() {
            if let Some(&mark) = marks.get(symbol) {
                position.unrealized_pnl = position.unrealized_at(mark);
                position.last_update = now;
            }
        }
    }

    /// Pre-trade check against position bounds
    ///
    /// A symbol with no position passes iff the fill fits the gross
    /// cap. Otherwise the net position after the fill must stay within
    /// the long/short bound for its direction and the gross total must
    /// stay within the cap.
    pub fn check_position_limits(&self, symbol: SymbolId, quantity: Quantity, side: Side) -> bool {
        let inner = self.locked();
        let Some(position) = inner.positions.get(&symbol) else {
            return quantity.raw() as u64 <= inner.limits.max_position_size.raw() as u64;
        };

        let net = position.net();
        let qty = quantity.raw() as i64;
        match side {
            Side::Buy => {
                if net + qty > inner.limits.max_long_position.raw() as i64 {
                    return false;
                }
            }
            Side::Sell => {
                if net - qty < -(inner.limits.max_short_position.raw() as i64) {
                    return false;
                }
            }
        }

        position.total() + quantity.raw() as u64 <= inner.limits.max_position_size.raw() as u64
    }

    /// Check the running total PnL against the loss limits
    ///
    /// Both bounds are applied to the same running total; the drawdown
    /// check does not track a high-water mark.
    pub fn check_risk_limits(&self) -> bool {
        let inner = self.locked();
        let total = inner.total_pnl();
        total >= -inner.limits.max_daily_loss && total >= -inner.limits.max_drawdown
    }

    pub fn position(&self, symbol: SymbolId) -> Option<Position> {
        self.locked().positions.get(&symbol).copied()
    }

    pub fn all_positions(&self) -> BTreeMap<SymbolId, Position> {
        self.locked().positions.clone()
    }

    pub fn total_realized_pnl(&self) -> Pnl {
        self.locked().positions.values().map(|p| p.realized_pnl).sum()
    }

    pub fn total_unrealized_pnl(&self) -> Pnl {
        self.locked().positions.values().map(|p| p.unrealized_pnl).sum()
    }

    pub fn total_pnl(&self) -> Pnl {
        self.locked().total_pnl()
    }

    pub fn trade_history(&self, symbol: SymbolId) -> Vec<Trade> {
        self.locked().history.get(&symbol).cloned().unwrap_or_default()
    }

    /// Every recorded fill across symbols, sorted by timestamp
    pub fn all_trades(&self) -> Vec<Trade> {
        let inner = self.locked();
        let mut trades: Vec<Trade> = inner.history.values().flatten().copied().collect();
        trades.sort_by_key(|t| t.timestamp);
        trades
    }

    pub fn clear_trade_history(&self) {
        self.locked().history.clear();
    }

    pub fn limits(&self) -> PositionLimits {
        self.locked().limits
    }

    pub fn set_limits(&self, limits: PositionLimits) {
        self.locked().limits = limits;
    }

    pub fn stats(&self) -> LedgerStats {
        let inner = self.locked();
        let mut stats = LedgerStats {
            total_symbols: inner.positions.len(),
            active_positions: 0,
            total_realized_pnl: 0,
            total_unrealized_pnl: 0,
            total_pnl: 0,
            max_position_size: 0,
            largest_position_symbol: SymbolId::default(),
        };
        for (symbol, position) in inner.positions.iter() {
            if !position.is_flat() {
                stats.active_positions += 1;
            }
            stats.total_realized_pnl += position.realized_pnl;
            stats.total_unrealized_pnl += position.unrealized_pnl;
            let total = position.total();
            if total > stats.max_position_size {
                stats.max_position_size = total;
                stats.largest_position_symbol = *symbol;
            }
        }
        stats.total_pnl = stats.total_realized_pnl + stats.total_unrealized_pnl;
        stats
    }

    /// Clear all positions and history
    pub fn reset(&self) {
        let mut inner = self.locked();
        inner.positions.clear();
        inner.history.clear();
    }

    /// Positions in symbol order, for the snapshot sink
    pub fn positions_snapshot(&self) -> Vec<Position> {
        self.locked().positions.values().copied().collect()
    }

    /// Replace all positions from a snapshot
    pub fn restore(&self, positions: Vec<Position>) {
        let mut inner = self.locked();
        inner.positions = positions
            .into_iter()
            .filter(|p| !p.symbol.is_null())
            .map(|p| (p.symbol, p))
            .collect();
    }

    fn locked(&self) -> MutexGuard<'_, LedgerInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for PositionLedger {
    fn default() -> Self {
        Self::new(PositionLimits::default())
    }
}

impl LedgerInner {
    /// Realized PnL of a fill against the pre-fill opposite lot
    fn realized_for(&self, symbol: SymbolId, price: Price, quantity: Quantity, side: Side) -> Pnl {
        let Some(position) = self.positions.get(&symbol) else {
            return 0;
        };
        match side {
            Side::Buy if !position.short_quantity.is_zero() => {
                let cover = quantity.min(position.short_quantity);
                (position.avg_short_price.ticks() - price.ticks()) * cover.raw() as i64
            }
            Side::Sell if !position.long_quantity.is_zero() => {
                let sell = quantity.min(position.long_quantity);
                (price.ticks() - position.avg_long_price.ticks()) * sell.raw() as i64
            }
            _ => 0,
        }
    }

    fn total_pnl(&self) -> Pnl {
        self.positions
            .values()
            .map(|p| p.realized_pnl + p.unrealized_pnl)
            .sum()
    }
}

/// Quantity-weighted average price, truncated to the tick grid
fn weighted_average(avg: Price, held: Quantity, price: Price, added: Quantity) -> Price {
    let total_value = avg.ticks() * held.raw() as i64 + price.ticks() * added.raw() as i64;
    Price::from_ticks(total_value / (held.raw() as i64 + added.raw() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ledger: &PositionLedger, symbol: u16, price: i64, qty: u32, side: Side) {
        assert!(ledger.record_trade(
            SymbolId::new(symbol),
            Price::from_ticks(price),
            Quantity::new(qty),
            side,
            OrderId::new(1),
        ));
    }

    #[test]
    fn test_first_buy_sets_average() {
        let ledger = PositionLedger::default();
        record(&ledger, 1, 1_000_000, 1000, Side::Buy);

        let pos = ledger.position(SymbolId::new(1)).unwrap();
        assert_eq!(pos.long_quantity, Quantity::new(1000));
        assert_eq!(pos.short_quantity, Quantity::ZERO);
        assert_eq!(pos.avg_long_price, Price::from_ticks(1_000_000));
        assert_eq!(pos.realized_pnl, 0);
    }

    #[test]
    fn test_sell_opens_short_lot_alongside_long() {
        let ledger = PositionLedger::default();
        record(&ledger, 1, 1_000_000, 1000, Side::Buy);
        record(&ledger, 1, 1_001_000, 500, Side::Sell);

        let pos = ledger.position(SymbolId::new(1)).unwrap();
        // The long lot is untouched; the sell opened a short lot.
        assert_eq!(pos.long_quantity, Quantity::new(1000));
        assert_eq!(pos.short_quantity, Quantity::new(500));
        assert_eq!(pos.avg_short_price, Price::from_ticks(1_001_000));
        assert_eq!(pos.net(), 500);
        assert_eq!(pos.total(), 1500);
    }

    #[test]
    fn test_realized_pnl_on_closing_sell() {
        let ledger = PositionLedger::default();
        record(&ledger, 1, 1_000_000, 1000, Side::Buy);
        record(&ledger, 1, 1_001_000, 500, Side::Sell);

        // (1_001_000 - 1_000_000) * 500
        assert_eq!(ledger.total_realized_pnl(), 500_000);
    }

    #[test]
    fn test_realized_pnl_on_covering_buy() {
        let ledger = PositionLedger::default();
        record(&ledger, 1, 1_010_000, 300, Side::Sell);
        record(&ledger, 1, 1_000_000, 200, Side::Buy);

        // (1_010_000 - 1_000_000) * 200
        assert_eq!(ledger.total_realized_pnl(), 2_000_000);
    }

    #[test]
    fn test_weighted_average_accumulates() {
        let ledger = PositionLedger::default();
        record(&ledger, 1, 1_000_000, 100, Side::Buy);
        record(&ledger, 1, 1_010_000, 100, Side::Buy);

        let pos = ledger.position(SymbolId::new(1)).unwrap();
        assert_eq!(pos.long_quantity, Quantity::new(200));
        assert_eq!(pos.avg_long_price, Price::from_ticks(1_005_000));
    }

    #[test]
    fn test_unrealized_marks() {
        let ledger = PositionLedger::default();
        record(&ledger, 1, 1_000_000, 100, Side::Buy);

        ledger.update_unrealized_pnl(SymbolId::new(1), Price::from_ticks(1_002_000));
        assert_eq!(ledger.total_unrealized_pnl(), 200_000);
        assert_eq!(ledger.total_pnl(), 200_000);

        // Marks for symbols without positions are ignored.
        ledger.update_unrealized_pnl(SymbolId::new(9), Price::from_ticks(5));
        assert_eq!(ledger.total_unrealized_pnl(), 200_000);
    }

    #[test]
    fn test_bulk_mark_update() {
        let ledger = PositionLedger::default();
        record(&ledger, 1, 1_000_000, 100, Side::Buy);
        record(&ledger, 2, 2_000_000, 50, Side::Sell);

        let marks = BTreeMap::from([
            (SymbolId::new(1), Price::from_ticks(1_001_000)),
            (SymbolId::new(2), Price::from_ticks(1_999_000)),
        ]);
        ledger.update_all_unrealized_pnl(&marks);

        assert_eq!(
            ledger.position(SymbolId::new(1)).unwrap().unrealized_pnl,
            100_000
        );
        assert_eq!(
            ledger.position(SymbolId::new(2)).unwrap().unrealized_pnl,
            50_000
        );
        assert_eq!(ledger.total_unrealized_pnl(), 150_000);
    }

    #[test]
    fn test_limit_check_for_new_symbol() {
        let limits = PositionLimits {
            max_position_size: Quantity::new(1000),
            ..PositionLimits::default()
        };
        let ledger = PositionLedger::new(limits);

        assert!(ledger.check_position_limits(SymbolId::new(1), Quantity::new(1000), Side::Buy));
        assert!(!ledger.check_position_limits(SymbolId::new(1), Quantity::new(1001), Side::Buy));
    }

    #[test]
    fn test_risk_limits_trip_on_loss() {
        let limits = PositionLimits {
            max_daily_loss: 1_000,
            max_drawdown: 1_000,
            ..PositionLimits::default()
        };
        let ledger = PositionLedger::new(limits);
        assert!(ledger.check_risk_limits());

        // Buy high, mark low: unrealized loss of 2_000.
        record(&ledger, 1, 1_000_000, 1, Side::Buy);
        ledger.update_unrealized_pnl(SymbolId::new(1), Price::from_ticks(998_000));
        assert!(!ledger.check_risk_limits());
    }

    #[test]
    fn test_history_and_reset() {
        let ledger = PositionLedger::default();
        record(&ledger, 1, 1_000_000, 100, Side::Buy);
        record(&ledger, 2, 2_000_000, 50, Side::Sell);

        assert_eq!(ledger.trade_history(SymbolId::new(1)).len(), 1);
        assert_eq!(ledger.all_trades().len(), 2);

        ledger.clear_trade_history();
        assert!(ledger.all_trades().is_empty());
        // Positions survive a history clear.
        assert!(ledger.position(SymbolId::new(1)).is_some());

        ledger.reset();
        assert!(ledger.position(SymbolId::new(1)).is_none());
        assert_eq!(ledger.stats().total_symbols, 0);
    }

    #[test]
    fn test_stats_track_largest_position() {
        let ledger = PositionLedger::default();
        record(&ledger, 1, 1_000_000, 100, Side::Buy);
        record(&ledger, 2, 1_000_000, 400, Side::Buy);

        let stats = ledger.stats();
        assert_eq!(stats.total_symbols, 2);
        assert_eq!(stats.active_positions, 2);
        assert_eq!(stats.max_position_size, 400);
        assert_eq!(stats.largest_position_symbol, SymbolId::new(2));
    }

    #[test]
    fn test_snapshot_restore_round_trip() {
        let ledger = PositionLedger::default();
        record(&ledger, 1, 1_000_000, 100, Side::Buy);
        record(&ledger, 2, 2_000_000, 50, Side::Sell);

        let snapshot = ledger.positions_snapshot();
        assert_eq!(snapshot.len(), 2);

        let restored = PositionLedger::default();
        restored.restore(snapshot);
        assert_eq!(
            restored.position(SymbolId::new(1)),
            ledger.position(SymbolId::new(1))
        );
        assert_eq!(
            restored.position(SymbolId::new(2)),
            ledger.position(SymbolId::new(2))
        );
    }
}
