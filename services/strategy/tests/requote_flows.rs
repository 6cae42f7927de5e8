//! Strategy driving flows: quote, get filled, re-quote.

use ledger::PositionLedger;
use order_book::BookRegistry;
use strategy::{
    FixedSpreadConfig, FixedSpreadStrategy, InventorySkewConfig, InventorySkewStrategy,
    MarketMakingStrategy,
};
use types::ids::{OrderId, SymbolId};
use types::numeric::{Price, Quantity};
use types::order::Side;

#[test]
fn fixed_spread_requotes_after_bid_consumed() {
    let books = BookRegistry::new();
    let ledger = PositionLedger::default();
    let mut strategy = FixedSpreadStrategy::new(FixedSpreadConfig {
        base_price: Price::from_ticks(1_000_000),
        spread: Price::from_ticks(1_000),
        quote_size: Quantity::new(100),
        symbols: vec![SymbolId::new(1)],
    });

    // Tick 1: both quotes are live.
    strategy.update_quotes(&books, &ledger, 1);
    let book = books.get(SymbolId::new(1)).unwrap();
    assert_eq!(
        book.best_bid(),
        (Price::from_ticks(999_500), Quantity::new(100))
    );
    assert_eq!(
        book.best_ask(),
        (Price::from_ticks(1_000_500), Quantity::new(100))
    );

    // The bid is lifted in full between ticks.
    assert!(book.execute_trade(Price::from_ticks(999_500), Quantity::new(100), Side::Sell));
    ledger.record_trade(
        SymbolId::new(1),
        Price::from_ticks(999_500),
        Quantity::new(100),
        Side::Buy,
        OrderId::new(10_001),
    );
    assert_eq!(book.best_bid(), (Price::ZERO, Quantity::ZERO));

    // Tick 2: the dead bid cancel fails silently, both quotes return.
    strategy.update_quotes(&books, &ledger, 2);
    assert_eq!(
        book.best_bid(),
        (Price::from_ticks(999_500), Quantity::new(100))
    );
    assert_eq!(
        book.best_ask(),
        (Price::from_ticks(1_000_500), Quantity::new(100))
    );
    assert_eq!(book.order_count(), 2);
}

#[test]
fn skewed_strategy_leans_against_fills() {
    let books = BookRegistry::new();
    let ledger = PositionLedger::default();
    let mut strategy = InventorySkewStrategy::new(InventorySkewConfig {
        base_price: Price::from_ticks(1_000_000),
        min_spread: Price::from_ticks(500),
        max_spread: Price::from_ticks(2_000),
        quote_size: Quantity::new(100),
        max_inventory: Quantity::new(200),
        symbols: vec![SymbolId::new(1)],
    });

    strategy.update_quotes(&books, &ledger, 1);
    let book = books.get(SymbolId::new(1)).unwrap();
    let flat_bid = book.best_bid().0;
    let flat_spread = book.spread();
    assert_eq!(flat_spread, Price::from_ticks(500));

    // Accumulate long inventory equal to half the maximum.
    ledger.record_trade(
        SymbolId::new(1),
        Price::from_ticks(999_750),
        Quantity::new(100),
        Side::Buy,
        OrderId::new(20_001),
    );

    strategy.update_quotes(&books, &ledger, 2);
    assert_eq!(strategy.inventory(SymbolId::new(1)), Some(100));
    // Mid moves down and the spread widens.
    assert!(book.best_bid().0 < flat_bid);
    assert!(book.spread() > flat_spread);
    assert_eq!(book.order_count(), 2);
}

#[test]
fn strategies_coexist_on_one_book() {
    let books = BookRegistry::new();
    let ledger = PositionLedger::default();
    let mut fixed = FixedSpreadStrategy::new(FixedSpreadConfig::default());
    let mut skewed = InventorySkewStrategy::new(InventorySkewConfig::default());

    fixed.update_quotes(&books, &ledger, 1);
    skewed.update_quotes(&books, &ledger, 1);

    // Distinct id ranges: four quotes rest on the shared book.
    let book = books.get(SymbolId::new(1)).unwrap();
    assert_eq!(book.order_count(), 4);

    // Both re-quote without touching each other's orders.
    fixed.update_quotes(&books, &ledger, 2);
    skewed.update_quotes(&books, &ledger, 2);
    assert_eq!(book.order_count(), 4);
}
