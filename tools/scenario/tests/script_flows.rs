//! End-to-end scenario scripts over a live registry and ledger.

use ledger::PositionLedger;
use order_book::BookRegistry;
use scenario::ScenarioRunner;
use types::ids::{OrderId, SymbolId};
use types::numeric::{Price, Quantity};

#[test]
fn limit_orders_build_a_book() {
    let books = BookRegistry::new();
    let ledger = PositionLedger::default();
    let mut runner = ScenarioRunner::new(&books, &ledger);

    let script = "\
# build a two-sided book
add symbol 1 ACME
add book 1
add limit buy 1 1 1000000 1000 0
add limit buy 2 1 999000 500 0
add limit sell 3 1 1001000 800 0
";
    let report = runner.run_script("build", script);
    assert!(report.passed, "failures: {:?}", report.failures);
    assert_eq!(report.orders_processed, 3);

    let book = books.get(SymbolId::new(1)).unwrap();
    assert_eq!(
        book.best_bid(),
        (Price::from_ticks(1_000_000), Quantity::new(1000))
    );
    assert_eq!(
        book.best_ask(),
        (Price::from_ticks(1_001_000), Quantity::new(800))
    );

    let stats = report.book_stats.get(&SymbolId::new(1)).unwrap();
    assert_eq!(stats.total_orders, 3);
    assert_eq!(stats.bid_levels, 2);
}

#[test]
fn market_order_hits_the_touch_and_records_fill() {
    let books = BookRegistry::new();
    let ledger = PositionLedger::default();
    let mut runner = ScenarioRunner::new(&books, &ledger);

    let script = "\
enable matching
add book 1
add limit sell 1 1 1001000 500 0
add market buy 2 1 200 0
";
    let report = runner.run_script("market", script);
    assert!(report.passed, "failures: {:?}", report.failures);
    assert_eq!(report.trades_executed, 1);

    // The resting ask shrank and the ledger saw the fill.
    let book = books.get(SymbolId::new(1)).unwrap();
    assert_eq!(book.best_ask().1, Quantity::new(300));
    let position = ledger.position(SymbolId::new(1)).unwrap();
    assert_eq!(position.long_quantity, Quantity::new(200));
    assert_eq!(position.avg_long_price, Price::from_ticks(1_001_000));
}

#[test]
fn market_order_without_matching_is_inert() {
    let books = BookRegistry::new();
    let ledger = PositionLedger::default();
    let mut runner = ScenarioRunner::new(&books, &ledger);

    let script = "\
add book 1
add limit sell 1 1 1001000 500 0
add market buy 2 1 200 0
";
    let report = runner.run_script("no-matching", script);
    assert!(report.passed);
    assert_eq!(report.trades_executed, 0);
    assert_eq!(
        books.get(SymbolId::new(1)).unwrap().best_ask().1,
        Quantity::new(500)
    );
    assert!(ledger.position(SymbolId::new(1)).is_none());
}

#[test]
fn slippage_market_prices_off_its_own_touch() {
    let books = BookRegistry::new();
    let ledger = PositionLedger::default();
    let mut runner = ScenarioRunner::new(&books, &ledger);

    let script = "\
enable matching
add book 1
add limit buy 1 1 1000500 100 0
add limit sell 2 1 1001000 100 0
add limit sell 3 1 1001500 100 0
add slippage market buy 4 1 200 1000 0
";
    let report = runner.run_script("slippage", script);
    assert!(report.passed, "failures: {:?}", report.failures);
    assert_eq!(report.trades_executed, 1);

    // Best bid 1000500 plus 1000 of slippage reaches both ask levels.
    let book = books.get(SymbolId::new(1)).unwrap();
    assert_eq!(book.best_ask(), (Price::ZERO, Quantity::ZERO));
    assert_eq!(
        book.best_bid(),
        (Price::from_ticks(1_000_500), Quantity::new(100))
    );
    assert_eq!(
        ledger.position(SymbolId::new(1)).unwrap().long_quantity,
        Quantity::new(200)
    );
}

#[test]
fn order_maintenance_routes_through_owning_book() {
    let books = BookRegistry::new();
    let ledger = PositionLedger::default();
    let mut runner = ScenarioRunner::new(&books, &ledger);

    let script = "\
add book 1
add limit buy 10 1 1000000 300 0
reduce 10 100
modify 10 999000 150
replace 10 11 998000 120
";
    let report = runner.run_script("maintenance", script);
    assert!(report.passed, "failures: {:?}", report.failures);

    let book = books.get(SymbolId::new(1)).unwrap();
    assert!(book.get_order(OrderId::new(10)).is_none());
    let replaced = book.get_order(OrderId::new(11)).unwrap();
    assert_eq!(replaced.price, Price::from_ticks(998_000));
    assert_eq!(replaced.quantity, Quantity::new(120));

    // Deleting the replacement empties the book.
    let report = runner.run_script("delete", "delete order 11\n");
    assert!(report.passed, "failures: {:?}", report.failures);
    assert!(book.is_empty());
}

#[test]
fn maintenance_on_unknown_order_fails_the_line() {
    let books = BookRegistry::new();
    let ledger = PositionLedger::default();
    let mut runner = ScenarioRunner::new(&books, &ledger);

    let report = runner.run_script("unknown", "reduce 99 10\ndelete order 98\n");
    assert!(!report.passed);
    assert_eq!(report.failures.len(), 2);
}

#[test]
fn delete_book_is_accepted_but_keeps_state() {
    let books = BookRegistry::new();
    let ledger = PositionLedger::default();
    let mut runner = ScenarioRunner::new(&books, &ledger);

    let script = "\
add book 7
add limit buy 1 7 1000000 100 0
delete book 7
delete symbol 7
";
    let report = runner.run_script("delete-book", script);
    assert!(report.passed);
    // The book and its order are still there.
    assert_eq!(books.book_count(), 1);
    assert_eq!(books.get(SymbolId::new(7)).unwrap().order_count(), 1);
}

#[test]
fn report_serializes_to_json() {
    let books = BookRegistry::new();
    let ledger = PositionLedger::default();
    let mut runner = ScenarioRunner::new(&books, &ledger);

    let report = runner.run_script("json", "add book 1\nadd limit buy 1 1 1000000 10 0\n");
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["passed"], true);
    assert_eq!(json["orders_processed"], 1);
    assert_eq!(json["position_stats"]["total_symbols"], 0);
}
