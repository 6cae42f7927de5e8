//! Scenario replay runner
//!
//! Replays parsed commands against a book registry and a ledger.
//! Failed lines are collected with their line numbers and never
//! terminate the batch; the report carries the final book and position
//! statistics alongside the failure list.
//!
//! Market and slippage-market orders only act while matching is
//! enabled: they execute at the current touch and record the fill in
//! the ledger. Order-maintenance commands are routed to the owning
//! book through an order-id map built from the add commands.

use crate::command::ScenarioCommand;
use ledger::{LedgerStats, PositionLedger};
use order_book::{BookRegistry, BookStats};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, warn};
use types::ids::{OrderId, SymbolId};
use types::numeric::{Price, Quantity};
use types::order::{OrderType, Side};

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A command that could not be parsed or applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineFailure {
    pub line: usize,
    pub message: String,
}

/// Outcome of one scenario run
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub passed: bool,
    pub failures: Vec<LineFailure>,
    pub execution_time_ms: f64,
    pub orders_processed: usize,
    pub trades_executed: usize,
    pub book_stats: BTreeMap<SymbolId, BookStats>,
    pub position_stats: LedgerStats,
}

/// Cumulative statistics across runs
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct RunnerStats {
    pub total_scenarios: usize,
    pub passed_scenarios: usize,
    pub failed_scenarios: usize,
    pub total_execution_time_ms: f64,
    pub avg_execution_time_ms: f64,
}

/// Replays scenario scripts against a registry and ledger
pub struct ScenarioRunner<'a> {
    books: &'a BookRegistry,
    ledger: &'a PositionLedger,
    matching_enabled: bool,
    order_symbols: HashMap<OrderId, SymbolId>,
    stats: RunnerStats,
}

struct Outcome {
    applied: bool,
    traded: bool,
}

impl Outcome {
    fn ok() -> Self {
        Self {
            applied: true,
            traded: false,
        }
    }

    fn failed() -> Self {
        Self {
            applied: false,
            traded: false,
        }
    }

    fn traded() -> Self {
        Self {
            applied: true,
            traded: true,
        }
    }
}

impl<'a> ScenarioRunner<'a> {
    pub fn new(books: &'a BookRegistry, ledger: &'a PositionLedger) -> Self {
        Self {
            books,
            ledger,
            matching_enabled: false,
            order_symbols: HashMap::new(),
            stats: RunnerStats::default(),
        }
    }

    pub fn set_matching_enabled(&mut self, enabled: bool) {
        self.matching_enabled = enabled;
    }

    pub fn is_matching_enabled(&self) -> bool {
        self.matching_enabled
    }

    pub fn stats(&self) -> RunnerStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = RunnerStats::default();
    }

    /// Run one scenario file
    pub fn run_file(&mut self, path: impl AsRef<Path>) -> Result<ScenarioReport, ScenarioError> {
        let path = path.as_ref();
        let script = fs::read_to_string(path)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(self.run_script(&name, &script))
    }

    /// Run a scenario given as script text
    pub fn run_script(&mut self, name: &str, script: &str) -> ScenarioReport {
        let start = Instant::now();
        let mut failures = Vec::new();
        let mut orders_processed = 0;
        let mut trades_executed = 0;

        for (index, line) in script.lines().enumerate() {
            let number = index + 1;
            if line.trim().is_empty() {
                continue;
            }
            match ScenarioCommand::parse(line) {
                Ok(ScenarioCommand::Comment(_)) => {}
                Ok(command) => {
                    let is_order = matches!(
                        command,
                        ScenarioCommand::AddLimit { .. }
                            | ScenarioCommand::AddMarket { .. }
                            | ScenarioCommand::AddSlippageMarket { .. }
                    );
                    let outcome = self.execute(&command);
                    if outcome.applied {
                        if is_order {
                            orders_processed += 1;
                        }
                        if outcome.traded {
                            trades_executed += 1;
                        }
                    } else {
                        debug!(scenario = name, line = number, ?command, "command failed");
                        failures.push(LineFailure {
                            line: number,
                            message: format!("command failed: {}", line.trim()),
                        });
                    }
                }
                Err(error) => {
                    warn!(scenario = name, line = number, %error, "parse error");
                    failures.push(LineFailure {
                        line: number,
                        message: error.to_string(),
                    });
                }
            }
        }

        let mut book_stats = BTreeMap::new();
        for symbol in self.books.active_symbols() {
            if let Some(book) = self.books.get(symbol) {
                book_stats.insert(symbol, book.stats());
            }
        }

        let execution_time_ms = start.elapsed().as_secs_f64() * 1_000.0;
        let passed = failures.is_empty();

        self.stats.total_scenarios += 1;
        if passed {
            self.stats.passed_scenarios += 1;
        } else {
            self.stats.failed_scenarios += 1;
        }
        self.stats.total_execution_time_ms += execution_time_ms;
        self.stats.avg_execution_time_ms =
            self.stats.total_execution_time_ms / self.stats.total_scenarios as f64;

        ScenarioReport {
            name: name.to_string(),
            passed,
            failures,
            execution_time_ms,
            orders_processed,
            trades_executed,
            book_stats,
            position_stats: self.ledger.stats(),
        }
    }

    fn execute(&mut self, command: &ScenarioCommand) -> Outcome {
        match command {
            ScenarioCommand::EnableMatching => {
                self.matching_enabled = true;
                Outcome::ok()
            }
            ScenarioCommand::AddSymbol { symbol, .. } | ScenarioCommand::AddBook { symbol } => {
                self.books.book(*symbol);
                Outcome::ok()
            }
            // Books are never destroyed; the deletes are accepted as no-ops.
            ScenarioCommand::DeleteSymbol { .. } | ScenarioCommand::DeleteBook { .. } => {
                Outcome::ok()
            }
            ScenarioCommand::AddLimit {
                side,
                order_id,
                symbol,
                price,
                quantity,
                ..
            } => {
                if self
                    .books
                    .add_order(*symbol, *order_id, *price, *quantity, *side, OrderType::Limit)
                {
                    self.order_symbols.insert(*order_id, *symbol);
                    Outcome::ok()
                } else {
                    Outcome::failed()
                }
            }
            ScenarioCommand::AddMarket {
                side,
                order_id,
                symbol,
                quantity,
                ..
            } => self.execute_market(*side, *order_id, *symbol, *quantity),
            ScenarioCommand::AddSlippageMarket {
                side,
                order_id,
                symbol,
                quantity,
                slippage,
                ..
            } => self.execute_slippage_market(*side, *order_id, *symbol, *quantity, *slippage),
            ScenarioCommand::Reduce { order_id, quantity } => {
                let Some(&symbol) = self.order_symbols.get(order_id) else {
                    return Outcome::failed();
                };
                if self.books.cancel_order(symbol, *order_id, *quantity) {
                    Outcome::ok()
                } else {
                    Outcome::failed()
                }
            }
            ScenarioCommand::Modify {
                order_id,
                price,
                quantity,
            } => {
                let Some(&symbol) = self.order_symbols.get(order_id) else {
                    return Outcome::failed();
                };
                if self.books.modify_order(symbol, *order_id, *price, *quantity) {
                    Outcome::ok()
                } else {
                    Outcome::failed()
                }
            }
            ScenarioCommand::Replace {
                old_id,
                new_id,
                price,
                quantity,
            } => {
                let Some(&symbol) = self.order_symbols.get(old_id) else {
                    return Outcome::failed();
                };
                let book = self.books.book(symbol);
                let Some(old_order) = book.get_order(*old_id) else {
                    return Outcome::failed();
                };
                if !book.cancel_order(*old_id, Quantity::ZERO) {
                    return Outcome::failed();
                }
                self.order_symbols.remove(old_id);
                if book.add_order(*new_id, *price, *quantity, old_order.side, OrderType::Limit) {
                    self.order_symbols.insert(*new_id, symbol);
                    Outcome::ok()
                } else {
                    Outcome::failed()
                }
            }
            ScenarioCommand::DeleteOrder { order_id } => {
                let Some(&symbol) = self.order_symbols.get(order_id) else {
                    return Outcome::failed();
                };
                if self.books.cancel_order(symbol, *order_id, Quantity::ZERO) {
                    self.order_symbols.remove(order_id);
                    Outcome::ok()
                } else {
                    Outcome::failed()
                }
            }
            ScenarioCommand::Comment(_) => Outcome::ok(),
        }
    }

    /// Execute a market order at the opposite touch
    ///
    /// Without matching enabled or without a touch to hit, the command
    /// is accepted and does nothing.
    fn execute_market(
        &mut self,
        side: Side,
        order_id: OrderId,
        symbol: SymbolId,
        quantity: Quantity,
    ) -> Outcome {
        if !self.matching_enabled {
            return Outcome::ok();
        }
        let book = self.books.book(symbol);
        let execution_price = match side {
            Side::Buy => book.best_ask().0,
            Side::Sell => book.best_bid().0,
        };
        if execution_price.is_zero() {
            return Outcome::ok();
        }
        self.fill(side, order_id, symbol, quantity, execution_price)
    }

    /// Execute a market order priced off its own side's touch
    ///
    /// A buy executes up to `best_bid + slippage`, a sell down to
    /// `best_ask - slippage`; the order needs its own side quoted to
    /// establish the reference price.
    fn execute_slippage_market(
        &mut self,
        side: Side,
        order_id: OrderId,
        symbol: SymbolId,
        quantity: Quantity,
        slippage: Price,
    ) -> Outcome {
        if !self.matching_enabled {
            return Outcome::ok();
        }
        let book = self.books.book(symbol);
        let execution_price = match side {
            Side::Buy => {
                let (bid, _) = book.best_bid();
                if bid.is_zero() {
                    return Outcome::ok();
                }
                bid + slippage
            }
            Side::Sell => {
                let (ask, _) = book.best_ask();
                if ask.is_zero() {
                    return Outcome::ok();
                }
                ask - slippage
            }
        };
        self.fill(side, order_id, symbol, quantity, execution_price)
    }

    fn fill(
        &mut self,
        side: Side,
        order_id: OrderId,
        symbol: SymbolId,
        quantity: Quantity,
        execution_price: Price,
    ) -> Outcome {
        let book = self.books.book(symbol);
        if book.execute_trade(execution_price, quantity, side) {
            self.ledger
                .record_trade(symbol, execution_price, quantity, side, order_id);
            Outcome::traded()
        } else {
            Outcome::ok()
        }
    }
}
