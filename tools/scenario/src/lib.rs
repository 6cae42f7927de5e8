//! Scenario script tooling
//!
//! A scenario file is a line-oriented script of book and ledger
//! commands. The runner replays it against a live registry and ledger,
//! collecting per-line failures and final statistics.

mod command;
mod runner;

pub use command::{CommandError, ScenarioCommand};
pub use runner::{LineFailure, RunnerStats, ScenarioError, ScenarioReport, ScenarioRunner};
