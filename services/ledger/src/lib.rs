//! Position and PnL ledger
//!
//! Records fills against per-symbol gross lots, crystallizes realized
//! PnL on closing fills, marks open lots to market, and enforces
//! pre-trade position and loss limits.

mod tracker;

pub use tracker::{LedgerStats, PositionLedger};
