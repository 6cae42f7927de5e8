//! Position snapshot persistence
//!
//! Mirrors the ledger's positions into a fixed-layout backing file:
//! a dense array of equal-sized slots, one position per slot. This is
//! a snapshot, not a journal: a crash between flushes loses the
//! intervening fills. Trade history and book state are never persisted.

mod store;

pub use store::{PositionStore, StoreError, STORE_VERSION};
