//! Order book infrastructure
//!
//! A per-symbol limit order book built on recycled object pools: two
//! price-sorted ladders of aggregated levels, an id-sorted order index,
//! and an execution routine that consumes resting liquidity in price
//! order. The registry maps symbols to lazily created books.

pub mod book;
pub mod pool;
pub mod registry;

pub use book::{BookStats, Order, OrderBook, PriceLevel};
pub use pool::{Handle, Pool, PoolStats};
pub use registry::BookRegistry;
