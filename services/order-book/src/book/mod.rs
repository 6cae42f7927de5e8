//! Per-symbol order book
//!
//! Levels are pool records referenced by generational handles; each
//! order carries the handle of the level it rests in for O(1) detach.
//! The order index is a `BTreeMap`, so executions distribute across a
//! level's orders in ascending id order; deterministic, but not
//! price-time priority.
//!
//! Every public method takes the instance lock once for its whole
//! duration; derived queries (mid, spread, stats) are computed from
//! non-locking internal helpers inside that single critical section.

mod ladder;
mod order;
mod price_level;

pub use order::Order;
pub use price_level::PriceLevel;

use crate::pool::{Handle, Pool, PoolStats};
use ladder::{AskLadder, BidLadder};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use types::clock::{self, Timestamp};
use types::ids::{OrderId, SymbolId};
use types::numeric::{Price, Quantity};
use types::order::{OrderStatus, OrderType, Side};

/// Order records pre-allocated per book
pub const DEFAULT_ORDER_CAPACITY: usize = 10_000;
/// Level records pre-allocated per book
pub const DEFAULT_LEVEL_CAPACITY: usize = 1_000;

/// Point-in-time book statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BookStats {
    pub total_orders: usize,
    pub active_orders: usize,
    pub bid_levels: usize,
    pub ask_levels: usize,
    pub best_bid: Price,
    pub best_ask: Price,
    pub mid: Price,
    pub spread: Price,
}

/// Thread-safe order book for one symbol
///
/// Domain failures (duplicate id, unknown id, non-active target, empty
/// opposite side) are reported as `false`; no operation panics for
/// them. Running out of memory while growing a pool is fatal.
pub struct OrderBook {
    symbol: SymbolId,
    inner: Mutex<BookInner>,
}

struct BookInner {
    symbol: SymbolId,
    bids: BidLadder,
    asks: AskLadder,
    orders: BTreeMap<OrderId, Handle>,
    order_pool: Pool<Order>,
    level_pool: Pool<PriceLevel>,
}

impl OrderBook {
    pub fn new(symbol: SymbolId) -> Self {
        Self::with_capacity(symbol, DEFAULT_ORDER_CAPACITY, DEFAULT_LEVEL_CAPACITY)
    }

    pub fn with_capacity(symbol: SymbolId, order_capacity: usize, level_capacity: usize) -> Self {
        Self {
            symbol,
            inner: Mutex::new(BookInner {
                symbol,
                bids: BidLadder::default(),
                asks: AskLadder::default(),
                orders: BTreeMap::new(),
                order_pool: Pool::new(order_capacity),
                level_pool: Pool::new(level_capacity),
            }),
        }
    }

    pub fn symbol(&self) -> SymbolId {
        self.symbol
    }

    /// Add a resting limit order
    ///
    /// Returns false for a duplicate id or zero quantity. Marketable
    /// prices do not cross here; liquidity is only consumed through
    /// [`execute_trade`](Self::execute_trade).
    pub fn add_order(
        &self,
        order_id: OrderId,
        price: Price,
        quantity: Quantity,
        side: Side,
        order_type: OrderType,
    ) -> bool {
        self.locked().add_order(order_id, price, quantity, side, order_type)
    }

    /// Cancel part or all of an order
    ///
    /// `quantity` of zero cancels the full remaining amount; otherwise
    /// the cancel is clamped to what remains. An order whose remaining
    /// reaches zero leaves the book and its record returns to the pool.
    pub fn cancel_order(&self, order_id: OrderId, quantity: Quantity) -> bool {
        self.locked().cancel_order(order_id, quantity)
    }

    /// Re-price and re-size an active order
    ///
    /// The fill-to-date is preserved; the remaining quantity moves to
    /// the level at `new_price`. A `new_quantity` below the amount
    /// already consumed is rejected.
    pub fn modify_order(&self, order_id: OrderId, new_price: Price, new_quantity: Quantity) -> bool {
        self.locked().modify_order(order_id, new_price, new_quantity)
    }

    /// Execute an aggressor against the resting side
    ///
    /// Walks opposite levels best-first, consuming up to `quantity`
    /// while the level price is within `price`. Returns true iff any
    /// quantity was taken.
    pub fn execute_trade(&self, price: Price, quantity: Quantity, side: Side) -> bool {
        self.locked().execute_trade(price, quantity, side)
    }

    /// Best bid as `(price, total_quantity)`, zeros when the side is empty
    pub fn best_bid(&self) -> (Price, Quantity) {
        self.locked().best_bid()
    }

    /// Best ask as `(price, total_quantity)`, zeros when the side is empty
    pub fn best_ask(&self) -> (Price, Quantity) {
        self.locked().best_ask()
    }

    /// Midpoint of the touch, zero if either side is empty
    pub fn mid(&self) -> Price {
        self.locked().mid()
    }

    /// Touch spread, zero if either side is empty
    pub fn spread(&self) -> Price {
        self.locked().spread()
    }

    /// Up to `depth` bid levels in book order
    pub fn bids(&self, depth: usize) -> Vec<(Price, Quantity)> {
        self.locked().depth(Side::Buy, depth)
    }

    /// Up to `depth` ask levels in book order
    pub fn asks(&self, depth: usize) -> Vec<(Price, Quantity)> {
        self.locked().depth(Side::Sell, depth)
    }

    /// Copy of an indexed order
    pub fn get_order(&self, order_id: OrderId) -> Option<Order> {
        self.locked().get_order(order_id)
    }

    pub fn order_count(&self) -> usize {
        self.locked().orders.len()
    }

    pub fn level_count(&self) -> usize {
        let inner = self.locked();
        inner.bids.len() + inner.asks.len()
    }

    pub fn is_empty(&self) -> bool {
        let inner = self.locked();
        inner.bids.is_empty() && inner.asks.is_empty()
    }

    pub fn stats(&self) -> BookStats {
        self.locked().stats()
    }

    pub fn order_pool_stats(&self) -> PoolStats {
        self.locked().order_pool.stats()
    }

    pub fn level_pool_stats(&self) -> PoolStats {
        self.locked().level_pool.stats()
    }

    fn locked(&self) -> MutexGuard<'_, BookInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl BookInner {
    fn add_order(
        &mut self,
        order_id: OrderId,
        price: Price,
        quantity: Quantity,
        side: Side,
        order_type: OrderType,
    ) -> bool {
        if quantity.is_zero() || self.orders.contains_key(&order_id) {
            return false;
        }
        let now = clock::now();
        let level_handle = self.level_for(price, side, now);
        let handle = self.order_pool.allocate();
        let Some(order) = self.order_pool.get_mut(handle) else {
            return false;
        };
        *order = Order {
            id: order_id,
            symbol: self.symbol,
            price,
            quantity,
            filled_quantity: Quantity::ZERO,
            side,
            order_type,
            status: OrderStatus::Active,
            timestamp: now,
            level: Some(level_handle),
        };
        self.orders.insert(order_id, handle);
        if let Some(level) = self.level_pool.get_mut(level_handle) {
            level.place(quantity, now);
        }
        true
    }

    fn cancel_order(&mut self, order_id: OrderId, quantity: Quantity) -> bool {
        let Some(&handle) = self.orders.get(&order_id) else {
            return false;
        };
        let now = clock::now();
        let Some(order) = self.order_pool.get_mut(handle) else {
            return false;
        };
        if order.status != OrderStatus::Active {
            return false;
        }

        let remaining = order.remaining();
        let cancel_qty = if quantity.is_zero() {
            remaining
        } else {
            quantity.min(remaining)
        };
        order.filled_quantity += cancel_qty;
        order.timestamp = now;

        let done = order.remaining().is_zero();
        let side = order.side;
        let price = order.price;
        let level_handle = order.level;
        if done {
            order.status = OrderStatus::Filled;
            order.level = None;
        }

        if let Some(lh) = level_handle {
            if let Some(level) = self.level_pool.get_mut(lh) {
                if done {
                    level.withdraw(cancel_qty, now);
                } else {
                    level.reduce(cancel_qty, now);
                }
                if level.is_empty() {
                    self.remove_level(price, side);
                }
            }
        }

        if done {
            self.orders.remove(&order_id);
            self.order_pool.free(handle);
        }
        true
    }

    fn modify_order(&mut self, order_id: OrderId, new_price: Price, new_quantity: Quantity) -> bool {
        let Some(&handle) = self.orders.get(&order_id) else {
            return false;
        };
        let now = clock::now();
        let Some(order) = self.order_pool.get_mut(handle) else {
            return false;
        };
        if order.status != OrderStatus::Active {
            return false;
        }
        // A size below the consumed amount would leave negative remaining.
        if new_quantity < order.filled_quantity {
            return false;
        }

        let old_remaining = order.remaining();
        let old_price = order.price;
        let side = order.side;
        let old_level = order.level;

        order.price = new_price;
        order.quantity = new_quantity;
        order.timestamp = now;
        order.level = None;

        if let Some(lh) = old_level {
            if let Some(level) = self.level_pool.get_mut(lh) {
                level.withdraw(old_remaining, now);
                if level.is_empty() {
                    self.remove_level(old_price, side);
                }
            }
        }

        // Shrinking to exactly the consumed amount leaves nothing to
        // rest: the order completes instead of occupying an empty level.
        let Some(order) = self.order_pool.get_mut(handle) else {
            return false;
        };
        if order.remaining().is_zero() {
            order.status = OrderStatus::Filled;
            self.orders.remove(&order_id);
            self.order_pool.free(handle);
            return true;
        }

        let new_level = self.level_for(new_price, side, now);
        let Some(order) = self.order_pool.get_mut(handle) else {
            return false;
        };
        order.level = Some(new_level);
        let new_remaining = order.remaining();
        if let Some(level) = self.level_pool.get_mut(new_level) {
            level.place(new_remaining, now);
        }
        true
    }

    fn execute_trade(&mut self, limit: Price, quantity: Quantity, side: Side) -> bool {
        let now = clock::now();
        let mut remaining = quantity;

        while !remaining.is_zero() {
            let best = match side {
                Side::Buy => self.asks.best(),
                Side::Sell => self.bids.best(),
            };
            let Some((level_price, level_handle)) = best else {
                break;
            };
            let crossed = match side {
                Side::Buy => level_price <= limit,
                Side::Sell => level_price >= limit,
            };
            if !crossed {
                break;
            }
            let Some(level_total) = self.level_pool.get(level_handle).map(|l| l.total_quantity)
            else {
                break;
            };

            let take = remaining.min(level_total);

            // Distribute across this level's orders in ascending id order.
            let mut left = take;
            let mut completed: Vec<(OrderId, Handle)> = Vec::new();
            for (&oid, &oh) in self.orders.iter() {
                if left.is_zero() {
                    break;
                }
                let Some(order) = self.order_pool.get_mut(oh) else {
                    continue;
                };
                if order.level != Some(level_handle) || order.status != OrderStatus::Active {
                    continue;
                }
                let fill = left.min(order.remaining());
                order.filled_quantity += fill;
                order.timestamp = now;
                left -= fill;
                if order.remaining().is_zero() {
                    order.status = OrderStatus::Filled;
                    order.level = None;
                    completed.push((oid, oh));
                }
            }

            remaining -= take;
            if let Some(level) = self.level_pool.get_mut(level_handle) {
                level.consume(take, completed.len() as u32, now);
            }
            for (oid, oh) in completed {
                self.orders.remove(&oid);
                self.order_pool.free(oh);
            }
            let emptied = self
                .level_pool
                .get(level_handle)
                .map(|l| l.is_empty())
                .unwrap_or(false);
            if emptied {
                self.remove_level(level_price, side.opposite());
            }
        }

        remaining < quantity
    }

    fn best_bid(&self) -> (Price, Quantity) {
        self.bids
            .best()
            .and_then(|(price, handle)| {
                self.level_pool.get(handle).map(|l| (price, l.total_quantity))
            })
            .unwrap_or((Price::ZERO, Quantity::ZERO))
    }

    fn best_ask(&self) -> (Price, Quantity) {
        self.asks
            .best()
            .and_then(|(price, handle)| {
                self.level_pool.get(handle).map(|l| (price, l.total_quantity))
            })
            .unwrap_or((Price::ZERO, Quantity::ZERO))
    }

    fn mid(&self) -> Price {
        let (bid, _) = self.best_bid();
        let (ask, _) = self.best_ask();
        if bid.is_zero() || ask.is_zero() {
            Price::ZERO
        } else {
            bid.midpoint(ask)
        }
    }

    fn spread(&self) -> Price {
        let (bid, _) = self.best_bid();
        let (ask, _) = self.best_ask();
        if bid.is_zero() || ask.is_zero() {
            Price::ZERO
        } else {
            ask - bid
        }
    }

    fn depth(&self, side: Side, depth: usize) -> Vec<(Price, Quantity)> {
        let lookup = |(price, handle): (Price, Handle)| {
            self.level_pool.get(handle).map(|l| (price, l.total_quantity))
        };
        match side {
            Side::Buy => self.bids.iter().take(depth).filter_map(lookup).collect(),
            Side::Sell => self.asks.iter().take(depth).filter_map(lookup).collect(),
        }
    }

    fn get_order(&self, order_id: OrderId) -> Option<Order> {
        self.orders
            .get(&order_id)
            .and_then(|&handle| self.order_pool.get(handle))
            .copied()
    }

    fn stats(&self) -> BookStats {
        let (best_bid, _) = self.best_bid();
        let (best_ask, _) = self.best_ask();
        let active_orders = self
            .orders
            .values()
            .filter(|&&handle| {
                self.order_pool
                    .get(handle)
                    .map(|o| o.status == OrderStatus::Active)
                    .unwrap_or(false)
            })
            .count();
        BookStats {
            total_orders: self.orders.len(),
            active_orders,
            bid_levels: self.bids.len(),
            ask_levels: self.asks.len(),
            best_bid,
            best_ask,
            mid: self.mid(),
            spread: self.spread(),
        }
    }

    fn level_for(&mut self, price: Price, side: Side, now: Timestamp) -> Handle {
        let existing = match side {
            Side::Buy => self.bids.get(price),
            Side::Sell => self.asks.get(price),
        };
        if let Some(handle) = existing {
            return handle;
        }
        let handle = self.level_pool.allocate();
        if let Some(level) = self.level_pool.get_mut(handle) {
            level.reset(price, now);
        }
        match side {
            Side::Buy => self.bids.insert(price, handle),
            Side::Sell => self.asks.insert(price, handle),
        }
        handle
    }

    fn remove_level(&mut self, price: Price, side: Side) {
        let removed = match side {
            Side::Buy => self.bids.remove(price),
            Side::Sell => self.asks.remove(price),
        };
        if let Some(handle) = removed {
            self.level_pool.free(handle);
        }
    }
}
