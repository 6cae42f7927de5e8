//! Price-sorted ladders for the two book sides
//!
//! Both sides key levels by price in a `BTreeMap`; the bid ladder reads
//! it in reverse so that iteration always yields book order, best level
//! first, without negating keys.

use crate::pool::Handle;
use std::collections::BTreeMap;
use types::numeric::Price;

/// Buy-side ladder: highest price is best
#[derive(Debug, Default)]
pub(crate) struct BidLadder {
    levels: BTreeMap<Price, Handle>,
}

impl BidLadder {
    pub fn insert(&mut self, price: Price, handle: Handle) {
        self.levels.insert(price, handle);
    }

    pub fn remove(&mut self, price: Price) -> Option<Handle> {
        self.levels.remove(&price)
    }

    pub fn get(&self, price: Price) -> Option<Handle> {
        self.levels.get(&price).copied()
    }

    pub fn best(&self) -> Option<(Price, Handle)> {
        self.levels.iter().next_back().map(|(p, h)| (*p, *h))
    }

    /// Levels in book order (descending price)
    pub fn iter(&self) -> impl Iterator<Item = (Price, Handle)> + '_ {
        self.levels.iter().rev().map(|(p, h)| (*p, *h))
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

/// Sell-side ladder: lowest price is best
#[derive(Debug, Default)]
pub(crate) struct AskLadder {
    levels: BTreeMap<Price, Handle>,
}

impl AskLadder {
    pub fn insert(&mut self, price: Price, handle: Handle) {
        self.levels.insert(price, handle);
    }

    pub fn remove(&mut self, price: Price) -> Option<Handle> {
        self.levels.remove(&price)
    }

    pub fn get(&self, price: Price) -> Option<Handle> {
        self.levels.get(&price).copied()
    }

    pub fn best(&self) -> Option<(Price, Handle)> {
        self.levels.iter().next().map(|(p, h)| (*p, *h))
    }

    /// Levels in book order (ascending price)
    pub fn iter(&self) -> impl Iterator<Item = (Price, Handle)> + '_ {
        self.levels.iter().map(|(p, h)| (*p, *h))
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}
