//! Integer identifier types for engine entities
//!
//! Order and symbol ids are externally assigned wire-level integers:
//! a 64-bit order id unique within a book and a 16-bit symbol id.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Unique identifier for an order within a book
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(u64);

impl OrderId {
    /// Create an OrderId from its raw wire value
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw wire value
    pub const fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for OrderId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl FromStr for OrderId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Identifier for a traded instrument
///
/// Symbol id 0 is reserved: the persistence layer treats a zeroed
/// record as an unused slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolId(u16);

impl SymbolId {
    /// Create a SymbolId from its raw wire value
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    /// Get the raw wire value
    pub const fn raw(&self) -> u16 {
        self.0
    }

    /// Whether this is the reserved null symbol
    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u16> for SymbolId {
    fn from(raw: u16) -> Self {
        Self(raw)
    }
}

impl FromStr for SymbolId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}
