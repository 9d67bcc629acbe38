//! Price-sorted maps of [`PriceLevel`]s with side-specific ordering.
//!
//! Both sides share one generic structure (`SideBook<K>`) parameterised by a
//! key wrapper whose `Ord` impl encodes "which direction is best" — the ask
//! book's key sorts ascending (lowest ask first), the bid book's key sorts
//! descending (highest bid first). This realizes the "single generic
//! structure parameterised by a comparator" option from spec.md §9.

use std::collections::BTreeMap;

use crate::error::EngineError;
use crate::order::{Order, OrderType, Side};
use crate::price::Price;
use crate::price_level::PriceLevel;

/// A key wrapping [`Price`] whose `Ord` impl defines a side's "best price
/// first" traversal order.
pub trait LevelKey: Copy + Ord {
    /// The side this key's book holds.
    const SIDE: Side;

    fn from_price(price: Price) -> Self;
    fn price(&self) -> Price;
}

/// Ask book key: natural ascending order, so the lowest ask sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AskKey(Price);

impl PartialOrd for AskKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AskKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl LevelKey for AskKey {
    const SIDE: Side = Side::Sell;

    fn from_price(price: Price) -> Self {
        AskKey(price)
    }

    fn price(&self) -> Price {
        self.0
    }
}

/// Bid book key: reversed order, so the highest bid sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BidKey(Price);

impl PartialOrd for BidKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BidKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other.0.cmp(&self.0)
    }
}

impl LevelKey for BidKey {
    const SIDE: Side = Side::Buy;

    fn from_price(price: Price) -> Self {
        BidKey(price)
    }

    fn price(&self) -> Price {
        self.0
    }
}

/// A side-specific book of price levels, keyed so that `best()` is always
/// the most aggressive resting price on this side.
#[derive(Debug, Default)]
pub struct SideBook<K: LevelKey> {
    levels: BTreeMap<K, PriceLevel>,
}

impl<K: LevelKey> SideBook<K> {
    pub fn new() -> Self {
        SideBook {
            levels: BTreeMap::new(),
        }
    }

    /// The best (most aggressive) price level, or `None` if the book is
    /// empty.
    pub fn best(&self) -> Option<(Price, &PriceLevel)> {
        self.levels.iter().next().map(|(k, lvl)| (k.price(), lvl))
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Insert a resting order into the level at its price, creating the
    /// level if absent.
    ///
    /// # Errors
    /// Returns [`EngineError::BookInvariantViolation`] if `order`'s side or
    /// type doesn't belong in this book (e.g. a SELL order handed to the bid
    /// book, or a MARKET order that should never rest at all).
    pub fn insert(&mut self, order: Order) -> Result<(), EngineError> {
        if order.side() != K::SIDE {
            return Err(EngineError::BookInvariantViolation(
                "order side does not match this side of the book",
            ));
        }
        if order.order_type() != OrderType::Limit {
            return Err(EngineError::BookInvariantViolation(
                "only LIMIT orders may rest in a SideBook",
            ));
        }
        if !order.price().is_valid() {
            return Err(EngineError::BookInvariantViolation(
                "cannot insert an order with an INVALID price into a SideBook",
            ));
        }
        let key = K::from_price(order.price());
        self.levels.entry(key).or_insert_with(PriceLevel::new).push_back(order);
        Ok(())
    }

    /// Mutable access to the level for `key`, used by the matcher while
    /// walking best-price-first.
    pub fn level_mut(&mut self, key: K) -> Option<&mut PriceLevel> {
        self.levels.get_mut(&key)
    }

    /// Erase the level at `key` if it is present and empty. No-op
    /// otherwise — callers check emptiness themselves, this just removes.
    pub fn remove_if_empty(&mut self, key: K) {
        if self.levels.get(&key).is_some_and(PriceLevel::is_empty) {
            self.levels.remove(&key);
        }
    }

    /// Remove one order with the given id resting at `price`, pruning the
    /// level if it becomes empty.
    ///
    /// Optional per spec.md §4.4; not wired into the public `Engine` facade
    /// (see SPEC_FULL.md §4.4) but useful for tests and direct book
    /// manipulation.
    pub fn cancel(&mut self, id: u64, price: Price) -> Option<Order> {
        let key = K::from_price(price);
        let level = self.levels.get_mut(&key)?;
        let removed = level.remove(id);
        if level.is_empty() {
            self.levels.remove(&key);
        }
        removed
    }

    /// Iterate levels best-first, read-only — for snapshots/inspection.
    pub fn iter(&self) -> impl Iterator<Item = (Price, &PriceLevel)> {
        self.levels.iter().map(|(k, lvl)| (k.price(), lvl))
    }
}

pub type AskBook = SideBook<AskKey>;
pub type BidBook = SideBook<BidKey>;
