//! Order identity, side/type, and partial-fill arithmetic.

use thiserror::Error;

use crate::price::Price;

/// Direction of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Buy,
    Sell,
}

/// Whether an order carries a limit price or sweeps the book unconditionally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderType {
    Limit,
    Market,
}

/// Attempted to fill more quantity than an order has remaining.
///
/// Should be unreachable by construction: the matcher always trades
/// `min(incoming.remaining, resting.remaining)`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("attempted to fill more than the remaining quantity")]
pub struct OverfillError;

/// A single order.
///
/// Identity (`id`, `side`, `order_type`, `price`, `initial_quantity`) is
/// immutable after construction; only `remaining_quantity` changes, and only
/// downward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    id: u64,
    side: Side,
    order_type: OrderType,
    price: Price,
    initial_quantity: u64,
    remaining_quantity: u64,
}

impl Order {
    /// Construct a LIMIT order.
    pub fn limit(id: u64, side: Side, price: Price, quantity: u64) -> Self {
        Order {
            id,
            side,
            order_type: OrderType::Limit,
            price,
            initial_quantity: quantity,
            remaining_quantity: quantity,
        }
    }

    /// Construct a MARKET order. Its price is always `Price::INVALID`.
    pub fn market(id: u64, side: Side, quantity: u64) -> Self {
        Order {
            id,
            side,
            order_type: OrderType::Market,
            price: Price::INVALID,
            initial_quantity: quantity,
            remaining_quantity: quantity,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn order_type(&self) -> OrderType {
        self.order_type
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn initial_quantity(&self) -> u64 {
        self.initial_quantity
    }

    pub fn remaining_quantity(&self) -> u64 {
        self.remaining_quantity
    }

    pub fn filled_quantity(&self) -> u64 {
        self.initial_quantity - self.remaining_quantity
    }

    pub fn is_filled(&self) -> bool {
        self.remaining_quantity == 0
    }

    /// Reduce `remaining_quantity` by `quantity`.
    pub fn fill(&mut self, quantity: u64) -> Result<(), OverfillError> {
        if quantity > self.remaining_quantity {
            return Err(OverfillError);
        }
        self.remaining_quantity -= quantity;
        Ok(())
    }

    /// Pair `self` (taker) against `resting` (maker), trading
    /// `min(self.remaining, resting.remaining)` from both sides atomically.
    ///
    /// Returns the traded quantity. The trade price is the maker's price —
    /// callers read `resting.price()` for that; this method only moves
    /// quantity.
    pub fn match_against(&mut self, resting: &mut Order) -> Result<u64, OverfillError> {
        let traded = self.remaining_quantity.min(resting.remaining_quantity);
        self.fill(traded)?;
        resting.fill(traded)?;
        Ok(traded)
    }

    /// Validates the invariants spec.md §7 calls `InvalidOrder`: a valid
    /// side/type pair, a limit order carrying a valid price (and a market
    /// order not carrying one), and a positive quantity.
    pub fn validate(&self) -> Result<(), crate::error::OrderValidationError> {
        use crate::error::OrderValidationError as E;

        if self.initial_quantity == 0 {
            return Err(E::ZeroQuantity);
        }
        match self.order_type {
            OrderType::Limit => {
                if !self.price.is_valid() {
                    return Err(E::MissingLimitPrice);
                }
            }
            OrderType::Market => {
                if self.price.is_valid() {
                    return Err(E::UnexpectedMarketPrice);
                }
            }
        }
        Ok(())
    }
}
