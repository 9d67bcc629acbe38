//! The matching state machine: `INCOMING -> CROSSING -> (FILLED | RESIDUAL)
//! -> (RESTED | KILLED | REJECTED)`, per spec.md §4.5.

use crate::book::{AskBook, BidBook, LevelKey, SideBook};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::observer::EngineObserver;
use crate::order::{Order, OrderType, Side};
use crate::price::Price;

/// Both sides of the book for one instrument.
#[derive(Debug, Default)]
pub struct Books {
    pub bids: BidBook,
    pub asks: AskBook,
}

impl Books {
    pub fn new() -> Self {
        Books::default()
    }
}

/// Whether `incoming`'s limit price crosses the opposite book's `best`
/// price. Market orders always cross (callers never call this for them).
///
/// - BUY LIMIT vs. asks (ascending): crosses iff `best <= incoming_price`.
/// - SELL LIMIT vs. bids (descending): crosses iff `best >= incoming_price`.
fn crosses(incoming_side: Side, best_opposite_price: Price, incoming_price: Price) -> bool {
    match incoming_side {
        Side::Buy => best_opposite_price <= incoming_price,
        Side::Sell => best_opposite_price >= incoming_price,
    }
}

/// Walk `book` best-price-first, pairing `incoming` against resting orders
/// FIFO within each level, until `incoming` is filled, the book is
/// exhausted, or (for LIMIT orders) the next level no longer crosses.
fn cross_against<K: LevelKey>(
    incoming: &mut Order,
    book: &mut SideBook<K>,
    observer: &dyn EngineObserver,
) -> Result<(), EngineError> {
    loop {
        if incoming.is_filled() {
            break;
        }

        let best_price = match book.best() {
            Some((price, _)) => price,
            None => break,
        };

        if incoming.order_type() == OrderType::Limit
            && !crosses(incoming.side(), best_price, incoming.price())
        {
            break;
        }

        let key = K::from_price(best_price);
        let level = book.level_mut(key).ok_or(EngineError::BookInvariantViolation(
            "best level vanished mid-match",
        ))?;

        loop {
            if incoming.is_filled() {
                break;
            }
            let (resting_filled, resting_snapshot) = {
                let resting = match level.front_mut() {
                    Some(resting) => resting,
                    None => break,
                };
                incoming.match_against(resting)?;
                (resting.is_filled(), resting.clone())
            };
            tracing::debug!(
                taker = incoming.id(),
                maker = resting_snapshot.id(),
                qty = resting_snapshot.filled_quantity(),
                "fill"
            );
            observer.on_fill(incoming, &resting_snapshot);
            if resting_filled {
                level.pop_front();
            } else {
                break;
            }
        }

        book.remove_if_empty(key);
    }
    Ok(())
}

/// Process one order dequeued from the intake queue: cross it against the
/// opposite book, then rest, kill, or reject whatever remains.
pub fn process(
    mut order: Order,
    books: &mut Books,
    observer: &dyn EngineObserver,
    config: &EngineConfig,
) -> Result<(), EngineError> {
    if !config.reject_invalid && order.validate().is_err() {
        tracing::warn!(id = order.id(), "rejecting invalid order dequeued under reject_invalid=false");
        observer.on_killed(&order);
        return Ok(());
    }

    match order.side() {
        Side::Buy => cross_against(&mut order, &mut books.asks, observer)?,
        Side::Sell => cross_against(&mut order, &mut books.bids, observer)?,
    }

    if order.is_filled() {
        tracing::trace!(id = order.id(), "order fully filled during crossing");
        return Ok(());
    }

    match order.order_type() {
        OrderType::Limit => {
            let side = order.side();
            let remaining = order.clone();
            match side {
                Side::Buy => books.bids.insert(order)?,
                Side::Sell => books.asks.insert(order)?,
            }
            tracing::info!(id = remaining.id(), remaining = remaining.remaining_quantity(), "added to book");
            observer.on_added_to_book(&remaining);
        }
        OrderType::Market => {
            tracing::info!(id = order.id(), remaining = order.remaining_quantity(), "killed");
            observer.on_killed(&order);
        }
    }
    Ok(())
}
