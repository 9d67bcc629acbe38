//! The engine's callback contract.
//!
//! Generalizes `crypto-zero-apex-engine`'s `OrderBookSyncer` trait (four
//! notification methods plus a no-op `EmptyOrderBookSyncer`) to this
//! engine's four events from spec.md §6.

use crate::order::Order;

/// Observer invoked by the matcher worker as it processes each order.
///
/// Every method receives an owned snapshot of the relevant order(s) — no
/// reference into engine-internal state escapes a callback, per spec.md §3's
/// ownership rule ("the incoming order presented to a callback is borrowed
/// for the duration of the callback; no long-lived reference escapes").
/// Implementations must be `Send + Sync`: the engine may hold the observer
/// behind an `Arc` shared between the submitter thread (for `on_queued`) and
/// the matcher thread (for everything else).
pub trait EngineObserver: Send + Sync {
    /// After an order has been placed on the intake queue by `submit`.
    fn on_queued(&self, order: &Order) {
        let _ = order;
    }

    /// Once per pairing of an incoming order with a resting order. Both
    /// orders reflect their post-fill residual quantity.
    fn on_fill(&self, incoming: &Order, resting: &Order) {
        let _ = (incoming, resting);
    }

    /// When a residual LIMIT order is inserted into its own-side book.
    fn on_added_to_book(&self, order: &Order) {
        let _ = order;
    }

    /// When a MARKET order exhausts the opposite book with residual
    /// quantity still unfilled, or when an order dequeued under
    /// `reject_invalid = false` turns out to be invalid.
    fn on_killed(&self, order: &Order) {
        let _ = order;
    }
}

/// An observer that does nothing. Useful in tests that only care about the
/// resulting book state, not the event stream.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl EngineObserver for NullObserver {}

type FillFn = Box<dyn Fn(&Order) + Send + Sync>;
type PairFn = Box<dyn Fn(&Order, &Order) + Send + Sync>;

/// Bundles four boxed closures into an [`EngineObserver`] — the "four
/// function-valued fields" alternative spec.md §9 explicitly allows, for
/// callers who'd rather not define a trait impl.
pub struct ClosureObserver {
    on_queued: FillFn,
    on_fill: PairFn,
    on_added_to_book: FillFn,
    on_killed: FillFn,
}

impl ClosureObserver {
    pub fn new(
        on_queued: impl Fn(&Order) + Send + Sync + 'static,
        on_fill: impl Fn(&Order, &Order) + Send + Sync + 'static,
        on_added_to_book: impl Fn(&Order) + Send + Sync + 'static,
        on_killed: impl Fn(&Order) + Send + Sync + 'static,
    ) -> Self {
        ClosureObserver {
            on_queued: Box::new(on_queued),
            on_fill: Box::new(on_fill),
            on_added_to_book: Box::new(on_added_to_book),
            on_killed: Box::new(on_killed),
        }
    }
}

impl EngineObserver for ClosureObserver {
    fn on_queued(&self, order: &Order) {
        (self.on_queued)(order)
    }

    fn on_fill(&self, incoming: &Order, resting: &Order) {
        (self.on_fill)(incoming, resting)
    }

    fn on_added_to_book(&self, order: &Order) {
        (self.on_added_to_book)(order)
    }

    fn on_killed(&self, order: &Order) {
        (self.on_killed)(order)
    }
}
