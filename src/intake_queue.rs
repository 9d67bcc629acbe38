//! Thread-safe FIFO handing incoming orders from submitters to the matcher.
//!
//! A mutex + condvar, exactly as the original C++ `Orderbook` uses
//! (`std::mutex` + `std::condition_variable` in
//! `examples/original_source/engine/include/Orderbook/Orderbook.hpp`), and
//! exactly as spec.md §4.6 specifies. `pop_blocking` pops from the *front*
//! (FIFO) — one source variant in the original popped from the back (LIFO);
//! spec.md resolves that ambiguity in favor of FIFO, since LIFO would
//! violate time priority across orders, and that's what's implemented here.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

use crate::order::Order;

struct State {
    queue: VecDeque<Order>,
    shutdown: bool,
}

pub struct IntakeQueue {
    state: Mutex<State>,
    not_empty: Condvar,
}

impl IntakeQueue {
    pub fn new() -> Self {
        IntakeQueue {
            state: Mutex::new(State {
                queue: VecDeque::new(),
                shutdown: false,
            }),
            not_empty: Condvar::new(),
        }
    }

    /// Push an order to the back of the queue and wake one waiter.
    ///
    /// Pushes from multiple submitter threads are serialized by the intake
    /// mutex, so FIFO order is preserved across threads, not just within
    /// one.
    pub fn push(&self, order: Order) {
        {
            let mut state = self.state.lock().unwrap();
            state.queue.push_back(order);
        }
        self.not_empty.notify_one();
    }

    /// Block until an order is available or shutdown is requested with an
    /// empty queue, in which case `None` is returned.
    pub fn pop_blocking(&self) -> Option<Order> {
        let mut state = self.state.lock().unwrap();
        loop {
            if let Some(order) = state.queue.pop_front() {
                return Some(order);
            }
            if state.shutdown {
                return None;
            }
            state = self.not_empty.wait(state).unwrap();
        }
    }

    /// Request shutdown, waking every waiter.
    ///
    /// If `discard` is true, any orders still queued are dropped immediately
    /// (the "discard" `drain_on_shutdown = false` configuration); otherwise
    /// they remain queued and `pop_blocking` keeps draining them until the
    /// queue empties (the default, "drain" configuration).
    pub fn shutdown(&self, discard: bool) {
        {
            let mut state = self.state.lock().unwrap();
            if discard {
                state.queue.clear();
            }
            state.shutdown = true;
        }
        self.not_empty.notify_all();
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().unwrap().queue.is_empty()
    }
}

impl Default for IntakeQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::Side;
    use crate::price::Price;
    use std::sync::Arc;
    use std::thread;

    fn order(id: u64) -> Order {
        Order::limit(id, Side::Buy, Price::new(1, 0), 1)
    }

    #[test]
    fn fifo_within_a_single_thread() {
        let q = IntakeQueue::new();
        q.push(order(1));
        q.push(order(2));
        q.push(order(3));
        assert_eq!(q.pop_blocking().unwrap().id(), 1);
        assert_eq!(q.pop_blocking().unwrap().id(), 2);
        assert_eq!(q.pop_blocking().unwrap().id(), 3);
    }

    #[test]
    fn pop_blocking_returns_none_after_shutdown_with_empty_queue() {
        let q = IntakeQueue::new();
        q.shutdown(false);
        assert!(q.pop_blocking().is_none());
    }

    #[test]
    fn drain_mode_still_returns_queued_orders_after_shutdown() {
        let q = IntakeQueue::new();
        q.push(order(1));
        q.shutdown(false);
        assert_eq!(q.pop_blocking().unwrap().id(), 1);
        assert!(q.pop_blocking().is_none());
    }

    #[test]
    fn discard_mode_drops_queued_orders_on_shutdown() {
        let q = IntakeQueue::new();
        q.push(order(1));
        q.shutdown(true);
        assert!(q.pop_blocking().is_none());
    }

    #[test]
    fn wakes_a_blocked_waiter_on_push() {
        let q = Arc::new(IntakeQueue::new());
        let q2 = q.clone();
        let handle = thread::spawn(move || q2.pop_blocking());
        thread::sleep(std::time::Duration::from_millis(20));
        q.push(order(7));
        let got = handle.join().unwrap().unwrap();
        assert_eq!(got.id(), 7);
    }
}
