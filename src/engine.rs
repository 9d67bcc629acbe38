//! The public facade: owns both books, the intake queue, the matcher
//! worker, and the callback set.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::intake_queue::IntakeQueue;
use crate::matching::{self, Books};
use crate::observer::EngineObserver;
use crate::order::Order;

struct Shared {
    intake: IntakeQueue,
    observer: Box<dyn EngineObserver>,
    callback_lock: Mutex<()>,
    config: EngineConfig,
    fatal_error: Mutex<Option<EngineError>>,
}

impl Shared {
    /// Run `f` with the callback lock held, so no two callbacks — whether
    /// invoked from a submitter thread (`on_queued`) or from the matcher
    /// thread (everything else) — ever run concurrently with each other.
    /// Never held across a blocking wait, so it introduces no lock-ordering
    /// hazard with the intake mutex (spec.md §5).
    fn with_callback_lock<F: FnOnce()>(&self, f: F) {
        let _guard = self.callback_lock.lock().unwrap();
        f();
    }
}

/// The matching engine facade.
///
/// Construction spawns exactly one matcher worker thread. `submit` enqueues
/// an order for that worker to process. `shutdown` stops the worker and
/// joins it; it is idempotent and may be called from any thread, including
/// implicitly via `Drop`.
pub struct Engine {
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
    shutdown_called: AtomicBool,
}

impl Engine {
    /// Construct the engine with the given observer and configuration, and
    /// start its matcher worker.
    pub fn new(observer: impl EngineObserver + 'static, config: EngineConfig) -> Self {
        let shared = Arc::new(Shared {
            intake: IntakeQueue::new(),
            observer: Box::new(observer),
            callback_lock: Mutex::new(()),
            config,
            fatal_error: Mutex::new(None),
        });

        let worker_shared = shared.clone();
        let worker = thread::Builder::new()
            .name("matcher".to_string())
            .spawn(move || run_matcher(worker_shared))
            .expect("failed to spawn matcher worker thread");

        Engine {
            shared,
            worker: Mutex::new(Some(worker)),
            shutdown_called: AtomicBool::new(false),
        }
    }

    /// Construct the engine with default configuration.
    pub fn with_observer(observer: impl EngineObserver + 'static) -> Self {
        Self::new(observer, EngineConfig::default())
    }

    /// Enqueue `order` for the matcher to process.
    ///
    /// Rejected synchronously with [`EngineError::ShutdownInProgress`] if
    /// `shutdown` has already been called or the worker has died from a
    /// fatal invariant violation; rejected with
    /// [`EngineError::InvalidOrder`] if `reject_invalid` is set and the
    /// order fails validation.
    pub fn submit(&self, order: Order) -> Result<(), EngineError> {
        if self.shutdown_called.load(Ordering::Acquire) {
            return Err(EngineError::ShutdownInProgress);
        }
        if self.shared.fatal_error.lock().unwrap().is_some() {
            return Err(EngineError::ShutdownInProgress);
        }
        if self.shared.config.reject_invalid {
            order.validate()?;
        }

        self.shared.intake.push(order.clone());
        self.shared.with_callback_lock(|| {
            tracing::trace!(id = order.id(), "order queued");
            self.shared.observer.on_queued(&order);
        });
        Ok(())
    }

    /// Stop the matcher worker and join it. Idempotent: calling this more
    /// than once is a no-op after the first call, returning the same
    /// result.
    pub fn shutdown(&self) -> Result<(), EngineError> {
        if self.shutdown_called.swap(true, Ordering::AcqRel) {
            return self.fatal_result();
        }

        self.shared.intake.shutdown(!self.shared.config.drain_on_shutdown);
        if let Some(handle) = self.worker.lock().unwrap().take() {
            let _ = handle.join();
        }
        self.fatal_result()
    }

    fn fatal_result(&self) -> Result<(), EngineError> {
        match self.shared.fatal_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            tracing::error!(?err, "engine shutdown surfaced a fatal error");
        }
    }
}

fn run_matcher(shared: Arc<Shared>) {
    let mut books = Books::new();
    loop {
        let order = match shared.intake.pop_blocking() {
            Some(order) => order,
            None => {
                tracing::debug!("matcher worker exiting: intake queue drained and shutdown requested");
                return;
            }
        };

        let outcome = {
            // Matching runs without holding `callback_lock`; individual
            // observer calls inside `matching::process` briefly take it via
            // `with_callback_lock` at each emission point instead, since the
            // match loop itself needs to call the observer multiple times
            // per order. See `ObservingGuard` below.
            let guard = ObservingGuard { shared: &shared };
            matching::process(order, &mut books, &guard, &shared.config)
        };

        if let Err(err) = outcome {
            tracing::error!(?err, "fatal invariant violation in matcher worker; shutting down");
            *shared.fatal_error.lock().unwrap() = Some(err);
            shared.intake.shutdown(true);
            return;
        }
    }
}

/// Adapts `Shared` to `EngineObserver`, taking the callback lock around each
/// forwarded call so matcher-thread callbacks are serialized against
/// `on_queued` calls made from submitter threads.
struct ObservingGuard<'a> {
    shared: &'a Shared,
}

impl EngineObserver for ObservingGuard<'_> {
    fn on_queued(&self, order: &Order) {
        self.shared.with_callback_lock(|| self.shared.observer.on_queued(order));
    }

    fn on_fill(&self, incoming: &Order, resting: &Order) {
        self.shared
            .with_callback_lock(|| self.shared.observer.on_fill(incoming, resting));
    }

    fn on_added_to_book(&self, order: &Order) {
        self.shared
            .with_callback_lock(|| self.shared.observer.on_added_to_book(order));
    }

    fn on_killed(&self, order: &Order) {
        self.shared.with_callback_lock(|| self.shared.observer.on_killed(order));
    }
}
