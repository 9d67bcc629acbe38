//! Single-instrument limit-order matching engine.
//!
//! A submit/match concurrency split: any number of threads call
//! [`Engine::submit`] to enqueue orders, while one dedicated matcher worker
//! drains them in arrival order and applies price-time priority matching
//! against a pair of [`book::SideBook`]s.

pub mod book;
pub mod config;
pub mod engine;
pub mod error;
pub mod intake_queue;
pub mod matching;
pub mod observer;
pub mod order;
pub mod price;
pub mod price_level;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{EngineError, OrderValidationError};
pub use observer::{ClosureObserver, EngineObserver, NullObserver};
pub use order::{Order, OrderType, OverfillError, Side};
pub use price::Price;
