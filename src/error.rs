//! Error taxonomy for the matching engine.
//!
//! Generalizes the teacher's `errors.rs` (a single `thiserror` enum for one
//! bot-specific failure) into the engine's actual failure modes from
//! spec.md §7.

use thiserror::Error;

use crate::order::OverfillError;

/// Why an order failed validation.
///
/// Surfaced synchronously from [`crate::engine::Engine::submit`] when
/// `reject_invalid` is set (the default), or via `on_killed` at dequeue time
/// otherwise.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderValidationError {
    #[error("a limit order must carry a valid price")]
    MissingLimitPrice,
    #[error("a market order must not carry a price")]
    UnexpectedMarketPrice,
    #[error("order quantity must be positive")]
    ZeroQuantity,
}

/// Engine-level errors.
///
/// `Overfill` and `BookInvariantViolation` are fatal: they indicate a bug in
/// the matching core itself and terminate the matcher worker. `InvalidOrder`
/// and `ShutdownInProgress` are ordinary, expected rejections reported back
/// to the caller of `submit`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("attempted to fill more than the remaining quantity")]
    Overfill(#[from] OverfillError),

    #[error("invalid order: {0}")]
    InvalidOrder(#[from] OrderValidationError),

    #[error("order book invariant violated: {0}")]
    BookInvariantViolation(&'static str),

    #[error("engine shutdown in progress or complete")]
    ShutdownInProgress,
}
