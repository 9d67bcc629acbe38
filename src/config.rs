//! Engine configuration options recognized at construction (spec.md §6).

/// Construction-time options for [`crate::engine::Engine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// If `true` (the default), the matcher worker finishes every order
    /// already on the intake queue before exiting on shutdown. If `false`,
    /// queued-but-not-yet-processed orders are discarded.
    pub drain_on_shutdown: bool,

    /// If `true` (the default), orders with an invalid side/type/price/
    /// quantity combination are rejected synchronously from `submit`. If
    /// `false`, they are queued anyway and rejected (via `on_killed`) when
    /// the matcher dequeues them.
    pub reject_invalid: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            drain_on_shutdown: true,
            reject_invalid: true,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }
}
