//! Time source for elapsed-time checks.

use tokio::time::Instant;

/// Source of the current instant.
///
/// Listeners measure their timeout against this rather than calling
/// `Instant::now()` directly so tests can substitute their own clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Clock backed by the tokio timer.
///
/// Follows tokio's paused time under `#[tokio::test(start_paused = true)]`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}
