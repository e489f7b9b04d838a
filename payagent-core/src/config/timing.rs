use std::time::Duration;

/// Default delay between two polling steps.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);
/// Default time a listener waits for its mint before giving up.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(150);
/// Default number of blocks behind the head included in each query.
pub const DEFAULT_LOOKBACK_BLOCKS: u64 = 10;

/// Timing of a payment listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingConfig {
    /// Delay between two polling steps.
    pub poll_interval: Duration,
    /// A listener times out once more than this has elapsed since it started.
    pub timeout: Duration,
    /// Each step queries `[head - lookback_blocks, head]`.
    pub lookback_blocks: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
            lookback_blocks: DEFAULT_LOOKBACK_BLOCKS,
        }
    }
}

impl TimingConfig {
    /// Inclusive block range to query when the chain head is at `head`.
    pub fn query_window(&self, head: u64) -> (u64, u64) {
        (head.saturating_sub(self.lookback_blocks), head)
    }
}
