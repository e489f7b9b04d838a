//! Application state shared across all request handlers.

use payagent_core::agent::PaymentAgent;
use std::sync::Arc;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<PaymentAgent>,
}

impl AppState {
    pub fn new(agent: Arc<PaymentAgent>) -> Self {
        Self { agent }
    }
}
