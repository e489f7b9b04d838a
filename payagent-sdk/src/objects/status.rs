//! Payment lifecycle objects.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of a payment request.
///
/// `Polling` is the only initial state. `Completed`, `Failed`, `TimedOut`
/// and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Polling,
    Distributing,
    Completed,
    Failed,
    TimedOut,
    Cancelled,
}

impl PaymentStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            PaymentStatus::Completed
                | PaymentStatus::Failed
                | PaymentStatus::TimedOut
                | PaymentStatus::Cancelled
        )
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Polling => write!(f, "polling"),
            PaymentStatus::Distributing => write!(f, "distributing"),
            PaymentStatus::Completed => write!(f, "completed"),
            PaymentStatus::Failed => write!(f, "failed"),
            PaymentStatus::TimedOut => write!(f, "timed_out"),
            PaymentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Response of the payment status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusResponse {
    pub request_id: Uuid,
    pub status: PaymentStatus,
    pub amount_base_units: String,
    pub split_percentage: u8,
    /// Present once the listener has finished.
    pub outcome: Option<DistributionSummary>,
}

/// Final outcome of a payment request.
///
/// `party_a_tx` may be set even when `success` is false: a failed second
/// transfer does not undo the first one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionSummary {
    pub success: bool,
    pub party_a_tx: Option<String>,
    pub party_b_tx: Option<String>,
    pub party_a_block: Option<u64>,
    pub party_b_block: Option<u64>,
    pub error: Option<String>,
}
