use crate::entities::DistributionResult;
use payagent_sdk::objects::{DistributionSummary, PaymentStatus};
use uuid::Uuid;

/// Final report of one payment listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentCompleted {
    pub request_id: Uuid,
    /// Terminal status the listener ended in.
    pub status: PaymentStatus,
    /// Present when a mint was found and distribution was attempted.
    pub distribution: Option<DistributionResult>,
    /// `"timeout"`, `"cancelled"`, or the distribution error.
    pub error: Option<String>,
}

impl PaymentCompleted {
    pub const TIMEOUT_ERROR: &str = "timeout";
    pub const CANCELLED_ERROR: &str = "cancelled";

    pub fn distributed(request_id: Uuid, result: DistributionResult) -> Self {
        let status = if result.success {
            PaymentStatus::Completed
        } else {
            PaymentStatus::Failed
        };
        Self {
            request_id,
            status,
            error: result.error.clone(),
            distribution: Some(result),
        }
    }

    pub fn timed_out(request_id: Uuid) -> Self {
        Self {
            request_id,
            status: PaymentStatus::TimedOut,
            distribution: None,
            error: Some(Self::TIMEOUT_ERROR.to_string()),
        }
    }

    pub fn cancelled(request_id: Uuid) -> Self {
        Self {
            request_id,
            status: PaymentStatus::Cancelled,
            distribution: None,
            error: Some(Self::CANCELLED_ERROR.to_string()),
        }
    }

    pub fn success(&self) -> bool {
        self.status == PaymentStatus::Completed
    }

    pub fn summary(&self) -> DistributionSummary {
        match &self.distribution {
            Some(result) => DistributionSummary::from(result),
            None => DistributionSummary {
                success: false,
                party_a_tx: None,
                party_b_tx: None,
                party_a_block: None,
                party_b_block: None,
                error: self.error.clone(),
            },
        }
    }
}
