use super::split::SplitPercentage;
use alloy::primitives::{Address, U256};
use payagent_sdk::objects::PaymentStatus;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use uuid::Uuid;

/// A status change that the payment lifecycle does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal payment status transition {from} -> {to}")]
pub struct InvalidTransition {
    pub from: PaymentStatus,
    pub to: PaymentStatus,
}

/// A payment the agent is waiting for.
///
/// Status only moves forward:
/// `polling -> distributing -> completed | failed`, or
/// `polling -> timed_out | cancelled`.
#[derive(Debug, Clone)]
pub struct PaymentRequest {
    pub id: Uuid,
    pub payer: Address,
    /// Exact mint amount that satisfies this request, in base units.
    pub expected_amount: U256,
    pub split: SplitPercentage,
    start_time: Instant,
    status: PaymentStatus,
}

impl PaymentRequest {
    pub fn new(
        payer: Address,
        expected_amount: U256,
        split: SplitPercentage,
        start_time: Instant,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            payer,
            expected_amount,
            split,
            start_time,
            status: PaymentStatus::Polling,
        }
    }

    pub fn start_time(&self) -> Instant {
        self.start_time
    }

    pub fn status(&self) -> PaymentStatus {
        self.status
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.start_time)
    }

    /// Move to `next`, rejecting anything but a forward step.
    pub fn transition(&mut self, next: PaymentStatus) -> Result<(), InvalidTransition> {
        use PaymentStatus::*;
        let allowed = matches!(
            (self.status, next),
            (Polling, Distributing | TimedOut | Cancelled) | (Distributing, Completed | Failed)
        );
        if !allowed {
            return Err(InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}
