//! Distributor processor.
//!
//! The Distributor is responsible for:
//! - Checking that the operating account can pay for gas
//! - Computing the two shares of a received payment
//! - Transferring party A's share and waiting for it to confirm
//! - Only then transferring party B's share and waiting for it to confirm
//!
//! It never returns an error: every failure ends up in the
//! [`DistributionResult`].

use crate::chain::{AccountSubmissionQueue, ChainError, ChainReader, ChainWriter, Confirmation};
use crate::config::PartiesConfig;
use crate::entities::{DistributionResult, NO_GAS_ERROR, SplitAmounts, SplitPercentage};
use alloy::primitives::{Address, U256};
use kanau::processor::Processor;
use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Split one received payment between the two parties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistributionRequest {
    pub request_id: Uuid,
    /// Amount received, in base units.
    pub amount: U256,
    pub split: SplitPercentage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Party {
    A,
    B,
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Party::A => write!(f, "party A"),
            Party::B => write!(f, "party B"),
        }
    }
}

/// Step a distribution failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Submitting(Party),
    Confirming(Party),
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Submitting(party) => write!(f, "transfer to {party}"),
            Stage::Confirming(party) => write!(f, "confirmation of transfer to {party}"),
        }
    }
}

/// Distributor moves received funds from the operating account to the
/// two configured parties.
pub struct Distributor {
    reader: Arc<dyn ChainReader>,
    writer: Arc<dyn ChainWriter>,
    queue: AccountSubmissionQueue,
    token: Address,
    parties: PartiesConfig,
}

impl Distributor {
    /// Create a new Distributor.
    ///
    /// # Arguments
    ///
    /// * `reader` - Chain access for the gas balance check
    /// * `writer` - Signs and submits the transfers
    /// * `queue` - Serializes submissions of the writer's account
    /// * `token` - Token contract being distributed
    /// * `parties` - Receiving accounts
    pub fn new(
        reader: Arc<dyn ChainReader>,
        writer: Arc<dyn ChainWriter>,
        queue: AccountSubmissionQueue,
        token: Address,
        parties: PartiesConfig,
    ) -> Self {
        Self {
            reader,
            writer,
            queue,
            token,
            parties,
        }
    }

    async fn distribute(&self, request: DistributionRequest) -> DistributionResult {
        let operator = self.writer.account();

        if request.amount.is_zero() {
            return DistributionResult::failed("amount must be greater than zero");
        }

        match self.reader.gas_balance(operator).await {
            Ok(balance) if balance.is_zero() => {
                warn!(
                    request_id = %request.request_id,
                    operator = %operator,
                    "Operating account has no gas, fund it with the native token"
                );
                return DistributionResult::failed(NO_GAS_ERROR);
            }
            Ok(balance) => {
                debug!(request_id = %request.request_id, balance = %balance, "Gas balance checked");
            }
            Err(e) => {
                return DistributionResult::failed(format!("failed to read gas balance: {e}"));
            }
        }

        let split = SplitAmounts::compute(request.amount, request.split);

        // Held across both transfers of this payment.
        let _guard = self.queue.acquire(operator).await;

        info!(
            request_id = %request.request_id,
            party_a = %self.parties.party_a,
            amount = %split.party_a,
            "Transferring share to party A"
        );
        let party_a = match self
            .transfer(Party::A, self.parties.party_a, split.party_a)
            .await
        {
            Ok(confirmation) => confirmation,
            Err((stage, e)) => {
                let error = self.describe_failure(stage, &e, operator);
                warn!(request_id = %request.request_id, error = %error, "Distribution failed");
                return DistributionResult::failed(error);
            }
        };

        info!(
            request_id = %request.request_id,
            party_b = %self.parties.party_b,
            amount = %split.party_b,
            "Transferring share to party B"
        );
        let party_b = match self
            .transfer(Party::B, self.parties.party_b, split.party_b)
            .await
        {
            Ok(confirmation) => confirmation,
            Err((stage, e)) => {
                let error = self.describe_failure(stage, &e, operator);
                warn!(
                    request_id = %request.request_id,
                    party_a_tx = %party_a.tx_hash,
                    error = %error,
                    "Distribution failed after party A was paid"
                );
                return DistributionResult::partial(split, party_a, error);
            }
        };

        info!(
            request_id = %request.request_id,
            party_a_tx = %party_a.tx_hash,
            party_b_tx = %party_b.tx_hash,
            "Distribution completed"
        );
        DistributionResult::completed(split, party_a, party_b)
    }

    async fn transfer(
        &self,
        party: Party,
        to: Address,
        amount: U256,
    ) -> Result<Confirmation, (Stage, ChainError)> {
        let tx_hash = self
            .writer
            .submit_transfer(self.token, to, amount)
            .await
            .map_err(|e| (Stage::Submitting(party), e))?;
        debug!(party = %party, tx_hash = %tx_hash, "Transfer submitted, waiting for confirmation");

        let confirmation = self
            .writer
            .wait_for_confirmation(tx_hash)
            .await
            .map_err(|e| (Stage::Confirming(party), e))?;
        debug!(
            party = %party,
            tx_hash = %tx_hash,
            block = confirmation.block_number,
            "Transfer confirmed"
        );
        Ok(confirmation)
    }

    fn describe_failure(&self, stage: Stage, error: &ChainError, operator: Address) -> String {
        match error {
            ChainError::InsufficientFunds(_) => format!(
                "{stage} failed: {error}; fund the operating account {operator} with the native token for gas"
            ),
            _ => format!("{stage} failed: {error}"),
        }
    }
}

impl Processor<DistributionRequest> for Distributor {
    type Output = DistributionResult;
    type Error = Infallible;

    async fn process(&self, request: DistributionRequest) -> Result<DistributionResult, Infallible> {
        Ok(self.distribute(request).await)
    }
}
