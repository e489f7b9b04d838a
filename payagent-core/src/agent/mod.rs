//! Entry point of the Payment Agent.
//!
//! [`PaymentAgent::create_payment`] validates a request, starts its listener
//! and immediately returns what the payer needs to send the funds. The
//! distribution outcome arrives later, through the completion channel and
//! the status lookup.

mod registry;

pub use registry::{ListenerEntry, ListenerRegistry, RegistryError};

use crate::chain::{AccountSubmissionQueue, ChainReader, ChainWriter, IERC20};
use crate::config::AgentConfig;
use crate::entities::{InvalidSplitPercentage, PaymentRequest, SplitAmounts, SplitPercentage};
use crate::events::CompletionSender;
use crate::processors::{Distributor, ListenerContext};
use crate::utils::Clock;
use alloy::hex;
use alloy::primitives::{Address, U256};
use alloy::sol_types::SolCall;
use payagent_sdk::amount::{AmountParseError, USDC_DECIMALS, format_units, parse_units};
use payagent_sdk::objects::{
    CreatePaymentRequest, PartyShare, PaymentDetails, PaymentStatusResponse, SplitPreview,
    TransactionData,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

/// Errors returned to a caller of the agent.
#[derive(Debug, Error)]
pub enum InvocationError {
    #[error("invalid amount: {0}")]
    InvalidAmount(#[from] AmountParseError),

    #[error("amount must be greater than zero")]
    ZeroAmount,

    #[error("invalid payer address {0:?}")]
    InvalidPayerAddress(String),

    #[error(transparent)]
    InvalidSplit(#[from] InvalidSplitPercentage),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Creates payment requests and tracks their listeners.
pub struct PaymentAgent {
    config: Arc<AgentConfig>,
    clock: Arc<dyn Clock>,
    registry: ListenerRegistry,
}

impl PaymentAgent {
    /// Wire up a distributor and a listener registry.
    ///
    /// `writer.account()` pays for gas and must hold the received funds, so
    /// it is normally the same address as `config.recipient`.
    pub fn new(
        config: AgentConfig,
        reader: Arc<dyn ChainReader>,
        writer: Arc<dyn ChainWriter>,
        clock: Arc<dyn Clock>,
        completion_tx: CompletionSender,
    ) -> Self {
        let config = Arc::new(config);
        let distributor = Distributor::new(
            reader.clone(),
            writer,
            AccountSubmissionQueue::new(),
            config.token,
            config.parties,
        );
        let ctx = ListenerContext {
            reader,
            distributor: Arc::new(distributor),
            clock: clock.clone(),
            config: config.clone(),
            completion_tx,
        };
        Self {
            config,
            clock,
            registry: ListenerRegistry::new(ctx),
        }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Start listening for a payment and describe how to make it.
    pub async fn create_payment(
        &self,
        request: CreatePaymentRequest,
    ) -> Result<PaymentDetails, InvocationError> {
        let base_units = parse_units(&request.amount, USDC_DECIMALS)?;
        if base_units == 0 {
            return Err(InvocationError::ZeroAmount);
        }
        let amount = U256::from(base_units);
        let payer: Address = request
            .payer_address
            .trim()
            .parse()
            .map_err(|_| InvocationError::InvalidPayerAddress(request.payer_address.clone()))?;
        let split = SplitPercentage::new(request.split_percentage)?;

        let payment = PaymentRequest::new(payer, amount, split, self.clock.now());
        let entry = self.registry.start(payment).await?;

        info!(
            request_id = %entry.request_id,
            payer = %payer,
            amount = %amount,
            split = split.get(),
            "Payment request created"
        );

        Ok(self.details(&entry, payer, base_units, split))
    }

    pub async fn payment_status(&self, request_id: Uuid) -> Option<PaymentStatusResponse> {
        self.registry.get(request_id).await.map(status_response)
    }

    /// Stop polling for `request_id`.
    pub async fn cancel_payment(
        &self,
        request_id: Uuid,
    ) -> Result<PaymentStatusResponse, InvocationError> {
        let entry = self.registry.stop(request_id).await?;
        info!(request_id = %request_id, "Payment cancellation requested");
        Ok(status_response(entry))
    }

    /// Stop all listeners and wait for them.
    pub async fn shutdown(&self) {
        self.registry.shutdown().await;
    }

    fn details(
        &self,
        entry: &ListenerEntry,
        payer: Address,
        base_units: u128,
        split: SplitPercentage,
    ) -> PaymentDetails {
        let config = &self.config;
        let amount = U256::from(base_units);
        let call = IERC20::transferCall {
            to: config.recipient,
            amount,
        };
        let shares = SplitAmounts::compute(amount, split);

        PaymentDetails {
            request_id: entry.request_id,
            status: entry.snapshot.status,
            recipient: config.recipient.to_string(),
            token: config.token.to_string(),
            amount: format_units(base_units, USDC_DECIMALS),
            amount_base_units: amount.to_string(),
            payer_address: payer.to_string(),
            transaction: TransactionData {
                to: config.token.to_string(),
                data: hex::encode_prefixed(call.abi_encode()),
                value: "0x0".to_string(),
            },
            split: SplitPreview {
                split_percentage: split.get(),
                party_a: PartyShare {
                    address: config.parties.party_a.to_string(),
                    amount_base_units: shares.party_a.to_string(),
                },
                party_b: PartyShare {
                    address: config.parties.party_b.to_string(),
                    amount_base_units: shares.party_b.to_string(),
                },
            },
            timeout_secs: config.timing.timeout.as_secs(),
        }
    }
}

fn status_response(entry: ListenerEntry) -> PaymentStatusResponse {
    PaymentStatusResponse {
        request_id: entry.request_id,
        status: entry.snapshot.status,
        amount_base_units: entry.expected_amount.to_string(),
        split_percentage: entry.split_percentage,
        outcome: entry.snapshot.outcome.as_ref().map(|o| o.summary()),
    }
}
