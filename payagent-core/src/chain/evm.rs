//! [`ChainReader`] and [`ChainWriter`] over an alloy provider.

use super::{ChainError, ChainReader, ChainWriter, Confirmation, MintEvent, MintEventQuery};
use alloy::network::ReceiptResponse;
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::Provider;
use alloy::rpc::types::{Filter, Log};
use alloy::sol;
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

sol! {
    #[sol(rpc)]
    interface IERC20 {
        function transfer(address to, uint256 amount) external returns (bool);
        function balanceOf(address account) external view returns (uint256);
    }
}

sol! {
    /// Emitted by the CCTP token minter when burned USDC is minted on this chain.
    event MintAndWithdraw(address indexed mintRecipient, uint256 amount, address indexed mintToken);
}

const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(120);
const DEFAULT_RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// EVM chain access through an alloy provider.
///
/// Writing requires the provider to carry a wallet for `account`, as built by
/// `ProviderBuilder::new().wallet(..).connect_http(..)`.
#[derive(Debug, Clone)]
pub struct EvmChain<P> {
    provider: P,
    account: Address,
    confirmation_timeout: Duration,
    receipt_poll_interval: Duration,
}

impl<P: Provider> EvmChain<P> {
    pub fn new(provider: P, account: Address) -> Self {
        Self {
            provider,
            account,
            confirmation_timeout: DEFAULT_CONFIRMATION_TIMEOUT,
            receipt_poll_interval: DEFAULT_RECEIPT_POLL_INTERVAL,
        }
    }

    /// Give up on a submitted transaction after `timeout` without a receipt.
    pub fn with_confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation_timeout = timeout;
        self
    }
}

fn rpc_error(e: impl std::fmt::Display) -> ChainError {
    ChainError::from_rpc_message(e.to_string())
}

fn decode_mint_log(log: &Log) -> Result<MintEvent, ChainError> {
    let block_number = log
        .block_number
        .ok_or_else(|| ChainError::Decode("log has no block number".to_string()))?;
    let transaction_hash = log
        .transaction_hash
        .ok_or_else(|| ChainError::Decode("log has no transaction hash".to_string()))?;
    let decoded = log
        .log_decode::<MintAndWithdraw>()
        .map_err(|e| ChainError::Decode(e.to_string()))?;
    let event = decoded.inner.data;

    Ok(MintEvent {
        recipient: event.mintRecipient,
        amount: event.amount,
        token: event.mintToken,
        block_number,
        transaction_hash,
    })
}

#[async_trait]
impl<P: Provider + 'static> ChainReader for EvmChain<P> {
    async fn current_block_height(&self) -> Result<u64, ChainError> {
        self.provider.get_block_number().await.map_err(rpc_error)
    }

    async fn mint_events(&self, query: &MintEventQuery) -> Result<Vec<MintEvent>, ChainError> {
        let mut filter = Filter::new()
            .address(query.contract)
            .event_signature(query.event_signature)
            .from_block(query.from_block)
            .to_block(query.to_block);
        if let Some(recipient) = query.recipient {
            filter = filter.topic1(recipient.into_word());
        }
        if let Some(token) = query.token {
            filter = filter.topic2(token.into_word());
        }

        let logs = self.provider.get_logs(&filter).await.map_err(rpc_error)?;
        debug!(
            from_block = query.from_block,
            to_block = query.to_block,
            logs = logs.len(),
            "Fetched mint logs"
        );

        let mut events = Vec::with_capacity(logs.len());
        for log in &logs {
            match decode_mint_log(log) {
                Ok(event) => events.push(event),
                Err(e) => warn!(
                    contract = %log.address(),
                    tx_hash = ?log.transaction_hash,
                    error = %e,
                    "Skipping undecodable mint log"
                ),
            }
        }
        Ok(events)
    }

    async fn gas_balance(&self, account: Address) -> Result<U256, ChainError> {
        self.provider.get_balance(account).await.map_err(rpc_error)
    }
}

#[async_trait]
impl<P: Provider + 'static> ChainWriter for EvmChain<P> {
    fn account(&self) -> Address {
        self.account
    }

    async fn submit_transfer(
        &self,
        token: Address,
        to: Address,
        amount: U256,
    ) -> Result<TxHash, ChainError> {
        let contract = IERC20::new(token, &self.provider);
        let pending = contract
            .transfer(to, amount)
            .from(self.account)
            .send()
            .await
            .map_err(rpc_error)?;
        Ok(*pending.tx_hash())
    }

    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> Result<Confirmation, ChainError> {
        let started = Instant::now();
        loop {
            let receipt = self
                .provider
                .get_transaction_receipt(tx_hash)
                .await
                .map_err(rpc_error)?;

            if let Some(receipt) = receipt {
                if !receipt.status() {
                    return Err(ChainError::Reverted(tx_hash));
                }
                let block_number = receipt.block_number().ok_or_else(|| {
                    ChainError::Decode(format!("receipt of {tx_hash} has no block number"))
                })?;
                return Ok(Confirmation {
                    tx_hash,
                    block_number,
                });
            }

            if started.elapsed() >= self.confirmation_timeout {
                return Err(ChainError::ConfirmationTimeout {
                    tx_hash,
                    waited_secs: self.confirmation_timeout.as_secs(),
                });
            }
            tokio::time::sleep(self.receipt_poll_interval).await;
        }
    }
}
