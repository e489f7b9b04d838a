//! Chain access for the Payment Agent.
//!
//! Listeners and the distributor never talk to an RPC node directly. They
//! go through [`ChainReader`] and [`ChainWriter`], which [`EvmChain`]
//! implements on top of an alloy provider.

mod evm;
mod submission_queue;

#[cfg(test)]
pub(crate) mod testing;

pub use evm::{EvmChain, IERC20, MintAndWithdraw};
pub use submission_queue::AccountSubmissionQueue;

use alloy::primitives::{Address, B256, TxHash, U256};
use async_trait::async_trait;
use thiserror::Error;

/// A decoded `MintAndWithdraw` log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintEvent {
    pub recipient: Address,
    pub amount: U256,
    pub token: Address,
    pub block_number: u64,
    pub transaction_hash: TxHash,
}

/// Filter for mint events within an inclusive block range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintEventQuery {
    /// Contract emitting the event.
    pub contract: Address,
    /// Topic 0 of the event.
    pub event_signature: B256,
    pub from_block: u64,
    pub to_block: u64,
    /// Indexed `mintRecipient`, matched when set.
    pub recipient: Option<Address>,
    /// Indexed `mintToken`, matched when set.
    pub token: Option<Address>,
}

/// A transaction that was included and succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmation {
    pub tx_hash: TxHash,
    pub block_number: u64,
}

/// Errors returned by chain access.
#[derive(Debug, Clone, Error)]
pub enum ChainError {
    #[error("rpc error: {0}")]
    Rpc(String),

    #[error("insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error("transaction {0} reverted")]
    Reverted(TxHash),

    #[error("transaction {tx_hash} was not confirmed within {waited_secs}s")]
    ConfirmationTimeout { tx_hash: TxHash, waited_secs: u64 },

    #[error("malformed chain data: {0}")]
    Decode(String),
}

impl ChainError {
    /// Classify an error message returned by a node.
    ///
    /// Nodes report a sender without gas as a JSON-RPC error whose message
    /// contains "insufficient funds".
    pub fn from_rpc_message(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.to_ascii_lowercase().contains("insufficient funds") {
            ChainError::InsufficientFunds(message)
        } else {
            ChainError::Rpc(message)
        }
    }
}

/// Read access to the destination chain.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Number of the latest block.
    async fn current_block_height(&self) -> Result<u64, ChainError>;

    /// Mint events matching `query`, in log order.
    async fn mint_events(&self, query: &MintEventQuery) -> Result<Vec<MintEvent>, ChainError>;

    /// Native balance of `account`, used to pay for gas.
    async fn gas_balance(&self, account: Address) -> Result<U256, ChainError>;
}

/// Transaction submission from the operating account.
#[async_trait]
pub trait ChainWriter: Send + Sync {
    /// Account that signs and pays for submitted transactions.
    fn account(&self) -> Address;

    /// Submit an ERC-20 `transfer(to, amount)` on `token`.
    async fn submit_transfer(
        &self,
        token: Address,
        to: Address,
        amount: U256,
    ) -> Result<TxHash, ChainError>;

    /// Wait until `tx_hash` is included in a block and check that it succeeded.
    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> Result<Confirmation, ChainError>;
}
