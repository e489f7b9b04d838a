//! Configuration types for the Payment Agent.
//!
//! These are the validated runtime values shared by the listeners and the
//! distributor. Loading and parsing from disk is handled by the server crate.

mod parties;
mod timing;

pub use parties::PartiesConfig;
pub use timing::TimingConfig;

use alloy::primitives::Address;
use std::time::Duration;

/// Default time a finished payment stays queryable.
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(3_600);

/// Everything a payment listener and its distributor need to know about
/// the deployment.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Token contract that is minted and then distributed (USDC).
    pub token: Address,
    /// Contract emitting `MintAndWithdraw` on the destination chain.
    pub mint_contract: Address,
    /// Address that receives the mint and funds the split transfers.
    pub recipient: Address,
    /// The two accounts the received amount is split between.
    pub parties: PartiesConfig,
    /// Polling cadence, timeout and query window.
    pub timing: TimingConfig,
    /// Permit two in-flight payments with the same expected amount.
    ///
    /// Listeners match on amount alone, so two concurrent payments of the
    /// same size may both consume the first matching mint.
    pub allow_duplicate_amounts: bool,
    /// How long a finished payment stays queryable before it is pruned.
    pub retention: Duration,
}
