use super::split::SplitAmounts;
use crate::chain::Confirmation;
use payagent_sdk::objects::DistributionSummary;

/// Error reported when the operating account has no native balance.
pub const NO_GAS_ERROR: &str = "no gas";

/// Outcome of splitting one received payment.
///
/// On success both confirmations are present. A failure after party A's
/// transfer was confirmed keeps that confirmation: the first transfer is
/// not rolled back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionResult {
    pub success: bool,
    pub split: Option<SplitAmounts>,
    pub party_a: Option<Confirmation>,
    pub party_b: Option<Confirmation>,
    pub error: Option<String>,
}

impl DistributionResult {
    pub fn completed(split: SplitAmounts, party_a: Confirmation, party_b: Confirmation) -> Self {
        Self {
            success: true,
            split: Some(split),
            party_a: Some(party_a),
            party_b: Some(party_b),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            split: None,
            party_a: None,
            party_b: None,
            error: Some(error.into()),
        }
    }

    /// Party A was paid, party B was not.
    pub fn partial(split: SplitAmounts, party_a: Confirmation, error: impl Into<String>) -> Self {
        Self {
            success: false,
            split: Some(split),
            party_a: Some(party_a),
            party_b: None,
            error: Some(error.into()),
        }
    }
}

impl From<&DistributionResult> for DistributionSummary {
    fn from(result: &DistributionResult) -> Self {
        DistributionSummary {
            success: result.success,
            party_a_tx: result.party_a.map(|c| c.tx_hash.to_string()),
            party_b_tx: result.party_b.map(|c| c.tx_hash.to_string()),
            party_a_block: result.party_a.map(|c| c.block_number),
            party_b_block: result.party_b.map(|c| c.block_number),
            error: result.error.clone(),
        }
    }
}
