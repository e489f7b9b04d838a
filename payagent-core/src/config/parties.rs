use alloy::primitives::Address;

/// Receiving accounts of a split payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartiesConfig {
    /// Receives `splitPercentage` percent of the payment.
    pub party_a: Address,
    /// Receives the remainder.
    pub party_b: Address,
}
