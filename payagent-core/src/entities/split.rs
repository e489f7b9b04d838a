use alloy::primitives::U256;
use payagent_sdk::objects::DEFAULT_SPLIT_PERCENTAGE;
use thiserror::Error;

/// Share of a payment, in whole percent, that goes to party A.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SplitPercentage(u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("split percentage must be between 0 and 100, got {0}")]
pub struct InvalidSplitPercentage(pub u8);

impl SplitPercentage {
    pub const DEFAULT: SplitPercentage = SplitPercentage(DEFAULT_SPLIT_PERCENTAGE);

    pub fn new(percent: u8) -> Result<Self, InvalidSplitPercentage> {
        if percent > 100 {
            return Err(InvalidSplitPercentage(percent));
        }
        Ok(Self(percent))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for SplitPercentage {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u8> for SplitPercentage {
    type Error = InvalidSplitPercentage;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Base-unit amounts owed to each party.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitAmounts {
    pub party_a: U256,
    pub party_b: U256,
}

impl SplitAmounts {
    /// Split `total` so that party A receives `floor(total * percent / 100)`
    /// and party B the rest. The two shares always sum to `total`.
    pub fn compute(total: U256, percent: SplitPercentage) -> Self {
        let hundred = U256::from(100u8);
        let percent = U256::from(percent.get());
        // Splitting off the remainder keeps `total * percent` from overflowing.
        let party_a = (total / hundred) * percent + (total % hundred) * percent / hundred;
        Self {
            party_a,
            party_b: total - party_a,
        }
    }
}
