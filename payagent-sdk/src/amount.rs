//! Conversion between human-readable token amounts and base units.
//!
//! All amounts on the wire are decimal strings (`"1.5"`); everything that
//! touches the chain uses integer base units (`1_500_000` for a 6-decimal
//! token). No floating point is involved in either direction.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::str::FromStr;

/// Decimals of USDC on every chain the agent supports.
pub const USDC_DECIMALS: u32 = 6;

/// Errors produced when parsing a decimal amount string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountParseError {
    #[error("amount is not a decimal number: {0:?}")]
    Invalid(String),

    #[error("amount must not be negative")]
    Negative,

    #[error("amount has more than {decimals} decimal places")]
    TooPrecise { decimals: u32 },

    #[error("amount is too large")]
    Overflow,
}

/// Parse a decimal string such as `"10"` or `"0.25"` into base units.
///
/// Amounts with more fractional digits than `decimals` are rejected rather
/// than truncated, so the caller never asks for a payment that cannot be
/// represented on chain.
pub fn parse_units(input: &str, decimals: u32) -> Result<u128, AmountParseError> {
    let trimmed = input.trim();
    let value =
        Decimal::from_str(trimmed).map_err(|_| AmountParseError::Invalid(trimmed.to_string()))?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(AmountParseError::Negative);
    }

    let value = value.normalize();
    if value.scale() > decimals {
        return Err(AmountParseError::TooPrecise { decimals });
    }

    let multiplier = 10u64
        .checked_pow(decimals)
        .map(Decimal::from)
        .ok_or(AmountParseError::Overflow)?;
    value
        .checked_mul(multiplier)
        .and_then(|scaled| scaled.trunc().to_u128())
        .ok_or(AmountParseError::Overflow)
}

/// Render base units as a decimal string, dropping trailing zeros.
pub fn format_units(value: u128, decimals: u32) -> String {
    let Some(divisor) = 10u128.checked_pow(decimals) else {
        return value.to_string();
    };
    let whole = value / divisor;
    let remainder = value % divisor;
    if remainder == 0 {
        return whole.to_string();
    }
    let fraction = format!("{:0width$}", remainder, width = decimals as usize);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_whole_units() {
        assert_eq!(parse_units("10", USDC_DECIMALS), Ok(10_000_000));
        assert_eq!(parse_units("1", USDC_DECIMALS), Ok(1_000_000));
        assert_eq!(parse_units(" 3 ", USDC_DECIMALS), Ok(3_000_000));
    }

    #[test]
    fn test_parse_fractional_units() {
        assert_eq!(parse_units("0.25", USDC_DECIMALS), Ok(250_000));
        assert_eq!(parse_units("1.000001", USDC_DECIMALS), Ok(1_000_001));
        assert_eq!(parse_units("2.500000", USDC_DECIMALS), Ok(2_500_000));
        assert_eq!(parse_units("0", USDC_DECIMALS), Ok(0));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(
            parse_units("1.0000001", USDC_DECIMALS),
            Err(AmountParseError::TooPrecise { decimals: 6 })
        );
        assert_eq!(parse_units("-1", USDC_DECIMALS), Err(AmountParseError::Negative));
        assert!(matches!(
            parse_units("ten", USDC_DECIMALS),
            Err(AmountParseError::Invalid(_))
        ));
        assert!(matches!(
            parse_units("", USDC_DECIMALS),
            Err(AmountParseError::Invalid(_))
        ));
    }

    #[test]
    fn test_format_units() {
        assert_eq!(format_units(10_000_000, USDC_DECIMALS), "10");
        assert_eq!(format_units(6_000_000, USDC_DECIMALS), "6");
        assert_eq!(format_units(250_000, USDC_DECIMALS), "0.25");
        assert_eq!(format_units(1_000_001, USDC_DECIMALS), "1.000001");
        assert_eq!(format_units(7, USDC_DECIMALS), "0.000007");
        assert_eq!(format_units(0, USDC_DECIMALS), "0");
    }
}
