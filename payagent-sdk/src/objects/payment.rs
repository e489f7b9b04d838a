//! Payment creation objects.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::status::PaymentStatus;

/// Request payload for creating a payment.
///
/// `amount` is a decimal string in whole tokens (`"10"` means 10 USDC).
/// `split_percentage` is the share of the amount forwarded to party A;
/// party B receives the remainder, 60 when omitted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub amount: String,
    pub payer_address: String,
    #[serde(default = "default_split_percentage")]
    pub split_percentage: u8,
}

/// Share of party A when the caller does not pick one.
pub const DEFAULT_SPLIT_PERCENTAGE: u8 = 60;

fn default_split_percentage() -> u8 {
    DEFAULT_SPLIT_PERCENTAGE
}

/// Everything the payer needs to send the expected payment.
///
/// Returned as soon as the listener has been started. It never reflects the
/// distribution outcome; poll the status endpoint for that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    pub request_id: Uuid,
    pub status: PaymentStatus,
    /// Address the mint must credit.
    pub recipient: String,
    /// Token contract address.
    pub token: String,
    /// Human-readable amount, e.g. `"10"`.
    pub amount: String,
    /// Amount in token base units, e.g. `"10000000"`.
    pub amount_base_units: String,
    pub payer_address: String,
    /// A plain `transfer(recipient, amount)` call for the token.
    pub transaction: TransactionData,
    pub split: SplitPreview,
    pub timeout_secs: u64,
}

/// Raw transaction fields, hex encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionData {
    pub to: String,
    pub data: String,
    pub value: String,
}

/// How the received amount will be split once the payment lands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitPreview {
    pub split_percentage: u8,
    pub party_a: PartyShare,
    pub party_b: PartyShare,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyShare {
    pub address: String,
    pub amount_base_units: String,
}
