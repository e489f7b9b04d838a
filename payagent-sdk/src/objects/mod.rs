//! Request and response objects of the Payment Agent HTTP API.

pub mod agent;
pub mod payment;
pub mod status;

pub use agent::AgentInfo;
pub use payment::{
    CreatePaymentRequest, DEFAULT_SPLIT_PERCENTAGE, PartyShare, PaymentDetails, SplitPreview,
    TransactionData,
};
pub use status::{DistributionSummary, PaymentStatus, PaymentStatusResponse};
