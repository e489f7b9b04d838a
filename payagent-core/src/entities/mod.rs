//! Domain entities of a payment.

pub mod distribution;
pub mod payment_request;
pub mod split;

pub use distribution::{DistributionResult, NO_GAS_ERROR};
pub use payment_request::{InvalidTransition, PaymentRequest};
pub use split::{InvalidSplitPercentage, SplitAmounts, SplitPercentage};
