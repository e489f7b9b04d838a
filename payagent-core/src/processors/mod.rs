//! Event processors for the Payment Agent.
//!
//! # Processors
//!
//! - [`PaymentListener`]: polls the chain for one payment's mint
//! - [`Distributor`]: splits a received payment between two parties
//! - [`CompletionLogger`]: logs every finished payment

pub mod completion_logger;
pub mod distributor;
pub mod listener;

pub use completion_logger::CompletionLogger;
pub use distributor::{DistributionRequest, Distributor};
pub use listener::{ListenerContext, ListenerHandle, ListenerSnapshot, PaymentListener};
