//! Events leaving the payment listeners.
//!
//! Every listener emits exactly one [`PaymentCompleted`] when it reaches a
//! terminal status. The server hands the receiving end to a
//! [`CompletionLogger`](crate::processors::CompletionLogger).

pub mod channels;
pub mod types;

pub use channels::{
    CompletionReceiver, CompletionSender, DEFAULT_CHANNEL_BUFFER, completion_channel,
};
pub use types::PaymentCompleted;
