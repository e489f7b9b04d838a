use super::types::PaymentCompleted;
use tokio::sync::mpsc;

/// Default buffer size for event channels.
pub const DEFAULT_CHANNEL_BUFFER: usize = 256;

/// Sender handle for PaymentCompleted events.
pub type CompletionSender = mpsc::Sender<PaymentCompleted>;
/// Receiver handle for PaymentCompleted events.
pub type CompletionReceiver = mpsc::Receiver<PaymentCompleted>;

/// Create a new PaymentCompleted channel.
///
/// All listeners share clones of the returned sender.
pub fn completion_channel() -> (CompletionSender, CompletionReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}
