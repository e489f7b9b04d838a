//! CompletionLogger processor.
//!
//! Drains the completion channel and writes one log line per finished
//! payment.

use crate::events::{CompletionReceiver, PaymentCompleted};
use kanau::processor::Processor;
use std::convert::Infallible;
use tokio::sync::watch;
use tracing::{info, warn};

pub struct CompletionLogger {
    completion_rx: CompletionReceiver,
    shutdown_rx: watch::Receiver<bool>,
}

impl CompletionLogger {
    pub fn new(completion_rx: CompletionReceiver, shutdown_rx: watch::Receiver<bool>) -> Self {
        Self {
            completion_rx,
            shutdown_rx,
        }
    }

    /// Run until shutdown, then drain what is already queued.
    pub async fn run(mut self) {
        info!("CompletionLogger started");

        loop {
            tokio::select! {
                biased;

                Ok(()) = self.shutdown_rx.changed() => {
                    if *self.shutdown_rx.borrow() {
                        info!("CompletionLogger received shutdown signal");
                        break;
                    }
                }

                Some(event) = self.completion_rx.recv() => {
                    let _ = self.process(event).await;
                }

                else => {
                    info!("Completion channel closed");
                    break;
                }
            }
        }

        while let Ok(event) = self.completion_rx.try_recv() {
            let _ = self.process(event).await;
        }
        info!("CompletionLogger shutdown complete");
    }
}

impl Processor<PaymentCompleted> for CompletionLogger {
    type Output = ();
    type Error = Infallible;

    async fn process(&self, event: PaymentCompleted) -> Result<(), Infallible> {
        let summary = event.summary();
        if summary.success {
            info!(
                request_id = %event.request_id,
                status = %event.status,
                party_a_tx = summary.party_a_tx.as_deref().unwrap_or_default(),
                party_b_tx = summary.party_b_tx.as_deref().unwrap_or_default(),
                "Payment completed"
            );
        } else {
            warn!(
                request_id = %event.request_id,
                status = %event.status,
                party_a_tx = summary.party_a_tx.as_deref().unwrap_or_default(),
                error = summary.error.as_deref().unwrap_or_default(),
                "Payment did not complete"
            );
        }
        Ok(())
    }
}
