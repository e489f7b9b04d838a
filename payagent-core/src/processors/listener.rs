//! PaymentListener processor.
//!
//! One PaymentListener runs per payment request. It is responsible for:
//! - Querying recent `MintAndWithdraw` logs once per poll interval
//! - Matching a mint of exactly the expected amount to the agent
//! - Handing the payment to the [`Distributor`] on the first match
//! - Giving up once the timeout has elapsed, or when stopped
//! - Emitting exactly one [`PaymentCompleted`]
//!
//! Matching is by amount only. Two listeners waiting for the same amount
//! both accept the first mint of that amount; the registry refuses such
//! duplicates unless told otherwise.

use super::distributor::{DistributionRequest, Distributor};
use crate::chain::{ChainError, ChainReader, MintAndWithdraw, MintEvent, MintEventQuery};
use crate::config::AgentConfig;
use crate::entities::PaymentRequest;
use crate::events::{CompletionSender, PaymentCompleted};
use crate::utils::Clock;
use alloy::sol_types::SolEvent;
use kanau::processor::Processor;
use payagent_sdk::objects::PaymentStatus;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Dependencies shared by every listener.
#[derive(Clone)]
pub struct ListenerContext {
    pub reader: Arc<dyn ChainReader>,
    pub distributor: Arc<Distributor>,
    pub clock: Arc<dyn Clock>,
    pub config: Arc<AgentConfig>,
    pub completion_tx: CompletionSender,
}

/// What an observer can see of a running or finished listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerSnapshot {
    pub status: PaymentStatus,
    /// Set once the listener has finished.
    pub outcome: Option<PaymentCompleted>,
    /// When the outcome was published.
    pub finished_at: Option<Instant>,
}

/// Control handle of a spawned listener.
///
/// Dropping the handle does not stop the listener.
#[derive(Debug)]
pub struct ListenerHandle {
    request_id: Uuid,
    snapshot_rx: watch::Receiver<ListenerSnapshot>,
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ListenerHandle {
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn snapshot(&self) -> ListenerSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    pub fn status(&self) -> PaymentStatus {
        self.snapshot_rx.borrow().status
    }

    /// Ask the listener to stop polling.
    ///
    /// Takes effect before the next poll. A distribution that already
    /// started runs to completion. Stopping twice is harmless.
    pub fn stop(&self) {
        self.stop_tx.send_replace(true);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the listener task to end and return its final snapshot.
    pub async fn join(self) -> ListenerSnapshot {
        if let Err(e) = self.task.await {
            error!(request_id = %self.request_id, error = %e, "Payment listener task failed");
        }
        self.snapshot_rx.borrow().clone()
    }
}

/// Watches the chain for the mint that pays one request.
pub struct PaymentListener {
    request: PaymentRequest,
    ctx: ListenerContext,
    snapshot_tx: watch::Sender<ListenerSnapshot>,
    stop_rx: watch::Receiver<bool>,
}

impl PaymentListener {
    /// Spawn a listener for `request` on the current runtime.
    pub fn spawn(request: PaymentRequest, ctx: ListenerContext) -> ListenerHandle {
        let request_id = request.id;
        let (snapshot_tx, snapshot_rx) = watch::channel(ListenerSnapshot {
            status: request.status(),
            outcome: None,
            finished_at: None,
        });
        let (stop_tx, stop_rx) = watch::channel(false);

        let listener = PaymentListener {
            request,
            ctx,
            snapshot_tx,
            stop_rx,
        };
        let task = tokio::spawn(listener.run());

        ListenerHandle {
            request_id,
            snapshot_rx,
            stop_tx,
            task,
        }
    }

    async fn run(mut self) {
        info!(
            request_id = %self.request.id,
            payer = %self.request.payer,
            amount = %self.request.expected_amount,
            split = self.request.split.get(),
            "Payment listener started"
        );

        let timing = self.ctx.config.timing;
        let deadline = self.request.start_time() + timing.timeout;
        let mut attempt: u64 = 0;

        let completed = loop {
            if *self.stop_rx.borrow() {
                break self.cancel();
            }

            attempt += 1;
            // A stalled read must not outlive the window.
            let step = tokio::time::timeout_at(deadline, self.poll_once()).await;
            let step_expired = step.is_err();
            let step = step.unwrap_or_else(|_| {
                Err(ChainError::Rpc("polling step outlived the payment window".into()))
            });
            match step {
                Ok(Some(event)) => {
                    info!(
                        request_id = %self.request.id,
                        attempt,
                        mint_tx = %event.transaction_hash,
                        block = event.block_number,
                        "Matching mint found"
                    );
                    break self.distribute(event).await;
                }
                Ok(None) => {
                    debug!(request_id = %self.request.id, attempt, "No matching mint yet");
                }
                Err(e) => {
                    warn!(
                        request_id = %self.request.id,
                        attempt,
                        error = %e,
                        "Polling step failed, retrying"
                    );
                }
            }

            let elapsed = self.request.elapsed(self.ctx.clock.now());
            if elapsed > timing.timeout || step_expired {
                warn!(
                    request_id = %self.request.id,
                    elapsed_secs = elapsed.as_secs(),
                    "No matching mint before timeout"
                );
                break self.finish(PaymentStatus::TimedOut, PaymentCompleted::timed_out(self.request.id));
            }

            tokio::select! {
                biased;

                Ok(()) = self.stop_rx.changed() => {}

                _ = tokio::time::sleep(timing.poll_interval) => {}
            }
        };

        self.publish(completed).await;
    }

    /// One polling step: read the head, query the window, look for a match.
    async fn poll_once(&self) -> Result<Option<MintEvent>, ChainError> {
        let config = &self.ctx.config;
        let head = self.ctx.reader.current_block_height().await?;
        let (from_block, to_block) = config.timing.query_window(head);

        let query = MintEventQuery {
            contract: config.mint_contract,
            event_signature: MintAndWithdraw::SIGNATURE_HASH,
            from_block,
            to_block,
            recipient: Some(config.recipient),
            token: Some(config.token),
        };
        let events = self.ctx.reader.mint_events(&query).await?;

        Ok(events.into_iter().find(|event| self.matches(event)))
    }

    fn matches(&self, event: &MintEvent) -> bool {
        event.recipient == self.ctx.config.recipient
            && event.token == self.ctx.config.token
            && event.amount == self.request.expected_amount
    }

    async fn distribute(&mut self, event: MintEvent) -> PaymentCompleted {
        self.set_status(PaymentStatus::Distributing);

        let result = self
            .ctx
            .distributor
            .process(DistributionRequest {
                request_id: self.request.id,
                amount: event.amount,
                split: self.request.split,
            })
            .await
            .unwrap_or_else(|never| match never {});

        let completed = PaymentCompleted::distributed(self.request.id, result);
        self.finish(completed.status, completed)
    }

    fn cancel(&mut self) -> PaymentCompleted {
        info!(request_id = %self.request.id, "Payment listener stopped");
        self.finish(PaymentStatus::Cancelled, PaymentCompleted::cancelled(self.request.id))
    }

    fn finish(&mut self, status: PaymentStatus, completed: PaymentCompleted) -> PaymentCompleted {
        self.set_status(status);
        completed
    }

    fn set_status(&mut self, next: PaymentStatus) {
        if let Err(e) = self.request.transition(next) {
            error!(request_id = %self.request.id, error = %e, "Rejected status change");
            return;
        }
        debug!(request_id = %self.request.id, status = %next, "Payment status changed");
        self.snapshot_tx.send_modify(|snapshot| snapshot.status = next);
    }

    async fn publish(&self, completed: PaymentCompleted) {
        let now = self.ctx.clock.now();
        self.snapshot_tx.send_modify(|snapshot| {
            snapshot.outcome = Some(completed.clone());
            snapshot.finished_at = Some(now);
        });
        if self.ctx.completion_tx.send(completed).await.is_err() {
            warn!(request_id = %self.request.id, "Completion channel closed, outcome not delivered");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::testing::{
        AGENT, ChainCall, MockChain, PARTY_A, PARTY_B, TOKEN, listener_context, mint_event,
        test_config,
    };
    use crate::entities::SplitPercentage;
    use crate::events::CompletionReceiver;
    use alloy::primitives::{Address, U256};
    use std::time::Duration;
    use tokio::time::Instant;

    const RECIPIENT: Address = AGENT;

    fn context(chain: &Arc<MockChain>) -> (ListenerContext, CompletionReceiver) {
        listener_context(chain, test_config())
    }

    fn request(amount: u64) -> PaymentRequest {
        PaymentRequest::new(
            Address::ZERO,
            U256::from(amount),
            SplitPercentage::new(60).unwrap(),
            Instant::now(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_distributes_after_mint_on_third_poll() {
        let chain = Arc::new(MockChain::new(RECIPIENT));
        chain.push_poll(Ok(vec![]));
        chain.push_poll(Ok(vec![]));
        chain.push_poll(Ok(vec![mint_event(RECIPIENT, TOKEN, 10_000_000)]));
        let (ctx, mut completion_rx) = context(&chain);

        let handle = PaymentListener::spawn(request(10_000_000), ctx);
        let completed = completion_rx.recv().await.unwrap();

        assert_eq!(completed.status, PaymentStatus::Completed);
        assert!(completed.success());
        assert_eq!(chain.mint_queries(), 3);
        assert_eq!(
            chain.submitted_transfers(),
            vec![
                (PARTY_A, U256::from(6_000_000u64)),
                (PARTY_B, U256::from(4_000_000u64)),
            ]
        );

        let snapshot = handle.join().await;
        assert_eq!(snapshot.status, PaymentStatus::Completed);
        assert_eq!(snapshot.outcome, Some(completed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_queries_recent_window_for_agent_mints() {
        let chain = Arc::new(MockChain::new(RECIPIENT));
        chain.push_poll(Ok(vec![mint_event(RECIPIENT, TOKEN, 5)]));
        let (ctx, mut completion_rx) = context(&chain);

        PaymentListener::spawn(request(5), ctx);
        completion_rx.recv().await.unwrap();

        let calls = chain.calls();
        assert_eq!(calls[0], ChainCall::BlockHeight);
        assert_eq!(
            calls[1],
            ChainCall::MintEvents {
                from_block: 990,
                to_block: 1_000
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_ignores_mints_that_do_not_match() {
        let chain = Arc::new(MockChain::new(RECIPIENT));
        chain.push_poll(Ok(vec![
            mint_event(RECIPIENT, TOKEN, 9_999_999),
            mint_event(Address::with_last_byte(0x99), TOKEN, 10_000_000),
            mint_event(RECIPIENT, Address::with_last_byte(0x98), 10_000_000),
        ]));
        chain.push_poll(Ok(vec![mint_event(RECIPIENT, TOKEN, 10_000_000)]));
        let (ctx, mut completion_rx) = context(&chain);

        PaymentListener::spawn(request(10_000_000), ctx);
        let completed = completion_rx.recv().await.unwrap();

        assert!(completed.success());
        assert_eq!(chain.mint_queries(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_distributes_at_most_once() {
        let chain = Arc::new(MockChain::new(RECIPIENT));
        let mint = mint_event(RECIPIENT, TOKEN, 10_000_000);
        chain.push_poll(Ok(vec![mint.clone(), mint.clone()]));
        chain.set_standing_events(vec![mint]);
        let (ctx, mut completion_rx) = context(&chain);

        let handle = PaymentListener::spawn(request(10_000_000), ctx);
        completion_rx.recv().await.unwrap();
        handle.join().await;
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(chain.mint_queries(), 1);
        assert_eq!(chain.submitted_transfers().len(), 2);
        assert!(completion_rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rpc_errors_are_retried() {
        let chain = Arc::new(MockChain::new(RECIPIENT));
        chain.push_poll(Err(ChainError::Rpc("connection reset".to_string())));
        chain.push_poll(Err(ChainError::Rpc("rate limited".to_string())));
        chain.push_poll(Ok(vec![mint_event(RECIPIENT, TOKEN, 10_000_000)]));
        let (ctx, mut completion_rx) = context(&chain);

        PaymentListener::spawn(request(10_000_000), ctx);
        let completed = completion_rx.recv().await.unwrap();

        assert!(completed.success());
        assert_eq!(chain.mint_queries(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_without_mint() {
        let chain = Arc::new(MockChain::new(RECIPIENT));
        let (ctx, mut completion_rx) = context(&chain);
        let started = Instant::now();

        let handle = PaymentListener::spawn(request(10_000_000), ctx);
        let completed = completion_rx.recv().await.unwrap();
        let waited = started.elapsed();

        assert_eq!(completed.status, PaymentStatus::TimedOut);
        assert_eq!(completed.error.as_deref(), Some(PaymentCompleted::TIMEOUT_ERROR));
        assert!(waited > Duration::from_secs(150), "{waited:?}");
        assert!(waited <= Duration::from_secs(152), "{waited:?}");
        assert!(chain.submitted_transfers().is_empty());

        assert_eq!(handle.join().await.status, PaymentStatus::TimedOut);
        assert!(completion_rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_when_chain_read_hangs() {
        let chain = Arc::new(MockChain::new(RECIPIENT));
        chain.stall_reads();
        let (ctx, mut completion_rx) = context(&chain);
        let started = Instant::now();

        let handle = PaymentListener::spawn(request(10_000_000), ctx);
        let completed = tokio::time::timeout(Duration::from_secs(3_600), completion_rx.recv())
            .await
            .expect("listener should give up on a hung read")
            .unwrap();
        let waited = started.elapsed();

        assert_eq!(completed.status, PaymentStatus::TimedOut);
        assert!(waited >= Duration::from_secs(150), "{waited:?}");
        assert!(waited <= Duration::from_secs(151), "{waited:?}");
        assert_eq!(chain.mint_queries(), 0);
        assert_eq!(handle.join().await.status, PaymentStatus::TimedOut);
    }

    #[tokio::test(start_paused = true)]
    async fn test_block_height_errors_are_retried() {
        let chain = Arc::new(MockChain::new(RECIPIENT));
        chain.push_head(Err(ChainError::Rpc("connection reset".to_string())));
        chain.push_head(Err(ChainError::Rpc("rate limited".to_string())));
        chain.set_standing_events(vec![mint_event(RECIPIENT, TOKEN, 10_000_000)]);
        let (ctx, mut completion_rx) = context(&chain);

        PaymentListener::spawn(request(10_000_000), ctx);
        let completed = completion_rx.recv().await.unwrap();

        assert!(completed.success());
        // The failed head reads never reach the log query.
        assert_eq!(chain.mint_queries(), 1);
        let heads = chain
            .calls()
            .iter()
            .filter(|call| **call == ChainCall::BlockHeight)
            .count();
        assert_eq!(heads, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_window_follows_chain_head() {
        let chain = Arc::new(MockChain::new(RECIPIENT));
        chain.push_head(Ok(1_000));
        chain.push_head(Ok(1_005));
        chain.push_head(Ok(1_012));
        chain.push_poll(Ok(vec![]));
        chain.push_poll(Ok(vec![]));
        chain.push_poll(Ok(vec![mint_event(RECIPIENT, TOKEN, 5)]));
        let (ctx, mut completion_rx) = context(&chain);

        PaymentListener::spawn(request(5), ctx);
        completion_rx.recv().await.unwrap();

        let windows: Vec<_> = chain
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                ChainCall::MintEvents {
                    from_block,
                    to_block,
                } => Some((from_block, to_block)),
                _ => None,
            })
            .collect();
        assert_eq!(windows, vec![(990, 1_000), (995, 1_005), (1_002, 1_012)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_polling() {
        let chain = Arc::new(MockChain::new(RECIPIENT));
        let (ctx, mut completion_rx) = context(&chain);

        let handle = PaymentListener::spawn(request(10_000_000), ctx);
        tokio::time::sleep(Duration::from_millis(4_500)).await;
        assert_eq!(handle.status(), PaymentStatus::Polling);

        handle.stop();
        handle.stop();
        let completed = completion_rx.recv().await.unwrap();
        let queries = chain.mint_queries();

        assert_eq!(completed.status, PaymentStatus::Cancelled);
        assert_eq!(completed.error.as_deref(), Some(PaymentCompleted::CANCELLED_ERROR));
        assert_eq!(handle.join().await.status, PaymentStatus::Cancelled);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(chain.mint_queries(), queries);
        assert!(completion_rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_distribution_reports_failure() {
        let chain = Arc::new(MockChain::new(RECIPIENT));
        chain.set_gas_balance(U256::ZERO);
        chain.push_poll(Ok(vec![mint_event(RECIPIENT, TOKEN, 10_000_000)]));
        let (ctx, mut completion_rx) = context(&chain);

        let handle = PaymentListener::spawn(request(10_000_000), ctx);
        let completed = completion_rx.recv().await.unwrap();

        assert_eq!(completed.status, PaymentStatus::Failed);
        assert_eq!(completed.error.as_deref(), Some(crate::entities::NO_GAS_ERROR));
        assert_eq!(handle.join().await.status, PaymentStatus::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_amount_listeners_both_consume_one_mint() {
        // Matching is by amount only: one mint satisfies both listeners.
        let chain = Arc::new(MockChain::new(RECIPIENT));
        chain.set_standing_events(vec![mint_event(RECIPIENT, TOKEN, 10_000_000)]);
        let (ctx, mut completion_rx) = context(&chain);

        PaymentListener::spawn(request(10_000_000), ctx.clone());
        PaymentListener::spawn(request(10_000_000), ctx);

        assert!(completion_rx.recv().await.unwrap().success());
        assert!(completion_rx.recv().await.unwrap().success());
        assert_eq!(chain.submitted_transfers().len(), 4);
    }
}
