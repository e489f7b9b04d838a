//! Scripted chain used by the processor tests.

use super::{
    AccountSubmissionQueue, ChainError, ChainReader, ChainWriter, Confirmation, MintEvent,
    MintEventQuery,
};
use crate::config::{AgentConfig, DEFAULT_RETENTION, PartiesConfig, TimingConfig};
use crate::events::{CompletionReceiver, completion_channel};
use crate::processors::{Distributor, ListenerContext};
use crate::utils::TokioClock;
use alloy::primitives::{Address, TxHash, U256, address};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mint recipient and operating account of the test agent.
pub const AGENT: Address = address!("000000000000000000000000000000000000000f");
pub const TOKEN: Address = address!("000000000000000000000000000000000000000c");
pub const PARTY_A: Address = address!("000000000000000000000000000000000000000a");
pub const PARTY_B: Address = address!("000000000000000000000000000000000000000b");

pub fn test_config() -> AgentConfig {
    AgentConfig {
        token: TOKEN,
        mint_contract: address!("000000000000000000000000000000000000000d"),
        recipient: AGENT,
        parties: PartiesConfig {
            party_a: PARTY_A,
            party_b: PARTY_B,
        },
        timing: TimingConfig::default(),
        allow_duplicate_amounts: false,
        retention: DEFAULT_RETENTION,
    }
}

/// Listener dependencies wired to `chain`.
pub fn listener_context(
    chain: &Arc<MockChain>,
    config: AgentConfig,
) -> (ListenerContext, CompletionReceiver) {
    let (completion_tx, completion_rx) = completion_channel();
    let distributor = Distributor::new(
        chain.clone(),
        chain.clone(),
        AccountSubmissionQueue::new(),
        config.token,
        config.parties,
    );
    let ctx = ListenerContext {
        reader: chain.clone(),
        distributor: Arc::new(distributor),
        clock: Arc::new(TokioClock),
        config: Arc::new(config),
        completion_tx,
    };
    (ctx, completion_rx)
}

/// One call made against the mock, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainCall {
    BlockHeight,
    MintEvents { from_block: u64, to_block: u64 },
    GasBalance(Address),
    Submit { to: Address, amount: U256 },
    Confirm(TxHash),
}

struct MockState {
    block_height: u64,
    heads: VecDeque<Result<u64, ChainError>>,
    stall_reads: bool,
    polls: VecDeque<Result<Vec<MintEvent>, ChainError>>,
    standing_events: Vec<MintEvent>,
    gas_balance: U256,
    submit_failures: HashMap<usize, ChainError>,
    confirm_failures: HashMap<usize, ChainError>,
    confirm_delay: Duration,
    submissions: usize,
    confirmations: usize,
    calls: Vec<ChainCall>,
}

pub struct MockChain {
    account: Address,
    state: Mutex<MockState>,
}

impl MockChain {
    pub fn new(account: Address) -> Self {
        Self {
            account,
            state: Mutex::new(MockState {
                block_height: 1_000,
                heads: VecDeque::new(),
                stall_reads: false,
                polls: VecDeque::new(),
                standing_events: Vec::new(),
                gas_balance: U256::from(10u64).pow(U256::from(18u64)),
                submit_failures: HashMap::new(),
                confirm_failures: HashMap::new(),
                confirm_delay: Duration::ZERO,
                submissions: 0,
                confirmations: 0,
                calls: Vec::new(),
            }),
        }
    }

    /// Result of the next `current_block_height` call. A scripted height
    /// stays the head once the script runs out.
    pub fn push_head(&self, result: Result<u64, ChainError>) {
        self.state.lock().unwrap().heads.push_back(result);
    }

    /// Make every `current_block_height` call hang forever.
    pub fn stall_reads(&self) {
        self.state.lock().unwrap().stall_reads = true;
    }

    /// Result of the next `mint_events` call. Once the script runs out,
    /// the standing events are returned.
    pub fn push_poll(&self, result: Result<Vec<MintEvent>, ChainError>) {
        self.state.lock().unwrap().polls.push_back(result);
    }

    pub fn set_standing_events(&self, events: Vec<MintEvent>) {
        self.state.lock().unwrap().standing_events = events;
    }

    pub fn set_gas_balance(&self, balance: U256) {
        self.state.lock().unwrap().gas_balance = balance;
    }

    /// Fail the `index`-th submission (zero based).
    pub fn fail_submission(&self, index: usize, error: ChainError) {
        self.state.lock().unwrap().submit_failures.insert(index, error);
    }

    /// Fail the `index`-th confirmation (zero based).
    pub fn fail_confirmation(&self, index: usize, error: ChainError) {
        self.state.lock().unwrap().confirm_failures.insert(index, error);
    }

    pub fn set_confirm_delay(&self, delay: Duration) {
        self.state.lock().unwrap().confirm_delay = delay;
    }

    pub fn calls(&self) -> Vec<ChainCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// `(to, amount)` of every submitted transfer.
    pub fn submitted_transfers(&self) -> Vec<(Address, U256)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ChainCall::Submit { to, amount } => Some((to, amount)),
                _ => None,
            })
            .collect()
    }

    pub fn mint_queries(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, ChainCall::MintEvents { .. }))
            .count()
    }
}

/// Hash handed out for the `index`-th submission.
pub fn mock_tx_hash(index: usize) -> TxHash {
    TxHash::with_last_byte(index as u8 + 1)
}

/// Block a transaction with `mock_tx_hash(index)` is confirmed in.
pub fn mock_block(index: usize) -> u64 {
    2_000 + index as u64
}

pub fn mint_event(recipient: Address, token: Address, amount: u64) -> MintEvent {
    MintEvent {
        recipient,
        amount: U256::from(amount),
        token,
        block_number: 995,
        transaction_hash: TxHash::with_last_byte(0xee),
    }
}

#[async_trait]
impl ChainReader for MockChain {
    async fn current_block_height(&self) -> Result<u64, ChainError> {
        let stalled = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(ChainCall::BlockHeight);
            state.stall_reads
        };
        if stalled {
            std::future::pending::<()>().await;
        }

        let mut state = self.state.lock().unwrap();
        match state.heads.pop_front() {
            Some(Ok(height)) => {
                state.block_height = height;
                Ok(height)
            }
            Some(Err(error)) => Err(error),
            None => Ok(state.block_height),
        }
    }

    async fn mint_events(&self, query: &MintEventQuery) -> Result<Vec<MintEvent>, ChainError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ChainCall::MintEvents {
            from_block: query.from_block,
            to_block: query.to_block,
        });
        match state.polls.pop_front() {
            Some(result) => result,
            None => Ok(state.standing_events.clone()),
        }
    }

    async fn gas_balance(&self, account: Address) -> Result<U256, ChainError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ChainCall::GasBalance(account));
        Ok(state.gas_balance)
    }
}

#[async_trait]
impl ChainWriter for MockChain {
    fn account(&self) -> Address {
        self.account
    }

    async fn submit_transfer(
        &self,
        _token: Address,
        to: Address,
        amount: U256,
    ) -> Result<TxHash, ChainError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ChainCall::Submit { to, amount });
        let index = state.submissions;
        state.submissions += 1;
        match state.submit_failures.remove(&index) {
            Some(error) => Err(error),
            None => Ok(mock_tx_hash(index)),
        }
    }

    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> Result<Confirmation, ChainError> {
        let (delay, outcome) = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(ChainCall::Confirm(tx_hash));
            let index = state.confirmations;
            state.confirmations += 1;
            let outcome = match state.confirm_failures.remove(&index) {
                Some(error) => Err(error),
                None => Ok(Confirmation {
                    tx_hash,
                    block_number: mock_block(tx_hash.0[31] as usize - 1),
                }),
            };
            (state.confirm_delay, outcome)
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        outcome
    }
}
