//! Shared test helpers: a scripted in-memory wallet and a paused-time clock.

#![cfg(test)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{broadcast, Semaphore};
use tokio::time::Instant;

use crate::abi::{self, Token};
use crate::config::SessionConfig;
use crate::constants::*;
use crate::countdown::Clock;
use crate::gateway::*;
use crate::session::StakingSession;

pub const DAY: u64 = 86_400;
pub const LOCK: u64 = LOCK_DURATION_SECS;
/// Wall-clock time at the start of every test
pub const T0: u64 = 1_700_000_000;
pub const ONE_TOKEN: u128 = 1_000_000_000_000_000_000;

pub fn user() -> Address {
    Address([0x11; 20])
}

pub fn other_user() -> Address {
    Address([0x33; 20])
}

pub fn owner() -> Address {
    Address([0x22; 20])
}

/// Unix clock that moves with tokio's (pausable) clock
pub struct PausedClock {
    base: u64,
    start: Instant,
}

impl PausedClock {
    pub fn new(base: u64) -> Arc<Self> {
        Arc::new(Self {
            base,
            start: Instant::now(),
        })
    }
}

impl Clock for PausedClock {
    fn now(&self) -> u64 {
        self.base + self.start.elapsed().as_secs()
    }
}

/// Chain and wallet state behind `MockGateway`
pub struct ChainState {
    pub available: bool,
    pub accounts: Vec<Address>,
    pub chain_id: u64,
    pub known_chains: Vec<u64>,
    pub reject_switch: bool,

    pub token_balances: HashMap<Address, u128>,
    pub staked: HashMap<Address, u128>,
    pub stake_timestamps: HashMap<Address, u64>,
    pub allowances: HashMap<Address, u128>,
    pub reward_pool: u128,
    pub owner: Address,
    pub block_time: u64,

    /// Empty receipt polls before each transaction shows up
    pub pending_polls: usize,
    pub never_confirm: bool,
    pub reject_selectors: Vec<[u8; 4]>,
    pub revert_selectors: Vec<[u8; 4]>,
    pub fail_reads: bool,
    pub fail_timestamp_reads: bool,
    /// Reads compute their result, then wait for a permit
    pub read_gate: Option<Arc<Semaphore>>,

    pub calls: Vec<CallRequest>,
    pub sent: Vec<TransactionRequest>,
    pub receipt_polls: usize,
    pub switch_requests: usize,
    pub add_chain_requests: usize,
    receipts: HashMap<TxHash, (usize, Receipt)>,
}

impl Default for ChainState {
    fn default() -> Self {
        Self {
            available: true,
            accounts: vec![user()],
            chain_id: TARGET_CHAIN_ID,
            known_chains: vec![TARGET_CHAIN_ID],
            reject_switch: false,
            token_balances: HashMap::new(),
            staked: HashMap::new(),
            stake_timestamps: HashMap::new(),
            allowances: HashMap::new(),
            reward_pool: 0,
            owner: owner(),
            block_time: T0,
            pending_polls: 0,
            never_confirm: false,
            reject_selectors: Vec::new(),
            revert_selectors: Vec::new(),
            fail_reads: false,
            fail_timestamp_reads: false,
            read_gate: None,
            calls: Vec::new(),
            sent: Vec::new(),
            receipt_polls: 0,
            switch_requests: 0,
            add_chain_requests: 0,
            receipts: HashMap::new(),
        }
    }
}

impl ChainState {
    /// Execute a transaction against the in-memory contracts; false = revert
    fn execute(&mut self, tx: &TransactionRequest) -> bool {
        let Ok((selector, words)) = abi::split_call(&tx.data) else {
            return false;
        };
        if self.revert_selectors.contains(&selector) {
            return false;
        }
        let from = tx.from;
        let uint_arg = |i: usize| words.get(i).and_then(|w| abi::decode_uint(w).ok());

        match (tx.to == TOKEN_ADDRESS, selector) {
            (true, APPROVE_SELECTOR) => {
                let Some(amount) = uint_arg(1) else { return false };
                self.allowances.insert(from, amount);
                true
            }
            (false, STAKE_SELECTOR) => {
                let Some(amount) = uint_arg(0) else { return false };
                if !self.pull_tokens(from, amount) {
                    return false;
                }
                *self.staked.entry(from).or_default() += amount;
                self.stake_timestamps.insert(from, self.block_time);
                true
            }
            (false, WITHDRAW_SELECTOR) => {
                let staked = self.staked.remove(&from).unwrap_or(0);
                if staked == 0 {
                    return false;
                }
                self.stake_timestamps.remove(&from);
                *self.token_balances.entry(from).or_default() += staked;
                true
            }
            (false, ADD_TO_REWARD_POOL_SELECTOR) => {
                let Some(amount) = uint_arg(0) else { return false };
                if from != self.owner || !self.pull_tokens(from, amount) {
                    return false;
                }
                self.reward_pool += amount;
                true
            }
            _ => false,
        }
    }

    fn pull_tokens(&mut self, from: Address, amount: u128) -> bool {
        let allowance = self.allowances.get(&from).copied().unwrap_or(0);
        let balance = self.token_balances.get(&from).copied().unwrap_or(0);
        if allowance < amount || balance < amount {
            return false;
        }
        self.allowances.insert(from, allowance - amount);
        self.token_balances.insert(from, balance - amount);
        true
    }

    fn read(&self, request: &CallRequest) -> ProviderResult<Vec<u8>> {
        if self.fail_reads {
            return Err(ProviderError::new(-32603, "internal error"));
        }
        let (selector, words) =
            abi::split_call(&request.data).map_err(|e| ProviderError::new(-32602, e.to_string()))?;
        let address_arg = || {
            words
                .first()
                .and_then(|w| abi::decode_address(w).ok())
                .unwrap_or(Address::ZERO)
        };

        let value = match (request.to == TOKEN_ADDRESS, selector) {
            (true, BALANCE_OF_SELECTOR) => {
                Token::Uint(self.token_balances.get(&address_arg()).copied().unwrap_or(0))
            }
            (false, GET_STAKED_AMOUNT_SELECTOR) => {
                Token::Uint(self.staked.get(&address_arg()).copied().unwrap_or(0))
            }
            (false, GET_STAKE_TIMESTAMP_SELECTOR) => {
                if self.fail_timestamp_reads {
                    return Err(ProviderError::new(-32000, "execution reverted"));
                }
                Token::Uint(
                    self.stake_timestamps
                        .get(&address_arg())
                        .copied()
                        .unwrap_or(0) as u128,
                )
            }
            (false, OWNER_SELECTOR) => Token::Address(self.owner),
            _ => return Err(ProviderError::new(-32000, "execution reverted")),
        };

        // Return data is a bare word: strip the selector encode_call adds
        Ok(abi::encode_call([0; 4], &[value])[4..].to_vec())
    }
}

pub struct MockGateway {
    pub state: Mutex<ChainState>,
    events: broadcast::Sender<ProviderEvent>,
}

impl MockGateway {
    pub fn new() -> Arc<Self> {
        Self::with(|_| {})
    }

    pub fn with(setup: impl FnOnce(&mut ChainState)) -> Arc<Self> {
        let mut state = ChainState::default();
        setup(&mut state);
        let (events, _) = broadcast::channel(16);
        Arc::new(Self {
            state: Mutex::new(state),
            events,
        })
    }

    pub fn update(&self, f: impl FnOnce(&mut ChainState)) {
        f(&mut self.state.lock());
    }

    pub fn emit(&self, event: ProviderEvent) {
        // No receiver yet is fine
        let _ = self.events.send(event);
    }

    pub fn sent_selectors(&self) -> Vec<[u8; 4]> {
        self.state
            .lock()
            .sent
            .iter()
            .map(|tx| {
                let mut selector = [0u8; 4];
                selector.copy_from_slice(&tx.data[..4]);
                selector
            })
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().calls.len()
    }
}

impl WalletGateway for MockGateway {
    fn is_available(&self) -> bool {
        self.state.lock().available
    }

    async fn request_accounts(&self) -> ProviderResult<Vec<Address>> {
        let state = self.state.lock();
        if state.accounts.is_empty() {
            return Err(ProviderError::new(USER_REJECTED_CODE, "User rejected the request."));
        }
        Ok(state.accounts.clone())
    }

    async fn accounts(&self) -> ProviderResult<Vec<Address>> {
        Ok(self.state.lock().accounts.clone())
    }

    async fn chain_id(&self) -> ProviderResult<u64> {
        Ok(self.state.lock().chain_id)
    }

    async fn switch_chain(&self, chain_id: u64) -> ProviderResult<()> {
        let mut state = self.state.lock();
        state.switch_requests += 1;
        if state.reject_switch {
            return Err(ProviderError::new(USER_REJECTED_CODE, "User rejected the request."));
        }
        if !state.known_chains.contains(&chain_id) {
            return Err(ProviderError::new(
                UNRECOGNIZED_CHAIN_CODE,
                "Unrecognized chain ID. Try adding the chain using wallet_addEthereumChain first.",
            ));
        }
        state.chain_id = chain_id;
        Ok(())
    }

    async fn add_chain(&self, chain: &ChainDescriptor) -> ProviderResult<()> {
        let mut state = self.state.lock();
        state.add_chain_requests += 1;
        state.known_chains.push(chain.chain_id);
        Ok(())
    }

    async fn call(&self, request: &CallRequest) -> ProviderResult<Vec<u8>> {
        let (result, gate) = {
            let mut state = self.state.lock();
            state.calls.push(request.clone());
            (state.read(request), state.read_gate.clone())
        };
        if let Some(gate) = gate {
            let _permit = gate.acquire().await;
        }
        result
    }

    async fn send_transaction(&self, request: &TransactionRequest) -> ProviderResult<TxHash> {
        let mut state = self.state.lock();
        let selector: [u8; 4] = request.data[..4]
            .try_into()
            .map_err(|_| ProviderError::new(-32602, "short calldata"))?;
        if state.reject_selectors.contains(&selector) {
            return Err(ProviderError::new(
                USER_REJECTED_CODE,
                "MetaMask Tx Signature: User denied transaction signature.",
            ));
        }

        state.sent.push(request.clone());
        let hash = TxHash(format!("0x{:064x}", state.sent.len()));
        let success = state.execute(request);
        let receipt = Receipt {
            transaction_hash: hash.clone(),
            block_number: state.sent.len() as u64,
            status: Some(u64::from(success)),
        };
        let pending = state.pending_polls;
        state.receipts.insert(hash.clone(), (pending, receipt));
        Ok(hash)
    }

    async fn transaction_receipt(&self, hash: &TxHash) -> ProviderResult<Option<Receipt>> {
        let mut state = self.state.lock();
        state.receipt_polls += 1;
        if state.never_confirm {
            return Ok(None);
        }
        match state.receipts.get_mut(hash) {
            Some((0, receipt)) => Ok(Some(receipt.clone())),
            Some((remaining, _)) => {
                *remaining -= 1;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.events.subscribe()
    }
}

pub fn session_with(
    mock: &Arc<MockGateway>,
    config: SessionConfig,
) -> (StakingSession<MockGateway>, Arc<PausedClock>) {
    let clock = PausedClock::new(T0);
    let session = StakingSession::with_clock(Arc::clone(mock), config, clock.clone())
        .expect("valid config");
    (session, clock)
}

pub fn new_session(mock: &Arc<MockGateway>) -> StakingSession<MockGateway> {
    session_with(mock, SessionConfig::default()).0
}

/// Session for `mock` with the first account already connected and its
/// timers started at the current instant
pub async fn connected_session(mock: &Arc<MockGateway>) -> StakingSession<MockGateway> {
    let session = new_session(mock);
    session.connect().await.expect("connect");
    settle().await;
    session
}

/// Let spawned tasks run without moving the clock
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

/// Move paused time forward by whole seconds, one second at a time
pub async fn advance_secs(secs: u64) {
    for _ in 0..secs {
        tokio::time::advance(Duration::from_secs(1)).await;
        settle().await;
    }
}
