// Copyright (c) James Kassemi, SC, US. All rights reserved.
#![allow(dead_code)]

//! In-memory poll contract standing in for the node, the wallet and the receipt channel.

use core_types::{Address, PollIndex, TxHash};
use ledger_client::{
    Confirmation, ConfirmationError, ConfirmationTracker, ContractCall, ExecutableRequest,
    LedgerReader, LedgerWriter, PollRecord, ReadError, Signer, SignerError, SimulationError,
    SubmissionError,
};
use parking_lot::Mutex;
use poll_engine::ActionOrchestrator;
use poll_registry::PollRegistry;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;

pub const CONTRACT: Address = Address::new([0xf9; 20]);
pub const ALICE: Address = Address::new([0xa1; 20]);

#[derive(Default)]
struct LedgerState {
    polls: Vec<PollRecord>,
    voters: HashSet<(PollIndex, Address)>,
    mempool: HashMap<TxHash, ContractCall>,
    block: u64,
}

pub struct FakeContract {
    state: Mutex<LedgerState>,
    wallet_accounts: Mutex<Vec<Address>>,
    authorized: AtomicBool,
    pub reject_signing: AtomicBool,
    pub revert_receipts: AtomicBool,
    pub fail_reads: AtomicBool,
    pub hold_confirmations: AtomicBool,
    confirm_gate: Semaphore,
    pub hold_next_count: AtomicBool,
    read_gate: Semaphore,
    next_tx: AtomicU64,
    pub count_reads: AtomicUsize,
    pub simulations: AtomicUsize,
    pub submissions: AtomicUsize,
}

impl FakeContract {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(LedgerState::default()),
            wallet_accounts: Mutex::new(vec![ALICE]),
            authorized: AtomicBool::new(false),
            reject_signing: AtomicBool::new(false),
            revert_receipts: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
            hold_confirmations: AtomicBool::new(false),
            confirm_gate: Semaphore::new(0),
            hold_next_count: AtomicBool::new(false),
            read_gate: Semaphore::new(0),
            next_tx: AtomicU64::new(0),
            count_reads: AtomicUsize::new(0),
            simulations: AtomicUsize::new(0),
            submissions: AtomicUsize::new(0),
        })
    }

    pub fn with_poll(
        self: Arc<Self>,
        title: &str,
        candidates: &[(&str, u64)],
        active: bool,
    ) -> Arc<Self> {
        self.state.lock().polls.push(PollRecord {
            title: title.to_string(),
            active,
            candidate_names: candidates.iter().map(|(name, _)| name.to_string()).collect(),
            vote_counts: candidates.iter().map(|(_, votes)| *votes).collect(),
        });
        self
    }

    pub fn set_wallet_accounts(&self, accounts: Vec<Address>) {
        *self.wallet_accounts.lock() = accounts;
    }

    pub fn set_authorized(&self, authorized: bool) {
        self.authorized.store(authorized, Ordering::SeqCst);
    }

    pub fn release_confirmation(&self) {
        self.confirm_gate.add_permits(1);
    }

    pub fn release_reads(&self) {
        self.read_gate.add_permits(1);
    }

    pub fn votes(&self, poll: PollIndex) -> Vec<u64> {
        self.state.lock().polls[poll as usize].vote_counts.clone()
    }

    pub fn reads(&self) -> usize {
        self.count_reads.load(Ordering::SeqCst)
    }

    pub fn simulated(&self) -> usize {
        self.simulations.load(Ordering::SeqCst)
    }

    pub fn submitted(&self) -> usize {
        self.submissions.load(Ordering::SeqCst)
    }

    fn check(&self, call: &ContractCall, from: Address) -> Result<(), String> {
        let state = self.state.lock();
        match call {
            ContractCall::CreatePoll { candidates, .. } => {
                if candidates.len() < 2 {
                    return Err("At least two candidates required".to_string());
                }
            }
            ContractCall::Vote { poll, candidate } => {
                let record = state
                    .polls
                    .get(*poll as usize)
                    .ok_or_else(|| "Poll does not exist".to_string())?;
                if !record.active {
                    return Err("Poll has ended".to_string());
                }
                if *candidate as usize >= record.candidate_names.len() {
                    return Err("Invalid candidate".to_string());
                }
                if state.voters.contains(&(*poll, from)) {
                    return Err("Already voted".to_string());
                }
            }
            ContractCall::EndPoll { poll } => {
                let record = state
                    .polls
                    .get(*poll as usize)
                    .ok_or_else(|| "Poll does not exist".to_string())?;
                if !record.active {
                    return Err("Poll already ended".to_string());
                }
            }
        }
        Ok(())
    }

    fn mine(&self, tx_hash: TxHash, from: Address) -> Option<u64> {
        let mut state = self.state.lock();
        let call = state.mempool.remove(&tx_hash)?;
        match call {
            ContractCall::CreatePoll { title, candidates } => {
                let counts = vec![0; candidates.len()];
                state.polls.push(PollRecord {
                    title,
                    active: true,
                    candidate_names: candidates,
                    vote_counts: counts,
                });
            }
            ContractCall::Vote { poll, candidate } => {
                state.polls[poll as usize].vote_counts[candidate as usize] += 1;
                state.voters.insert((poll, from));
            }
            ContractCall::EndPoll { poll } => {
                state.polls[poll as usize].active = false;
            }
        }
        state.block += 1;
        Some(state.block)
    }
}

#[async_trait::async_trait]
impl LedgerReader for FakeContract {
    async fn poll_count(&self) -> Result<u64, ReadError> {
        self.count_reads.fetch_add(1, Ordering::SeqCst);
        if self.hold_next_count.swap(false, Ordering::SeqCst) {
            let permit = self
                .read_gate
                .acquire()
                .await
                .map_err(|err| ReadError::Network(err.to_string()))?;
            permit.forget();
        }
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(ReadError::Network("node unreachable".to_string()));
        }
        Ok(self.state.lock().polls.len() as u64)
    }

    async fn poll(&self, index: PollIndex) -> Result<PollRecord, ReadError> {
        self.state
            .lock()
            .polls
            .get(index as usize)
            .cloned()
            .ok_or(ReadError::OutOfRange { index })
    }
}

#[async_trait::async_trait]
impl LedgerWriter for FakeContract {
    async fn simulate(
        &self,
        call: &ContractCall,
        from: Address,
    ) -> Result<ExecutableRequest, SimulationError> {
        self.simulations.fetch_add(1, Ordering::SeqCst);
        self.check(call, from)
            .map_err(|reason| SimulationError::Reverted { reason })?;
        Ok(ExecutableRequest {
            call: call.clone(),
            from,
            to: CONTRACT,
            data: Vec::new(),
            chain_id: 84_532,
        })
    }

    async fn submit(&self, request: ExecutableRequest) -> Result<TxHash, SubmissionError> {
        self.submissions.fetch_add(1, Ordering::SeqCst);
        Ok(self.send_transaction(&request).await?)
    }
}

#[async_trait::async_trait]
impl Signer for FakeContract {
    async fn accounts(&self) -> Result<Vec<Address>, SignerError> {
        if self.authorized.load(Ordering::SeqCst) {
            Ok(self.wallet_accounts.lock().clone())
        } else {
            Ok(Vec::new())
        }
    }

    async fn request_addresses(&self) -> Result<Vec<Address>, SignerError> {
        let accounts = self.wallet_accounts.lock().clone();
        if accounts.is_empty() {
            return Err(SignerError::NoAccounts);
        }
        self.authorized.store(true, Ordering::SeqCst);
        Ok(accounts)
    }

    async fn send_transaction(&self, request: &ExecutableRequest) -> Result<TxHash, SignerError> {
        if self.reject_signing.load(Ordering::SeqCst) {
            return Err(SignerError::Rejected("User rejected the request.".to_string()));
        }
        let n = self.next_tx.fetch_add(1, Ordering::SeqCst) + 1;
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&n.to_be_bytes());
        bytes[..20].copy_from_slice(request.from.as_bytes());
        let tx_hash = TxHash(bytes);
        self.state
            .lock()
            .mempool
            .insert(tx_hash, request.call.clone());
        Ok(tx_hash)
    }
}

#[async_trait::async_trait]
impl ConfirmationTracker for FakeContract {
    async fn await_confirmation(&self, tx_hash: TxHash) -> Result<Confirmation, ConfirmationError> {
        if self.hold_confirmations.load(Ordering::SeqCst) {
            let permit = self
                .confirm_gate
                .acquire()
                .await
                .map_err(|err| ConfirmationError::Channel {
                    tx_hash,
                    reason: err.to_string(),
                })?;
            permit.forget();
        }
        let mut from_bytes = [0u8; 20];
        from_bytes.copy_from_slice(&tx_hash.0[..20]);
        let from = Address::new(from_bytes);
        if self.revert_receipts.load(Ordering::SeqCst) {
            let mut state = self.state.lock();
            state.mempool.remove(&tx_hash);
            state.block += 1;
            return Err(ConfirmationError::Reverted {
                tx_hash,
                block_number: state.block,
            });
        }
        let block_number = self.mine(tx_hash, from).ok_or(ConfirmationError::Channel {
            tx_hash,
            reason: "unknown transaction".to_string(),
        })?;
        Ok(Confirmation {
            tx_hash,
            block_number,
            gas_used: Some(21_000),
        })
    }
}

pub fn engine(contract: &Arc<FakeContract>) -> ActionOrchestrator {
    let registry = PollRegistry::new(contract.clone(), 4);
    ActionOrchestrator::new(
        registry,
        contract.clone(),
        contract.clone(),
        contract.clone(),
    )
}

/// Orchestrator connected as [`ALICE`] with the registry already loaded.
pub async fn connected_engine(contract: &Arc<FakeContract>) -> ActionOrchestrator {
    let engine = engine(contract);
    engine.connect().await.unwrap();
    engine.refresh().await.unwrap();
    engine
}
