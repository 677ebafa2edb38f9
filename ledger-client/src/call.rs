// Copyright (c) James Kassemi, SC, US. All rights reserved.
use core_types::{ActionKind, Address, CandidateIndex, PollIndex, TxHash};
use serde::{Deserialize, Serialize};

/// State-changing contract call together with its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractCall {
    CreatePoll {
        title: String,
        candidates: Vec<String>,
    },
    Vote {
        poll: PollIndex,
        candidate: CandidateIndex,
    },
    EndPoll {
        poll: PollIndex,
    },
}

impl ContractCall {
    pub fn kind(&self) -> ActionKind {
        match self {
            ContractCall::CreatePoll { .. } => ActionKind::CreatePoll,
            ContractCall::Vote { .. } => ActionKind::Vote,
            ContractCall::EndPoll { .. } => ActionKind::EndPoll,
        }
    }
}

/// Output of a successful simulation; the only thing `submit` accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutableRequest {
    pub call: ContractCall,
    pub from: Address,
    pub to: Address,
    pub data: Vec<u8>,
    pub chain_id: u64,
}

/// Raw `getPoll` tuple as returned by the contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollRecord {
    pub title: String,
    pub active: bool,
    pub candidate_names: Vec<String>,
    pub vote_counts: Vec<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmation {
    pub tx_hash: TxHash,
    pub block_number: u64,
    pub gas_used: Option<u64>,
}
