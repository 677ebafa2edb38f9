// Copyright (c) James Kassemi, SC, US. All rights reserved.

//! Shared poll types, configuration, polling policy, and status handles for the poll engine.

pub mod config;
pub mod retry;
pub mod status;
pub mod types;

pub use config::AppConfig;
pub use types::{
    ActionKey, ActionKind, ActionState, Address, Candidate, CandidateIndex, PendingAction, Poll,
    PollIndex, TxHash,
};
