// Copyright (c) James Kassemi, SC, US. All rights reserved.
use core_types::{ActionKey, CandidateIndex, PollIndex};
use ledger_client::{ConfirmationError, SignerError, SimulationError, SubmissionError};
use poll_registry::LoadError;
use thiserror::Error;

use crate::session::SessionError;

pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Rejected locally; the ledger is never contacted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please connect your wallet first")]
    NotConnected,
    #[error("poll title is required")]
    EmptyTitle,
    #[error("at least two candidates are required, got {found}")]
    TooFewCandidates { found: usize },
    #[error("poll {poll} is not known")]
    UnknownPoll { poll: PollIndex },
    #[error("poll {poll} has no candidate {candidate}")]
    UnknownCandidate {
        poll: PollIndex,
        candidate: CandidateIndex,
    },
    #[error("poll {poll} has ended")]
    PollInactive { poll: PollIndex },
    #[error("{key} is already pending")]
    ActionPending { key: ActionKey },
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Simulation(#[from] SimulationError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    #[error(transparent)]
    Confirmation(#[from] ConfirmationError),
    #[error(transparent)]
    Signer(#[from] SignerError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl EngineError {
    pub fn is_validation(&self) -> bool {
        matches!(self, EngineError::Validation(_))
    }
}
