// Copyright (c) James Kassemi, SC, US. All rights reserved.
use core_types::{PollIndex, TxHash};
use thiserror::Error;

/// Read path failure for a single contract query.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReadError {
    #[error("network error: {0}")]
    Network(String),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("poll {index} is out of range")]
    OutOfRange { index: PollIndex },
}

/// The dry run predicts the call would revert, or could not be performed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SimulationError {
    #[error("execution reverted: {reason}")]
    Reverted { reason: String },
    #[error("simulation unavailable: {0}")]
    Network(String),
}

/// Failures raised by the external wallet.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignerError {
    #[error("no wallet available: {0}")]
    Unavailable(String),
    #[error("request rejected by wallet: {0}")]
    Rejected(String),
    #[error("wallet exposed no accounts")]
    NoAccounts,
    #[error("wallet transport error: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("signer rejected transaction: {0}")]
    Rejected(String),
    #[error("broadcast failed: {0}")]
    Network(String),
}

impl From<SignerError> for SubmissionError {
    fn from(value: SignerError) -> Self {
        match value {
            SignerError::Rejected(reason) => SubmissionError::Rejected(reason),
            SignerError::Unavailable(reason) => SubmissionError::Rejected(reason),
            SignerError::NoAccounts => {
                SubmissionError::Rejected("wallet exposed no accounts".to_string())
            }
            SignerError::Transport(reason) => SubmissionError::Network(reason),
        }
    }
}

/// The transaction was broadcast but did not reach finality successfully.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfirmationError {
    #[error("transaction {tx_hash} reverted in block {block_number}")]
    Reverted { tx_hash: TxHash, block_number: u64 },
    #[error("transaction {tx_hash} not final after {waited_secs}s")]
    Timeout { tx_hash: TxHash, waited_secs: u64 },
    #[error("confirmation channel failed for {tx_hash}: {reason}")]
    Channel { tx_hash: TxHash, reason: String },
}
