// Copyright (c) James Kassemi, SC, US. All rights reserved.

//! Ledger boundary traits.
//!
//! The poll engine only talks to the chain through these four seams:
//! - [`LedgerReader`]: `getPollCount` / `getPoll` queries.
//! - [`LedgerWriter`]: dry-run then broadcast of `createPoll` / `vote` / `endPoll`.
//! - [`ConfirmationTracker`]: waits for a broadcast transaction to become final.
//! - [`Signer`]: the external wallet holding the user's keys.

pub mod call;
pub mod error;

pub use call::{Confirmation, ContractCall, ExecutableRequest, PollRecord};
pub use error::{ConfirmationError, ReadError, SignerError, SimulationError, SubmissionError};

use core_types::{Address, PollIndex, TxHash};

#[async_trait::async_trait]
pub trait LedgerReader: Send + Sync {
    async fn poll_count(&self) -> Result<u64, ReadError>;

    /// Must be safe to call concurrently for different indices.
    async fn poll(&self, index: PollIndex) -> Result<PollRecord, ReadError>;
}

#[async_trait::async_trait]
pub trait LedgerWriter: Send + Sync {
    async fn simulate(
        &self,
        call: &ContractCall,
        from: Address,
    ) -> Result<ExecutableRequest, SimulationError>;

    async fn submit(&self, request: ExecutableRequest) -> Result<TxHash, SubmissionError>;
}

#[async_trait::async_trait]
pub trait ConfirmationTracker: Send + Sync {
    async fn await_confirmation(&self, tx_hash: TxHash) -> Result<Confirmation, ConfirmationError>;
}

#[async_trait::async_trait]
pub trait Signer: Send + Sync {
    /// Accounts already authorized, without prompting the user.
    async fn accounts(&self) -> Result<Vec<Address>, SignerError>;

    /// Asks the wallet to expose accounts; may prompt the user.
    async fn request_addresses(&self) -> Result<Vec<Address>, SignerError>;

    async fn send_transaction(&self, request: &ExecutableRequest) -> Result<TxHash, SignerError>;
}
