// Copyright (c) James Kassemi, SC, US. All rights reserved.
use core_types::PollIndex;
use ledger_client::ReadError;
use thiserror::Error;

/// A full reload failed; the previously installed snapshot is kept.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("could not read poll count: {0}")]
    Count(#[source] ReadError),
    #[error("could not read poll {index}: {source}")]
    Poll {
        index: PollIndex,
        #[source]
        source: ReadError,
    },
}

pub type Result<T> = std::result::Result<T, LoadError>;
