// Copyright (c) James Kassemi, SC, US. All rights reserved.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Ledger-assigned poll identity, stable for the poll's lifetime.
pub type PollIndex = u64;
/// Position of a candidate inside its poll; also the on-the-wire vote argument.
pub type CandidateIndex = u32;

#[derive(Debug, Error, PartialEq)]
pub enum HexParseError {
    #[error("missing 0x prefix")]
    MissingPrefix,
    #[error("expected {expected} bytes, got {actual}")]
    Length { expected: usize, actual: usize },
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
}

fn decode_prefixed<const N: usize>(value: &str) -> Result<[u8; N], HexParseError> {
    let digits = value
        .trim()
        .strip_prefix("0x")
        .or_else(|| value.trim().strip_prefix("0X"))
        .ok_or(HexParseError::MissingPrefix)?;
    let bytes = hex::decode(digits)?;
    let actual = bytes.len();
    bytes.try_into().map_err(|_| HexParseError::Length {
        expected: N,
        actual,
    })
}

/// 20-byte account or contract address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// `0x1234...abcd` form used in wallet badges.
    pub fn short(&self) -> String {
        let full = self.to_string();
        format!("{}...{}", &full[..6], &full[full.len() - 4..])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = HexParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        decode_prefixed::<20>(value).map(Self)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Handle of a broadcast transaction.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TxHash(pub [u8; 32]);

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({self})")
    }
}

impl FromStr for TxHash {
    type Err = HexParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        decode_prefixed::<32>(value).map(Self)
    }
}

impl Serialize for TxHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TxHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Ledger position; survives any display re-ordering.
    pub index: CandidateIndex,
    pub name: String,
    pub votes: u64,
}

impl Candidate {
    pub fn percentage_of(&self, total_votes: u64) -> f64 {
        vote_percentage(self.votes, total_votes)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poll {
    pub index: PollIndex,
    pub title: String,
    pub active: bool,
    pub candidates: Vec<Candidate>,
}

impl Poll {
    pub fn total_votes(&self) -> u64 {
        self.candidates
            .iter()
            .fold(0u64, |acc, c| acc.saturating_add(c.votes))
    }

    pub fn candidate(&self, index: CandidateIndex) -> Option<&Candidate> {
        self.candidates.get(index as usize)
    }

    pub fn status_label(&self) -> &'static str {
        if self.active { "Active" } else { "Ended" }
    }

    /// Percentages in ledger order.
    pub fn percentages(&self) -> Vec<f64> {
        let total = self.total_votes();
        self.candidates
            .iter()
            .map(|c| c.percentage_of(total))
            .collect()
    }

    /// Display ordering: most votes first, ties by ledger index. Entries keep their `index`.
    pub fn ranked(&self) -> Vec<&Candidate> {
        let mut ranked: Vec<&Candidate> = self.candidates.iter().collect();
        ranked.sort_by(|a, b| b.votes.cmp(&a.votes).then(a.index.cmp(&b.index)));
        ranked
    }
}

/// Share of `votes` in `total`, in percent. Zero when nobody has voted.
pub fn vote_percentage(votes: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    votes as f64 / total as f64 * 100.0
}

pub fn format_percentage(percentage: f64) -> String {
    format!("{percentage:.1}%")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ActionKind {
    CreatePoll,
    Vote,
    EndPoll,
}

impl ActionKind {
    /// Prefix used when a failure of this kind is surfaced to the user.
    pub fn failure_prefix(&self) -> &'static str {
        match self {
            ActionKind::CreatePoll => "Failed to create poll",
            ActionKind::Vote => "Failed to vote",
            ActionKind::EndPoll => "Failed to end poll",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ActionKind::CreatePoll => "create_poll",
            ActionKind::Vote => "vote",
            ActionKind::EndPoll => "end_poll",
        };
        f.write_str(label)
    }
}

/// Identity of an in-flight action: at most one pending action per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActionKey {
    pub kind: ActionKind,
    pub poll: Option<PollIndex>,
    pub candidate: Option<CandidateIndex>,
}

impl ActionKey {
    pub fn create_poll() -> Self {
        Self {
            kind: ActionKind::CreatePoll,
            poll: None,
            candidate: None,
        }
    }

    pub fn vote(poll: PollIndex, candidate: CandidateIndex) -> Self {
        Self {
            kind: ActionKind::Vote,
            poll: Some(poll),
            candidate: Some(candidate),
        }
    }

    pub fn end_poll(poll: PollIndex) -> Self {
        Self {
            kind: ActionKind::EndPoll,
            poll: Some(poll),
            candidate: None,
        }
    }
}

impl fmt::Display for ActionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.poll, self.candidate) {
            (Some(poll), Some(candidate)) => write!(f, "{}({poll}, {candidate})", self.kind),
            (Some(poll), None) => write!(f, "{}({poll})", self.kind),
            _ => write!(f, "{}", self.kind),
        }
    }
}

/// Lifecycle of a mutating call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionState {
    Simulating,
    Submitted,
    Confirming,
    Done,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAction {
    pub key: ActionKey,
    pub state: ActionState,
    pub tx_hash: Option<TxHash>,
    pub started_at: DateTime<Utc>,
}

impl PendingAction {
    pub fn new(key: ActionKey) -> Self {
        Self {
            key,
            state: ActionState::Simulating,
            tx_hash: None,
            started_at: Utc::now(),
        }
    }
}
