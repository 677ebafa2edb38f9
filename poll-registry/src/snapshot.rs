// Copyright (c) James Kassemi, SC, US. All rights reserved.
use chrono::{DateTime, Utc};
use core_types::{Candidate, CandidateIndex, Poll, PollIndex};
use ledger_client::{PollRecord, ReadError};
use log::warn;

/// Immutable view of every poll as of one full reload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PollSnapshot {
    /// Ticket of the refresh that produced this snapshot; 0 before the first load.
    pub generation: u64,
    pub polls: Vec<Poll>,
    pub loaded_at: Option<DateTime<Utc>>,
}

impl PollSnapshot {
    pub fn poll(&self, index: PollIndex) -> Option<&Poll> {
        usize::try_from(index)
            .ok()
            .and_then(|idx| self.polls.get(idx))
            .filter(|poll| poll.index == index)
    }

    pub fn len(&self) -> usize {
        self.polls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polls.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.polls.iter().filter(|poll| poll.active).count()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded_at.is_some()
    }
}

/// Maps a raw `getPoll` tuple into the cached shape, keeping ledger candidate order.
pub fn poll_from_record(index: PollIndex, record: PollRecord) -> Result<Poll, ReadError> {
    let PollRecord {
        title,
        active,
        candidate_names,
        vote_counts,
    } = record;
    if candidate_names.len() != vote_counts.len() {
        return Err(ReadError::Malformed(format!(
            "poll {index}: {} candidate names but {} vote counts",
            candidate_names.len(),
            vote_counts.len()
        )));
    }
    if candidate_names.len() < 2 {
        warn!(
            "[registry] poll {index} has {} candidates",
            candidate_names.len()
        );
    }
    let candidates = candidate_names
        .into_iter()
        .zip(vote_counts)
        .enumerate()
        .map(|(position, (name, votes))| {
            let index = CandidateIndex::try_from(position).map_err(|_| {
                ReadError::Malformed(format!("candidate position {position} out of range"))
            })?;
            Ok(Candidate { index, name, votes })
        })
        .collect::<Result<Vec<_>, ReadError>>()?;
    Ok(Poll {
        index,
        title,
        active,
        candidates,
    })
}
