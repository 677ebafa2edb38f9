// Copyright (c) James Kassemi, SC, US. All rights reserved.
use core_types::{ActionKey, Address, PendingAction, Poll, PollIndex};
use poll_registry::PollSnapshot;
use std::sync::Arc;

/// Everything a presentation layer renders, captured at one instant.
#[derive(Debug, Clone)]
pub struct EngineView {
    pub snapshot: Arc<PollSnapshot>,
    pub pending: Vec<PendingAction>,
    pub error: Option<String>,
    pub account: Option<Address>,
    pub loading: bool,
}

impl EngineView {
    pub fn polls(&self) -> &[Poll] {
        &self.snapshot.polls
    }

    pub fn is_connected(&self) -> bool {
        self.account.is_some()
    }

    pub fn is_pending(&self, key: &ActionKey) -> bool {
        self.pending.iter().any(|action| &action.key == key)
    }

    /// Whether any action targeting `poll` is in flight.
    pub fn poll_busy(&self, poll: PollIndex) -> bool {
        self.pending.iter().any(|action| action.key.poll == Some(poll))
    }
}
