// Copyright (c) James Kassemi, SC, US. All rights reserved.
use core_types::{ActionKey, ActionState, PendingAction, TxHash};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ValidationError;

/// In-flight actions keyed by (kind, poll, candidate).
#[derive(Clone, Default)]
pub struct PendingActions {
    table: Arc<Mutex<HashMap<ActionKey, PendingAction>>>,
}

impl PendingActions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `key`, or fails if an action with the same key is still in flight.
    pub fn begin(&self, key: ActionKey) -> Result<PendingSlot, ValidationError> {
        let mut table = self.table.lock();
        if table.contains_key(&key) {
            return Err(ValidationError::ActionPending { key });
        }
        table.insert(key, PendingAction::new(key));
        Ok(PendingSlot {
            actions: self.clone(),
            key,
        })
    }

    pub fn is_pending(&self, key: &ActionKey) -> bool {
        self.table.lock().contains_key(key)
    }

    pub fn get(&self, key: &ActionKey) -> Option<PendingAction> {
        self.table.lock().get(key).cloned()
    }

    /// Oldest first.
    pub fn snapshot(&self) -> Vec<PendingAction> {
        let mut actions: Vec<PendingAction> = self.table.lock().values().cloned().collect();
        actions.sort_by(|a, b| a.started_at.cmp(&b.started_at).then(a.key.cmp(&b.key)));
        actions
    }

    pub fn len(&self) -> usize {
        self.table.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.lock().is_empty()
    }

    fn update(&self, key: &ActionKey, mutator: impl FnOnce(&mut PendingAction)) {
        if let Some(action) = self.table.lock().get_mut(key) {
            mutator(action);
        }
    }
}

/// Ownership of one pending entry. Dropping the slot releases the key, even if
/// the action's future is dropped mid-flight.
pub struct PendingSlot {
    actions: PendingActions,
    key: ActionKey,
}

impl PendingSlot {
    pub fn key(&self) -> ActionKey {
        self.key
    }

    pub fn advance(&self, state: ActionState) {
        self.actions.update(&self.key, |action| action.state = state);
    }

    pub fn submitted(&self, tx_hash: TxHash) {
        self.actions.update(&self.key, |action| {
            action.state = ActionState::Submitted;
            action.tx_hash = Some(tx_hash);
        });
    }

    /// Marks the terminal state and releases the key.
    pub fn finish(self, state: ActionState) -> Option<PendingAction> {
        self.advance(state);
        self.actions.get(&self.key)
    }
}

impl Drop for PendingSlot {
    fn drop(&mut self) {
        self.actions.table.lock().remove(&self.key);
    }
}
