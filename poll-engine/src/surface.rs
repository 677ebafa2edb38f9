// Copyright (c) James Kassemi, SC, US. All rights reserved.
use core_types::ActionKind;
use parking_lot::RwLock;
use std::sync::Arc;

use crate::error::{EngineError, ValidationError};

pub const LOAD_FAILURE_PREFIX: &str = "Failed to load polls";

/// The single user-visible error message. Each new failure replaces the last one.
#[derive(Clone, Default)]
pub struct ErrorSurface {
    message: Arc<RwLock<Option<String>>>,
}

impl ErrorSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, message: impl Into<String>) {
        *self.message.write() = Some(message.into());
    }

    pub fn clear(&self) {
        *self.message.write() = None;
    }

    pub fn current(&self) -> Option<String> {
        self.message.read().clone()
    }
}

/// Message shown for a failed mutating action.
pub fn action_message(kind: ActionKind, err: &EngineError) -> String {
    match err {
        EngineError::Validation(ValidationError::NotConnected) => err.to_string(),
        EngineError::Load(_) => load_message(err),
        _ => format!("{}: {err}", kind.failure_prefix()),
    }
}

pub fn load_message(err: &impl std::fmt::Display) -> String {
    format!("{LOAD_FAILURE_PREFIX}: {err}")
}
