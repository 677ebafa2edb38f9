// Copyright (c) James Kassemi, SC, US. All rights reserved.
use chrono::{DateTime, Utc};
use core_types::Address;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Remembers whether the wallet was connected so the next start can reconnect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub wallet_connected: bool,
    pub last_account: Option<Address>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("session serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub struct SessionStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing file reads as a fresh, disconnected session.
    pub fn load(&self) -> Result<SessionState, SessionError> {
        let _guard = self.lock.lock();
        if !self.path.exists() {
            return Ok(SessionState::default());
        }
        let data = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn record_connected(&self, account: Address) -> Result<SessionState, SessionError> {
        self.write(SessionState {
            wallet_connected: true,
            last_account: Some(account),
            updated_at: Some(Utc::now()),
        })
    }

    pub fn record_disconnected(&self) -> Result<SessionState, SessionError> {
        self.write(SessionState {
            wallet_connected: false,
            last_account: None,
            updated_at: Some(Utc::now()),
        })
    }

    fn write(&self, state: SessionState) -> Result<SessionState, SessionError> {
        let _guard = self.lock.lock();
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = fs::File::create(&self.path)?;
        serde_json::to_writer_pretty(file, &state)?;
        Ok(state)
    }
}
