// Copyright (c) James Kassemi, SC, US. All rights reserved.

//! Action Orchestrator for the poll contract.
//!
//! Each mutating action (`create_poll`, `vote`, `end_poll`) claims a pending slot keyed by
//! (kind, poll, candidate), then runs simulate → submit → confirm and finally a full
//! registry reload. Failures land on a single error surface; vote counts only change
//! through that reload.

pub mod error;
pub mod orchestrator;
pub mod pending;
pub mod session;
pub mod surface;
pub mod view;

pub use error::{EngineError, EngineResult, ValidationError};
pub use orchestrator::{ActionOrchestrator, ActionReport};
pub use pending::{PendingActions, PendingSlot};
pub use session::{SessionError, SessionState, SessionStore};
pub use surface::ErrorSurface;
pub use view::EngineView;
