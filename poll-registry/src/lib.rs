// Copyright (c) James Kassemi, SC, US. All rights reserved.

//! Poll Registry Cache: the only owner of poll and candidate state.
//!
//! Every refresh is a full reload (`getPollCount`, then `getPoll` for each index
//! with bounded concurrency). A refresh either installs a complete snapshot or
//! leaves the previous one in place.

pub mod error;
pub mod registry;
pub mod snapshot;

pub use error::LoadError;
pub use registry::PollRegistry;
pub use snapshot::{poll_from_record, PollSnapshot};
