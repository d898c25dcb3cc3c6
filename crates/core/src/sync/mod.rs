//! Sync orchestrator.
//!
//! Threads one cycle through fetch, decision, admission and pending queue
//! reconciliation, and requests a catch-up search when the previous cycle
//! is stale. Triggering cycles on a schedule is the host's concern.

mod config;
mod runner;
mod types;

pub use config::SyncConfig;
pub use runner::SyncService;
pub use types::{EpisodeSearch, SearchError, SyncCommand, SyncError, SyncReport};
