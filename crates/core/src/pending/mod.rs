//! Pending release queue.
//!
//! Releases rejected only for temporary reasons are persisted here and
//! judged again on every sync cycle until they are grabbed, superseded by
//! a better release, or their series is deleted.

mod service;
mod sqlite_store;
mod store;
mod types;

pub use service::PendingReleaseService;
pub use sqlite_store::SqlitePendingReleaseStore;
pub use store::PendingReleaseStore;
pub use types::*;
