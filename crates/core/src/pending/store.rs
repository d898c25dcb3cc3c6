//! Storage trait for pending releases.

use super::{NewPendingRelease, PendingRelease, PendingReleaseError};

/// Trait for pending release storage backends.
pub trait PendingReleaseStore: Send + Sync {
    /// Persist a new entry and return it with its assigned id.
    fn insert(&self, release: NewPendingRelease) -> Result<PendingRelease, PendingReleaseError>;

    fn get(&self, id: i64) -> Result<Option<PendingRelease>, PendingReleaseError>;

    /// All entries in insertion order.
    fn all(&self) -> Result<Vec<PendingRelease>, PendingReleaseError>;

    /// Delete one entry. Returns whether it existed.
    fn delete(&self, id: i64) -> Result<bool, PendingReleaseError>;

    /// Delete every entry of a series. Returns the number removed.
    fn delete_by_series(&self, series_id: i32) -> Result<usize, PendingReleaseError>;
}
