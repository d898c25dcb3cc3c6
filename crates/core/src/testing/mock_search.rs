//! Mock catch-up search for testing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::sync::{EpisodeSearch, SearchError};

/// A recorded catch-up search for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCatchUpSearch {
    pub since: DateTime<Utc>,
    pub excluded_episode_ids: Vec<i32>,
}

/// Mock implementation of the EpisodeSearch trait.
#[derive(Debug, Default)]
pub struct MockEpisodeSearch {
    searches: Arc<RwLock<Vec<RecordedCatchUpSearch>>>,
    /// If set, the next search will fail with this error.
    next_error: Arc<RwLock<Option<SearchError>>>,
}

impl MockEpisodeSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn recorded_searches(&self) -> Vec<RecordedCatchUpSearch> {
        self.searches.read().await.clone()
    }

    pub async fn set_next_error(&self, error: SearchError) {
        *self.next_error.write().await = Some(error);
    }
}

#[async_trait]
impl EpisodeSearch for MockEpisodeSearch {
    async fn search_missing_aired_after(
        &self,
        since: DateTime<Utc>,
        excluded_episode_ids: &[i32],
    ) -> Result<(), SearchError> {
        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        self.searches.write().await.push(RecordedCatchUpSearch {
            since,
            excluded_episode_ids: excluded_episode_ids.to_vec(),
        });
        Ok(())
    }
}
