//! Mock release feed for testing.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::release::{FeedError, ReleaseCandidate, ReleaseFeed};

/// Mock implementation of the ReleaseFeed trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable candidates on every fetch
/// - Simulate a one-shot failure
/// - Simulate slow feeds
#[derive(Debug)]
pub struct MockReleaseFeed {
    name: String,
    results: Arc<RwLock<Vec<ReleaseCandidate>>>,
    /// If set, the next fetch will fail with this error.
    next_error: Arc<RwLock<Option<FeedError>>>,
    delay: Arc<RwLock<Option<Duration>>>,
    fetch_count: Arc<RwLock<usize>>,
}

impl Default for MockReleaseFeed {
    fn default() -> Self {
        Self::new("mock-feed")
    }
}

impl MockReleaseFeed {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            results: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            delay: Arc::new(RwLock::new(None)),
            fetch_count: Arc::new(RwLock::new(0)),
        }
    }

    /// Set the candidates returned by subsequent fetches.
    pub async fn set_results(&self, results: Vec<ReleaseCandidate>) {
        *self.results.write().await = results;
    }

    /// Make the next fetch fail.
    pub async fn set_next_error(&self, error: FeedError) {
        *self.next_error.write().await = Some(error);
    }

    /// Sleep this long inside every fetch.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    pub async fn fetch_count(&self) -> usize {
        *self.fetch_count.read().await
    }
}

#[async_trait]
impl ReleaseFeed for MockReleaseFeed {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<Vec<ReleaseCandidate>, FeedError> {
        *self.fetch_count.write().await += 1;

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        Ok(self.results.read().await.clone())
    }
}
