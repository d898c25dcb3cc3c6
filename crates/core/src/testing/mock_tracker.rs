//! Mock download tracker for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::download::{DownloadError, DownloadTracker, TrackedDownload};

/// Mock implementation of the DownloadTracker trait returning a fixed queue.
#[derive(Debug, Default)]
pub struct MockDownloadTracker {
    queue: Arc<RwLock<Vec<TrackedDownload>>>,
    /// If set, the next query will fail with this error.
    next_error: Arc<RwLock<Option<DownloadError>>>,
    queries: Arc<RwLock<usize>>,
}

impl MockDownloadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_queue(&self, queue: Vec<TrackedDownload>) {
        *self.queue.write().await = queue;
    }

    pub async fn set_next_error(&self, error: DownloadError) {
        *self.next_error.write().await = Some(error);
    }

    /// Number of queue queries made so far.
    pub async fn query_count(&self) -> usize {
        *self.queries.read().await
    }
}

#[async_trait]
impl DownloadTracker for MockDownloadTracker {
    async fn currently_tracked(&self) -> Result<Vec<TrackedDownload>, DownloadError> {
        *self.queries.write().await += 1;

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        Ok(self.queue.read().await.clone())
    }
}
