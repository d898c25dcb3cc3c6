//! Mock download client for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::download::{DownloadClient, DownloadError};
use crate::release::ReleaseCandidate;

/// Mock implementation of the DownloadClient trait.
///
/// Records every successful submission and assigns sequential job ids.
/// Submissions of a title registered with [`fail_title`](Self::fail_title)
/// fail with the given error.
#[derive(Debug, Default)]
pub struct MockDownloadClient {
    submitted: Arc<RwLock<Vec<ReleaseCandidate>>>,
    failures: Arc<RwLock<HashMap<String, DownloadError>>>,
    counter: Arc<RwLock<u32>>,
}

impl MockDownloadClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Candidates submitted so far, in submission order.
    pub async fn submitted(&self) -> Vec<ReleaseCandidate> {
        self.submitted.read().await.clone()
    }

    pub async fn submitted_titles(&self) -> Vec<String> {
        self.submitted
            .read()
            .await
            .iter()
            .map(|c| c.release.title.clone())
            .collect()
    }

    /// Fail every submission of this release title.
    pub async fn fail_title(&self, title: &str, error: DownloadError) {
        self.failures.write().await.insert(title.to_string(), error);
    }
}

#[async_trait]
impl DownloadClient for MockDownloadClient {
    fn name(&self) -> &str {
        "mock-client"
    }

    async fn submit(&self, candidate: &ReleaseCandidate) -> Result<String, DownloadError> {
        if let Some(error) = self.failures.read().await.get(&candidate.release.title) {
            return Err(error.clone());
        }

        let mut counter = self.counter.write().await;
        *counter += 1;
        self.submitted.write().await.push(candidate.clone());

        Ok(format!("mock-job-{}", *counter))
    }
}
