//! Common harness for sync and pending queue integration tests.
//!
//! Wires a real `SyncService` over an on-disk SQLite pending store and
//! mock collaborators for everything external.

#![allow(dead_code)]

use std::sync::{Arc, Once};

use tempfile::TempDir;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use grabline_core::{
    create_event_channel,
    testing::{
        MockDownloadClient, MockDownloadHistory, MockDownloadTracker, MockEpisodeCatalog,
        MockEpisodeSearch, MockReleaseFeed,
    },
    AdmissionProcessor, DecisionMaker, DownloadClient, DownloadHistory, DownloadTracker,
    EpisodeCatalog, EpisodeSearch, EventEnvelope, PendingReleaseService, ReleaseFeed,
    SqlitePendingReleaseStore, SyncConfig, SyncEvent, SyncService,
};

/// Re-export fixtures for test convenience
pub use grabline_core::testing::fixtures;

static TRACING: Once = Once::new();

/// Route library logs to the test writer. Honors `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

pub struct Harness {
    pub feed: Arc<MockReleaseFeed>,
    pub catalog: Arc<MockEpisodeCatalog>,
    pub tracker: Arc<MockDownloadTracker>,
    pub history: Arc<MockDownloadHistory>,
    pub client: Arc<MockDownloadClient>,
    pub search: Arc<MockEpisodeSearch>,
    pub pending: Arc<PendingReleaseService>,
    pub sync: SyncService,
    pub events: mpsc::Receiver<EventEnvelope>,
    _temp_dir: TempDir,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_config(SyncConfig::default()).await
    }

    pub async fn with_config(config: SyncConfig) -> Self {
        init_tracing();

        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = Arc::new(
            SqlitePendingReleaseStore::new(&temp_dir.path().join("pending.db"))
                .expect("Failed to create pending store"),
        );

        let feed = Arc::new(MockReleaseFeed::new("mock-rss"));
        let catalog = Arc::new(MockEpisodeCatalog::new());
        let tracker = Arc::new(MockDownloadTracker::new());
        let history = Arc::new(MockDownloadHistory::new());
        let client = Arc::new(MockDownloadClient::new());
        let search = Arc::new(MockEpisodeSearch::new());
        let (handle, events) = create_event_channel(256);

        let pending = Arc::new(
            PendingReleaseService::new(
                store,
                Arc::clone(&catalog) as Arc<dyn EpisodeCatalog>,
                Arc::clone(&client) as Arc<dyn DownloadClient>,
            )
            .with_events(handle.clone()),
        );

        let sync = SyncService::new(
            config,
            vec![Arc::clone(&feed) as Arc<dyn ReleaseFeed>],
            DecisionMaker::standard(
                Arc::clone(&tracker) as Arc<dyn DownloadTracker>,
                Arc::clone(&history) as Arc<dyn DownloadHistory>,
            ),
            AdmissionProcessor::new(Arc::clone(&client) as Arc<dyn DownloadClient>)
                .with_events(handle.clone()),
            Arc::clone(&pending),
            Arc::clone(&search) as Arc<dyn EpisodeSearch>,
        )
        .with_events(handle);

        Self {
            feed,
            catalog,
            tracker,
            history,
            client,
            search,
            pending,
            sync,
            events,
            _temp_dir: temp_dir,
        }
    }

    /// Drain every event emitted so far.
    pub fn drain_events(&mut self) -> Vec<SyncEvent> {
        let mut events = Vec::new();
        while let Ok(envelope) = self.events.try_recv() {
            events.push(envelope.event);
        }
        events
    }
}
