//! Release acquisition core: judges candidate releases, suppresses
//! duplicates of in-flight downloads, delays non-optimal grabs and keeps a
//! self-reevaluating queue of deferred releases.

pub mod catalog;
pub mod config;
pub mod decision;
pub mod download;
pub mod events;
pub mod metrics;
pub mod pending;
pub mod quality;
pub mod release;
pub mod sync;
pub mod testing;

pub use catalog::{CatalogError, Episode, EpisodeCatalog, Series};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DatabaseConfig,
    EventsConfig,
};
pub use decision::{
    DecisionError, DecisionMaker, DecisionSpecification, DelaySpecification, DownloadDecision,
    NotInQueueSpecification, Rejection, RejectionType, SearchCriteria, SeriesSpecification,
};
pub use download::{
    prioritize_decisions, AdmissionProcessor, DownloadClient, DownloadError, DownloadHistory,
    DownloadTracker, HistoryError, TrackedDownload, TrackedDownloadState,
};
pub use events::{create_event_channel, EventEnvelope, EventHandle, SyncEvent};
pub use pending::{
    AddOutcome, NewPendingRelease, PendingRelease, PendingReleaseError, PendingReleaseService,
    PendingReleaseStore, QueueItem, QueueStatus, SqlitePendingReleaseStore,
};
pub use quality::{
    GrabDelayMode, ProfileError, ProfileQualityItem, Quality, QualityComparer, QualityModel,
    QualityProfile,
};
pub use release::{FeedError, ParsedEpisodeInfo, ReleaseCandidate, ReleaseFeed, ReleaseInfo};
pub use sync::{
    EpisodeSearch, SearchError, SyncCommand, SyncConfig, SyncError, SyncReport, SyncService,
};
