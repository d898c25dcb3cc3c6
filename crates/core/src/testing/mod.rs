//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of every external capability
//! the core consumes, so decision, pending queue and sync behavior can be
//! exercised without real feeds, catalogs or download clients.
//!
//! # Example
//!
//! ```rust,ignore
//! use grabline_core::testing::{fixtures, MockDownloadTracker};
//! use grabline_core::quality::Quality;
//!
//! let tracker = MockDownloadTracker::new();
//! tracker.set_queue(vec![fixtures::tracked(1, &[10], Quality::Hdtv720p.into())]).await;
//! ```

mod mock_catalog;
mod mock_download_client;
mod mock_feed;
mod mock_history;
mod mock_search;
mod mock_tracker;

pub use mock_catalog::MockEpisodeCatalog;
pub use mock_download_client::MockDownloadClient;
pub use mock_feed::MockReleaseFeed;
pub use mock_history::MockDownloadHistory;
pub use mock_search::{MockEpisodeSearch, RecordedCatchUpSearch};
pub use mock_tracker::MockDownloadTracker;

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::Utc;

    use crate::catalog::{Episode, Series};
    use crate::download::{TrackedDownload, TrackedDownloadState};
    use crate::quality::{GrabDelayMode, ProfileQualityItem, Quality, QualityModel, QualityProfile};
    use crate::release::{ParsedEpisodeInfo, ReleaseCandidate, ReleaseInfo};

    /// A 720p profile: HDTV < WEB-DL < Bluray, cutoff WEB-DL, no delay.
    pub fn hd_profile() -> QualityProfile {
        QualityProfile {
            id: 1,
            name: "HD-720p".to_string(),
            items: vec![
                ProfileQualityItem::allowed(Quality::Hdtv720p),
                ProfileQualityItem::allowed(Quality::Webdl720p),
                ProfileQualityItem::allowed(Quality::Bluray720p),
            ],
            cutoff: Quality::Webdl720p,
            grab_delay_hours: 0,
            grab_delay_mode: GrabDelayMode::Always,
        }
    }

    /// Every quality allowed, in the stock ranking order, no delay.
    pub fn default_profile() -> QualityProfile {
        QualityProfile {
            id: 2,
            name: "Any".to_string(),
            items: [
                Quality::Sdtv,
                Quality::Webdl480p,
                Quality::Dvd,
                Quality::Hdtv720p,
                Quality::Hdtv1080p,
                Quality::RawHd,
                Quality::Webdl720p,
                Quality::Bluray720p,
                Quality::Webdl1080p,
                Quality::Bluray1080p,
            ]
            .into_iter()
            .map(ProfileQualityItem::allowed)
            .collect(),
            cutoff: Quality::Sdtv,
            grab_delay_hours: 0,
            grab_delay_mode: GrabDelayMode::Always,
        }
    }

    pub fn series(id: i32, profile: QualityProfile) -> Series {
        Series {
            id,
            title: format!("Series {}", id),
            profile,
        }
    }

    pub fn episode(series: &Series, id: i32, season_number: u32, episode_number: u32) -> Episode {
        Episode {
            id,
            series_id: series.id,
            season_number,
            episode_number,
            title: Some(format!("Episode {}", episode_number)),
            air_date: None,
        }
    }

    /// A release published just now.
    pub fn release_info(title: &str) -> ReleaseInfo {
        let guid = uuid::Uuid::new_v4().to_string();
        ReleaseInfo {
            download_url: format!("https://indexer.example/download/{}", guid),
            guid,
            title: title.to_string(),
            size_bytes: 1024 * 1024 * 1024, // 1 GB
            info_url: None,
            indexer: "mock-indexer".to_string(),
            publish_date: Utc::now(),
        }
    }

    pub fn parsed_info(
        series_title: &str,
        season_number: u32,
        episode_numbers: &[u32],
        quality: QualityModel,
    ) -> ParsedEpisodeInfo {
        ParsedEpisodeInfo {
            series_title: series_title.to_string(),
            season_number,
            episode_numbers: episode_numbers.to_vec(),
            full_season: false,
            quality,
        }
    }

    /// A resolved candidate for the given episodes.
    ///
    /// The title is derived from series, episodes and quality, e.g.
    /// `Series.1.S01E01E02.HDTV-720p`.
    pub fn candidate(
        series: &Series,
        episodes: Vec<Episode>,
        quality: QualityModel,
    ) -> ReleaseCandidate {
        let season_number = episodes.first().map(|e| e.season_number).unwrap_or(1);
        let episode_numbers: Vec<u32> = episodes.iter().map(|e| e.episode_number).collect();
        let numbers: String = episode_numbers
            .iter()
            .map(|n| format!("E{:02}", n))
            .collect();
        let title = format!(
            "{}.S{:02}{}.{}",
            series.title.replace(' ', "."),
            season_number,
            numbers,
            quality.to_string().replace(' ', ".")
        );

        ReleaseCandidate {
            release: release_info(&title),
            parsed: parsed_info(&series.title, season_number, &episode_numbers, quality),
            series: series.clone(),
            episodes,
        }
    }

    /// An active download covering the given episodes.
    pub fn tracked(series_id: i32, episode_ids: &[i32], quality: QualityModel) -> TrackedDownload {
        TrackedDownload {
            download_id: uuid::Uuid::new_v4().to_string(),
            client: "mock-client".to_string(),
            title: format!("Tracked.{}.{}", series_id, quality),
            state: TrackedDownloadState::Downloading,
            series_id,
            episode_ids: episode_ids.to_vec(),
            quality,
        }
    }
}
