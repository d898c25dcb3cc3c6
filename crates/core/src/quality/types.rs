//! Types for qualities and quality profiles.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A base quality level as detected from a release title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    Unknown,
    Sdtv,
    Dvd,
    Webdl480p,
    Hdtv720p,
    Hdtv1080p,
    RawHd,
    Webdl720p,
    Bluray720p,
    Webdl1080p,
    Bluray1080p,
}

impl Quality {
    /// Returns the display name used in logs and queue rows.
    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::Unknown => "Unknown",
            Quality::Sdtv => "SDTV",
            Quality::Dvd => "DVD",
            Quality::Webdl480p => "WEBDL-480p",
            Quality::Hdtv720p => "HDTV-720p",
            Quality::Hdtv1080p => "HDTV-1080p",
            Quality::RawHd => "Raw-HD",
            Quality::Webdl720p => "WEBDL-720p",
            Quality::Bluray720p => "Bluray-720p",
            Quality::Webdl1080p => "WEBDL-1080p",
            Quality::Bluray1080p => "Bluray-1080p",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A base quality plus the proper/repack flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualityModel {
    pub quality: Quality,
    /// Re-release of the same base quality fixing a defect.
    #[serde(default)]
    pub proper: bool,
}

impl QualityModel {
    pub fn new(quality: Quality) -> Self {
        Self {
            quality,
            proper: false,
        }
    }

    pub fn proper(quality: Quality) -> Self {
        Self {
            quality,
            proper: true,
        }
    }
}

impl From<Quality> for QualityModel {
    fn from(quality: Quality) -> Self {
        Self::new(quality)
    }
}

impl fmt::Display for QualityModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.proper {
            write!(f, "{} Proper", self.quality)
        } else {
            write!(f, "{}", self.quality)
        }
    }
}

/// How the grab delay interacts with the profile's qualities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrabDelayMode {
    /// Delay everything below the best allowed quality.
    #[default]
    Always,
    /// Skip the delay once the cutoff is met.
    Cutoff,
    /// Only delay releases of the lowest allowed quality.
    First,
}

/// One entry in a profile's ordered quality list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileQualityItem {
    pub quality: Quality,
    pub allowed: bool,
}

impl ProfileQualityItem {
    pub fn allowed(quality: Quality) -> Self {
        Self {
            quality,
            allowed: true,
        }
    }

    pub fn disallowed(quality: Quality) -> Self {
        Self {
            quality,
            allowed: false,
        }
    }
}

/// Errors raised when a profile breaks the ranking invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    #[error("profile '{0}' has no allowed qualities")]
    NoAllowedQualities(String),

    #[error("profile '{profile}' lists {quality} more than once")]
    DuplicateQuality { profile: String, quality: Quality },

    #[error("profile '{profile}' cutoff {cutoff} is not an allowed quality")]
    CutoffNotAllowed { profile: String, cutoff: Quality },
}

/// Per-series quality configuration.
///
/// `items` is ordered worst to best and defines the total order used by
/// every comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityProfile {
    pub id: i32,
    pub name: String,
    pub items: Vec<ProfileQualityItem>,
    pub cutoff: Quality,
    /// Hours to wait before grabbing a non-optimal release. 0 disables the delay.
    #[serde(default)]
    pub grab_delay_hours: u32,
    #[serde(default)]
    pub grab_delay_mode: GrabDelayMode,
}

impl QualityProfile {
    /// Check the invariants every comparison relies on.
    pub fn validate(&self) -> Result<(), ProfileError> {
        let mut seen = HashSet::new();
        for item in &self.items {
            if !seen.insert(item.quality) {
                return Err(ProfileError::DuplicateQuality {
                    profile: self.name.clone(),
                    quality: item.quality,
                });
            }
        }

        if !self.items.iter().any(|i| i.allowed) {
            return Err(ProfileError::NoAllowedQualities(self.name.clone()));
        }

        if !self.is_allowed(self.cutoff) {
            return Err(ProfileError::CutoffNotAllowed {
                profile: self.name.clone(),
                cutoff: self.cutoff,
            });
        }

        Ok(())
    }

    /// Position of a quality in the profile, `None` when absent.
    pub fn index_of(&self, quality: Quality) -> Option<usize> {
        self.items.iter().position(|i| i.quality == quality)
    }

    pub fn is_allowed(&self, quality: Quality) -> bool {
        self.items.iter().any(|i| i.quality == quality && i.allowed)
    }

    /// Highest allowed quality.
    pub fn best_allowed(&self) -> Option<QualityModel> {
        self.items
            .iter()
            .rev()
            .find(|i| i.allowed)
            .map(|i| QualityModel::new(i.quality))
    }

    /// Lowest allowed quality.
    pub fn worst_allowed(&self) -> Option<QualityModel> {
        self.items
            .iter()
            .find(|i| i.allowed)
            .map(|i| QualityModel::new(i.quality))
    }

    pub fn grab_delay(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.grab_delay_hours))
    }
}
