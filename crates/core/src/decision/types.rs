//! Types for download decisions.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::quality::ProfileError;
use crate::release::ReleaseCandidate;

/// How permanent a rejection is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionType {
    /// The release will never become acceptable (e.g. wrong series).
    Permanent,
    /// The release may become acceptable later (delay, active duplicate).
    Temporary,
}

impl RejectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionType::Permanent => "permanent",
            RejectionType::Temporary => "temporary",
        }
    }
}

/// A single reason a release was not approved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub reason: String,
    pub kind: RejectionType,
}

impl Rejection {
    pub fn new(reason: impl Into<String>, kind: RejectionType) -> Self {
        Self {
            reason: reason.into(),
            kind,
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind.as_str(), self.reason)
    }
}

/// Outcome of running the specification chain over one candidate.
///
/// Approved iff there are no rejections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadDecision {
    pub candidate: ReleaseCandidate,
    pub rejections: Vec<Rejection>,
}

impl DownloadDecision {
    pub fn new(candidate: ReleaseCandidate, rejections: Vec<Rejection>) -> Self {
        Self {
            candidate,
            rejections,
        }
    }

    pub fn approved(candidate: ReleaseCandidate) -> Self {
        Self::new(candidate, Vec::new())
    }

    pub fn is_approved(&self) -> bool {
        self.rejections.is_empty()
    }

    /// Rejected, but only for reasons that may clear up later.
    pub fn is_temporarily_rejected(&self) -> bool {
        !self.rejections.is_empty()
            && self
                .rejections
                .iter()
                .all(|r| r.kind == RejectionType::Temporary)
    }

    /// Rejected for at least one reason that never clears.
    pub fn is_permanently_rejected(&self) -> bool {
        self.rejections
            .iter()
            .any(|r| r.kind == RejectionType::Permanent)
    }

    pub fn has_episodes(&self) -> bool {
        !self.candidate.episodes.is_empty()
    }
}

/// Scope of a targeted (manual or automatic) search.
///
/// RSS sync evaluates without criteria.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub series_id: i32,
    #[serde(default)]
    pub episode_ids: Vec<i32>,
}

/// Errors that abort a decision pass.
#[derive(Debug, Error)]
pub enum DecisionError {
    #[error("series {series_id} has an invalid quality profile: {source}")]
    InvalidProfile {
        series_id: i32,
        #[source]
        source: ProfileError,
    },
}
