//! Download client abstraction and the admission path.
//!
//! This module provides the `DownloadClient`, `DownloadTracker` and
//! `DownloadHistory` capabilities plus the prioritizer and admission
//! processor that turn approved decisions into submissions.

mod admission;
mod prioritizer;
mod types;

pub use admission::AdmissionProcessor;
pub use prioritizer::prioritize_decisions;
pub use types::*;
