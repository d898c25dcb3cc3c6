//! Quality levels, quality profiles and profile-aware ranking.
//!
//! Every decision rule compares qualities through a [`QualityComparer`]
//! built from the series' [`QualityProfile`]; the profile's item order is
//! the single source of truth for "better" and "worse".

mod comparer;
mod types;

pub use comparer::QualityComparer;
pub use types::*;
