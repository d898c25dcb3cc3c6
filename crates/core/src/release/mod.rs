//! Releases discovered from feeds and the candidate model judged by the
//! decision engine.

mod types;

pub use types::*;
