//! Decision engine: judges release candidates with a fixed, ordered chain
//! of specifications.
//!
//! - [`NotInQueueSpecification`]: duplicate suppression against active downloads
//! - [`DelaySpecification`]: quality-aware grab delay for RSS discovery
//! - [`SeriesSpecification`]: search-scope filter
//!
//! Rejections carry a [`RejectionType`]; temporarily rejected decisions feed
//! the pending release queue.

mod delay;
mod maker;
mod not_in_queue;
mod series;
mod specification;
mod types;

pub use delay::DelaySpecification;
pub use maker::DecisionMaker;
pub use not_in_queue::NotInQueueSpecification;
pub use series::SeriesSpecification;
pub use specification::DecisionSpecification;
pub use types::*;
