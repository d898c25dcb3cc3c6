//! Outbound notifications for pending-queue mutations and sync cycles.
//!
//! Notifications are fire-and-forget: components hold an optional
//! [`EventHandle`] and emission never fails the caller.

mod handle;
mod types;

pub use handle::*;
pub use types::*;
