//! Series and episode identities owned by the external catalog.
//!
//! The core only reads from the catalog: series lookups when re-hydrating
//! pending releases and episode resolution for parsed release info.

mod types;

pub use types::*;
