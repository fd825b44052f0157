//! Anchor Store
//!
//! Durable mapping from source name to the number of log lines already
//! processed for that source. The file-backed store keeps one
//! `<name>.igu` record per source and replaces it atomically, so a crash
//! never leaves a half-written value behind.

pub mod error;
pub mod record;
pub mod store;

pub use error::StorageError;
pub use store::{AnchorStore, FileAnchorStore, MemoryAnchorStore};
