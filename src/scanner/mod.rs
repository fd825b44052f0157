//! Incremental Scanner Component
//!
//! Reads a source's log file, skips the lines already covered by its
//! anchor, and reports every newly completed line containing the error
//! marker.
//!
//! ## Rules
//!
//! - Lines are `\n`-terminated; an unterminated tail is left for a later scan
//! - Matching is a case-sensitive substring test
//! - `new_anchor = anchor + lines consumed`, so it never moves backwards
//! - A file with fewer complete lines than the anchor yields nothing new

pub mod error;
pub mod incremental;
pub mod types;


pub use error::ScanError;
pub use incremental::{IncrementalScanner, DEFAULT_ERROR_KEYWORD};
pub use types::{Finding, ScanResult};
