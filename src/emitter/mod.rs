//! Finding Emitter
//!
//! Boundary between the scan engine and the issue tracker. Findings become
//! `IssueRequest`s titled `<source>-bug-<timestamp>` with the offending line
//! as body. Delivery is at-most-once: the pipeline advances the anchor
//! whether or not a submission succeeds.

pub mod dry_run;
pub mod error;
pub mod github;
pub mod traits;

pub use dry_run::LogEmitter;
pub use error::SubmitError;
pub use github::{GitHubEmitter, DEFAULT_API_URL};
pub use traits::{FindingEmitter, IssueRequest, TicketRef};
