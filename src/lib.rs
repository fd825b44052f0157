//! osprey: watches local log files and files an issue for every new error line
//!
//! Each configured source is scanned on a fixed interval from a persisted
//! line anchor, so a line is read and reported at most once even across
//! restarts.

pub mod anchor;
pub mod app;
pub mod core;
pub mod emitter;
pub mod registry;
pub mod scanner;
pub mod scheduler;
