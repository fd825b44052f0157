//! Scheduler / Worker Pool Component
//!
//! Fires a scan cycle on a fixed interval and fans the registered sources
//! out over a bounded pool of long-lived workers. Each worker runs the full
//! per-source pipeline (anchor load → scan → emit → anchor store) before it
//! takes the next source.
//!
//! ## Guarantees
//!
//! - At most `min(sources, max_workers)` sources are processed at once
//! - One source failing never stops the others or the cycle
//! - A failed source keeps its anchor and is retried next cycle
//! - Cycles never overlap; the next dispatch waits for the current drain

pub mod error;
pub mod manager;
pub mod pipeline;
pub mod pool;
pub mod summary;


pub use error::PipelineError;
pub use manager::{Scheduler, SchedulerConfig, SchedulerState};
pub use pipeline::{Pipeline, SourceOutcome, SourceProcessor, SourceReport};
pub use pool::WorkerPool;
pub use summary::CycleSummary;
