//! Per-source pipeline: load anchor, scan, emit findings, store anchor

use super::error::PipelineError;
use crate::anchor::AnchorStore;
use crate::core::error_handling::log_source_error;
use crate::core::shutdown::ShutdownListener;
use crate::emitter::{FindingEmitter, SubmitError};
use crate::registry::Source;
use crate::scanner::IncrementalScanner;
use async_trait::async_trait;
use std::sync::Arc;

/// What one pipeline run did for a source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceReport {
    pub old_anchor: u64,
    pub new_anchor: u64,
    pub findings: usize,
    pub submitted: usize,
    pub submit_failures: usize,
}

#[derive(Debug)]
pub struct SourceOutcome {
    pub source_name: String,
    pub result: Result<SourceReport, PipelineError>,
}

/// Unit of work executed by a pool worker for one source
#[async_trait]
pub trait SourceProcessor: Send + Sync + 'static {
    async fn process(&self, source: Arc<Source>, shutdown: &mut ShutdownListener) -> SourceOutcome;
}

pub struct Pipeline {
    anchors: Arc<dyn AnchorStore>,
    scanner: IncrementalScanner,
    emitter: Arc<dyn FindingEmitter>,
}

impl Pipeline {
    pub fn new(
        anchors: Arc<dyn AnchorStore>,
        scanner: IncrementalScanner,
        emitter: Arc<dyn FindingEmitter>,
    ) -> Self {
        Self {
            anchors,
            scanner,
            emitter,
        }
    }

    /// Run the pipeline for one source.
    ///
    /// Storage and scan failures leave the anchor untouched so the same lines
    /// are retried next cycle. A failed submission is logged and skipped; the
    /// anchor still advances past it. Shutdown during submission drops the
    /// remaining findings, stores the new anchor and returns `Cancelled`.
    pub async fn run(
        &self,
        source: &Source,
        shutdown: &mut ShutdownListener,
    ) -> Result<SourceReport, PipelineError> {
        let name = source.name();
        if shutdown.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        let old_anchor = self.anchors.load(name).await?;
        let scan = self.scanner.scan(source, old_anchor).await?;

        let mut report = SourceReport {
            old_anchor,
            new_anchor: scan.new_anchor,
            findings: scan.findings.len(),
            ..SourceReport::default()
        };

        if !scan.findings.is_empty() {
            log::info!("[{}] {} new errors detected", name, scan.findings.len());
        }

        let mut cancelled = false;
        for (index, finding) in scan.findings.iter().enumerate() {
            let submitted = tokio::select! {
                biased;
                _ = shutdown.cancelled() => Err(SubmitError::Cancelled),
                result = self.emitter.submit(source, finding) => result,
            };

            match submitted {
                Ok(ticket) => {
                    report.submitted += 1;
                    log::info!("[{}] filed issue #{} {}", name, ticket.number, ticket.url);
                }
                Err(SubmitError::Cancelled) => {
                    let dropped = scan.findings.len() - index;
                    report.submit_failures += dropped;
                    log::warn!("[{}] shutdown: {} findings not filed", name, dropped);
                    cancelled = true;
                    break;
                }
                Err(e) => {
                    report.submit_failures += 1;
                    log_source_error(name, &e, "issue submission");
                }
            }
        }

        // Findings dropped by shutdown are passed over like failed ones.
        if scan.advanced_from(old_anchor) {
            self.anchors.store(name, scan.new_anchor).await?;
            log::debug!("[{}] anchor {} -> {}", name, old_anchor, scan.new_anchor);
        }

        if cancelled {
            return Err(PipelineError::Cancelled);
        }
        Ok(report)
    }
}

#[async_trait]
impl SourceProcessor for Pipeline {
    async fn process(&self, source: Arc<Source>, shutdown: &mut ShutdownListener) -> SourceOutcome {
        let result = self.run(&source, shutdown).await;
        match &result {
            Err(PipelineError::Cancelled) => {
                log::debug!("[{}] skipped: shutdown in progress", source.name())
            }
            Err(e) => log_source_error(source.name(), e, "scan"),
            Ok(_) => {}
        }
        SourceOutcome {
            source_name: source.name().to_string(),
            result,
        }
    }
}
