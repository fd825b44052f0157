//! Per-cycle summary

use super::error::PipelineError;
use super::pipeline::SourceOutcome;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub cycle: u64,
    pub sources: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub cancelled: usize,
    pub findings: usize,
    pub submitted: usize,
    pub submit_failures: usize,
    pub elapsed: Duration,
}

impl CycleSummary {
    pub fn from_outcomes(cycle: u64, outcomes: &[SourceOutcome], elapsed: Duration) -> Self {
        let mut summary = CycleSummary {
            cycle,
            sources: outcomes.len(),
            elapsed,
            ..Self::default()
        };

        for outcome in outcomes {
            match &outcome.result {
                Ok(report) => {
                    summary.succeeded += 1;
                    summary.findings += report.findings;
                    summary.submitted += report.submitted;
                    summary.submit_failures += report.submit_failures;
                }
                Err(PipelineError::Cancelled) => summary.cancelled += 1,
                Err(_) => summary.failed += 1,
            }
        }

        summary
    }

    pub fn log(&self) {
        let line = format!(
            "cycle {}: {} sources ({} ok, {} failed), {} findings ({} filed, {} submission failures) in {} ms",
            self.cycle,
            self.sources,
            self.succeeded,
            self.failed,
            self.findings,
            self.submitted,
            self.submit_failures,
            self.elapsed.as_millis()
        );
        if self.failed > 0 || self.submit_failures > 0 {
            log::warn!("{}", line);
        } else {
            log::info!("{}", line);
        }
        if self.cancelled > 0 {
            log::info!("cycle {}: {} sources skipped by shutdown", self.cycle, self.cancelled);
        }
    }
}
