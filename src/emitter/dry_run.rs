//! Emitter that only logs findings (`--dry-run`)

use super::error::SubmitError;
use super::traits::{FindingEmitter, IssueRequest, TicketRef};
use crate::registry::Source;
use crate::scanner::Finding;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct LogEmitter {
    next_number: AtomicU64,
}

impl LogEmitter {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FindingEmitter for LogEmitter {
    async fn submit(&self, source: &Source, finding: &Finding) -> Result<TicketRef, SubmitError> {
        let request = IssueRequest::from_finding(finding);
        let number = self.next_number.fetch_add(1, Ordering::Relaxed) + 1;

        log::warn!(
            "[{}] would file '{}' in {}: {}",
            source.name(),
            request.title,
            source.repo_slug(),
            request.body
        );

        Ok(TicketRef {
            number,
            url: format!("dry-run://{}/issues/{}", source.repo_slug(), number),
        })
    }
}
