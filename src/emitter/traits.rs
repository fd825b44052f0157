//! Finding emitter trait and issue payload

use super::error::SubmitError;
use crate::registry::Source;
use crate::scanner::Finding;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Timestamp layout used in issue titles
pub const TITLE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Issue payload derived from a finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueRequest {
    pub title: String,
    pub body: String,
}

impl IssueRequest {
    /// `<source>-bug-<YYYY-MM-DD HH:MM:SS>`, with the raw line as body
    pub fn from_finding(finding: &Finding) -> Self {
        Self {
            title: format!(
                "{}-bug-{}",
                finding.source_name,
                finding.detected_at.format(TITLE_TIME_FORMAT)
            ),
            body: finding.line.clone(),
        }
    }
}

/// Reference to a created issue
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TicketRef {
    pub number: u64,
    #[serde(rename = "html_url")]
    pub url: String,
}

/// Hands findings to an issue tracker
///
/// Each call is independent; a failure affects only that finding.
#[async_trait]
pub trait FindingEmitter: Send + Sync {
    async fn submit(&self, source: &Source, finding: &Finding) -> Result<TicketRef, SubmitError>;
}
