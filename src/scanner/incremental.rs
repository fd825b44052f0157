//! Incremental Scanner
//!
//! Turns the current content of a log file plus the stored anchor into the
//! delta of newly completed lines. Only newline-terminated lines count: a
//! trailing fragment may still be mid-write and is picked up by a later scan
//! once its newline lands.

use super::error::ScanError;
use super::types::{Finding, ScanResult};
use crate::core::time::{SystemTimeProvider, TimeProvider};
use crate::registry::{ReadMode, Source};
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncReadExt;

/// Marker used when none is configured
pub const DEFAULT_ERROR_KEYWORD: &str = "error";

#[derive(Clone)]
pub struct IncrementalScanner {
    marker: String,
    time_provider: Arc<dyn TimeProvider>,
}

impl IncrementalScanner {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            time_provider: Arc::new(SystemTimeProvider),
        }
    }

    pub fn with_time_provider(mut self, time_provider: Arc<dyn TimeProvider>) -> Self {
        self.time_provider = time_provider;
        self
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Scan `source` from `anchor` forward
    pub async fn scan(&self, source: &Source, anchor: u64) -> Result<ScanResult, ScanError> {
        let content = match source.mode() {
            ReadMode::Local => read_local(source.location()).await?,
        };
        Ok(self.scan_content(source.name(), &content, anchor))
    }

    /// Classify the complete lines of `content` past `anchor`
    pub fn scan_content(&self, source_name: &str, content: &[u8], anchor: u64) -> ScanResult {
        let Some(last_newline) = content.iter().rposition(|&b| b == b'\n') else {
            return ScanResult::unchanged(anchor);
        };
        let complete = &content[..last_newline];
        let total_lines = complete.iter().filter(|&&b| b == b'\n').count() as u64 + 1;

        if total_lines < anchor {
            log::warn!(
                "[{}] log has {} complete lines but anchor is {}; treating as nothing new",
                source_name,
                total_lines,
                anchor
            );
            return ScanResult::unchanged(anchor);
        }

        let detected_at = self.time_provider.now();
        let mut forward: u64 = 0;
        let mut findings = Vec::new();

        for raw in complete.split(|&b| b == b'\n').skip(anchor as usize) {
            forward += 1;
            let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
            let text = String::from_utf8_lossy(raw);
            if text.contains(self.marker.as_str()) {
                findings.push(Finding {
                    source_name: source_name.to_string(),
                    line: text.into_owned(),
                    detected_at,
                });
            }
        }

        ScanResult {
            new_anchor: anchor + forward,
            findings,
        }
    }
}

impl Default for IncrementalScanner {
    fn default() -> Self {
        Self::new(DEFAULT_ERROR_KEYWORD)
    }
}

async fn read_local(path: &Path) -> Result<Vec<u8>, ScanError> {
    let mut file =
        tokio::fs::File::open(path)
            .await
            .map_err(|source| ScanError::SourceUnavailable {
                path: path.to_path_buf(),
                source,
            })?;

    let mut content = Vec::new();
    file.read_to_end(&mut content)
        .await
        .map_err(|source| ScanError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(content)
}
