//! Scanner data types

use chrono::{DateTime, Local};

/// One log line classified as an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub source_name: String,
    pub line: String,
    pub detected_at: DateTime<Local>,
}

/// Outcome of one scan pass over a source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    /// Lines processed after this scan; never below the anchor scanned from
    pub new_anchor: u64,
    /// Findings in file order
    pub findings: Vec<Finding>,
}

impl ScanResult {
    /// Nothing new since `anchor`
    pub fn unchanged(anchor: u64) -> Self {
        Self {
            new_anchor: anchor,
            findings: Vec::new(),
        }
    }

    /// Whether the anchor moved past `old_anchor`
    pub fn advanced_from(&self, old_anchor: u64) -> bool {
        self.new_anchor > old_anchor
    }
}
