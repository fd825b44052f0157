//! Scanner Error Types

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The log file is missing or cannot be opened
    #[error("log file {} is unavailable: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Opened, but reading the content failed part way
    #[error("failed reading log file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl crate::core::error_handling::ContextualError for ScanError {
    fn is_user_actionable(&self) -> bool {
        matches!(self, ScanError::SourceUnavailable { .. })
    }

    fn user_message(&self) -> Option<String> {
        match self {
            ScanError::SourceUnavailable { path, source } => Some(format!(
                "check that {} exists and is readable ({})",
                path.display(),
                source.kind()
            )),
            ScanError::Read { .. } => None,
        }
    }
}
