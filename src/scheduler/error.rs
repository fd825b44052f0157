//! Per-source pipeline errors

use crate::anchor::StorageError;
use crate::core::error_handling::ContextualError;
use crate::scanner::ScanError;

/// Anything that stops one source's pipeline before its anchor is stored
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("shutdown requested before the source finished")]
    Cancelled,
}

impl ContextualError for PipelineError {
    fn is_user_actionable(&self) -> bool {
        match self {
            PipelineError::Storage(e) => e.is_user_actionable(),
            PipelineError::Scan(e) => e.is_user_actionable(),
            PipelineError::Cancelled => false,
        }
    }

    fn user_message(&self) -> Option<String> {
        match self {
            PipelineError::Storage(e) => e.user_message(),
            PipelineError::Scan(e) => e.user_message(),
            PipelineError::Cancelled => None,
        }
    }
}
