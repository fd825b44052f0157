//! Anchor Store Error Types

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("cannot read anchor record {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write anchor record {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("anchor record {} is corrupt: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },
}

impl crate::core::error_handling::ContextualError for StorageError {
    fn is_user_actionable(&self) -> bool {
        matches!(self, StorageError::Corrupt { .. })
            || self.io_kind() == Some(std::io::ErrorKind::PermissionDenied)
    }

    fn user_message(&self) -> Option<String> {
        match self {
            StorageError::Corrupt { path, .. } => Some(format!(
                "fix or delete {} (deleting it rescans the source from the start)",
                path.display()
            )),
            StorageError::Read { path, .. } | StorageError::Write { path, .. }
                if self.io_kind() == Some(std::io::ErrorKind::PermissionDenied) =>
            {
                Some(format!("grant read/write access to {}", path.display()))
            }
            _ => None,
        }
    }
}

impl StorageError {
    fn io_kind(&self) -> Option<std::io::ErrorKind> {
        match self {
            StorageError::Read { source, .. } | StorageError::Write { source, .. } => {
                Some(source.kind())
            }
            StorageError::Corrupt { .. } => None,
        }
    }
}
