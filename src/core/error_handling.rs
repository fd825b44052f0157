//! Error reporting shared by every module
//!
//! Errors that a person running the daemon can fix (bad configuration,
//! missing token) are reported with their own message. Everything else is
//! reported under a short operation context, with the full error available
//! at debug level.

/// Errors that can tell whether their message is meant for the operator
///
/// When `is_user_actionable()` returns `true`, `user_message()` must return
/// `Some(message)`; otherwise it returns `None`.
pub trait ContextualError: std::error::Error {
    /// The operator can fix this (configuration, credentials)
    fn is_user_actionable(&self) -> bool;

    /// Message to show the operator for actionable errors
    fn user_message(&self) -> Option<String>;
}

/// Log a fatal error before the process exits
///
/// # Examples
/// ```rust,no_run
/// # use osprey::core::error_handling::log_error_with_context;
/// # use osprey::app::config::ConfigError;
/// let err = ConfigError::MissingCredential { variable: "GITHUB_AUTH_TOKEN".to_string() };
/// log_error_with_context(&err, "Loading configuration");
/// // Logs: "FATAL: GITHUB_AUTH_TOKEN is not set ..."
/// ```
pub fn log_error_with_context<E: ContextualError + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    match error.user_message() {
        Some(user_msg) if error.is_user_actionable() => log::error!("FATAL: {}", user_msg),
        _ => log::error!("FATAL: {}: {}", operation_context, error),
    }
    log::debug!("DEBUG_DETAILS: {:?}", error);
}

/// Log a steady-state failure for one monitored source
///
/// These never stop the process; the message always carries the source name.
pub fn log_source_error<E: ContextualError>(source_name: &str, error: &E, operation_context: &str) {
    log::warn!("[{}] {} failed: {}", source_name, operation_context, error);
    if let Some(hint) = error.user_message() {
        log::info!("[{}] hint: {}", source_name, hint);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("permission denied on {path}")]
    struct TestUserError {
        path: String,
    }

    impl ContextualError for TestUserError {
        fn is_user_actionable(&self) -> bool {
            true
        }

        fn user_message(&self) -> Option<String> {
            Some(format!("grant read access to {}", self.path))
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("connection reset")]
    struct TestSystemError;

    impl ContextualError for TestSystemError {
        fn is_user_actionable(&self) -> bool {
            false
        }

        fn user_message(&self) -> Option<String> {
            None
        }
    }

    #[test]
    fn test_user_actionable_error_has_message() {
        let error = TestUserError {
            path: "/var/log/apple.log".to_string(),
        };

        assert!(error.is_user_actionable());
        assert_eq!(
            error.user_message().as_deref(),
            Some("grant read access to /var/log/apple.log")
        );
        log_error_with_context(&error, "Scanning source");
        log_source_error("apple", &error, "scan");
    }

    #[test]
    fn test_system_error_has_no_message() {
        let error = TestSystemError;

        assert!(!error.is_user_actionable());
        assert_eq!(error.user_message(), None);
        log_error_with_context(&error, "Submitting finding");
    }
}
