//! Submission Error Types

use crate::core::retry::Transient;

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// Request never produced a response (connect, timeout, TLS, decode)
    #[error("issue tracker request failed: {source}")]
    Http {
        #[source]
        source: reqwest::Error,
    },

    /// Tracker answered with a non-success status
    #[error("issue tracker returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// Shutdown was requested while the submission was in flight
    #[error("submission cancelled by shutdown")]
    Cancelled,
}

impl Transient for SubmitError {
    fn is_transient(&self) -> bool {
        match self {
            // Only failures where the tracker cannot have created the issue.
            SubmitError::Http { source } => source.is_connect() && !source.is_timeout(),
            SubmitError::Status { status, message } => {
                *status == 429
                    || (*status == 403 && message.to_ascii_lowercase().contains("rate limit"))
            }
            SubmitError::Cancelled => false,
        }
    }
}

impl crate::core::error_handling::ContextualError for SubmitError {
    fn is_user_actionable(&self) -> bool {
        matches!(self, SubmitError::Status { status, .. } if *status == 401 || *status == 404)
    }

    fn user_message(&self) -> Option<String> {
        match self {
            SubmitError::Status { status: 401, .. } => {
                Some("the GitHub token was rejected; check GITHUB_AUTH_TOKEN".to_string())
            }
            SubmitError::Status { status: 404, .. } => Some(
                "repository not found; check repo_owner/repo_name and the token's access"
                    .to_string(),
            ),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error_handling::ContextualError;

    fn status(status: u16, message: &str) -> SubmitError {
        SubmitError::Status {
            status,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_transient_statuses() {
        assert!(status(429, "slow down").is_transient());
        assert!(!status(502, "bad gateway").is_transient());
        assert!(!status(503, "Service Unavailable").is_transient());
        assert!(status(403, "API rate limit exceeded for user").is_transient());
        assert!(!status(403, "Resource not accessible by integration").is_transient());
        assert!(!status(422, "Validation Failed").is_transient());
        assert!(!SubmitError::Cancelled.is_transient());
    }

    #[test]
    fn test_actionable_statuses() {
        assert!(status(401, "Bad credentials").is_user_actionable());
        assert!(status(404, "Not Found").user_message().is_some());
        assert!(!status(500, "oops").is_user_actionable());
        assert_eq!(status(500, "oops").user_message(), None);
    }
}
