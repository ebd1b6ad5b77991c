//! Failures from model endpoints

use std::time::Duration;
use thiserror::Error;

/// Failure class of a model call. Decides whether the call is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    Network,
    RateLimit,
    ServerError,
    Auth,
    InvalidRequest,
    Unknown,
}

impl LlmErrorKind {
    /// Class of a non-success HTTP status
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::Auth,
            429 => Self::RateLimit,
            400 | 404 | 422 => Self::InvalidRequest,
            500..=599 => Self::ServerError,
            _ => Self::Unknown,
        }
    }

    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Network | Self::RateLimit | Self::ServerError)
    }

    fn summary(self) -> &'static str {
        match self {
            Self::Network => "Network error",
            Self::RateLimit => "Rate limit exceeded",
            Self::ServerError => "Server error",
            Self::Auth => "Authentication failed",
            Self::InvalidRequest => "Invalid request",
            Self::Unknown => "Unexpected response",
        }
    }
}

#[derive(Debug, Error)]
#[error("{message}")]
pub struct LlmError {
    pub kind: LlmErrorKind,
    pub message: String,
    /// Server-requested wait before the next attempt
    pub retry_after: Option<Duration>,
}

impl LlmError {
    pub fn new(kind: LlmErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            retry_after: None,
        }
    }

    /// Error for an HTTP failure, keeping any `Retry-After` delay
    pub fn from_status(status: u16, detail: &str, retry_after: Option<Duration>) -> Self {
        let kind = LlmErrorKind::from_status(status);
        Self {
            kind,
            message: format!("{} (HTTP {status}): {detail}", kind.summary()),
            retry_after,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Network, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Auth, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Unknown, message)
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(LlmErrorKind::from_status(401), LlmErrorKind::Auth);
        assert_eq!(LlmErrorKind::from_status(403), LlmErrorKind::Auth);
        assert_eq!(LlmErrorKind::from_status(429), LlmErrorKind::RateLimit);
        assert_eq!(LlmErrorKind::from_status(422), LlmErrorKind::InvalidRequest);
        assert_eq!(LlmErrorKind::from_status(503), LlmErrorKind::ServerError);
        assert_eq!(LlmErrorKind::from_status(418), LlmErrorKind::Unknown);
    }

    #[test]
    fn test_from_status_message_and_retry_after() {
        let err = LlmError::from_status(429, "slow down", Some(Duration::from_secs(2)));
        assert_eq!(err.message, "Rate limit exceeded (HTTP 429): slow down");
        assert_eq!(err.retry_after, Some(Duration::from_secs(2)));
        assert!(err.is_retryable());

        let err = LlmError::from_status(401, "bad key", None);
        assert!(!err.is_retryable());
        assert_eq!(err.retry_after, None);
    }

    #[test]
    fn test_only_transient_failures_retry() {
        assert!(LlmError::network("reset").is_retryable());
        assert!(LlmError::new(LlmErrorKind::ServerError, "502").is_retryable());
        assert!(!LlmError::auth("no key").is_retryable());
        assert!(!LlmError::new(LlmErrorKind::InvalidRequest, "bad").is_retryable());
        assert!(!LlmError::unknown("?").is_retryable());
    }
}
