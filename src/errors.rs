use thiserror::Error;

/// Typed error hierarchy for moltcheck.
///
/// Use at module boundaries (API calls, model calls, state persistence,
/// config validation). Internal/leaf functions can continue using
/// `anyhow::Result` — the `Internal` variant allows seamless conversion via
/// the `?` operator.
#[derive(Debug, Error)]
pub enum MoltcheckError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// The Moltbook API returned a structured failure. Carries the optional
    /// human-readable hint from the response envelope.
    #[error("API error: {message}")]
    Api {
        message: String,
        hint: Option<String>,
        retryable: bool,
    },

    /// Provider-agnostic rate-limit signal. The only error the orchestrator
    /// treats as cycle-aborting rather than per-item-recoverable, so it must
    /// never be wrapped in a retry loop or an opaque error type.
    #[error("Rate limit exceeded")]
    RateLimit { retry_after: Option<u64> },

    /// Model output failed to match the expected structured shape.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Convenience alias for results using MoltcheckError.
pub type MoltcheckResult<T> = std::result::Result<T, MoltcheckError>;

impl MoltcheckError {
    /// Whether this error is retryable (transient API failures).
    ///
    /// Rate limits are deliberately *not* retryable here: the orchestrator
    /// decides backoff policy for them, not the transport layer.
    pub fn is_retryable(&self) -> bool {
        match self {
            MoltcheckError::Api { retryable, .. } => *retryable,
            _ => false,
        }
    }

    /// Extract the retry-after hint if this is a rate-limit error.
    pub fn rate_limit_hint(&self) -> Option<Option<u64>> {
        match self {
            MoltcheckError::RateLimit { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = MoltcheckError::Config("bad value".into());
        assert_eq!(err.to_string(), "Configuration error: bad value");
    }

    #[test]
    fn api_error_display_and_retryable() {
        let err = MoltcheckError::Api {
            message: "timeout".into(),
            hint: None,
            retryable: true,
        };
        assert_eq!(err.to_string(), "API error: timeout");
        assert!(err.is_retryable());
    }

    #[test]
    fn rate_limit_not_transparently_retryable() {
        let err = MoltcheckError::RateLimit {
            retry_after: Some(30),
        };
        assert!(!err.is_retryable());
        assert_eq!(err.rate_limit_hint(), Some(Some(30)));
    }

    #[test]
    fn validation_error_not_retryable() {
        let err = MoltcheckError::Validation("missing field".into());
        assert!(!err.is_retryable());
        assert_eq!(err.rate_limit_hint(), None);
    }

    #[test]
    fn internal_from_anyhow() {
        let anyhow_err = anyhow::anyhow!("something broke");
        let err: MoltcheckError = anyhow_err.into();
        assert!(matches!(err, MoltcheckError::Internal(_)));
        assert!(!err.is_retryable());
    }
}
