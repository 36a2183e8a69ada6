use std::time::Duration;

use thiserror::Error;

use crate::cascade::AttemptOutcome;

/// Errors raised outside the per-candidate loop.
///
/// Any of these reaching the orchestrator's outer boundary routes the request
/// into the deterministic rescue path.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("Invalid patient case: {0}")]
    InvalidCase(String),

    #[error("Reference data lookup failed: {0}")]
    Reference(String),

    #[error("Deterministic assessment failed: {0}")]
    Assessment(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FlowError>;

/// Failure of a single reasoning-backend attempt.
///
/// Every variant advances the cascade cursor; none aborts the request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("No response within {0:?}")]
    Timeout(Duration),

    /// A timeout the provider reported itself, as opposed to the attempt
    /// deadline expiring.
    #[error("Provider timed out: {0}")]
    ProviderTimeout(String),

    #[error("Rate limit or quota exceeded: {0}")]
    Quota(String),

    #[error("Service overloaded: {0}")]
    Overloaded(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Backend error: {0}")]
    Other(String),
}

impl BackendError {
    /// Classify a provider error message into the retryable taxonomy.
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();

        if lower.contains("429")
            || lower.contains("quota")
            || lower.contains("rate limit")
            || lower.contains("rate_limit")
            || lower.contains("resource_exhausted")
            || lower.contains("too many requests")
        {
            BackendError::Quota(message)
        } else if lower.contains("503")
            || lower.contains("overloaded")
            || lower.contains("unavailable")
            || lower.contains("capacity")
        {
            BackendError::Overloaded(message)
        } else if lower.contains("404")
            || lower.contains("not found")
            || lower.contains("not_found")
            || lower.contains("unsupported model")
            || lower.contains("is not supported")
        {
            BackendError::ModelNotFound(message)
        } else if lower.contains("timed out") || lower.contains("timeout") {
            BackendError::ProviderTimeout(message)
        } else {
            BackendError::Other(message)
        }
    }

    /// Timeouts, quota, overload and unknown models are transient for the
    /// purpose of the cascade. The loop advances on terminal errors as well.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BackendError::Timeout(_)
                | BackendError::ProviderTimeout(_)
                | BackendError::Quota(_)
                | BackendError::Overloaded(_)
                | BackendError::ModelNotFound(_)
                | BackendError::Malformed(_)
        )
    }

    pub fn outcome(&self) -> AttemptOutcome {
        match self {
            BackendError::Timeout(_) | BackendError::ProviderTimeout(_) => AttemptOutcome::Timeout,
            BackendError::Quota(_) => AttemptOutcome::Quota,
            BackendError::Overloaded(_) => AttemptOutcome::Overloaded,
            BackendError::ModelNotFound(_) => AttemptOutcome::NotFound,
            BackendError::Malformed(_) => AttemptOutcome::Malformed,
            BackendError::Other(_) => AttemptOutcome::OtherError,
        }
    }
}
