use thiserror::Error;

/// Final outcome of a source that could not deliver its transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("upstream kept answering TOO MANY REQUESTS")]
    RateLimited,
    #[error("upstream kept answering SERVICE UNAVAILABLE")]
    Unavailable,
}

/// Errors surfaced by [`crate::core::aggregator::Aggregator::aggregate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregationError {
    #[error("invalid request: {0}")]
    Validation(String),
    #[error("too many requests")]
    RateLimited,
    #[error("service unavailable")]
    Unavailable,
    /// A fetch task panicked or was aborted.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AggregationError {
    /// HTTP status equivalent of this error.
    pub fn status_code(&self) -> u16 {
        match self {
            AggregationError::Validation(_) => 400,
            AggregationError::RateLimited => 429,
            AggregationError::Unavailable => 503,
            AggregationError::Internal(_) => 500,
        }
    }
}

impl From<FetchError> for AggregationError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::RateLimited => AggregationError::RateLimited,
            FetchError::Unavailable => AggregationError::Unavailable,
        }
    }
}
