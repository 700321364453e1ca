use crate::core::error::FetchError;
use crate::core::transaction::Transaction;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// What a single request to an upstream produced.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamOutcome {
    Success(Vec<Transaction>),
    RateLimited,
    Unavailable,
    /// The request could not be sent or its body could not be read.
    TransportError(String),
}

/// Decision taken after one attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum RetryStep {
    /// Try again, remembering the last status-based failure seen so far.
    Retry { last_failure: Option<FetchError> },
    Finish(Result<Vec<Transaction>, FetchError>),
}

/// Bounded immediate-retry policy for upstream requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, the first one included.
    pub max_attempts: u32,
    /// Pause between attempts; 0 retries immediately.
    pub delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay_ms: 0,
        }
    }
}

impl RetryPolicy {
    /// Decides what follows attempt number `attempt` (1-based).
    ///
    /// Transport errors never replace an earlier status-based failure. When
    /// attempts run out the last observed status decides the error; if no
    /// status was ever observed the source counts as unavailable.
    pub fn next_step(
        &self,
        attempt: u32,
        last_failure: Option<FetchError>,
        outcome: UpstreamOutcome,
    ) -> RetryStep {
        let last_failure = match outcome {
            UpstreamOutcome::Success(transactions) => return RetryStep::Finish(Ok(transactions)),
            UpstreamOutcome::RateLimited => Some(FetchError::RateLimited),
            UpstreamOutcome::Unavailable => Some(FetchError::Unavailable),
            UpstreamOutcome::TransportError(_) => last_failure,
        };

        if attempt >= self.max_attempts.max(1) {
            RetryStep::Finish(Err(last_failure.unwrap_or(FetchError::Unavailable)))
        } else {
            RetryStep::Retry { last_failure }
        }
    }
}

/// Runs `operation` until [`RetryPolicy::next_step`] says to stop.
///
/// `operation` receives the 1-based attempt number.
pub async fn with_retry<F, Fut>(
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<Vec<Transaction>, FetchError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = UpstreamOutcome>,
{
    let mut attempt = 1;
    let mut last_failure = None;
    loop {
        let outcome = operation(attempt).await;
        if let UpstreamOutcome::TransportError(reason) = &outcome {
            debug!(attempt, %reason, "Transport error");
        }
        match policy.next_step(attempt, last_failure, outcome) {
            RetryStep::Finish(Err(err)) => {
                warn!(attempts = attempt, error = %err, "Giving up on upstream");
                return Err(err);
            }
            RetryStep::Finish(result) => return result,
            RetryStep::Retry {
                last_failure: failure,
            } => {
                debug!(
                    "Attempt {}/{} failed ({:?}). Retrying...",
                    attempt, policy.max_attempts, failure
                );
                last_failure = failure;
                attempt += 1;
                if policy.delay_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(policy.delay_ms)).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transaction::test_support::tx;
    use std::sync::Mutex;

    fn transport() -> UpstreamOutcome {
        UpstreamOutcome::TransportError("connection refused".to_string())
    }

    #[test]
    fn test_success_finishes_immediately() {
        let policy = RetryPolicy::default();
        let txs = vec![tx("a", "1", "2024-01-01T10:00:00")];

        let step = policy.next_step(1, None, UpstreamOutcome::Success(txs.clone()));

        assert_eq!(step, RetryStep::Finish(Ok(txs)));
    }

    #[test]
    fn test_success_after_failures_wins() {
        let policy = RetryPolicy::default();

        let step = policy.next_step(
            5,
            Some(FetchError::RateLimited),
            UpstreamOutcome::Success(vec![]),
        );

        assert_eq!(step, RetryStep::Finish(Ok(vec![])));
    }

    #[test]
    fn test_retryable_outcomes_retry_before_cap() {
        let policy = RetryPolicy::default();

        for attempt in 1..5 {
            assert_eq!(
                policy.next_step(attempt, None, UpstreamOutcome::RateLimited),
                RetryStep::Retry {
                    last_failure: Some(FetchError::RateLimited)
                }
            );
            assert_eq!(
                policy.next_step(attempt, None, UpstreamOutcome::Unavailable),
                RetryStep::Retry {
                    last_failure: Some(FetchError::Unavailable)
                }
            );
            assert_eq!(
                policy.next_step(attempt, None, transport()),
                RetryStep::Retry { last_failure: None }
            );
        }
    }

    #[test]
    fn test_last_status_decides_final_error() {
        let policy = RetryPolicy::default();

        assert_eq!(
            policy.next_step(5, Some(FetchError::Unavailable), UpstreamOutcome::RateLimited),
            RetryStep::Finish(Err(FetchError::RateLimited))
        );
        assert_eq!(
            policy.next_step(5, Some(FetchError::RateLimited), UpstreamOutcome::Unavailable),
            RetryStep::Finish(Err(FetchError::Unavailable))
        );
    }

    #[test]
    fn test_transport_error_keeps_earlier_status() {
        let policy = RetryPolicy::default();

        assert_eq!(
            policy.next_step(2, Some(FetchError::RateLimited), transport()),
            RetryStep::Retry {
                last_failure: Some(FetchError::RateLimited)
            }
        );
        assert_eq!(
            policy.next_step(5, Some(FetchError::RateLimited), transport()),
            RetryStep::Finish(Err(FetchError::RateLimited))
        );
    }

    #[test]
    fn test_transport_only_falls_back_to_unavailable() {
        let policy = RetryPolicy::default();

        assert_eq!(
            policy.next_step(5, None, transport()),
            RetryStep::Finish(Err(FetchError::Unavailable))
        );
    }

    #[test]
    fn test_zero_attempts_still_tries_once() {
        let policy = RetryPolicy {
            max_attempts: 0,
            delay_ms: 0,
        };

        assert_eq!(
            policy.next_step(1, None, UpstreamOutcome::RateLimited),
            RetryStep::Finish(Err(FetchError::RateLimited))
        );
    }

    #[tokio::test]
    async fn test_with_retry_stops_at_cap() {
        let policy = RetryPolicy::default();
        let attempts = Mutex::new(Vec::new());

        let result = with_retry(&policy, |attempt| {
            attempts.lock().unwrap().push(attempt);
            async { UpstreamOutcome::Unavailable }
        })
        .await;

        assert_eq!(result, Err(FetchError::Unavailable));
        assert_eq!(*attempts.lock().unwrap(), vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_with_retry_recovers_on_third_attempt() {
        let policy = RetryPolicy::default();
        let txs = vec![tx("a", "1", "2024-01-01T10:00:00")];

        let result = with_retry(&policy, |attempt| {
            let txs = txs.clone();
            async move {
                if attempt < 3 {
                    UpstreamOutcome::RateLimited
                } else {
                    UpstreamOutcome::Success(txs)
                }
            }
        })
        .await;

        assert_eq!(result, Ok(txs));
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_retry_waits_between_attempts() {
        let policy = RetryPolicy {
            max_attempts: 3,
            delay_ms: 1_000,
        };
        let started = tokio::time::Instant::now();

        let result = with_retry(&policy, |_| async { UpstreamOutcome::RateLimited }).await;

        assert_eq!(result, Err(FetchError::RateLimited));
        assert!(started.elapsed() >= Duration::from_millis(2_000));
    }
}
