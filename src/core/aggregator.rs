//! Fan-out over the two upstream sources with a memoized, merged result

use crate::core::cache::ResultCache;
use crate::core::error::{AggregationError, FetchError};
use crate::core::transaction::{Transaction, TransactionSource, sort_by_recency};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

/// Merges the transactions of two sources into one most-recent-first list.
///
/// Results are memoized per account for the lifetime of the cache: once an
/// account has been aggregated successfully, later calls return that result
/// without contacting either source. Failures are never cached.
///
/// Two concurrent calls for an account that is not cached yet both go to the
/// network; whichever stores its result first wins and both callers receive
/// that stored result.
pub struct Aggregator {
    primary: Arc<dyn TransactionSource>,
    secondary: Arc<dyn TransactionSource>,
    cache: Arc<ResultCache>,
}

impl Aggregator {
    pub fn new(
        primary: Arc<dyn TransactionSource>,
        secondary: Arc<dyn TransactionSource>,
        cache: Arc<ResultCache>,
    ) -> Self {
        Self {
            primary,
            secondary,
            cache,
        }
    }

    /// Returns every transaction of `account` from both sources, most recent
    /// first.
    ///
    /// Both sources are queried in parallel and both are awaited. If either
    /// fails the whole aggregation fails and the other result is dropped;
    /// when both fail the primary source's error is reported.
    #[instrument(name = "Aggregate", skip(self))]
    pub async fn aggregate(&self, account: &str) -> Result<Vec<Transaction>, AggregationError> {
        if account.trim().is_empty() {
            return Err(AggregationError::Validation(
                "account must not be empty".to_string(),
            ));
        }

        if let Some(cached) = self.cache.get(&account.to_string()).await {
            return Ok(cached);
        }

        let primary = spawn_fetch(Arc::clone(&self.primary), account);
        let secondary = spawn_fetch(Arc::clone(&self.secondary), account);
        let (primary, secondary) = tokio::join!(primary, secondary);

        let primary = flatten(self.primary.name(), primary);
        let secondary = flatten(self.secondary.name(), secondary);
        let (primary, secondary) = match (primary, secondary) {
            (Ok(p), Ok(s)) => (p, s),
            (Err(e), _) | (Ok(_), Err(e)) => return Err(e),
        };

        debug!(
            primary = primary.len(),
            secondary = secondary.len(),
            "Merging transactions"
        );
        let merged = merge(primary, secondary);

        Ok(self.cache.put(account.to_string(), merged).await)
    }
}

/// Concatenates primary before secondary, then sorts most recent first.
pub fn merge(primary: Vec<Transaction>, secondary: Vec<Transaction>) -> Vec<Transaction> {
    let mut all = primary;
    all.extend(secondary);
    sort_by_recency(all)
}

fn spawn_fetch(
    source: Arc<dyn TransactionSource>,
    account: &str,
) -> JoinHandle<Result<Vec<Transaction>, FetchError>> {
    let account = account.to_string();
    tokio::spawn(async move { source.fetch_transactions(&account).await })
}

fn flatten(
    name: &str,
    joined: Result<Result<Vec<Transaction>, FetchError>, tokio::task::JoinError>,
) -> Result<Vec<Transaction>, AggregationError> {
    match joined {
        Ok(Ok(transactions)) => Ok(transactions),
        Ok(Err(e)) => {
            warn!(source = name, error = %e, "Source failed");
            Err(e.into())
        }
        Err(e) => {
            warn!(source = name, error = %e, "Fetch task did not complete");
            Err(AggregationError::Internal(format!(
                "fetch from {name} did not complete: {e}"
            )))
        }
    }
}
