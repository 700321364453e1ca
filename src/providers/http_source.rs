use super::util::{RetryPolicy, UpstreamOutcome, with_retry};
use crate::core::error::FetchError;
use crate::core::transaction::{Transaction, TransactionSource};
use anyhow::Result;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, instrument};

/// Upstream that serves `GET {base_url}/transactions?account=...`.
pub struct HttpTransactionSource {
    name: String,
    base_url: String,
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl HttpTransactionSource {
    pub fn new(
        name: &str,
        base_url: &str,
        retry: RetryPolicy,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent("txagg/0.1");
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(HttpTransactionSource {
            name: name.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client: builder.build()?,
            retry,
        })
    }

    async fn attempt(&self, url: &str, account: &str) -> UpstreamOutcome {
        let url = match reqwest::Url::parse_with_params(url, &[("account", account)]) {
            Ok(url) => url,
            Err(e) => {
                return UpstreamOutcome::TransportError(format!("invalid url {url}: {e}"));
            }
        };
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => return UpstreamOutcome::TransportError(e.to_string()),
        };

        let status = response.status();
        debug!(%status, "Received upstream response");
        match status {
            StatusCode::TOO_MANY_REQUESTS => return UpstreamOutcome::RateLimited,
            StatusCode::SERVICE_UNAVAILABLE => return UpstreamOutcome::Unavailable,
            _ => {}
        }

        // Any other status is taken at face value: whatever list the body
        // holds is the answer. An empty or `null` body means no transactions.
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => return UpstreamOutcome::TransportError(e.to_string()),
        };
        if body.iter().all(u8::is_ascii_whitespace) {
            return UpstreamOutcome::Success(Vec::new());
        }
        match serde_json::from_slice::<Option<Vec<Transaction>>>(&body) {
            Ok(transactions) => UpstreamOutcome::Success(transactions.unwrap_or_default()),
            Err(e) => UpstreamOutcome::TransportError(format!(
                "malformed body (status {status}): {e}"
            )),
        }
    }
}

#[async_trait]
impl TransactionSource for HttpTransactionSource {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "UpstreamFetch",
        skip(self),
        fields(source = %self.name, account = %account)
    )]
    async fn fetch_transactions(&self, account: &str) -> Result<Vec<Transaction>, FetchError> {
        let url = format!("{}/transactions", self.base_url);
        debug!("Requesting transactions from {}", url);

        let transactions = with_retry(&self.retry, |_| self.attempt(&url, account)).await?;
        debug!(count = transactions.len(), "Fetched transactions");
        Ok(transactions)
    }
}
