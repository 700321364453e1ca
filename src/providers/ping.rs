use anyhow::{Context, Result};
use tracing::debug;

/// Liveness probe against an upstream's `GET {base_url}/ping`.
pub struct PingClient {
    base_url: String,
    client: reqwest::Client,
}

impl PingClient {
    pub fn new(base_url: &str) -> Self {
        PingClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Returns the upstream's reply body verbatim.
    pub async fn ping(&self) -> Result<String> {
        let url = format!("{}/ping", self.base_url);
        debug!("Pinging {}", url);

        let body = self
            .client
            .get(&url)
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .send()
            .await
            .with_context(|| format!("Ping request to {url} failed"))?
            .error_for_status()
            .with_context(|| format!("Ping to {url} returned an error status"))?
            .text()
            .await
            .context("Failed to read ping response")?;
        Ok(body)
    }
}
