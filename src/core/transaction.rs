//! Transaction records and the upstream source abstraction

use crate::core::error::FetchError;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::Display;
use std::str::FromStr;

/// Zone-less local date-time, kept exactly as the upstream wrote it.
///
/// Seconds and fractions are optional (`2024-01-01T10:00`,
/// `2024-01-01T10:00:00.000`). Ordering uses the parsed value; the original
/// text is what gets serialized back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamp {
    raw: String,
    value: NaiveDateTime,
}

impl Timestamp {
    pub fn value(&self) -> NaiveDateTime {
        self.value
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl FromStr for Timestamp {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))?;
        Ok(Timestamp {
            raw: s.to_string(),
            value,
        })
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(|e| {
            serde::de::Error::custom(format!("invalid local date-time {raw:?}: {e}"))
        })
    }
}

/// A single transaction as reported by one upstream source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "serverId", alias = "sourceId")]
    pub source_id: String,
    pub account: String,
    pub amount: Decimal,
    pub timestamp: Timestamp,
}

/// Anything that can list the transactions of an account.
#[async_trait]
pub trait TransactionSource: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &str;

    async fn fetch_transactions(&self, account: &str) -> Result<Vec<Transaction>, FetchError>;
}

/// Orders transactions most recent first.
///
/// The sort is stable: transactions sharing a timestamp keep the order in
/// which they appear in `transactions`.
pub fn sort_by_recency(mut transactions: Vec<Transaction>) -> Vec<Transaction> {
    transactions.sort_by(|a, b| b.timestamp.value().cmp(&a.timestamp.value()));
    transactions
}
