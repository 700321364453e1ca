//! Aggregation domain: records, errors, cache and the fan-out itself

pub mod aggregator;
pub mod cache;
pub mod config;
pub mod error;
pub mod log;
pub mod transaction;

// Re-export main types for cleaner imports
pub use aggregator::Aggregator;
pub use cache::ResultCache;
pub use error::{AggregationError, FetchError};
pub use transaction::{Transaction, TransactionSource};
