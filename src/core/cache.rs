use crate::core::transaction::Transaction;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Memoized aggregation results, keyed by account.
pub type ResultCache = Cache<String, Vec<Transaction>>;

/// Process-wide memo table shared between concurrent callers.
///
/// The lock is only held for the map operation itself, so callers working on
/// different keys never wait on each other's network I/O. Entries are never
/// evicted or expired: memory grows with the number of distinct keys for the
/// lifetime of the process.
#[derive(Clone)]
pub struct Cache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    inner: Arc<Mutex<HashMap<K, V>>>,
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Debug + Send + Sync,
    V: Clone + Send + Sync,
{
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        let cache = self.inner.lock().await;
        let value = cache.get(key).cloned();
        if value.is_some() {
            debug!(?key, "Cache HIT");
        } else {
            debug!(?key, "Cache MISS");
        }
        value
    }

    /// Stores `value` unless `key` is already present.
    ///
    /// The first stored value wins; returns the value now held for `key`.
    pub async fn put(&self, key: K, value: V) -> V {
        let mut cache = self.inner.lock().await;
        match cache.get(&key) {
            Some(existing) => {
                debug!(?key, "Cache PUT skipped, entry already present");
                existing.clone()
            }
            None => {
                debug!(?key, "Cache PUT");
                cache.insert(key, value.clone());
                value
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}

impl<K, V> Default for Cache<K, V>
where
    K: Eq + Hash + Debug + Send + Sync,
    V: Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}
