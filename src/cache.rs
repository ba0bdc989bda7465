//! In-memory TTL cache for suggestion responses.
//!
//! Entries are keyed by a SHA-256 digest of the serialized request and
//! expire after the configured TTL (15 minutes by default). Expired entries
//! are removed on read; the store is owned by Rocket managed state rather
//! than process-wide globals so it stays reentrant and testable.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};

const DEFAULT_TTL: Duration = Duration::from_secs(900);

pub struct TtlCache {
    store: Mutex<HashMap<String, (serde_json::Value, Instant)>>,
    ttl: Duration,
}

impl TtlCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            store: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Look up the cached value for a request, dropping it when expired.
    pub fn get<K: Serialize, V: DeserializeOwned>(&self, key_data: &K) -> Option<V> {
        let key = Self::hash(key_data)?;
        let mut store = self.store.lock();

        let (value, expires_at) = store
            .get(&key)
            .map(|(value, expires_at)| (value.clone(), *expires_at))?;

        if Instant::now() > expires_at {
            store.remove(&key);
            return None;
        }

        serde_json::from_value(value).ok()
    }

    /// Store a response under the request's digest with the configured TTL.
    pub fn set<K: Serialize, V: Serialize>(&self, key_data: &K, value: &V) {
        let Some(key) = Self::hash(key_data) else {
            return;
        };
        let Ok(value) = serde_json::to_value(value) else {
            return;
        };

        self.store
            .lock()
            .insert(key, (value, Instant::now() + self.ttl));
    }

    pub fn clear(&self) {
        self.store.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn hash<K: Serialize>(key_data: &K) -> Option<String> {
        let raw = serde_json::to_vec(key_data).ok()?;
        let mut hasher = Sha256::new();
        hasher.update(&raw);
        Some(format!("{:x}", hasher.finalize()))
    }
}

impl Default for TtlCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_values_by_request_key() {
        let cache = TtlCache::default();
        cache.set(&("request", 1), &vec!["a".to_string(), "b".to_string()]);

        let hit: Option<Vec<String>> = cache.get(&("request", 1));
        assert_eq!(hit, Some(vec!["a".to_string(), "b".to_string()]));

        let miss: Option<Vec<String>> = cache.get(&("request", 2));
        assert!(miss.is_none());
    }

    #[test]
    fn expired_entries_are_dropped_on_read() {
        let cache = TtlCache::new(Duration::ZERO);
        cache.set(&"key", &42u32);
        std::thread::sleep(Duration::from_millis(5));

        let hit: Option<u32> = cache.get(&"key");
        assert!(hit.is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn clear_empties_the_store() {
        let cache = TtlCache::default();
        cache.set(&"a", &1u32);
        cache.set(&"b", &2u32);
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
    }
}
