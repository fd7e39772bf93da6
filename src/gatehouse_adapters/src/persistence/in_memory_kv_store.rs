use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use gatehouse_core::{KvStore, KvStoreError};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at <= Instant::now())
    }
}

/// TTL-aware in-memory `KvStore` for tests and local development.
///
/// Expiry is enforced lazily on access, which is enough for tests that
/// inspect TTLs rather than wait for them.
#[derive(Clone, Default)]
pub struct InMemoryKvStore {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl InMemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

// Glob matching for '*' wildcards only, which is all the key patterns use.
fn glob_match(pattern: &str, key: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return pattern == key;
    }

    let mut rest = key;
    for (i, part) in parts.iter().enumerate() {
        if i == 0 {
            let Some(stripped) = rest.strip_prefix(part) else {
                return false;
            };
            rest = stripped;
        } else if i == parts.len() - 1 {
            return part.is_empty() || rest.ends_with(part);
        } else {
            let Some(idx) = rest.find(part) else {
                return false;
            };
            rest = &rest[idx + part.len()..];
        }
    }
    true
}

#[async_trait::async_trait]
impl KvStore for InMemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KvStoreError> {
        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some(entry) if entry.is_expired() => {
                entries.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn set(
        &self,
        key: &str,
        value: &str,
        ttl_seconds: Option<u64>,
    ) -> Result<(), KvStoreError> {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: ttl_seconds.map(|ttl| Instant::now() + Duration::from_secs(ttl)),
            },
        );
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), KvStoreError> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, KvStoreError> {
        Ok(self.get(key).await?.is_some())
    }

    async fn expire(&self, key: &str, ttl_seconds: u64) -> Result<bool, KvStoreError> {
        let mut entries = self.entries.write().await;
        match entries.get_mut(key) {
            Some(entry) if !entry.is_expired() => {
                entry.expires_at = Some(Instant::now() + Duration::from_secs(ttl_seconds));
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn ttl(&self, key: &str) -> Result<Option<u64>, KvStoreError> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).filter(|e| !e.is_expired()).and_then(|e| {
            e.expires_at
                .map(|at| at.saturating_duration_since(Instant::now()).as_secs())
        }))
    }

    async fn incr(&self, key: &str) -> Result<i64, KvStoreError> {
        let mut entries = self.entries.write().await;
        let next = match entries.get(key) {
            Some(entry) if !entry.is_expired() => entry
                .value
                .parse::<i64>()
                .map_err(|e| KvStoreError::Backend(e.to_string()))?
                + 1,
            _ => 1,
        };
        // A fresh counter has no expiry until `expire` arms the window.
        let expires_at = entries.get(key).filter(|e| !e.is_expired()).and_then(|e| e.expires_at);
        entries.insert(
            key.to_string(),
            Entry {
                value: next.to_string(),
                expires_at,
            },
        );
        Ok(next)
    }

    async fn scan_keys(&self, pattern: &str) -> Result<Vec<String>, KvStoreError> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .filter(|(key, entry)| !entry.is_expired() && glob_match(pattern, key))
            .map(|(key, _)| key.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glob_matches_prefix_patterns() {
        assert!(glob_match("user-sessions:u1:*", "user-sessions:u1:abc"));
        assert!(!glob_match("user-sessions:u1:*", "user-sessions:u2:abc"));
        assert!(glob_match("exact", "exact"));
        assert!(!glob_match("exact", "exact:more"));
    }

    #[tokio::test]
    async fn expired_entries_vanish_on_access() {
        let store = InMemoryKvStore::new();
        store.set("gone", "1", Some(0)).await.unwrap();
        assert_eq!(store.get("gone").await.unwrap(), None);
        assert!(!store.exists("gone").await.unwrap());
    }

    #[tokio::test]
    async fn incr_preserves_the_window_expiry() {
        let store = InMemoryKvStore::new();
        assert_eq!(store.incr("counter").await.unwrap(), 1);
        store.expire("counter", 300).await.unwrap();
        assert_eq!(store.incr("counter").await.unwrap(), 2);

        let ttl = store.ttl("counter").await.unwrap().unwrap();
        assert!(ttl <= 300 && ttl > 290, "ttl={ttl}");
    }
}
