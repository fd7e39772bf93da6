use gatehouse_core::{KvStore, KvStoreError};

use crate::keys::KeyNamespace;

/// Revoked-but-not-yet-expired access token ids.
///
/// Entries carry the token's remaining lifetime as TTL, so they disappear
/// exactly when the token would have expired anyway and the store cannot grow
/// unboundedly.
#[derive(Clone)]
pub struct TokenDenylist<K> {
    kv: K,
    keys: KeyNamespace,
}

impl<K: KvStore> TokenDenylist<K> {
    pub fn new(kv: K, keys: KeyNamespace) -> Self {
        Self { kv, keys }
    }

    pub async fn block(&self, jti: &str, remaining_ttl_seconds: u64) -> Result<(), KvStoreError> {
        if remaining_ttl_seconds == 0 {
            // The token is already expired; nothing to deny.
            return Ok(());
        }
        self.kv
            .set(
                &self.keys.denylist_key(jti),
                "1",
                Some(remaining_ttl_seconds),
            )
            .await
    }

    pub async fn contains(&self, jti: &str) -> Result<bool, KvStoreError> {
        self.kv.exists(&self.keys.denylist_key(jti)).await
    }

    /// Remaining block time, for inspection in tests and diagnostics.
    pub async fn remaining_seconds(&self, jti: &str) -> Result<Option<u64>, KvStoreError> {
        self.kv.ttl(&self.keys.denylist_key(jti)).await
    }
}
