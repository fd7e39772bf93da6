use gatehouse_core::{KvStore, KvStoreError};
use serde::{Deserialize, Serialize};

use crate::keys::KeyNamespace;

/// Companion record persisted for each issued refresh token, keyed by jti.
///
/// A refresh token without a matching record has been rotated away or revoked
/// and must be rejected even if its signature is still valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRecord {
    pub user_id: String,
    pub session_id: String,
}

#[derive(Clone)]
pub struct RefreshTokenStore<K> {
    kv: K,
    keys: KeyNamespace,
    ttl_seconds: u64,
}

impl<K: KvStore> RefreshTokenStore<K> {
    pub fn new(kv: K, keys: KeyNamespace, ttl_seconds: u64) -> Self {
        Self {
            kv,
            keys,
            ttl_seconds,
        }
    }

    pub async fn put(&self, jti: &str, record: &RefreshRecord) -> Result<(), KvStoreError> {
        let payload =
            serde_json::to_string(record).map_err(|e| KvStoreError::Backend(e.to_string()))?;
        self.kv
            .set(&self.keys.refresh_key(jti), &payload, Some(self.ttl_seconds))
            .await
    }

    pub async fn get(&self, jti: &str) -> Result<Option<RefreshRecord>, KvStoreError> {
        let Some(payload) = self.kv.get(&self.keys.refresh_key(jti)).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&payload) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                tracing::warn!(jti, error = %e, "discarding unreadable refresh record");
                Ok(None)
            }
        }
    }

    pub async fn remove(&self, jti: &str) -> Result<(), KvStoreError> {
        self.kv.del(&self.keys.refresh_key(jti)).await
    }
}
