use chrono::Utc;
use gatehouse_core::{KvStore, KvStoreError, SessionRecord};
use uuid::Uuid;

use crate::keys::KeyNamespace;

/// Creates, validates and revokes server-side session records.
///
/// Sessions live under `session:{sid}` with TTL equal to the refresh-token
/// lifetime; every successful refresh slides the TTL forward. A marker key
/// `user-sessions:{userId}:{sid}` with the same TTL indexes sessions by owner
/// so a password reset can revoke all of a user's logins.
#[derive(Clone)]
pub struct SessionManager<K> {
    kv: K,
    keys: KeyNamespace,
    ttl_seconds: u64,
}

impl<K: KvStore> SessionManager<K> {
    pub fn new(kv: K, keys: KeyNamespace, ttl_seconds: u64) -> Self {
        Self {
            kv,
            keys,
            ttl_seconds,
        }
    }

    #[tracing::instrument(name = "SessionManager::create", skip(self))]
    pub async fn create(
        &self,
        user_id: &str,
        user_agent: Option<String>,
        ip_address: Option<String>,
    ) -> Result<SessionRecord, KvStoreError> {
        let record = SessionRecord {
            session_id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            user_agent,
            ip_address,
            created_at: Utc::now(),
        };

        let payload =
            serde_json::to_string(&record).map_err(|e| KvStoreError::Backend(e.to_string()))?;

        self.kv
            .set(
                &self.keys.session_key(&record.session_id),
                &payload,
                Some(self.ttl_seconds),
            )
            .await?;
        self.kv
            .set(
                &self.keys.user_session_key(user_id, &record.session_id),
                "1",
                Some(self.ttl_seconds),
            )
            .await?;

        Ok(record)
    }

    /// `None` means the session expired or was revoked; callers must treat any
    /// token bound to it as dead.
    pub async fn validate(&self, session_id: &str) -> Result<Option<SessionRecord>, KvStoreError> {
        let Some(payload) = self.kv.get(&self.keys.session_key(session_id)).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&payload) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                tracing::warn!(session_id, error = %e, "discarding unreadable session record");
                Ok(None)
            }
        }
    }

    /// Slides the session TTL forward. Returns false when the session is gone,
    /// which callers must treat as a revoked login.
    pub async fn touch(&self, session_id: &str, ttl_seconds: u64) -> Result<bool, KvStoreError> {
        let Some(record) = self.validate(session_id).await? else {
            return Ok(false);
        };

        let extended = self
            .kv
            .expire(&self.keys.session_key(session_id), ttl_seconds)
            .await?;
        self.kv
            .expire(
                &self.keys.user_session_key(&record.user_id, session_id),
                ttl_seconds,
            )
            .await?;

        Ok(extended)
    }

    /// Idempotent: deleting an already-absent session succeeds.
    #[tracing::instrument(name = "SessionManager::delete", skip(self))]
    pub async fn delete(&self, session_id: &str) -> Result<(), KvStoreError> {
        if let Some(record) = self.validate(session_id).await? {
            self.kv
                .del(&self.keys.user_session_key(&record.user_id, session_id))
                .await?;
        }
        self.kv.del(&self.keys.session_key(session_id)).await
    }

    /// Deletes every session belonging to the user via the marker index.
    /// Returns the number of sessions revoked.
    #[tracing::instrument(name = "SessionManager::revoke_all_for_user", skip(self))]
    pub async fn revoke_all_for_user(&self, user_id: &str) -> Result<u64, KvStoreError> {
        let markers = self
            .kv
            .scan_keys(&self.keys.user_session_pattern(user_id))
            .await?;

        let mut revoked = 0;
        for marker in markers {
            // Session ids are uuids, so the final segment is unambiguous.
            let Some(session_id) = marker.rsplit(':').next() else {
                continue;
            };
            self.kv.del(&self.keys.session_key(session_id)).await?;
            self.kv.del(&marker).await?;
            revoked += 1;
        }

        Ok(revoked)
    }
}
