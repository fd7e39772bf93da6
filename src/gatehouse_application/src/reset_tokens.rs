use gatehouse_core::{KvStore, KvStoreError};
use rand::{Rng, distr::Alphanumeric};

use crate::keys::KeyNamespace;

const RESET_TOKEN_LENGTH: usize = 64;

/// Single-use password-reset tokens: random high-entropy strings mapping to a
/// user id, with a short fixed TTL. Not signed tokens; possession is the only
/// credential.
#[derive(Clone)]
pub struct ResetTokenStore<K> {
    kv: K,
    keys: KeyNamespace,
    ttl_seconds: u64,
}

impl<K: KvStore> ResetTokenStore<K> {
    pub fn new(kv: K, keys: KeyNamespace, ttl_seconds: u64) -> Self {
        Self {
            kv,
            keys,
            ttl_seconds,
        }
    }

    pub async fn issue(&self, user_id: &str) -> Result<String, KvStoreError> {
        let token: String = rand::rng()
            .sample_iter(Alphanumeric)
            .take(RESET_TOKEN_LENGTH)
            .map(char::from)
            .collect();

        self.kv
            .set(&self.keys.reset_key(&token), user_id, Some(self.ttl_seconds))
            .await?;

        Ok(token)
    }

    pub async fn lookup(&self, token: &str) -> Result<Option<String>, KvStoreError> {
        self.kv.get(&self.keys.reset_key(token)).await
    }

    pub async fn consume(&self, token: &str) -> Result<(), KvStoreError> {
        self.kv.del(&self.keys.reset_key(token)).await
    }
}
