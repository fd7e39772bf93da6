use gatehouse_core::{KvStore, KvStoreError};
use thiserror::Error;

use crate::keys::KeyNamespace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateScope {
    Login,
    ForgotPasswordEmail,
    ForgotPasswordIp,
}

impl RateScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateScope::Login => "login",
            RateScope::ForgotPasswordEmail => "forgot-email",
            RateScope::ForgotPasswordIp => "forgot-ip",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RateLimitPolicy {
    pub max_attempts: i64,
    pub window_seconds: u64,
}

impl RateLimitPolicy {
    pub fn window_minutes(&self) -> u64 {
        self.window_seconds.div_ceil(60)
    }
}

#[derive(Debug, Error)]
pub enum RateLimitError {
    #[error("Too many attempts, retry in {retry_after_minutes} minutes")]
    Exceeded { retry_after_minutes: u64 },
    #[error(transparent)]
    Store(#[from] KvStoreError),
}

/// Per-identifier attempt counter with block-on-threshold semantics.
///
/// Counters are best-effort: the single-store INCR tolerates races, which is
/// acceptable because the goal is approximate throttling, not exact
/// enforcement.
#[derive(Clone)]
pub struct RateLimiter<K> {
    kv: K,
    keys: KeyNamespace,
}

impl<K: KvStore> RateLimiter<K> {
    pub fn new(kv: K, keys: KeyNamespace) -> Self {
        Self { kv, keys }
    }

    pub async fn check(
        &self,
        scope: RateScope,
        identifier: &str,
        policy: RateLimitPolicy,
    ) -> Result<(), RateLimitError> {
        let key = self.keys.attempt_key(scope.as_str(), identifier);
        let attempts = self
            .kv
            .get(&key)
            .await?
            .and_then(|raw| raw.parse::<i64>().ok())
            .unwrap_or(0);

        if attempts >= policy.max_attempts {
            return Err(RateLimitError::Exceeded {
                retry_after_minutes: policy.window_minutes(),
            });
        }

        Ok(())
    }

    /// The TTL is armed only when the counter is created, so the window runs
    /// from the first failure. Re-arming on every attempt would let a caller
    /// keep the window sliding forever with one request per window.
    pub async fn record_failure(
        &self,
        scope: RateScope,
        identifier: &str,
        policy: RateLimitPolicy,
    ) -> Result<(), KvStoreError> {
        let key = self.keys.attempt_key(scope.as_str(), identifier);
        let count = self.kv.incr(&key).await?;
        if count == 1 {
            self.kv.expire(&key, policy.window_seconds).await?;
        }
        Ok(())
    }

    pub async fn clear(&self, scope: RateScope, identifier: &str) -> Result<(), KvStoreError> {
        self.kv
            .del(&self.keys.attempt_key(scope.as_str(), identifier))
            .await
    }
}
