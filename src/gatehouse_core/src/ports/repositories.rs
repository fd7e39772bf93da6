use async_trait::async_trait;
use secrecy::Secret;
use thiserror::Error;

use crate::domain::{
    email::Email,
    user::{NewUser, User},
};

// UserStore port trait and errors
#[derive(Debug, Error)]
pub enum UserStoreError {
    #[error("User already exists")]
    UserAlreadyExists,
    #[error("User not found")]
    UserNotFound,
    #[error("Unexpected error {0}")]
    UnexpectedError(String),
}

impl PartialEq for UserStoreError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::UserAlreadyExists, Self::UserAlreadyExists) => true,
            (Self::UserNotFound, Self::UserNotFound) => true,
            (Self::UnexpectedError(_), Self::UnexpectedError(_)) => true,
            _ => false,
        }
    }
}

/// User directory contract. Lookups return `None` for absent users; errors are
/// reserved for infrastructure failures and constraint violations.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserStoreError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, UserStoreError>;
    async fn create(&self, fields: NewUser) -> Result<User, UserStoreError>;
    async fn update_password_hash(
        &self,
        id: &str,
        password_hash: Secret<String>,
    ) -> Result<(), UserStoreError>;
}

// KvStore port trait and errors
#[derive(Debug, Error)]
pub enum KvStoreError {
    #[error("Key-value store error: {0}")]
    Backend(String),
}

/// Shared, TTL-capable key-value store (sessions, refresh records, denylist
/// entries, rate-limit counters). Absence of a key is `None`/`false`, never an
/// error, because expiry is a routine outcome.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, KvStoreError>;
    async fn set(
        &self,
        key: &str,
        value: &str,
        ttl_seconds: Option<u64>,
    ) -> Result<(), KvStoreError>;
    async fn del(&self, key: &str) -> Result<(), KvStoreError>;
    async fn exists(&self, key: &str) -> Result<bool, KvStoreError>;
    /// Returns false if the key no longer exists.
    async fn expire(&self, key: &str, ttl_seconds: u64) -> Result<bool, KvStoreError>;
    /// Remaining TTL in seconds; `None` for missing keys or keys without expiry.
    async fn ttl(&self, key: &str) -> Result<Option<u64>, KvStoreError>;
    /// Atomic counter increment, returning the new value.
    async fn incr(&self, key: &str) -> Result<i64, KvStoreError>;
    /// Keys matching a glob-style pattern (`prefix:*`).
    async fn scan_keys(&self, pattern: &str) -> Result<Vec<String>, KvStoreError>;
}
