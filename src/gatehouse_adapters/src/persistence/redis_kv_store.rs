use std::sync::Arc;

use redis::{Commands, Connection};
use tokio::sync::RwLock;

use gatehouse_core::{KvStore, KvStoreError};

/// `KvStore` over a shared redis connection.
#[derive(Clone)]
pub struct RedisKvStore {
    conn: Arc<RwLock<Connection>>,
}

impl RedisKvStore {
    pub fn new(conn: Arc<RwLock<Connection>>) -> Self {
        Self { conn }
    }
}

fn to_store_error(e: redis::RedisError) -> KvStoreError {
    KvStoreError::Backend(e.to_string())
}

#[async_trait::async_trait]
impl KvStore for RedisKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KvStoreError> {
        let mut conn = self.conn.write().await;
        conn.get::<_, Option<String>>(key).map_err(to_store_error)
    }

    async fn set(
        &self,
        key: &str,
        value: &str,
        ttl_seconds: Option<u64>,
    ) -> Result<(), KvStoreError> {
        let mut conn = self.conn.write().await;
        match ttl_seconds {
            Some(ttl) => conn
                .set_ex::<_, _, ()>(key, value, ttl)
                .map_err(to_store_error),
            None => conn.set::<_, _, ()>(key, value).map_err(to_store_error),
        }
    }

    async fn del(&self, key: &str) -> Result<(), KvStoreError> {
        let mut conn = self.conn.write().await;
        conn.del::<_, ()>(key).map_err(to_store_error)
    }

    async fn exists(&self, key: &str) -> Result<bool, KvStoreError> {
        let mut conn = self.conn.write().await;
        conn.exists::<_, bool>(key).map_err(to_store_error)
    }

    async fn expire(&self, key: &str, ttl_seconds: u64) -> Result<bool, KvStoreError> {
        let mut conn = self.conn.write().await;
        conn.expire::<_, bool>(key, ttl_seconds as i64)
            .map_err(to_store_error)
    }

    async fn ttl(&self, key: &str) -> Result<Option<u64>, KvStoreError> {
        let mut conn = self.conn.write().await;
        // -2 = missing key, -1 = no expiry
        let remaining: i64 = conn.ttl(key).map_err(to_store_error)?;
        Ok((remaining >= 0).then_some(remaining as u64))
    }

    async fn incr(&self, key: &str) -> Result<i64, KvStoreError> {
        let mut conn = self.conn.write().await;
        conn.incr::<_, _, i64>(key, 1).map_err(to_store_error)
    }

    async fn scan_keys(&self, pattern: &str) -> Result<Vec<String>, KvStoreError> {
        let mut conn = self.conn.write().await;
        let keys = conn
            .scan_match::<_, String>(pattern)
            .map_err(to_store_error)?
            .collect::<Result<Vec<String>, _>>()
            .map_err(to_store_error)?;
        Ok(keys)
    }
}
