//! Infrastructure adapters for the Gatehouse authentication service:
//! redis/postgres implementations of the core ports, the Postmark email
//! client, their in-memory counterparts for tests, and configuration loading.

pub mod config;
pub mod email;
pub mod persistence;

pub use config::{AllowedOrigins, Settings};
pub use email::{MockEmailClient, PostmarkEmailClient};
pub use persistence::{HashMapUserStore, InMemoryKvStore, PostgresUserStore, RedisKvStore};
