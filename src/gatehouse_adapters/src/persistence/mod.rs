pub mod hashmap_user_store;
pub mod in_memory_kv_store;
pub mod postgres_user_store;
pub mod redis_kv_store;

pub use hashmap_user_store::HashMapUserStore;
pub use in_memory_kv_store::InMemoryKvStore;
pub use postgres_user_store::PostgresUserStore;
pub use redis_kv_store::RedisKvStore;
