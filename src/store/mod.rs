//! Session store implementations

mod kv_store;
mod memory;
mod traits;

pub use kv_store::KvSessionStore;
pub use memory::MemoryClient;
pub use traits::{KeyValueClient, SessionDataStore};

#[cfg(feature = "redis-store")]
mod redis_store;

#[cfg(feature = "redis-store")]
pub use redis_store::{RedisClient, RedisSessionStore};
