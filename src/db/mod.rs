pub mod cache;
pub mod memory;
pub mod postgres;
pub mod redis;
pub mod store;

pub use cache::{Cache, CacheBackend, CacheKey};
pub use memory::{MemoryCache, MemoryStore};
pub use postgres::{create_pool, run_migrations, PgStore};
pub use self::redis::{create_redis_client, CacheWriterHandle, RedisCache};
pub use store::InteractionStore;

#[cfg(test)]
pub use store::MockInteractionStore;
