use std::fmt::Display;
use std::sync::Arc;

use crate::error::{AppError, AppResult};

/// Keys for cached recommendation responses
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Rule-based page for a retailer
    Popular {
        retailer_id: i64,
        limit: i64,
        offset: i64,
    },
    /// Collaborative-filtering result for a retailer
    Similar(i64),
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Popular {
                retailer_id,
                limit,
                offset,
            } => write!(f, "recommendations:{}:{}:{}", retailer_id, limit, offset),
            CacheKey::Similar(retailer_id) => write!(f, "ml_recommendations:{}", retailer_id),
        }
    }
}

/// Raw string storage with per-entry expiry
#[async_trait::async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Queues a write; failures are logged, never returned
    fn set_in_background(&self, key: String, value: String, ttl: u64);
}

/// Typed cache handle shared by request handlers
#[derive(Clone)]
pub struct Cache {
    backend: Arc<dyn CacheBackend>,
}

impl Cache {
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self { backend }
    }

    /// Retrieves a value from the cache by key
    ///
    /// If the key exists in the cache, the value is deserialized and returned.
    /// If the key does not exist, `None` is returned.
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let cached = self.backend.get(&key.to_string()).await?;

        match cached {
            Some(json) => {
                let data = serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Cache deserialization error: {}", e))
                })?;
                tracing::debug!(key = %key, "Cache hit");
                Ok(Some(data))
            }
            None => {
                tracing::debug!(key = %key, "Cache miss");
                Ok(None)
            }
        }
    }

    /// Stores a value in the cache asynchronously without blocking
    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let json = match serde_json::to_string(value) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Cache serialization error");
                return;
            }
        };

        self.backend.set_in_background(key.to_string(), json, ttl);
    }
}
