use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Cache miss: {0}")]
    CacheMiss(String),
}

/// Multi-tier cache manager
///
/// Implements L1 (in-memory) and optional L2 (Redis) caching.
/// L1 is fastest but limited in size, L2 is shared across instances.
pub struct CacheManager {
    // Store ConnectionManager in a Mutex for interior mutability
    redis: Option<Arc<tokio::sync::Mutex<ConnectionManager>>>,
    l1_cache: moka::future::Cache<String, Vec<u8>>,
    ttl_secs: u64,
}

impl CacheManager {
    /// Create a new cache manager backed by Redis
    pub async fn new(redis_url: &str, l1_size: u64, ttl_secs: u64) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let redis = ConnectionManager::new(client).await?;

        Ok(Self {
            redis: Some(Arc::new(tokio::sync::Mutex::new(redis))),
            ..Self::in_memory(l1_size, ttl_secs)
        })
    }

    /// Create a cache manager with only the in-process tier
    pub fn in_memory(l1_size: u64, ttl_secs: u64) -> Self {
        let l1_cache = moka::future::CacheBuilder::new(l1_size)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self {
            redis: None,
            l1_cache,
            ttl_secs,
        }
    }

    /// Get a value from cache (L1 first, then L2)
    pub async fn get<T>(&self, key: &str) -> Result<T, CacheError>
    where
        T: for<'de> Deserialize<'de>,
    {
        // Try L1 cache first
        if let Some(bytes) = self.l1_cache.get(key).await {
            tracing::trace!("L1 cache hit: {}", key);
            return Ok(serde_json::from_slice(&bytes)?);
        }

        let Some(redis) = &self.redis else {
            tracing::trace!("Cache miss: {}", key);
            return Err(CacheError::CacheMiss(key.to_string()));
        };

        // Try L2 cache (Redis)
        let mut conn = redis.lock().await;
        let value: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut *conn)
            .await?;
        drop(conn);

        if let Some(json) = value {
            tracing::trace!("L2 cache hit: {}", key);

            // Populate L1 cache
            let bytes = json.as_bytes().to_vec();
            self.l1_cache.insert(key.to_string(), bytes).await;

            return Ok(serde_json::from_str(&json)?);
        }

        tracing::trace!("Cache miss: {}", key);
        Err(CacheError::CacheMiss(key.to_string()))
    }

    /// Set a value in cache (both L1 and L2)
    pub async fn set<T>(&self, key: &str, value: &T) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let json = serde_json::to_string(value)?;

        // Set in L1 cache (uses configured TTL)
        let bytes = json.as_bytes().to_vec();
        self.l1_cache.insert(key.to_string(), bytes).await;

        // Set in L2 cache with explicit TTL
        if let Some(redis) = &self.redis {
            let mut conn = redis.lock().await;
            let _: () = redis::cmd("SETEX")
                .arg(key)
                .arg(self.ttl_secs)
                .arg(json)
                .query_async(&mut *conn)
                .await?;
        }

        tracing::trace!("Cache set: {}", key);
        Ok(())
    }

    /// Whether the shared Redis tier is connected
    pub fn is_shared(&self) -> bool {
        self.redis.is_some()
    }
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Build a cache key for a geocoded address
    ///
    /// Addresses differing only in case or spacing share a key.
    pub fn geocode(address: &str) -> String {
        let normalized = address
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        format!("geocode:{}", normalized)
    }
}
