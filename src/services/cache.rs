use moka::Expiry;
use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
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

/// Kind of record held in the cache; each kind has its own lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Profile,
    Job,
    History,
}

impl RecordKind {
    fn prefix(self) -> &'static str {
        match self {
            RecordKind::Profile => "profile",
            RecordKind::Job => "job",
            RecordKind::History => "history",
        }
    }
}

/// Key of a cached record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
    kind: RecordKind,
    id: String,
}

impl CacheKey {
    /// An account profile
    pub fn profile(user_id: &str) -> Self {
        Self { kind: RecordKind::Profile, id: user_id.to_string() }
    }

    /// A job posting
    pub fn job(job_id: &str) -> Self {
        Self { kind: RecordKind::Job, id: job_id.to_string() }
    }

    /// A seeker's applications and recent searches
    pub fn history(seeker_id: &str) -> Self {
        Self { kind: RecordKind::History, id: seeker_id.to_string() }
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.prefix(), self.id)
    }
}

/// Record lifetimes. History changes with every application or search, so
/// it is kept for less time than profiles and postings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtl {
    pub records: Duration,
    pub history: Duration,
}

impl CacheTtl {
    pub fn for_kind(&self, kind: RecordKind) -> Duration {
        match kind {
            RecordKind::Profile | RecordKind::Job => self.records,
            RecordKind::History => self.history,
        }
    }
}

impl Default for CacheTtl {
    fn default() -> Self {
        Self {
            records: Duration::from_secs(300),
            history: Duration::from_secs(60),
        }
    }
}

#[derive(Clone)]
struct CachedRecord {
    json: Arc<str>,
    ttl: Duration,
}

struct RecordExpiry;

impl Expiry<String, CachedRecord> for RecordExpiry {
    fn expire_after_create(&self, _key: &String, value: &CachedRecord, _created_at: Instant) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Two-tier record cache
///
/// L1 is an in-process moka cache, L2 is Redis shared across instances.
/// Without Redis the cache runs on L1 alone.
/// Only fetched records (profiles, jobs, seeker history) are cached;
/// ranked results are always recomputed.
pub struct CacheManager {
    redis: Option<Arc<tokio::sync::Mutex<ConnectionManager>>>,
    l1_cache: moka::future::Cache<String, CachedRecord>,
    ttl: CacheTtl,
}

impl CacheManager {
    /// Create a cache backed by Redis
    pub async fn new(redis_url: &str, l1_size: u64, ttl: CacheTtl) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let redis = redis::aio::ConnectionManager::new(client).await?;

        Ok(Self {
            redis: Some(Arc::new(tokio::sync::Mutex::new(redis))),
            ..Self::local(l1_size, ttl)
        })
    }

    /// Create an in-process cache with no shared tier
    pub fn local(l1_size: u64, ttl: CacheTtl) -> Self {
        let l1_cache = moka::future::CacheBuilder::new(l1_size)
            .expire_after(RecordExpiry)
            .build();

        Self {
            redis: None,
            l1_cache,
            ttl,
        }
    }

    /// Read a record (L1 first, then L2)
    pub async fn get<T>(&self, key: &CacheKey) -> Result<T, CacheError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let name = key.to_string();

        if let Some(record) = self.l1_cache.get(&name).await {
            tracing::trace!("L1 cache hit: {}", name);
            return Ok(serde_json::from_str(&record.json)?);
        }

        let Some(redis) = &self.redis else {
            return Err(CacheError::CacheMiss(name));
        };

        let value: Option<String> = {
            let mut conn = redis.lock().await;
            redis::cmd("GET").arg(&name).query_async(&mut *conn).await?
        };

        match value {
            Some(json) => {
                tracing::trace!("L2 cache hit: {}", name);
                let parsed = serde_json::from_str(&json)?;
                self.insert_local(key, name, json.into()).await;
                Ok(parsed)
            }
            None => {
                tracing::trace!("Cache miss: {}", name);
                Err(CacheError::CacheMiss(name))
            }
        }
    }

    /// Store a record in both tiers with its kind's lifetime
    pub async fn set<T>(&self, key: &CacheKey, value: &T) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let name = key.to_string();
        let json: Arc<str> = serde_json::to_string(value)?.into();

        self.insert_local(key, name.clone(), json.clone()).await;

        if let Some(redis) = &self.redis {
            let mut conn = redis.lock().await;
            redis::cmd("SETEX")
                .arg(&name)
                .arg(self.ttl.for_kind(key.kind()).as_secs().max(1))
                .arg(json.as_ref())
                .query_async::<()>(&mut *conn)
                .await?;
        }

        tracing::trace!("Cache set: {}", name);
        Ok(())
    }

    /// Drop a record from both tiers
    pub async fn delete(&self, key: &CacheKey) -> Result<(), CacheError> {
        let name = key.to_string();
        self.l1_cache.invalidate(&name).await;

        if let Some(redis) = &self.redis {
            let mut conn = redis.lock().await;
            redis::cmd("DEL").arg(&name).query_async::<()>(&mut *conn).await?;
        }
        Ok(())
    }

    /// Cached value, or the result of `fetch` which is then cached.
    ///
    /// Cache failures are logged and never fail the lookup.
    pub async fn get_or_fetch<T, E, F, Fut>(&self, key: &CacheKey, fetch: F) -> Result<T, E>
    where
        T: Serialize + for<'de> Deserialize<'de>,
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
    {
        match self.get::<T>(key).await {
            Ok(value) => return Ok(value),
            Err(CacheError::CacheMiss(_)) => {}
            Err(e) => tracing::warn!("Cache read failed for {}: {}", key, e),
        }

        let value = fetch().await?;
        if let Err(e) = self.set(key, &value).await {
            tracing::warn!("Cache write failed for {}: {}", key, e);
        }
        Ok(value)
    }

    async fn insert_local(&self, key: &CacheKey, name: String, json: Arc<str>) {
        let record = CachedRecord {
            json,
            ttl: self.ttl.for_kind(key.kind()),
        };
        self.l1_cache.insert(name, record).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "Requires Redis"]
    async fn test_cache_set_get_redis() {
        let cache = CacheManager::new("redis://127.0.0.1:6379", 1000, CacheTtl::default())
            .await
            .expect("Failed to create cache");

        let key = CacheKey::job("test-job");
        cache.set(&key, &"value").await.unwrap();
        let result: String = cache.get(&key).await.unwrap();
        assert_eq!(result, "value");

        cache.delete(&key).await.unwrap();
        assert!(cache.get::<String>(&key).await.is_err());
    }

    #[tokio::test]
    async fn test_local_cache_roundtrip_and_delete() {
        let cache = CacheManager::local(100, CacheTtl::default());
        let key = CacheKey::profile("user-1");

        assert!(matches!(cache.get::<String>(&key).await, Err(CacheError::CacheMiss(_))));

        cache.set(&key, &vec!["a".to_string()]).await.unwrap();
        let value: Vec<String> = cache.get(&key).await.unwrap();
        assert_eq!(value, vec!["a"]);

        cache.delete(&key).await.unwrap();
        assert!(cache.get::<Vec<String>>(&key).await.is_err());
    }

    #[tokio::test]
    async fn test_history_expires_before_records() {
        let ttl = CacheTtl {
            records: Duration::from_secs(60),
            history: Duration::from_millis(50),
        };
        let cache = CacheManager::local(100, ttl);

        cache.set(&CacheKey::job("j1"), &1u32).await.unwrap();
        cache.set(&CacheKey::history("s1"), &2u32).await.unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(cache.get::<u32>(&CacheKey::job("j1")).await.unwrap(), 1);
        assert!(cache.get::<u32>(&CacheKey::history("s1")).await.is_err());
    }

    #[tokio::test]
    async fn test_get_or_fetch_uses_cached_value() {
        let cache = CacheManager::local(100, CacheTtl::default());
        let key = CacheKey::history("s1");

        let first: Result<u32, CacheError> = cache.get_or_fetch(&key, || async { Ok(7) }).await;
        let second: Result<u32, CacheError> = cache.get_or_fetch(&key, || async { Ok(8) }).await;

        assert_eq!(first.unwrap(), 7);
        assert_eq!(second.unwrap(), 7);
    }

    #[test]
    fn test_cache_key_names() {
        assert_eq!(CacheKey::profile("user123").to_string(), "profile:user123");
        assert_eq!(CacheKey::job("job42").to_string(), "job:job42");
        assert_eq!(CacheKey::history("user123").to_string(), "history:user123");
        assert_eq!(CacheKey::history("user123").kind(), RecordKind::History);
    }

    #[test]
    fn test_ttl_per_kind() {
        let ttl = CacheTtl::default();
        assert_eq!(ttl.for_kind(RecordKind::Job), Duration::from_secs(300));
        assert_eq!(ttl.for_kind(RecordKind::History), Duration::from_secs(60));
    }
}
