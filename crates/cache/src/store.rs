//! Feed document store: fetch and write-through for whole serialized feeds.

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::key::FeedKey;
use async_trait::async_trait;
use exn::ResultExt;
use time::{Duration, OffsetDateTime};
use tracing::debug;

/// A cached feed document and when it was stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedFeed {
    pub document: String,
    pub cached_at: OffsetDateTime,
}

impl CachedFeed {
    /// Whether the document is still fresh under the caller's age policy.
    pub fn fresh_within(&self, max_age: Duration) -> bool {
        OffsetDateTime::now_utc() - self.cached_at <= max_age
    }
}

/// Store for whole feed documents.
///
/// Semantics are fetch-or-regenerate-and-store, driven by the feed engine:
/// `get` then decide freshness, regenerate on miss, `put` on the way out.
/// No locking; two requests racing on the same key both regenerate and the
/// last writer wins, which is harmless because generation is a pure
/// function of current catalog state.
#[async_trait]
pub trait FeedStore: Send + Sync {
    async fn get(&self, key: &FeedKey) -> Result<Option<CachedFeed>>;

    async fn put(&self, key: &FeedKey, document: &str) -> Result<()>;

    /// Drop every cached feed for a worklist, whatever its facets,
    /// pagination or kind. Called when lane configuration changes.
    async fn invalidate_worklist(&self, worklist: &str) -> Result<()>;
}

/// SQLite-backed [`FeedStore`].
#[derive(Debug, Clone)]
pub struct SqliteFeedStore {
    pool: sqlx::SqlitePool,
}

impl From<&Database> for SqliteFeedStore {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }
}

#[async_trait]
impl FeedStore for SqliteFeedStore {
    async fn get(&self, key: &FeedKey) -> Result<Option<CachedFeed>> {
        let row: Option<(String, i64)> = sqlx::query_as(include_str!("../queries/get_feed.sql"))
            .bind(key.digest())
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        let Some((document, cached_at)) = row else {
            debug!(key = %key.canonical(), "feed cache miss");
            return Ok(None);
        };
        let cached_at = OffsetDateTime::from_unix_timestamp(cached_at)
            .or_raise(|| ErrorKind::InvalidData("cached_at"))?;
        debug!(key = %key.canonical(), "feed cache hit");
        Ok(Some(CachedFeed { document, cached_at }))
    }

    async fn put(&self, key: &FeedKey, document: &str) -> Result<()> {
        sqlx::query(include_str!("../queries/upsert_feed.sql"))
            .bind(key.digest())
            .bind(&key.worklist)
            .bind(key.kind.as_str())
            .bind(&key.facets)
            .bind(&key.pagination)
            .bind(document)
            .bind(OffsetDateTime::now_utc().unix_timestamp())
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(())
    }

    async fn invalidate_worklist(&self, worklist: &str) -> Result<()> {
        sqlx::query(include_str!("../queries/invalidate_worklist.sql"))
            .bind(worklist)
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(())
    }
}

/// In-memory [`FeedStore`] for tests.
#[cfg(any(test, feature = "mock"))]
#[derive(Debug, Default)]
pub struct MemoryFeedStore {
    feeds: std::sync::Mutex<std::collections::HashMap<String, (FeedKey, CachedFeed)>>,
}

#[cfg(any(test, feature = "mock"))]
impl MemoryFeedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.feeds.lock().expect("feed store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(any(test, feature = "mock"))]
#[async_trait]
impl FeedStore for MemoryFeedStore {
    async fn get(&self, key: &FeedKey) -> Result<Option<CachedFeed>> {
        let feeds = self.feeds.lock().expect("feed store lock poisoned");
        Ok(feeds.get(&key.digest()).map(|(_, cached)| cached.clone()))
    }

    async fn put(&self, key: &FeedKey, document: &str) -> Result<()> {
        let cached = CachedFeed {
            document: document.to_string(),
            cached_at: OffsetDateTime::now_utc(),
        };
        let mut feeds = self.feeds.lock().expect("feed store lock poisoned");
        feeds.insert(key.digest(), (key.clone(), cached));
        Ok(())
    }

    async fn invalidate_worklist(&self, worklist: &str) -> Result<()> {
        let mut feeds = self.feeds.lock().expect("feed store lock poisoned");
        feeds.retain(|_, (key, _)| key.worklist != worklist);
        Ok(())
    }
}
