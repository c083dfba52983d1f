//! Entry fragment store: the cache-invariant portion of a work's entry.
//!
//! This is the explicit, external replacement for a serialized-entry field
//! on the work row itself: a mapping from (work id, verbosity) to XML,
//! with invalidation as a visible contract. Presentation recalculation
//! calls [`EntryStore::invalidate`]; the feed engine reads and
//! writes through it while building feeds.

use crate::Database;
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use exn::ResultExt;
use time::OffsetDateTime;
use tracing::debug;

/// Which annotator family produced an entry fragment. Simple and verbose
/// fragments differ in content (ratings, exhaustive classifications) and
/// are cached independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verbosity {
    Simple,
    Verbose,
}

impl Verbosity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Verbose => "verbose",
        }
    }
}

/// Store for cache-invariant entry fragments.
#[async_trait]
pub trait EntryStore: Send + Sync {
    async fn get(&self, work_id: u64, verbosity: Verbosity) -> Result<Option<String>>;

    async fn put(&self, work_id: u64, verbosity: Verbosity, document: &str) -> Result<()>;

    /// Drop both fragments for a work. Called whenever the work's
    /// presentation is recalculated.
    async fn invalidate(&self, work_id: u64) -> Result<()>;
}

/// SQLite-backed [`EntryStore`].
#[derive(Debug, Clone)]
pub struct SqliteEntryStore {
    pool: sqlx::SqlitePool,
}

impl From<&Database> for SqliteEntryStore {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }
}

#[async_trait]
impl EntryStore for SqliteEntryStore {
    async fn get(&self, work_id: u64, verbosity: Verbosity) -> Result<Option<String>> {
        let work_id = i64::try_from(work_id).or_raise(|| ErrorKind::InvalidData("work id"))?;
        let document: Option<String> = sqlx::query_scalar(include_str!("../queries/get_entry.sql"))
            .bind(work_id)
            .bind(verbosity.as_str())
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        debug!(work_id, verbosity = verbosity.as_str(), hit = document.is_some(), "entry cache");
        Ok(document)
    }

    async fn put(&self, work_id: u64, verbosity: Verbosity, document: &str) -> Result<()> {
        let work_id = i64::try_from(work_id).or_raise(|| ErrorKind::InvalidData("work id"))?;
        sqlx::query(include_str!("../queries/upsert_entry.sql"))
            .bind(work_id)
            .bind(verbosity.as_str())
            .bind(document)
            .bind(OffsetDateTime::now_utc().unix_timestamp())
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(())
    }

    async fn invalidate(&self, work_id: u64) -> Result<()> {
        let work_id = i64::try_from(work_id).or_raise(|| ErrorKind::InvalidData("work id"))?;
        sqlx::query(include_str!("../queries/invalidate_entries.sql"))
            .bind(work_id)
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(())
    }
}

/// In-memory [`EntryStore`] for tests.
#[cfg(any(test, feature = "mock"))]
#[derive(Debug, Default)]
pub struct MemoryEntryStore {
    entries: std::sync::Mutex<std::collections::HashMap<(u64, Verbosity), String>>,
}

#[cfg(any(test, feature = "mock"))]
impl MemoryEntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("entry store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(any(test, feature = "mock"))]
#[async_trait]
impl EntryStore for MemoryEntryStore {
    async fn get(&self, work_id: u64, verbosity: Verbosity) -> Result<Option<String>> {
        let entries = self.entries.lock().expect("entry store lock poisoned");
        Ok(entries.get(&(work_id, verbosity)).cloned())
    }

    async fn put(&self, work_id: u64, verbosity: Verbosity, document: &str) -> Result<()> {
        let mut entries = self.entries.lock().expect("entry store lock poisoned");
        entries.insert((work_id, verbosity), document.to_string());
        Ok(())
    }

    async fn invalidate(&self, work_id: u64) -> Result<()> {
        let mut entries = self.entries.lock().expect("entry store lock poisoned");
        entries.retain(|(id, _), _| *id != work_id);
        Ok(())
    }
}
