//! SQLite caches for generated OPDS documents.
//!
//! Two caches live here, both read-through/write-through with no locking:
//!
//! - **Feeds**: complete serialized feed documents, keyed by (worklist,
//!   facets, pagination, kind). Only valid for impersonal feeds — the feed
//!   engine never consults this cache when a patron's loan state is in
//!   play, which is what keeps one patron's state out of another's
//!   response.
//! - **Entries**: the cache-invariant portion of a single work's entry,
//!   keyed by (work id, verbosity). Invalidated explicitly whenever a
//!   work's presentation is recalculated.
//!
//! Neither cache is a source of truth: regeneration is a pure function of
//! current database state, so concurrent writers racing on the same key are
//! harmless (last writer wins) and a deleted cache rebuilds itself.

mod db;
mod entry;
pub mod error;
mod key;
mod store;

pub use crate::db::Database;
pub use crate::entry::{EntryStore, SqliteEntryStore, Verbosity};
pub use crate::key::{FeedKey, FeedKind};
pub use crate::store::{CachedFeed, FeedStore, SqliteFeedStore};

#[cfg(any(test, feature = "mock"))]
pub use crate::entry::MemoryEntryStore;
#[cfg(any(test, feature = "mock"))]
pub use crate::store::MemoryFeedStore;
