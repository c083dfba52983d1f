//! The repository seam between lane criteria and the backing database.

use crate::error::Result;
use crate::lane::Lane;
use crate::work::Work;
use async_trait::async_trait;
use folio_facets::{Facets, Pagination};

/// One window of an ordered result set, with the total the window was cut
/// from so pagination links can be derived.
#[derive(Debug, Clone)]
pub struct Page {
    pub works: Vec<Work>,
    pub total: usize,
}

/// Repository interface the feed engine queries through.
///
/// Implementations own all query construction: lane criteria, facet
/// filtering and ordering, suppression rules and the pagination window are
/// applied behind this trait. The feed engine never sees a query, only
/// ordered works.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// One page of the lane's works under the given view.
    ///
    /// Ordering follows `facets.order()`; the entry point and availability
    /// filters are applied; works whose only pools are suppressed or
    /// superseded are excluded (works with no pools at all are kept, and
    /// degrade to message entries downstream).
    async fn page(&self, lane: &Lane, facets: &Facets, pagination: &Pagination) -> Result<Page>;

    /// Up to `limit` of the lane's best works, for grouped feeds.
    async fn featured(&self, lane: &Lane, limit: usize) -> Result<Vec<Work>>;

    /// Works with a suppressed, non-superseded pool. Admin-only; the
    /// complement of the suppression rule `page` applies.
    async fn suppressed(&self, pagination: &Pagination) -> Result<Page>;

    /// Full-catalog search by title or contributor.
    async fn search(&self, query: &str, pagination: &Pagination) -> Result<Page>;
}
