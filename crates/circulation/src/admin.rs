//! Staff-facing annotator and the suppressed-pool listing.

use crate::router::Router;
use exn::ResultExt;
use folio_cache::Verbosity;
use folio_facets::{Facets, Pagination};
use folio_model::{Catalog, Identifier, LaneSummary, LicensePool, Work};
use folio_opds::error::{ErrorKind, Result};
use folio_opds::{
    AcquisitionFeed, Annotator, AtomXml, Category, FeedResponse, RatingTag, SessionCache,
    VerboseAnnotator, WorkEntryContext, base, ns,
};

/// Annotator for the staff interface: the verbose entry body plus edit and
/// suppress/unsuppress links.
///
/// Always reports itself as personalized. Admin output embeds staff-only
/// links and suppressed pools, and must never be written into the shared
/// feed store where a patron-facing request could pick it up.
pub struct AdminAnnotator {
    router: Router,
}

impl AdminAnnotator {
    pub fn new(router: Router) -> Self {
        Self { router }
    }
}

impl Annotator for AdminAnnotator {
    fn verbosity(&self) -> Verbosity {
        Verbosity::Verbose
    }

    fn is_personalized(&self) -> bool {
        true
    }

    fn permalink_for(&self, identifier: &Identifier) -> Option<String> {
        Some(self.router.permalink(identifier))
    }

    fn feed_url(&self, lane: &LaneSummary, facets: &Facets, pagination: &Pagination) -> Option<String> {
        Some(self.router.feed_url(lane, facets, pagination))
    }

    fn groups_url(&self, lane: Option<&LaneSummary>) -> Option<String> {
        Some(self.router.groups_url(lane))
    }

    fn search_url(&self, lane: &LaneSummary) -> Option<String> {
        Some(self.router.search_url(lane))
    }

    /// Staff see suppressed pools; a suppressed (but not superseded) pool
    /// wins over the normal resolution so its entry offers the restore
    /// link.
    fn active_licensepool_for<'a>(&self, work: &'a Work) -> Option<&'a LicensePool> {
        work.license_pools
            .iter()
            .find(|pool| pool.suppressed && !pool.superseded)
            .or_else(|| work.active_license_pool())
    }

    fn categories(&self, work: &Work) -> Vec<Category> {
        base::categories(work, true)
    }

    fn ratings(&self, work: &Work) -> Vec<RatingTag> {
        VerboseAnnotator.ratings(work)
    }

    fn annotate_work_entry(
        &self,
        ctx: &WorkEntryContext<'_>,
        _session: &SessionCache,
        xml: &mut AtomXml,
    ) -> Result<()> {
        base::annotate_work_entry(self, ctx, xml)?;
        xml.empty(
            "link",
            &[("rel", ns::rel::EDIT), ("href", &self.router.edit_url(ctx.identifier))],
        )?;
        if let Some(pool) = ctx.pool {
            if pool.suppressed {
                xml.empty(
                    "link",
                    &[("rel", ns::rel::RESTORE), ("href", &self.router.unsuppress_url(ctx.identifier))],
                )?;
            } else {
                xml.empty(
                    "link",
                    &[("rel", ns::rel::HIDE), ("href", &self.router.suppress_url(ctx.identifier))],
                )?;
            }
        }
        Ok(())
    }
}

/// The staff listing of works whose pools have been suppressed. Backed by
/// the dedicated catalog query, since normal lane queries exclude
/// suppressed pools by definition.
pub async fn suppressed_feed(
    catalog: &dyn Catalog,
    annotator: &AdminAnnotator,
    pagination: &Pagination,
) -> Result<FeedResponse> {
    let page = catalog.suppressed(pagination).await.or_raise(|| ErrorKind::Catalog)?;
    AcquisitionFeed::new(catalog, annotator)
        .from_works("Suppressed Books", None, &page.works)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotator::CirculationAnnotator;
    use crate::api::CirculationRegistry;
    use folio_model::{
        DataSource, DeliveryMechanism, Edition, Lane, LaneId, MemoryCatalog, WorkId, media_types,
    };

    fn make_test_work(id: u64, suppressed: bool) -> Work {
        let identifier = Identifier::isbn(format!("978000000{id:04}"));
        let edition =
            Edition::new(identifier.clone(), DataSource::new("Overdrive"), format!("Work {id}"));
        let mut pool = LicensePool::new(identifier, DataSource::new("Overdrive"));
        pool.licenses_owned = 1;
        pool.licenses_available = 1;
        pool.suppressed = suppressed;
        pool.delivery_mechanisms = vec![DeliveryMechanism::new(1, media_types::EPUB, None)];
        let mut work = Work::new(WorkId(id), edition);
        work.license_pools = vec![pool];
        work
    }

    #[tokio::test]
    async fn test_suppressed_work_is_staff_only() {
        let catalog =
            MemoryCatalog::new(vec![make_test_work(1, true), make_test_work(2, false)]);
        let admin = AdminAnnotator::new(Router::new("https://circ.example"));

        let staff = suppressed_feed(&catalog, &admin, &Pagination::default()).await.unwrap();
        assert!(staff.document.contains("Work 1"));
        assert!(!staff.document.contains("Work 2"));
        assert!(staff.private);

        let patron_side = CirculationAnnotator::new(
            Router::new("https://circ.example"),
            CirculationRegistry::new(),
        );
        let lane = Lane::new(LaneId(1), "Everything");
        let page = AcquisitionFeed::new(&catalog, &patron_side)
            .page(&lane, &Facets::default(), &Pagination::default())
            .await
            .unwrap();
        assert!(!page.document.contains("Work 1"));
        assert!(page.document.contains("Work 2"));
    }

    #[tokio::test]
    async fn test_admin_entry_carries_edit_and_suppression_links() {
        let visible = make_test_work(3, false);
        let hidden = make_test_work(4, true);
        let admin = AdminAnnotator::new(Router::new("https://circ.example"));
        let catalog = MemoryCatalog::new(Vec::new());

        let feed = AcquisitionFeed::new(&catalog, &admin);
        let entry = feed.single_entry(&visible).await.unwrap();
        assert!(entry.document.contains("rel=\"edit\""));
        assert!(entry.document.contains("rel=\"http://librarysimplified.org/terms/rel/hide\""));
        assert!(entry.document.contains("/admin/works/urn:isbn:9780000000003/suppress\""));

        let entry = feed.single_entry(&hidden).await.unwrap();
        assert!(entry.document.contains("rel=\"http://librarysimplified.org/terms/rel/restore\""));
        assert!(entry.document.contains("/admin/works/urn:isbn:9780000000004/unsuppress\""));
    }

    #[tokio::test]
    async fn test_admin_entries_are_verbose() {
        let mut work = make_test_work(5, false);
        work.quality = Some(0.75);
        let admin = AdminAnnotator::new(Router::new("https://circ.example"));
        let catalog = MemoryCatalog::new(Vec::new());
        let entry = AcquisitionFeed::new(&catalog, &admin).single_entry(&work).await.unwrap();
        assert!(entry.document.contains("schema:ratingValue=\"0.75\""));
    }
}
