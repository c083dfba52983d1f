//! The patron-facing annotator: base bibliography plus everything
//! borrowing-related.

use crate::api::CirculationRegistry;
use crate::links::write_acquisition_links;
use crate::router::Router;
use folio_facets::{Facets, Pagination};
use folio_model::{Hold, Identifier, LaneSummary, LicensePool, Loan, Patron, Work, media_types};
use folio_opds::error::Result;
use folio_opds::{Annotator, AtomXml, SessionCache, WorkEntryContext, base};

/// Annotator for patron-facing feeds.
///
/// Without a patron it produces the impersonal view: borrow links shaped
/// by availability counts, no loan or hold state anywhere. With a patron
/// it becomes personalized, which also takes the whole-feed cache out of
/// the loop.
pub struct CirculationAnnotator {
    router: Router,
    registry: CirculationRegistry,
    patron: Option<Patron>,
    loans: Vec<Loan>,
    holds: Vec<Hold>,
    /// Adobe vendor id for `drm:licensor` tags. Absent when the library
    /// has no Adobe-protected collections.
    drm_vendor: Option<String>,
    library_name: String,
}

impl CirculationAnnotator {
    pub fn new(router: Router, registry: CirculationRegistry) -> Self {
        Self {
            router,
            registry,
            patron: None,
            loans: Vec::new(),
            holds: Vec::new(),
            drm_vendor: None,
            library_name: "All Books".to_string(),
        }
    }

    /// The personalized variant: the patron's active loans and holds shape
    /// every acquisition link and license tag.
    pub fn for_patron(
        router: Router,
        registry: CirculationRegistry,
        patron: Patron,
        loans: Vec<Loan>,
        holds: Vec<Hold>,
    ) -> Self {
        Self { patron: Some(patron), loans, holds, ..Self::new(router, registry) }
    }

    pub fn with_drm_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.drm_vendor = Some(vendor.into());
        self
    }

    pub fn with_library_name(mut self, name: impl Into<String>) -> Self {
        self.library_name = name.into();
        self
    }

    fn loan_for(&self, identifier: &Identifier) -> Option<&Loan> {
        self.loans.iter().find(|loan| &loan.identifier == identifier)
    }

    fn hold_for(&self, identifier: &Identifier) -> Option<&Hold> {
        self.holds.iter().find(|hold| &hold.identifier == identifier)
    }

    /// Emit the `drm:licensor` tag carrying the patron's Adobe client
    /// token. Only meaningful when the patron holds a loan on an
    /// Adobe-protected pool; the token is derived once per feed build and
    /// memoized, since every Adobe entry in the feed shares it.
    fn write_licensor(
        &self,
        pool: &LicensePool,
        session: &SessionCache,
        xml: &mut AtomXml,
    ) -> Result<()> {
        let (Some(vendor), Some(patron)) = (&self.drm_vendor, &self.patron) else {
            return Ok(());
        };
        let adobe = pool
            .delivery_mechanisms
            .iter()
            .any(|m| m.drm_scheme.as_deref() == Some(media_types::ADOBE_DRM));
        if !adobe {
            return Ok(());
        }
        let Some(authorization) = &patron.authorization_identifier else {
            return Ok(());
        };
        let token = session.memoize(&format!("drm-client-token:{}", patron.id), || {
            format!("{vendor}|{authorization}")
        });
        xml.open("drm:licensor", &[("drm:vendor", vendor)])?;
        xml.text_element("drm:clientToken", &[], &token)?;
        xml.close("drm:licensor")
    }
}

impl Annotator for CirculationAnnotator {
    fn is_personalized(&self) -> bool {
        self.patron.is_some()
    }

    fn top_level_title(&self) -> String {
        self.library_name.clone()
    }

    fn patron_root_lane(&self) -> Option<LaneSummary> {
        self.patron.as_ref().and_then(|patron| patron.root_lane.clone())
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

    /// The pool tied to one of this patron's loans or holds wins over the
    /// default resolution, so a borrowed copy from a secondary collection
    /// is the one the entry describes.
    fn active_licensepool_for<'a>(&self, work: &'a Work) -> Option<&'a LicensePool> {
        work.license_pools
            .iter()
            .filter(|pool| pool.usable())
            .find(|pool| {
                self.loan_for(&pool.identifier).is_some() || self.hold_for(&pool.identifier).is_some()
            })
            .or_else(|| work.active_license_pool())
    }

    fn cover_links(&self, work: &Work) -> (Vec<String>, Vec<String>) {
        let (thumbnails, fulls) = base::cover_links(work);
        let rewrite = |urls: Vec<String>| urls.iter().map(|url| self.router.rewrite_cdn(url)).collect();
        (rewrite(thumbnails), rewrite(fulls))
    }

    fn annotate_work_entry(
        &self,
        ctx: &WorkEntryContext<'_>,
        session: &SessionCache,
        xml: &mut AtomXml,
    ) -> Result<()> {
        base::annotate_work_entry(self, ctx, xml)?;
        let Some(pool) = ctx.pool else {
            return Ok(());
        };
        let api = self.registry.api_for_license_pool(pool);
        let loan = self.loan_for(ctx.identifier);
        let hold = self.hold_for(ctx.identifier);
        write_acquisition_links(xml, &self.router, api, pool, ctx.identifier, loan, hold)?;
        if loan.is_some() {
            self.write_licensor(pool, session, xml)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_cache::MemoryFeedStore;
    use folio_model::{DataSource, DeliveryMechanism, Edition, Lane, LaneId, MemoryCatalog, WorkId};
    use folio_opds::AcquisitionFeed;
    use time::OffsetDateTime;

    fn make_test_work(id: u64, owned: u32, available: u32) -> Work {
        let identifier = Identifier::isbn(format!("978000000{id:04}"));
        let edition =
            Edition::new(identifier.clone(), DataSource::new("Overdrive"), format!("Work {id}"));
        let mut pool = LicensePool::new(identifier, DataSource::new("Overdrive"));
        pool.licenses_owned = owned;
        pool.licenses_available = available;
        pool.delivery_mechanisms =
            vec![DeliveryMechanism::new(1, media_types::EPUB, Some(media_types::ADOBE_DRM))];
        let mut work = Work::new(WorkId(id), edition);
        work.license_pools = vec![pool];
        work
    }

    fn make_test_annotator() -> CirculationAnnotator {
        CirculationAnnotator::new(Router::new("https://circ.example"), CirculationRegistry::new())
    }

    fn make_patron_annotator(work: &Work, with_loan: bool) -> CirculationAnnotator {
        let identifier = work.license_pools[0].identifier.clone();
        let mut patron = Patron::new(7);
        patron.authorization_identifier = Some("CARD-1234".to_string());
        let loans = with_loan
            .then(|| vec![Loan::new(identifier, OffsetDateTime::UNIX_EPOCH)])
            .unwrap_or_default();
        CirculationAnnotator::for_patron(
            Router::new("https://circ.example"),
            CirculationRegistry::new(),
            patron,
            loans,
            Vec::new(),
        )
    }

    #[tokio::test]
    async fn test_impersonal_feed_carries_borrow_links() {
        let work = make_test_work(1, 5, 5);
        let catalog = MemoryCatalog::new(vec![work]);
        let lane = Lane::new(LaneId(1), "Fiction");
        let annotator = make_test_annotator();
        let feed = AcquisitionFeed::new(&catalog, &annotator);
        let response =
            feed.page(&lane, &Facets::default(), &Pagination::default()).await.unwrap();

        assert!(response.document.contains("rel=\"http://opds-spec.org/acquisition/borrow\""));
        assert!(response.document.contains("<opds:availability status=\"available\"/>"));
        assert!(!response.document.contains("revoke"));
        assert!(!response.private);
    }

    #[tokio::test]
    async fn test_loan_produces_fulfill_revoke_and_licensor() {
        let work = make_test_work(2, 5, 5);
        let annotator = make_patron_annotator(&work, true).with_drm_vendor("VENDORID");
        let catalog = MemoryCatalog::new(vec![work]);
        let lane = Lane::new(LaneId(1), "Fiction");
        let feed = AcquisitionFeed::new(&catalog, &annotator);
        let response =
            feed.page(&lane, &Facets::default(), &Pagination::default()).await.unwrap();

        assert!(response.document.contains("rel=\"http://opds-spec.org/acquisition\""));
        assert!(response.document.contains("/fulfill/1\""));
        assert!(response.document.contains("rel=\"http://librarysimplified.org/terms/rel/revoke\""));
        assert!(response.document.contains("<drm:licensor drm:vendor=\"VENDORID\">"));
        assert!(response.document.contains("<drm:clientToken>VENDORID|CARD-1234</drm:clientToken>"));
        assert!(response.private);
    }

    #[tokio::test]
    async fn test_personalized_feed_bypasses_the_shared_store() {
        let work = make_test_work(3, 5, 5);
        let annotator = make_patron_annotator(&work, true);
        let catalog = MemoryCatalog::new(vec![work]);
        let lane = Lane::new(LaneId(1), "Fiction");
        let store = MemoryFeedStore::new();
        let feed = AcquisitionFeed::new(&catalog, &annotator).with_feed_store(&store);
        feed.page(&lane, &Facets::default(), &Pagination::default()).await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_patron_pool_preference() {
        let mut work = make_test_work(4, 5, 5);
        // A second pool, open access, which the impersonal resolution
        // would prefer.
        let open = LicensePool::open_access(
            Identifier::isbn("9780000009998"),
            DataSource::new("Gutenberg"),
        );
        work.license_pools.push(open);
        let annotator = make_patron_annotator(&work, true);

        let active = annotator.active_licensepool_for(&work).unwrap();
        assert_eq!(active.data_source.name, "Overdrive");
        assert_eq!(
            make_test_annotator().active_licensepool_for(&work).unwrap().data_source.name,
            "Gutenberg",
        );
    }

    #[tokio::test]
    async fn test_unfulfillable_work_degrades_to_message_entry() {
        let mut work = make_test_work(5, 5, 5);
        work.license_pools[0].delivery_mechanisms =
            vec![DeliveryMechanism::opaque(1, media_types::FINDAWAY_DRM)];
        let urn = work.license_pools[0].identifier.urn();
        let annotator = make_test_annotator();
        let catalog = MemoryCatalog::new(vec![work.clone()]);
        let lane = Lane::new(LaneId(1), "Fiction");
        let feed = AcquisitionFeed::new(&catalog, &annotator);

        let page = feed.page(&lane, &Facets::default(), &Pagination::default()).await.unwrap();
        assert!(page.document.contains("<simplified:message>"));
        assert!(page.document.contains("<simplified:status_code>403</simplified:status_code>"));
        assert!(page.document.contains(&urn));

        let entry = feed.single_entry(&work).await.unwrap();
        assert!(entry.document.contains("<simplified:status_code>403</simplified:status_code>"));
        assert!(entry.private);
    }

    #[tokio::test]
    async fn test_hold_state_reaches_license_tags() {
        let work = make_test_work(6, 5, 0);
        let identifier = work.license_pools[0].identifier.clone();
        let mut annotator = make_patron_annotator(&work, false);
        annotator.holds = vec![Hold::new(identifier, OffsetDateTime::UNIX_EPOCH, Some(0))];
        let catalog = MemoryCatalog::new(vec![work]);
        let lane = Lane::new(LaneId(1), "Fiction");
        let feed = AcquisitionFeed::new(&catalog, &annotator);
        let response =
            feed.page(&lane, &Facets::default(), &Pagination::default()).await.unwrap();
        assert!(response.document.contains("status=\"ready\""));
        assert!(response.document.contains("<opds:holds total=\"1\" position=\"0\"/>"));
    }

    #[test]
    fn test_cover_links_are_rewritten_to_the_cdn() {
        let mut work = make_test_work(7, 5, 5);
        let edition = work.presentation_edition.as_mut().unwrap();
        edition.cover_url = Some("https://covers.internal/covers/7/full.jpg".to_string());
        edition.thumbnail_url = Some("https://covers.internal/covers/7/thumb.jpg".to_string());
        let annotator = CirculationAnnotator::new(
            Router::new("https://circ.example").with_cdn("https://cdn.example"),
            CirculationRegistry::new(),
        );
        let (thumbnails, fulls) = annotator.cover_links(&work);
        assert_eq!(thumbnails, vec!["https://cdn.example/covers/7/thumb.jpg"]);
        assert_eq!(fulls, vec!["https://cdn.example/covers/7/full.jpg"]);
    }
}
