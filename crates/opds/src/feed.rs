//! The feed orchestrator.
//!
//! [`AcquisitionFeed`] turns a lane plus facets, pagination and an
//! annotator into a complete OPDS document, managing both cache layers on
//! the way: whole-feed documents keyed by (worklist, facets, pagination,
//! kind), and per-work entry fragments keyed by (work id, verbosity).
//!
//! The cache flow per request: look up the feed document (skipped entirely
//! for personalized annotators), on a miss run the catalog query, build
//! each entry from its cached fragment plus the per-request annotations,
//! decorate the feed, and write the document back through the store.

use crate::annotator::{Annotator, GroupLink, WorkEntryContext, rfc3339};
use crate::entry::build_partial_entry;
use crate::error::{ErrorKind, Result};
use crate::message::OpdsMessage;
use crate::ns;
use crate::response::FeedResponse;
use crate::session::SessionCache;
use crate::xml::AtomXml;
use exn::{OptionExt, ResultExt};
use folio_cache::{EntryStore, FeedKey, FeedKind, FeedStore};
use folio_facets::{EntryPoint, Facets, Pagination};
use folio_model::{Edition, Identifier, Lane, LaneSummary, LicensePool, Work};
use time::{Duration, OffsetDateTime};
use tracing::{instrument, warn};

/// Default freshness window for paginated feeds.
const PAGE_MAX_AGE: Duration = Duration::minutes(20);
/// Default freshness window for grouped feeds, which cost one featured
/// query per sublane to rebuild.
const GROUPS_MAX_AGE: Duration = Duration::minutes(40);

/// Builds OPDS documents from a catalog, an annotator and the two cache
/// stores.
///
/// Both stores are optional; without them every request regenerates from
/// the catalog. The annotator decides whether the shared feed cache may be
/// used at all: a personalized annotator's output embeds one patron's loan
/// state and must never be served to another patron, so the store is
/// bypassed in both directions.
pub struct AcquisitionFeed<'a> {
    catalog: &'a dyn folio_model::Catalog,
    annotator: &'a dyn Annotator,
    feed_store: Option<&'a dyn FeedStore>,
    entry_store: Option<&'a dyn EntryStore>,
    force_refresh: bool,
    page_max_age: Duration,
    groups_max_age: Duration,
}

impl<'a> AcquisitionFeed<'a> {
    pub fn new(catalog: &'a dyn folio_model::Catalog, annotator: &'a dyn Annotator) -> Self {
        Self {
            catalog,
            annotator,
            feed_store: None,
            entry_store: None,
            force_refresh: false,
            page_max_age: PAGE_MAX_AGE,
            groups_max_age: GROUPS_MAX_AGE,
        }
    }

    pub fn with_feed_store(mut self, store: &'a dyn FeedStore) -> Self {
        self.feed_store = Some(store);
        self
    }

    pub fn with_entry_store(mut self, store: &'a dyn EntryStore) -> Self {
        self.entry_store = Some(store);
        self
    }

    /// Regenerate everything, ignoring both caches on the read side. The
    /// fresh results are still written back.
    pub fn force_refresh(mut self) -> Self {
        self.force_refresh = true;
        self
    }

    pub fn with_page_max_age(mut self, max_age: Duration) -> Self {
        self.page_max_age = max_age;
        self
    }

    pub fn with_groups_max_age(mut self, max_age: Duration) -> Self {
        self.groups_max_age = max_age;
        self
    }

    /// One page of a lane as a flat acquisition feed.
    #[instrument(skip_all, fields(lane = %lane.slug))]
    pub async fn page(&self, lane: &Lane, facets: &Facets, pagination: &Pagination) -> Result<FeedResponse> {
        let key = FeedKey::new(&lane.slug, FeedKind::Page, facets.query_string(), pagination.query_string());
        if let Some(document) = self.cached_document(&key, self.page_max_age).await? {
            return Ok(FeedResponse::new(document, ns::mime::ACQUISITION_FEED, self.page_max_age, false));
        }

        let page = lane
            .works(self.catalog, facets, pagination)
            .await
            .or_raise(|| ErrorKind::Catalog)?;
        let mut pagination = pagination.clone();
        pagination.page_loaded(page.works.len(), Some(page.total));

        let summary = lane.summary();
        let self_url = self.annotator.feed_url(&summary, facets, &pagination);
        let mut xml = self.open_feed(&lane.display_name, self_url.as_deref())?;
        self.add_pagination_links(&mut xml, &summary, facets, &pagination)?;
        self.add_facet_links(&mut xml, &summary, facets, &pagination)?;
        self.add_entrypoint_links(&mut xml, &summary, facets, &pagination)?;
        self.add_breadcrumbs(&mut xml, lane)?;
        self.annotator.annotate_feed(lane, &mut xml)?;

        let session = SessionCache::new();
        for work in &page.works {
            self.render_entry(&mut xml, work, None, &session).await?;
        }
        xml.close("feed")?;

        let document = xml.into_string()?;
        self.store_document(&key, &document).await?;
        Ok(FeedResponse::new(
            document,
            ns::mime::ACQUISITION_FEED,
            self.page_max_age,
            self.annotator.is_personalized(),
        ))
    }

    /// A lane as a grouped ("featured") feed.
    #[instrument(skip_all, fields(lane = %lane.slug))]
    pub async fn groups(&self, lane: &Lane, facets: &Facets) -> Result<FeedResponse> {
        let key = FeedKey::new(&lane.slug, FeedKind::Groups, facets.query_string(), "");
        if let Some(document) = self.cached_document(&key, self.groups_max_age).await? {
            return Ok(FeedResponse::new(document, ns::mime::ACQUISITION_FEED, self.groups_max_age, false));
        }

        let pairs = lane.groups(self.catalog).await.or_raise(|| ErrorKind::Catalog)?;

        let summary = lane.summary();
        let self_url = self.annotator.groups_url(Some(&summary));
        let mut xml = self.open_feed(&lane.display_name, self_url.as_deref())?;
        self.add_entrypoint_links(&mut xml, &summary, facets, &Pagination::default())?;
        self.add_breadcrumbs(&mut xml, lane)?;
        self.annotator.annotate_feed(lane, &mut xml)?;

        let session = SessionCache::new();
        for (work, group_lane) in &pairs {
            let group = self.group_link(lane, group_lane, facets);
            self.render_entry(&mut xml, work, group.as_ref(), &session).await?;
        }
        xml.close("feed")?;

        let document = xml.into_string()?;
        self.store_document(&key, &document).await?;
        Ok(FeedResponse::new(
            document,
            ns::mime::ACQUISITION_FEED,
            self.groups_max_age,
            self.annotator.is_personalized(),
        ))
    }

    /// A flat feed of search results. Never written to the feed store: the
    /// query space is unbounded, so cached search pages would crowd out
    /// worklist feeds.
    #[instrument(skip_all, fields(query = %query))]
    pub async fn search(&self, lane: &Lane, query: &str, pagination: &Pagination) -> Result<FeedResponse> {
        let page = self
            .catalog
            .search(query, pagination)
            .await
            .or_raise(|| ErrorKind::Catalog)?;
        let mut pagination = pagination.clone();
        pagination.page_loaded(page.works.len(), Some(page.total));

        let title = format!("Search results for \"{query}\"");
        let mut xml = self.open_feed(&title, None)?;
        self.annotator.annotate_feed(lane, &mut xml)?;

        let session = SessionCache::new();
        for work in &page.works {
            self.render_entry(&mut xml, work, None, &session).await?;
        }
        xml.close("feed")?;
        Ok(FeedResponse::new(
            xml.into_string()?,
            ns::mime::ACQUISITION_FEED,
            self.page_max_age,
            self.annotator.is_personalized(),
        ))
    }

    /// A standalone entry document for one work, or a 403 message when the
    /// work cannot be presented or fulfilled.
    ///
    /// Single entries usually describe a personalized or just-mutated
    /// state, so the response is non-cacheable; callers that know better
    /// can override the metadata on the returned [`FeedResponse`].
    #[instrument(skip_all, fields(work = work.id.0))]
    pub async fn single_entry(&self, work: &Work) -> Result<FeedResponse> {
        let session = SessionCache::new();
        let pool = self.annotator.active_licensepool_for(work);
        let edition = work.presentation_edition.as_ref();
        let document = match (pool, edition) {
            (Some(pool), Some(edition)) => {
                let built = self
                    .build_work_entry(work, pool, edition, &pool.identifier, None, &session, true)
                    .await;
                match built {
                    Ok(entry) => entry,
                    Err(err) => match &*err {
                        ErrorKind::Unfulfillable => {
                            self.standalone_message(&OpdsMessage::unfulfillable(&pool.identifier))?
                        },
                        _ => return Err(err),
                    },
                }
            },
            _ => {
                let identifier = work.identifier().ok_or_raise(|| ErrorKind::NoIdentifier)?;
                self.standalone_message(&OpdsMessage::no_license(identifier))?
            },
        };
        Ok(FeedResponse::new(document, ns::mime::ENTRY, Duration::ZERO, true))
    }

    /// An ad hoc feed over an explicit list of works, with no pagination
    /// or facet decoration. Used for staff views like the suppressed-pool
    /// listing.
    pub async fn from_works(&self, title: &str, url: Option<&str>, works: &[Work]) -> Result<FeedResponse> {
        let mut xml = self.open_feed(title, url)?;
        let session = SessionCache::new();
        for work in works {
            self.render_entry(&mut xml, work, None, &session).await?;
        }
        xml.close("feed")?;
        Ok(FeedResponse::new(xml.into_string()?, ns::mime::ACQUISITION_FEED, Duration::ZERO, true))
    }

    async fn cached_document(&self, key: &FeedKey, max_age: Duration) -> Result<Option<String>> {
        if self.annotator.is_personalized() || self.force_refresh {
            return Ok(None);
        }
        let Some(store) = self.feed_store else {
            return Ok(None);
        };
        let cached = store.get(key).await.or_raise(|| ErrorKind::Cache)?;
        Ok(cached.filter(|c| c.fresh_within(max_age)).map(|c| c.document))
    }

    async fn store_document(&self, key: &FeedKey, document: &str) -> Result<()> {
        if self.annotator.is_personalized() {
            return Ok(());
        }
        if let Some(store) = self.feed_store {
            store.put(key, document).await.or_raise(|| ErrorKind::Cache)?;
        }
        Ok(())
    }

    fn open_feed(&self, title: &str, self_url: Option<&str>) -> Result<AtomXml> {
        let mut xml = AtomXml::new();
        xml.declaration()?;
        xml.open("feed", &ns::xmlns::DECLARATIONS)?;
        xml.text_element("id", &[], self_url.unwrap_or(title))?;
        xml.text_element("title", &[], title)?;
        xml.text_element("updated", &[], &rfc3339(OffsetDateTime::now_utc())?)?;
        if let Some(href) = self_url {
            xml.empty(
                "link",
                &[("rel", ns::rel::SELF), ("type", ns::mime::ACQUISITION_FEED), ("href", href)],
            )?;
        }
        Ok(xml)
    }

    fn add_pagination_links(
        &self,
        xml: &mut AtomXml,
        lane: &LaneSummary,
        facets: &Facets,
        pagination: &Pagination,
    ) -> Result<()> {
        let cursors = [
            (ns::rel::NEXT, pagination.next_page()),
            (ns::rel::PREVIOUS, pagination.previous_page()),
            (ns::rel::FIRST, pagination.first_page()),
        ];
        for (relation, cursor) in cursors {
            if let Some(cursor) = cursor
                && let Some(href) = self.annotator.feed_url(lane, facets, &cursor)
            {
                xml.empty(
                    "link",
                    &[("rel", relation), ("type", ns::mime::ACQUISITION_FEED), ("href", &href)],
                )?;
            }
        }
        Ok(())
    }

    fn add_facet_links(
        &self,
        xml: &mut AtomXml,
        lane: &LaneSummary,
        facets: &Facets,
        pagination: &Pagination,
    ) -> Result<()> {
        // Navigating to a different view always restarts at the first page.
        let first_page = Pagination::new(0, pagination.size());
        for facet_link in facets.facet_groups() {
            let Some(href) = self.annotator.feed_url(lane, &facet_link.facets, &first_page) else {
                continue;
            };
            let mut attributes = vec![
                ("rel", ns::rel::FACET),
                ("type", ns::mime::ACQUISITION_FEED),
                ("href", href.as_str()),
                ("title", facet_link.label),
                ("opds:facetGroup", facet_link.group_label),
            ];
            if facet_link.selected {
                attributes.push(("opds:activeFacet", "true"));
            }
            xml.empty("link", &attributes)?;
        }
        Ok(())
    }

    /// Entry-point facet links. A one-member group matching the current
    /// selection carries no information and is omitted entirely.
    fn add_entrypoint_links(
        &self,
        xml: &mut AtomXml,
        lane: &LaneSummary,
        facets: &Facets,
        pagination: &Pagination,
    ) -> Result<()> {
        let enabled = facets.enabled_entry_points();
        if enabled.len() == 1 && enabled[0] == facets.entry_point() {
            return Ok(());
        }
        let first_page = Pagination::new(0, pagination.size());
        for entry_point in enabled {
            let Some(href) = self
                .annotator
                .feed_url(lane, &facets.with_entry_point(*entry_point), &first_page)
            else {
                continue;
            };
            let mut attributes = vec![
                ("rel", ns::rel::FACET),
                ("type", ns::mime::ACQUISITION_FEED),
                ("href", href.as_str()),
                ("title", entry_point.display_name()),
                ("opds:facetGroup", EntryPoint::GROUP_LABEL),
                ("opds:facetGroupType", ns::ENTRYPOINT_FACET_GROUP_TYPE),
            ];
            if *entry_point == facets.entry_point() {
                attributes.push(("opds:activeFacet", "true"));
            }
            xml.empty("link", &attributes)?;
        }
        Ok(())
    }

    /// `simplified:breadcrumbs`: the library root plus the lane's ancestor
    /// chain. For a patron type pinned to a root lane, the chain starts at
    /// that lane and the library root is omitted.
    fn add_breadcrumbs(&self, xml: &mut AtomXml, lane: &Lane) -> Result<()> {
        let patron_root = self.annotator.patron_root_lane();
        let truncate_at = patron_root
            .as_ref()
            .and_then(|root| lane.ancestors.iter().position(|a| a.id == root.id));

        let mut crumbs: Vec<(String, Option<String>)> = Vec::new();
        let visible_ancestors = match truncate_at {
            Some(position) => &lane.ancestors[position..],
            None => {
                crumbs.push((self.annotator.top_level_title(), self.annotator.groups_url(None)));
                &lane.ancestors[..]
            },
        };
        for ancestor in visible_ancestors {
            crumbs.push((ancestor.display_name.clone(), self.annotator.groups_url(Some(ancestor))));
        }

        if crumbs.iter().all(|(_, href)| href.is_none()) {
            return Ok(());
        }
        xml.open("simplified:breadcrumbs", &[])?;
        for (title, href) in crumbs {
            if let Some(href) = href {
                xml.empty("link", &[("title", &title), ("href", &href)])?;
            }
        }
        xml.close("simplified:breadcrumbs")
    }

    /// The group link for one grouped-feed pair. Works featured by the
    /// worklist itself go into a synthetic "All X" group that links to the
    /// *paginated* feed, which is what keeps grouped feeds from nesting
    /// into groups of groups forever.
    fn group_link(&self, lane: &Lane, group_lane: &LaneSummary, facets: &Facets) -> Option<GroupLink> {
        if group_lane.id == lane.id {
            let href = self.annotator.feed_url(group_lane, facets, &Pagination::default())?;
            Some(GroupLink { href, title: format!("All {}", lane.display_name) })
        } else {
            let href = self.annotator.groups_url(Some(group_lane))?;
            Some(GroupLink { href, title: group_lane.display_name.clone() })
        }
    }

    /// Render one work into the feed, degrading to a message entry or
    /// dropping the entry as the error taxonomy dictates.
    async fn render_entry(
        &self,
        feed: &mut AtomXml,
        work: &Work,
        group: Option<&GroupLink>,
        session: &SessionCache,
    ) -> Result<()> {
        if let Some(entry) = self.build_entry(work, group, session).await? {
            feed.raw(&entry);
        }
        Ok(())
    }

    async fn build_entry(
        &self,
        work: &Work,
        group: Option<&GroupLink>,
        session: &SessionCache,
    ) -> Result<Option<String>> {
        let pool = self.annotator.active_licensepool_for(work);
        let edition = work.presentation_edition.as_ref();
        let (Some(pool), Some(edition)) = (pool, edition) else {
            // Known identifier, nothing to present or acquire: a message
            // entry keeps the page's cardinality intact.
            let Some(identifier) = work.identifier() else {
                warn!(work = work.id.0, "dropping work with no identifier");
                return Ok(None);
            };
            let mut xml = AtomXml::new();
            OpdsMessage::no_license(identifier).write(&mut xml)?;
            return Ok(Some(xml.into_string()?));
        };

        let built = self
            .build_work_entry(work, pool, edition, &pool.identifier, group, session, false)
            .await;
        match built {
            Ok(entry) => Ok(Some(entry)),
            Err(err) => match &*err {
                ErrorKind::Unfulfillable => {
                    let mut xml = AtomXml::new();
                    OpdsMessage::unfulfillable(&pool.identifier).write(&mut xml)?;
                    Ok(Some(xml.into_string()?))
                },
                // Cache failures are systemic, not a per-entry condition.
                ErrorKind::Cache => Err(err),
                _ => {
                    warn!(work = work.id.0, error = %err, "dropping entry after build failure");
                    Ok(None)
                },
            },
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn build_work_entry(
        &self,
        work: &Work,
        pool: &LicensePool,
        edition: &Edition,
        identifier: &Identifier,
        group: Option<&GroupLink>,
        session: &SessionCache,
        standalone: bool,
    ) -> Result<String> {
        let verbosity = self.annotator.verbosity();
        let cached = match self.entry_store {
            Some(store) if !self.force_refresh => {
                store.get(work.id.0, verbosity).await.or_raise(|| ErrorKind::Cache)?
            },
            _ => None,
        };
        let partial = match cached {
            Some(partial) => partial,
            None => {
                let partial = build_partial_entry(self.annotator, work, edition, identifier)?;
                if let Some(store) = self.entry_store {
                    store
                        .put(work.id.0, verbosity, &partial)
                        .await
                        .or_raise(|| ErrorKind::Cache)?;
                }
                partial
            },
        };

        let mut xml = AtomXml::new();
        let mut attributes: Vec<(&str, &str)> = Vec::new();
        if standalone {
            xml.declaration()?;
            attributes.extend_from_slice(&ns::xmlns::DECLARATIONS);
        }
        attributes.push(("schema:additionalType", edition.medium.uri()));
        xml.open("entry", &attributes)?;
        xml.raw(&partial);
        let ctx = WorkEntryContext {
            work,
            pool: Some(pool),
            edition,
            identifier,
            group,
            updated: None,
            has_id: partial.contains("<id>"),
        };
        self.annotator.annotate_work_entry(&ctx, session, &mut xml)?;
        xml.close("entry")?;
        xml.into_string()
    }

    fn standalone_message(&self, message: &OpdsMessage) -> Result<String> {
        let mut xml = AtomXml::new();
        xml.declaration()?;
        message.write_with_attributes(&mut xml, &ns::xmlns::DECLARATIONS)?;
        xml.into_string()
    }
}
