//! In-memory [`Catalog`] implementation.
//!
//! Implements the full query semantics of the trait against a plain vector
//! of works. Intended for other crates' dev-dependencies (via the `mock`
//! feature) and for this crate's own tests; a production deployment backs
//! the trait with a real database instead.

use crate::catalog::{Catalog, Page};
use crate::error::Result;
use crate::lane::Lane;
use crate::work::Work;
use async_trait::async_trait;
use folio_facets::{Availability, EntryPoint, Facets, Order, Pagination};

#[derive(Debug, Default)]
pub struct MemoryCatalog {
    works: Vec<Work>,
}

impl MemoryCatalog {
    pub fn new(works: Vec<Work>) -> Self {
        Self { works }
    }

    pub fn add(&mut self, work: Work) {
        self.works.push(work);
    }

    fn matches_lane(lane: &Lane, work: &Work) -> bool {
        let edition = work.presentation_edition.as_ref();
        if !lane.languages.is_empty() {
            let language = edition.and_then(|e| e.language.as_deref());
            if !language.is_some_and(|l| lane.languages.iter().any(|wanted| wanted == l)) {
                return false;
            }
        }
        if !lane.audiences.is_empty() && !work.audience.is_some_and(|a| lane.audiences.contains(&a)) {
            return false;
        }
        if let Some(fiction) = lane.fiction
            && work.fiction != Some(fiction)
        {
            return false;
        }
        if !lane.genres.is_empty() && !work.genres.iter().any(|g| lane.genres.contains(&g.name)) {
            return false;
        }
        if !lane.custom_list_ids.is_empty()
            && !work.custom_list_ids.iter().any(|id| lane.custom_list_ids.contains(id))
        {
            return false;
        }
        true
    }

    fn matches_entry_point(entry_point: EntryPoint, work: &Work) -> bool {
        let Some(edition) = work.presentation_edition.as_ref() else {
            // No presentation means no medium to filter on; keep the work
            // so it can degrade to a message entry downstream.
            return true;
        };
        match entry_point {
            EntryPoint::Everything => true,
            EntryPoint::Ebooks => edition.medium == crate::Medium::Book,
            EntryPoint::Audiobooks => edition.medium == crate::Medium::Audio,
        }
    }

    fn matches_availability(availability: Availability, work: &Work) -> bool {
        match availability {
            Availability::All => true,
            Availability::Now => work
                .active_license_pool()
                .is_some_and(|p| p.unlimited() || p.licenses_available > 0),
            Availability::Always => work
                .license_pools
                .iter()
                .any(|p| p.usable() && p.open_access),
        }
    }

    /// The normal-listing visibility rule: suppressed/superseded pools are
    /// excluded, so a work all of whose pools are unusable disappears. A
    /// work with no pools at all stays (known identifier, no license).
    fn visible(work: &Work) -> bool {
        work.license_pools.is_empty() || work.license_pools.iter().any(|p| p.usable())
    }

    fn sort(order: Order, works: &mut [Work]) {
        match order {
            Order::Title => works.sort_by_key(|w| {
                w.presentation_edition
                    .as_ref()
                    .map(|e| e.sort_title().to_lowercase())
                    .unwrap_or_default()
            }),
            Order::Author => works.sort_by_key(|w| {
                w.presentation_edition
                    .as_ref()
                    .and_then(|e| e.author_sort_name())
                    .map(str::to_lowercase)
                    .unwrap_or_default()
            }),
            Order::Added => works.sort_by_key(|w| std::cmp::Reverse(w.last_update_time)),
        }
    }
}

#[async_trait]
impl Catalog for MemoryCatalog {
    async fn page(&self, lane: &Lane, facets: &Facets, pagination: &Pagination) -> Result<Page> {
        let mut matched: Vec<Work> = self
            .works
            .iter()
            .filter(|w| Self::visible(w))
            .filter(|w| Self::matches_lane(lane, w))
            .filter(|w| Self::matches_entry_point(facets.entry_point(), w))
            .filter(|w| Self::matches_availability(facets.availability(), w))
            .cloned()
            .collect();
        Self::sort(facets.order(), &mut matched);
        let total = matched.len();
        let works = pagination.window(&matched).to_vec();
        Ok(Page { works, total })
    }

    async fn featured(&self, lane: &Lane, limit: usize) -> Result<Vec<Work>> {
        let mut matched: Vec<Work> = self
            .works
            .iter()
            .filter(|w| Self::visible(w))
            .filter(|w| Self::matches_lane(lane, w))
            .cloned()
            .collect();
        // Best quality first; unscored works sink to the bottom.
        matched.sort_by(|a, b| {
            b.quality
                .unwrap_or(0.0)
                .partial_cmp(&a.quality.unwrap_or(0.0))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matched.truncate(limit);
        Ok(matched)
    }

    async fn suppressed(&self, pagination: &Pagination) -> Result<Page> {
        let matched: Vec<Work> = self
            .works
            .iter()
            .filter(|w| w.license_pools.iter().any(|p| p.suppressed && !p.superseded))
            .cloned()
            .collect();
        let total = matched.len();
        let works = pagination.window(&matched).to_vec();
        Ok(Page { works, total })
    }

    async fn search(&self, query: &str, pagination: &Pagination) -> Result<Page> {
        let needle = query.to_lowercase();
        let mut matched: Vec<Work> = self
            .works
            .iter()
            .filter(|w| Self::visible(w))
            .filter(|w| {
                w.presentation_edition.as_ref().is_some_and(|e| {
                    e.title.to_lowercase().contains(&needle)
                        || e.contributors.iter().any(|c| c.display_name.to_lowercase().contains(&needle))
                })
            })
            .cloned()
            .collect();
        Self::sort(Order::Title, &mut matched);
        let total = matched.len();
        let works = pagination.window(&matched).to_vec();
        Ok(Page { works, total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edition::{Contributor, Edition, Medium};
    use crate::identifier::Identifier;
    use crate::lane::LaneId;
    use crate::license::{DataSource, LicensePool};
    use crate::work::{Genre, Work, WorkId};

    fn make_test_work(id: u64, title: &str, fiction: bool) -> Work {
        let identifier = Identifier::isbn(format!("978000000{id:04}"));
        let mut edition = Edition::new(identifier.clone(), DataSource::new("Test Source"), title);
        edition.language = Some("eng".to_string());
        edition.contributors = vec![Contributor::author("Test Author")];
        let mut pool = LicensePool::new(identifier, DataSource::new("Test Source"));
        pool.licenses_owned = 1;
        pool.licenses_available = 1;
        let mut work = Work::new(WorkId(id), edition);
        work.fiction = Some(fiction);
        work.license_pools = vec![pool];
        work
    }

    fn fiction_lane() -> Lane {
        Lane::new(LaneId(1), "Fiction").with_fiction(true)
    }

    #[tokio::test]
    async fn test_lane_criteria_filter() {
        let catalog = MemoryCatalog::new(vec![
            make_test_work(1, "Novel", true),
            make_test_work(2, "Field Guide", false),
        ]);
        let page = catalog
            .page(&fiction_lane(), &Facets::default(), &Pagination::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.works[0].id, WorkId(1));
    }

    #[tokio::test]
    async fn test_suppressed_pool_hides_work_from_listing() {
        let mut hidden = make_test_work(1, "Hidden", true);
        hidden.license_pools[0].suppressed = true;
        let catalog = MemoryCatalog::new(vec![hidden, make_test_work(2, "Visible", true)]);

        let page = catalog
            .page(&fiction_lane(), &Facets::default(), &Pagination::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.works[0].id, WorkId(2));

        let suppressed = catalog.suppressed(&Pagination::default()).await.unwrap();
        assert_eq!(suppressed.total, 1);
        assert_eq!(suppressed.works[0].id, WorkId(1));
    }

    #[tokio::test]
    async fn test_entry_point_filters_by_medium() {
        let mut audio = make_test_work(1, "Spoken", true);
        audio.presentation_edition.as_mut().unwrap().medium = Medium::Audio;
        let catalog = MemoryCatalog::new(vec![audio, make_test_work(2, "Written", true)]);

        let facets = Facets::default().with_entry_point(folio_facets::EntryPoint::Audiobooks);
        let page = catalog.page(&fiction_lane(), &facets, &Pagination::default()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.works[0].id, WorkId(1));
    }

    #[tokio::test]
    async fn test_availability_now_requires_a_free_copy() {
        let mut out_on_loan = make_test_work(1, "Busy", true);
        out_on_loan.license_pools[0].licenses_available = 0;
        let catalog = MemoryCatalog::new(vec![out_on_loan, make_test_work(2, "Free", true)]);

        let facets = Facets::default().with_availability(Availability::Now);
        let page = catalog.page(&fiction_lane(), &facets, &Pagination::default()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.works[0].id, WorkId(2));
    }

    #[tokio::test]
    async fn test_ordering_by_title_uses_sort_title() {
        let mut the_zebra = make_test_work(1, "The Zebra", true);
        the_zebra.presentation_edition.as_mut().unwrap().sort_title = Some("Zebra, The".to_string());
        let catalog = MemoryCatalog::new(vec![the_zebra, make_test_work(2, "Aardvark", true)]);

        let page = catalog
            .page(&fiction_lane(), &Facets::default(), &Pagination::default())
            .await
            .unwrap();
        let titles: Vec<_> = page
            .works
            .iter()
            .map(|w| w.presentation_edition.as_ref().unwrap().title.clone())
            .collect();
        assert_eq!(titles, vec!["Aardvark", "The Zebra"]);
    }

    #[tokio::test]
    async fn test_featured_prefers_quality() {
        let mut good = make_test_work(1, "Good", true);
        good.quality = Some(0.9);
        let mut better = make_test_work(2, "Better", true);
        better.quality = Some(0.95);
        let unscored = make_test_work(3, "Unscored", true);
        let catalog = MemoryCatalog::new(vec![good, unscored, better]);

        let featured = catalog.featured(&fiction_lane(), 2).await.unwrap();
        let ids: Vec<_> = featured.iter().map(|w| w.id).collect();
        assert_eq!(ids, vec![WorkId(2), WorkId(1)]);
    }

    #[tokio::test]
    async fn test_search_matches_title_and_author() {
        let catalog = MemoryCatalog::new(vec![
            make_test_work(1, "The Haunted House", true),
            make_test_work(2, "Gardening", false),
        ]);
        let by_title = catalog.search("haunted", &Pagination::default()).await.unwrap();
        assert_eq!(by_title.total, 1);
        let by_author = catalog.search("test author", &Pagination::default()).await.unwrap();
        assert_eq!(by_author.total, 2);
    }

    #[tokio::test]
    async fn test_genre_and_custom_list_criteria() {
        let mut horror = make_test_work(1, "Scary", true);
        horror.genres = vec![Genre { name: "Horror".to_string(), weight: 10 }];
        let mut listed = make_test_work(2, "Staff Pick", true);
        listed.custom_list_ids = vec![7];
        let catalog = MemoryCatalog::new(vec![horror, listed]);

        let genre_lane = Lane::new(LaneId(2), "Horror").with_genres(vec!["Horror".to_string()]);
        let page = catalog.page(&genre_lane, &Facets::default(), &Pagination::default()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.works[0].id, WorkId(1));

        let list_lane = Lane::new(LaneId(3), "Staff Picks").with_custom_lists(vec![7]);
        let page = catalog.page(&list_lane, &Facets::default(), &Pagination::default()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.works[0].id, WorkId(2));
    }
}
