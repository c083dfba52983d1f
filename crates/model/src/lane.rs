//! Lanes: named, hierarchical subsets of the catalog.

use crate::catalog::{Catalog, Page};
use crate::error::Result;
use crate::work::{Audience, Work};
use folio_facets::{Facets, Pagination};
use rslug::slugify;

/// Number of works a lane contributes to a grouped feed by default.
const DEFAULT_FEATURED_SIZE: usize = 10;

/// Permanent identity of a [`Lane`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LaneId(pub u64);

/// The part of a lane that link construction and breadcrumbs need:
/// identity, display name and URL slug. Cheap to clone, carried in
/// ancestor chains and grouped-feed results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaneSummary {
    pub id: LaneId,
    pub display_name: String,
    pub slug: String,
}

/// A named, queryable subset of the catalog, forming a tree through
/// `sublanes`.
///
/// Lanes describe *criteria* (languages, audiences, fiction flag, genres,
/// custom lists); turning criteria into works is the [`Catalog`]'s job.
/// The ancestor chain is precomputed root-first when sublanes are attached,
/// so breadcrumb construction never needs parent pointers.
#[derive(Debug, Clone, PartialEq)]
pub struct Lane {
    pub id: LaneId,
    pub display_name: String,
    pub slug: String,
    pub languages: Vec<String>,
    pub audiences: Vec<Audience>,
    pub fiction: Option<bool>,
    pub genres: Vec<String>,
    pub custom_list_ids: Vec<u64>,
    pub searchable: bool,
    pub featured_size: usize,
    pub sublanes: Vec<Lane>,
    /// Root-first chain of ancestors, excluding this lane itself.
    pub ancestors: Vec<LaneSummary>,
}

impl Lane {
    pub fn new(id: LaneId, display_name: impl Into<String>) -> Self {
        let display_name = display_name.into();
        let slug = slugify!(&display_name);
        Self {
            id,
            display_name,
            slug,
            languages: Vec::new(),
            audiences: Vec::new(),
            fiction: None,
            genres: Vec::new(),
            custom_list_ids: Vec::new(),
            searchable: false,
            featured_size: DEFAULT_FEATURED_SIZE,
            sublanes: Vec::new(),
            ancestors: Vec::new(),
        }
    }

    pub fn with_fiction(mut self, fiction: bool) -> Self {
        self.fiction = Some(fiction);
        self
    }

    pub fn with_genres(mut self, genres: Vec<String>) -> Self {
        self.genres = genres;
        self
    }

    pub fn with_audiences(mut self, audiences: Vec<Audience>) -> Self {
        self.audiences = audiences;
        self
    }

    pub fn with_languages(mut self, languages: Vec<String>) -> Self {
        self.languages = languages;
        self
    }

    pub fn with_custom_lists(mut self, custom_list_ids: Vec<u64>) -> Self {
        self.custom_list_ids = custom_list_ids;
        self
    }

    pub fn searchable(mut self) -> Self {
        self.searchable = true;
        self
    }

    /// Attach a child lane, recording this lane's chain plus itself as the
    /// child's ancestors (recursively for the child's own subtree).
    pub fn attach_sublane(&mut self, mut child: Lane) {
        let mut chain = self.ancestors.clone();
        chain.push(self.summary());
        child.set_ancestors(chain);
        self.sublanes.push(child);
    }

    fn set_ancestors(&mut self, chain: Vec<LaneSummary>) {
        self.ancestors = chain;
        let summary = self.summary();
        let ancestors = self.ancestors.clone();
        for sublane in &mut self.sublanes {
            let mut child_chain = ancestors.clone();
            child_chain.push(summary.clone());
            sublane.set_ancestors(child_chain);
        }
    }

    pub fn summary(&self) -> LaneSummary {
        LaneSummary {
            id: self.id,
            display_name: self.display_name.clone(),
            slug: self.slug.clone(),
        }
    }

    /// One page of this lane's works under the given view.
    pub async fn works(&self, catalog: &dyn Catalog, facets: &Facets, pagination: &Pagination) -> Result<Page> {
        catalog.page(self, facets, pagination).await
    }

    /// The grouped-feed contents of this lane: featured works from each
    /// sublane, then works featured by this lane directly. Works in the
    /// second set carry this lane's own summary, which is how the feed
    /// builder recognizes them and routes them into the synthetic
    /// "All {lane}" group.
    pub async fn groups(&self, catalog: &dyn Catalog) -> Result<Vec<(Work, LaneSummary)>> {
        let mut out = Vec::new();
        for sublane in &self.sublanes {
            let featured = catalog.featured(sublane, sublane.featured_size).await?;
            out.extend(featured.into_iter().map(|work| (work, sublane.summary())));
        }
        let own = catalog.featured(self, self.featured_size).await?;
        out.extend(own.into_iter().map(|work| (work, self.summary())));
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_is_derived_from_display_name() {
        let lane = Lane::new(LaneId(1), "Science Fiction & Fantasy");
        assert_eq!(lane.slug, "science-fiction-fantasy");
    }

    #[test]
    fn test_attach_sublane_builds_ancestor_chains() {
        let mut root = Lane::new(LaneId(1), "Fiction");
        let mut sff = Lane::new(LaneId(2), "Science Fiction");
        sff.attach_sublane(Lane::new(LaneId(3), "Space Opera"));
        root.attach_sublane(sff);

        let sff = &root.sublanes[0];
        assert_eq!(sff.ancestors.len(), 1);
        assert_eq!(sff.ancestors[0].id, LaneId(1));
        let space_opera = &sff.sublanes[0];
        let chain: Vec<_> = space_opera.ancestors.iter().map(|a| a.id).collect();
        assert_eq!(chain, vec![LaneId(1), LaneId(2)]);
    }
}
