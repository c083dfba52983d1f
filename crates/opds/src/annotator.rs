//! The annotator contract: context-dependent feed content.
//!
//! Everything in a feed that depends on application context rather than on
//! raw bibliographic fact (URLs, per-patron state, link relations) comes
//! from an [`Annotator`]. The engine is written against this trait only;
//! concrete variants (public, admin, patron-personalized) are independent
//! structs chosen by the calling context, never a hierarchy.
//!
//! Default method bodies implement the impersonal base behavior; variants
//! override only what they change. The free functions in [`base`] hold
//! those shared implementations so an override can still delegate to them.

use crate::error::Result;
use crate::ns;
use crate::session::SessionCache;
use crate::xml::AtomXml;
use folio_cache::Verbosity;
use folio_facets::{Facets, Pagination};
use folio_model::{Edition, Identifier, Lane, LaneSummary, LicensePool, MarcRole, Work};
use time::OffsetDateTime;

/// Where a grouped-feed entry belongs: the link and title of its group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupLink {
    pub href: String,
    pub title: String,
}

/// Everything `annotate_work_entry` may need about the entry being built.
#[derive(Debug)]
pub struct WorkEntryContext<'a> {
    pub work: &'a Work,
    pub pool: Option<&'a LicensePool>,
    pub edition: &'a Edition,
    pub identifier: &'a Identifier,
    pub group: Option<&'a GroupLink>,
    /// Caller-supplied update timestamp; the work's own last-update time
    /// is the fallback.
    pub updated: Option<OffsetDateTime>,
    /// Whether the cached fragment already carries the Atom `<id>`.
    pub has_id: bool,
}

/// One `<category>` tag: a classification scheme URI plus term, label and
/// optional weight.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub scheme: &'static str,
    pub term: String,
    pub label: Option<String>,
    pub weight: Option<f32>,
}

/// One credited person: rendered as `<author>` for the author role and
/// `<contributor opf:role="…">` for everything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorTag {
    pub name: String,
    pub role: MarcRole,
}

impl AuthorTag {
    pub fn element(&self) -> &'static str {
        if self.role == MarcRole::Author { "author" } else { "contributor" }
    }
}

/// One `schema:Rating` tag: a measurement URI and a normalized value.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingTag {
    pub additional_type: &'static str,
    pub value: f32,
}

/// The capability set feed construction draws on.
///
/// URL hooks return `Option` because the base annotator has no routing
/// context; a link whose URL resolves to `None` is simply omitted.
pub trait Annotator: Send + Sync {
    /// Which cached entry fragment this annotator's output belongs to.
    fn verbosity(&self) -> Verbosity {
        Verbosity::Simple
    }

    /// Whether output depends on patron identity. Personalized annotators
    /// disable the shared feed cache entirely.
    fn is_personalized(&self) -> bool {
        false
    }

    /// Title of the library-root link and breadcrumb.
    fn top_level_title(&self) -> String {
        "All Books".to_string()
    }

    /// The lane a restricted patron type's catalog is pinned to, if any.
    /// Breadcrumbs are truncated at this lane.
    fn patron_root_lane(&self) -> Option<LaneSummary> {
        None
    }

    fn permalink_for(&self, _identifier: &Identifier) -> Option<String> {
        None
    }

    fn feed_url(&self, _lane: &LaneSummary, _facets: &Facets, _pagination: &Pagination) -> Option<String> {
        None
    }

    /// Grouped-feed URL for a lane, or the library root when `None`.
    fn groups_url(&self, _lane: Option<&LaneSummary>) -> Option<String> {
        None
    }

    fn search_url(&self, _lane: &LaneSummary) -> Option<String> {
        None
    }

    /// Resolve which pool represents "the" pool for a work in this
    /// context. Personalized variants prefer the pool tied to an active
    /// loan or hold.
    fn active_licensepool_for<'a>(&self, work: &'a Work) -> Option<&'a LicensePool> {
        work.active_license_pool()
    }

    /// (thumbnail URLs, full-size URLs) for the work's cover.
    fn cover_links(&self, work: &Work) -> (Vec<String>, Vec<String>) {
        base::cover_links(work)
    }

    fn categories(&self, work: &Work) -> Vec<Category> {
        base::categories(work, false)
    }

    fn authors(&self, edition: &Edition) -> Vec<AuthorTag> {
        base::authors(edition)
    }

    fn ratings(&self, _work: &Work) -> Vec<RatingTag> {
        Vec::new()
    }

    /// Add the per-request parts of one entry. The cache-invariant parts
    /// are already in place when this runs.
    fn annotate_work_entry(
        &self,
        ctx: &WorkEntryContext<'_>,
        _session: &SessionCache,
        xml: &mut AtomXml,
    ) -> Result<()> {
        base::annotate_work_entry(self, ctx, xml)
    }

    /// Add feed-level links: start, up, and search when applicable.
    fn annotate_feed(&self, lane: &Lane, xml: &mut AtomXml) -> Result<()> {
        base::annotate_feed(self, lane, xml)
    }
}

/// Render an [`OffsetDateTime`] in the RFC 3339 form Atom requires.
pub fn rfc3339(timestamp: OffsetDateTime) -> Result<String> {
    use exn::ResultExt;
    timestamp
        .format(&time::format_description::well_known::Rfc3339)
        .or_raise(|| crate::error::ErrorKind::Time)
}

/// Impersonal base implementations, shared by every annotator variant.
pub mod base {
    use super::*;
    use std::collections::HashSet;

    pub fn annotate_work_entry<A: Annotator + ?Sized>(
        annotator: &A,
        ctx: &WorkEntryContext<'_>,
        xml: &mut AtomXml,
    ) -> Result<()> {
        if !ctx.has_id {
            xml.text_element("id", &[], &ctx.identifier.urn())?;
        }
        if let Some(permalink) = annotator.permalink_for(ctx.identifier) {
            xml.empty(
                "link",
                &[("rel", ns::rel::ALTERNATE), ("type", ns::mime::ENTRY), ("href", &permalink)],
            )?;
        }
        if let Some(pool) = ctx.pool {
            if !pool.data_source.internal_processing {
                xml.empty(
                    "bibframe:distribution",
                    &[("bibframe:ProviderName", &pool.data_source.name)],
                )?;
            }
            // A pool whose licenses only become active in the future has
            // no meaningful publication date yet.
            if let Some(since) = pool.availability_since
                && since <= OffsetDateTime::now_utc()
            {
                xml.text_element("published", &[], &rfc3339(since)?)?;
            }
        }
        if let Some(group) = ctx.group {
            xml.empty(
                "link",
                &[("rel", ns::rel::GROUP), ("href", &group.href), ("title", &group.title)],
            )?;
        }
        let updated = ctx.updated.unwrap_or(ctx.work.last_update_time);
        xml.text_element("updated", &[], &rfc3339(updated)?)
    }

    pub fn annotate_feed<A: Annotator + ?Sized>(
        annotator: &A,
        lane: &Lane,
        xml: &mut AtomXml,
    ) -> Result<()> {
        if let Some(root) = annotator.groups_url(None) {
            xml.empty(
                "link",
                &[
                    ("rel", ns::rel::START),
                    ("type", ns::mime::ACQUISITION_FEED),
                    ("href", &root),
                    ("title", &annotator.top_level_title()),
                ],
            )?;
        }
        if let Some(up) = annotator.groups_url(lane.ancestors.last()) {
            let title = lane
                .ancestors
                .last()
                .map_or_else(|| annotator.top_level_title(), |parent| parent.display_name.clone());
            xml.empty(
                "link",
                &[("rel", ns::rel::UP), ("type", ns::mime::ACQUISITION_FEED), ("href", &up), ("title", &title)],
            )?;
        }
        if lane.searchable
            && let Some(search) = annotator.search_url(&lane.summary())
        {
            xml.empty(
                "link",
                &[("rel", ns::rel::SEARCH), ("type", ns::mime::OPENSEARCH), ("href", &search)],
            )?;
        }
        Ok(())
    }

    pub fn cover_links(work: &Work) -> (Vec<String>, Vec<String>) {
        let Some(edition) = work.presentation_edition.as_ref() else {
            return (Vec::new(), Vec::new());
        };
        let thumbnails = edition.thumbnail_url.iter().cloned().collect();
        let fulls = edition.cover_url.iter().cloned().collect();
        (thumbnails, fulls)
    }

    /// Classification categories for a work. `include_weights` is the
    /// verbose behavior: genre and appeal weights are carried through
    /// instead of dropped.
    pub fn categories(work: &Work, include_weights: bool) -> Vec<Category> {
        let mut out = Vec::new();
        if let Some(fiction) = work.fiction {
            let label = if fiction { "Fiction" } else { "Nonfiction" };
            out.push(Category {
                scheme: ns::scheme::FICTION,
                term: format!("{}{label}", ns::scheme::FICTION),
                label: Some(label.to_string()),
                weight: None,
            });
        }
        for genre in &work.genres {
            out.push(Category {
                scheme: ns::scheme::GENRE,
                term: format!("{}{}", ns::scheme::GENRE, genre.name),
                label: Some(genre.name.clone()),
                weight: include_weights.then_some(genre.weight as f32),
            });
        }
        if let Some(audience) = work.audience {
            out.push(Category {
                scheme: ns::scheme::AUDIENCE,
                term: audience.label().to_string(),
                label: Some(audience.label().to_string()),
                weight: None,
            });
            if audience.has_target_age()
                && let Some((min, max)) = work.target_age
            {
                out.push(Category {
                    scheme: ns::scheme::TARGET_AGE,
                    term: format!("{min}-{max}"),
                    label: None,
                    weight: None,
                });
            }
        }
        for appeal in &work.appeals {
            out.push(Category {
                scheme: ns::scheme::APPEAL,
                term: appeal.name.clone(),
                label: Some(appeal.name.clone()),
                weight: include_weights.then_some(appeal.weight),
            });
        }
        out
    }

    /// One tag per contributor, deduplicated by (MARC role, lowercased
    /// display name) so the same person is never credited twice for the
    /// same role.
    pub fn authors(edition: &Edition) -> Vec<AuthorTag> {
        let mut seen = HashSet::new();
        edition
            .contributors
            .iter()
            .filter(|contributor| seen.insert(contributor.dedup_key()))
            .map(|contributor| AuthorTag {
                name: contributor.display_name.clone(),
                role: contributor.role,
            })
            .collect()
    }
}

/// Annotator for staff-facing metadata views: everything the base emits,
/// plus quality/rating/popularity measurements and the exhaustive weighted
/// classification listing.
#[derive(Debug, Default, Clone, Copy)]
pub struct VerboseAnnotator;

impl Annotator for VerboseAnnotator {
    fn verbosity(&self) -> Verbosity {
        Verbosity::Verbose
    }

    fn categories(&self, work: &Work) -> Vec<Category> {
        base::categories(work, true)
    }

    fn ratings(&self, work: &Work) -> Vec<RatingTag> {
        let mut out = Vec::new();
        if let Some(quality) = work.quality {
            out.push(RatingTag { additional_type: ns::scheme::QUALITY, value: quality });
        }
        if let Some(rating) = work.rating {
            out.push(RatingTag { additional_type: ns::scheme::RATING, value: rating });
        }
        if let Some(popularity) = work.popularity {
            out.push(RatingTag { additional_type: ns::scheme::POPULARITY, value: popularity });
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_model::{Audience, Contributor, DataSource, Genre, WorkId};

    fn make_test_work() -> Work {
        let identifier = Identifier::isbn("9780000000001");
        let mut edition = Edition::new(identifier, DataSource::new("Overdrive"), "The Moonstone");
        edition.contributors = vec![
            Contributor::author("Wilkie Collins"),
            Contributor::author("WILKIE COLLINS"),
            Contributor::author("Anthea Bell").with_role(MarcRole::Translator),
        ];
        let mut work = Work::new(WorkId(1), edition);
        work.fiction = Some(true);
        work.audience = Some(Audience::YoungAdult);
        work.target_age = Some((12, 15));
        work.genres = vec![Genre { name: "Mystery".to_string(), weight: 12 }];
        work
    }

    #[test]
    fn test_authors_deduplicate_by_role_and_name() {
        let work = make_test_work();
        let tags = base::authors(work.presentation_edition.as_ref().unwrap());
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].element(), "author");
        assert_eq!(tags[1].element(), "contributor");
    }

    #[test]
    fn test_base_categories_cover_fiction_genre_audience_and_age() {
        let work = make_test_work();
        let categories = base::categories(&work, false);
        let schemes: Vec<_> = categories.iter().map(|c| c.scheme).collect();
        assert_eq!(
            schemes,
            vec![ns::scheme::FICTION, ns::scheme::GENRE, ns::scheme::AUDIENCE, ns::scheme::TARGET_AGE],
        );
        assert!(categories.iter().all(|c| c.weight.is_none()));
        let age = categories.last().unwrap();
        assert_eq!(age.term, "12-15");
    }

    #[test]
    fn test_target_age_is_omitted_for_adult_audiences() {
        let mut work = make_test_work();
        work.audience = Some(Audience::Adult);
        let categories = base::categories(&work, false);
        assert!(!categories.iter().any(|c| c.scheme == ns::scheme::TARGET_AGE));
    }

    #[test]
    fn test_verbose_annotator_carries_weights_and_ratings() {
        let mut work = make_test_work();
        work.quality = Some(0.8);
        work.popularity = Some(0.4);
        let annotator = VerboseAnnotator;
        let genre = annotator
            .categories(&work)
            .into_iter()
            .find(|c| c.scheme == ns::scheme::GENRE)
            .unwrap();
        assert_eq!(genre.weight, Some(12.0));
        let ratings = annotator.ratings(&work);
        assert_eq!(ratings.len(), 2);
        assert_eq!(ratings[0].additional_type, ns::scheme::QUALITY);
    }
}
