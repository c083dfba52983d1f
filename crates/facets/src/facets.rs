//! Facets: immutable sort/availability/entry-point selection.

use crate::EntryPoint;

/// Sort order applied to a flat (paginated) listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Order {
    Title,
    Author,
    Added,
}

impl Order {
    pub const GROUP_LABEL: &'static str = "Sort by";
    pub const ALL: [Order; 3] = [Self::Title, Self::Author, Self::Added];

    pub fn query_value(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Author => "author",
            Self::Added => "added",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Author => "Author",
            Self::Added => "Recently Added",
        }
    }
}

/// Availability filter applied to a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Availability {
    /// Everything the library owns, whether or not a copy is free right now.
    All,
    /// Only titles with a copy available for immediate borrowing.
    Now,
    /// Only open-access titles, which never expire.
    Always,
}

impl Availability {
    pub const GROUP_LABEL: &'static str = "Availability";
    pub const ALL_VALUES: [Availability; 3] = [Self::All, Self::Now, Self::Always];

    pub fn query_value(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Now => "now",
            Self::Always => "always",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Now => "Available now",
            Self::Always => "Yours to keep",
        }
    }
}

/// One facet `<link>` to be rendered into a feed: a navigated [`Facets`]
/// plus the labels and selection state the link element needs.
#[derive(Debug, Clone)]
pub struct FacetLink {
    pub group_label: &'static str,
    pub label: &'static str,
    pub facets: Facets,
    pub selected: bool,
}

/// Immutable description of how a catalog view is sliced: sort order,
/// availability filter, and the selected entry point.
///
/// `with_*` methods return a modified copy with every other field untouched,
/// which is how facet links navigate between views. The canonical
/// [`query_string`](Self::query_string) doubles as the facets component of
/// the feed cache key, so its field order must never change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Facets {
    order: Order,
    availability: Availability,
    entry_point: EntryPoint,
    enabled_entry_points: Vec<EntryPoint>,
}

impl Default for Facets {
    fn default() -> Self {
        Self::new(vec![EntryPoint::Everything, EntryPoint::Ebooks, EntryPoint::Audiobooks])
    }
}

impl Facets {
    /// Default view over the given set of library-enabled entry points:
    /// sorted by title, all availabilities, first enabled entry point
    /// selected.
    pub fn new(enabled_entry_points: Vec<EntryPoint>) -> Self {
        let entry_point = enabled_entry_points.first().copied().unwrap_or(EntryPoint::Everything);
        Self {
            order: Order::Title,
            availability: Availability::All,
            entry_point,
            enabled_entry_points,
        }
    }

    pub fn order(&self) -> Order {
        self.order
    }

    pub fn availability(&self) -> Availability {
        self.availability
    }

    pub fn entry_point(&self) -> EntryPoint {
        self.entry_point
    }

    /// Entry points the library has enabled for this view, in render order.
    pub fn enabled_entry_points(&self) -> &[EntryPoint] {
        &self.enabled_entry_points
    }

    pub fn with_order(&self, order: Order) -> Self {
        Self { order, ..self.clone() }
    }

    pub fn with_availability(&self, availability: Availability) -> Self {
        Self { availability, ..self.clone() }
    }

    pub fn with_entry_point(&self, entry_point: EntryPoint) -> Self {
        Self { entry_point, ..self.clone() }
    }

    /// Canonical query string: `entrypoint=…&order=…&available=…`.
    ///
    /// Field order is fixed; this string is embedded in URLs and in feed
    /// cache keys and must stay stable across releases.
    pub fn query_string(&self) -> String {
        format!(
            "entrypoint={}&order={}&available={}",
            self.entry_point.query_value(),
            self.order.query_value(),
            self.availability.query_value(),
        )
    }

    /// Facet links for the sort-order and availability groups.
    ///
    /// Entry points are deliberately not part of this listing; they follow
    /// their own suppression rule and are rendered by the feed builder.
    pub fn facet_groups(&self) -> Vec<FacetLink> {
        let mut links = Vec::with_capacity(Order::ALL.len() + Availability::ALL_VALUES.len());
        for order in Order::ALL {
            links.push(FacetLink {
                group_label: Order::GROUP_LABEL,
                label: order.display_name(),
                facets: self.with_order(order),
                selected: order == self.order,
            });
        }
        for availability in Availability::ALL_VALUES {
            links.push(FacetLink {
                group_label: Availability::GROUP_LABEL,
                label: availability.display_name(),
                facets: self.with_availability(availability),
                selected: availability == self.availability,
            });
        }
        links
    }
}
