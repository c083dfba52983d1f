//! Value objects describing how a catalog view is sliced.
//!
//! A requested view of the catalog is fully described by two immutable
//! objects: [`Facets`] (sort order, availability filter, and the selected
//! [`EntryPoint`]) and [`Pagination`] (offset/size cursor). Both know how to
//! render themselves as a canonical query string, which doubles as the cache
//! key component for the feed store, and both produce navigated copies
//! (`with_*`, `next_page`, …) rather than mutating in place.

mod entrypoint;
mod facets;
mod pagination;

pub use crate::entrypoint::EntryPoint;
pub use crate::facets::{Availability, FacetLink, Facets, Order};
pub use crate::pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, Pagination};
