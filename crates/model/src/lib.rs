//! Catalog entity model consumed by the feed engine.
//!
//! Everything in this crate is a read-only input to feed generation: works
//! and their presentation editions, license pools with availability counts,
//! identifiers, patrons with their loans and holds, and the lane tree that
//! partitions the catalog. None of it is owned by the feed code.
//!
//! The one seam that touches storage is the [`Catalog`] trait: a repository
//! interface (`page`, `featured`, `suppressed`, `search`) that hides how the
//! backing database turns lane criteria plus facets and pagination into an
//! ordered list of works. The feed engine never builds queries itself.

pub mod catalog;
mod edition;
pub mod error;
mod identifier;
mod lane;
mod license;
#[cfg(any(test, feature = "mock"))]
mod memory;
mod patron;
mod work;

pub use crate::catalog::{Catalog, Page};
pub use crate::edition::{Contributor, Edition, MarcRole, Medium};
pub use crate::identifier::{Identifier, IdentifierType};
pub use crate::lane::{Lane, LaneId, LaneSummary};
pub use crate::license::{DataSource, DeliveryMechanism, LicensePool, media_types};
#[cfg(any(test, feature = "mock"))]
pub use crate::memory::MemoryCatalog;
pub use crate::patron::{Hold, Loan, Patron};
pub use crate::work::{Appeal, Audience, Genre, Work, WorkId};
