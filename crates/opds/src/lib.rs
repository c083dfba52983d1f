//! OPDS acquisition feed construction.
//!
//! The engine that turns lanes, facets and pagination into Atom/OPDS
//! documents. Three layers:
//!
//! - [`ns`] and [`AtomXml`]: the wire vocabulary and the event writer.
//! - [`Annotator`]: the capability seam for everything context-dependent
//!   (URLs, patron state, link relations), with impersonal base behavior
//!   in default methods.
//! - [`AcquisitionFeed`]: the orchestrator — cache lookup, catalog query,
//!   per-entry construction with message-entry degradation, feed-level
//!   decoration, write-through store.
//!
//! Concrete annotators that know about borrowing live in the circulation
//! crate; this one knows bibliography and feed shape only.

pub mod annotator;
mod entry;
pub mod error;
mod feed;
mod message;
pub mod ns;
mod response;
mod session;
mod xml;

pub use crate::annotator::{Annotator, AuthorTag, Category, GroupLink, RatingTag, VerboseAnnotator, WorkEntryContext, base, rfc3339};
pub use crate::entry::build_partial_entry;
pub use crate::feed::AcquisitionFeed;
pub use crate::message::OpdsMessage;
pub use crate::response::FeedResponse;
pub use crate::session::SessionCache;
pub use crate::xml::AtomXml;
