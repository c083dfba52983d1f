//! Circulation-aware annotators and routing.
//!
//! Where the feed engine knows bibliography, this crate knows borrowing:
//! acquisition links shaped by vendor behavior, availability and hold
//! counts, loan and hold state for a patron, and the staff-facing
//! suppression workflow. [`Router`] owns every URL shape; the annotators
//! plug it into the engine's URL hooks.

pub mod admin;
pub mod annotator;
pub mod api;
pub mod links;
pub mod router;

pub use crate::admin::{AdminAnnotator, suppressed_feed};
pub use crate::annotator::CirculationAnnotator;
pub use crate::api::{CirculationRegistry, DeliveryApi};
pub use crate::links::{AvailabilityStatus, write_acquisition_links, write_license_tags};
pub use crate::router::Router;
