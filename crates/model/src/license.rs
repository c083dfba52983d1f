//! License pools: the commercial relationship between a collection and an
//! identifier, including availability counts and delivery mechanisms.

use crate::identifier::Identifier;
use time::OffsetDateTime;

/// Media and DRM type constants used by delivery mechanisms.
pub mod media_types {
    pub const EPUB: &str = "application/epub+zip";
    pub const PDF: &str = "application/pdf";
    pub const AUDIOBOOK_MANIFEST: &str = "application/audiobook+json";
    pub const ADOBE_DRM: &str = "application/vnd.adobe.adept+xml";
    pub const LCP_DRM: &str = "application/vnd.readium.lcp.license.v1.0+json";
    pub const FINDAWAY_DRM: &str = "application/vnd.librarysimplified.findaway.license+json";
}

/// Where a bibliographic or licensing record came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataSource {
    pub name: String,
    /// Internal placeholder sources (metadata wrangling, presentation
    /// recalculation) are never advertised to clients in
    /// `bibframe:distribution`.
    pub internal_processing: bool,
}

impl DataSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), internal_processing: false }
    }

    pub fn internal(name: impl Into<String>) -> Self {
        Self { name: name.into(), internal_processing: true }
    }
}

/// A (format, DRM scheme) pair a pool can be fulfilled through.
///
/// The client-visible chain is DRM scheme first, then content type; a
/// mechanism with no content type cannot be rendered by any client and is
/// skipped when building acquisition links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryMechanism {
    /// Stable id used in borrow/fulfill URLs.
    pub id: u64,
    pub content_type: Option<String>,
    pub drm_scheme: Option<String>,
}

impl DeliveryMechanism {
    pub fn new(id: u64, content_type: impl Into<String>, drm_scheme: Option<&str>) -> Self {
        Self {
            id,
            content_type: Some(content_type.into()),
            drm_scheme: drm_scheme.map(str::to_string),
        }
    }

    /// A mechanism with a DRM wrapper but no known underlying media type.
    /// Never fulfillable; exists because license feeds sometimes report
    /// such pairs.
    pub fn opaque(id: u64, drm_scheme: impl Into<String>) -> Self {
        Self { id, content_type: None, drm_scheme: Some(drm_scheme.into()) }
    }

    /// Whether any client could render the result of fulfilling this
    /// mechanism.
    pub fn is_renderable(&self) -> bool {
        self.content_type.is_some()
    }

    /// The acquisition chain as clients see it: DRM scheme (if any)
    /// followed by the media type (if any), outermost first.
    pub fn client_chain(&self) -> Vec<&str> {
        self.drm_scheme
            .iter()
            .chain(self.content_type.iter())
            .map(String::as_str)
            .collect()
    }
}

/// The licensing relationship between a collection and an identifier:
/// counts, flags and the delivery mechanisms it can be fulfilled through.
#[derive(Debug, Clone, PartialEq)]
pub struct LicensePool {
    pub identifier: Identifier,
    pub data_source: DataSource,
    pub open_access: bool,
    pub unlimited_access: bool,
    pub self_hosted: bool,
    /// Hidden from patron-facing listings by library staff. Still visible
    /// in the admin "suppressed" feed.
    pub suppressed: bool,
    /// Replaced by a better pool for the same identifier; excluded from
    /// all listings.
    pub superseded: bool,
    pub licenses_owned: u32,
    pub licenses_available: u32,
    pub patrons_in_hold_queue: u32,
    /// When the library's licenses became (or will become) active.
    pub availability_since: Option<OffsetDateTime>,
    pub delivery_mechanisms: Vec<DeliveryMechanism>,
}

impl LicensePool {
    pub fn new(identifier: Identifier, data_source: DataSource) -> Self {
        Self {
            identifier,
            data_source,
            open_access: false,
            unlimited_access: false,
            self_hosted: false,
            suppressed: false,
            superseded: false,
            licenses_owned: 0,
            licenses_available: 0,
            patrons_in_hold_queue: 0,
            availability_since: None,
            delivery_mechanisms: Vec::new(),
        }
    }

    pub fn open_access(identifier: Identifier, data_source: DataSource) -> Self {
        Self { open_access: true, ..Self::new(identifier, data_source) }
    }

    /// Whether this pool may appear in a normal (patron-facing) listing.
    pub fn usable(&self) -> bool {
        !self.suppressed && !self.superseded
    }

    /// Whether borrowing never consumes a license.
    pub fn unlimited(&self) -> bool {
        self.open_access || self.unlimited_access || self.self_hosted
    }

    /// Mechanisms that resolve to a client-renderable media type.
    pub fn renderable_mechanisms(&self) -> Vec<&DeliveryMechanism> {
        self.delivery_mechanisms.iter().filter(|m| m.is_renderable()).collect()
    }
}
