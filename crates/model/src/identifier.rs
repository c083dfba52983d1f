//! External identifiers and their URN forms.

use crate::error::{ErrorKind, Result};
use std::fmt;
use std::str::FromStr;

/// Prefix of the URN scheme used for identifier types that have no
/// standard URN form of their own. Part of the wire contract: the URN is
/// the Atom `<id>` of every entry, and clients treat it as opaque but
/// stable.
const URN_SCHEME: &str = "urn:librarysimplified.org/terms/id/";

/// The kind of external identifier a [`LicensePool`](crate::LicensePool)
/// or [`Edition`](crate::Edition) is keyed by.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IdentifierType {
    Isbn,
    Uri,
    OverdriveId,
    GutenbergId,
    /// A vendor-specific identifier namespace, named by the vendor.
    Proprietary(String),
}

impl IdentifierType {
    /// Name used inside the `urn:librarysimplified.org` scheme.
    fn scheme_name(&self) -> &str {
        match self {
            Self::Isbn => "ISBN",
            Self::Uri => "URI",
            Self::OverdriveId => "Overdrive ID",
            Self::GutenbergId => "Gutenberg ID",
            Self::Proprietary(name) => name,
        }
    }
}

/// An external identifier (ISBN, URI, vendor id) with a canonical URN.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    pub kind: IdentifierType,
    pub value: String,
}

impl Identifier {
    pub fn new(kind: IdentifierType, value: impl Into<String>) -> Self {
        Self { kind, value: value.into() }
    }

    pub fn isbn(value: impl Into<String>) -> Self {
        Self::new(IdentifierType::Isbn, value)
    }

    pub fn uri(value: impl Into<String>) -> Self {
        Self::new(IdentifierType::Uri, value)
    }

    /// Canonical URN, used verbatim as the Atom `<id>` of feed entries.
    ///
    /// ISBNs use the standard `urn:isbn:` scheme and URIs are their own
    /// URN; everything else is expressed in the
    /// `urn:librarysimplified.org/terms/id/` scheme with the type name
    /// percent-encoded.
    pub fn urn(&self) -> String {
        match &self.kind {
            IdentifierType::Isbn => format!("urn:isbn:{}", self.value),
            IdentifierType::Uri => self.value.clone(),
            kind => format!("{URN_SCHEME}{}/{}", encode(kind.scheme_name()), encode(&self.value)),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.urn())
    }
}

impl FromStr for Identifier {
    type Err = crate::error::Error;

    /// Parse a URN back into an identifier. The inverse of
    /// [`urn`](Identifier::urn) for every identifier this crate produces.
    fn from_str(urn: &str) -> Result<Self> {
        if let Some(isbn) = urn.strip_prefix("urn:isbn:") {
            return Ok(Self::isbn(isbn));
        }
        if urn.starts_with("http://") || urn.starts_with("https://") {
            return Ok(Self::uri(urn));
        }
        if let Some(rest) = urn.strip_prefix(URN_SCHEME)
            && let Some((scheme, value)) = rest.split_once('/')
        {
            let kind = match decode(scheme).as_str() {
                "Overdrive ID" => IdentifierType::OverdriveId,
                "Gutenberg ID" => IdentifierType::GutenbergId,
                "URI" => IdentifierType::Uri,
                "ISBN" => IdentifierType::Isbn,
                name => IdentifierType::Proprietary(name.to_string()),
            };
            return Ok(Self::new(kind, decode(value)));
        }
        exn::bail!(ErrorKind::UnknownUrnScheme(urn.to_string()));
    }
}

/// Minimal percent-encoding for the characters that actually occur in
/// identifier type names and values (spaces and the path separator).
fn encode(s: &str) -> String {
    s.replace('%', "%25").replace(' ', "%20").replace('/', "%2F")
}

fn decode(s: &str) -> String {
    s.replace("%2F", "/").replace("%20", " ").replace("%25", "%")
}
