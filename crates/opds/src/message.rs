//! Per-identifier message entries.
//!
//! OPDS feeds can carry a `<simplified:message>` in place of a full entry:
//! an identifier URN, an HTTP-like status code and a human-readable
//! explanation. Message entries are first-class members of the entry
//! sequence, which is what keeps pagination cardinality correct when a
//! work cannot be rendered.

use crate::error::Result;
use crate::xml::AtomXml;
use folio_model::Identifier;

/// A message entry standing in for a work that exists but cannot be
/// presented or acquired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpdsMessage {
    pub urn: String,
    pub status: u16,
    pub text: String,
}

impl OpdsMessage {
    pub fn new(identifier: &Identifier, status: u16, text: impl Into<String>) -> Self {
        Self { urn: identifier.urn(), status, text: text.into() }
    }

    /// The identifier is known but the library holds no active license.
    pub fn no_license(identifier: &Identifier) -> Self {
        Self::new(
            identifier,
            403,
            "I've heard about this work but have no active licenses for it.",
        )
    }

    /// The work is licensed but no delivery mechanism yields a format any
    /// client could render.
    pub fn unfulfillable(identifier: &Identifier) -> Self {
        Self::new(
            identifier,
            403,
            "I know about this work but can offer no way of fulfilling it.",
        )
    }

    pub fn write(&self, xml: &mut AtomXml) -> Result<()> {
        self.write_with_attributes(xml, &[])
    }

    /// Write the message element with extra root attributes. Used when the
    /// message is a standalone document and must carry the namespace
    /// declarations itself.
    pub fn write_with_attributes(&self, xml: &mut AtomXml, attributes: &[(&str, &str)]) -> Result<()> {
        xml.open("simplified:message", attributes)?;
        xml.text_element("id", &[], &self.urn)?;
        xml.text_element("simplified:status_code", &[], &self.status.to_string())?;
        xml.text_element("schema:description", &[], &self.text)?;
        xml.close("simplified:message")
    }
}
