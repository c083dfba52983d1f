//! Thin event-writer for Atom documents.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

/// An Atom document under construction.
///
/// Wraps [`quick_xml::Writer`] with the small event vocabulary feed
/// construction needs: open/close, empty and text elements, and raw
/// appends for cached entry fragments that are already serialized XML.
pub struct AtomXml {
    writer: Writer<Vec<u8>>,
}

impl Default for AtomXml {
    fn default() -> Self {
        Self::new()
    }
}

impl AtomXml {
    pub fn new() -> Self {
        Self { writer: Writer::new(Vec::new()) }
    }

    /// Write the `<?xml version="1.0" encoding="UTF-8"?>` declaration.
    pub fn declaration(&mut self) -> Result<()> {
        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .or_raise(|| ErrorKind::Xml)
    }

    pub fn open(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<()> {
        let mut start = BytesStart::new(name);
        for (key, value) in attributes {
            start.push_attribute((*key, *value));
        }
        self.writer.write_event(Event::Start(start)).or_raise(|| ErrorKind::Xml)
    }

    pub fn close(&mut self, name: &str) -> Result<()> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .or_raise(|| ErrorKind::Xml)
    }

    pub fn empty(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<()> {
        let mut start = BytesStart::new(name);
        for (key, value) in attributes {
            start.push_attribute((*key, *value));
        }
        self.writer.write_event(Event::Empty(start)).or_raise(|| ErrorKind::Xml)
    }

    /// An element holding one text node, e.g. `<title>Moby Dick</title>`.
    /// The text is escaped on write.
    pub fn text_element(&mut self, name: &str, attributes: &[(&str, &str)], text: &str) -> Result<()> {
        self.open(name, attributes)?;
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .or_raise(|| ErrorKind::Xml)?;
        self.close(name)
    }

    /// Append an already-serialized fragment verbatim. Used for cached
    /// entry bodies; the caller guarantees well-formedness.
    pub fn raw(&mut self, fragment: &str) {
        self.writer.get_mut().extend_from_slice(fragment.as_bytes());
    }

    pub fn into_string(self) -> Result<String> {
        String::from_utf8(self.writer.into_inner()).or_raise(|| ErrorKind::Xml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elements_nest_and_escape() {
        let mut xml = AtomXml::new();
        xml.open("entry", &[]).unwrap();
        xml.text_element("title", &[], "Dombey & Son").unwrap();
        xml.empty("link", &[("rel", "alternate"), ("href", "/works/1?a=1&b=2")]).unwrap();
        xml.close("entry").unwrap();
        assert_eq!(
            xml.into_string().unwrap(),
            "<entry><title>Dombey &amp; Son</title>\
             <link rel=\"alternate\" href=\"/works/1?a=1&amp;b=2\"/></entry>",
        );
    }

    #[test]
    fn test_raw_fragment_is_appended_verbatim() {
        let mut xml = AtomXml::new();
        xml.open("entry", &[]).unwrap();
        xml.raw("<id>urn:isbn:9780000000001</id>");
        xml.close("entry").unwrap();
        assert_eq!(
            xml.into_string().unwrap(),
            "<entry><id>urn:isbn:9780000000001</id></entry>",
        );
    }

    #[test]
    fn test_declaration() {
        let mut xml = AtomXml::new();
        xml.declaration().unwrap();
        assert_eq!(xml.into_string().unwrap(), "<?xml version=\"1.0\" encoding=\"UTF-8\"?>");
    }
}
