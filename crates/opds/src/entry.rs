//! Construction of the cache-invariant portion of a work's entry.
//!
//! Everything emitted here is a function of the work's bibliographic state
//! alone: no URLs, no patron state, no timestamps that vary per request.
//! The fragment is what the entry store caches per (work id, verbosity);
//! `annotate_work_entry` layers the per-request parts on top.

use crate::annotator::Annotator;
use crate::error::Result;
use crate::ns;
use crate::xml::AtomXml;
use folio_model::{Edition, Identifier, Work};
use time::macros::format_description;

/// Build the cache-invariant entry fragment: the children of `<entry>`
/// that never vary between requests. Returns serialized XML without the
/// `<entry>` wrapper itself.
pub fn build_partial_entry(
    annotator: &dyn Annotator,
    work: &Work,
    edition: &Edition,
    identifier: &Identifier,
) -> Result<String> {
    let mut xml = AtomXml::new();
    xml.text_element("id", &[], &identifier.urn())?;
    xml.text_element("title", &[], &edition.title)?;
    if let Some(subtitle) = &edition.subtitle {
        xml.text_element("schema:alternativeHeadline", &[], subtitle)?;
    }
    if let Some(series) = &edition.series {
        let mut attributes = vec![("schema:name", series.as_str())];
        let position;
        if let Some(p) = edition.series_position {
            position = p.to_string();
            attributes.push(("schema:position", &position));
        }
        xml.empty("schema:Series", &attributes)?;
    }
    for author in annotator.authors(edition) {
        let element = author.element();
        if author.role == folio_model::MarcRole::Author {
            xml.open(element, &[])?;
        } else {
            xml.open(element, &[("opf:role", author.role.code())])?;
        }
        xml.text_element("name", &[], &author.name)?;
        xml.close(element)?;
    }
    if let Some(language) = &edition.language {
        xml.text_element("dcterms:language", &[], language)?;
    }
    if let Some(publisher) = &edition.publisher {
        xml.text_element("dcterms:publisher", &[], publisher)?;
    }
    if let Some(imprint) = &edition.imprint {
        xml.text_element("bib:publisherImprint", &[], imprint)?;
    }
    if let Some(issued) = edition.issued {
        // Publication dates are calendar dates, not instants.
        use exn::ResultExt;
        let formatted = issued
            .format(format_description!("[year]-[month]-[day]"))
            .or_raise(|| crate::error::ErrorKind::Time)?;
        xml.text_element("dcterms:issued", &[], &formatted)?;
    }
    if let Some(summary) = &work.summary {
        xml.text_element("summary", &[("type", "html")], summary)?;
    }
    let (thumbnails, fulls) = annotator.cover_links(work);
    for href in &thumbnails {
        xml.empty("link", &[("rel", ns::rel::THUMBNAIL), ("href", href)])?;
    }
    for href in &fulls {
        xml.empty("link", &[("rel", ns::rel::IMAGE), ("href", href)])?;
    }
    for category in annotator.categories(work) {
        let mut attributes = vec![("scheme", category.scheme), ("term", category.term.as_str())];
        if let Some(label) = &category.label {
            attributes.push(("label", label));
        }
        let weight;
        if let Some(w) = category.weight {
            weight = w.to_string();
            attributes.push(("schema:ratingValue", &weight));
        }
        xml.empty("category", &attributes)?;
    }
    for rating in annotator.ratings(work) {
        xml.empty(
            "schema:Rating",
            &[
                ("schema:additionalType", rating.additional_type),
                ("schema:ratingValue", &rating.value.to_string()),
            ],
        )?;
    }
    xml.into_string()
}
