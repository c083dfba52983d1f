//! Namespace URIs, link relations and media types of the OPDS 1.x wire
//! contract.
//!
//! Every constant in this module is a bit-exact surface that reading-app
//! clients match on verbatim. None of these strings may change.

/// XML namespace URIs, declared once on the feed (or standalone entry) root.
pub mod xmlns {
    pub const ATOM: &str = "http://www.w3.org/2005/Atom";
    pub const OPDS: &str = "http://opds-spec.org/2010/catalog";
    pub const SCHEMA: &str = "http://schema.org/";
    pub const SIMPLIFIED: &str = "http://librarysimplified.org/terms/";
    pub const DRM: &str = "http://librarysimplified.org/terms/drm";
    pub const BIBFRAME: &str = "http://bibframe.org/vocab/";
    pub const DCTERMS: &str = "http://purl.org/dc/terms/";
    pub const BIB: &str = "http://bib.schema.org/";
    pub const OPF: &str = "http://www.idpf.org/2007/opf";

    /// The declaration attributes for a feed or standalone entry root.
    pub const DECLARATIONS: [(&str, &str); 9] = [
        ("xmlns", ATOM),
        ("xmlns:opds", OPDS),
        ("xmlns:schema", SCHEMA),
        ("xmlns:simplified", SIMPLIFIED),
        ("xmlns:drm", DRM),
        ("xmlns:bibframe", BIBFRAME),
        ("xmlns:dcterms", DCTERMS),
        ("xmlns:bib", BIB),
        ("xmlns:opf", OPF),
    ];
}

/// Link relation URIs.
pub mod rel {
    pub const SELF: &str = "self";
    pub const START: &str = "start";
    pub const UP: &str = "up";
    pub const NEXT: &str = "next";
    pub const PREVIOUS: &str = "previous";
    pub const FIRST: &str = "first";
    pub const SEARCH: &str = "search";
    pub const ALTERNATE: &str = "alternate";
    /// Groups an entry into a named sub-group of a grouped feed.
    pub const GROUP: &str = "collection";
    pub const FACET: &str = "http://opds-spec.org/facet";
    pub const THUMBNAIL: &str = "http://opds-spec.org/image/thumbnail";
    pub const IMAGE: &str = "http://opds-spec.org/image";

    pub const BORROW: &str = "http://opds-spec.org/acquisition/borrow";
    pub const OPEN_ACCESS: &str = "http://opds-spec.org/acquisition/open-access";
    /// Fulfillment of an existing loan.
    pub const GENERIC_ACQUISITION: &str = "http://opds-spec.org/acquisition";
    pub const REVOKE: &str = "http://librarysimplified.org/terms/rel/revoke";
    pub const HIDE: &str = "http://librarysimplified.org/terms/rel/hide";
    pub const RESTORE: &str = "http://librarysimplified.org/terms/rel/restore";
    pub const EDIT: &str = "edit";
}

/// Classification scheme and measurement URIs used in `<category>` and
/// `schema:Rating` tags.
pub mod scheme {
    pub const FICTION: &str = "http://librarysimplified.org/terms/fiction/";
    pub const GENRE: &str = "http://librarysimplified.org/terms/genres/Simplified/";
    pub const AUDIENCE: &str = "http://schema.org/audience";
    pub const TARGET_AGE: &str = "http://schema.org/typicalAgeRange";
    pub const APPEAL: &str = "http://librarysimplified.org/terms/rel/appeal";

    pub const QUALITY: &str = "http://librarysimplified.org/terms/rel/quality";
    pub const POPULARITY: &str = "http://librarysimplified.org/terms/rel/popularity";
    pub const RATING: &str = "http://schema.org/ratingValue";
}

/// Media types carried in `type` attributes and response headers.
pub mod mime {
    pub const ACQUISITION_FEED: &str = "application/atom+xml;profile=opds-catalog;kind=acquisition";
    pub const ENTRY: &str = "application/atom+xml;type=entry;profile=opds-catalog";
    pub const OPENSEARCH: &str = "application/opensearchdescription+xml";
}

/// `opds:facetGroupType` value marking the entry-point facet group, so
/// clients can render it as a format switcher rather than a plain facet
/// list.
pub const ENTRYPOINT_FACET_GROUP_TYPE: &str = "http://librarysimplified.org/terms/rel/entrypoint";
