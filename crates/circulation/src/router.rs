//! URL construction for every outward-facing link the annotators emit.
//!
//! One place owns the path shapes, so feed links, permalinks and the
//! borrow/fulfill/revoke endpoints can never drift apart. Facets and
//! pagination contribute their own canonical query strings; lane slugs
//! come precomputed from the lane tree.

use folio_facets::{Facets, Pagination};
use folio_model::{Identifier, LaneSummary};

/// Builds absolute URLs under one library's base URL, with an optional
/// CDN origin substituted into cover links.
#[derive(Debug, Clone)]
pub struct Router {
    base_url: String,
    cdn_base: Option<String>,
}

impl Router {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url, cdn_base: None }
    }

    pub fn with_cdn(mut self, cdn_base: impl Into<String>) -> Self {
        let mut cdn_base = cdn_base.into();
        while cdn_base.ends_with('/') {
            cdn_base.pop();
        }
        self.cdn_base = Some(cdn_base);
        self
    }

    pub fn permalink(&self, identifier: &Identifier) -> String {
        format!("{}/works/{}", self.base_url, encode_segment(&identifier.urn()))
    }

    pub fn feed_url(&self, lane: &LaneSummary, facets: &Facets, pagination: &Pagination) -> String {
        format!(
            "{}/feed/{}?{}&{}",
            self.base_url,
            lane.slug,
            facets.query_string(),
            pagination.query_string(),
        )
    }

    /// Grouped-feed URL for a lane, or the library root when `None`.
    pub fn groups_url(&self, lane: Option<&LaneSummary>) -> String {
        match lane {
            Some(lane) => format!("{}/groups/{}", self.base_url, lane.slug),
            None => format!("{}/groups", self.base_url),
        }
    }

    pub fn search_url(&self, lane: &LaneSummary) -> String {
        format!("{}/search/{}", self.base_url, lane.slug)
    }

    /// Borrow endpoint; the mechanism id is present only for vendors that
    /// fix the delivery mechanism at borrow time.
    pub fn borrow_url(&self, identifier: &Identifier, mechanism: Option<u64>) -> String {
        let work = encode_segment(&identifier.urn());
        match mechanism {
            Some(mechanism) => format!("{}/works/{work}/borrow/{mechanism}", self.base_url),
            None => format!("{}/works/{work}/borrow", self.base_url),
        }
    }

    pub fn fulfill_url(&self, identifier: &Identifier, mechanism: u64) -> String {
        format!("{}/works/{}/fulfill/{mechanism}", self.base_url, encode_segment(&identifier.urn()))
    }

    pub fn revoke_url(&self, identifier: &Identifier) -> String {
        format!("{}/loans/{}/revoke", self.base_url, encode_segment(&identifier.urn()))
    }

    pub fn edit_url(&self, identifier: &Identifier) -> String {
        format!("{}/admin/works/{}/edit", self.base_url, encode_segment(&identifier.urn()))
    }

    pub fn suppress_url(&self, identifier: &Identifier) -> String {
        format!("{}/admin/works/{}/suppress", self.base_url, encode_segment(&identifier.urn()))
    }

    pub fn unsuppress_url(&self, identifier: &Identifier) -> String {
        format!("{}/admin/works/{}/unsuppress", self.base_url, encode_segment(&identifier.urn()))
    }

    /// Swap an absolute URL's origin for the CDN origin, when one is
    /// configured. Applied to cover and thumbnail links only.
    pub fn rewrite_cdn(&self, url: &str) -> String {
        let Some(cdn) = &self.cdn_base else {
            return url.to_string();
        };
        let Some(after_scheme) = url.find("://").map(|at| at + 3) else {
            return url.to_string();
        };
        match url[after_scheme..].find('/') {
            Some(path_start) => format!("{cdn}{}", &url[after_scheme + path_start..]),
            None => cdn.clone(),
        }
    }
}

/// Percent-encode a URN for use as one path segment.
fn encode_segment(s: &str) -> String {
    s.replace('%', "%25")
        .replace('/', "%2F")
        .replace(' ', "%20")
        .replace('?', "%3F")
        .replace('#', "%23")
}
