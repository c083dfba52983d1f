//! Feed cache keys.

/// Which shape of feed a cached document holds. Grouped and paginated
/// feeds for the same worklist are distinct documents and must never
/// collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedKind {
    Page,
    Groups,
}

impl FeedKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Groups => "groups",
        }
    }
}

/// Identity of one cached feed document: worklist identity plus the
/// canonical facets and pagination query strings plus the feed kind.
///
/// The facets/pagination components are the value objects' own
/// `query_string()` output, so any view that would produce a different URL
/// also produces a different cache key. Patron identity is deliberately
/// not part of the key — personalized feeds are never cached (the feed
/// engine bypasses the store entirely for them).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeedKey {
    pub worklist: String,
    pub kind: FeedKind,
    pub facets: String,
    pub pagination: String,
}

impl FeedKey {
    pub fn new(
        worklist: impl Into<String>,
        kind: FeedKind,
        facets: impl Into<String>,
        pagination: impl Into<String>,
    ) -> Self {
        Self {
            worklist: worklist.into(),
            kind,
            facets: facets.into(),
            pagination: pagination.into(),
        }
    }

    /// Canonical single-string form of the key.
    pub fn canonical(&self) -> String {
        format!("{}|{}|{}|{}", self.worklist, self.kind.as_str(), self.facets, self.pagination)
    }

    /// Fixed-width digest used as the primary key column.
    pub fn digest(&self) -> String {
        blake3::hash(self.canonical().as_bytes()).to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn make_test_key(kind: FeedKind, pagination: &str) -> FeedKey {
        FeedKey::new("fiction", kind, "entrypoint=All&order=title&available=all", pagination)
    }

    #[test]
    fn test_digest_is_stable() {
        let a = make_test_key(FeedKind::Page, "after=0&size=50");
        let b = make_test_key(FeedKind::Page, "after=0&size=50");
        assert_eq!(a.digest(), b.digest());
    }

    #[rstest]
    #[case(make_test_key(FeedKind::Groups, "after=0&size=50"))]
    #[case(make_test_key(FeedKind::Page, "after=50&size=50"))]
    #[case(FeedKey::new("nonfiction", FeedKind::Page, "entrypoint=All&order=title&available=all", "after=0&size=50"))]
    fn test_any_component_change_changes_the_digest(#[case] other: FeedKey) {
        let base = make_test_key(FeedKind::Page, "after=0&size=50");
        assert_ne!(base.digest(), other.digest());
    }
}
