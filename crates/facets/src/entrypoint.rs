//! Entry points: format-type subsets of the catalog.

use derive_more::{Display, Error};
use std::str::FromStr;

/// An OPDS facet group member selecting a format-type subset of the catalog
/// (everything, ebooks only, audiobooks only).
///
/// Entry points are rendered as their own facet group ("Formats") but follow
/// a special suppression rule: a one-member group carries no information and
/// is omitted from the feed entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryPoint {
    Everything,
    Ebooks,
    Audiobooks,
}

impl EntryPoint {
    /// Label of the facet group entry points are rendered under.
    pub const GROUP_LABEL: &'static str = "Formats";

    /// All entry points, in the order they appear in a feed.
    pub const ALL: [EntryPoint; 3] = [Self::Everything, Self::Ebooks, Self::Audiobooks];

    /// Stable value used in query strings and cache keys.
    pub fn query_value(&self) -> &'static str {
        match self {
            Self::Everything => "All",
            Self::Ebooks => "Book",
            Self::Audiobooks => "Audio",
        }
    }

    /// Human-readable name used as the facet link title.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Everything => "All",
            Self::Ebooks => "eBooks",
            Self::Audiobooks => "Audiobooks",
        }
    }

    /// The schema.org (or bib.schema.org) type URI clients use to identify
    /// the entry point. Part of the wire contract.
    pub fn uri(&self) -> &'static str {
        match self {
            Self::Everything => "http://schema.org/CreativeWork",
            Self::Ebooks => "http://schema.org/EBook",
            Self::Audiobooks => "http://bib.schema.org/Audiobook",
        }
    }
}

#[derive(Debug, Display, Error)]
#[display("unknown entry point: {name}")]
pub struct UnknownEntryPoint {
    pub name: String,
}

impl FromStr for EntryPoint {
    type Err = UnknownEntryPoint;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "All" => Ok(Self::Everything),
            "Book" => Ok(Self::Ebooks),
            "Audio" => Ok(Self::Audiobooks),
            other => Err(UnknownEntryPoint { name: other.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(EntryPoint::Everything, "All")]
    #[case(EntryPoint::Ebooks, "Book")]
    #[case(EntryPoint::Audiobooks, "Audio")]
    fn test_query_value_round_trips(#[case] entrypoint: EntryPoint, #[case] value: &str) {
        assert_eq!(entrypoint.query_value(), value);
        assert_eq!(value.parse::<EntryPoint>().unwrap(), entrypoint);
    }

    #[test]
    fn test_unknown_value_is_rejected() {
        assert!("Vinyl".parse::<EntryPoint>().is_err());
    }
}
