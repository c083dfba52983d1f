//! Bibliographic descriptions: editions and their contributors.

use crate::identifier::Identifier;
use crate::license::DataSource;
use time::Date;

/// MARC relator roles this engine distinguishes when crediting
/// contributors. Anything else collapses into `Contributor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarcRole {
    Author,
    Narrator,
    Translator,
    Illustrator,
    Editor,
    Contributor,
}

impl MarcRole {
    /// Three-letter MARC relator code, used in the contributor dedup key.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Author => "aut",
            Self::Narrator => "nrt",
            Self::Translator => "trl",
            Self::Illustrator => "ill",
            Self::Editor => "edt",
            Self::Contributor => "ctb",
        }
    }
}

/// A person credited on an edition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contributor {
    pub display_name: String,
    pub sort_name: Option<String>,
    pub role: MarcRole,
}

impl Contributor {
    pub fn author(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            sort_name: None,
            role: MarcRole::Author,
        }
    }

    pub fn with_sort_name(mut self, sort_name: impl Into<String>) -> Self {
        self.sort_name = Some(sort_name.into());
        self
    }

    pub fn with_role(mut self, role: MarcRole) -> Self {
        self.role = role;
        self
    }

    /// Key used to avoid crediting the same person twice for the same
    /// role: (MARC code, lowercased display name).
    pub fn dedup_key(&self) -> (&'static str, String) {
        (self.role.code(), self.display_name.to_lowercase())
    }
}

/// The format family an edition belongs to. Determines which entry point
/// it appears under and the schema type URI advertised on its entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Medium {
    Book,
    Audio,
}

impl Medium {
    /// Value for the `schema:additionalType` attribute on the entry.
    pub fn uri(&self) -> &'static str {
        match self {
            Self::Book => "http://schema.org/EBook",
            Self::Audio => "http://bib.schema.org/Audiobook",
        }
    }
}

/// One bibliographic description of a title, from one data source.
///
/// A [`Work`](crate::Work) picks exactly one edition as its presentation
/// edition; that is the only edition feed generation ever reads.
#[derive(Debug, Clone, PartialEq)]
pub struct Edition {
    pub primary_identifier: Identifier,
    pub data_source: DataSource,
    pub title: String,
    pub subtitle: Option<String>,
    pub sort_title: Option<String>,
    pub contributors: Vec<Contributor>,
    pub language: Option<String>,
    pub publisher: Option<String>,
    pub imprint: Option<String>,
    pub issued: Option<Date>,
    pub series: Option<String>,
    pub series_position: Option<u32>,
    pub medium: Medium,
    pub cover_url: Option<String>,
    pub thumbnail_url: Option<String>,
}

impl Edition {
    pub fn new(primary_identifier: Identifier, data_source: DataSource, title: impl Into<String>) -> Self {
        Self {
            primary_identifier,
            data_source,
            title: title.into(),
            subtitle: None,
            sort_title: None,
            contributors: Vec::new(),
            language: None,
            publisher: None,
            imprint: None,
            issued: None,
            series: None,
            series_position: None,
            medium: Medium::Book,
            cover_url: None,
            thumbnail_url: None,
        }
    }

    /// Title used for sorting; falls back to the display title.
    pub fn sort_title(&self) -> &str {
        self.sort_title.as_deref().unwrap_or(&self.title)
    }

    /// Sort name of the first credited author, for author ordering.
    pub fn author_sort_name(&self) -> Option<&str> {
        self.contributors
            .iter()
            .find(|c| c.role == MarcRole::Author)
            .map(|c| c.sort_name.as_deref().unwrap_or(&c.display_name))
    }
}
