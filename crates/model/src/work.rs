//! Works: the aggregate bibliographic identity feed entries are built from.

use crate::edition::Edition;
use crate::identifier::Identifier;
use crate::license::LicensePool;
use time::OffsetDateTime;

/// Permanent identity of a [`Work`], assigned by the backing database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkId(pub u64);

/// Intended audience classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Audience {
    Children,
    YoungAdult,
    Adult,
    AdultsOnly,
    AllAges,
}

impl Audience {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Children => "Children",
            Self::YoungAdult => "Young Adult",
            Self::Adult => "Adult",
            Self::AdultsOnly => "Adults Only",
            Self::AllAges => "All Ages",
        }
    }

    /// Whether a target-age range is meaningful for this audience.
    pub fn has_target_age(&self) -> bool {
        matches!(self, Self::Children | Self::YoungAdult)
    }
}

/// A genre assignment with the classification weight accumulated across
/// equivalent identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genre {
    pub name: String,
    pub weight: u32,
}

/// An appeal axis score (character, story, setting, language).
#[derive(Debug, Clone, PartialEq)]
pub struct Appeal {
    pub name: String,
    pub weight: f32,
}

/// Aggregate bibliographic identity for a title.
///
/// A work has exactly one presentation edition (when presentation has been
/// calculated at all), zero or more license pools, and the classification
/// and scoring data the annotators turn into categories and ratings.
#[derive(Debug, Clone, PartialEq)]
pub struct Work {
    pub id: WorkId,
    pub presentation_edition: Option<Edition>,
    pub license_pools: Vec<LicensePool>,
    pub fiction: Option<bool>,
    pub audience: Option<Audience>,
    /// Inclusive age range, only meaningful for children/YA audiences.
    pub target_age: Option<(u8, u8)>,
    pub genres: Vec<Genre>,
    pub appeals: Vec<Appeal>,
    /// 0.0..=1.0 internal quality score.
    pub quality: Option<f32>,
    /// 0.0..=1.0 normalized external rating.
    pub rating: Option<f32>,
    /// 0.0..=1.0 normalized popularity.
    pub popularity: Option<f32>,
    pub summary: Option<String>,
    /// Custom lists this work is a member of, by list id.
    pub custom_list_ids: Vec<u64>,
    pub last_update_time: OffsetDateTime,
}

impl Work {
    pub fn new(id: WorkId, presentation_edition: Edition) -> Self {
        Self {
            id,
            presentation_edition: Some(presentation_edition),
            license_pools: Vec::new(),
            fiction: None,
            audience: None,
            target_age: None,
            genres: Vec::new(),
            appeals: Vec::new(),
            quality: None,
            rating: None,
            popularity: None,
            summary: None,
            custom_list_ids: Vec::new(),
            last_update_time: OffsetDateTime::UNIX_EPOCH,
        }
    }

    /// Resolve which pool represents "the" pool for this work when no
    /// patron context applies: skip suppressed and superseded pools,
    /// prefer an unlimited (open-access/self-hosted) pool, otherwise the
    /// first pool that actually owns licenses.
    pub fn active_license_pool(&self) -> Option<&LicensePool> {
        let mut fallback = None;
        for pool in self.license_pools.iter().filter(|p| p.usable()) {
            if pool.unlimited() {
                return Some(pool);
            }
            if fallback.is_none() && pool.licenses_owned > 0 {
                fallback = Some(pool);
            }
        }
        fallback
    }

    /// The identifier a feed entry for this work is keyed by: the active
    /// pool's, else the presentation edition's primary identifier.
    pub fn identifier(&self) -> Option<&Identifier> {
        self.active_license_pool()
            .map(|pool| &pool.identifier)
            .or_else(|| self.presentation_edition.as_ref().map(|e| &e.primary_identifier))
    }
}
