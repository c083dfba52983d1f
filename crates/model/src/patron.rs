//! Patrons and their relationships to license pools.

use crate::identifier::Identifier;
use crate::lane::LaneSummary;
use crate::license::DeliveryMechanism;
use time::OffsetDateTime;

/// A library patron, as much of one as feed generation needs: an identity
/// and, for patron types with a restricted catalog, the root lane their
/// view is pinned to.
#[derive(Debug, Clone, PartialEq)]
pub struct Patron {
    pub id: u64,
    pub authorization_identifier: Option<String>,
    /// When set, breadcrumbs stop at this lane instead of the library root.
    pub root_lane: Option<LaneSummary>,
}

impl Patron {
    pub fn new(id: u64) -> Self {
        Self { id, authorization_identifier: None, root_lane: None }
    }
}

/// An active loan of one license pool to one patron.
#[derive(Debug, Clone, PartialEq)]
pub struct Loan {
    pub identifier: Identifier,
    pub start: OffsetDateTime,
    pub until: Option<OffsetDateTime>,
    /// Set once the patron has fulfilled the loan through a specific
    /// mechanism; fulfillment is locked to it from then on.
    pub fulfillment: Option<DeliveryMechanism>,
}

impl Loan {
    pub fn new(identifier: Identifier, start: OffsetDateTime) -> Self {
        Self { identifier, start, until: None, fulfillment: None }
    }
}

/// A patron's place in the hold queue for one license pool.
#[derive(Debug, Clone, PartialEq)]
pub struct Hold {
    pub identifier: Identifier,
    pub start: OffsetDateTime,
    pub until: Option<OffsetDateTime>,
    /// Queue position as reported by the vendor. `Some(0)` means the hold
    /// is ready for checkout. `None` means the vendor did not report one.
    pub position: Option<u32>,
}

impl Hold {
    pub fn new(identifier: Identifier, start: OffsetDateTime, position: Option<u32>) -> Self {
        Self { identifier, start, until: None, position }
    }

    /// Whether the held copy is reserved for this patron right now.
    pub fn ready(&self) -> bool {
        self.position == Some(0)
    }
}
