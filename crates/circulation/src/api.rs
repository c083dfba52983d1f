//! The delivery API seam.
//!
//! Feed construction needs exactly two facts about the vendor behind a
//! license pool: whether the delivery mechanism is fixed at borrow time,
//! and whether a loan can be returned early. Everything else about
//! circulation (checkout protocols, token exchange) is out of reach behind
//! this trait.

use folio_model::LicensePool;
use std::collections::HashMap;

/// What the feed engine may ask a vendor's circulation API.
pub trait DeliveryApi: Send + Sync {
    /// Whether the vendor requires the patron to commit to one delivery
    /// mechanism when borrowing. Controls borrow-link construction: one
    /// link per mechanism when `true`, one link carrying every mechanism
    /// as nested indirect acquisitions when `false`.
    fn set_mechanism_at_borrow(&self) -> bool;

    /// Whether an active loan can be returned early.
    fn supports_revoke(&self) -> bool {
        true
    }
}

/// Maps data-source names to their circulation APIs.
#[derive(Default)]
pub struct CirculationRegistry {
    apis: HashMap<String, Box<dyn DeliveryApi>>,
}

impl CirculationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, data_source: impl Into<String>, api: Box<dyn DeliveryApi>) {
        self.apis.insert(data_source.into(), api);
    }

    /// The API responsible for a pool, by its data source. `None` for
    /// sources with no registered API (open-access collections, mostly).
    pub fn api_for_license_pool(&self, pool: &LicensePool) -> Option<&dyn DeliveryApi> {
        self.apis.get(&pool.data_source.name).map(|api| api.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_model::{DataSource, Identifier};

    struct FixedAtBorrow;
    impl DeliveryApi for FixedAtBorrow {
        fn set_mechanism_at_borrow(&self) -> bool {
            true
        }
    }

    #[test]
    fn test_registry_resolves_by_data_source() {
        let mut registry = CirculationRegistry::new();
        registry.register("Overdrive", Box::new(FixedAtBorrow));

        let overdrive =
            LicensePool::new(Identifier::isbn("9780000000001"), DataSource::new("Overdrive"));
        let gutenberg =
            LicensePool::new(Identifier::isbn("9780000000002"), DataSource::new("Gutenberg"));
        assert!(registry.api_for_license_pool(&overdrive).is_some());
        assert!(registry.api_for_license_pool(&gutenberg).is_none());
    }
}
