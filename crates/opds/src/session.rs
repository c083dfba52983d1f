//! Per-request memoization shared across one feed build.

use std::collections::HashMap;
use std::sync::Mutex;

/// A memo cache scoped to a single feed build.
///
/// Annotators sometimes compute the same expensive cross-cutting value
/// (a DRM licensor token, say) for every entry of a feed. The engine
/// creates one `SessionCache` per build and hands it to every
/// `annotate_work_entry` call; the cache is dropped with the build, so
/// nothing computed for one request can leak into another.
#[derive(Debug, Default)]
pub struct SessionCache {
    values: Mutex<HashMap<String, String>>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key`, computing and storing it on
    /// first use.
    pub fn memoize(&self, key: &str, produce: impl FnOnce() -> String) -> String {
        if let Ok(values) = self.values.lock()
            && let Some(value) = values.get(key)
        {
            return value.clone();
        }
        let value = produce();
        if let Ok(mut values) = self.values.lock() {
            values.insert(key.to_string(), value.clone());
        }
        value
    }
}
