//! Feed responses and their HTTP cache metadata.

use time::Duration;

/// A finished document plus the metadata the web layer needs to serve it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedResponse {
    pub document: String,
    /// Value for the `Content-Type` header.
    pub media_type: &'static str,
    pub max_age: Duration,
    /// Whether the document depends on patron identity and must never be
    /// stored by a shared cache.
    pub private: bool,
}

impl FeedResponse {
    pub fn new(document: String, media_type: &'static str, max_age: Duration, private: bool) -> Self {
        Self { document, media_type, max_age, private }
    }

    /// Value for the `Cache-Control` header.
    pub fn cache_control(&self) -> String {
        let seconds = self.max_age.whole_seconds().max(0);
        if self.private {
            format!("private, max-age={seconds}")
        } else {
            format!("public, max-age={seconds}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ns;

    #[test]
    fn test_cache_control_header() {
        let shared = FeedResponse::new(
            "<feed/>".to_string(),
            ns::mime::ACQUISITION_FEED,
            Duration::minutes(20),
            false,
        );
        assert_eq!(shared.cache_control(), "public, max-age=1200");

        let personal = FeedResponse::new("<entry/>".to_string(), ns::mime::ENTRY, Duration::ZERO, true);
        assert_eq!(personal.cache_control(), "private, max-age=0");
    }
}
