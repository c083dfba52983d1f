//! Cache error types.
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction, with `derive_more` kind enums.

use derive_more::{Display, Error};

/// A cache error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for cache operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong
/// internally. Cache failures are systemic from the feed engine's point of
/// view: they propagate to the web layer rather than degrading a single
/// entry.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("database error")]
    Database,
    #[display("database migration error")]
    Migration,
    /// A stored row failed to convert back into a cache model.
    #[display("invalid cache data: {_0}")]
    InvalidData(#[error(not(source))] &'static str),
}
