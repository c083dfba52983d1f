//! Feed construction error types.
//!
//! Structured errors using `exn` for automatic location tracking, with
//! `derive_more` kind enums. Same shape as the other crates in this
//! workspace.

use derive_more::{Display, Error};

/// A feed construction error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for feed operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// Only [`Unfulfillable`](ErrorKind::Unfulfillable) is handled inside the
/// engine (it degrades one entry to a 403 message); everything else is
/// systemic and propagates to the web layer.
#[derive(Debug, Display, Error, PartialEq, Eq)]
pub enum ErrorKind {
    /// XML serialization failed.
    #[display("xml write error")]
    Xml,
    /// A timestamp could not be rendered as RFC 3339.
    #[display("timestamp format error")]
    Time,
    /// The feed or entry cache store failed.
    #[display("cache store error")]
    Cache,
    /// The backing catalog query failed.
    #[display("catalog query error")]
    Catalog,
    /// The work has no identifier at all, so not even a message entry can
    /// be addressed to it.
    #[display("work has no identifier")]
    NoIdentifier,
    /// No delivery mechanism resolves to a renderable media type, so the
    /// work cannot be fulfilled through any client.
    #[display("no usable delivery mechanism")]
    Unfulfillable,
}
