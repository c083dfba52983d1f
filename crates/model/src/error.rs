//! Model error types.
//!
//! Structured errors using `exn` for automatic location tracking, with
//! `derive_more` kind enums. Same shape as the other crates in this
//! workspace.

use derive_more::{Display, Error};

/// A model error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// A URN could not be parsed back into an [`Identifier`](crate::Identifier).
    #[display("unrecognized identifier URN: {_0}")]
    UnknownUrnScheme(#[error(not(source))] String),
    /// The backing catalog query failed.
    #[display("catalog query error")]
    Query,
}
