//! Application Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// An application error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for application operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Configuration could not be loaded or is invalid.
    #[display("invalid configuration")]
    Config,
    /// The site manifest could not be loaded.
    #[display("unable to load site")]
    Site,
    /// The configured root page doesn't exist.
    #[display("unable to resolve root page `{_0}`")]
    Root(#[error(not(source))] String),
    /// The search itself failed. Deliberately vague: details are logged.
    #[display("search temporarily unavailable")]
    Unavailable,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable)
    }
}
