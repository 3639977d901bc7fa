//! Index Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.
//!
//! None of these ever leave [`ContentIndexer::ensure_indexed`]; they exist so
//! that failures are logged with their full error tree before the indexer
//! falls back to the last good snapshot.
//!
//! [`ContentIndexer::ensure_indexed`]: crate::ContentIndexer::ensure_indexed

use derive_more::{Display, Error};

/// An index error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for index operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rendering the node's content failed, so its index could not be rebuilt.
    #[display("failed to rebuild index for {_0}")]
    Rebuild(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // The freshness token is left untouched on failure precisely so that
        // the next lookup tries again.
        matches!(self, Self::Rebuild(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::Rebuild("/news".to_string()).to_string(), "failed to rebuild index for /news");
        assert!(ErrorKind::Rebuild("/news".to_string()).is_retryable());
    }
}
