//! Config Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A configuration error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// An explicitly requested configuration file does not exist.
    #[display("configuration file not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// File extension is not one of toml, yaml, yml or json.
    #[display("unsupported configuration format: {}", _0.display())]
    Format(#[error(not(source))] PathBuf),
    /// The merged sources could not be deserialized; the figment error with
    /// the offending key and source is attached.
    #[display("invalid configuration")]
    Invalid,
    /// A value deserialized fine but makes no sense.
    #[display("invalid configuration value: {_0}")]
    Validation(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::NotFound(_) | Self::Format(_) | Self::Invalid | Self::Validation(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(
            ErrorKind::NotFound(PathBuf::from("/etc/trawl.toml")).to_string(),
            "configuration file not found: /etc/trawl.toml"
        );
        assert_eq!(
            ErrorKind::Validation("limit must be at least 1".into()).to_string(),
            "invalid configuration value: limit must be at least 1"
        );
        assert!(!ErrorKind::Invalid.is_retryable());
    }
}
