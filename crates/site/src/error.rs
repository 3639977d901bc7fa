//! Site Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A site error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for site operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The manifest is missing, unreadable, or doesn't match the expected shape.
    #[display("unable to load site manifest: {}", _0.display())]
    Manifest(#[error(not(source))] PathBuf),
    /// Manifest file extension is not one of toml, yaml, yml or json.
    #[display("unsupported manifest format: {}", _0.display())]
    Format(#[error(not(source))] PathBuf),
    /// Two pages share the same kind and id.
    #[display("duplicate page ({kind}, {id})")]
    Duplicate { kind: String, id: String },
    /// A page sets both an inline body and a source file.
    #[display("page ({kind}, {id}) sets both body and source")]
    Content { kind: String, id: String },
    /// A child reference is not of the form `id` or `kind:id`.
    #[display("invalid child reference `{_0}`")]
    InvalidChild(#[error(not(source))] String),
    /// A child reference points at a page the manifest doesn't define.
    #[display("page ({kind}, {id}) links to unknown child {child}")]
    UnknownChild { kind: String, id: String, child: String },
    /// Lookup of a page the manifest doesn't define.
    #[display("page not found: ({kind}, {id})")]
    PageNotFound { kind: String, id: String },
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Manifest(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ErrorKind::Format(PathBuf::from("site.ini")), "unsupported manifest format: site.ini")]
    #[case(
        ErrorKind::Duplicate { kind: "page".into(), id: "home".into() },
        "duplicate page (page, home)"
    )]
    #[case(ErrorKind::InvalidChild(":x".into()), "invalid child reference `:x`")]
    #[case(
        ErrorKind::UnknownChild { kind: "page".into(), id: "home".into(), child: "post:gone".into() },
        "page (page, home) links to unknown child post:gone"
    )]
    fn error_kind_display(#[case] kind: ErrorKind, #[case] expected: &str) {
        assert_eq!(kind.to_string(), expected);
    }
}
