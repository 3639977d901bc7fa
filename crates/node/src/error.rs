//! Node Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use crate::{NodeKind, Selector};
use derive_more::{Display, Error};

/// A node error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for node operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// No instance of the node kind could be produced for the selector. The
    /// cause (unknown kind, or the factory's own failure) is attached as a
    /// child of the error tree.
    #[display("unable to resolve node ({kind}, {selector})")]
    Resolution {
        /// The node kind that was requested.
        kind: NodeKind,
        /// The selector the instance had to answer to.
        selector: Selector,
    },
    /// No factory was registered for the node kind.
    #[display("no factory registered for node kind: {_0}")]
    UnknownKind(#[error(not(source))] NodeKind),
    /// A registered factory refused to construct the node.
    #[display("node factory failed: {_0}")]
    Factory(#[error(not(source))] String),
    /// The node could not render its content.
    #[display("failed to render content of {_0}")]
    Render(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Rendering usually touches I/O; resolution failures are cached
        // misconfiguration and will fail again the same way.
        matches!(self, Self::Render(_))
    }
}
