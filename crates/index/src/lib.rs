//! Field-weighted word index, rebuilt lazily per content node.
//!
//! Every [`Node`](trawl_node::Node) gets its own [`IndexSnapshot`]: a sorted
//! table of lower-cased tokens and their weighted frequencies, built from the
//! node's rendered content (with markup stripped) plus its keywords,
//! description, title and author. The [`ContentIndexer`] keeps these tables
//! and rebuilds one only when the node's freshness token changes.
//!
//! Volatile nodes are never stored; they are either indexed into a
//! throwaway snapshot or scored straight from their fields with
//! [`RawFields`].

pub mod error;
mod indexer;
mod raw;
mod snapshot;
mod text;
mod weights;

pub(crate) use crate::indexer::render;
pub use crate::indexer::{ContentIndexer, IndexStats};
pub use crate::raw::RawFields;
pub use crate::snapshot::{IndexSnapshot, Scorer};
pub use crate::text::{strip_markup, tokenize};
pub use crate::weights::Weights;
