//! Ranked multi-word search over a graph of content nodes.
//!
//! A [`SearchCoordinator`] walks the graph below a root node depth-first,
//! visiting every reachable node exactly once, and scores each against a
//! [`Query`]. A node matches only if every query word occurs somewhere in it
//! (substrings count). Matches are returned as [`SearchResult`]s, most
//! relevant first.
//!
//! Relevance is the node's summed field-weighted score divided by the
//! natural logarithm of its total size, so that a short page mentioning a
//! word beats a long page mentioning it just as often.

mod coordinator;
pub mod error;
mod query;
mod result;

pub use crate::coordinator::SearchCoordinator;
pub use crate::query::Query;
pub use crate::result::SearchResult;
