//! Content nodes and their canonical instances.
//!
//! A [`Node`] is anything trawl can crawl and index: it has metadata, text it
//! can render, and children. Nodes are addressed by [`Locator`] (a
//! [`NodeKind`] plus a [`Selector`]) and turned into live instances by the
//! [`NodeCache`], which guarantees that repeated lookups of the same node
//! yield the same allocation.

mod cache;
pub mod error;
#[cfg(feature = "mock")]
mod mock;
mod node;

pub use crate::cache::{Factory, NodeCache, NodeCacheBuilder};
#[cfg(feature = "mock")]
pub use crate::mock::{MockNode, MockSite};
pub use crate::node::{Freshness, Identity, Locator, Node, NodeKind, NodeRef, Selector};
