//! The content node abstraction crawled and indexed by trawl.

use crate::error::Result;
use derive_more::{Display, From};
use std::fmt::{Debug, Formatter, Result as FmtResult, Write};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Shared handle to a live node instance.
pub type NodeRef = Arc<dyn Node>;

/// Identifies a family of nodes built by the same factory (`"page"`,
/// `"gallery"`, ...).
#[derive(Debug, Display, From, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKind(String);
impl NodeKind {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl From<&str> for NodeKind {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
impl AsRef<str> for NodeKind {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Disambiguates between several live instances of the same [`NodeKind`].
///
/// Usually derived from a request path or a parameter; an empty selector is
/// perfectly valid for kinds that only ever have one instance.
#[derive(Debug, Display, From, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Selector(String);
impl Selector {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl From<&str> for Selector {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
impl AsRef<str> for Selector {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Address of a node: which factory builds it, and which selector the
/// instance must answer to. Nodes list their children as locators and the
/// [`NodeCache`](crate::NodeCache) turns them into instances.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    pub kind: NodeKind,
    pub selector: Selector,
}
impl Locator {
    pub fn new(kind: impl Into<NodeKind>, selector: impl Into<Selector>) -> Self {
        Self {
            kind: kind.into(),
            selector: selector.into(),
        }
    }
}

/// Opaque value a node supplies so that cached index data can be validated.
///
/// Whenever the token a node reports differs from the one recorded alongside
/// its index snapshot, the snapshot is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Freshness {
    /// The node must never be cached; it is re-read on every visit.
    Volatile,
    /// Any change in value invalidates previously indexed data.
    Token(u64),
}
impl Freshness {
    pub fn is_volatile(&self) -> bool {
        matches!(self, Self::Volatile)
    }
}
impl From<u64> for Freshness {
    fn from(token: u64) -> Self {
        Self::Token(token)
    }
}

/// A unit of content in the site hierarchy.
///
/// Implementations own their metadata; everything here is read-only from
/// the point of view of the search engine. Markup generation, requests and
/// authorisation all live on the other side of this trait.
pub trait Node: Send + Sync + Debug {
    /// The kind of factory that produced this node.
    fn kind(&self) -> &NodeKind;

    /// Whether this instance is the one that should answer for `selector`.
    fn is_handler(&self, selector: &Selector) -> bool;

    fn url(&self) -> &str;

    fn title(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    /// Free-form keyword string; the heaviest-weighted field when indexing.
    fn keywords(&self) -> &str {
        ""
    }

    fn author(&self) -> &str {
        ""
    }

    fn author_link(&self) -> &str {
        ""
    }

    /// Ordered child locators, resolved through the
    /// [`NodeCache`](crate::NodeCache).
    fn children(&self) -> Vec<Locator> {
        Vec::new()
    }

    /// Writes the canonical text of the node into `sink`.
    ///
    /// Must work without any live request: the indexer calls it from
    /// whichever thread happens to notice the index is stale. The output may
    /// still contain markup.
    fn render_content(&self, sink: &mut dyn Write) -> Result<()>;

    fn freshness(&self) -> Freshness;
}

/// Hashes and compares a [`NodeRef`] by instance identity rather than by
/// value. Two handles are the same node only if they point at the same
/// allocation, which the [`NodeCache`](crate::NodeCache) guarantees for
/// repeated lookups.
#[derive(Clone)]
pub struct Identity(NodeRef);
impl Identity {
    pub fn new(node: &NodeRef) -> Self {
        Self(Arc::clone(node))
    }

    pub fn node(&self) -> &NodeRef {
        &self.0
    }

    fn address(&self) -> *const () {
        Arc::as_ptr(&self.0) as *const ()
    }
}
impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(self.address(), other.address())
    }
}
impl Eq for Identity {}
impl Hash for Identity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address().hash(state);
    }
}
impl Debug for Identity {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "Identity({}, {}, {:p})", self.0.kind(), self.0.url(), self.address())
    }
}
impl From<&NodeRef> for Identity {
    fn from(node: &NodeRef) -> Self {
        Self::new(node)
    }
}
