//! Node instance resolution.
//!
//! The [`NodeCache`] hands out canonical node instances: asking twice for
//! the same `(kind, selector)` returns the very same [`Arc`], so everything
//! downstream (visited sets, index slots) can rely on pointer identity.
//!
//! # Limitations
//! Instances are never evicted. Each kind's instance list only grows for as
//! long as the cache lives, and every lookup takes the same cache-wide lock.
//! Both are fine for a site whose set of nodes settles after warm-up, and
//! neither is fine for an unbounded selector space.

use crate::error::{ErrorKind, Result};
use crate::{Locator, Node, NodeKind, NodeRef, Selector};
use exn::{OptionExt, ResultExt};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;
use tracing::instrument;

/// Constructs a node instance for a selector.
///
/// Factories run while the cache lock is held, so they must not resolve
/// other nodes through the same cache.
pub type Factory = Box<dyn Fn(&Selector) -> Result<NodeRef> + Send + Sync>;

/// Registers one factory per node kind before the cache is put to use.
#[derive(Default)]
pub struct NodeCacheBuilder {
    factories: HashMap<NodeKind, Factory>,
}
impl NodeCacheBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the factory for `kind`, replacing any earlier registration.
    pub fn register<F>(&mut self, kind: impl Into<NodeKind>, factory: F) -> &mut Self
    where
        F: Fn(&Selector) -> Result<NodeRef> + Send + Sync + 'static,
    {
        let kind = kind.into();
        if self.factories.insert(kind.clone(), Box::new(factory)).is_some() {
            tracing::warn!(%kind, "Replacing previously registered node factory");
        }
        self
    }

    /// Consuming variant of [`register`](Self::register).
    pub fn with<F>(mut self, kind: impl Into<NodeKind>, factory: F) -> Self
    where
        F: Fn(&Selector) -> Result<NodeRef> + Send + Sync + 'static,
    {
        self.register(kind, factory);
        self
    }

    pub fn build(self) -> NodeCache {
        NodeCache {
            factories: self.factories,
            instances: Mutex::new(HashMap::new()),
        }
    }
}

/// Resolves and memoizes node instances.
pub struct NodeCache {
    factories: HashMap<NodeKind, Factory>,
    instances: Mutex<HashMap<NodeKind, Vec<NodeRef>>>,
}
impl NodeCache {
    pub fn builder() -> NodeCacheBuilder {
        NodeCacheBuilder::new()
    }

    /// Returns the live instance of `kind` that handles `selector`,
    /// constructing (and remembering) one if none does yet.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::Resolution`] when no factory is registered for `kind` or
    /// the factory fails. Failures are not remembered; the next call will
    /// ask the factory again.
    #[instrument(level = "trace", skip(self), fields(%kind, %selector))]
    pub fn resolve(&self, kind: &NodeKind, selector: &Selector) -> Result<NodeRef> {
        let mut instances = self.instances.lock();
        if let Some(node) = instances.get(kind).and_then(|list| list.iter().find(|node| node.is_handler(selector))) {
            return Ok(Arc::clone(node));
        }
        let node = self.construct(kind, selector).or_raise(|| ErrorKind::Resolution {
            kind: kind.clone(),
            selector: selector.clone(),
        })?;
        if !node.is_handler(selector) {
            // Nothing will ever find this instance again; every lookup for
            // this selector is going to construct another one.
            tracing::warn!(%kind, %selector, url = node.url(), "Constructed node does not handle its own selector");
        }
        let list = instances.entry(kind.clone()).or_default();
        list.push(Arc::clone(&node));
        tracing::debug!(%kind, %selector, instances = list.len(), "Cached new node instance");
        Ok(node)
    }

    /// Convenience wrapper around [`resolve`](Self::resolve).
    pub fn locate(&self, locator: &Locator) -> Result<NodeRef> {
        self.resolve(&locator.kind, &locator.selector)
    }

    /// Resolves every child locator of `node`, in order.
    ///
    /// Stops at the first child that cannot be resolved.
    pub fn children(&self, node: &dyn Node) -> Result<Vec<NodeRef>> {
        node.children().iter().map(|locator| self.locate(locator)).collect()
    }

    /// Total number of live instances across all kinds.
    pub fn len(&self) -> usize {
        self.instances.lock().values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn construct(&self, kind: &NodeKind, selector: &Selector) -> Result<NodeRef> {
        let factory = self.factories.get(kind).ok_or_raise(|| ErrorKind::UnknownKind(kind.clone()))?;
        factory(selector)
    }
}
impl Debug for NodeCache {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let mut kinds: Vec<_> = self.factories.keys().collect();
        kinds.sort();
        f.debug_struct("NodeCache").field("kinds", &kinds).field("instances", &self.len()).finish()
    }
}
