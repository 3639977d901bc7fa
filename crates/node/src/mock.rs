//! In-memory nodes for testing.

use crate::error::{ErrorKind, Result};
use crate::{Freshness, Locator, Node, NodeCache, NodeKind, NodeRef, Selector};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// A node whose content and freshness can be changed from the outside, and
/// which counts how often it has been rendered.
///
/// Builder methods (`with_*`) configure the node before it is shared;
/// setters (`set_*`) work through `&self` afterwards.
#[derive(Debug)]
pub struct MockNode {
    kind: NodeKind,
    selector: Selector,
    url: String,
    title: String,
    description: String,
    keywords: String,
    author: String,
    author_link: String,
    children: Vec<Locator>,
    body: Mutex<String>,
    freshness: Mutex<Freshness>,
    failing: Mutex<bool>,
    render_delay: Option<Duration>,
    renders: AtomicUsize,
    freshness_reads: AtomicUsize,
}

impl MockNode {
    /// A node answering to exactly `selector`, with an empty body and a
    /// freshness token of `1`.
    pub fn new(kind: impl Into<NodeKind>, selector: impl Into<Selector>) -> Self {
        let kind = kind.into();
        let selector = selector.into();
        Self {
            url: format!("/{kind}/{selector}"),
            kind,
            selector,
            title: String::new(),
            description: String::new(),
            keywords: String::new(),
            author: String::new(),
            author_link: String::new(),
            children: Vec::new(),
            body: Mutex::new(String::new()),
            freshness: Mutex::new(Freshness::Token(1)),
            failing: Mutex::new(false),
            render_delay: None,
            renders: AtomicUsize::new(0),
            freshness_reads: AtomicUsize::new(0),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_keywords(mut self, keywords: impl Into<String>) -> Self {
        self.keywords = keywords.into();
        self
    }

    pub fn with_author(mut self, author: impl Into<String>, link: impl Into<String>) -> Self {
        self.author = author.into();
        self.author_link = link.into();
        self
    }

    pub fn with_body(self, body: impl Into<String>) -> Self {
        *self.body.lock() = body.into();
        self
    }

    pub fn with_child(mut self, kind: impl Into<NodeKind>, selector: impl Into<Selector>) -> Self {
        self.children.push(Locator::new(kind, selector));
        self
    }

    pub fn with_freshness(self, freshness: impl Into<Freshness>) -> Self {
        *self.freshness.lock() = freshness.into();
        self
    }

    /// Marks the node as never cacheable.
    pub fn volatile(self) -> Self {
        self.with_freshness(Freshness::Volatile)
    }

    /// Sleeps for `delay` inside every render, to widen race windows.
    pub fn with_render_delay(mut self, delay: Duration) -> Self {
        self.render_delay = Some(delay);
        self
    }

    pub fn set_body(&self, body: impl Into<String>) {
        *self.body.lock() = body.into();
    }

    pub fn set_freshness(&self, freshness: impl Into<Freshness>) {
        *self.freshness.lock() = freshness.into();
    }

    /// While set, every render fails with [`ErrorKind::Render`].
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock() = failing;
    }

    /// Number of times the content has been rendered (including failures).
    pub fn renders(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }

    /// Number of times the freshness token has been read.
    pub fn freshness_reads(&self) -> usize {
        self.freshness_reads.load(Ordering::SeqCst)
    }
}

impl Node for MockNode {
    fn kind(&self) -> &NodeKind {
        &self.kind
    }

    fn is_handler(&self, selector: &Selector) -> bool {
        self.selector == *selector
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn keywords(&self) -> &str {
        &self.keywords
    }

    fn author(&self) -> &str {
        &self.author
    }

    fn author_link(&self) -> &str {
        &self.author_link
    }

    fn children(&self) -> Vec<Locator> {
        self.children.clone()
    }

    fn render_content(&self, sink: &mut dyn Write) -> Result<()> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.render_delay {
            std::thread::sleep(delay);
        }
        if *self.failing.lock() {
            exn::bail!(ErrorKind::Render(self.url.clone()));
        }
        let body = self.body.lock().clone();
        if sink.write_str(&body).is_err() {
            exn::bail!(ErrorKind::Render(self.url.clone()));
        }
        Ok(())
    }

    fn freshness(&self) -> Freshness {
        self.freshness_reads.fetch_add(1, Ordering::SeqCst);
        *self.freshness.lock()
    }
}

/// A fixed set of [`MockNode`]s served through a [`NodeCache`].
///
/// The registered factories hand out the pre-built instances, so tests can
/// keep a typed handle ([`node`](Self::node)) to poke at a node while the
/// engine works on the very same allocation.
///
/// Panics (deliberately) on duplicate `(kind, selector)` pairs: if the test
/// setup is wrong, the test should not pass.
pub struct MockSite {
    nodes: Arc<HashMap<(NodeKind, Selector), Arc<MockNode>>>,
}

impl MockSite {
    pub fn new(nodes: impl IntoIterator<Item = MockNode>) -> Self {
        let mut map = HashMap::new();
        for node in nodes {
            let key = (node.kind.clone(), node.selector.clone());
            if map.insert(key, Arc::new(node)).is_some() {
                panic!("MockSite::new: duplicate mock node");
            }
        }
        Self { nodes: Arc::new(map) }
    }

    /// Typed handle to a mock node. Panics if it doesn't exist.
    pub fn node(&self, kind: impl Into<NodeKind>, selector: impl Into<Selector>) -> Arc<MockNode> {
        let key = (kind.into(), selector.into());
        match self.nodes.get(&key) {
            Some(node) => Arc::clone(node),
            None => panic!("MockSite::node: no mock node ({}, {})", key.0, key.1),
        }
    }

    /// Same as [`node`](Self::node), as a type-erased [`NodeRef`].
    pub fn node_ref(&self, kind: impl Into<NodeKind>, selector: impl Into<Selector>) -> NodeRef {
        self.node(kind, selector)
    }

    /// Builds a cache with one factory per kind present in the site.
    /// Selectors without a mock node fail with [`ErrorKind::Factory`].
    pub fn cache(&self) -> NodeCache {
        let mut builder = NodeCache::builder();
        let mut kinds: Vec<_> = self.nodes.keys().map(|(kind, _)| kind.clone()).collect();
        kinds.sort();
        kinds.dedup();
        for kind in kinds {
            let nodes = Arc::clone(&self.nodes);
            let factory_kind = kind.clone();
            builder.register(kind, move |selector: &Selector| {
                match nodes.get(&(factory_kind.clone(), selector.clone())) {
                    Some(node) => Ok(Arc::clone(node) as NodeRef),
                    None => exn::bail!(ErrorKind::Factory(format!("no mock node ({factory_kind}, {selector})"))),
                }
            });
        }
        builder.build()
    }
}
