//! Lazy, freshness-checked index maintenance.

use crate::error::{ErrorKind, Result};
use crate::snapshot::{Fields, IndexSnapshot};
use crate::Weights;
use arc_swap::ArcSwapOption;
use exn::ResultExt;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::instrument;
use trawl_node::{Freshness, Identity, Node, NodeRef};

/// Renders a node's content into a fresh buffer, through the same neutral
/// path regardless of who is asking.
pub(crate) fn render(node: &dyn Node) -> Result<String> {
    let mut content = String::new();
    node.render_content(&mut content).or_raise(|| ErrorKind::Rebuild(node.url().to_string()))?;
    Ok(content)
}

/// Per-node state: the published snapshot, and the gate serializing
/// rebuilds of this one node.
struct Slot {
    current: ArcSwapOption<IndexSnapshot>,
    rebuild: Mutex<()>,
}
impl Slot {
    fn new() -> Self {
        Self {
            current: ArcSwapOption::empty(),
            rebuild: Mutex::new(()),
        }
    }

    /// The published snapshot, if it was captured at `freshness`.
    fn fresh(&self, freshness: Freshness) -> Option<Arc<IndexSnapshot>> {
        self.current.load_full().filter(|snapshot| snapshot.freshness() == freshness)
    }
}

/// Counters describing what the indexer has been doing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexStats {
    /// Snapshots built and published.
    pub rebuilds: u64,
    /// Lookups answered by an already published snapshot.
    pub hits: u64,
    /// Rebuilds abandoned because the content failed to render.
    pub failures: u64,
    /// Throwaway snapshots built for volatile nodes (or failed first builds).
    pub ephemeral: u64,
}

#[derive(Default)]
struct Counters {
    rebuilds: AtomicU64,
    hits: AtomicU64,
    failures: AtomicU64,
    ephemeral: AtomicU64,
}
impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Maintains one lazily rebuilt [`IndexSnapshot`] per node.
///
/// A snapshot is rebuilt only when the node's [`Freshness`] token no longer
/// matches the one recorded in it. Readers never block on each other: the
/// published snapshot is swapped in atomically, so a concurrent reader sees
/// either the old table or the new one. Rebuilds of the same node are
/// serialized; rebuilds of different nodes are independent.
pub struct ContentIndexer {
    weights: Weights,
    slots: Mutex<HashMap<Identity, Arc<Slot>>>,
    counters: Counters,
}

impl Default for ContentIndexer {
    fn default() -> Self {
        Self::new(Weights::default())
    }
}

impl std::fmt::Debug for ContentIndexer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentIndexer")
            .field("weights", &self.weights)
            .field("nodes", &self.len())
            .field("stats", &self.stats())
            .finish()
    }
}

impl ContentIndexer {
    pub fn new(weights: Weights) -> Self {
        Self {
            weights,
            slots: Mutex::new(HashMap::new()),
            counters: Counters::default(),
        }
    }

    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    /// Returns an up-to-date snapshot of `node`, rebuilding it if the node's
    /// freshness token has moved on.
    ///
    /// Never fails. If the content cannot be rendered the failure is logged,
    /// the previously published snapshot is returned, and the stale token is
    /// kept so that the next call tries again. A node that has never been
    /// indexed successfully gets a throwaway snapshot of its metadata.
    pub fn ensure_indexed(&self, node: &NodeRef) -> Arc<IndexSnapshot> {
        self.ensure_indexed_at(node, node.freshness())
    }

    /// [`ensure_indexed`](Self::ensure_indexed) with a freshness token the
    /// caller has already read from `node`, so that the node is asked only
    /// once and both sides agree on the token.
    ///
    /// The token must be read before rendering: if the node changes
    /// mid-rebuild, the recorded token is older than the content and the
    /// next call simply rebuilds again.
    pub fn ensure_indexed_at(&self, node: &NodeRef, freshness: Freshness) -> Arc<IndexSnapshot> {
        if freshness.is_volatile() {
            Counters::bump(&self.counters.ephemeral);
            return Arc::new(self.ephemeral(node.as_ref()));
        }
        let slot = self.slot(node);
        if let Some(snapshot) = slot.fresh(freshness) {
            Counters::bump(&self.counters.hits);
            return snapshot;
        }
        let _gate = slot.rebuild.lock();
        // Somebody else may have finished the same rebuild while we waited.
        if let Some(snapshot) = slot.fresh(freshness) {
            Counters::bump(&self.counters.hits);
            return snapshot;
        }
        match self.rebuild(node.as_ref(), freshness) {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                slot.current.store(Some(Arc::clone(&snapshot)));
                Counters::bump(&self.counters.rebuilds);
                snapshot
            },
            Err(err) => {
                Counters::bump(&self.counters.failures);
                tracing::warn!(url = node.url(), error = ?err, "Index rebuild failed; keeping previous snapshot");
                match slot.current.load_full() {
                    Some(previous) => previous,
                    None => {
                        Counters::bump(&self.counters.ephemeral);
                        Arc::new(IndexSnapshot::build(&Fields::of(node.as_ref(), ""), &self.weights, Freshness::Volatile))
                    },
                }
            },
        }
    }

    /// The currently published snapshot of `node`, without checking its
    /// freshness or rebuilding anything.
    pub fn peek(&self, node: &NodeRef) -> Option<Arc<IndexSnapshot>> {
        let slot = self.slots.lock().get(&Identity::new(node)).cloned()?;
        slot.current.load_full()
    }

    /// Number of nodes the indexer holds state for.
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            rebuilds: self.counters.rebuilds.load(Ordering::Relaxed),
            hits: self.counters.hits.load(Ordering::Relaxed),
            failures: self.counters.failures.load(Ordering::Relaxed),
            ephemeral: self.counters.ephemeral.load(Ordering::Relaxed),
        }
    }

    fn slot(&self, node: &NodeRef) -> Arc<Slot> {
        let mut slots = self.slots.lock();
        Arc::clone(slots.entry(Identity::new(node)).or_insert_with(|| Arc::new(Slot::new())))
    }

    #[instrument(level = "debug", skip_all, fields(url = node.url(), ?freshness))]
    fn rebuild(&self, node: &dyn Node, freshness: Freshness) -> Result<IndexSnapshot> {
        let content = render(node)?;
        let snapshot = IndexSnapshot::build(&Fields::of(node, &content), &self.weights, freshness);
        tracing::debug!(tokens = snapshot.len(), "Rebuilt index snapshot");
        Ok(snapshot)
    }

    fn ephemeral(&self, node: &dyn Node) -> IndexSnapshot {
        let content = render(node).unwrap_or_else(|err| {
            tracing::warn!(url = node.url(), error = ?err, "Indexing volatile node without its content");
            String::new()
        });
        IndexSnapshot::build(&Fields::of(node, &content), &self.weights, Freshness::Volatile)
    }
}
