//! Weighted full-text search over a site of content nodes.
//!
//! Wires the workspace crates together: the site manifest
//! ([`trawl_site`]) provides the nodes, the [`NodeCache`] keeps one
//! instance per node, the [`ContentIndexer`] keeps their word tables, and
//! the [`SearchCoordinator`] answers queries from the configured root page.

pub mod error;

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::fmt::Write;
use std::sync::Arc;
use tracing::instrument;
use trawl_config::Config;
use trawl_index::ContentIndexer;
use trawl_node::{NodeCache, NodeRef};
use trawl_search::{Query, SearchCoordinator, SearchResult};
use trawl_site::{Site, parse_child};

/// A loaded site, ready to be searched from its root page.
#[derive(Debug)]
pub struct App {
    config: Config,
    search: SearchCoordinator,
    root: NodeRef,
}

impl App {
    /// Loads the site manifest named by `config` and resolves the root page,
    /// given as `id` (a page of the default kind) or `kind:id`.
    #[instrument(skip_all, fields(site = %config.site.display(), root = %config.root))]
    pub fn new(config: Config) -> Result<Self> {
        let site = Site::load(&config.site).or_raise(|| ErrorKind::Site)?;
        let mut builder = NodeCache::builder();
        site.register(&mut builder);
        let cache = Arc::new(builder.build());
        let locator = parse_child(&config.root).or_raise(|| ErrorKind::Root(config.root.clone()))?;
        let root = cache.locate(&locator).or_raise(|| ErrorKind::Root(config.root.clone()))?;
        let indexer = Arc::new(ContentIndexer::new(config.weights));
        tracing::info!(pages = site.len(), "Site loaded");
        Ok(Self {
            search: SearchCoordinator::new(cache, indexer),
            config,
            root,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn coordinator(&self) -> &SearchCoordinator {
        &self.search
    }

    /// Runs a search from the root page.
    pub fn search(&self, query: &Query) -> Result<Vec<SearchResult>> {
        self.search.search(&self.root, query).or_raise(|| ErrorKind::Unavailable)
    }
}

/// Renders at most `limit` results, one per line, with their relevance
/// relative to the first (best) result.
///
/// # Examples
///
/// ```rust
/// assert_eq!(trawl::format_results(&[], 10), "No results.\n");
/// ```
pub fn format_results(results: &[SearchResult], limit: usize) -> String {
    let Some(top) = results.first() else {
        return "No results.\n".to_string();
    };
    let mut out = String::new();
    for result in results.iter().take(limit) {
        let title = if result.title.is_empty() { &result.url } else { &result.title };
        // Writing to a String cannot fail.
        let _ = writeln!(out, "{:>3}%  {title}  {}", result.relevance(top.probability), result.url);
    }
    if results.len() > limit {
        let _ = writeln!(out, "... and {} more", results.len() - limit);
    }
    out
}
