//! Crawling and scoring.

use crate::error::{ErrorKind, Result};
use crate::result::{probability, rank};
use crate::{Query, SearchResult};
use exn::ResultExt;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::instrument;
use trawl_index::{ContentIndexer, RawFields, Scorer};
use trawl_node::error::Result as NodeResult;
use trawl_node::{Identity, NodeCache, NodeRef};

/// Nodes already scored during one search.
type Visited = HashSet<Identity>;

/// Answers ranked queries over the node graph below a root.
///
/// Holds the shared [`NodeCache`] (to turn child locators into instances)
/// and [`ContentIndexer`] (to get each node's word table). Both are safe to
/// share, so any number of threads can search through the same coordinator
/// at once.
#[derive(Debug, Clone)]
pub struct SearchCoordinator {
    cache: Arc<NodeCache>,
    indexer: Arc<ContentIndexer>,
}

impl SearchCoordinator {
    pub fn new(cache: Arc<NodeCache>, indexer: Arc<ContentIndexer>) -> Self {
        Self { cache, indexer }
    }

    pub fn cache(&self) -> &Arc<NodeCache> {
        &self.cache
    }

    pub fn indexer(&self) -> &Arc<ContentIndexer> {
        &self.indexer
    }

    /// Finds every node at or below `root` matching all words of `query`,
    /// most relevant first.
    ///
    /// Each node is scored at most once, however many parents it has and
    /// even if the graph loops back on itself. Nodes that don't match are
    /// still crawled through. An empty query matches nothing and crawls
    /// nothing.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::Unavailable`] if a child node cannot be resolved. There
    /// are no partial results.
    #[instrument(skip_all, fields(root = root.url(), words = ?query.words()))]
    pub fn search(&self, root: &NodeRef, query: &Query) -> Result<Vec<SearchResult>> {
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let mut visited = Visited::new();
        let mut results = Vec::new();
        self.crawl(root, query, &mut visited, &mut results).or_raise(|| ErrorKind::Unavailable)?;
        rank(&mut results);
        tracing::debug!(visited = visited.len(), matched = results.len(), "Search complete");
        Ok(results)
    }

    /// Shorthand for searching with [`Query::from_words`].
    pub fn search_words<S: AsRef<str>>(&self, root: &NodeRef, words: &[S]) -> Result<Vec<SearchResult>> {
        self.search(root, &Query::from_words(words))
    }

    /// Depth-first, pre-order, children in declared order. An explicit stack
    /// stands in for recursion so that deep trees can't exhaust the thread's
    /// stack.
    fn crawl(
        &self,
        root: &NodeRef,
        query: &Query,
        visited: &mut Visited,
        results: &mut Vec<SearchResult>,
    ) -> NodeResult<()> {
        let mut pending = vec![Arc::clone(root)];
        while let Some(node) = pending.pop() {
            // Marked before descending, so cycles and diamonds end here.
            if !visited.insert(Identity::new(&node)) {
                continue;
            }
            if let Some(result) = self.score(&node, query) {
                results.push(result);
            }
            let children = self.cache.children(node.as_ref())?;
            pending.extend(children.into_iter().rev());
        }
        Ok(())
    }

    fn score(&self, node: &NodeRef, query: &Query) -> Option<SearchResult> {
        // Read once: the token decides the path and is what gets recorded.
        let freshness = node.freshness();
        let probability = if freshness.is_volatile() {
            Self::match_all(&RawFields::capture(node.as_ref(), *self.indexer.weights()), query)
        } else {
            Self::match_all(self.indexer.ensure_indexed_at(node, freshness).as_ref(), query)
        }?;
        tracing::trace!(url = node.url(), probability, "Node matched");
        Some(SearchResult::new(node.as_ref(), probability))
    }

    /// `None` as soon as any word fails to match: a strong match on the
    /// other words does not make up for it.
    fn match_all(scorer: &impl Scorer, query: &Query) -> Option<f64> {
        let mut total = 0;
        for word in query.words() {
            match scorer.score(word) {
                0 => return None,
                score => total += score,
            }
        }
        Some(probability(total, scorer.total_size()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trawl_node::{MockNode, MockSite};

    fn coordinator(site: &MockSite) -> SearchCoordinator {
        SearchCoordinator::new(Arc::new(site.cache()), Arc::new(ContentIndexer::default()))
    }

    fn urls(results: &[SearchResult]) -> Vec<&str> {
        results.iter().map(|r| r.url.as_str()).collect()
    }

    fn orchard() -> MockSite {
        MockSite::new([
            MockNode::new("page", "root")
                .with_title("Home")
                .with_child("page", "a")
                .with_child("page", "b"),
            MockNode::new("page", "a").with_title("apple pie").with_keywords("fruit"),
            MockNode::new("page", "b").with_title("banana split"),
        ])
    }

    #[test]
    fn title_match() {
        let site = orchard();
        let results = coordinator(&site).search(&site.node_ref("page", "root"), &Query::parse("apple")).unwrap();
        assert_eq!(urls(&results), ["/page/a"]);
        assert_eq!(results[0].title, "apple pie");
    }

    #[test]
    fn keyword_match() {
        let site = orchard();
        let results = coordinator(&site).search_words(&site.node_ref("page", "root"), &["fruit"]).unwrap();
        assert_eq!(urls(&results), ["/page/a"]);
    }

    #[test]
    fn no_match() {
        let site = orchard();
        let results = coordinator(&site).search_words(&site.node_ref("page", "root"), &["xyz123"]).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn every_word_must_match() {
        let site = orchard();
        let search = coordinator(&site);
        let root = site.node_ref("page", "root");
        assert!(search.search(&root, &Query::parse("apple banana")).unwrap().is_empty());
        assert!(search.search(&root, &Query::parse("fruit split")).unwrap().is_empty());
        assert_eq!(urls(&search.search(&root, &Query::parse("apple fruit")).unwrap()), ["/page/a"]);
    }

    #[test]
    fn one_missing_word_beats_strong_partial_match() {
        let site = MockSite::new([MockNode::new("page", "root")
            .with_keywords("rust rust rust rust")
            .with_title("Rust Rust")
            .with_body("rust ".repeat(50))]);
        let results = coordinator(&site).search(&site.node_ref("page", "root"), &Query::parse("rust python")).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn substring_matches_count() {
        let site = MockSite::new([MockNode::new("page", "root").with_title("Category Theory")]);
        let results = coordinator(&site).search(&site.node_ref("page", "root"), &Query::parse("CAT")).unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn diamond_is_scored_once() {
        let site = MockSite::new([
            MockNode::new("page", "root").with_child("page", "b").with_child("page", "c"),
            MockNode::new("page", "b").with_title("left").with_child("page", "a"),
            MockNode::new("page", "c").with_title("right").with_child("page", "a"),
            MockNode::new("page", "a").with_title("shared target"),
        ]);
        let search = coordinator(&site);
        let results = search.search(&site.node_ref("page", "root"), &Query::parse("target")).unwrap();
        assert_eq!(urls(&results), ["/page/a"]);
        assert_eq!(site.node("page", "a").renders(), 1);
    }

    #[test]
    fn cycles_terminate() {
        let site = MockSite::new([
            MockNode::new("page", "root").with_title("loop").with_child("page", "a"),
            MockNode::new("page", "a").with_title("loop").with_child("page", "b"),
            MockNode::new("page", "b").with_title("loop").with_child("page", "root").with_child("page", "a"),
        ]);
        let results = coordinator(&site).search(&site.node_ref("page", "root"), &Query::parse("loop")).unwrap();
        let mut found = urls(&results);
        found.sort();
        assert_eq!(found, ["/page/a", "/page/b", "/page/root"]);
    }

    #[test]
    fn non_matching_parents_are_crawled_through() {
        let site = MockSite::new([
            MockNode::new("page", "root").with_title("index").with_child("page", "mid"),
            MockNode::new("page", "mid").with_title("section").with_child("page", "leaf"),
            MockNode::new("page", "leaf").with_title("needle"),
        ]);
        let results = coordinator(&site).search(&site.node_ref("page", "root"), &Query::parse("needle")).unwrap();
        assert_eq!(urls(&results), ["/page/leaf"]);
    }

    #[test]
    fn results_are_ranked() {
        // Same score for "plum" (title, 5), different sizes: the smaller
        // node is more relevant.
        let site = MockSite::new([
            MockNode::new("page", "root").with_child("page", "long").with_child("page", "short"),
            MockNode::new("page", "long").with_title("plum").with_body("filler ".repeat(200)),
            MockNode::new("page", "short").with_title("plum").with_body("tiny"),
        ]);
        let results = coordinator(&site).search(&site.node_ref("page", "root"), &Query::parse("plum")).unwrap();
        assert_eq!(urls(&results), ["/page/short", "/page/long"]);
        assert!(results[0].probability > results[1].probability);
        let expected = 5.0 / ((4 + 4) as f64).ln();
        assert!((results[0].probability - expected).abs() < 1e-12);
    }

    #[test]
    fn result_carries_metadata() {
        let site = MockSite::new([MockNode::new("page", "root")
            .with_url("/about")
            .with_title("About")
            .with_description("Who we are")
            .with_author("Alice", "/people/alice")]);
        let results = coordinator(&site).search(&site.node_ref("page", "root"), &Query::parse("about")).unwrap();
        let expected = SearchResult {
            url: "/about".to_string(),
            probability: results[0].probability,
            title: "About".to_string(),
            description: "Who we are".to_string(),
            author: "Alice".to_string(),
            author_link: "/people/alice".to_string(),
        };
        assert_eq!(results, [expected]);
    }

    #[test]
    fn empty_query_scores_nothing() {
        let site = orchard();
        let search = coordinator(&site);
        let results = search.search(&site.node_ref("page", "root"), &Query::parse("   ")).unwrap();
        assert!(results.is_empty());
        assert!(search.indexer().is_empty());
        assert!(search.cache().is_empty());
        assert_eq!(site.node("page", "root").renders(), 0);
    }

    #[test]
    fn unresolvable_child_fails_the_search() {
        let site = MockSite::new([
            MockNode::new("page", "root").with_title("home").with_child("page", "gone"),
            MockNode::new("page", "other"),
        ]);
        let err = coordinator(&site).search(&site.node_ref("page", "root"), &Query::parse("home")).unwrap_err();
        assert_eq!(*err, ErrorKind::Unavailable);
        assert_eq!((*err).to_string(), "search temporarily unavailable");
    }

    #[test]
    fn volatile_nodes_are_scored_raw() {
        let site = MockSite::new([
            MockNode::new("page", "root").with_child("page", "live"),
            MockNode::new("page", "live").with_title("Live scores").with_body("<b>goal</b>").volatile(),
        ]);
        let search = coordinator(&site);
        let root = site.node_ref("page", "root");
        assert_eq!(urls(&search.search(&root, &Query::parse("goal")).unwrap()), ["/page/live"]);
        site.node("page", "live").set_body("<b>halftime</b>");
        assert!(search.search(&root, &Query::parse("goal")).unwrap().is_empty());
        assert_eq!(urls(&search.search(&root, &Query::parse("halftime")).unwrap()), ["/page/live"]);
        // Only the root was ever indexed.
        assert_eq!(search.indexer().len(), 1);
    }

    #[test]
    fn stale_index_is_still_searchable() {
        let site = MockSite::new([MockNode::new("page", "root").with_body("original")]);
        let search = coordinator(&site);
        let root = site.node_ref("page", "root");
        assert_eq!(search.search(&root, &Query::parse("original")).unwrap().len(), 1);
        let node = site.node("page", "root");
        node.set_body("replacement");
        node.set_freshness(2);
        node.set_failing(true);
        assert_eq!(search.search(&root, &Query::parse("original")).unwrap().len(), 1);
        node.set_failing(false);
        assert!(search.search(&root, &Query::parse("original")).unwrap().is_empty());
        assert_eq!(search.search(&root, &Query::parse("replacement")).unwrap().len(), 1);
    }

    #[test]
    fn freshness_is_read_once_per_visit() {
        let site = orchard();
        let search = coordinator(&site);
        let root = site.node_ref("page", "root");
        search.search(&root, &Query::parse("apple")).unwrap();
        search.search(&root, &Query::parse("banana")).unwrap();
        for id in ["root", "a", "b"] {
            assert_eq!(site.node("page", id).freshness_reads(), 2, "page {id}");
        }
    }

    #[test]
    fn pre_split_words_are_not_split_again() {
        let site = orchard();
        let search = coordinator(&site);
        let root = site.node_ref("page", "root");
        assert!(search.search_words(&root, &["apple pie"]).unwrap().is_empty());
        assert_eq!(urls(&search.search_words(&root, &["apple", "pie"]).unwrap()), ["/page/a"]);
        assert_eq!(urls(&search.search(&root, &Query::parse("apple pie")).unwrap()), ["/page/a"]);
    }

    #[test]
    fn smaller_node_ranks_first_on_equal_score() {
        let site = MockSite::new([
            MockNode::new("page", "root").with_child("page", "two").with_child("page", "one"),
            MockNode::new("page", "two").with_title("ab"),
            MockNode::new("page", "one").with_title("a"),
        ]);
        let results = coordinator(&site).search(&site.node_ref("page", "root"), &Query::parse("a")).unwrap();
        assert_eq!(urls(&results), ["/page/one", "/page/two"]);
        assert!(results[0].probability > results[1].probability);
    }

    #[test]
    fn concurrent_searches_agree() {
        let site = orchard();
        let search = coordinator(&site);
        let root = site.node_ref("page", "root");
        let all: Vec<Vec<SearchResult>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| search.search(&root, &Query::parse("apple")).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(all.iter().all(|results| urls(results) == ["/page/a"]));
        assert_eq!(site.node("page", "a").renders(), 1);
    }
}
