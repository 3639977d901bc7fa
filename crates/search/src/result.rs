use trawl_node::Node;

/// A node that matched every word of a query.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub url: String,
    /// Raw relevance. Only meaningful relative to other results of the same
    /// search; see [`relevance`](Self::relevance) for a display scale.
    pub probability: f64,
    pub title: String,
    pub description: String,
    pub author: String,
    pub author_link: String,
}

impl SearchResult {
    pub(crate) fn new(node: &dyn Node, probability: f64) -> Self {
        Self {
            url: node.url().to_string(),
            probability,
            title: node.title().to_string(),
            description: node.description().to_string(),
            author: node.author().to_string(),
            author_link: node.author_link().to_string(),
        }
    }

    /// Percentage (0 to 100) of this result's probability relative to `top`,
    /// usually the probability of the first result.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use trawl_search::SearchResult;
    /// # let result = |probability| SearchResult {
    /// #     url: String::new(), probability, title: String::new(), description: String::new(),
    /// #     author: String::new(), author_link: String::new(),
    /// # };
    /// assert_eq!(result(2.0).relevance(4.0), 50);
    /// assert_eq!(result(4.0).relevance(4.0), 100);
    /// ```
    pub fn relevance(&self, top: f64) -> u8 {
        if !top.is_finite() || top <= 0.0 || !self.probability.is_finite() {
            return 0;
        }
        (self.probability / top * 100.0).round().clamp(0.0, 100.0) as u8
    }
}

/// Orders results by descending probability. The sort is stable: equally
/// relevant results keep the order in which they were found.
pub(crate) fn rank(results: &mut [SearchResult]) {
    results.sort_by(|a, b| b.probability.total_cmp(&a.probability));
}

/// Divisor for sizes 0 and 1, whose logarithm is not positive. Kept below
/// `ln 2` so that relevance never increases with size.
const SMALLEST_DIVISOR: f64 = std::f64::consts::LN_2 / 2.0;

/// Relevance of a node scoring `score` with weighted size `total_size`.
///
/// Larger nodes need proportionally more matches; the logarithm keeps long
/// pages from being buried entirely.
pub(crate) fn probability(score: u64, total_size: u64) -> f64 {
    let divisor = if total_size >= 2 { (total_size as f64).ln() } else { SMALLEST_DIVISOR };
    score as f64 / divisor
}
