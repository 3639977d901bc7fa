use crate::snapshot::{Fields, Scorer};
use crate::text::{occurrences, strip_markup};
use crate::{Weights, render};
use trawl_node::Node;

/// Lower-cased copies of a node's fields, scored by searching each field
/// directly instead of going through a token table.
///
/// Used for [volatile](trawl_node::Freshness::Volatile) nodes, which are
/// never indexed.
#[derive(Debug, Clone)]
pub struct RawFields {
    keywords: String,
    description: String,
    title: String,
    author: String,
    content: String,
    total_size: u64,
    weights: Weights,
}

impl RawFields {
    /// Reads the node's current fields and renders its content.
    ///
    /// A render failure is logged and leaves the content empty; the other
    /// fields still match.
    pub fn capture(node: &dyn Node, weights: Weights) -> Self {
        let content = render(node).unwrap_or_else(|err| {
            tracing::warn!(url = node.url(), error = ?err, "Scoring volatile node without its content");
            String::new()
        });
        let fields = Fields::of(node, &content);
        Self {
            keywords: fields.keywords.to_lowercase(),
            description: fields.description.to_lowercase(),
            title: fields.title.to_lowercase(),
            author: fields.author.to_lowercase(),
            content: strip_markup(&content).to_lowercase(),
            total_size: fields.total_size(),
            weights,
        }
    }
}

impl Scorer for RawFields {
    fn score(&self, word: &str) -> u64 {
        occurrences(&self.keywords, word) * self.weights.keywords
            + occurrences(&self.description, word) * self.weights.description
            + occurrences(&self.title, word) * self.weights.title
            + occurrences(&self.author, word) * self.weights.author
            + occurrences(&self.content, word) * self.weights.content
    }

    fn total_size(&self) -> u64 {
        self.total_size
    }
}
