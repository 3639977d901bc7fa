//! Immutable per-node word tables.

use crate::Weights;
use crate::text::{length, occurrences, strip_markup, tokenize};
use std::collections::BTreeMap;
use trawl_node::{Freshness, Node};

/// Anything that can tell how strongly a query word matches a node.
pub trait Scorer {
    /// Weighted number of matches for `word`, which must already be
    /// lower-cased. Substring matches count: `"cat"` matches `"category"`.
    fn score(&self, word: &str) -> u64;

    /// Total weighted size of the node; the denominator of its relevance.
    fn total_size(&self) -> u64;
}

/// Borrowed view over everything that gets indexed for a node.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Fields<'a> {
    pub keywords: &'a str,
    pub description: &'a str,
    pub title: &'a str,
    pub author: &'a str,
    /// Rendered content, markup included.
    pub content: &'a str,
}
impl<'a> Fields<'a> {
    pub fn of(node: &'a dyn Node, content: &'a str) -> Self {
        Self {
            keywords: node.keywords(),
            description: node.description(),
            title: node.title(),
            author: node.author(),
            content,
        }
    }

    pub fn total_size(&self) -> u64 {
        length(self.content)
            + length(self.keywords)
            + length(self.description)
            + length(self.title)
            + length(self.author)
    }
}

/// Point-in-time word table of a single node.
///
/// Tokens are distinct, lower-cased and sorted; `counts[i]` is the weighted
/// frequency of `tokens[i]`. A snapshot is never modified once built: the
/// indexer replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSnapshot {
    tokens: Vec<String>,
    counts: Vec<u64>,
    total_size: u64,
    freshness: Freshness,
}

impl IndexSnapshot {
    pub(crate) fn build(fields: &Fields<'_>, weights: &Weights, freshness: Freshness) -> Self {
        let content = strip_markup(fields.content);
        let sources = [
            (content.as_ref(), weights.content),
            (fields.keywords, weights.keywords),
            (fields.description, weights.description),
            (fields.title, weights.title),
            (fields.author, weights.author),
        ];
        let mut table: BTreeMap<String, u64> = BTreeMap::new();
        for (text, weight) in sources {
            if weight == 0 {
                continue;
            }
            for token in tokenize(text) {
                *table.entry(token).or_default() += weight;
            }
        }
        let (tokens, counts) = table.into_iter().unzip();
        Self {
            tokens,
            counts,
            total_size: fields.total_size(),
            freshness,
        }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Weighted frequency of an exact token, `0` if absent.
    pub fn weight_of(&self, token: &str) -> u64 {
        self.tokens
            .binary_search_by(|candidate| candidate.as_str().cmp(token))
            .map(|i| self.counts[i])
            .unwrap_or(0)
    }

    /// Freshness token the snapshot was captured at. Ephemeral snapshots
    /// (never stored) report [`Freshness::Volatile`].
    pub fn freshness(&self) -> Freshness {
        self.freshness
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl Scorer for IndexSnapshot {
    fn score(&self, word: &str) -> u64 {
        self.tokens
            .iter()
            .zip(&self.counts)
            .map(|(token, count)| occurrences(token, word) * count)
            .sum()
    }

    fn total_size(&self) -> u64 {
        self.total_size
    }
}
