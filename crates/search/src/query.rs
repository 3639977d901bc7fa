/// Normalized list of query words.
///
/// Words are lower-cased and blank words dropped. A query only matches a
/// node when *every* word does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    words: Vec<String>,
}

impl Query {
    /// Parses free text typed by a user, splitting it on whitespace.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use trawl_search::Query;
    /// let query = Query::parse("  Apple   PIE ");
    /// assert_eq!(query.words(), ["apple", "pie"]);
    /// ```
    pub fn parse(text: &str) -> Self {
        Self {
            words: text.split_whitespace().map(str::to_lowercase).collect(),
        }
    }

    /// Builds a query from words the caller has already split. Words are
    /// kept whole: one containing whitespace can never occur inside a
    /// token, so it matches nothing.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .filter(|word| !word.as_ref().trim().is_empty())
            .map(|word| word.as_ref().to_lowercase())
            .collect();
        Self { words }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
