//! On-disk description of a site.

use crate::error::{ErrorKind, Result};
use serde::Deserialize;
use std::path::PathBuf;
use trawl_node::Locator;

/// Kind given to pages (and bare child references) that don't name one.
pub const DEFAULT_KIND: &str = "page";

/// Top-level manifest document: a flat list of pages.
///
/// ```toml
/// [[pages]]
/// id = "home"
/// url = "/"
/// title = "Home"
/// children = ["about", "post:hello-world"]
/// body = "<p>Welcome!</p>"
///
/// [[pages]]
/// kind = "post"
/// id = "hello-world"
/// title = "Hello, World"
/// source = "posts/hello.html"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteManifest {
    #[serde(default)]
    pub pages: Vec<PageSpec>,
}

/// A single page entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageSpec {
    #[serde(default = "default_kind")]
    pub kind: String,
    pub id: String,
    /// Defaults to `/{id}` for the default kind and `/{kind}/{id}` otherwise.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub keywords: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub author_link: String,
    /// `id` (of the default kind) or `kind:id`.
    #[serde(default)]
    pub children: Vec<String>,
    /// Inline content.
    #[serde(default)]
    pub body: Option<String>,
    /// Content file, relative to the manifest.
    #[serde(default)]
    pub source: Option<PathBuf>,
    /// Content changes on every request, so it must never be indexed.
    #[serde(default)]
    pub volatile: bool,
}

fn default_kind() -> String {
    DEFAULT_KIND.to_string()
}

impl PageSpec {
    pub fn url(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None if self.kind == DEFAULT_KIND => format!("/{}", self.id),
            None => format!("/{}/{}", self.kind, self.id),
        }
    }
}

/// Parses a child reference.
///
/// # Examples
///
/// ```rust
/// use trawl_site::parse_child;
/// let locator = parse_child("post:hello").unwrap();
/// assert_eq!(locator.kind.as_str(), "post");
/// assert_eq!(locator.selector.as_str(), "hello");
/// assert_eq!(parse_child("about").unwrap().kind.as_str(), "page");
/// ```
pub fn parse_child(reference: &str) -> Result<Locator> {
    let (kind, id) = reference.trim().split_once(':').unwrap_or((DEFAULT_KIND, reference.trim()));
    if kind.is_empty() || id.is_empty() {
        exn::bail!(ErrorKind::InvalidChild(reference.to_string()));
    }
    Ok(Locator::new(kind, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Figment;
    use figment::providers::{Format, Toml};
    use rstest::rstest;

    #[rstest]
    #[case("about", "page", "about")]
    #[case("post:hello", "post", "hello")]
    #[case(" tag:rust ", "tag", "rust")]
    fn valid_child_references(#[case] reference: &str, #[case] kind: &str, #[case] id: &str) {
        assert_eq!(parse_child(reference).unwrap(), Locator::new(kind, id));
    }

    #[rstest]
    #[case("")]
    #[case(":hello")]
    #[case("post:")]
    fn invalid_child_references(#[case] reference: &str) {
        let err = parse_child(reference).unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidChild(reference.to_string()));
    }

    #[test]
    fn page_defaults() {
        let manifest: SiteManifest = Figment::from(Toml::string(
            r#"
            [[pages]]
            id = "home"

            [[pages]]
            kind = "post"
            id = "hello"
            url = "/blog/hello"
            "#,
        ))
        .extract()
        .unwrap();
        let [home, post] = manifest.pages.as_slice() else {
            panic!("expected two pages");
        };
        assert_eq!(home.kind, "page");
        assert_eq!(home.url(), "/home");
        assert!(!home.volatile);
        assert!(home.children.is_empty());
        assert_eq!(post.url(), "/blog/hello");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result: std::result::Result<SiteManifest, _> = Figment::from(Toml::string(
            r#"
            [[pages]]
            id = "home"
            colour = "blue"
            "#,
        ))
        .extract();
        assert!(result.is_err());
    }
}
