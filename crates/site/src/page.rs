use crate::manifest::PageSpec;
use exn::ResultExt;
use std::fmt::{self, Write};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use trawl_node::error::{ErrorKind as NodeErrorKind, Result as NodeResult};
use trawl_node::{Freshness, Locator, Node, NodeKind, Selector};

/// Where a page's content comes from.
#[derive(Debug, Clone)]
enum Content {
    /// Fixed text; the token is a hash of it and never changes.
    Inline { body: String, token: u64 },
    /// Read on every render; the token follows the file's size and mtime.
    File(PathBuf),
}

/// A page described by a site manifest.
#[derive(Debug, Clone)]
pub struct Page {
    kind: NodeKind,
    id: Selector,
    url: String,
    title: String,
    description: String,
    keywords: String,
    author: String,
    author_link: String,
    children: Vec<Locator>,
    content: Content,
    volatile: bool,
}

impl Page {
    /// Builds a page from its (validated) spec. Source paths are resolved
    /// against `base`.
    pub(crate) fn new(spec: PageSpec, children: Vec<Locator>, base: &Path) -> Self {
        let url = spec.url();
        let content = match spec.source {
            Some(source) => Content::File(base.join(source)),
            None => {
                let body = spec.body.unwrap_or_default();
                let token = token(blake3::hash(body.as_bytes()));
                Content::Inline { body, token }
            },
        };
        Self {
            kind: NodeKind::from(spec.kind),
            id: Selector::from(spec.id),
            url,
            title: spec.title,
            description: spec.description,
            keywords: spec.keywords,
            author: spec.author,
            author_link: spec.author_link,
            children,
            content,
            volatile: spec.volatile,
        }
    }

    pub fn id(&self) -> &Selector {
        &self.id
    }

    /// Content file, if the page isn't inline.
    pub fn source(&self) -> Option<&Path> {
        match &self.content {
            Content::File(path) => Some(path),
            Content::Inline { .. } => None,
        }
    }
}

impl Node for Page {
    fn kind(&self) -> &NodeKind {
        &self.kind
    }

    fn is_handler(&self, selector: &Selector) -> bool {
        self.id == *selector
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

    fn render_content(&self, sink: &mut dyn Write) -> NodeResult<()> {
        match &self.content {
            Content::Inline { body, .. } => {
                sink.write_str(body).or_raise(|| NodeErrorKind::Render(self.url.clone()))?;
            },
            Content::File(path) => {
                let body = std::fs::read_to_string(path).or_raise(|| NodeErrorKind::Render(self.url.clone()))?;
                sink.write_str(&body).or_raise(|| NodeErrorKind::Render(self.url.clone()))?;
            },
        }
        Ok(())
    }

    fn freshness(&self) -> Freshness {
        if self.volatile {
            return Freshness::Volatile;
        }
        match &self.content {
            Content::Inline { token, .. } => Freshness::Token(*token),
            Content::File(path) => file_token(path),
        }
    }
}

/// Token of a content file, derived from its size and modification time so
/// that checking it doesn't read the file. An unreadable file gets token `0`;
/// rendering it will fail and the indexer keeps what it had.
fn file_token(path: &Path) -> Freshness {
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(err) => {
            tracing::trace!(path = %path.display(), error = %err, "Unable to stat page source");
            return Freshness::Token(0);
        },
    };
    let modified = metadata
        .modified()
        .ok()
        .and_then(|modified| modified.duration_since(UNIX_EPOCH).ok())
        .map(|since| since.as_nanos())
        .unwrap_or_default();
    let mut hasher = blake3::Hasher::new();
    hasher.update(&metadata.len().to_le_bytes());
    hasher.update(&modified.to_le_bytes());
    Freshness::Token(token(hasher.finalize()))
}

fn token(hash: blake3::Hash) -> u64 {
    let mut bytes = [0; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} ({})", self.kind, self.id, self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Figment;
    use figment::providers::{Format, Toml};

    fn spec(toml: &str) -> PageSpec {
        Figment::from(Toml::string(toml)).extract().unwrap()
    }

    fn rendered(page: &Page) -> String {
        let mut out = String::new();
        page.render_content(&mut out).unwrap();
        out
    }

    #[test]
    fn inline_page() {
        let page = Page::new(spec("id = 'home'\ntitle = 'Home'\nbody = '<p>hi</p>'"), Vec::new(), Path::new("."));
        assert_eq!(page.url(), "/home");
        assert_eq!(page.title(), "Home");
        assert!(page.is_handler(&Selector::from("home")));
        assert!(!page.is_handler(&Selector::from("homepage")));
        assert_eq!(rendered(&page), "<p>hi</p>");
        assert_eq!(page.source(), None);
        assert_eq!(page.to_string(), "page:home (/home)");
    }

    #[test]
    fn inline_token_follows_body() {
        let a = Page::new(spec("id = 'a'\nbody = 'one'"), Vec::new(), Path::new("."));
        let b = Page::new(spec("id = 'b'\nbody = 'one'"), Vec::new(), Path::new("."));
        let c = Page::new(spec("id = 'c'\nbody = 'two'"), Vec::new(), Path::new("."));
        assert_eq!(a.freshness(), b.freshness());
        assert_ne!(a.freshness(), c.freshness());
        assert_eq!(a.freshness(), a.freshness());
    }

    #[test]
    fn volatile_page() {
        let page = Page::new(spec("id = 'now'\nbody = 'x'\nvolatile = true"), Vec::new(), Path::new("."));
        assert_eq!(page.freshness(), Freshness::Volatile);
    }

    #[test]
    fn file_page_tracks_changes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("about.html"), "<h1>About</h1>").unwrap();
        let page = Page::new(spec("id = 'about'\nsource = 'about.html'"), Vec::new(), dir.path());
        assert_eq!(page.source(), Some(dir.path().join("about.html").as_path()));
        assert_eq!(rendered(&page), "<h1>About</h1>");
        let before = page.freshness();
        assert_eq!(before, page.freshness());
        std::fs::write(dir.path().join("about.html"), "<h1>About us</h1>").unwrap();
        assert_ne!(before, page.freshness());
        assert_eq!(rendered(&page), "<h1>About us</h1>");
    }

    #[test]
    fn missing_file_fails_to_render() {
        let dir = tempfile::tempdir().unwrap();
        let page = Page::new(spec("id = 'gone'\nsource = 'gone.html'"), Vec::new(), dir.path());
        assert_eq!(page.freshness(), Freshness::Token(0));
        let err = page.render_content(&mut String::new()).unwrap_err();
        assert_eq!(*err, NodeErrorKind::Render("/gone".to_string()));
    }
}
