use crate::error::{ErrorKind, Result};
use crate::manifest::{SiteManifest, parse_child};
use crate::page::Page;
use exn::{OptionExt, ResultExt};
use figment::Figment;
use figment::providers::{Format, Json, Toml, Yaml};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::instrument;
use trawl_node::error::ErrorKind as NodeErrorKind;
use trawl_node::{Node, NodeCacheBuilder, NodeKind, NodeRef, Selector};

type Pages = BTreeMap<NodeKind, HashMap<Selector, Arc<Page>>>;

/// A validated set of manifest pages, ready to be served through a
/// [`NodeCache`](trawl_node::NodeCache).
///
/// Every child reference is known to point at a page of the site, so a
/// crawl starting from any page never fails to resolve.
#[derive(Debug, Clone)]
pub struct Site {
    pages: Arc<Pages>,
}

impl Site {
    /// Loads a manifest from disk. The format follows the file extension
    /// (`toml`, `yaml`/`yml` or `json`); page sources are relative to the
    /// manifest's directory.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let figment = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Figment::from(Toml::file_exact(path)),
            Some("yaml" | "yml") => Figment::from(Yaml::file_exact(path)),
            Some("json") => Figment::from(Json::file_exact(path)),
            _ => exn::bail!(ErrorKind::Format(path.to_path_buf())),
        };
        // Missing files are silently empty to figment.
        if !path.is_file() {
            exn::bail!(ErrorKind::Manifest(path.to_path_buf()));
        }
        let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let manifest: SiteManifest = figment.extract().or_raise(|| ErrorKind::Manifest(path.to_path_buf()))?;
        let site = Self::from_manifest(manifest, base)?;
        tracing::debug!(pages = site.len(), "Loaded site manifest");
        Ok(site)
    }

    /// Builds a site from any figment, e.g. an inline string in tests.
    pub fn from_figment(figment: &Figment, base: impl Into<PathBuf>) -> Result<Self> {
        let manifest: SiteManifest = figment.extract().or_raise(|| ErrorKind::Manifest(PathBuf::new()))?;
        Self::from_manifest(manifest, base)
    }

    /// Validates `manifest`: `(kind, id)` pairs must be unique and every
    /// child reference must name a page of the manifest.
    pub fn from_manifest(manifest: SiteManifest, base: impl Into<PathBuf>) -> Result<Self> {
        let base = base.into();
        let mut known = HashSet::new();
        for spec in &manifest.pages {
            if !known.insert((spec.kind.clone(), spec.id.clone())) {
                exn::bail!(ErrorKind::Duplicate {
                    kind: spec.kind.clone(),
                    id: spec.id.clone(),
                });
            }
            if spec.body.is_some() && spec.source.is_some() {
                exn::bail!(ErrorKind::Content {
                    kind: spec.kind.clone(),
                    id: spec.id.clone(),
                });
            }
        }
        let mut pages = Pages::new();
        for spec in manifest.pages {
            let mut children = Vec::with_capacity(spec.children.len());
            for reference in &spec.children {
                let child = parse_child(reference)?;
                let key = (child.kind.to_string(), child.selector.to_string());
                if !known.contains(&key) {
                    exn::bail!(ErrorKind::UnknownChild {
                        kind: spec.kind.clone(),
                        id: spec.id.clone(),
                        child: reference.clone(),
                    });
                }
                children.push(child);
            }
            let page = Page::new(spec, children, &base);
            pages.entry(page.kind().clone()).or_default().insert(page.id().clone(), Arc::new(page));
        }
        Ok(Self { pages: Arc::new(pages) })
    }

    /// Looks up a page by kind and id.
    pub fn page(&self, kind: &NodeKind, id: &Selector) -> Result<Arc<Page>> {
        self.pages.get(kind).and_then(|pages| pages.get(id)).cloned().ok_or_raise(|| ErrorKind::PageNotFound {
            kind: kind.to_string(),
            id: id.to_string(),
        })
    }

    /// Node kinds present in the site, sorted.
    pub fn kinds(&self) -> impl Iterator<Item = &NodeKind> {
        self.pages.keys()
    }

    pub fn len(&self) -> usize {
        self.pages.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registers one factory per page kind. The factories hand out the
    /// site's own page instances.
    pub fn register(&self, builder: &mut NodeCacheBuilder) {
        for kind in self.kinds() {
            let site = self.clone();
            let kind = kind.clone();
            builder.register(kind.clone(), move |selector: &Selector| {
                let page = site
                    .page(&kind, selector)
                    .or_raise(|| NodeErrorKind::Factory(format!("no {kind} page `{selector}` in site")))?;
                Ok(page as NodeRef)
            });
        }
    }
}
