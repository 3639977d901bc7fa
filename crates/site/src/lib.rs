//! Content nodes backed by a site manifest.
//!
//! A manifest (TOML, YAML or JSON) lists the pages of a site: their metadata,
//! their children, and either an inline body or a source file to read on
//! every render. [`Site::load`] validates the manifest and
//! [`Site::register`] plugs its pages into a
//! [`NodeCacheBuilder`](trawl_node::NodeCacheBuilder), one factory per kind.

pub mod error;
mod manifest;
mod page;
mod site;

pub use crate::manifest::{DEFAULT_KIND, PageSpec, SiteManifest, parse_child};
pub use crate::page::Page;
pub use crate::site::Site;
