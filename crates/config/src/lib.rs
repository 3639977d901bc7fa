//! Layered configuration for trawl.
//!
//! Sources, later ones winning:
//!
//! 1. Built-in defaults ([`Config::default`]).
//! 2. A configuration file: TOML, YAML or JSON by extension. Either given
//!    explicitly (and then required), or `config.toml` in the platform's
//!    config directory if it exists.
//! 3. Environment variables prefixed with `TRAWL_`, using `__` to reach
//!    nested keys: `TRAWL_LIMIT=5`, `TRAWL_LOG__LEVEL=debug`,
//!    `TRAWL_WEIGHTS__TITLE=8`.

pub mod error;

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::instrument;
use trawl_index::Weights;

/// Prefix of environment variables read into the configuration.
pub const ENV_PREFIX: &str = "TRAWL_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Site manifest to search.
    pub site: PathBuf,
    /// Page every search starts from, as `id` or `kind:id`.
    pub root: String,
    /// Maximum number of results to display.
    pub limit: usize,
    pub log: LogConfig,
    pub weights: Weights,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            site: PathBuf::from("site.toml"),
            root: "home".to_string(),
            limit: 10,
            log: LogConfig::default(),
            weights: Weights::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive, e.g. `info` or
    /// `trawl_index=debug,info`.
    pub level: String,
}
impl Default for LogConfig {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

impl Config {
    /// Loads and validates the configuration from all sources.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::NotFound`] if `file` is given but doesn't exist.
    /// - [`ErrorKind::Format`] if the file extension isn't recognised.
    /// - [`ErrorKind::Invalid`] if a source holds unknown keys or wrong types.
    /// - [`ErrorKind::Validation`] if the result fails [`validate`](Self::validate).
    #[instrument(level = "debug")]
    pub fn load(file: Option<&Path>) -> Result<Self> {
        Self::from_figment(&Self::figment(file)?)
    }

    /// The layered figment [`load`](Self::load) extracts from.
    pub fn figment(file: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        match file {
            Some(path) => {
                if !path.is_file() {
                    exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
                }
                figment = merge_file(figment, path)?;
            },
            None => {
                if let Some(path) = default_path()
                    && path.is_file()
                {
                    tracing::debug!(path = %path.display(), "Using default configuration file");
                    figment = merge_file(figment, &path)?;
                }
            },
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    pub fn from_figment(figment: &Figment) -> Result<Self> {
        let config: Self = figment.extract().or_raise(|| ErrorKind::Invalid)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that deserialize fine but cannot work.
    pub fn validate(&self) -> Result<()> {
        if self.root.trim().is_empty() {
            exn::bail!(ErrorKind::Validation("root page id must not be empty".to_string()));
        }
        if self.limit == 0 {
            exn::bail!(ErrorKind::Validation("limit must be at least 1".to_string()));
        }
        if self.site.as_os_str().is_empty() {
            exn::bail!(ErrorKind::Validation("site manifest path must not be empty".to_string()));
        }
        Ok(())
    }
}

/// `config.toml` in the platform's configuration directory for trawl, if
/// the platform has one.
pub fn default_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "trawl").map(|dirs| dirs.config_dir().join("config.toml"))
}

fn merge_file(figment: Figment, path: &Path) -> Result<Figment> {
    Ok(match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => figment.merge(Toml::file_exact(path)),
        Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path)),
        Some("json") => figment.merge(Json::file_exact(path)),
        _ => exn::bail!(ErrorKind::Format(path.to_path_buf())),
    })
}
