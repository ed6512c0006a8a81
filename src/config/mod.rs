//! Config reader: loads YAML config files and resolves dot-separated keys.
//!
//! Reads `~/.ghorgs/config.yml` (global) and `.ghorgs.yml` (project).
//! Project config overrides global config for the same key. Parsed files are
//! cached for the process lifetime.

use crate::board::crawl::DEFAULT_WORKERS;
use crate::org::DEFAULT_CACHE_CAPACITY;
use crate::github::http::{HttpSettings, GITHUB_API};
use anyhow::Context;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::Duration;

/// Parsed YAML per file, reused for all key lookups.
static CACHE: std::sync::LazyLock<RwLock<HashMap<PathBuf, serde_yml::Value>>> =
    std::sync::LazyLock::new(|| RwLock::new(HashMap::new()));

const PROJECT_CONFIG: &str = ".ghorgs.yml";

/// Resolve the global config path: `~/.ghorgs/config.yml`
fn global_config_path() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir().context("cannot determine home directory")?;
    Ok(home.join(".ghorgs").join("config.yml"))
}

/// Get a config value by dot-separated key (e.g. "http.pool_size").
///
/// Lookup order:
/// 1. `.ghorgs.yml` in the current directory (project config)
/// 2. `~/.ghorgs/config.yml` (global config)
pub fn get(key: &str) -> anyhow::Result<String> {
    let project_path = PathBuf::from(PROJECT_CONFIG);
    if project_path.exists() {
        if let Ok(val) = resolve_key(&project_path, key) {
            return Ok(val);
        }
    }

    let global_path = global_config_path()?;
    if global_path.exists() {
        return resolve_key(&global_path, key);
    }

    anyhow::bail!("config key not found: {key}")
}

/// Resolve a dot-separated key from a YAML file, caching the parsed tree.
fn resolve_key(path: &Path, key: &str) -> anyhow::Result<String> {
    if let Ok(cache) = CACHE.read() {
        if let Some(cached) = cache.get(path) {
            return extract_value(cached, key);
        }
    }

    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let parsed: serde_yml::Value =
        serde_yml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;

    let value = extract_value(&parsed, key);
    if let Ok(mut cache) = CACHE.write() {
        cache.insert(path.to_path_buf(), parsed);
    }
    value
}

/// Extract a value from a YAML tree by dot-separated key.
fn extract_value(root: &serde_yml::Value, key: &str) -> anyhow::Result<String> {
    let mut current = root;
    for part in key.split('.') {
        current = current
            .get(part)
            .with_context(|| format!("key not found: {key}"))?;
    }

    match current {
        serde_yml::Value::String(s) => Ok(s.clone()),
        serde_yml::Value::Number(n) => Ok(n.to_string()),
        serde_yml::Value::Bool(b) => Ok(b.to_string()),
        serde_yml::Value::Null => Ok(String::new()),
        _ => Ok(serde_yml::to_string(current)?),
    }
}

/// Typed runtime knobs with their defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub org: Option<String>,
    pub api_url: String,
    pub workers: usize,
    pub timeout: Duration,
    pub pool_size: usize,
    pub cache_capacity: usize,
}

impl Default for Settings {
    fn default() -> Self {
        let http = HttpSettings::default();
        Self {
            org: None,
            api_url: GITHUB_API.to_string(),
            workers: DEFAULT_WORKERS,
            timeout: http.timeout,
            pool_size: http.pool_size,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl Settings {
    /// Settings from the project and global config files.
    pub fn load() -> Self {
        Self::from_lookup(|key| get(key).ok())
    }

    /// Build settings from any key lookup. Unparseable numbers are logged
    /// and replaced by the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let number = |key: &str, default: usize| match value(key) {
            Some(raw) => raw.trim().parse::<usize>().unwrap_or_else(|_| {
                tracing::warn!(key, value = %raw, default, "ignoring invalid config value");
                default
            }),
            None => default,
        };

        let workers = number("workers", defaults.workers).max(1);
        let timeout_secs = number("http.timeout_seconds", defaults.timeout.as_secs() as usize);
        let pool_size = number("http.pool_size", defaults.pool_size).max(workers);

        Self {
            org: value("org"),
            api_url: value("api_url").unwrap_or(defaults.api_url),
            workers,
            timeout: Duration::from_secs(timeout_secs as u64),
            pool_size,
            cache_capacity: number("cache.capacity", defaults.cache_capacity),
        }
    }

    /// Replace the worker count, growing the pool to keep up with it.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self.pool_size = self.pool_size.max(self.workers);
        self
    }

    pub fn http(&self) -> HttpSettings {
        HttpSettings {
            api_url: self.api_url.clone(),
            timeout: self.timeout,
            pool_size: self.pool_size,
        }
    }
}
