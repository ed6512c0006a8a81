//! Organization entry point: project and repository listings plus the crawler.

use crate::board::ColumnCrawler;
use crate::github::paged::{fetch_all_as, get_object};
use crate::github::transport::Transport;
use crate::github::types::{Project, Repository};
use anyhow::Context;
use lru::LruCache;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

pub const DEFAULT_CACHE_CAPACITY: usize = 10;

type RepoKey = Option<Vec<String>>;

/// Per-instance LRU memo of listing results. Capacity 0 disables it.
struct Memo<K: Hash + Eq, V>(Option<Mutex<LruCache<K, V>>>);

impl<K: Hash + Eq, V: Clone> Memo<K, V> {
    fn new(capacity: usize) -> Self {
        Self(NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap))))
    }

    fn get(&self, key: &K) -> Option<V> {
        let mut cache = self.0.as_ref()?.lock().ok()?;
        let hit = cache.get(key).cloned();
        hit
    }

    fn put(&self, key: K, value: V) {
        if let Some(Ok(mut cache)) = self.0.as_ref().map(|c| c.lock()) {
            cache.put(key, value);
        }
    }

    fn clear(&self) {
        if let Some(Ok(mut cache)) = self.0.as_ref().map(|c| c.lock()) {
            cache.clear();
        }
    }
}

pub struct Organization {
    name: String,
    api_url: String,
    transport: Arc<dyn Transport>,
    workers: usize,
    projects: Memo<(), Vec<Project>>,
    repositories: Memo<RepoKey, Vec<Repository>>,
}

impl Organization {
    pub fn new(
        name: impl Into<String>,
        api_url: &str,
        transport: Arc<dyn Transport>,
        workers: usize,
        cache_capacity: usize,
    ) -> Self {
        Self {
            name: name.into(),
            api_url: api_url.trim_end_matches('/').to_string(),
            transport,
            workers,
            projects: Memo::new(cache_capacity),
            repositories: Memo::new(cache_capacity),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// A crawler sharing this organization's transport.
    pub fn crawler(&self) -> ColumnCrawler {
        ColumnCrawler::new(self.transport.clone(), self.workers)
    }

    /// Every project of the organization. Memoized per instance.
    pub async fn projects(&self) -> anyhow::Result<Vec<Project>> {
        if let Some(hit) = self.projects.get(&()) {
            return Ok(hit);
        }
        let url = format!("{}/orgs/{}/projects", self.api_url, self.name);
        let projects: Vec<Project> = fetch_all_as(self.transport.as_ref(), &url)
            .await
            .with_context(|| format!("listing projects of {}", self.name))?;
        tracing::debug!(org = %self.name, count = projects.len(), "fetched projects");
        self.projects.put((), projects.clone());
        Ok(projects)
    }

    /// Projects whose name is in `names`, in organization order.
    pub async fn projects_named(&self, names: &[String]) -> anyhow::Result<Vec<Project>> {
        let all = self.projects().await?;
        let found: Vec<Project> = all
            .into_iter()
            .filter(|p| names.iter().any(|n| n == &p.name))
            .collect();
        for name in names {
            if !found.iter().any(|p| &p.name == name) {
                tracing::warn!(org = %self.name, project = %name, "project not found");
            }
        }
        Ok(found)
    }

    /// The named repositories, looked up one by one, or every repository of
    /// the organization when `names` is `None` or empty.
    pub async fn repositories(&self, names: Option<&[String]>) -> anyhow::Result<Vec<Repository>> {
        let key: RepoKey = names.filter(|n| !n.is_empty()).map(<[String]>::to_vec);
        if let Some(hit) = self.repositories.get(&key) {
            return Ok(hit);
        }

        let repos = match &key {
            Some(names) => {
                let mut repos = Vec::with_capacity(names.len());
                for name in names {
                    let url = format!("{}/repos/{}/{}", self.api_url, self.name, name);
                    let repo: Repository = get_object(self.transport.as_ref(), &url)
                        .await
                        .with_context(|| format!("looking up repository {}/{name}", self.name))?;
                    repos.push(repo);
                }
                repos
            }
            None => {
                let url = format!("{}/orgs/{}/repos", self.api_url, self.name);
                fetch_all_as(self.transport.as_ref(), &url)
                    .await
                    .with_context(|| format!("listing repositories of {}", self.name))?
            }
        };

        self.repositories.put(key, repos.clone());
        Ok(repos)
    }

    /// Forget every memoized listing.
    pub fn invalidate(&self) {
        self.projects.clear();
        self.repositories.clear();
    }
}
