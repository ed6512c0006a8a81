//! Concurrent column crawl.
//!
//! A dispatcher task walks columns and card pages in order, numbering cards
//! per column, and pushes one job per issue card into a bounded queue. A fixed
//! set of workers drains the queue and sends finished issues to the consumer.
//! When the dispatcher is done it drops the queue sender; each worker exits on
//! the closed queue and drops its result sender, so the result channel closing
//! is the "all done" signal.
//!
//! Dropping an [`IssueStream`] aborts the dispatcher and all workers. In-flight
//! requests are abandoned.

use super::deps::resolve_dependencies;
use super::enrich::enrich;
use super::issue::{ColumnPlacement, Issue};
use crate::github::paged::fetch_all_as;
use crate::github::transport::Transport;
use crate::github::types::{Card, Column, Project};
use anyhow::Context;
use futures::{Stream, TryStreamExt};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{self, ready, Poll};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;

pub const DEFAULT_WORKERS: usize = 10;

struct EnrichJob {
    url: String,
    placement: ColumnPlacement,
}

/// Crawls project boards into enriched issues with a bounded worker pool.
#[derive(Clone)]
pub struct ColumnCrawler {
    transport: Arc<dyn Transport>,
    workers: usize,
}

impl ColumnCrawler {
    pub fn new(transport: Arc<dyn Transport>, workers: usize) -> Self {
        Self {
            transport,
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// All columns of `project`, in board order.
    pub async fn columns(&self, project: &Project) -> anyhow::Result<Vec<Column>> {
        fetch_all_as(self.transport.as_ref(), &project.columns_url)
            .await
            .with_context(|| format!("listing columns of project {:?}", project.name))
    }

    /// Start a crawl of `project`. Issues arrive in completion order.
    ///
    /// Every call re-fetches from the server.
    pub fn issues(&self, project: &Project) -> IssueStream {
        let (job_tx, job_rx) = mpsc::channel::<EnrichJob>(self.workers);
        let (result_tx, result_rx) = mpsc::channel::<anyhow::Result<Issue>>(self.workers);
        let job_rx = Arc::new(Mutex::new(job_rx));
        let mut tasks = JoinSet::new();

        for _ in 0..self.workers {
            let transport = self.transport.clone();
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            tasks.spawn(async move {
                loop {
                    // Hold the lock only while waiting for the next job.
                    let job = job_rx.lock().await.recv().await;
                    let Some(job) = job else { break };
                    let result = enrich(transport.as_ref(), &job.url, Some(job.placement))
                        .await
                        .with_context(|| format!("enriching card {}", job.url));
                    if result_tx.send(result).await.is_err() {
                        break;
                    }
                }
            });
        }

        let crawler = self.clone();
        let project = project.clone();
        tasks.spawn(async move {
            if let Err(e) = crawler.dispatch(&project, job_tx).await {
                let _ = result_tx.send(Err(e)).await;
            }
        });

        IssueStream {
            results: result_rx,
            tasks,
            finished: false,
        }
    }

    /// Walk the board sequentially and queue one job per issue card.
    async fn dispatch(&self, project: &Project, jobs: mpsc::Sender<EnrichJob>) -> anyhow::Result<()> {
        let columns = self.columns(project).await?;
        tracing::info!(project = %project.name, columns = columns.len(), "crawling project");

        for column in columns {
            let cards: Vec<Card> = fetch_all_as(self.transport.as_ref(), &column.cards_url)
                .await
                .with_context(|| format!("listing cards of column {:?}", column.name))?;
            tracing::debug!(column = %column.name, cards = cards.len(), "column cards fetched");

            for (index, card) in cards.iter().enumerate() {
                let Some(url) = card.issue_url() else {
                    continue;
                };
                let job = EnrichJob {
                    url: url.to_string(),
                    placement: ColumnPlacement {
                        column: column.name.clone(),
                        position: u32::try_from(index + 1)?,
                    },
                };
                if jobs.send(job).await.is_err() {
                    // Every worker is gone: the stream was dropped or failed.
                    return Ok(());
                }
            }
        }
        Ok(())
    }

    /// Crawl once and fill every issue's `depends_on` from that crawl's
    /// issue set.
    pub async fn issues_with_dependencies(&self, project: &Project) -> anyhow::Result<Vec<Issue>> {
        let mut issues: Vec<Issue> = self.issues(project).try_collect().await?;
        let resolved = issues
            .iter()
            .map(|issue| resolve_dependencies(issue, &issues))
            .collect::<anyhow::Result<Vec<_>>>()?;
        for (issue, depends_on) in issues.iter_mut().zip(resolved) {
            issue.depends_on = depends_on;
        }
        Ok(issues)
    }
}

/// Enriched issues from one crawl, in completion order.
///
/// The first error ends the stream: remaining work is aborted and `next`
/// returns `None` afterwards.
pub struct IssueStream {
    results: mpsc::Receiver<anyhow::Result<Issue>>,
    tasks: JoinSet<()>,
    finished: bool,
}

impl Stream for IssueStream {
    type Item = anyhow::Result<Issue>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut task::Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        if this.finished {
            return Poll::Ready(None);
        }
        match ready!(this.results.poll_recv(cx)) {
            Some(Ok(issue)) => Poll::Ready(Some(Ok(issue))),
            Some(Err(e)) => {
                this.fail();
                Poll::Ready(Some(Err(e)))
            }
            // Channel closed: every task has returned or died. A panicked
            // worker may have lost a job, so the crawl is not complete.
            None => loop {
                match ready!(this.tasks.poll_join_next(cx)) {
                    Some(Ok(())) => continue,
                    Some(Err(e)) => {
                        this.fail();
                        return Poll::Ready(Some(Err(anyhow::anyhow!("crawl task failed: {e}"))));
                    }
                    None => {
                        this.finished = true;
                        return Poll::Ready(None);
                    }
                }
            },
        }
    }
}

impl IssueStream {
    fn fail(&mut self) {
        self.finished = true;
        self.tasks.abort_all();
        self.results.close();
    }
}

/// Unique repository URLs referenced by `issues`, sorted.
pub fn repository_urls(issues: &[Issue]) -> Vec<String> {
    let mut urls: Vec<String> = issues.iter().map(|i| i.repository_url.clone()).collect();
    urls.sort();
    urls.dedup();
    urls
}
