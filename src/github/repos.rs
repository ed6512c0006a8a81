//! Repository labels and milestones.

use super::http::GhHttp;
use super::paged::fetch_all_as;
use super::types::{GitHubLabel, GitHubMilestone, Repository};
use anyhow::Context;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

pub const DEFAULT_LABEL_COLOR: &str = "f29513";

/// Sent when a milestone is created or updated without a due date.
pub const DEFAULT_DUE_ON: &str = "2012-10-09T23:39:01Z";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MilestoneState {
    #[default]
    Open,
    Closed,
}

#[derive(Debug, Clone)]
pub struct MilestoneSpec {
    pub title: String,
    pub description: String,
    /// RFC 3339 timestamp, naive `YYYY-MM-DDTHH:MM:SS` (taken as UTC), or a
    /// bare `YYYY-MM-DD` (midnight UTC).
    pub due_on: Option<String>,
    pub state: MilestoneState,
}

impl MilestoneSpec {
    fn payload(&self) -> anyhow::Result<serde_json::Value> {
        Ok(serde_json::json!({
            "title": self.title,
            "state": self.state,
            "description": self.description,
            "due_on": format_due_on(self.due_on.as_deref())?,
        }))
    }
}

/// Render a due date as `YYYY-MM-DDTHH:MM:SSZ` in UTC.
pub fn format_due_on(due_on: Option<&str>) -> anyhow::Result<String> {
    let Some(raw) = due_on.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(DEFAULT_DUE_ON.to_string());
    };

    let utc: DateTime<Utc> = if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        dt.with_timezone(&Utc)
    } else if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        naive.and_utc()
    } else {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .with_context(|| format!("invalid due date {raw:?}"))?
            .and_hms_opt(0, 0, 0)
            .with_context(|| format!("invalid due date {raw:?}"))?
            .and_utc()
    };
    Ok(utc.format("%Y-%m-%dT%H:%M:%SZ").to_string())
}

impl GhHttp {
    pub async fn labels(&self, repo: &Repository) -> anyhow::Result<Vec<GitHubLabel>> {
        fetch_all_as(self, repo.labels_endpoint()).await
    }

    pub async fn create_label(
        &self,
        repo: &Repository,
        name: &str,
        color: &str,
        description: Option<&str>,
    ) -> anyhow::Result<(StatusCode, serde_json::Value)> {
        let payload = serde_json::json!({
            "name": name,
            "color": color,
            "description": description.unwrap_or_default(),
        });
        tracing::info!(repo = %repo.full_name, name, color, "creating label");
        self.post_json(repo.labels_endpoint(), &payload).await
    }

    pub async fn delete_label(&self, repo: &Repository, name: &str) -> anyhow::Result<StatusCode> {
        let url = format!("{}/{}", repo.labels_endpoint(), urlencoding::encode(name));
        tracing::info!(repo = %repo.full_name, name, "deleting label");
        self.delete(&url).await
    }

    pub async fn milestones(&self, repo: &Repository) -> anyhow::Result<Vec<GitHubMilestone>> {
        fetch_all_as(self, repo.milestones_endpoint()).await
    }

    pub async fn create_milestone(
        &self,
        repo: &Repository,
        spec: &MilestoneSpec,
    ) -> anyhow::Result<(StatusCode, serde_json::Value)> {
        self.post_json(repo.milestones_endpoint(), &spec.payload()?)
            .await
    }

    pub async fn update_milestone(
        &self,
        repo: &Repository,
        number: u64,
        spec: &MilestoneSpec,
    ) -> anyhow::Result<(StatusCode, serde_json::Value)> {
        let url = format!("{}/{number}", repo.milestones_endpoint());
        tracing::debug!(%url, "updating milestone");
        self.patch_json(&url, &spec.payload()?).await
    }

    pub async fn delete_milestone(&self, repo: &Repository, number: u64) -> anyhow::Result<StatusCode> {
        let url = format!("{}/{number}", repo.milestones_endpoint());
        self.delete(&url).await
    }
}
