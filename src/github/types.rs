//! GitHub REST API response types, decoded straight from JSON.
//!
//! Required fields are non-optional so a missing key (e.g. `user.login`)
//! fails the decode instead of leaving a hole in the record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubUser {
    pub login: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubLabel {
    pub name: String,
    pub color: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitHubMilestone {
    pub number: u64,
    pub title: String,
    pub state: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_on: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
}

/// An issue as returned by `GET /repos/{owner}/{repo}/issues/{number}`.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubIssue {
    pub id: u64,
    pub number: u64,
    pub title: String,
    pub state: IssueState,
    pub url: String,
    pub html_url: String,
    pub repository_url: String,
    pub body: Option<String>,
    pub labels: Vec<GitHubLabel>,
    pub user: GitHubUser,
    pub assignee: Option<GitHubUser>,
    pub milestone: Option<GitHubMilestone>,
    /// Comment count.
    pub comments: u64,
    pub comments_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubComment {
    pub body: String,
    pub user: GitHubUser,
    pub created_at: DateTime<Utc>,
}

/// Organization project (classic projects API).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub number: Option<u64>,
    #[serde(default)]
    pub body: Option<String>,
    pub url: String,
    pub html_url: String,
    pub columns_url: String,
}

/// Project column. Names are display labels, not unique keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub id: u64,
    pub name: String,
    pub cards_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub id: u64,
    #[serde(default)]
    pub content_url: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

impl Card {
    /// The issue this card points at, if it points at one (notes and pull
    /// requests do not).
    pub fn issue_url(&self) -> Option<&str> {
        self.content_url
            .as_deref()
            .filter(|url| url.contains("/issues/"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub url: String,
    pub html_url: String,
    /// URL template, e.g. `https://api.github.com/repos/o/r/labels{/name}`.
    pub labels_url: String,
    /// URL template, e.g. `https://api.github.com/repos/o/r/milestones{/number}`.
    pub milestones_url: String,
}

impl Repository {
    pub fn labels_endpoint(&self) -> &str {
        strip_url_template(&self.labels_url)
    }

    pub fn milestones_endpoint(&self) -> &str {
        strip_url_template(&self.milestones_url)
    }
}

/// Drop the RFC 6570 `{...}` suffix GitHub appends to hypermedia URLs.
pub fn strip_url_template(url: &str) -> &str {
    match url.find('{') {
        Some(i) => &url[..i],
        None => url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn issue_json() -> serde_json::Value {
        json!({
            "id": 1001,
            "number": 7,
            "title": "Fix the flux capacitor",
            "state": "open",
            "url": "https://api.github.com/repos/acme/app/issues/7",
            "html_url": "https://github.com/acme/app/issues/7",
            "repository_url": "https://api.github.com/repos/acme/app",
            "body": "needs 1.21 gigawatts",
            "labels": [{"name": "bug", "color": "d73a4a"}],
            "user": {"login": "doc"},
            "assignee": null,
            "milestone": null,
            "comments": 0,
            "comments_url": "https://api.github.com/repos/acme/app/issues/7/comments",
            "created_at": "2024-01-01T12:00:00Z",
            "updated_at": "2024-01-02T12:00:00Z"
        })
    }

    #[test]
    fn issue_deserializes() {
        let issue: GitHubIssue = serde_json::from_value(issue_json()).unwrap();
        assert_eq!(issue.number, 7);
        assert_eq!(issue.state, IssueState::Open);
        assert_eq!(issue.user.login, "doc");
        assert!(issue.assignee.is_none());
        assert_eq!(issue.labels[0].name, "bug");
        assert_eq!(issue.created_at.to_rfc3339(), "2024-01-01T12:00:00+00:00");
    }

    #[test]
    fn issue_without_user_login_is_rejected() {
        let mut raw = issue_json();
        raw["user"] = json!({"id": 3});
        assert!(serde_json::from_value::<GitHubIssue>(raw).is_err());
    }

    #[test]
    fn issue_with_unknown_state_is_rejected() {
        let mut raw = issue_json();
        raw["state"] = json!("merged");
        assert!(serde_json::from_value::<GitHubIssue>(raw).is_err());
    }

    #[test]
    fn card_issue_url_only_for_issue_content() {
        let issue_card: Card = serde_json::from_value(json!({
            "id": 1,
            "content_url": "https://api.github.com/repos/acme/app/issues/3"
        }))
        .unwrap();
        let note_card: Card = serde_json::from_value(json!({"id": 2, "note": "remember"})).unwrap();
        let pr_card: Card = serde_json::from_value(json!({
            "id": 3,
            "content_url": "https://api.github.com/repos/acme/app/pulls/4"
        }))
        .unwrap();

        assert_eq!(
            issue_card.issue_url(),
            Some("https://api.github.com/repos/acme/app/issues/3")
        );
        assert_eq!(note_card.issue_url(), None);
        assert_eq!(pr_card.issue_url(), None);
    }

    #[test]
    fn repository_endpoints_drop_url_templates() {
        let repo: Repository = serde_json::from_value(json!({
            "id": 9,
            "name": "app",
            "full_name": "acme/app",
            "url": "https://api.github.com/repos/acme/app",
            "html_url": "https://github.com/acme/app",
            "labels_url": "https://api.github.com/repos/acme/app/labels{/name}",
            "milestones_url": "https://api.github.com/repos/acme/app/milestones{/number}"
        }))
        .unwrap();
        assert_eq!(
            repo.labels_endpoint(),
            "https://api.github.com/repos/acme/app/labels"
        );
        assert_eq!(
            repo.milestones_endpoint(),
            "https://api.github.com/repos/acme/app/milestones"
        );
        assert_eq!(strip_url_template("https://x/y"), "https://x/y");
    }
}
