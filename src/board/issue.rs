//! The enriched issue record emitted by a board crawl.

use crate::github::types::{GitHubMilestone, IssueState};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;

/// Where a card sat on the board when the issue was fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnPlacement {
    pub column: String,
    /// 1-based card position within the column, counted across all pages.
    pub position: u32,
}

/// The newest comment on an issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestComment {
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}

/// A fully populated issue. Column and latest-comment data are each
/// all-or-nothing, which the `Option` wrappers enforce.
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    pub id: u64,
    pub number: u64,
    pub title: String,
    pub state: IssueState,
    pub url: String,
    pub html_url: String,
    pub repository_url: String,
    pub body: Option<String>,
    pub labels: BTreeSet<String>,
    pub created_by: String,
    pub assignee: Option<String>,
    pub milestone: Option<GitHubMilestone>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub placement: Option<ColumnPlacement>,
    pub latest_comment: Option<LatestComment>,
    /// Resolved ids of issues this one declares a dependency on.
    pub depends_on: Vec<u64>,
}

impl Issue {
    pub fn is_open(&self) -> bool {
        self.state == IssueState::Open
    }

    pub fn is_closed(&self) -> bool {
        !self.is_open()
    }

    pub fn project_column(&self) -> Option<&str> {
        self.placement.as_ref().map(|p| p.column.as_str())
    }

    pub fn column_priority(&self) -> Option<u32> {
        self.placement.as_ref().map(|p| p.position)
    }

    pub fn latest_comment_body(&self) -> Option<&str> {
        self.latest_comment.as_ref().map(|c| c.body.as_str())
    }

    pub fn latest_comment_created_at(&self) -> Option<DateTime<Utc>> {
        self.latest_comment.as_ref().map(|c| c.created_at)
    }

    pub fn latest_comment_created_by(&self) -> Option<&str> {
        self.latest_comment.as_ref().map(|c| c.created_by.as_str())
    }
}

/// Flat wire shape: every enrichment field is its own nullable key.
#[derive(Serialize)]
struct IssueRecord<'a> {
    id: u64,
    number: u64,
    title: &'a str,
    state: IssueState,
    url: &'a str,
    html_url: &'a str,
    repository_url: &'a str,
    body: Option<&'a str>,
    labels: &'a BTreeSet<String>,
    created_by: &'a str,
    assignee: Option<&'a str>,
    milestone: Option<&'a GitHubMilestone>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    project_column: Option<&'a str>,
    column_priority: Option<u32>,
    latest_comment_body: Option<&'a str>,
    latest_comment_created_at: Option<DateTime<Utc>>,
    latest_comment_created_by: Option<&'a str>,
    depends_on: &'a [u64],
}

impl Serialize for Issue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        IssueRecord {
            id: self.id,
            number: self.number,
            title: &self.title,
            state: self.state,
            url: &self.url,
            html_url: &self.html_url,
            repository_url: &self.repository_url,
            body: self.body.as_deref(),
            labels: &self.labels,
            created_by: &self.created_by,
            assignee: self.assignee.as_deref(),
            milestone: self.milestone.as_ref(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            project_column: self.project_column(),
            column_priority: self.column_priority(),
            latest_comment_body: self.latest_comment_body(),
            latest_comment_created_at: self.latest_comment_created_at(),
            latest_comment_created_by: self.latest_comment_created_by(),
            depends_on: &self.depends_on,
        }
        .serialize(serializer)
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::issue;
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn unplaced_issue_serializes_enrichment_as_null() {
        let json = serde_json::to_value(issue(1, 1, "")).unwrap();
        assert!(json["project_column"].is_null());
        assert!(json["column_priority"].is_null());
        assert!(json["latest_comment_body"].is_null());
        assert!(json["latest_comment_created_at"].is_null());
        assert!(json["latest_comment_created_by"].is_null());
        assert_eq!(json["state"], "open");
    }

    #[test]
    fn placed_issue_serializes_flat_fields() {
        let mut i = issue(5, 2, "body");
        i.placement = Some(ColumnPlacement {
            column: "In Progress".into(),
            position: 3,
        });
        i.latest_comment = Some(LatestComment {
            body: "done yet?".into(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap(),
            created_by: "pm".into(),
        });
        i.depends_on = vec![9];

        let json = serde_json::to_value(&i).unwrap();
        assert_eq!(json["project_column"], "In Progress");
        assert_eq!(json["column_priority"], 3);
        assert_eq!(json["latest_comment_body"], "done yet?");
        assert_eq!(json["latest_comment_created_by"], "pm");
        assert_eq!(json["latest_comment_created_at"], "2024-03-02T00:00:00Z");
        assert_eq!(json["depends_on"], serde_json::json!([9]));
    }

    #[test]
    fn open_and_closed() {
        let mut i = issue(1, 1, "");
        assert!(i.is_open());
        i.state = IssueState::Closed;
        assert!(i.is_closed());
    }
}
