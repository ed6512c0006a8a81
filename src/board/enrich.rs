//! Issue enrichment: one issue GET, plus a paged comments fetch when the
//! issue has comments, folded into an [`Issue`].

use super::issue::{ColumnPlacement, Issue, LatestComment};
use crate::github::paged::{fetch_all_as, get_object};
use crate::github::transport::Transport;
use crate::github::types::{GitHubComment, GitHubIssue};
use anyhow::Context;

/// Fetch the issue at `issue_url` and populate its enrichment fields.
///
/// `placement` is `None` for lookups outside a board crawl.
pub async fn enrich(
    transport: &dyn Transport,
    issue_url: &str,
    placement: Option<ColumnPlacement>,
) -> anyhow::Result<Issue> {
    let raw: GitHubIssue = get_object(transport, issue_url)
        .await
        .with_context(|| format!("fetching issue {issue_url}"))?;

    let latest_comment = if raw.comments > 0 {
        let comments: Vec<GitHubComment> = fetch_all_as(transport, &raw.comments_url)
            .await
            .with_context(|| format!("fetching comments for issue {issue_url}"))?;
        select_latest(comments)
    } else {
        None
    };

    tracing::debug!(
        url = issue_url,
        number = raw.number,
        column = placement.as_ref().map(|p| p.column.as_str()),
        position = placement.as_ref().map(|p| p.position),
        "issue enriched"
    );

    Ok(Issue {
        id: raw.id,
        number: raw.number,
        title: raw.title,
        state: raw.state,
        url: raw.url,
        html_url: raw.html_url,
        repository_url: raw.repository_url,
        body: raw.body,
        labels: raw.labels.into_iter().map(|l| l.name).collect(),
        created_by: raw.user.login,
        assignee: raw.assignee.map(|a| a.login),
        milestone: raw.milestone,
        created_at: raw.created_at,
        updated_at: raw.updated_at,
        placement,
        latest_comment,
        depends_on: Vec::new(),
    })
}

/// The comment with the greatest `created_at`; on a tie the first one in
/// list order wins.
fn select_latest(comments: Vec<GitHubComment>) -> Option<LatestComment> {
    let mut latest: Option<GitHubComment> = None;
    for comment in comments {
        if latest
            .as_ref()
            .map_or(true, |best| comment.created_at > best.created_at)
        {
            latest = Some(comment);
        }
    }
    latest.map(|c| LatestComment {
        body: c.body,
        created_at: c.created_at,
        created_by: c.user.login,
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use serde_json::{json, Value};

    pub fn issue_url(number: u64) -> String {
        format!("https://api.test/repos/acme/app/issues/{number}")
    }

    pub fn comments_url(number: u64) -> String {
        format!("{}/comments", issue_url(number))
    }

    pub fn issue_json(id: u64, number: u64, comments: u64) -> Value {
        json!({
            "id": id,
            "number": number,
            "title": format!("issue {number}"),
            "state": "open",
            "url": issue_url(number),
            "html_url": format!("https://github.test/acme/app/issues/{number}"),
            "repository_url": "https://api.test/repos/acme/app",
            "body": "",
            "labels": [{"name": "bug", "color": "d73a4a"}, {"name": "p1", "color": null}],
            "user": {"login": "author"},
            "assignee": {"login": "dev"},
            "milestone": {"number": 2, "title": "v1", "state": "open", "due_on": null},
            "comments": comments,
            "comments_url": comments_url(number),
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-05T00:00:00Z"
        })
    }

    pub fn comment_json(body: &str, login: &str, at: &str) -> Value {
        json!({ "body": body, "user": { "login": login }, "created_at": at })
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::github::error::ApiError;
    use crate::github::transport::fake::FakeTransport;
    use crate::github::transport::RawResponse;
    use serde_json::json;

    #[tokio::test]
    async fn populates_fields_and_placement() {
        let t = FakeTransport::new();
        t.respond(&issue_url(4), RawResponse::ok(issue_json(400, 4, 0)));

        let placement = ColumnPlacement {
            column: "Ready".into(),
            position: 2,
        };
        let issue = enrich(&t, &issue_url(4), Some(placement.clone()))
            .await
            .unwrap();

        assert_eq!(issue.id, 400);
        assert_eq!(issue.number, 4);
        assert_eq!(issue.created_by, "author");
        assert_eq!(issue.assignee.as_deref(), Some("dev"));
        assert_eq!(issue.milestone.as_ref().map(|m| m.title.as_str()), Some("v1"));
        assert!(issue.labels.contains("bug") && issue.labels.contains("p1"));
        assert_eq!(issue.placement, Some(placement));
        assert!(issue.depends_on.is_empty());
    }

    #[tokio::test]
    async fn zero_comments_skips_comment_fetch() {
        let t = FakeTransport::new();
        t.respond(&issue_url(1), RawResponse::ok(issue_json(100, 1, 0)));

        let issue = enrich(&t, &issue_url(1), None).await.unwrap();
        assert!(issue.latest_comment.is_none());
        assert!(issue.latest_comment_body().is_none());
        assert!(issue.latest_comment_created_at().is_none());
        assert!(issue.latest_comment_created_by().is_none());
        assert_eq!(t.hits(&comments_url(1)), 0);
    }

    #[tokio::test]
    async fn direct_lookup_has_no_placement() {
        let t = FakeTransport::new();
        t.respond(&issue_url(1), RawResponse::ok(issue_json(100, 1, 0)));
        let issue = enrich(&t, &issue_url(1), None).await.unwrap();
        assert!(issue.project_column().is_none());
        assert!(issue.column_priority().is_none());
    }

    #[tokio::test]
    async fn picks_newest_comment_regardless_of_order() {
        let t = FakeTransport::new();
        t.respond(&issue_url(2), RawResponse::ok(issue_json(200, 2, 3)))
            .respond(
                &comments_url(2),
                RawResponse::ok(json!([
                    comment_json("middle", "b", "2024-02-02T00:00:00Z"),
                    comment_json("newest", "c", "2024-02-03T00:00:00Z"),
                    comment_json("oldest", "a", "2024-02-01T00:00:00Z"),
                ])),
            );

        let issue = enrich(&t, &issue_url(2), None).await.unwrap();
        assert_eq!(issue.latest_comment_body(), Some("newest"));
        assert_eq!(issue.latest_comment_created_by(), Some("c"));
        assert_eq!(
            issue.latest_comment_created_at().map(|t| t.to_rfc3339()),
            Some("2024-02-03T00:00:00+00:00".to_string())
        );
    }

    #[tokio::test]
    async fn newest_comment_spans_pages() {
        let t = FakeTransport::new();
        let page2 = format!("{}?page=2", comments_url(3));
        t.respond(&issue_url(3), RawResponse::ok(issue_json(300, 3, 2)))
            .respond(
                &comments_url(3),
                RawResponse::ok(json!([comment_json("first", "a", "2024-02-01T00:00:00Z")]))
                    .with_link(&format!("<{page2}>; rel=\"next\", <{page2}>; rel=\"last\"")),
            )
            .respond(
                &page2,
                RawResponse::ok(json!([comment_json("second", "b", "2024-02-09T00:00:00Z")])),
            );

        let issue = enrich(&t, &issue_url(3), None).await.unwrap();
        assert_eq!(issue.latest_comment_body(), Some("second"));
    }

    #[tokio::test]
    async fn timestamp_tie_keeps_first_comment() {
        let t = FakeTransport::new();
        t.respond(&issue_url(5), RawResponse::ok(issue_json(500, 5, 2)))
            .respond(
                &comments_url(5),
                RawResponse::ok(json!([
                    comment_json("first", "a", "2024-02-01T00:00:00Z"),
                    comment_json("second", "b", "2024-02-01T00:00:00Z"),
                ])),
            );
        let issue = enrich(&t, &issue_url(5), None).await.unwrap();
        assert_eq!(issue.latest_comment_body(), Some("first"));
    }

    #[tokio::test]
    async fn missing_author_login_is_fatal() {
        let mut raw = issue_json(600, 6, 0);
        raw["user"] = json!({});
        let t = FakeTransport::new();
        t.respond(&issue_url(6), RawResponse::ok(raw));
        let err = enrich(&t, &issue_url(6), None).await.unwrap_err();
        assert!(format!("{err:#}").contains(&issue_url(6)), "{err:#}");
    }

    #[tokio::test]
    async fn comment_without_author_is_fatal() {
        let t = FakeTransport::new();
        t.respond(&issue_url(8), RawResponse::ok(issue_json(800, 8, 1)))
            .respond(
                &comments_url(8),
                RawResponse::ok(json!([{ "body": "x", "created_at": "2024-02-01T00:00:00Z" }])),
            );
        assert!(enrich(&t, &issue_url(8), None).await.is_err());
    }

    #[tokio::test]
    async fn missing_issue_is_fatal() {
        let t = FakeTransport::new();
        let err = enrich(&t, &issue_url(404), None).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ApiError>(),
            Some(ApiError::Status { status: 404, .. })
        ));
    }
}
