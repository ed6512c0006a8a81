//! Organization webhooks.

use super::http::GhHttp;
use reqwest::StatusCode;

/// Events an organization webhook may subscribe to.
pub const VALID_WEBHOOK_EVENTS: &[&str] = &[
    "*",
    "check_run",
    "check_suite",
    "commit_comment",
    "create",
    "delete",
    "deployment",
    "deployment_status",
    "fork",
    "github_app_authorization",
    "gollum",
    "installation",
    "installation_repositories",
    "issue_comment",
    "issues",
    "label",
    "marketplace_purchase",
    "member",
    "membership",
    "milestone",
    "organization",
    "org_block",
    "page_build",
    "project_card",
    "project_column",
    "project",
    "public",
    "pull_request_review_comment",
    "pull_request_review",
    "pull_request",
    "push",
    "repository",
    "repository_vulnerability_alert",
    "release",
    "status",
    "team",
    "team_add",
    "watch",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ContentType {
    #[default]
    Json,
    Form,
}

impl ContentType {
    fn as_str(self) -> &'static str {
        match self {
            ContentType::Json => "json",
            ContentType::Form => "form",
        }
    }
}

/// Reject any event name GitHub would not accept.
pub fn validate_events(events: &[String]) -> anyhow::Result<()> {
    let unknown: Vec<&str> = events
        .iter()
        .map(String::as_str)
        .filter(|e| !VALID_WEBHOOK_EVENTS.contains(e))
        .collect();
    if !unknown.is_empty() {
        anyhow::bail!("invalid webhook event(s): {}", unknown.join(", "));
    }
    if events.is_empty() {
        anyhow::bail!("at least one webhook event is required");
    }
    Ok(())
}

fn hook_payload(target_url: &str, events: &[String], content_type: ContentType, active: bool) -> serde_json::Value {
    serde_json::json!({
        "name": "web",
        "active": active,
        "events": events,
        "config": {
            "url": target_url,
            "content_type": content_type.as_str(),
        },
    })
}

impl GhHttp {
    pub async fn create_org_webhook(
        &self,
        org: &str,
        target_url: &str,
        events: &[String],
        content_type: ContentType,
        active: bool,
    ) -> anyhow::Result<(StatusCode, serde_json::Value)> {
        validate_events(events)?;
        let url = self.endpoint(&format!("orgs/{org}/hooks"));
        tracing::info!(org, target_url, events = ?events, "creating organization webhook");
        self.post_json(&url, &hook_payload(target_url, events, content_type, active))
            .await
    }

    pub async fn ping_org_webhook(&self, org: &str, hook_id: u64) -> anyhow::Result<(StatusCode, serde_json::Value)> {
        let url = self.endpoint(&format!("orgs/{org}/hooks/{hook_id}/pings"));
        self.post_json(&url, &serde_json::json!({})).await
    }
}
