use super::{print_response, App};
use crate::github::hooks::ContentType;

pub async fn create(
    app: &App,
    target_url: &str,
    events: &[String],
    content_type: ContentType,
    active: bool,
) -> anyhow::Result<()> {
    let (status, body) = app
        .gh
        .create_org_webhook(app.org.name(), target_url, events, content_type, active)
        .await?;
    print_response(&format!("webhook {target_url}"), status, &body)
}

pub async fn ping(app: &App, hook_id: u64) -> anyhow::Result<()> {
    let (status, body) = app.gh.ping_org_webhook(app.org.name(), hook_id).await?;
    print_response(&format!("ping hook {hook_id}"), status, &body)
}
