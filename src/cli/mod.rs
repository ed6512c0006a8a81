pub mod board;
pub mod labels;
pub mod milestones;
pub mod webhook;

use crate::config::Settings;
use crate::github::http::{resolve_token, GhHttp};
use crate::github::types::Repository;
use crate::org::Organization;
use anyhow::Context;
use reqwest::StatusCode;
use std::sync::Arc;

/// Everything a command needs: the shared client and the organization.
pub struct App {
    pub gh: GhHttp,
    pub org: Organization,
}

impl App {
    /// Build the client from settings. `organization` overrides config `org`.
    pub fn connect(settings: &Settings, organization: Option<String>) -> anyhow::Result<Self> {
        let org_name = organization
            .or_else(|| settings.org.clone())
            .context("no organization given: pass -o/--organization or set `org` in config")?;
        let token = resolve_token()?;
        let gh = GhHttp::new(&token, &settings.http())?;
        tracing::debug!(
            org = %org_name,
            api_url = %settings.api_url,
            workers = settings.workers,
            pool_size = settings.pool_size,
            "connected"
        );
        let org = Organization::new(
            org_name,
            gh.api_url(),
            Arc::new(gh.clone()),
            settings.workers,
            settings.cache_capacity,
        );
        Ok(Self { gh, org })
    }

    /// Look up exactly one repository by name.
    pub async fn repository(&self, name: &str) -> anyhow::Result<Repository> {
        let names = [name.to_string()];
        self.org
            .repositories(Some(&names[..]))
            .await?
            .into_iter()
            .next()
            .with_context(|| format!("repository {name} not found"))
    }
}

/// Print the outcome of a write call as `STATUS` plus the pretty body.
fn print_response(what: &str, status: StatusCode, body: &serde_json::Value) -> anyhow::Result<()> {
    println!("{what}: {status}");
    if !body.is_null() {
        println!("{}", serde_json::to_string_pretty(body)?);
    }
    Ok(())
}
