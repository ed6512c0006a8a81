//! Native `reqwest` HTTP client for the GitHub REST API.
//!
//! One shared `reqwest::Client` carries the connection pool, the auth token
//! and the projects preview `Accept` header. Crawl workers share it through
//! the [`Transport`] trait; the CRUD helpers in `repos` and `hooks` use the
//! write methods below.

use super::error::ApiError;
use super::transport::{RawResponse, Transport};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use std::time::Duration;

pub const GITHUB_API: &str = "https://api.github.com";

/// Classic projects/columns/cards endpoints need this preview media type.
const PROJECTS_PREVIEW: &str = "application/vnd.github.inertia-preview+json";

#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub api_url: String,
    pub timeout: Duration,
    /// Idle connections kept per host. Must cover the crawl worker count.
    pub pool_size: usize,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            api_url: GITHUB_API.to_string(),
            timeout: Duration::from_secs(30),
            pool_size: 100,
        }
    }
}

#[derive(Clone)]
pub struct GhHttp {
    client: Client,
    api_url: String,
}

impl GhHttp {
    pub fn new(token: &str, settings: &HttpSettings) -> anyhow::Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("token {token}"))
            .context("GitHub token is not a valid header value")?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(header::ACCEPT, HeaderValue::from_static(PROJECTS_PREVIEW));

        let client = Client::builder()
            .user_agent(concat!("ghorgs/", env!("CARGO_PKG_VERSION"), " (reqwest)"))
            .default_headers(headers)
            .pool_max_idle_per_host(settings.pool_size)
            .timeout(settings.timeout)
            .build()
            .context("building HTTP client")?;

        Ok(Self {
            client,
            api_url: settings.api_url.trim_end_matches('/').to_string(),
        })
    }

    /// Absolute URL for an API path such as `orgs/acme/projects`.
    pub fn endpoint(&self, path: &str) -> String {
        join_endpoint(&self.api_url, path)
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// POST a JSON body. Returns the status and the decoded response body
    /// (`null` when empty); non-2xx is reported, not raised.
    pub async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> anyhow::Result<(StatusCode, serde_json::Value)> {
        let resp = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("POST {url}"))?;
        read_json(url, "POST", resp).await
    }

    /// PATCH a JSON body. Same contract as [`GhHttp::post_json`].
    pub async fn patch_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> anyhow::Result<(StatusCode, serde_json::Value)> {
        let resp = self
            .client
            .patch(url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("PATCH {url}"))?;
        read_json(url, "PATCH", resp).await
    }

    pub async fn delete(&self, url: &str) -> anyhow::Result<StatusCode> {
        let resp = self
            .client
            .delete(url)
            .send()
            .await
            .with_context(|| format!("DELETE {url}"))?;
        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(url, %status, "GitHub API DELETE was not successful");
        }
        Ok(status)
    }
}

#[async_trait]
impl Transport for GhHttp {
    async fn get(&self, url: &str) -> anyhow::Result<RawResponse> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;
        let status = resp.status().as_u16();
        let retry_after = header_str(resp.headers(), header::RETRY_AFTER);
        let link = header_str(resp.headers(), header::LINK);
        let body = resp
            .text()
            .await
            .with_context(|| format!("reading body of GET {url}"))?;
        Ok(RawResponse {
            status,
            retry_after,
            link,
            body,
        })
    }
}

async fn read_json(
    url: &str,
    method: &str,
    resp: reqwest::Response,
) -> anyhow::Result<(StatusCode, serde_json::Value)> {
    let status = resp.status();
    let text = resp
        .text()
        .await
        .with_context(|| format!("reading body of {method} {url}"))?;
    if !status.is_success() {
        tracing::warn!(url, method, %status, body = %text, "GitHub API write was not successful");
    }
    let body = if text.trim().is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_str(&text)
            .with_context(|| format!("decoding {method} {url} response"))?
    };
    Ok((status, body))
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

fn join_endpoint(api_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        api_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

// ── Token resolution ─────────────────────────────────────────────────

const TOKEN_VARS: [&str; 3] = ["GITHUB_ACCESS_TOKEN", "GH_TOKEN", "GITHUB_TOKEN"];

/// Resolve a GitHub token: `GITHUB_ACCESS_TOKEN` → `GH_TOKEN` →
/// `GITHUB_TOKEN` → `gh auth token`.
pub fn resolve_token() -> anyhow::Result<String> {
    let from_env = TOKEN_VARS
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|t| !t.trim().is_empty());
    if let Some(token) = from_env {
        return Ok(token.trim().to_string());
    }

    match std::process::Command::new("gh")
        .args(["auth", "token"])
        .output()
    {
        Ok(out) if out.status.success() => {
            let token = String::from_utf8_lossy(&out.stdout).trim().to_string();
            if !token.is_empty() {
                return Ok(token);
            }
        }
        Ok(_) => tracing::debug!("`gh auth token` returned an error"),
        Err(e) => tracing::debug!(err = %e, "`gh` not available for token lookup"),
    }
    Err(ApiError::MissingToken.into())
}
