//! Paged retrieval: follows `Link: <...>; rel="next"` until exhausted,
//! sleeping through `Retry-After` rate-limit signals.

use super::error::{json_kind, ApiError};
use super::link::parse_link_header;
use super::transport::{RawResponse, Transport};
use anyhow::Context;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashSet;
use std::time::Duration;

/// GET `url`, waiting out any `Retry-After` and retrying the same URL.
///
/// The wait only suspends the calling task, so other in-flight workers keep
/// going. Any non-2xx response without `Retry-After` is fatal.
pub async fn get_with_backoff(transport: &dyn Transport, url: &str) -> anyhow::Result<RawResponse> {
    loop {
        let resp = transport.get(url).await?;

        // A blank header is no rate-limit signal.
        if let Some(raw) = resp.retry_after.as_deref().filter(|v| !v.trim().is_empty()) {
            let secs = parse_retry_after(url, raw)?;
            tracing::warn!(url, retry_after_secs = secs, "hit rate limit, will retry");
            tokio::time::sleep(Duration::from_secs(secs)).await;
            continue;
        }

        if !resp.is_success() {
            return Err(ApiError::Status {
                url: url.to_string(),
                status: resp.status,
                body: resp.body,
            }
            .into());
        }
        return Ok(resp);
    }
}

fn parse_retry_after(url: &str, raw: &str) -> Result<u64, ApiError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| ApiError::InvalidRetryAfter {
            url: url.to_string(),
            value: raw.to_string(),
        })
}

/// GET a single JSON object and decode it.
pub async fn get_object<T: DeserializeOwned>(transport: &dyn Transport, url: &str) -> anyhow::Result<T> {
    let resp = get_with_backoff(transport, url).await?;
    serde_json::from_str(&resp.body).with_context(|| format!("decoding response from {url}"))
}

/// Fetch every page starting at `url` and concatenate the items in page order.
///
/// Every page must be a JSON array. Stops when there is no `Link` header, no
/// `next` relation, or when `next` makes no forward progress (points at the
/// current page, the current page is `last`, or the URL was already fetched).
pub async fn fetch_all(transport: &dyn Transport, url: &str) -> anyhow::Result<Vec<Value>> {
    let mut all = Vec::new();
    let mut visited = HashSet::new();
    let mut current = url.to_string();
    let mut pages = 0usize;

    loop {
        visited.insert(current.clone());
        let resp = get_with_backoff(transport, &current).await?;
        pages += 1;

        let page: Value = serde_json::from_str(&resp.body)
            .with_context(|| format!("decoding page {current}"))?;
        match page {
            Value::Array(items) => all.extend(items),
            other => {
                return Err(ApiError::NotAList {
                    url: current,
                    kind: json_kind(&other),
                }
                .into())
            }
        }

        let Some(link) = resp.link.as_deref() else {
            break;
        };
        let links = parse_link_header(link)?;
        let Some(next) = links.get("next") else {
            break;
        };
        if links.get("last") == Some(&current) || visited.contains(next) {
            tracing::debug!(url = %current, next = %next, "pagination made no progress, stopping");
            break;
        }
        current = next.clone();
    }

    tracing::debug!(url, pages, items = all.len(), "paged fetch complete");
    Ok(all)
}

/// [`fetch_all`], decoding every item into `T`.
pub async fn fetch_all_as<T: DeserializeOwned>(
    transport: &dyn Transport,
    url: &str,
) -> anyhow::Result<Vec<T>> {
    fetch_all(transport, url)
        .await?
        .into_iter()
        .map(|item| serde_json::from_value(item).with_context(|| format!("decoding item from {url}")))
        .collect()
}
