//! The GET seam between the crawl logic and the network.
//!
//! `GhHttp` is the real implementation; tests script a `FakeTransport`.

use async_trait::async_trait;

/// What the fetch logic needs from one HTTP response.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    /// Raw `Retry-After` header value, if present.
    pub retry_after: Option<String>,
    /// Raw `Link` header value, if present.
    pub link: Option<String>,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Authenticated GET against the issue tracker. Shared read-only by every
/// crawl worker, so implementations must be safe for concurrent use.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> anyhow::Result<RawResponse>;
}

#[cfg(test)]
pub mod fake {
    use super::{RawResponse, Transport};
    use async_trait::async_trait;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    impl RawResponse {
        pub fn json(status: u16, body: serde_json::Value) -> Self {
            Self {
                status,
                retry_after: None,
                link: None,
                body: body.to_string(),
            }
        }

        pub fn ok(body: serde_json::Value) -> Self {
            Self::json(200, body)
        }

        pub fn with_link(mut self, link: &str) -> Self {
            self.link = Some(link.to_string());
            self
        }

        pub fn with_retry_after(mut self, secs: &str) -> Self {
            self.retry_after = Some(secs.to_string());
            self
        }
    }

    /// Scripted transport: each URL has a queue of responses. The last
    /// response for a URL is sticky so a crawl can be repeated.
    #[derive(Default)]
    pub struct FakeTransport {
        routes: Mutex<HashMap<String, VecDeque<RawResponse>>>,
        hits: Mutex<HashMap<String, usize>>,
    }

    impl FakeTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(&self, url: &str, response: RawResponse) -> &Self {
            self.routes
                .lock()
                .unwrap()
                .entry(url.to_string())
                .or_default()
                .push_back(response);
            self
        }

        /// Number of GETs issued for `url`.
        pub fn hits(&self, url: &str) -> usize {
            self.hits.lock().unwrap().get(url).copied().unwrap_or(0)
        }

        pub fn total_hits(&self) -> usize {
            self.hits.lock().unwrap().values().sum()
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn get(&self, url: &str) -> anyhow::Result<RawResponse> {
            *self.hits.lock().unwrap().entry(url.to_string()).or_default() += 1;
            let mut routes = self.routes.lock().unwrap();
            let response = match routes.get_mut(url) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            };
            Ok(response.unwrap_or_else(|| {
                RawResponse::json(404, serde_json::json!({ "message": "Not Found" }))
            }))
        }
    }
}
