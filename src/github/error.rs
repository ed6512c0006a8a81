//! Fatal API conditions.
//!
//! These travel inside `anyhow::Error`; callers that need to tell them apart
//! use `err.downcast_ref::<ApiError>()`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// A `Link` header entry without `<url>` delimiters or a quoted `rel`.
    #[error("malformed Link header entry: {0:?}")]
    MalformedLink(String),

    /// A non-2xx response that was not a rate-limit signal.
    #[error("GitHub API GET {url} failed ({status}): {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    /// A paginated endpoint returned something other than a JSON array.
    #[error("GitHub API GET {url}: expected a JSON array, got {kind}")]
    NotAList { url: String, kind: &'static str },

    #[error("invalid Retry-After value {value:?} from {url}")]
    InvalidRetryAfter { url: String, value: String },

    /// `OWNER/REPO#N` references. Known limitation, never resolved silently.
    #[error("cross repository dependencies not yet supported: {reference:?}")]
    CrossRepositoryDependency { reference: String },

    #[error("invalid dependency reference {0:?}")]
    InvalidDependency(String),

    #[error("no GitHub token found: set GITHUB_ACCESS_TOKEN, GH_TOKEN, GITHUB_TOKEN, or run `gh auth login`")]
    MissingToken,
}

/// Name of a JSON value's type, for shape errors.
pub fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
