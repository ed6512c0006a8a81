//! `Link` header parser (RFC 5988 style, as GitHub sends it for pagination).

use super::error::ApiError;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static REL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"rel="(.+?)""#).unwrap());

/// Parse `<url>; rel="next", <url>; rel="last"` into `rel -> url`.
///
/// Every entry must carry both the angle-bracketed URL and a quoted `rel`;
/// anything else means the API changed under us and is an error.
pub fn parse_link_header(value: &str) -> Result<HashMap<String, String>, ApiError> {
    let mut links = HashMap::new();
    if value.trim().is_empty() {
        return Ok(links);
    }

    for entry in value.split(',') {
        let malformed = || ApiError::MalformedLink(entry.trim().to_string());

        let (url_part, params) = entry.split_once(';').ok_or_else(malformed)?;
        let url = url_part
            .trim()
            .strip_prefix('<')
            .and_then(|u| u.strip_suffix('>'))
            .filter(|u| !u.is_empty())
            .ok_or_else(malformed)?;
        let rel = REL
            .captures(params)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
            .ok_or_else(malformed)?;

        links.insert(rel.to_string(), url.to_string());
    }

    Ok(links)
}
