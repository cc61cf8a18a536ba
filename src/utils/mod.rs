// src/utils/mod.rs

//! Utility functions and helpers.

use url::Url;

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> Option<String> {
    base.join(href).ok().map(|u| u.to_string())
}

/// Extract the host from a URL string.
pub fn get_host(url_str: &str) -> Option<String> {
    Url::parse(url_str)
        .ok()
        .and_then(|u| u.host_str().map(|s| s.to_lowercase()))
}

/// True when both URLs share the exact same hostname.
pub fn same_host(a: &str, b: &str) -> bool {
    match (get_host(a), get_host(b)) {
        (Some(ha), Some(hb)) => ha == hb,
        _ => false,
    }
}

/// Reduce arbitrary text to a filesystem-safe slug.
pub fn slugify(text: &str) -> String {
    let slug: String = text
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();

    let collapsed = slug
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if collapsed.is_empty() {
        "query".to_string()
    } else {
        collapsed
    }
}
