// src/services/pages.rs

//! Internal page discovery.
//!
//! From a homepage's rendered HTML, pick the same-host pages worth mining
//! for contact details: anchors whose URL mentions a contact-ish keyword.

use std::collections::HashSet;

use scraper::{Html, Selector};
use url::Url;

use crate::config::EnrichmentConfig;
use crate::utils::{resolve_url, same_host};

/// Collect candidate internal pages from a homepage, in DOM order.
///
/// Same-hostname anchors only; malformed link targets are silently
/// discarded. At most `max_candidate_pages` entries, deduplicated.
pub fn find_candidates(homepage: &str, html: &str, config: &EnrichmentConfig) -> Vec<String> {
    let Ok(base) = Url::parse(homepage) else {
        return Vec::new();
    };

    let document = Html::parse_document(html);
    let link_selector = Selector::parse("a[href]").expect("anchor selector");

    let keywords: Vec<String> = config
        .page_keywords
        .iter()
        .map(|k| k.to_lowercase())
        .collect();

    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for element in document.select(&link_selector) {
        if candidates.len() >= config.max_candidate_pages {
            break;
        }

        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Some(resolved) = resolve_url(&base, href) else {
            continue;
        };
        if !same_host(homepage, &resolved) {
            continue;
        }

        let lower = resolved.to_lowercase();
        if !keywords.iter().any(|keyword| lower.contains(keyword)) {
            continue;
        }

        if seen.insert(resolved.clone()) {
            candidates.push(resolved);
        }
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOMEPAGE: &str = "https://firm.example/";

    fn html(body: &str) -> String {
        format!("<html><body>{}</body></html>", body)
    }

    #[test]
    fn test_keeps_same_host_keyword_links_in_dom_order() {
        let html = html(
            r#"<a href="/about-us">About</a>
               <a href="/products">Products</a>
               <a href="https://firm.example/contact">Contact</a>"#,
        );
        let candidates = find_candidates(HOMEPAGE, &html, &EnrichmentConfig::default());
        assert_eq!(
            candidates,
            vec![
                "https://firm.example/about-us".to_string(),
                "https://firm.example/contact".to_string(),
            ]
        );
    }

    #[test]
    fn test_rejects_foreign_hosts() {
        let html = html(r#"<a href="https://other.example/contact">Contact</a>"#);
        assert!(find_candidates(HOMEPAGE, &html, &EnrichmentConfig::default()).is_empty());
    }

    #[test]
    fn test_deduplicates_and_caps_at_five() {
        let links: String = (0..10)
            .map(|i| format!(r#"<a href="/contact?v={}">c</a>"#, i))
            .chain(std::iter::once(r#"<a href="/contact?v=0">dup</a>"#.to_string()))
            .collect();
        let candidates = find_candidates(HOMEPAGE, &html(&links), &EnrichmentConfig::default());
        assert_eq!(candidates.len(), 5);
        assert_eq!(
            candidates.iter().collect::<HashSet<_>>().len(),
            candidates.len()
        );
    }

    #[test]
    fn test_malformed_homepage_yields_empty() {
        assert!(find_candidates("not a url", "<a href='/contact'>c</a>", &EnrichmentConfig::default()).is_empty());
    }

    #[test]
    fn test_keyword_match_is_case_insensitive_on_url() {
        let html = html(r#"<a href="/Get-In-Touch">reach us</a>"#);
        let candidates = find_candidates(HOMEPAGE, &html, &EnrichmentConfig::default());
        assert_eq!(candidates, vec!["https://firm.example/Get-In-Touch".to_string()]);
    }
}
