// src/services/details.rs

//! Listing detail extraction.
//!
//! Every field is extracted independently and best-effort: a miss is an
//! empty value, never a failure. Partial data beats dropping the listing.

use std::sync::OnceLock;

use regex::Regex;

use crate::config::SelectorConfig;
use crate::models::{ListingDetail, ListingStub};
use crate::render::{PageQuery, PageSession, RenderOptions, Renderer};
use crate::services::EnrichmentOrchestrator;

fn phone_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\+?\d[\d\s().\-]{6,}\d").expect("phone pattern"))
}

fn rating_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+(?:\.\d+)?$").expect("rating pattern"))
}

fn review_count_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\((\d{1,3}(?:,\d{3})*|\d+)\)$").expect("review pattern"))
}

/// Extracts one listing's structured fields and hands its website to the
/// enrichment orchestrator.
pub struct DetailExtractor<'a> {
    selectors: &'a SelectorConfig,
    enricher: &'a EnrichmentOrchestrator<'a>,
}

impl<'a> DetailExtractor<'a> {
    pub fn new(selectors: &'a SelectorConfig, enricher: &'a EnrichmentOrchestrator<'a>) -> Self {
        Self {
            selectors,
            enricher,
        }
    }

    /// Extract detail for one listing. Never fails outward.
    pub async fn extract(
        &self,
        renderer: &dyn Renderer,
        stub: &ListingStub,
        visit_internal: bool,
    ) -> ListingDetail {
        let mut detail = ListingDetail::from_stub(stub);

        let session = match renderer
            .open(&stub.detail_link, RenderOptions::default())
            .await
        {
            Ok(session) => session,
            Err(e) => {
                log::warn!("Failed to render listing {}: {}", stub.detail_link, e);
                return detail;
            }
        };

        let phone_texts = self
            .collect_texts(session.as_ref(), &self.selectors.phone_text)
            .await;
        detail.phone = find_phone(&phone_texts);

        detail.website = self.website_link(session.as_ref()).await;

        let labels = self
            .collect_texts(session.as_ref(), &self.selectors.label_text)
            .await;
        detail.rating = find_rating(&labels);
        detail.review_count = find_review_count(&labels);

        session.close().await;

        if detail.website.is_empty() {
            log::debug!("{} has no website; skipping enrichment", detail.name);
        } else {
            detail.contacts = self
                .enricher
                .enrich(renderer, &detail.website, visit_internal)
                .await;
        }

        detail
    }

    async fn collect_texts(&self, session: &dyn PageSession, selector: &str) -> Vec<String> {
        let query = PageQuery::CollectText {
            selector: selector.to_string(),
        };
        match session.evaluate(&query).await {
            Ok(value) => value.into_texts(),
            Err(e) => {
                log::debug!("Text collection failed for {}: {}", selector, e);
                Vec::new()
            }
        }
    }

    async fn website_link(&self, session: &dyn PageSession) -> String {
        let query = PageQuery::ElementAttr {
            selector: self.selectors.website_link.clone(),
            attr: "href".to_string(),
        };
        match session.evaluate(&query).await {
            Ok(value) => value.into_attr().unwrap_or_default(),
            Err(e) => {
                log::debug!("Website lookup failed: {}", e);
                String::new()
            }
        }
    }
}

/// First digit-heavy run (optional leading `+`, at least 8 digits) in the
/// given texts, normalized to `[0-9+()\- ]`.
fn find_phone(texts: &[String]) -> String {
    for text in texts {
        for m in phone_re().find_iter(text) {
            let digits = m.as_str().chars().filter(|c| c.is_ascii_digit()).count();
            if digits >= 8 {
                return normalize_phone(m.as_str());
            }
        }
    }
    String::new()
}

fn normalize_phone(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '+' | '(' | ')' | '-' | ' '))
        .collect::<String>()
        .trim()
        .to_string()
}

/// First purely numeric (optionally decimal) label.
fn find_rating(texts: &[String]) -> String {
    texts
        .iter()
        .find(|t| rating_re().is_match(t))
        .cloned()
        .unwrap_or_default()
}

/// First parenthesized grouped integer label, parentheses stripped.
fn find_review_count(texts: &[String]) -> String {
    texts
        .iter()
        .find_map(|t| review_count_re().captures(t))
        .map(|caps| caps[1].to_string())
        .unwrap_or_default()
}
