// src/services/enrichment.rs

//! Website enrichment orchestration.
//!
//! Mines the homepage first and stops there when every contact channel is
//! already covered; otherwise works through a bounded set of internal
//! pages, merging whatever each one yields. A page that fails to render
//! costs nothing but its own contribution.

use crate::config::EnrichmentConfig;
use crate::error::Result;
use crate::models::ContactBundle;
use crate::render::{RenderOptions, Renderer};
use crate::services::miner;
use crate::services::pages::find_candidates;

/// Coordinates homepage + internal-page mining for one website.
pub struct EnrichmentOrchestrator<'a> {
    config: &'a EnrichmentConfig,
}

impl<'a> EnrichmentOrchestrator<'a> {
    pub fn new(config: &'a EnrichmentConfig) -> Self {
        Self { config }
    }

    /// Mine contact channels for a website, starting at its homepage.
    ///
    /// Never fails outward: any render failure degrades to whatever was
    /// collected so far.
    pub async fn enrich(
        &self,
        renderer: &dyn Renderer,
        homepage: &str,
        visit_internal: bool,
    ) -> ContactBundle {
        let content = match self.fetch_content(renderer, homepage).await {
            Ok(content) => content,
            Err(e) => {
                log::warn!("Failed to render homepage {}: {}", homepage, e);
                return ContactBundle::default();
            }
        };

        let mut bundle = miner::mine(&content);
        if bundle.is_sufficient() {
            log::debug!("Homepage bundle sufficient for {}; skipping internal pages", homepage);
            return bundle;
        }
        if !visit_internal {
            return bundle;
        }

        let candidates = find_candidates(homepage, &content, self.config);
        for candidate in candidates.iter().take(self.config.max_pages_visited) {
            match self.fetch_content(renderer, candidate).await {
                Ok(content) => bundle.merge(miner::mine(&content)),
                Err(e) => log::warn!("Skipping internal page {}: {}", candidate, e),
            }
        }

        bundle
    }

    /// Render one page and return its content, text-only session.
    async fn fetch_content(&self, renderer: &dyn Renderer, url: &str) -> Result<String> {
        let session = renderer.open(url, RenderOptions::text_only()).await?;
        let content = session.content().await;
        session.close().await;
        content
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::fake::{FakePage, FakeRenderer};

    const HOMEPAGE: &str = "https://firm.example/";

    fn orchestrator_config() -> EnrichmentConfig {
        EnrichmentConfig::default()
    }

    #[tokio::test]
    async fn test_sufficient_homepage_skips_internal_pages() {
        let renderer = FakeRenderer::new();
        renderer.insert(
            HOMEPAGE,
            FakePage::with_content(
                "mail info@firm.example facebook.com/firm instagram.com/firm \
                 <a href=\"/contact\">contact</a>",
            ),
        );

        let config = orchestrator_config();
        let bundle = EnrichmentOrchestrator::new(&config)
            .enrich(&renderer, HOMEPAGE, true)
            .await;

        assert!(bundle.is_sufficient());
        assert_eq!(renderer.open_count(), 1);
    }

    #[tokio::test]
    async fn test_internal_pages_merge_and_cap_at_three() {
        let renderer = FakeRenderer::new();
        let links: String = (1..=4)
            .map(|i| format!("<a href=\"/contact-{}\">c</a>", i))
            .collect();
        renderer.insert(HOMEPAGE, FakePage::with_content(links));
        renderer.insert(
            "https://firm.example/contact-1",
            FakePage::with_content("info@firm.example"),
        );
        renderer.insert(
            "https://firm.example/contact-2",
            FakePage::with_content("facebook.com/firm"),
        );
        renderer.insert(
            "https://firm.example/contact-3",
            FakePage::with_content("instagram.com/firm"),
        );

        let config = orchestrator_config();
        let bundle = EnrichmentOrchestrator::new(&config)
            .enrich(&renderer, HOMEPAGE, true)
            .await;

        // homepage + capped internal pages; contact-4 never visited
        assert_eq!(renderer.open_count(), 4);
        assert!(bundle.emails.contains("info@firm.example"));
        assert!(bundle.facebook.contains("https://facebook.com/firm"));
        assert!(bundle.instagram.contains("https://instagram.com/firm"));
    }

    #[tokio::test]
    async fn test_internal_page_failure_is_isolated() {
        let renderer = FakeRenderer::new();
        renderer.insert(
            HOMEPAGE,
            FakePage::with_content(
                "<a href=\"/contact\">c</a><a href=\"/about\">a</a>",
            ),
        );
        renderer.insert("https://firm.example/contact", {
            let mut page = FakePage::default();
            page.fail_open = true;
            page
        });
        renderer.insert(
            "https://firm.example/about",
            FakePage::with_content("sales@firm.example"),
        );

        let config = orchestrator_config();
        let bundle = EnrichmentOrchestrator::new(&config)
            .enrich(&renderer, HOMEPAGE, true)
            .await;

        assert!(bundle.emails.contains("sales@firm.example"));
    }

    #[tokio::test]
    async fn test_homepage_failure_yields_empty_bundle() {
        let renderer = FakeRenderer::new();
        renderer.insert(HOMEPAGE, {
            let mut page = FakePage::default();
            page.fail_open = true;
            page
        });

        let config = orchestrator_config();
        let bundle = EnrichmentOrchestrator::new(&config)
            .enrich(&renderer, HOMEPAGE, true)
            .await;

        assert!(bundle.is_empty());
        assert_eq!(renderer.open_count(), 1);
    }

    #[tokio::test]
    async fn test_visit_internal_false_stops_after_homepage() {
        let renderer = FakeRenderer::new();
        renderer.insert(
            HOMEPAGE,
            FakePage::with_content("<a href=\"/contact\">c</a> info@firm.example"),
        );

        let config = orchestrator_config();
        let bundle = EnrichmentOrchestrator::new(&config)
            .enrich(&renderer, HOMEPAGE, false)
            .await;

        assert_eq!(renderer.open_count(), 1);
        assert!(bundle.emails.contains("info@firm.example"));
    }
}
