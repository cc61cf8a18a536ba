// src/services/discovery.rs

//! Listing discovery over the results feed.
//!
//! The feed lazy-loads on scroll and throttles aggressively, so discovery
//! is a paced convergence loop: scroll, settle, count, and stop once the
//! target is reached or the feed stops growing. The feed session is
//! single-use; the produced stub list is final for the run.

use std::collections::HashSet;
use std::time::Duration;

use crate::config::{DiscoveryConfig, SelectorConfig};
use crate::error::Result;
use crate::models::ListingStub;
use crate::render::{PageQuery, PageSession, RenderOptions, Renderer};

/// Drives the scroll-convergence loop and emits deduplicated stubs.
pub struct ListingDiscovery<'a> {
    config: &'a DiscoveryConfig,
    selectors: &'a SelectorConfig,
}

impl<'a> ListingDiscovery<'a> {
    pub fn new(config: &'a DiscoveryConfig, selectors: &'a SelectorConfig) -> Self {
        Self { config, selectors }
    }

    /// Results feed URL for a search term.
    pub fn feed_url(&self, query: &str) -> String {
        self.config
            .search_url_template
            .replace("{query}", &urlencoding::encode(query))
    }

    /// Discover up to `target` listings for `query`.
    ///
    /// Fails only when the feed session itself cannot be established; a
    /// feed that never loads its panel yields an empty list instead.
    pub async fn discover(
        &self,
        renderer: &dyn Renderer,
        query: &str,
        target: usize,
    ) -> Result<Vec<ListingStub>> {
        let url = self.feed_url(query);
        log::info!("Opening results feed: {}", url);

        let session = renderer.open(&url, RenderOptions::default()).await?;
        let stubs = self.scroll_until_converged(session.as_ref(), target).await;
        session.close().await;
        stubs
    }

    /// Scroll rounds until the target count is loaded, the feed converges,
    /// or the round cap is reached; then collect and deduplicate.
    async fn scroll_until_converged(
        &self,
        session: &dyn PageSession,
        target: usize,
    ) -> Result<Vec<ListingStub>> {
        let scroll = PageQuery::ScrollToEnd {
            selector: self.selectors.feed_panel.clone(),
        };
        let count = PageQuery::CountElements {
            selector: self.selectors.feed_entry.clone(),
        };
        let settle = Duration::from_millis(self.config.settle_ms(target));

        let mut loaded: u64 = 0;
        let mut previous: u64 = 0;
        let mut stalled_once = false;

        for round in 1..=self.config.max_rounds {
            if !session.evaluate(&scroll).await?.as_bool() {
                log::warn!("Results feed panel not found; stopping discovery");
                break;
            }

            tokio::time::sleep(settle).await;
            loaded = session.evaluate(&count).await?.as_count();
            log::debug!("Discovery round {}: {} entries loaded", round, loaded);

            if loaded as usize >= target {
                break;
            }

            if loaded == previous {
                if stalled_once {
                    log::info!("Feed converged at {} entries", loaded);
                    break;
                }
                // One extended retry: slow network recovery is common, and
                // a single quiet round is not yet convergence.
                stalled_once = true;
                tokio::time::sleep(Duration::from_millis(self.config.stall_grace_ms)).await;
            } else {
                stalled_once = false;
            }
            previous = loaded;
        }

        let links = session
            .evaluate(&PageQuery::CollectLinks {
                selector: self.selectors.feed_entry.clone(),
            })
            .await?
            .into_links();

        let mut seen = HashSet::new();
        let mut stubs = Vec::new();
        for link in links {
            if link.href.is_empty() {
                continue;
            }
            if seen.insert(link.href.clone()) {
                stubs.push(ListingStub {
                    display_name: link.text,
                    detail_link: link.href,
                });
            }
        }
        stubs.truncate((loaded as usize).min(target));

        Ok(stubs)
    }
}
