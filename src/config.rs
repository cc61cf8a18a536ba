// src/config.rs

//! Application configuration structures.
//!
//! Every selector, delay and cap the pipeline uses lives here so a feed
//! DOM change or a pacing adjustment is a config edit, not a code change.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Crawl pacing and bounds
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Feed discovery behavior
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Website enrichment behavior
    #[serde(default)]
    pub enrichment: EnrichmentConfig,

    /// CSS selectors for the feed and detail pages
    #[serde(default)]
    pub selectors: SelectorConfig,

    /// Headless browser settings
    #[serde(default)]
    pub browser: BrowserConfig,

    /// HTTP job-control surface settings
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        if !path.as_ref().exists() {
            return Self::default();
        }
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.nav_timeout_secs == 0 {
            return Err(AppError::validation("crawler.nav_timeout_secs must be > 0"));
        }
        if self.crawler.max_listings == 0 {
            return Err(AppError::validation("crawler.max_listings must be > 0"));
        }
        if self.discovery.max_rounds == 0 {
            return Err(AppError::validation("discovery.max_rounds must be > 0"));
        }
        if !self.discovery.search_url_template.contains("{query}") {
            return Err(AppError::validation(
                "discovery.search_url_template must contain {query}",
            ));
        }
        if self.enrichment.max_pages_visited > self.enrichment.max_candidate_pages {
            return Err(AppError::validation(
                "enrichment.max_pages_visited cannot exceed max_candidate_pages",
            ));
        }
        if self.enrichment.page_keywords.is_empty() {
            return Err(AppError::validation("enrichment.page_keywords is empty"));
        }
        if self.selectors.feed_panel.trim().is_empty() || self.selectors.feed_entry.trim().is_empty()
        {
            return Err(AppError::validation("feed selectors must be non-empty"));
        }
        Ok(())
    }
}

/// Crawl pacing and bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent override for rendered sessions
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Per-navigation timeout in seconds
    #[serde(default = "defaults::nav_timeout")]
    pub nav_timeout_secs: u64,

    /// Hard cap on listings a single job may request
    #[serde(default = "defaults::max_listings")]
    pub max_listings: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            nav_timeout_secs: defaults::nav_timeout(),
            max_listings: defaults::max_listings(),
        }
    }
}

/// Feed discovery settings.
///
/// The delays are load-bearing: the feed lazy-loads and throttles, so the
/// loop must pace itself rather than poll as fast as it can.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Results feed URL; `{query}` is replaced with the encoded search term
    #[serde(default = "defaults::search_url_template")]
    pub search_url_template: String,

    /// Maximum scroll rounds before giving up on feed growth
    #[serde(default = "defaults::max_rounds")]
    pub max_rounds: usize,

    /// Lazy-load settle delay for small targets, in milliseconds
    #[serde(default = "defaults::settle_short")]
    pub settle_short_ms: u64,

    /// Lazy-load settle delay for large targets (the feed throttles harder
    /// the deeper the scroll), in milliseconds
    #[serde(default = "defaults::settle_long")]
    pub settle_long_ms: u64,

    /// Targets above this count use the long settle delay
    #[serde(default = "defaults::large_target_threshold")]
    pub large_target_threshold: usize,

    /// Extra grace wait after the first no-growth round, in milliseconds.
    /// Slow network recovery is common; one retry avoids premature
    /// convergence.
    #[serde(default = "defaults::stall_grace")]
    pub stall_grace_ms: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            search_url_template: defaults::search_url_template(),
            max_rounds: defaults::max_rounds(),
            settle_short_ms: defaults::settle_short(),
            settle_long_ms: defaults::settle_long(),
            large_target_threshold: defaults::large_target_threshold(),
            stall_grace_ms: defaults::stall_grace(),
        }
    }
}

impl DiscoveryConfig {
    /// Settle delay for a given target size.
    pub fn settle_ms(&self, target: usize) -> u64 {
        if target > self.large_target_threshold {
            self.settle_long_ms
        } else {
            self.settle_short_ms
        }
    }
}

/// Website enrichment settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// Maximum internal candidate pages to collect from a homepage
    #[serde(default = "defaults::max_candidate_pages")]
    pub max_candidate_pages: usize,

    /// Maximum internal pages actually visited per website
    #[serde(default = "defaults::max_pages_visited")]
    pub max_pages_visited: usize,

    /// URL keywords that mark a link as worth mining
    #[serde(default = "defaults::page_keywords")]
    pub page_keywords: Vec<String>,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            max_candidate_pages: defaults::max_candidate_pages(),
            max_pages_visited: defaults::max_pages_visited(),
            page_keywords: defaults::page_keywords(),
        }
    }
}

/// CSS selectors for the results feed and listing detail pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Scrollable results feed panel
    #[serde(default = "defaults::feed_panel")]
    pub feed_panel: String,

    /// One listing entry link inside the feed
    #[serde(default = "defaults::feed_entry")]
    pub feed_entry: String,

    /// Elements whose text is scanned for a phone number
    #[serde(default = "defaults::phone_text")]
    pub phone_text: String,

    /// Canonical outbound website link on a detail page
    #[serde(default = "defaults::website_link")]
    pub website_link: String,

    /// Label elements scanned for rating and review count
    #[serde(default = "defaults::label_text")]
    pub label_text: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            feed_panel: defaults::feed_panel(),
            feed_entry: defaults::feed_entry(),
            phone_text: defaults::phone_text(),
            website_link: defaults::website_link(),
            label_text: defaults::label_text(),
        }
    }
}

/// Headless browser settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Run in headless mode
    #[serde(default = "defaults::headless")]
    pub headless: bool,

    /// Remote Chrome DevTools URL (e.g. "ws://localhost:9222").
    /// If set, attaches to an existing browser instead of launching one.
    #[serde(default)]
    pub remote_url: Option<String>,

    /// Additional Chrome arguments
    #[serde(default)]
    pub chrome_args: Vec<String>,

    /// Post-navigation settle delay for late-loading scripts, in milliseconds
    #[serde(default = "defaults::render_settle")]
    pub render_settle_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: defaults::headless(),
            remote_url: None,
            chrome_args: Vec::new(),
            render_settle_ms: defaults::render_settle(),
        }
    }
}

/// HTTP job-control surface settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind host
    #[serde(default = "defaults::host")]
    pub host: String,

    /// Bind port
    #[serde(default = "defaults::port")]
    pub port: u16,

    /// Directory for exported CSV files
    #[serde(default = "defaults::exports_dir")]
    pub exports_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: defaults::host(),
            port: defaults::port(),
            exports_dir: defaults::exports_dir(),
        }
    }
}

mod defaults {
    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) \
         Chrome/120.0.0.0 Safari/537.36"
            .into()
    }
    pub fn nav_timeout() -> u64 {
        30
    }
    pub fn max_listings() -> usize {
        200
    }

    // Discovery defaults
    pub fn search_url_template() -> String {
        "https://www.google.com/maps/search/{query}?hl=en".into()
    }
    pub fn max_rounds() -> usize {
        20
    }
    pub fn settle_short() -> u64 {
        2_000
    }
    pub fn settle_long() -> u64 {
        5_000
    }
    pub fn large_target_threshold() -> usize {
        25
    }
    pub fn stall_grace() -> u64 {
        8_000
    }

    // Enrichment defaults
    pub fn max_candidate_pages() -> usize {
        5
    }
    pub fn max_pages_visited() -> usize {
        3
    }
    pub fn page_keywords() -> Vec<String> {
        vec![
            "contact".into(),
            "about".into(),
            "team".into(),
            "staff".into(),
            "reach".into(),
            "get-in-touch".into(),
        ]
    }

    // Selector defaults
    pub fn feed_panel() -> String {
        "div[role=\"feed\"]".into()
    }
    pub fn feed_entry() -> String {
        "div[role=\"feed\"] a[href*=\"/maps/place/\"]".into()
    }
    pub fn phone_text() -> String {
        "button[data-item-id^=\"phone\"], a[data-item-id^=\"phone\"], \
         button[aria-label], div[role=\"button\"]"
            .into()
    }
    pub fn website_link() -> String {
        "a[data-item-id=\"authority\"]".into()
    }
    pub fn label_text() -> String {
        "div[role=\"main\"] span[aria-hidden=\"true\"], div[role=\"main\"] span[aria-label]".into()
    }

    // Browser defaults
    pub fn headless() -> bool {
        true
    }
    pub fn render_settle() -> u64 {
        500
    }

    // Server defaults
    pub fn host() -> String {
        "127.0.0.1".into()
    }
    pub fn port() -> u16 {
        8080
    }
    pub fn exports_dir() -> String {
        "exports".into()
    }
}
