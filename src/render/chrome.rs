// src/render/chrome.rs

//! Chromium-backed renderer over CDP.
//!
//! Launches a headless browser lazily on first use, or attaches to a
//! remote DevTools endpoint when configured. One page per session; callers
//! open and close sessions strictly sequentially.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams, SetBlockedUrLsParams, SetUserAgentOverrideParams,
};
use chromiumoxide::cdp::browser_protocol::page::{CloseParams, NavigateParams};
use chromiumoxide::{Browser, BrowserConfig as ChromeConfig, Page};
use futures::StreamExt;
use tokio::sync::Mutex;

use crate::config::{BrowserConfig, CrawlerConfig};
use crate::error::{AppError, Result};

use super::{LinkTarget, PageQuery, PageSession, QueryValue, RenderOptions, Renderer};

/// URL patterns blocked when a session opts out of images.
const IMAGE_PATTERNS: &[&str] = &["*.png", "*.jpg", "*.jpeg", "*.gif", "*.webp", "*.svg"];

/// URL patterns blocked when a session opts out of web fonts.
const FONT_PATTERNS: &[&str] = &["*.woff", "*.woff2", "*.ttf", "*.otf"];

/// Script that resolves once the document is interactive, with its own
/// fallback timeout in case the event never fires.
const READY_SCRIPT: &str = r#"
    new Promise((resolve) => {
        if (document.readyState === 'complete' || document.readyState === 'interactive') {
            resolve(document.readyState);
        } else {
            document.addEventListener('DOMContentLoaded', () => resolve(document.readyState));
            setTimeout(() => resolve('timeout'), 10000);
        }
    })
"#;

/// Renderer backed by a lazily launched Chromium instance.
pub struct ChromeRenderer {
    crawler: CrawlerConfig,
    config: BrowserConfig,
    browser: Mutex<Option<Arc<Mutex<Browser>>>>,
}

impl ChromeRenderer {
    /// Create a renderer. The browser is not launched until the first
    /// session is opened.
    pub fn new(crawler: CrawlerConfig, config: BrowserConfig) -> Self {
        Self {
            crawler,
            config,
            browser: Mutex::new(None),
        }
    }

    /// Launch or attach to the browser if not already running.
    async fn ensure_browser(&self) -> Result<Arc<Mutex<Browser>>> {
        let mut guard = self.browser.lock().await;
        if let Some(browser) = guard.as_ref() {
            return Ok(Arc::clone(browser));
        }

        let (browser, mut handler) = if let Some(remote) = self.config.remote_url.clone() {
            let ws_url = self.resolve_ws_url(&remote).await?;
            log::info!("Attaching to remote browser at {}", ws_url);
            Browser::connect(ws_url)
                .await
                .map_err(AppError::browser)?
        } else {
            log::info!("Launching browser (headless={})", self.config.headless);

            let mut builder = ChromeConfig::builder();
            if !self.config.headless {
                builder = builder.with_head();
            }

            builder = builder
                .arg("--disable-blink-features=AutomationControlled")
                .arg("--disable-dev-shm-usage")
                .arg("--no-first-run")
                .arg("--no-default-browser-check")
                .arg("--disable-background-networking")
                .arg("--disable-sync")
                .arg("--no-sandbox")
                .arg("--disable-gpu");

            for arg in &self.config.chrome_args {
                builder = builder.arg(arg);
            }

            let chrome_config = builder.build().map_err(AppError::browser)?;
            Browser::launch(chrome_config)
                .await
                .map_err(AppError::browser)?
        };

        // Drive the CDP event loop for the lifetime of the browser.
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let browser = Arc::new(Mutex::new(browser));
        *guard = Some(Arc::clone(&browser));
        Ok(browser)
    }

    /// Resolve the WebSocket debugger URL from a remote DevTools endpoint.
    async fn resolve_ws_url(&self, remote: &str) -> Result<String> {
        let http_url = remote
            .replace("ws://", "http://")
            .replace("wss://", "https://");
        let version_url = format!("{}/json/version", http_url.trim_end_matches('/'));

        let resp: serde_json::Value = reqwest::Client::new()
            .get(&version_url)
            .send()
            .await?
            .json()
            .await?;

        resp.get("webSocketDebuggerUrl")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| AppError::browser("no webSocketDebuggerUrl in remote version info"))
    }

    fn nav_timeout(&self) -> Duration {
        Duration::from_secs(self.crawler.nav_timeout_secs)
    }
}

#[async_trait]
impl Renderer for ChromeRenderer {
    async fn open(&self, url: &str, options: RenderOptions) -> Result<Box<dyn PageSession>> {
        let browser = self.ensure_browser().await?;

        let page = {
            let browser = browser.lock().await;
            browser
                .new_page("about:blank")
                .await
                .map_err(|e| AppError::render(url, e))?
        };

        page.execute(SetUserAgentOverrideParams::new(
            self.crawler.user_agent.clone(),
        ))
        .await
        .map_err(|e| AppError::render(url, e))?;

        let mut blocked: Vec<String> = Vec::new();
        if options.block_images {
            blocked.extend(IMAGE_PATTERNS.iter().map(|p| p.to_string()));
        }
        if options.block_fonts {
            blocked.extend(FONT_PATTERNS.iter().map(|p| p.to_string()));
        }
        if !blocked.is_empty() {
            page.execute(EnableParams::default())
                .await
                .map_err(|e| AppError::render(url, e))?;
            page.execute(SetBlockedUrLsParams::new(blocked))
                .await
                .map_err(|e| AppError::render(url, e))?;
        }

        let nav = NavigateParams::builder()
            .url(url)
            .build()
            .map_err(|e| AppError::render(url, e))?;

        tokio::time::timeout(self.nav_timeout(), page.execute(nav))
            .await
            .map_err(|_| AppError::render(url, "navigation timed out"))?
            .map_err(|e| AppError::render(url, e))?;

        match tokio::time::timeout(self.nav_timeout(), page.evaluate(READY_SCRIPT.to_string()))
            .await
        {
            Ok(Ok(result)) => {
                let state: String = result
                    .into_value()
                    .unwrap_or_else(|_| "unknown".to_string());
                log::debug!("Page ready state for {}: {}", url, state);
            }
            Ok(Err(e)) => log::debug!("Could not check ready state for {}: {}", url, e),
            Err(_) => log::warn!("Timeout waiting for ready state of {}", url),
        }

        // Late-loading scripts still mutate the DOM after readiness.
        tokio::time::sleep(Duration::from_millis(self.config.render_settle_ms)).await;

        Ok(Box::new(ChromeSession {
            page,
            url: url.to_string(),
        }))
    }
}

/// One live Chromium tab.
struct ChromeSession {
    page: Page,
    url: String,
}

#[async_trait]
impl PageSession for ChromeSession {
    async fn content(&self) -> Result<String> {
        self.page
            .content()
            .await
            .map_err(|e| AppError::render(&self.url, e))
    }

    async fn evaluate(&self, query: &PageQuery) -> Result<QueryValue> {
        let script = query.to_script();
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| AppError::render(&self.url, e))?;

        let value = match query {
            PageQuery::ScrollToEnd { .. } => {
                QueryValue::Bool(result.into_value::<bool>().unwrap_or(false))
            }
            PageQuery::CountElements { .. } => {
                QueryValue::Count(result.into_value::<u64>().unwrap_or(0))
            }
            PageQuery::CollectLinks { .. } => {
                QueryValue::Links(result.into_value::<Vec<LinkTarget>>().unwrap_or_default())
            }
            PageQuery::CollectText { .. } => {
                QueryValue::Texts(result.into_value::<Vec<String>>().unwrap_or_default())
            }
            PageQuery::ElementAttr { .. } => {
                QueryValue::Attr(result.into_value::<Option<String>>().unwrap_or(None))
            }
        };
        Ok(value)
    }

    async fn close(&self) {
        if let Err(e) = self.page.execute(CloseParams::default()).await {
            log::debug!("Failed to close page {}: {}", self.url, e);
        }
    }
}
