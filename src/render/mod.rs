// src/render/mod.rs

//! Page rendering capability.
//!
//! The pipeline never ships opaque code to the browser: every in-page
//! lookup is a serializable [`PageQuery`] descriptor that the renderer
//! compiles to a script. This keeps the extractors implementation-agnostic
//! of the rendering engine and lets tests script a fake renderer.

pub mod chrome;

#[cfg(test)]
pub mod fake;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use chrome::ChromeRenderer;

/// Request-level resource blocking for a rendered session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Block image requests (cheaper, politer mining sessions)
    pub block_images: bool,

    /// Block web font requests
    pub block_fonts: bool,
}

impl RenderOptions {
    /// Options for contact-mining sessions: text is all that matters.
    pub fn text_only() -> Self {
        Self {
            block_images: true,
            block_fonts: true,
        }
    }
}

/// A link collected from a page: label text (or accessible name) + target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkTarget {
    pub text: String,
    pub href: String,
}

/// Serializable in-page query descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageQuery {
    /// Scroll the element to its own end; true when the element exists
    ScrollToEnd { selector: String },

    /// Count matching elements
    CountElements { selector: String },

    /// Collect `{text, href}` for matching anchors
    CollectLinks { selector: String },

    /// Collect non-empty label text (aria-label or textContent)
    CollectText { selector: String },

    /// Read one attribute from the first matching element
    ElementAttr { selector: String, attr: String },
}

impl PageQuery {
    /// Compile the descriptor to a self-contained script expression.
    pub fn to_script(&self) -> String {
        match self {
            PageQuery::ScrollToEnd { selector } => {
                let sel = js_string(selector);
                format!(
                    "(() => {{ const el = document.querySelector({sel}); \
                     if (!el) return false; el.scrollTo(0, el.scrollHeight); return true; }})()"
                )
            }
            PageQuery::CountElements { selector } => {
                let sel = js_string(selector);
                format!("document.querySelectorAll({sel}).length")
            }
            PageQuery::CollectLinks { selector } => {
                let sel = js_string(selector);
                format!(
                    "Array.from(document.querySelectorAll({sel})).map(a => ({{ \
                     text: (a.getAttribute('aria-label') || a.textContent || '').trim(), \
                     href: a.href || '' }}))"
                )
            }
            PageQuery::CollectText { selector } => {
                let sel = js_string(selector);
                format!(
                    "Array.from(document.querySelectorAll({sel}))\
                     .map(e => (e.getAttribute('aria-label') || e.textContent || '').trim())\
                     .filter(t => t.length > 0)"
                )
            }
            PageQuery::ElementAttr { selector, attr } => {
                let sel = js_string(selector);
                let attr = js_string(attr);
                format!(
                    "(() => {{ const el = document.querySelector({sel}); \
                     return el ? el.getAttribute({attr}) : null; }})()"
                )
            }
        }
    }
}

/// Structured result of a [`PageQuery`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Bool(bool),
    Count(u64),
    Links(Vec<LinkTarget>),
    Texts(Vec<String>),
    Attr(Option<String>),
}

impl QueryValue {
    /// Element count, zero for any other shape.
    pub fn as_count(&self) -> u64 {
        match self {
            QueryValue::Count(n) => *n,
            _ => 0,
        }
    }

    /// True only for `Bool(true)`.
    pub fn as_bool(&self) -> bool {
        matches!(self, QueryValue::Bool(true))
    }

    /// Collected links, empty for any other shape.
    pub fn into_links(self) -> Vec<LinkTarget> {
        match self {
            QueryValue::Links(links) => links,
            _ => Vec::new(),
        }
    }

    /// Collected texts, empty for any other shape.
    pub fn into_texts(self) -> Vec<String> {
        match self {
            QueryValue::Texts(texts) => texts,
            _ => Vec::new(),
        }
    }

    /// Attribute value, `None` for any other shape.
    pub fn into_attr(self) -> Option<String> {
        match self {
            QueryValue::Attr(attr) => attr,
            _ => None,
        }
    }
}

/// One live rendered page.
#[async_trait]
pub trait PageSession: Send + Sync {
    /// Serialized DOM content after the settle delay.
    async fn content(&self) -> Result<String>;

    /// Run a structured query against the live page.
    async fn evaluate(&self, query: &PageQuery) -> Result<QueryValue>;

    /// Close the page. Best-effort; errors are swallowed.
    async fn close(&self);
}

/// Capability to open rendered page sessions.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Navigate to `url` and return a live session once the page settles.
    async fn open(&self, url: &str, options: RenderOptions) -> Result<Box<dyn PageSession>>;
}

/// Quote a string as a JS string literal.
fn js_string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}
