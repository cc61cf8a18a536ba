// src/render/fake.rs

//! Scripted renderer for tests.
//!
//! Pages are keyed by URL; each page scripts the values successive queries
//! return. `CountElements` walks a per-session sequence so tests can model
//! a feed that grows, stalls, or never loads.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{AppError, Result};

use super::{LinkTarget, PageQuery, PageSession, QueryValue, RenderOptions, Renderer};

/// Scripted behavior for one URL.
#[derive(Debug, Clone, Default)]
pub struct FakePage {
    /// Serialized DOM returned by `content()`
    pub content: String,

    /// Successive `CountElements` results; the last value repeats
    pub counts: Vec<u64>,

    /// `CollectLinks` result
    pub entries: Vec<LinkTarget>,

    /// `CollectText` results keyed by selector
    pub texts: HashMap<String, Vec<String>>,

    /// `ElementAttr` results keyed by selector
    pub attrs: HashMap<String, String>,

    /// Whether `ScrollToEnd` finds its element
    pub missing_panel: bool,

    /// Fail the navigation outright
    pub fail_open: bool,
}

impl FakePage {
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }
}

/// Renderer whose pages are scripted up front.
#[derive(Default)]
pub struct FakeRenderer {
    pages: Mutex<HashMap<String, FakePage>>,
    opened: Mutex<Vec<String>>,
}

impl FakeRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the page served for `url`.
    pub fn insert(&self, url: impl Into<String>, page: FakePage) {
        self.pages.lock().unwrap().insert(url.into(), page);
    }

    /// URLs opened so far, in order.
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }

    /// Number of sessions opened so far.
    pub fn open_count(&self) -> usize {
        self.opened.lock().unwrap().len()
    }
}

#[async_trait]
impl Renderer for FakeRenderer {
    async fn open(&self, url: &str, _options: RenderOptions) -> Result<Box<dyn PageSession>> {
        self.opened.lock().unwrap().push(url.to_string());

        let page = self
            .pages
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_default();

        if page.fail_open {
            return Err(AppError::render(url, "scripted navigation failure"));
        }

        Ok(Box::new(FakeSession {
            page,
            count_calls: AtomicUsize::new(0),
        }))
    }
}

struct FakeSession {
    page: FakePage,
    count_calls: AtomicUsize,
}

#[async_trait]
impl PageSession for FakeSession {
    async fn content(&self) -> Result<String> {
        Ok(self.page.content.clone())
    }

    async fn evaluate(&self, query: &PageQuery) -> Result<QueryValue> {
        let value = match query {
            PageQuery::ScrollToEnd { .. } => QueryValue::Bool(!self.page.missing_panel),
            PageQuery::CountElements { .. } => {
                let call = self.count_calls.fetch_add(1, Ordering::SeqCst);
                let count = match self.page.counts.as_slice() {
                    [] => 0,
                    counts => counts[call.min(counts.len() - 1)],
                };
                QueryValue::Count(count)
            }
            PageQuery::CollectLinks { .. } => QueryValue::Links(self.page.entries.clone()),
            PageQuery::CollectText { selector } => {
                QueryValue::Texts(self.page.texts.get(selector).cloned().unwrap_or_default())
            }
            PageQuery::ElementAttr { selector, .. } => {
                QueryValue::Attr(self.page.attrs.get(selector).cloned())
            }
        };
        Ok(value)
    }

    async fn close(&self) {}
}
