//! Fragment sources
//!
//! Fragments are trusted HTML injected as-is. `HttpFragments` GETs them
//! relative to the page; `StaticFragments` serves them from memory.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use crate::error::{js_message, ViewerError};

pub type FragmentFuture<'a> = Pin<Box<dyn Future<Output = Result<String, ViewerError>> + 'a>>;

/// Where page fragments come from
pub trait FragmentSource {
    fn fetch<'a>(&'a self, page: &'a str) -> FragmentFuture<'a>;
}

// =============================================================================
// HttpFragments
// =============================================================================

/// `window.fetch` for each page identifier
#[derive(Debug, Default, Clone)]
pub struct HttpFragments;

impl HttpFragments {
    async fn get(page: &str) -> Result<String, ViewerError> {
        let window = web_sys::window().ok_or_else(|| ViewerError::network(page, "no window"))?;

        // Fragment paths may contain spaces
        let url = String::from(js_sys::encode_uri(page));

        let response = JsFuture::from(window.fetch_with_str(&url))
            .await
            .map_err(|e| ViewerError::network(page, js_message(&e)))?;
        let response: web_sys::Response = response
            .dyn_into()
            .map_err(|e| ViewerError::network(page, js_message(&e)))?;

        if !response.ok() {
            return Err(ViewerError::network(
                page,
                format!("HTTP {} {}", response.status(), response.status_text()),
            ));
        }

        let text = response
            .text()
            .map_err(|e| ViewerError::network(page, js_message(&e)))?;
        let text = JsFuture::from(text)
            .await
            .map_err(|e| ViewerError::network(page, js_message(&e)))?;

        text.as_string()
            .ok_or_else(|| ViewerError::network(page, "response body is not text"))
    }
}

impl FragmentSource for HttpFragments {
    fn fetch<'a>(&'a self, page: &'a str) -> FragmentFuture<'a> {
        Box::pin(Self::get(page))
    }
}

// =============================================================================
// StaticFragments
// =============================================================================

/// Fragments keyed by page identifier; unknown pages fail like a 404
#[derive(Debug, Default, Clone)]
pub struct StaticFragments {
    pages: HashMap<String, String>,
}

impl StaticFragments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, page: &str, html: &str) -> Self {
        self.insert(page, html);
        self
    }

    pub fn insert(&mut self, page: &str, html: &str) {
        self.pages.insert(page.to_string(), html.to_string());
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    fn lookup(&self, page: &str) -> Result<String, ViewerError> {
        self.pages
            .get(page)
            .cloned()
            .ok_or_else(|| ViewerError::network(page, "HTTP 404 Not Found"))
    }
}

impl FragmentSource for StaticFragments {
    fn fetch<'a>(&'a self, page: &'a str) -> FragmentFuture<'a> {
        let result = self.lookup(page);
        Box::pin(async move { result })
    }
}
