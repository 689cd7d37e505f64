//! Viewer error taxonomy.
//!
//! Nothing here is fatal: load failures become inline messages, bad widget
//! configs skip one container, and missing anchors turn updates into no-ops.

use wasm_bindgen::{JsCast, JsValue};

/// Errors raised while loading pages or binding the DOM
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerError {
    /// Fetch rejected, non-2xx status, or unreadable body
    NetworkFailure { page: String, reason: String },
    /// Tier-list attribute is not a valid JSON tier array
    MalformedConfig { reason: String },
    /// An expected DOM anchor is absent
    MissingTarget(String),
    /// A DOM call threw
    Dom(String),
}

impl ViewerError {
    pub fn network(page: &str, reason: impl Into<String>) -> Self {
        ViewerError::NetworkFailure {
            page: page.to_string(),
            reason: reason.into(),
        }
    }

    /// Wrap a thrown JS value, preferring its `message` when it is an Error
    pub fn from_js(value: JsValue) -> Self {
        ViewerError::Dom(js_message(&value))
    }

    /// Short text shown inline in the content region
    pub fn user_message(&self) -> String {
        match self {
            ViewerError::NetworkFailure { reason, .. } => reason.clone(),
            other => other.to_string(),
        }
    }
}

impl std::fmt::Display for ViewerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewerError::NetworkFailure { page, reason } => {
                write!(f, "Failed to fetch {}: {}", page, reason)
            }
            ViewerError::MalformedConfig { reason } => write!(f, "Malformed tier config: {}", reason),
            ViewerError::MissingTarget(what) => write!(f, "Missing DOM target: {}", what),
            ViewerError::Dom(msg) => write!(f, "DOM error: {}", msg),
        }
    }
}

impl std::error::Error for ViewerError {}

impl From<serde_json::Error> for ViewerError {
    fn from(e: serde_json::Error) -> Self {
        ViewerError::MalformedConfig { reason: e.to_string() }
    }
}

impl From<ViewerError> for JsValue {
    fn from(e: ViewerError) -> Self {
        JsValue::from_str(&e.to_string())
    }
}

/// Best-effort text for a thrown JS value
pub(crate) fn js_message(value: &JsValue) -> String {
    if let Some(s) = value.as_string() {
        return s;
    }
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    format!("{:?}", value)
}
