//! Configuration types and defaults for the viewer
//!
//! Defaults match the markup of the guide site; any field can be overridden
//! from JavaScript with a camelCase object passed to `DocViewer.mount`.

use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;

use crate::error::ViewerError;

// =============================================================================
// Main Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewerConfig {
    // ===== ROUTING =====
    /// Page loaded when the hash is absent or unrecognized
    pub default_page: String,
    /// Hash values starting with one of these are page identifiers
    pub route_prefixes: Vec<String>,
    /// Pages under this prefix render inside the two-pane guide layout
    pub guide_prefix: String,
    /// Shell fragment holding the guide sidebar and content placeholder
    pub guide_shell: String,

    // ===== LAYOUT =====
    pub content_selector: String,
    pub topnav_selector: String,
    pub sidebar_selector: String,
    pub guide_content_selector: String,
    /// Class of the wrapper built around sidebar + content
    pub layout_class: String,
    pub toggle_selector: String,
    pub submenu_selector: String,
    pub open_class: String,
    pub active_class: String,
    /// Attribute carrying the page identifier on navigable links
    pub page_attribute: String,

    // ===== WIDGETS =====
    pub widget_selector: String,
    pub tiers_attribute: String,
    pub initialized_attribute: String,
    pub duration_selector: String,
    pub select_class: String,

    // ===== SEARCH =====
    pub search_input_id: String,
    pub search_results_id: String,
    pub search_page_id: String,
    pub search_results_container_id: String,
    /// Maximum entries shown in the dropdown
    pub dropdown_limit: usize,
    /// Minimum query length (chars) before the dropdown opens
    pub dropdown_min_chars: usize,
    /// Path shown for links in the top navigation
    pub topnav_path_label: String,

    /// Load the hash route on mount
    pub load_initial_route: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            default_page: "pages/home.html".to_string(),
            route_prefixes: vec!["pages/".to_string(), "guides/".to_string()],
            guide_prefix: "guides/".to_string(),
            guide_shell: "guides.html".to_string(),

            content_selector: "#content".to_string(),
            topnav_selector: "#topnav".to_string(),
            sidebar_selector: ".guides-sidebar".to_string(),
            guide_content_selector: ".guides-content".to_string(),
            layout_class: "guides-layout".to_string(),
            toggle_selector: ".toggle".to_string(),
            submenu_selector: ".submenu".to_string(),
            open_class: "open".to_string(),
            active_class: "active".to_string(),
            page_attribute: "data-page".to_string(),

            widget_selector: ".electrolyzer-config".to_string(),
            tiers_attribute: "data-tiers".to_string(),
            initialized_attribute: "data-initialized".to_string(),
            duration_selector: ".electrolyzer-time".to_string(),
            select_class: "electrolyzer-tier-select".to_string(),

            search_input_id: "search-input".to_string(),
            search_results_id: "search-results".to_string(),
            search_page_id: "search-page".to_string(),
            search_results_container_id: "search-results-container".to_string(),
            dropdown_limit: 5,
            dropdown_min_chars: 2,
            topnav_path_label: "Main Navigation".to_string(),

            load_initial_route: true,
        }
    }
}

impl ViewerConfig {
    /// Build from a JS object; `undefined` and `null` yield the defaults
    pub fn from_js(value: JsValue) -> Result<Self, ViewerError> {
        if value.is_undefined() || value.is_null() {
            return Ok(Self::default());
        }
        serde_wasm_bindgen::from_value(value)
            .map_err(|e| ViewerError::Dom(format!("Invalid viewer config: {}", e)))
    }

    /// True when `page` renders inside the two-pane guide layout
    pub fn is_guide_page(&self, page: &str) -> bool {
        page.starts_with(&self.guide_prefix)
    }

    /// `a[data-page]` for the configured attribute
    pub fn link_selector(&self) -> String {
        format!("a[{}]", self.page_attribute)
    }

    /// Links inside sidebar sections, e.g. `.submenu a[data-page]`
    pub fn section_link_selector(&self) -> String {
        format!("{} {}", self.submenu_selector, self.link_selector())
    }

    /// Class name of the toggle selector without its leading dot
    pub fn toggle_class(&self) -> &str {
        self.toggle_selector.trim_start_matches('.')
    }
}
