//! Widget Initializer: tier selectors that drive a duration display
//!
//! Containers look like
//! `<span class="electrolyzer-config" data-tiers='[{"tier":"LV","sec":75}]'>`
//! next to `<span class="electrolyzer-time">75</span>`. Initialization is
//! idempotent: bound containers carry `data-initialized` and are skipped.

pub mod tiers;

pub use tiers::{Tier, TierConfig};

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlOptionElement, HtmlSelectElement};

use crate::config::ViewerConfig;
use crate::dom::{self, Listener};
use crate::error::ViewerError;

/// Live selectors and their change handlers
#[derive(Default)]
pub struct WidgetRegistry {
    live: Vec<(Element, Listener)>,
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Initialize every fresh container; returns how many were built
    pub fn init_all(&mut self, document: &Document, config: &ViewerConfig) -> usize {
        // Containers replaced with their content no longer need handlers
        self.live.retain(|(container, _)| container.is_connected());

        let mut built = 0;
        for container in dom::query_all(document, &config.widget_selector) {
            if container.has_attribute(&config.initialized_attribute) {
                continue;
            }
            let Some(raw) = container.get_attribute(&config.tiers_attribute) else {
                continue;
            };
            let tiers = match TierConfig::parse(&raw) {
                Ok(tiers) => tiers,
                Err(e) => {
                    console_error!("[Widgets] {} in {}: {}", e, config.tiers_attribute, raw);
                    continue;
                }
            };
            match self.init_one(document, config, &container, tiers) {
                Ok(()) => built += 1,
                Err(e) => console_error!("[Widgets] {}", e),
            }
        }
        built
    }

    fn init_one(
        &mut self,
        document: &Document,
        config: &ViewerConfig,
        container: &Element,
        tiers: TierConfig,
    ) -> Result<(), ViewerError> {
        let select = document
            .create_element("select")
            .map_err(ViewerError::from_js)?
            .dyn_into::<HtmlSelectElement>()
            .map_err(|_| ViewerError::Dom("select element".into()))?;
        select.set_class_name(&config.select_class);

        for (i, tier) in tiers.tiers().iter().enumerate() {
            let option = HtmlOptionElement::new_with_text_and_value(&tier.tier, &tier.tier)
                .map_err(ViewerError::from_js)?;
            option
                .dataset()
                .set("sec", &tier.sec.to_string())
                .map_err(ViewerError::from_js)?;
            if i == 0 {
                option.set_selected(true);
            }
            select.append_child(&option).map_err(ViewerError::from_js)?;
        }

        let target = duration_target(document, config, container);
        match (&target, tiers.default_tier()) {
            (Some(display), Some(first)) => display.set_text_content(Some(&first.sec.to_string())),
            (None, _) => console_log!("[Widgets] No {} for selector; updates disabled", config.duration_selector),
            _ => {}
        }

        let listener = Listener::new(&select, "change", move |event| {
            let Some(display) = &target else {
                return;
            };
            let Some(select) = event
                .target()
                .and_then(|t| t.dyn_into::<HtmlSelectElement>().ok())
            else {
                return;
            };
            let Ok(index) = usize::try_from(select.selected_index()) else {
                return;
            };
            if let Some(sec) = tiers.duration_at(index) {
                display.set_text_content(Some(&sec));
            }
        })?;

        container.replace_children_with_node_1(&select);
        container
            .set_attribute(&config.initialized_attribute, "1")
            .map_err(ViewerError::from_js)?;

        self.live.push((container.clone(), listener));
        Ok(())
    }
}

/// Duration element in the same paragraph, else the first in the document
pub fn duration_target(document: &Document, config: &ViewerConfig, container: &Element) -> Option<Element> {
    dom::closest(container, "p")
        .and_then(|p| dom::query_in(&p, &config.duration_selector))
        .or_else(|| dom::query(document, &config.duration_selector))
}
