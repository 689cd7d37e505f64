//! Sidebar Controller: toggles, section links, auto-expand
//!
//! Markup contract: a `.toggle` element is immediately followed by the
//! `.submenu` section it opens; sections nest inside list items of their
//! parent section.

use std::rc::Rc;

use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element};

use crate::config::ViewerConfig;
use crate::dom::{self, Listener};
use crate::fetch::FragmentSource;
use crate::router::HistoryBackend;
use crate::viewer::Shared;

use super::state::SidebarSnapshot;

// =============================================================================
// Markup walking
// =============================================================================

/// Toggles of every section enclosing `element`, outermost first
pub fn enclosing_toggles(element: &Element, config: &ViewerConfig) -> Vec<Element> {
    let mut toggles = Vec::new();
    let mut current = element.parent_element();
    while let Some(node) = current {
        if node.matches(&config.sidebar_selector).unwrap_or(false) {
            break;
        }
        if node.matches(&config.submenu_selector).unwrap_or(false) {
            if let Some(toggle) = node.previous_element_sibling() {
                if dom::has_class(&toggle, config.toggle_class()) {
                    toggles.push(toggle);
                }
            }
        }
        current = node.parent_element();
    }
    toggles.reverse();
    toggles
}

/// Breadcrumb labels of the sections enclosing `element`
pub fn section_labels(element: &Element, config: &ViewerConfig) -> Vec<String> {
    enclosing_toggles(element, config)
        .iter()
        .map(dom::text_of)
        .collect()
}

/// Labels of the open sections under the first sidebar in `document`
pub fn open_sections_in(document: &Document, config: &ViewerConfig) -> Option<SidebarSnapshot> {
    let sidebar = dom::query(document, &config.sidebar_selector)?;
    let open = dom::query_all_in(&sidebar, &config.toggle_selector)
        .into_iter()
        .filter(|toggle| {
            toggle
                .next_element_sibling()
                .map(|section| dom::has_class(&section, &config.open_class))
                .unwrap_or(false)
        })
        .map(|toggle| dom::text_of(&toggle))
        .collect();
    Some(open)
}

// =============================================================================
// Controller
// =============================================================================

impl<S, H> Shared<S, H>
where
    S: FragmentSource + 'static,
    H: HistoryBackend + 'static,
{
    /// Attach toggle and section-link handlers; drops the previous cycle's
    pub(crate) fn bind_sidebar(self: &Rc<Self>) {
        let config = &self.config;
        let mut listeners = Vec::new();

        for toggle in dom::query_all(&self.document, &config.toggle_selector) {
            let weak = Rc::downgrade(self);
            let target = toggle.clone();
            let listener = Listener::new(&toggle, "click", move |_event| {
                if let Some(shared) = weak.upgrade() {
                    shared.toggle_section(&target);
                }
            });
            match listener {
                Ok(listener) => listeners.push(listener),
                Err(e) => console_warn!("[Sidebar] Could not bind toggle: {}", e),
            }
        }

        for link in dom::query_all(&self.document, &config.section_link_selector()) {
            let Some(page) = link.get_attribute(&config.page_attribute) else {
                continue;
            };
            let weak = Rc::downgrade(self);
            let listener = Listener::new(&link, "click", move |event| {
                event.prevent_default();
                let Some(shared) = weak.upgrade() else {
                    return;
                };
                let page = page.clone();
                spawn_local(async move {
                    shared.navigate_in_guide(&page).await;
                });
            });
            match listener {
                Ok(listener) => listeners.push(listener),
                Err(e) => console_warn!("[Sidebar] Could not bind link: {}", e),
            }
        }

        *self.sidebar_listeners.borrow_mut() = listeners;
    }

    /// Flip the section after `toggle` and record it by label
    pub(crate) fn toggle_section(&self, toggle: &Element) {
        let Some(section) = toggle.next_element_sibling() else {
            return;
        };
        let open = section
            .class_list()
            .toggle(&self.config.open_class)
            .unwrap_or(false);
        self.sidebar
            .borrow_mut()
            .set_open(&dom::text_of(toggle), open);
    }

    /// Snapshot the open set from the DOM, if a sidebar is present
    pub(crate) fn capture_sidebar_state(&self) {
        if let Some(snapshot) = open_sections_in(&self.document, &self.config) {
            self.sidebar.borrow_mut().save(snapshot);
        }
    }

    /// Reopen every section of the rebuilt sidebar whose label was open
    pub(crate) fn restore_sidebar_state(&self) {
        let Some(sidebar) = dom::query(&self.document, &self.config.sidebar_selector) else {
            return;
        };
        let toggles = dom::query_all_in(&sidebar, &self.config.toggle_selector);
        let labels: Vec<String> = toggles.iter().map(dom::text_of).collect();

        let state = self.sidebar.borrow();
        let plan = state.restore(labels.iter().map(String::as_str));
        for (toggle, (_, open)) in toggles.iter().zip(plan) {
            if !open {
                continue;
            }
            if let Some(section) = toggle.next_element_sibling() {
                dom::add_class(&section, &self.config.open_class);
            }
        }
    }

    /// Mark the sidebar link for `page` active and open its ancestor sections
    pub(crate) fn reveal(&self, page: &str) {
        let Some(sidebar) = dom::query(&self.document, &self.config.sidebar_selector) else {
            return;
        };
        let links = dom::query_all_in(&sidebar, &self.config.link_selector());
        for link in &links {
            dom::remove_class(link, &self.config.active_class);
        }
        let Some(link) = links
            .into_iter()
            .find(|a| a.get_attribute(&self.config.page_attribute).as_deref() == Some(page))
        else {
            return;
        };
        dom::add_class(&link, &self.config.active_class);

        let mut state = self.sidebar.borrow_mut();
        for toggle in enclosing_toggles(&link, &self.config) {
            if let Some(section) = toggle.next_element_sibling() {
                dom::add_class(&section, &self.config.open_class);
            }
            state.set_open(&dom::text_of(&toggle), true);
        }
    }

    /// Swap the guide content area in place, or fall back to a full load
    ///
    /// Only guide pages swap in place; other pages get a plain full load.
    pub(crate) async fn navigate_in_guide(self: &Rc<Self>, page: &str) {
        let area = if self.config.is_guide_page(page) {
            dom::query(&self.document, &self.config.guide_content_selector)
        } else {
            None
        };
        let Some(area) = area else {
            self.load_page(page, None, true).await;
            return;
        };

        let ticket = self.navigator.borrow_mut().begin(page, true);
        let fetched = self.source.fetch(page).await;
        if !self.navigator.borrow().is_current(&ticket) {
            console_log!("[Sidebar] Discarded stale load of {}", page);
            return;
        }

        match fetched {
            Ok(html) => {
                area.set_inner_html(&html);
                if let Err(e) = self.navigator.borrow_mut().commit(&ticket) {
                    console_warn!("[Router] Could not record {}: {}", page, e);
                }
                self.init_widgets();
                self.bind_content_links();
                self.reveal(page);
            }
            Err(e) => {
                console_error!("[Sidebar] {}", e);
                self.render_error(&area, "Error loading guide section", &e);
                self.bind_content_links();
            }
        }
    }
}
