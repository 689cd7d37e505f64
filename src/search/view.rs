//! Search UI: dropdown suggestions and the full results page

use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement, KeyboardEvent, Node};

use crate::config::ViewerConfig;
use crate::dom::{self, Listener};
use crate::error::{js_message, ViewerError};
use crate::fetch::FragmentSource;
use crate::router::HistoryBackend;
use crate::sidebar::section_labels;
use crate::viewer::Shared;

use super::index::{no_results_message, should_suggest, LinkPlacement, NavigationEntry, SearchIndex};

/// Index every `a[data-page]` currently in the document
pub fn build_index(document: &Document, config: &ViewerConfig) -> SearchIndex {
    let mut index = SearchIndex::new();
    for link in dom::query_all(document, &config.link_selector()) {
        let Some(page) = link.get_attribute(&config.page_attribute) else {
            continue;
        };
        let placement = if dom::is_within(&link, &config.topnav_selector) {
            LinkPlacement::TopNav
        } else if dom::is_within(&link, &config.sidebar_selector) {
            LinkPlacement::Sidebar(section_labels(&link, config))
        } else {
            LinkPlacement::Elsewhere
        };
        let title = link.text_content().unwrap_or_default();
        index.add_link(&title, &placement, &page, &config.topnav_path_label);
    }
    index
}

impl<S, H> Shared<S, H>
where
    S: FragmentSource + 'static,
    H: HistoryBackend + 'static,
{
    pub(crate) fn search(&self, query: &str) -> Vec<NavigationEntry> {
        build_index(&self.document, &self.config)
            .query(query)
            .into_iter()
            .cloned()
            .collect()
    }

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn search_input(&self) -> Option<HtmlInputElement> {
        self.element_by_id(&self.config.search_input_id)
            .and_then(|e| e.dyn_into::<HtmlInputElement>().ok())
    }

    /// Input, Enter and click-outside handlers; no-op without a search box
    pub(crate) fn bind_search(self: &Rc<Self>) -> Result<(), ViewerError> {
        let Some(input) = self.search_input() else {
            return Ok(());
        };
        let mut listeners = Vec::new();

        let weak = Rc::downgrade(self);
        listeners.push(Listener::new(&input, "input", move |event| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let Some(input) = event
                .target()
                .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
            else {
                return;
            };
            shared.show_dropdown(&input.value());
        })?);

        let weak = Rc::downgrade(self);
        listeners.push(Listener::new(&input, "keydown", move |event| {
            let Some(key) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            if key.key() != "Enter" {
                return;
            }
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let Some(input) = shared.search_input() else {
                return;
            };
            let query = input.value();
            if !query.trim().is_empty() {
                shared.show_search_page(&query);
            }
        })?);

        let weak = Rc::downgrade(self);
        listeners.push(Listener::new(&self.document, "click", move |event| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let Some(target) = event.target().and_then(|t| t.dyn_into::<Node>().ok()) else {
                return;
            };
            let inside = |id: &str| {
                shared
                    .element_by_id(id)
                    .map(|e| e.contains(Some(&target)))
                    .unwrap_or(false)
            };
            if !inside(&shared.config.search_input_id) && !inside(&shared.config.search_results_id) {
                shared.hide_dropdown();
            }
        })?);

        self.persistent.borrow_mut().extend(listeners);
        Ok(())
    }

    fn hide_dropdown(&self) {
        if let Some(results) = self.element_by_id(&self.config.search_results_id) {
            dom::set_visible(&results, false);
        }
    }

    /// Up to `dropdown_limit` suggestions under the search box
    pub(crate) fn show_dropdown(self: &Rc<Self>, query: &str) {
        let Some(results_box) = self.element_by_id(&self.config.search_results_id) else {
            return;
        };
        results_box.set_inner_html("");

        let results = if should_suggest(query, self.config.dropdown_min_chars) {
            let index = build_index(&self.document, &self.config);
            index
                .suggest(query, self.config.dropdown_limit)
                .into_iter()
                .cloned()
                .collect()
        } else {
            Vec::new()
        };

        let mut listeners = Vec::new();
        for entry in &results {
            match self.result_item(entry, "search-result-item") {
                Ok((item, listener)) => {
                    if let Err(e) = results_box.append_child(&item) {
                        console_warn!("[Search] Could not add result: {}", js_message(&e));
                    }
                    listeners.push(listener);
                }
                Err(e) => console_warn!("[Search] {}", e),
            }
        }
        *self.dropdown_listeners.borrow_mut() = listeners;
        dom::set_visible(&results_box, !results.is_empty());
    }

    /// Hide the content region and list every match on the search page
    pub(crate) fn show_search_page(self: &Rc<Self>, query: &str) {
        let results = self.search(query);
        dom::set_visible(&self.content, false);
        if let Some(page) = self.element_by_id(&self.config.search_page_id) {
            dom::set_visible(&page, true);
        }
        let Some(container) = self.element_by_id(&self.config.search_results_container_id) else {
            return;
        };
        container.set_inner_html("");

        if results.is_empty() {
            if let Err(e) = self.render_no_results(&container, query) {
                console_warn!("[Search] {}", e);
            }
            self.results_listeners.borrow_mut().clear();
            return;
        }

        let mut listeners = Vec::new();
        for entry in &results {
            match self.result_item(entry, "search-result-card") {
                Ok((card, listener)) => {
                    if let Err(e) = container.append_child(&card) {
                        console_warn!("[Search] Could not add result: {}", js_message(&e));
                    }
                    listeners.push(listener);
                }
                Err(e) => console_warn!("[Search] {}", e),
            }
        }
        *self.results_listeners.borrow_mut() = listeners;
    }

    fn render_no_results(&self, container: &Element, query: &str) -> Result<(), ViewerError> {
        let wrapper = dom::create(&self.document, "div", "no-results")?;
        let heading = dom::create(&self.document, "h3", "")?;
        heading.set_text_content(Some(&no_results_message(query)));
        let hint = dom::create(&self.document, "p", "")?;
        hint.set_text_content(Some("Try different keywords or browse the navigation menu."));
        wrapper.append_child(&heading).map_err(ViewerError::from_js)?;
        wrapper.append_child(&hint).map_err(ViewerError::from_js)?;
        container.append_child(&wrapper).map_err(ViewerError::from_js)?;
        Ok(())
    }

    /// Dropdown item or results card for `entry`, with its click handler
    fn result_item(self: &Rc<Self>, entry: &NavigationEntry, class: &str) -> Result<(Element, Listener), ViewerError> {
        let item = dom::create(&self.document, "div", class)?;
        let card = class == "search-result-card";

        let title = if card {
            dom::create(&self.document, "h3", "")?
        } else {
            dom::create(&self.document, "div", "search-result-title")?
        };
        title.set_text_content(Some(&entry.title));
        item.append_child(&title).map_err(ViewerError::from_js)?;

        let path = dom::create(&self.document, "div", if card { "path" } else { "search-result-path" })?;
        path.set_text_content(Some(&entry.path));
        item.append_child(&path).map_err(ViewerError::from_js)?;

        if card {
            let excerpt = dom::create(&self.document, "div", "excerpt")?;
            excerpt.set_text_content(Some(&entry.excerpt));
            item.append_child(&excerpt).map_err(ViewerError::from_js)?;
            if let Some(html) = item.dyn_ref::<HtmlElement>() {
                let _ = html.style().set_property("cursor", "pointer");
            }
        }

        let weak = Rc::downgrade(self);
        let url = entry.url.clone();
        let listener = Listener::new(&item, "click", move |_event| {
            if let Some(shared) = weak.upgrade() {
                shared.open_result(&url);
            }
        })?;
        Ok((item, listener))
    }

    /// Leave search mode and load the chosen page
    fn open_result(self: &Rc<Self>, url: &str) {
        if let Some(page) = self.element_by_id(&self.config.search_page_id) {
            dom::set_visible(&page, false);
        }
        self.hide_dropdown();
        dom::set_visible(&self.content, true);
        if let Some(input) = self.search_input() {
            input.set_value("");
        }

        let shared = Rc::clone(self);
        let url = url.to_string();
        spawn_local(async move {
            shared.load_page(&url, None, true).await;
        });
    }
}
