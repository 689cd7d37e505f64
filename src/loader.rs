//! Content Loader: fetch a fragment and swap it into `#content`
//!
//! Plain pages replace the region wholesale. Guide pages are composed into a
//! two-pane layout: the sidebar comes from the shell fragment, the page goes
//! into a fresh content area next to it. The region is only touched once the
//! fetches resolved and the ticket is still current, so it always ends up
//! either fully rendered or showing an error message.

use std::rc::Rc;

use instant::Instant;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::Element;

use crate::dom::{self, Listener};
use crate::error::ViewerError;
use crate::fetch::FragmentSource;
use crate::router::{HistoryBackend, HistoryEntry, NavigationTicket};
use crate::viewer::Shared;

/// What came back for a navigation
enum Fetched {
    Plain(String),
    Guide { page: String, shell: String },
}

impl<S, H> Shared<S, H>
where
    S: FragmentSource + 'static,
    H: HistoryBackend + 'static,
{
    pub(crate) async fn load_page(self: &Rc<Self>, page: &str, link: Option<Element>, record: bool) {
        let ticket = self.navigator.borrow_mut().begin(page, record);
        self.run_load(ticket, link).await;
    }

    pub(crate) async fn replay(self: &Rc<Self>, payload: Option<HistoryEntry>) {
        let ticket = self.navigator.borrow_mut().pop_state(payload);
        console_log!("[Router] History replay {}", ticket.page);
        self.run_load(ticket, None).await;
    }

    async fn fetch_for(&self, page: &str) -> Result<Fetched, ViewerError> {
        let html = self.source.fetch(page).await?;
        if !self.config.is_guide_page(page) {
            return Ok(Fetched::Plain(html));
        }
        let shell = self.source.fetch(&self.config.guide_shell).await?;
        Ok(Fetched::Guide { page: html, shell })
    }

    async fn run_load(self: &Rc<Self>, ticket: NavigationTicket, link: Option<Element>) {
        let started = Instant::now();
        let fetched = self.fetch_for(&ticket.page).await;

        if !self.navigator.borrow().is_current(&ticket) {
            console_log!("[Loader] Discarded stale load of {}", ticket.page);
            return;
        }

        let fetched = match fetched {
            Ok(fetched) => fetched,
            Err(e) => {
                console_error!("[Loader] {}", e);
                self.render_error(&self.content, "Error loading page", &e);
                self.after_swap();
                return;
            }
        };

        self.mark_topnav_active(link.as_ref(), &ticket.page);
        if let Err(e) = self.navigator.borrow_mut().commit(&ticket) {
            console_warn!("[Router] Could not record {}: {}", ticket.page, e);
        }

        let guide = match fetched {
            Fetched::Plain(html) => {
                self.content.set_inner_html(&html);
                false
            }
            Fetched::Guide { page, shell } => match self.compose_guide(&page, &shell) {
                Ok(()) => true,
                Err(e) => {
                    console_warn!("[Loader] {}; rendering {} without sidebar", e, ticket.page);
                    self.content.set_inner_html(&page);
                    false
                }
            },
        };

        self.after_swap();
        if guide {
            self.reveal(&ticket.page);
        }
        dom::scroll_to_top();

        console_log!(
            "[Loader] Loaded {} in {:.1}ms",
            ticket.page,
            started.elapsed().as_secs_f64() * 1000.0
        );
    }

    /// Build sidebar + content layout and make it the region's only child
    fn compose_guide(&self, page_html: &str, shell_html: &str) -> Result<(), ViewerError> {
        let scratch = dom::create(&self.document, "div", "")?;
        scratch.set_inner_html(shell_html);

        let sidebar = dom::query_in(&scratch, &self.config.sidebar_selector)
            .ok_or_else(|| ViewerError::MissingTarget(self.config.sidebar_selector.clone()))?;
        let placeholder = dom::query_in(&scratch, &self.config.guide_content_selector)
            .ok_or_else(|| ViewerError::MissingTarget(self.config.guide_content_selector.clone()))?;

        // Snapshot from the sidebar about to be discarded
        self.capture_sidebar_state();

        let layout = dom::create(&self.document, "div", &self.config.layout_class)?;
        let sidebar = sidebar.clone_node_with_deep(true).map_err(ViewerError::from_js)?;
        layout.append_child(&sidebar).map_err(ViewerError::from_js)?;

        let area = placeholder.clone_node().map_err(ViewerError::from_js)?;
        let area = area
            .dyn_into::<Element>()
            .map_err(|_| ViewerError::Dom("content area is not an element".into()))?;
        area.set_inner_html(page_html);
        layout.append_child(&area).map_err(ViewerError::from_js)?;

        self.content.replace_children_with_node_1(&layout);
        self.restore_sidebar_state();
        Ok(())
    }

    /// Replace `target`'s children with a one-line error paragraph
    pub(crate) fn render_error(&self, target: &Element, prefix: &str, error: &ViewerError) {
        match dom::create(&self.document, "p", "") {
            Ok(p) => {
                p.set_text_content(Some(&format!("{}: {}", prefix, error.user_message())));
                target.replace_children_with_node_1(&p);
            }
            Err(_) => target.set_text_content(Some(&format!("{}: {}", prefix, error.user_message()))),
        }
    }

    /// Route clicks on links inside freshly injected content
    pub(crate) fn bind_content_links(self: &Rc<Self>) {
        let config = &self.config;
        let mut listeners = Vec::new();

        for link in dom::query_all_in(&self.content, &config.link_selector()) {
            if dom::is_within(&link, &config.sidebar_selector) || dom::is_within(&link, &config.topnav_selector) {
                continue;
            }
            let Some(page) = link.get_attribute(&config.page_attribute) else {
                continue;
            };
            let in_guide = dom::is_within(&link, &config.guide_content_selector);
            let weak = Rc::downgrade(self);

            let listener = Listener::new(&link, "click", move |event| {
                event.prevent_default();
                let Some(shared) = weak.upgrade() else {
                    return;
                };
                let page = page.clone();
                spawn_local(async move {
                    if in_guide {
                        shared.navigate_in_guide(&page).await;
                    } else {
                        shared.load_page(&page, None, true).await;
                    }
                });
            });
            match listener {
                Ok(listener) => listeners.push(listener),
                Err(e) => console_warn!("[Loader] Could not bind link: {}", e),
            }
        }

        *self.content_listeners.borrow_mut() = listeners;
    }
}
