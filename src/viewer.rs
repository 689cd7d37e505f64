//! Viewer: shared page-session state, mount, top nav and popstate wiring
//!
//! One [`Viewer`] per page load. Event handlers hold a `Weak` to the shared
//! state and spawn the async load on the UI thread; nothing here is `Send`.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, PopStateEvent};

use crate::config::ViewerConfig;
use crate::dom::{self, Listener};
use crate::error::ViewerError;
use crate::fetch::{FragmentSource, HttpFragments};
use crate::router::{self, BrowserHistory, HistoryBackend, HistoryEntry, Navigator};
use crate::search::NavigationEntry;
use crate::sidebar::SidebarState;
use crate::widget::WidgetRegistry;

// =============================================================================
// Shared state
// =============================================================================

pub(crate) struct Shared<S, H: HistoryBackend> {
    pub(crate) config: ViewerConfig,
    pub(crate) document: Document,
    /// `#content`; persists while its children are replaced
    pub(crate) content: Element,
    pub(crate) source: S,
    pub(crate) navigator: RefCell<Navigator<H>>,
    pub(crate) sidebar: RefCell<SidebarState>,
    pub(crate) widgets: RefCell<WidgetRegistry>,
    /// Toggle and section-link handlers of the current sidebar
    pub(crate) sidebar_listeners: RefCell<Vec<Listener>>,
    /// Link handlers inside the current content fragment
    pub(crate) content_listeners: RefCell<Vec<Listener>>,
    pub(crate) dropdown_listeners: RefCell<Vec<Listener>>,
    pub(crate) results_listeners: RefCell<Vec<Listener>>,
    /// Top nav, popstate, search inputs: bound once per mount
    pub(crate) persistent: RefCell<Vec<Listener>>,
}

impl<S, H> Shared<S, H>
where
    S: FragmentSource + 'static,
    H: HistoryBackend + 'static,
{
    /// Re-derive every binding that lives inside swapped content
    pub(crate) fn after_swap(self: &Rc<Self>) {
        self.bind_sidebar();
        self.init_widgets();
        self.bind_content_links();
    }

    pub(crate) fn init_widgets(&self) -> usize {
        self.widgets.borrow_mut().init_all(&self.document, &self.config)
    }

    fn topnav_links(&self) -> Vec<Element> {
        dom::query_all(&self.document, &format!("{} a", self.config.topnav_selector))
    }

    /// Clear `active` on the top nav; mark `link`, or the link for `page`
    pub(crate) fn mark_topnav_active(&self, link: Option<&Element>, page: &str) {
        let links = self.topnav_links();
        for a in &links {
            dom::remove_class(a, &self.config.active_class);
        }
        let target = link.cloned().or_else(|| {
            links
                .into_iter()
                .find(|a| a.get_attribute(&self.config.page_attribute).as_deref() == Some(page))
        });
        if let Some(target) = target {
            dom::add_class(&target, &self.config.active_class);
        }
    }

    fn wire_topnav(self: &Rc<Self>) -> Result<(), ViewerError> {
        let mut listeners = Vec::new();
        for link in self.topnav_links() {
            let Some(page) = link.get_attribute(&self.config.page_attribute) else {
                continue;
            };
            let weak = Rc::downgrade(self);
            let target = link.clone();
            listeners.push(Listener::new(&link, "click", move |event| {
                event.prevent_default();
                let Some(shared) = weak.upgrade() else {
                    return;
                };
                let page = page.clone();
                let link = target.clone();
                spawn_local(async move {
                    shared.load_page(&page, Some(link), true).await;
                });
            })?);
        }
        self.persistent.borrow_mut().extend(listeners);
        Ok(())
    }

    fn wire_popstate(self: &Rc<Self>) -> Result<(), ViewerError> {
        let window = web_sys::window().ok_or_else(|| ViewerError::MissingTarget("window".into()))?;
        let weak = Rc::downgrade(self);
        let listener = Listener::new(&window, "popstate", move |event| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let payload = event
                .dyn_ref::<PopStateEvent>()
                .and_then(|e| HistoryEntry::from_js(e.state()));
            spawn_local(async move {
                shared.replay(payload).await;
            });
        })?;
        self.persistent.borrow_mut().push(listener);
        Ok(())
    }

    /// Hash route, a top-nav `href` match, or the default page
    fn initial_route(&self) -> (String, Option<Element>) {
        let hash = self.navigator.borrow().history().current_hash();
        if router::is_page_hash(&hash, &self.config) {
            let page = router::route_from_hash(&hash, &self.config);
            return (page, None);
        }
        if !hash.is_empty() && hash != "#" {
            let matched = self
                .topnav_links()
                .into_iter()
                .find(|a| a.get_attribute("href").as_deref() == Some(hash.as_str()));
            if let Some(link) = matched {
                if let Some(page) = link.get_attribute(&self.config.page_attribute) {
                    return (page, Some(link));
                }
            }
        }
        (self.config.default_page.clone(), None)
    }
}

// =============================================================================
// Viewer
// =============================================================================

/// Handle to a mounted viewer; cheap to clone
pub struct Viewer<S, H>
where
    S: FragmentSource + 'static,
    H: HistoryBackend + 'static,
{
    shared: Rc<Shared<S, H>>,
}

impl<S, H> Clone for Viewer<S, H>
where
    S: FragmentSource + 'static,
    H: HistoryBackend + 'static,
{
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<S, H> Viewer<S, H>
where
    S: FragmentSource + 'static,
    H: HistoryBackend + 'static,
{
    /// Bind to `document` without wiring any events
    pub fn new(document: Document, config: ViewerConfig, source: S, history: H) -> Result<Self, ViewerError> {
        let content = dom::query(&document, &config.content_selector)
            .ok_or_else(|| ViewerError::MissingTarget(config.content_selector.clone()))?;
        let navigator = Navigator::new(history, config.clone());
        Ok(Self {
            shared: Rc::new(Shared {
                config,
                document,
                content,
                source,
                navigator: RefCell::new(navigator),
                sidebar: RefCell::new(SidebarState::new()),
                widgets: RefCell::new(WidgetRegistry::new()),
                sidebar_listeners: RefCell::new(Vec::new()),
                content_listeners: RefCell::new(Vec::new()),
                dropdown_listeners: RefCell::new(Vec::new()),
                results_listeners: RefCell::new(Vec::new()),
                persistent: RefCell::new(Vec::new()),
            }),
        })
    }

    /// Wire top nav, history and search, bind the static page, load the initial route
    pub fn mount(document: Document, config: ViewerConfig, source: S, history: H) -> Result<Self, ViewerError> {
        let viewer = Self::new(document, config, source, history)?;
        let shared = &viewer.shared;

        shared.wire_topnav()?;
        shared.wire_popstate()?;
        shared.bind_search()?;
        shared.after_swap();

        if shared.config.load_initial_route {
            let (page, link) = shared.initial_route();
            console_log!("[Router] Initial route {}", page);
            let shared = Rc::clone(shared);
            spawn_local(async move {
                shared.load_page(&page, link, false).await;
            });
        }
        Ok(viewer)
    }

    pub async fn load_page(&self, page: &str, link: Option<Element>, record: bool) {
        self.shared.load_page(page, link, record).await;
    }

    /// User navigation: load and record a history entry
    pub async fn navigate(&self, page: &str) {
        self.shared.load_page(page, None, true).await;
    }

    /// Back/forward with the popstate payload; never records
    pub async fn pop_state(&self, payload: Option<HistoryEntry>) {
        self.shared.replay(payload).await;
    }

    pub fn current_route(&self) -> String {
        self.shared.navigator.borrow().current_route()
    }

    pub fn current_page(&self) -> Option<String> {
        self.shared.navigator.borrow().current_page().map(str::to_string)
    }

    /// Access the history backend, e.g. to step a `MemoryHistory` back
    pub fn with_history<R>(&self, f: impl FnOnce(&mut H) -> R) -> R {
        f(self.shared.navigator.borrow_mut().history_mut())
    }

    pub fn search(&self, query: &str) -> Vec<NavigationEntry> {
        self.shared.search(query)
    }

    /// Render the full search page for `query`
    pub fn show_search_page(&self, query: &str) {
        self.shared.show_search_page(query);
    }

    pub fn open_sections(&self) -> Vec<String> {
        self.shared
            .sidebar
            .borrow()
            .snapshot()
            .labels()
            .map(str::to_string)
            .collect()
    }

    pub fn init_widgets(&self) -> usize {
        self.shared.init_widgets()
    }

    /// Rebind sidebar, widgets and content links against the current DOM
    pub fn rebind(&self) {
        self.shared.after_swap();
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.shared.config
    }
}

// =============================================================================
// WASM facade
// =============================================================================

/// Browser entry point: real fetch, real history
#[wasm_bindgen]
pub struct DocViewer {
    inner: Viewer<HttpFragments, BrowserHistory>,
}

#[wasm_bindgen]
impl DocViewer {
    /// Mount on the current document. `config` may be `undefined`.
    #[wasm_bindgen]
    pub fn mount(config: JsValue) -> Result<DocViewer, JsValue> {
        let config = ViewerConfig::from_js(config)?;
        let document = dom::document()?;
        let inner = Viewer::mount(document, config, HttpFragments, BrowserHistory)?;
        console_log!("[Viewer] Mounted ({})", crate::version());
        Ok(DocViewer { inner })
    }

    #[wasm_bindgen]
    pub fn navigate(&self, page: String) {
        let viewer = self.inner.clone();
        spawn_local(async move {
            viewer.navigate(&page).await;
        });
    }

    #[wasm_bindgen(js_name = currentRoute)]
    pub fn current_route(&self) -> String {
        self.inner.current_route()
    }

    /// Matching entries as `[{title, path, url, excerpt}]`
    #[wasm_bindgen]
    pub fn search(&self, query: &str) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.search(query))
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(js_name = openSections)]
    pub fn open_sections(&self) -> Vec<String> {
        self.inner.open_sections()
    }

    #[wasm_bindgen(js_name = initWidgets)]
    pub fn init_widgets(&self) -> usize {
        self.inner.init_widgets()
    }
}
