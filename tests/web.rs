//! Browser tests for the DOM layer
//!
//! Run with `wasm-pack test --headless --firefox`.

#![cfg(target_arch = "wasm32")]

use std::collections::HashMap;

use starguide::fetch::FragmentFuture;
use starguide::widget::WidgetRegistry;
use starguide::{
    FragmentSource, HistoryEntry, MemoryHistory, StaticFragments, TierConfig, Viewer, ViewerConfig,
};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use wasm_bindgen_test::*;
use web_sys::{Document, Element, Event, HtmlElement, HtmlInputElement, HtmlSelectElement};

wasm_bindgen_test_configure!(run_in_browser);

// ============================================================================
// Fixtures
// ============================================================================

const PAGE_SHELL: &str = r##"
<nav id="topnav">
  <a href="#home" data-page="pages/home.html">Home</a>
  <a href="#guides" data-page="guides/index.html">Guides</a>
</nav>
<input id="search-input">
<div id="search-results"></div>
<div id="content"></div>
<div id="search-page" style="display:none"><div id="search-results-container"></div></div>
"##;

const GUIDE_SHELL: &str = r#"
<div class="guides-layout">
  <aside class="guides-sidebar">
    <ul>
      <li>
        <span class="toggle">Power</span>
        <ul class="submenu">
          <li><a data-page="guides/power/turbine.html">Steam Turbine</a></li>
          <li>
            <span class="toggle">Chemistry</span>
            <ul class="submenu">
              <li><a data-page="guides/power/electrolyzer.html">Electrolyzer</a></li>
            </ul>
          </li>
        </ul>
      </li>
      <li>
        <span class="toggle">Logistics</span>
        <ul class="submenu">
          <li><a data-page="guides/logistics/belts.html">Belts</a></li>
        </ul>
      </li>
    </ul>
  </aside>
  <section class="guides-content"></section>
</div>
"#;

const ELECTROLYZER: &str = r#"
<h2>Electrolyzer</h2>
<p>Runs for <span class="electrolyzer-time">?</span>s at
  <span class="electrolyzer-config" data-tiers='[{"tier":"LV","sec":75},{"tier":"MV","sec":60}]'></span></p>
<a data-page="guides/power/turbine.html">See also</a>
"#;

fn document() -> Document {
    web_sys::window().unwrap().document().unwrap()
}

fn reset_body(html: &str) -> Document {
    let document = document();
    document.body().unwrap().set_inner_html(html);
    document
}

fn source() -> StaticFragments {
    StaticFragments::new()
        .with("pages/home.html", "<h1>Home</h1>")
        .with("pages/about.html", "<h1>About</h1><a data-page=\"pages/home.html\">Back home</a>")
        .with("guides.html", GUIDE_SHELL)
        .with("guides/index.html", "<h2>Guides</h2>")
        .with("guides/power/turbine.html", "<h2>Steam Turbine</h2>")
        .with("guides/power/electrolyzer.html", ELECTROLYZER)
        .with("guides/logistics/belts.html", "<h2>Belts</h2>")
        .with(
            "guides/logistics/trains.html",
            "<h2>Trains</h2><a data-page=\"pages/about.html\">About the site</a>",
        )
}

/// Static fragments, except gated pages wait for their promise to resolve
struct GatedFragments {
    inner: StaticFragments,
    gates: HashMap<String, js_sys::Promise>,
}

impl GatedFragments {
    fn new(inner: StaticFragments) -> Self {
        Self {
            inner,
            gates: HashMap::new(),
        }
    }

    fn with_gate(mut self, page: &str, gate: js_sys::Promise) -> Self {
        self.gates.insert(page.to_string(), gate);
        self
    }
}

impl FragmentSource for GatedFragments {
    fn fetch<'a>(&'a self, page: &'a str) -> FragmentFuture<'a> {
        let gate = self.gates.get(page).cloned();
        Box::pin(async move {
            if let Some(gate) = gate {
                let _ = JsFuture::from(gate).await;
            }
            self.inner.fetch(page).await
        })
    }
}

/// A pending promise and the function that resolves it
fn gate() -> (js_sys::Promise, js_sys::Function) {
    let mut release = None;
    let promise = js_sys::Promise::new(&mut |resolve, _reject| release = Some(resolve));
    (promise, release.unwrap())
}

fn quiet_config() -> ViewerConfig {
    ViewerConfig {
        load_initial_route: false,
        ..ViewerConfig::default()
    }
}

fn mount() -> (Document, Viewer<StaticFragments, MemoryHistory>) {
    mount_with(PAGE_SHELL, source())
}

fn mount_with<S: FragmentSource + 'static>(body: &str, source: S) -> (Document, Viewer<S, MemoryHistory>) {
    let document = reset_body(body);
    let viewer = Viewer::mount(document.clone(), quiet_config(), source, MemoryHistory::new("")).unwrap();
    (document, viewer)
}

/// Let spawned loads run to completion
async fn settle() {
    for _ in 0..8 {
        JsFuture::from(js_sys::Promise::resolve(&JsValue::NULL)).await.unwrap();
    }
}

fn display_of(element: &Element) -> String {
    element
        .dyn_ref::<HtmlElement>()
        .unwrap()
        .style()
        .get_property_value("display")
        .unwrap()
}

fn search_input(document: &Document) -> HtmlInputElement {
    document
        .get_element_by_id("search-input")
        .unwrap()
        .dyn_into()
        .unwrap()
}

fn type_query(document: &Document, text: &str) {
    let input = search_input(document);
    input.set_value(text);
    input.dispatch_event(&Event::new("input").unwrap()).unwrap();
}

fn content(document: &Document) -> Element {
    document.get_element_by_id("content").unwrap()
}

fn select_in(document: &Document) -> HtmlSelectElement {
    document
        .query_selector(".electrolyzer-tier-select")
        .unwrap()
        .unwrap()
        .dyn_into()
        .unwrap()
}

fn section_open(document: &Document, label: &str) -> bool {
    let toggles = document.query_selector_all(".guides-sidebar .toggle").unwrap();
    for i in 0..toggles.length() {
        let toggle: Element = toggles.get(i).unwrap().dyn_into().unwrap();
        if toggle.text_content().unwrap_or_default().trim() == label {
            return toggle.next_element_sibling().unwrap().class_list().contains("open");
        }
    }
    panic!("no toggle labelled {}", label);
}

fn click(element: &Element) {
    element.dyn_ref::<web_sys::HtmlElement>().unwrap().click();
}

// ============================================================================
// Widget Initializer
// ============================================================================

#[wasm_bindgen_test]
fn test_widget_defaults_to_first_tier() {
    let document = reset_body(ELECTROLYZER);
    let mut registry = WidgetRegistry::new();

    assert_eq!(registry.init_all(&document, &ViewerConfig::default()), 1);

    let select = select_in(&document);
    assert_eq!(select.value(), "LV");
    let time = document.query_selector(".electrolyzer-time").unwrap().unwrap();
    assert_eq!(time.text_content().unwrap(), "75");

    select.set_value("MV");
    select.dispatch_event(&Event::new("change").unwrap()).unwrap();
    assert_eq!(time.text_content().unwrap(), "60");
}

#[wasm_bindgen_test]
fn test_widget_init_is_idempotent() {
    let document = reset_body(ELECTROLYZER);
    let mut registry = WidgetRegistry::new();
    let config = ViewerConfig::default();

    assert_eq!(registry.init_all(&document, &config), 1);
    assert_eq!(registry.init_all(&document, &config), 0);

    assert_eq!(document.query_selector_all("select").unwrap().length(), 1);
    assert_eq!(registry.len(), 1);
}

#[wasm_bindgen_test]
fn test_malformed_tiers_skip_only_that_container() {
    let document = reset_body(
        r#"<p><span class="electrolyzer-config" id="bad" data-tiers="not json">old</span></p>
           <p><span class="electrolyzer-time"></span>
              <span class="electrolyzer-config" id="good" data-tiers='[{"tier":"HV","sec":30}]'></span></p>"#,
    );
    let mut registry = WidgetRegistry::new();

    assert_eq!(registry.init_all(&document, &ViewerConfig::default()), 1);

    let bad = document.get_element_by_id("bad").unwrap();
    assert!(!bad.has_attribute("data-initialized"));
    assert!(bad.query_selector("select").unwrap().is_none());

    let good = document.get_element_by_id("good").unwrap();
    assert!(good.has_attribute("data-initialized"));
    assert!(good.query_selector("select").unwrap().is_some());
}

#[wasm_bindgen_test]
fn test_widget_without_display_still_renders() {
    let document = reset_body(r#"<span class="electrolyzer-config" data-tiers='[{"tier":"LV","sec":75}]'></span>"#);
    let mut registry = WidgetRegistry::new();

    assert_eq!(registry.init_all(&document, &ViewerConfig::default()), 1);
    let select = select_in(&document);
    select.dispatch_event(&Event::new("change").unwrap()).unwrap();
    assert_eq!(select.value(), "LV");
}

#[wasm_bindgen_test]
fn test_widget_prefers_display_in_same_paragraph() {
    let document = reset_body(
        r#"<p><span class="electrolyzer-time" id="first"></span></p>
           <p><span class="electrolyzer-time" id="near"></span>
              <span class="electrolyzer-config" data-tiers='[{"tier":"LV","sec":75}]'></span></p>"#,
    );
    let mut registry = WidgetRegistry::new();
    registry.init_all(&document, &ViewerConfig::default());

    assert_eq!(document.get_element_by_id("near").unwrap().text_content().unwrap(), "75");
    assert_eq!(document.get_element_by_id("first").unwrap().text_content().unwrap(), "");
    assert_eq!(TierConfig::parse(r#"[{"tier":"LV","sec":75}]"#).unwrap().len(), 1);
}

#[wasm_bindgen_test]
fn test_widget_duplicate_labels_use_selected_option() {
    let document = reset_body(
        r#"<p><span class="electrolyzer-time"></span>
              <span class="electrolyzer-config" data-tiers='[{"tier":"LV","sec":75},{"tier":"LV","sec":40}]'></span></p>"#,
    );
    let mut registry = WidgetRegistry::new();
    registry.init_all(&document, &ViewerConfig::default());

    let select = select_in(&document);
    select.set_selected_index(1);
    select.dispatch_event(&Event::new("change").unwrap()).unwrap();

    let time = document.query_selector(".electrolyzer-time").unwrap().unwrap();
    assert_eq!(time.text_content().unwrap(), "40");
}

// ============================================================================
// Content Loader
// ============================================================================

#[wasm_bindgen_test]
async fn test_plain_page_replaces_content() {
    let (document, viewer) = mount();
    viewer.navigate("pages/home.html").await;

    assert_eq!(content(&document).inner_html(), "<h1>Home</h1>");
    assert_eq!(viewer.current_page().as_deref(), Some("pages/home.html"));
    assert_eq!(viewer.current_route(), "pages/home.html");
}

#[wasm_bindgen_test]
async fn test_guide_page_composes_two_panes() {
    let (document, viewer) = mount();
    viewer.navigate("guides/power/electrolyzer.html").await;

    let region = content(&document);
    assert_eq!(region.child_element_count(), 1);
    let layout = region.first_element_child().unwrap();
    assert!(layout.class_list().contains("guides-layout"));
    assert!(layout.query_selector(".guides-sidebar").unwrap().is_some());

    let area = layout.query_selector(".guides-content").unwrap().unwrap();
    assert!(area.inner_html().contains("<h2>Electrolyzer</h2>"));

    // Auto-expand: ancestor chain open, link active
    assert!(section_open(&document, "Power"));
    assert!(section_open(&document, "Chemistry"));
    assert!(!section_open(&document, "Logistics"));
    let active = document.query_selector(".guides-sidebar a.active").unwrap().unwrap();
    assert_eq!(active.get_attribute("data-page").unwrap(), "guides/power/electrolyzer.html");

    // Widgets inside the injected guide are live
    assert_eq!(select_in(&document).value(), "LV");
}

#[wasm_bindgen_test]
async fn test_fetch_failure_renders_inline_error() {
    let (document, viewer) = mount();
    viewer.navigate("pages/missing.html").await;

    let text = content(&document).text_content().unwrap();
    assert!(text.starts_with("Error loading page:"), "got {}", text);
    assert!(text.contains("404"));
    // Failed loads never record history
    assert_eq!(viewer.with_history(|h| h.len()), 1);
}

#[wasm_bindgen_test]
async fn test_topnav_active_follows_page() {
    let (document, viewer) = mount();
    viewer.navigate("guides/index.html").await;

    let active = document.query_selector("#topnav a.active").unwrap().unwrap();
    assert_eq!(active.get_attribute("data-page").unwrap(), "guides/index.html");
    assert_eq!(document.query_selector_all("#topnav a.active").unwrap().length(), 1);
}

#[wasm_bindgen_test]
async fn test_shell_without_sidebar_falls_back_to_plain_swap() {
    let (document, viewer) = mount_with(PAGE_SHELL, source().with("guides.html", "<div>no layout here</div>"));
    viewer.navigate("guides/index.html").await;

    assert_eq!(content(&document).inner_html(), "<h2>Guides</h2>");
    assert!(document.query_selector(".guides-layout").unwrap().is_none());
    assert_eq!(viewer.current_page().as_deref(), Some("guides/index.html"));
}

#[wasm_bindgen_test]
async fn test_later_navigation_wins_over_slow_fetch() {
    let (pending, release) = gate();
    let (document, viewer) = mount_with(
        PAGE_SHELL,
        GatedFragments::new(source()).with_gate("pages/about.html", pending),
    );

    let slow = viewer.clone();
    spawn_local(async move {
        slow.navigate("pages/about.html").await;
    });
    settle().await;
    viewer.navigate("pages/home.html").await;

    release.call0(&JsValue::NULL).unwrap();
    settle().await;

    assert_eq!(content(&document).inner_html(), "<h1>Home</h1>");
    assert_eq!(viewer.current_page().as_deref(), Some("pages/home.html"));
    // The stale load neither rendered nor recorded
    assert_eq!(viewer.with_history(|h| h.len()), 2);
}

// ============================================================================
// Router
// ============================================================================

#[wasm_bindgen_test]
async fn test_back_navigation_restores_previous_page() {
    let (document, viewer) = mount();
    viewer.navigate("pages/home.html").await;
    viewer.navigate("pages/about.html").await;
    assert_eq!(viewer.with_history(|h| h.len()), 3);

    let payload = viewer.with_history(|h| h.back()).unwrap();
    assert_eq!(payload, Some(HistoryEntry::new("pages/home.html")));
    viewer.pop_state(payload).await;

    assert_eq!(content(&document).inner_html(), "<h1>Home</h1>");
    assert_eq!(viewer.current_page().as_deref(), Some("pages/home.html"));
    assert_eq!(viewer.with_history(|h| h.len()), 3);
}

// ============================================================================
// Sidebar
// ============================================================================

#[wasm_bindgen_test]
async fn test_sidebar_state_survives_guide_navigation() {
    let (document, viewer) = mount();
    viewer.navigate("guides/power/turbine.html").await;
    assert!(!section_open(&document, "Logistics"));

    // User opens Logistics
    let logistics = document
        .query_selector_all(".guides-sidebar .toggle")
        .unwrap()
        .get(2)
        .unwrap()
        .dyn_into::<Element>()
        .unwrap();
    click(&logistics);
    assert!(section_open(&document, "Logistics"));

    // Full recompose from the shell keeps it open
    viewer.navigate("guides/power/electrolyzer.html").await;
    assert!(section_open(&document, "Logistics"));
    assert!(section_open(&document, "Chemistry"));

    // A plain page in between does not erase the open set
    viewer.navigate("pages/home.html").await;
    viewer.navigate("guides/index.html").await;
    assert!(section_open(&document, "Logistics"));
    assert!(viewer.open_sections().contains(&"Logistics".to_string()));
}

#[wasm_bindgen_test]
async fn test_repeated_binds_do_not_stack_toggle_handlers() {
    let (document, viewer) = mount();
    viewer.navigate("guides/index.html").await;
    viewer.rebind();
    viewer.rebind();

    let power = document.query_selector(".guides-sidebar .toggle").unwrap().unwrap();
    let was_open = section_open(&document, "Power");
    click(&power);
    // A stacked handler would flip it twice
    assert_ne!(section_open(&document, "Power"), was_open);
}

#[wasm_bindgen_test]
async fn test_in_guide_navigation_swaps_content_area_only() {
    let (document, viewer) = mount();
    viewer.navigate("guides/power/electrolyzer.html").await;
    let sidebar_before = document.query_selector(".guides-sidebar").unwrap().unwrap();

    // "See also" inside the guide content routes in place
    let see_also = document
        .query_selector(".guides-content a[data-page]")
        .unwrap()
        .unwrap();
    click(&see_also);
    settle().await;

    let sidebar_after = document.query_selector(".guides-sidebar").unwrap().unwrap();
    assert!(sidebar_before.is_same_node(Some(&sidebar_after)));
    let area = document.query_selector(".guides-content").unwrap().unwrap();
    assert_eq!(area.inner_html(), "<h2>Steam Turbine</h2>");
    assert_eq!(viewer.current_page().as_deref(), Some("guides/power/turbine.html"));
}

#[wasm_bindgen_test]
async fn test_link_to_plain_page_inside_guide_leaves_guide_layout() {
    let (document, viewer) = mount();
    viewer.navigate("guides/logistics/trains.html").await;

    let about = document
        .query_selector(".guides-content a[data-page]")
        .unwrap()
        .unwrap();
    click(&about);
    settle().await;

    assert!(content(&document).inner_html().starts_with("<h1>About</h1>"));
    assert!(document.query_selector(".guides-sidebar").unwrap().is_none());
    assert_eq!(viewer.current_page().as_deref(), Some("pages/about.html"));

    // Back then forward renders the entry the same way
    viewer.with_history(|h| h.back()).unwrap();
    let payload = viewer.with_history(|h| h.forward()).unwrap();
    viewer.pop_state(payload).await;
    assert!(content(&document).inner_html().starts_with("<h1>About</h1>"));
    assert!(document.query_selector(".guides-sidebar").unwrap().is_none());
}

#[wasm_bindgen_test]
async fn test_section_link_without_content_area_does_full_load() {
    let body = format!(
        r#"{}<aside class="guides-sidebar">
             <span class="toggle">Logistics</span>
             <ul class="submenu"><li><a id="belts" data-page="guides/logistics/belts.html">Belts</a></li></ul>
           </aside>"#,
        PAGE_SHELL
    );
    let (document, viewer) = mount_with(&body, source());
    assert!(document.query_selector(".guides-content").unwrap().is_none());

    click(&document.get_element_by_id("belts").unwrap());
    settle().await;

    let area = document.query_selector("#content .guides-content").unwrap().unwrap();
    assert_eq!(area.inner_html(), "<h2>Belts</h2>");
    assert_eq!(viewer.current_page().as_deref(), Some("guides/logistics/belts.html"));
    assert_eq!(viewer.with_history(|h| h.len()), 2);
}

// ============================================================================
// Search
// ============================================================================

#[wasm_bindgen_test]
async fn test_search_indexes_topnav_and_sidebar() {
    let (_document, viewer) = mount();
    viewer.navigate("guides/index.html").await;

    assert!(viewer.search("").is_empty());

    let results = viewer.search("electro");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].path, "Power > Chemistry");
    assert_eq!(results[0].url, "guides/power/electrolyzer.html");

    let home = viewer.search("home");
    assert_eq!(home[0].path, "Main Navigation");
}

#[wasm_bindgen_test]
fn test_search_page_no_results_message() {
    let (document, viewer) = mount();
    viewer.show_search_page("quantum flux");

    let container = document.get_element_by_id("search-results-container").unwrap();
    let heading = container.query_selector(".no-results h3").unwrap().unwrap();
    assert_eq!(heading.text_content().unwrap(), "No results found for \"quantum flux\"");
}

#[wasm_bindgen_test]
fn test_dropdown_caps_suggestions_and_needs_two_chars() {
    let catalog: String = (1..=7)
        .map(|i| format!(r#"<a data-page="pages/part{}.html">Part {}</a>"#, i, i))
        .collect();
    let (document, _viewer) = mount_with(&format!("{}{}", PAGE_SHELL, catalog), source());
    let results = document.get_element_by_id("search-results").unwrap();

    type_query(&document, "part");
    assert_eq!(results.query_selector_all(".search-result-item").unwrap().length(), 5);
    assert_eq!(display_of(&results), "block");

    type_query(&document, "p");
    assert_eq!(results.child_element_count(), 0);
    assert_eq!(display_of(&results), "none");
}

#[wasm_bindgen_test]
fn test_click_outside_hides_dropdown() {
    let (document, _viewer) = mount();
    let results = document.get_element_by_id("search-results").unwrap();

    type_query(&document, "home");
    assert_eq!(display_of(&results), "block");

    click(&search_input(&document));
    assert_eq!(display_of(&results), "block");

    click(&content(&document));
    assert_eq!(display_of(&results), "none");
}

#[wasm_bindgen_test]
async fn test_opening_search_result_leaves_search_mode() {
    let (document, viewer) = mount();
    viewer.navigate("guides/index.html").await;

    search_input(&document).set_value("steam");
    viewer.show_search_page("steam");
    assert_eq!(display_of(&content(&document)), "none");

    let card = document.query_selector(".search-result-card").unwrap().unwrap();
    click(&card);
    settle().await;

    assert_eq!(search_input(&document).value(), "");
    assert_eq!(display_of(&content(&document)), "block");
    let search_page = document.get_element_by_id("search-page").unwrap();
    assert_eq!(display_of(&search_page), "none");
    assert_eq!(viewer.current_page().as_deref(), Some("guides/power/turbine.html"));
    assert_eq!(viewer.with_history(|h| h.len()), 3);
}
