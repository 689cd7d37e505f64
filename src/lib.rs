//! StarGuide: Single-Page Documentation Viewer
//!
//! A Rust/WASM implementation of the Star Technology Guide navigation core.
//! Static HTML fragments are fetched and swapped into `#content`, guide pages
//! are composed into a two-pane sidebar layout, and the URL hash tracks the
//! current page.
//!
//! # Architecture
//!
//! ## Pure core (native tests)
//! - `router.rs` - Hash <-> page mapping, history backends, navigation generations
//! - `sidebar/state.rs` - Open-section set, snapshot/restore by label
//! - `widget/tiers.rs` - Tier list parsing and selection
//! - `search/index.rs` - Navigation entries and substring query
//! - `config.rs` - Selectors, route prefixes, limits
//!
//! ## DOM layer (browser tests)
//! - `loader.rs` - Fragment fetch, plain swap, two-pane compose
//! - `sidebar/controller.rs` - Toggle binding, in-place guide navigation
//! - `widget/mod.rs` - Tier selector initialization
//! - `search/view.rs` - Dropdown and search page
//! - `viewer.rs` - Mount, top nav, popstate, `DocViewer` facade
//!
//! # Usage (WASM)
//! ```javascript,ignore
//! import init, { DocViewer } from 'starguide';
//!
//! await init();
//!
//! // Defaults match the page markup; override any selector or path.
//! const viewer = DocViewer.mount({ defaultPage: 'pages/home.html' });
//!
//! viewer.navigate('guides/power/electrolyzer.html');
//! console.log(viewer.currentRoute());
//! console.log(viewer.search('electro'));
//! ```

#[macro_use]
mod console;

pub mod config;
pub mod dom;
pub mod error;
pub mod fetch;
pub mod loader;
pub mod router;
pub mod search;
pub mod sidebar;
pub mod viewer;
pub mod widget;

pub use config::ViewerConfig;
pub use error::ViewerError;
pub use fetch::{FragmentSource, HttpFragments, StaticFragments};
pub use router::{BrowserHistory, HistoryBackend, HistoryEntry, MemoryHistory, Navigator};
pub use search::{NavigationEntry, SearchIndex};
pub use sidebar::{SidebarSnapshot, SidebarState};
pub use viewer::{DocViewer, Viewer};
pub use widget::{Tier, TierConfig};

use wasm_bindgen::prelude::*;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator for smaller WASM bundle size.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    format!("starguide v{}", env!("CARGO_PKG_VERSION"))
}
