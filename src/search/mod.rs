pub mod index;
pub mod view;

pub use index::{no_results_message, should_suggest, LinkPlacement, NavigationEntry, SearchIndex};
pub use view::build_index;
