pub mod controller;
pub mod state;

pub use controller::{enclosing_toggles, open_sections_in, section_labels};
pub use state::{SidebarSnapshot, SidebarState};
