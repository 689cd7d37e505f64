//! Search index over navigation links
//!
//! Rebuilt from the live DOM on every query; nothing is cached.

use serde::{Deserialize, Serialize};

/// Where a link sits in the page, which decides its breadcrumb path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkPlacement {
    TopNav,
    /// Ancestor section labels, outermost first
    Sidebar(Vec<String>),
    Elsewhere,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationEntry {
    pub title: String,
    pub path: String,
    pub url: String,
    pub excerpt: String,
}

impl NavigationEntry {
    pub fn new(title: &str, path: &str, url: &str) -> Self {
        let excerpt = if path.is_empty() {
            format!("Navigate to {}", title)
        } else {
            format!("Navigate to {} in {}", title, path)
        };
        Self {
            title: title.to_string(),
            path: path.to_string(),
            url: url.to_string(),
            excerpt,
        }
    }

    fn matches(&self, lower_query: &str) -> bool {
        self.title.to_lowercase().contains(lower_query)
            || self.path.to_lowercase().contains(lower_query)
    }
}

/// Breadcrumb text for a link placement
pub fn placement_path(placement: &LinkPlacement, topnav_label: &str) -> String {
    match placement {
        LinkPlacement::TopNav => topnav_label.to_string(),
        LinkPlacement::Sidebar(labels) => labels.join(" > "),
        LinkPlacement::Elsewhere => String::new(),
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    entries: Vec<NavigationEntry>,
}

impl SearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a link; links without a title or page are not indexed
    pub fn add_link(&mut self, title: &str, placement: &LinkPlacement, url: &str, topnav_label: &str) {
        let title = title.trim();
        if title.is_empty() || url.is_empty() {
            return;
        }
        let path = placement_path(placement, topnav_label);
        self.entries.push(NavigationEntry::new(title, &path, url));
    }

    pub fn entries(&self) -> &[NavigationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case-insensitive substring match on title or path; blank queries match nothing
    pub fn query(&self, text: &str) -> Vec<&NavigationEntry> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        let lower = text.to_lowercase();
        self.entries.iter().filter(|e| e.matches(&lower)).collect()
    }

    /// At most `limit` matches, for the dropdown
    pub fn suggest(&self, text: &str, limit: usize) -> Vec<&NavigationEntry> {
        let mut results = self.query(text);
        results.truncate(limit);
        results
    }
}

/// Whether the dropdown should open for `text`
pub fn should_suggest(text: &str, min_chars: usize) -> bool {
    text.chars().count() >= min_chars
}

/// Heading shown on the search page when nothing matched
pub fn no_results_message(query: &str) -> String {
    format!("No results found for \"{}\"", query)
}
