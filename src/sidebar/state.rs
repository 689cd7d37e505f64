//! SidebarState: which guide sections are open
//!
//! Sections are keyed by their toggle label, not by element identity. The
//! sidebar is rebuilt from the shell fragment on every guide navigation, so
//! no element survives long enough to be a key.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Immutable copy of the open set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidebarSnapshot {
    open: BTreeSet<String>,
}

impl SidebarSnapshot {
    pub fn is_open(&self, label: &str) -> bool {
        self.open.contains(label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.open.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for SidebarSnapshot {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            open: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Open sections for the page session
#[derive(Debug, Clone, Default)]
pub struct SidebarState {
    open: BTreeSet<String>,
}

impl SidebarState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the open set with `snapshot` (overwrite, not merge)
    pub fn save(&mut self, snapshot: SidebarSnapshot) {
        self.open = snapshot.open;
    }

    pub fn snapshot(&self) -> SidebarSnapshot {
        SidebarSnapshot {
            open: self.open.clone(),
        }
    }

    /// For each label present in a rebuilt sidebar, whether it should be open
    pub fn restore<'a, I>(&self, labels: I) -> Vec<(&'a str, bool)>
    where
        I: IntoIterator<Item = &'a str>,
    {
        labels
            .into_iter()
            .map(|label| (label, self.open.contains(label)))
            .collect()
    }

    pub fn set_open(&mut self, label: &str, open: bool) {
        if open {
            self.open.insert(label.to_string());
        } else {
            self.open.remove(label);
        }
    }
}
