//! Tier lists for the duration selector
//!
//! `data-tiers='[{"tier":"LV","sec":75},{"tier":"MV","sec":60}]'`

use serde::{Deserialize, Serialize};

use crate::error::ViewerError;

/// One selectable option and the duration it displays
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    pub tier: String,
    pub sec: u64,
}

/// Ordered tiers; the first one is the default selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TierConfig {
    tiers: Vec<Tier>,
}

impl TierConfig {
    pub fn parse(raw: &str) -> Result<Self, ViewerError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    pub fn default_tier(&self) -> Option<&Tier> {
        self.tiers.first()
    }

    /// Duration text for the option at `index`; labels may repeat
    pub fn duration_at(&self, index: usize) -> Option<String> {
        self.tiers.get(index).map(|t| t.sec.to_string())
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }
}
