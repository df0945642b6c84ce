use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A team member line in the bid: one tender profile staffed at a fractional
/// headcount, optionally split across types of work by percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    /// Tender-side profile identifier; rate mapping periods are keyed on this.
    pub profile_id: String,
    /// Display label for reports. Falls back to the profile id when empty.
    #[serde(default)]
    pub label: String,
    /// Full-time-equivalent quantity. Fractional values are allowed.
    pub fte: f64,
    /// TOW id -> allocation percentage (0-100). The sum may be below 100;
    /// the remainder is treated as unallocated.
    #[serde(default)]
    pub tow_allocation: BTreeMap<String, f64>,
}

impl TeamMember {
    pub fn new(profile_id: impl Into<String>, fte: f64) -> Self {
        let profile_id = profile_id.into();
        Self {
            label: profile_id.clone(),
            profile_id,
            fte,
            tow_allocation: BTreeMap::new(),
        }
    }

    pub fn with_allocation(mut self, tow_id: impl Into<String>, pct: f64) -> Self {
        self.tow_allocation.insert(tow_id.into(), pct);
        self
    }

    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.profile_id
        } else {
            &self.label
        }
    }
}
