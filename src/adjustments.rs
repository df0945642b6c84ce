use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn default_global() -> f64 {
    1.0
}

/// Time-boxed multiplicative corrections to staffing volume.
/// Factors are 0-1 multipliers; 1.0 means no reduction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentPeriod {
    pub month_start: u32,
    pub month_end: u32,
    /// TOW id -> efficiency factor for effort allocated to that TOW.
    #[serde(default)]
    pub by_tow: BTreeMap<String, f64>,
    /// Tender profile id -> volume factor for that profile's staffing.
    #[serde(default)]
    pub by_profile: BTreeMap<String, f64>,
}

impl AdjustmentPeriod {
    pub fn new(month_start: u32, month_end: u32) -> Self {
        Self {
            month_start,
            month_end,
            by_tow: BTreeMap::new(),
            by_profile: BTreeMap::new(),
        }
    }

    pub fn with_tow_factor(mut self, tow_id: impl Into<String>, factor: f64) -> Self {
        self.by_tow.insert(tow_id.into(), factor);
        self
    }

    pub fn with_profile_factor(mut self, profile_id: impl Into<String>, factor: f64) -> Self {
        self.by_profile.insert(profile_id.into(), factor);
        self
    }

    pub fn contains(&self, month: u32) -> bool {
        month >= self.month_start && month <= self.month_end
    }
}

/// All volume corrections of a plan: a global scaling factor (used by
/// scenario analysis) plus time-boxed per-TOW / per-profile factors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeAdjustments {
    /// Uniform multiplier on every profile factor. Default 1.0.
    #[serde(default = "default_global")]
    pub global: f64,
    #[serde(default)]
    pub periods: Vec<AdjustmentPeriod>,
}

impl Default for VolumeAdjustments {
    fn default() -> Self {
        Self {
            global: 1.0,
            periods: Vec::new(),
        }
    }
}

impl VolumeAdjustments {
    pub fn period_at(&self, month: u32) -> Option<&AdjustmentPeriod> {
        self.periods.iter().find(|p| p.contains(month))
    }

    /// Volume factor for a tender profile at a month, including the global
    /// factor. Profiles without an entry default to 1.0.
    pub fn profile_factor_at(&self, profile_id: &str, month: u32) -> f64 {
        let period_factor = self
            .period_at(month)
            .and_then(|p| p.by_profile.get(profile_id).copied())
            .unwrap_or(1.0);
        period_factor * self.global
    }

    /// Effective TOW factor for a member at a month: the percentage-weighted
    /// average of the factors of the TOWs the member is allocated to,
    /// normalized over the allocated share. Unallocated members get 1.0.
    pub fn tow_factor_at(&self, allocation: &BTreeMap<String, f64>, month: u32) -> f64 {
        let period = self.period_at(month);
        let mut factor_sum = 0.0;
        let mut allocated = 0.0;
        for (tow_id, pct) in allocation {
            let pct = pct.max(0.0);
            if pct <= 0.0 {
                continue;
            }
            let factor = period
                .and_then(|p| p.by_tow.get(tow_id).copied())
                .unwrap_or(1.0);
            factor_sum += (pct / 100.0) * factor;
            allocated += pct / 100.0;
        }
        if allocated > 0.0 {
            factor_sum / allocated
        } else {
            1.0
        }
    }
}
