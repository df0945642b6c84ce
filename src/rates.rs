use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Bucket key used when a tender profile has no rate mapping for a month.
pub const UNMAPPED_PROFILE: &str = "__unmapped__";

/// One entry of a resource-profile mix: a delivery profile and its share.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixEntry {
    /// Delivery-profile key, conventionally `"practice:profile"`.
    pub profile: String,
    /// Share of the mix, 0-100.
    pub pct: f64,
}

impl MixEntry {
    pub fn new(profile: impl Into<String>, pct: f64) -> Self {
        Self {
            profile: profile.into(),
            pct,
        }
    }
}

/// Maps a tender profile to a delivery-profile mix for a month range.
/// Periods for one profile are expected to be non-overlapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateMappingPeriod {
    pub month_start: u32,
    pub month_end: u32,
    /// Delivery profiles billing for this tender profile, percentages
    /// summing to 100.
    pub mix: Vec<MixEntry>,
}

impl RateMappingPeriod {
    pub fn new(month_start: u32, month_end: u32, mix: Vec<MixEntry>) -> Self {
        Self {
            month_start,
            month_end,
            mix,
        }
    }

    pub fn contains(&self, month: u32) -> bool {
        month >= self.month_start && month <= self.month_end
    }
}

/// Tender profile id -> ordered mapping periods.
pub type ProfileMappings = BTreeMap<String, Vec<RateMappingPeriod>>;

/// A delivery-side catalog entry: practice, profile and daily rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceProfile {
    pub practice: String,
    pub profile: String,
    pub daily_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seniority: Option<String>,
}

/// Lookup table of delivery profiles and their daily rates. Owned by the
/// practice catalog; the engine only reads it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateCard {
    entries: HashMap<String, ResourceProfile>,
}

impl RateCard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, entry: ResourceProfile) {
        self.entries.insert(key.into(), entry);
    }

    pub fn with_rate(mut self, key: impl Into<String>, daily_rate: f64) -> Self {
        let key = key.into();
        let (practice, profile) = match key.split_once(':') {
            Some((practice, profile)) => (practice.to_string(), profile.to_string()),
            None => (String::new(), key.clone()),
        };
        self.entries.insert(
            key,
            ResourceProfile {
                practice,
                profile,
                daily_rate,
                seniority: None,
            },
        );
        self
    }

    pub fn get(&self, key: &str) -> Option<&ResourceProfile> {
        self.entries.get(key)
    }

    pub fn rate(&self, key: &str) -> Option<f64> {
        self.entries.get(key).map(|e| e.daily_rate)
    }

    /// Rate lookup with a fallback for unknown profiles.
    pub fn rate_or(&self, key: &str, default: f64) -> f64 {
        self.rate(key).unwrap_or(default)
    }

    /// Display label for a delivery profile key. Unknown keys fall back to
    /// the text after the practice prefix.
    pub fn label(&self, key: &str) -> String {
        match self.entries.get(key) {
            Some(entry) => entry.profile.clone(),
            None => match key.split_once(':') {
                Some((_, profile)) => profile.to_string(),
                None => key.to_string(),
            },
        }
    }

    pub fn practice(&self, key: &str) -> String {
        match self.entries.get(key) {
            Some(entry) => entry.practice.clone(),
            None => key.split_once(':').map(|(p, _)| p).unwrap_or("").to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Inflation escalation factor for a contract month. Escalation compounds
/// once per 12-month block from contract start, not per calendar year.
/// Rounded to 8 decimals so escalated figures stay stable across runs.
pub fn inflation_factor_at(inflation_pct: f64, month: u32) -> f64 {
    if inflation_pct <= 0.0 {
        return 1.0;
    }
    let year_index = (month.saturating_sub(1)) / 12;
    let factor = (1.0 + inflation_pct / 100.0).powi(year_index as i32);
    (factor * 1e8).round() / 1e8
}

/// Percentage-weighted average rate of a mix, normalized by the mix's own
/// percentage sum. A zero percentage sum (or empty mix) yields the default.
pub fn blended_mix_rate(card: &RateCard, mix: &[MixEntry], default_rate: f64) -> f64 {
    let mut weighted = 0.0;
    let mut pct_sum = 0.0;
    for entry in mix {
        let pct = entry.pct.max(0.0) / 100.0;
        weighted += card.rate_or(&entry.profile, default_rate) * pct;
        pct_sum += pct;
    }
    if pct_sum > 0.0 {
        weighted / pct_sum
    } else {
        default_rate
    }
}

/// Resolves blended rates and mixes for tender profiles month by month.
pub struct RateResolver<'a> {
    card: &'a RateCard,
    mappings: &'a ProfileMappings,
    default_rate: f64,
    inflation_pct: f64,
}

impl<'a> RateResolver<'a> {
    pub fn new(
        card: &'a RateCard,
        mappings: &'a ProfileMappings,
        default_rate: f64,
        inflation_pct: f64,
    ) -> Self {
        Self {
            card,
            mappings,
            default_rate,
            inflation_pct,
        }
    }

    pub fn default_rate(&self) -> f64 {
        self.default_rate
    }

    pub fn card(&self) -> &RateCard {
        self.card
    }

    /// The mix active for a profile at a month, if any period covers it.
    pub fn mix_at(&self, profile_id: &str, month: u32) -> Option<&'a [MixEntry]> {
        self.mappings
            .get(profile_id)?
            .iter()
            .find(|p| p.contains(month))
            .map(|p| p.mix.as_slice())
    }

    /// Blended daily rate for a profile at a month, before escalation.
    /// Falls back to the default rate when no period covers the month.
    pub fn rate_at(&self, profile_id: &str, month: u32) -> f64 {
        match self.mix_at(profile_id, month) {
            Some(mix) => blended_mix_rate(self.card, mix, self.default_rate),
            None => self.default_rate,
        }
    }

    pub fn inflation_factor(&self, month: u32) -> f64 {
        inflation_factor_at(self.inflation_pct, month)
    }

    /// Escalated blended rate for a profile at a month.
    pub fn escalated_rate_at(&self, profile_id: &str, month: u32) -> f64 {
        self.rate_at(profile_id, month) * self.inflation_factor(month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> RateCard {
        RateCard::new()
            .with_rate("apps:senior-dev", 400.0)
            .with_rate("apps:junior-dev", 200.0)
    }

    #[test]
    fn blended_rate_normalizes_partial_mix() {
        let card = card();
        let mix = vec![
            MixEntry::new("apps:senior-dev", 30.0),
            MixEntry::new("apps:junior-dev", 30.0),
        ];
        // 30/30 normalizes to 50/50
        assert_eq!(blended_mix_rate(&card, &mix, 250.0), 300.0);
    }

    #[test]
    fn empty_mix_falls_back_to_default() {
        assert_eq!(blended_mix_rate(&card(), &[], 250.0), 250.0);
    }

    #[test]
    fn inflation_compounds_per_twelve_month_block() {
        assert_eq!(inflation_factor_at(10.0, 1), 1.0);
        assert_eq!(inflation_factor_at(10.0, 12), 1.0);
        assert_eq!(inflation_factor_at(10.0, 13), 1.1);
        assert_eq!(inflation_factor_at(10.0, 25), 1.21);
        assert_eq!(inflation_factor_at(0.0, 25), 1.0);
    }

    #[test]
    fn resolver_uses_covering_period_or_default() {
        let card = card();
        let mut mappings = ProfileMappings::new();
        mappings.insert(
            "pm".to_string(),
            vec![RateMappingPeriod::new(
                1,
                12,
                vec![MixEntry::new("apps:senior-dev", 100.0)],
            )],
        );
        let resolver = RateResolver::new(&card, &mappings, 250.0, 0.0);
        assert_eq!(resolver.rate_at("pm", 6), 400.0);
        assert_eq!(resolver.rate_at("pm", 13), 250.0);
        assert!(resolver.mix_at("pm", 13).is_none());
        assert!(resolver.mix_at("unknown", 1).is_none());
    }
}
