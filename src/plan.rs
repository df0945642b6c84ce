use crate::adjustments::VolumeAdjustments;
use crate::calculations::governance::GovernanceConfig;
use crate::rates::ProfileMappings;
use crate::team::TeamMember;
use crate::tow::Tow;
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Identity of the bid: tender, client, contract start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanMetadata {
    pub tender_name: String,
    pub client: String,
    pub contract_start: NaiveDate,
}

impl Default for PlanMetadata {
    fn default() -> Self {
        Self {
            tender_name: "New Tender".to_string(),
            client: String::new(),
            contract_start: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        }
    }
}

impl PlanMetadata {
    /// Calendar date of a 1-based contract month, for reporting.
    pub fn month_date(&self, month: u32) -> NaiveDate {
        self.contract_start
            .checked_add_months(Months::new(month.saturating_sub(1)))
            .unwrap_or(self.contract_start)
    }
}

fn default_duration_months() -> u32 {
    36
}

fn default_days_per_fte() -> f64 {
    220.0
}

fn default_daily_rate() -> f64 {
    250.0
}

fn default_risk_pct() -> f64 {
    3.0
}

/// Global pricing parameters. Percentages are 0-100 values throughout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanParams {
    #[serde(default = "default_duration_months")]
    pub duration_months: u32,
    #[serde(default = "default_days_per_fte")]
    pub days_per_fte: f64,
    /// Rate applied when a profile has no mapping for a month.
    #[serde(default = "default_daily_rate")]
    pub default_daily_rate: f64,
    /// Yearly rate escalation, compounding per 12-month block.
    #[serde(default)]
    pub inflation_pct: f64,
    /// Global reuse discount on staffing days.
    #[serde(default)]
    pub reuse_pct: f64,
    /// Risk contingency over delivery + governance cost.
    #[serde(default = "default_risk_pct")]
    pub risk_contingency_pct: f64,
    /// Subcontracted share of delivery cost.
    #[serde(default)]
    pub subcontract_quota_pct: f64,
    /// Tender base price, compared against total cost for margin.
    #[serde(default)]
    pub base_amount: f64,
    /// Offered discount on the base price.
    #[serde(default)]
    pub discount_pct: f64,
    /// Consortium share of revenue (0-1) when bidding jointly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rti_quota: Option<f64>,
}

impl Default for PlanParams {
    fn default() -> Self {
        Self {
            duration_months: default_duration_months(),
            days_per_fte: default_days_per_fte(),
            default_daily_rate: default_daily_rate(),
            inflation_pct: 0.0,
            reuse_pct: 0.0,
            risk_contingency_pct: default_risk_pct(),
            subcontract_quota_pct: 0.0,
            base_amount: 0.0,
            discount_pct: 0.0,
            rti_quota: None,
        }
    }
}

impl PlanParams {
    pub fn duration_years(&self) -> f64 {
        self.duration_months as f64 / 12.0
    }

    /// Reuse multiplier on staffing days: `1 - reuse_pct/100`.
    pub fn reuse_multiplier(&self) -> f64 {
        1.0 - self.reuse_pct / 100.0
    }
}

/// The full bid configuration: everything the engine needs apart from the
/// externally owned rate card. The engine never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BidPlan {
    #[serde(default)]
    pub metadata: PlanMetadata,
    #[serde(default)]
    pub params: PlanParams,
    #[serde(default)]
    pub team: Vec<TeamMember>,
    #[serde(default)]
    pub profile_mappings: ProfileMappings,
    #[serde(default)]
    pub adjustments: VolumeAdjustments,
    #[serde(default)]
    pub tows: Vec<Tow>,
    #[serde(default)]
    pub governance: GovernanceConfig,
}

impl Default for BidPlan {
    fn default() -> Self {
        Self {
            metadata: PlanMetadata::default(),
            params: PlanParams::default(),
            team: Vec::new(),
            profile_mappings: ProfileMappings::new(),
            adjustments: VolumeAdjustments::default(),
            tows: Vec::new(),
            governance: GovernanceConfig::default(),
        }
    }
}

impl BidPlan {
    pub fn total_team_fte(&self) -> f64 {
        self.team
            .iter()
            .map(|m| if m.fte.is_finite() { m.fte } else { 0.0 })
            .sum()
    }

    pub fn find_tow(&self, tow_id: &str) -> Option<&Tow> {
        self.tows.iter().find(|t| t.id == tow_id)
    }
}
