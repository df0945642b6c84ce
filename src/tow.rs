use crate::rates::MixEntry;
use serde::{Deserialize, Serialize};

/// Pricing type of a work package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TowKind {
    /// Priced per task order.
    Task,
    /// Lump-sum body of work.
    LumpSum,
    /// Recurring subscription fee.
    Subscription,
    /// Pay-per-use consumption.
    Consumption,
    /// Priced as a catalog of deliverables (see [`CatalogConfig`]).
    Catalog,
}

impl TowKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TowKind::Task => "task",
            TowKind::LumpSum => "lump_sum",
            TowKind::Subscription => "subscription",
            TowKind::Consumption => "consumption",
            TowKind::Catalog => "catalog",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "task" => Some(TowKind::Task),
            "lump_sum" => Some(TowKind::LumpSum),
            "subscription" => Some(TowKind::Subscription),
            "consumption" => Some(TowKind::Consumption),
            "catalog" => Some(TowKind::Catalog),
            _ => None,
        }
    }
}

/// A type of work: one work package of the contract with its own pricing
/// type and share of the total revenue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tow {
    pub id: String,
    pub label: String,
    pub kind: TowKind,
    /// Share of total contract revenue, 0-100.
    #[serde(default)]
    pub weight_pct: f64,
    /// Type-specific quantity (task orders, subscription periods, units).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    /// Present only when `kind == Catalog`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<CatalogConfig>,
}

impl Tow {
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: TowKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
            weight_pct: 0.0,
            quantity: None,
            catalog: None,
        }
    }
}

fn default_target_margin() -> f64 {
    20.0
}

/// Catalog sub-model of a TOW: deliverables priced margin-first from a
/// group -> item percentage hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Declared total FTE budget of the catalog.
    pub total_fte: f64,
    /// Declared total monetary value of the catalog.
    pub total_catalog_value: f64,
    /// Default target margin for items without an override, 0-100.
    #[serde(default = "default_target_margin")]
    pub target_margin_pct: f64,
    /// Default reuse factor (0-1) for groups without an override.
    #[serde(default)]
    pub catalog_reuse_factor: f64,
    /// Tender discount, 0-100. Scales reference figures only.
    #[serde(default)]
    pub tender_discount_pct: f64,
    #[serde(default)]
    pub groups: Vec<CatalogGroup>,
    #[serde(default)]
    pub items: Vec<CatalogItem>,
    #[serde(default)]
    pub clusters: Vec<Cluster>,
}

/// A slice of the catalog's declared value, owning a set of items whose
/// `group_pct` shares should sum to 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogGroup {
    pub id: String,
    pub label: String,
    /// Target monetary value of the group, a slice of the catalog total.
    pub target_value: f64,
    /// Group-level reuse factor (0-1) overriding the catalog default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reuse_factor: Option<f64>,
    pub item_ids: Vec<String>,
}

/// A priced deliverable inside a catalog group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    pub label: String,
    /// Tender reference unit price.
    #[serde(default)]
    pub price_base: f64,
    /// Delivery-profile mix, percentages summing to 100.
    #[serde(default)]
    pub profile_mix: Vec<MixEntry>,
    /// Share of the owning group, 0-100.
    pub group_pct: f64,
    /// Item-level margin override, 0-100. None uses the catalog default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_margin_pct: Option<f64>,
}

/// Comparison type for a cluster's required FTE share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterConstraint {
    /// Actual share must match the requirement within tolerance.
    Equality,
    /// Actual share must not exceed the requirement.
    Maximum,
    /// Actual share must meet or exceed the requirement.
    Minimum,
}

impl Default for ClusterConstraint {
    fn default() -> Self {
        ClusterConstraint::Equality
    }
}

/// A required percentage-of-total-FTE constraint over a subset of delivery
/// profiles. Validation only; never changes cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: String,
    pub label: String,
    /// Required share of total derived FTE, 0-100.
    pub required_pct: f64,
    #[serde(default)]
    pub constraint: ClusterConstraint,
    /// Delivery-profile keys counted toward this cluster.
    pub profiles: Vec<String>,
}
