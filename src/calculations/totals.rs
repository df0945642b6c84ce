use crate::calculations::round2;
use crate::calculations::team_cost::compute_team_cost;
use crate::plan::BidPlan;
use crate::rates::RateCard;
use serde::{Deserialize, Serialize};

/// The four cost components plus risk-adjusted total.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostStack {
    pub team: f64,
    pub catalog: f64,
    pub governance: f64,
    pub risk: f64,
    pub subcontract: f64,
    pub total: f64,
}

/// Builds the full cost stack. Risk contingency covers delivery plus
/// governance; the subcontract quota applies to delivery cost only.
pub fn cost_stack(
    team: f64,
    catalog: f64,
    governance: f64,
    risk_pct: f64,
    subcontract_quota_pct: f64,
) -> CostStack {
    let delivery = team + catalog;
    let risk = (delivery + governance) * risk_pct / 100.0;
    let subcontract = delivery * subcontract_quota_pct / 100.0;
    CostStack {
        team: round2(team),
        catalog: round2(catalog),
        governance: round2(governance),
        risk: round2(risk),
        subcontract: round2(subcontract),
        total: round2(delivery + governance + risk + subcontract),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarginReport {
    pub revenue: f64,
    pub cost: f64,
    pub margin: f64,
    pub margin_pct: f64,
}

/// Margin versus revenue: `base_amount x (1 - discount) x consortium quota`.
pub fn margin(
    base_amount: f64,
    total_cost: f64,
    discount_pct: f64,
    rti_quota: Option<f64>,
) -> MarginReport {
    let mut revenue = base_amount * (1.0 - discount_pct / 100.0);
    if let Some(quota) = rti_quota {
        revenue *= quota;
    }
    let margin = revenue - total_cost;
    MarginReport {
        revenue: round2(revenue),
        cost: round2(total_cost),
        margin: round2(margin),
        margin_pct: if revenue > 0.0 {
            round2(margin / revenue * 100.0)
        } else {
            0.0
        },
    }
}

/// Closed-form discount that hits a target margin:
/// `d = 1 - cost / (base x quota x (1 - target))`, clamped to [0, 100].
pub fn discount_for_margin(
    base_amount: f64,
    total_cost: f64,
    target_margin_pct: f64,
    rti_quota: Option<f64>,
) -> f64 {
    let target = target_margin_pct / 100.0;
    let quota = rti_quota.unwrap_or(1.0);
    let denominator = base_amount * quota * (1.0 - target);
    if denominator <= 0.0 {
        return 0.0;
    }
    let discount = 1.0 - total_cost / denominator;
    round2((discount * 100.0).clamp(0.0, 100.0))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub reuse_pct: f64,
    pub volume_factor: f64,
    pub total_cost: f64,
    pub margin: MarginReport,
}

const SCENARIO_CONFIGS: [(&str, f64, f64); 3] = [
    ("Current/Balanced", 0.0, 0.0),
    ("Conservative", -5.0, 0.05),
    ("Aggressive", 5.0, -0.05),
];

/// Generates the three what-if scenarios by shifting the reuse percentage
/// and the global volume factor, recomputing the team cost each time.
/// Catalog cost is held fixed: its FTE budget comes from the tender, not
/// from team staffing assumptions.
pub fn generate_scenarios(plan: &BidPlan, card: &RateCard, catalog_cost: f64) -> Vec<Scenario> {
    let params = &plan.params;
    SCENARIO_CONFIGS
        .iter()
        .map(|(name, reuse_delta, volume_delta)| {
            let reuse_pct = (params.reuse_pct + reuse_delta).clamp(0.0, 80.0);
            let volume_factor = (plan.adjustments.global + volume_delta).clamp(0.5, 1.5);

            let mut scenario_plan = plan.clone();
            scenario_plan.params.reuse_pct = reuse_pct;
            scenario_plan.adjustments.global = volume_factor;
            let team = compute_team_cost(&scenario_plan, card);

            let delivery = team.total + catalog_cost;
            let governance = delivery * plan.governance.governance_pct / 100.0;
            let stack = cost_stack(
                team.total,
                catalog_cost,
                governance,
                params.risk_contingency_pct,
                params.subcontract_quota_pct,
            );
            Scenario {
                name: name.to_string(),
                reuse_pct,
                volume_factor,
                total_cost: stack.total,
                margin: margin(params.base_amount, stack.total, 0.0, params.rti_quota),
            }
        })
        .collect()
}
