pub mod catalog;
pub mod governance;
pub mod intervals;
pub mod team_cost;
pub mod totals;

use crate::plan::BidPlan;
use crate::rates::RateCard;
use crate::validation::{PlanValidationError, validate_plan};
use serde::{Deserialize, Serialize};

/// Non-finite numeric input counts as zero; the engine never propagates NaN.
pub(crate) fn num(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Money is rounded to cents.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Day counts are rounded to 4 decimals to keep rounding error from
/// compounding across many small intervals.
pub(crate) fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Everything derived from one plan: team cost, catalog pricing, governance,
/// the cost stack and the margin versus the tender base price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanCostSummary {
    pub team: team_cost::TeamCostResult,
    pub catalog: catalog::CatalogResult,
    pub governance: governance::GovernanceCost,
    pub costs: totals::CostStack,
    pub margin: totals::MarginReport,
}

/// Runs the whole engine over a validated plan. Pure function of its
/// inputs: identical plan and rate card always produce identical output.
pub fn compute_plan(plan: &BidPlan, card: &RateCard) -> Result<PlanCostSummary, PlanValidationError> {
    validate_plan(plan)?;

    let team = team_cost::compute_team_cost(plan, card);
    let catalog = catalog::compute_catalog_cost(&plan.tows, card, &plan.params);
    let governance = governance::compute_governance_cost(
        &plan.governance,
        &plan.team,
        card,
        &plan.params,
        team.total + catalog.total,
    );
    let costs = totals::cost_stack(
        team.total,
        catalog.total,
        governance.value,
        plan.params.risk_contingency_pct,
        plan.params.subcontract_quota_pct,
    );
    let margin = totals::margin(
        plan.params.base_amount,
        costs.total,
        plan.params.discount_pct,
        plan.params.rti_quota,
    );

    Ok(PlanCostSummary {
        team,
        catalog,
        governance,
        costs,
        margin,
    })
}
