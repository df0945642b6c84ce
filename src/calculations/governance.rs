use crate::calculations::{num, round2};
use crate::plan::PlanParams;
use crate::rates::{MixEntry, RateCard, inflation_factor_at};
use crate::team::TeamMember;
use serde::{Deserialize, Serialize};

/// One governance staffing slice: its own FTE and its own profile mix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernanceFtePeriod {
    pub month_start: u32,
    pub month_end: u32,
    pub fte: f64,
    #[serde(default)]
    pub mix: Vec<MixEntry>,
}

/// The four mutually exclusive governance calculation modes. The mode is
/// selected by tag, never inferred; a mode that yields no value falls back
/// to the percentage-of-base calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum GovernanceMode {
    /// Fixed amount entered by the user.
    Manual {
        #[serde(default)]
        cost: Option<f64>,
    },
    /// Time-sliced governance staffing, each slice with its own mix.
    FtePeriods { periods: Vec<GovernanceFtePeriod> },
    /// A share of total team FTE costed with a single global mix.
    TeamMix { mix: Vec<MixEntry> },
    /// Percentage of the delivery cost base.
    Percentage,
}

impl Default for GovernanceMode {
    fn default() -> Self {
        GovernanceMode::Percentage
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernanceConfig {
    #[serde(default)]
    pub mode: GovernanceMode,
    /// Share of team FTE in team-mix mode; percentage of the cost base in
    /// percentage mode and in the fallback.
    #[serde(default)]
    pub governance_pct: f64,
    /// When set and the global reuse factor is positive, the computed value
    /// is scaled by `1 - reuse_pct/100`.
    #[serde(default)]
    pub apply_reuse: bool,
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            mode: GovernanceMode::Percentage,
            governance_pct: 0.0,
            apply_reuse: false,
        }
    }
}

/// Which calculation produced the value, with the inputs it used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum GovernanceMethod {
    Manual,
    FtePeriods {
        periods: usize,
    },
    TeamMix {
        fte: f64,
        days_per_fte: f64,
        years: f64,
        avg_rate: f64,
    },
    PercentOfBase {
        pct: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernanceExplanation {
    #[serde(flatten)]
    pub method: GovernanceMethod,
    pub reuse_applied: bool,
    /// Value before the reuse scaling, when reuse was applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_before_reuse: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernanceCost {
    pub value: f64,
    pub explanation: GovernanceExplanation,
}

/// Weighted average rate of a mix, normalized over its percentage sum.
/// Unknown profiles contribute a zero rate; an empty or zero-sum mix has no
/// rate at all.
fn governance_mix_rate(card: &RateCard, mix: &[MixEntry]) -> Option<f64> {
    let mut weighted = 0.0;
    let mut pct_sum = 0.0;
    for entry in mix {
        let pct = num(entry.pct) / 100.0;
        weighted += card.rate_or(&entry.profile, 0.0) * pct;
        pct_sum += pct;
    }
    if pct_sum > 0.0 {
        Some(weighted / pct_sum)
    } else {
        None
    }
}

fn fte_periods_cost(
    periods: &[GovernanceFtePeriod],
    card: &RateCard,
    params: &PlanParams,
) -> f64 {
    let mut total = 0.0;
    for period in periods {
        let fte = num(period.fte);
        let month_start = period.month_start.max(1);
        let month_end = period.month_end.max(month_start);
        let period_years = (month_end - month_start + 1) as f64 / 12.0;
        let avg_rate = governance_mix_rate(card, &period.mix).unwrap_or(0.0);
        let escalation = inflation_factor_at(params.inflation_pct, month_start);
        total += fte * avg_rate * escalation * params.days_per_fte * period_years;
    }
    total
}

/// Team-mix mode. With inflation the duration is split into 12-month
/// blocks, each escalated on its own, because a single blended multiplier
/// is wrong for partial-duration contracts.
fn team_mix_cost(
    mix: &[MixEntry],
    governance_pct: f64,
    team: &[TeamMember],
    card: &RateCard,
    params: &PlanParams,
) -> Option<(f64, GovernanceMethod)> {
    let total_fte: f64 = team.iter().map(|m| num(m.fte)).sum();
    let governance_fte = total_fte * governance_pct / 100.0;
    let avg_rate = governance_mix_rate(card, mix)?;

    let value = if params.inflation_pct > 0.0 {
        let total_years = params.duration_months.div_ceil(12);
        let mut inflated = 0.0;
        for year in 0..total_years {
            let year_start = year * 12 + 1;
            let year_end = ((year + 1) * 12).min(params.duration_months);
            let fraction = (year_end - year_start + 1) as f64 / 12.0;
            let escalation = inflation_factor_at(params.inflation_pct, year_start);
            inflated += governance_fte * params.days_per_fte * fraction * avg_rate * escalation;
        }
        inflated
    } else {
        governance_fte * params.days_per_fte * params.duration_years() * avg_rate
    };

    Some((
        value,
        GovernanceMethod::TeamMix {
            fte: governance_fte,
            days_per_fte: params.days_per_fte,
            years: params.duration_years(),
            avg_rate,
        },
    ))
}

/// Computes the governance cost for the active mode. `base_cost` is the
/// delivery cost base (team + catalog) used by the percentage calculation.
pub fn compute_governance_cost(
    config: &GovernanceConfig,
    team: &[TeamMember],
    card: &RateCard,
    params: &PlanParams,
    base_cost: f64,
) -> GovernanceCost {
    let percent_of_base = || {
        (
            base_cost * config.governance_pct / 100.0,
            GovernanceMethod::PercentOfBase {
                pct: config.governance_pct,
            },
        )
    };

    let computed: Option<(f64, GovernanceMethod)> = match &config.mode {
        // A zero manual amount counts as unset and falls back.
        GovernanceMode::Manual { cost } => cost
            .map(num)
            .filter(|value| *value > 0.0)
            .map(|value| (value, GovernanceMethod::Manual)),
        GovernanceMode::FtePeriods { periods } => {
            if periods.is_empty() {
                None
            } else {
                Some((
                    fte_periods_cost(periods, card, params),
                    GovernanceMethod::FtePeriods {
                        periods: periods.len(),
                    },
                ))
            }
        }
        GovernanceMode::TeamMix { mix } => {
            team_mix_cost(mix, config.governance_pct, team, card, params)
        }
        GovernanceMode::Percentage => Some(percent_of_base()),
    };

    let (value, method) = computed.unwrap_or_else(percent_of_base);

    let (final_value, reuse_applied, value_before_reuse) =
        if config.apply_reuse && params.reuse_pct > 0.0 {
            (value * (1.0 - params.reuse_pct / 100.0), true, Some(value))
        } else {
            (value, false, None)
        };

    GovernanceCost {
        value: round2(final_value),
        explanation: GovernanceExplanation {
            method,
            reuse_applied,
            value_before_reuse,
        },
    }
}
