use crate::calculations::intervals::{MonthSpan, partition};
use crate::calculations::{num, round2, round4};
use crate::plan::BidPlan;
use crate::rates::{RateCard, RateResolver, UNMAPPED_PROFILE};
use crate::team::TeamMember;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Bucket key for effort a member has not allocated to any TOW.
pub const UNALLOCATED_TOW: &str = "__unallocated__";

/// Percentage reductions applied to a contribution, by source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Reductions {
    pub tow_pct: f64,
    pub reuse_pct: f64,
    pub profile_pct: f64,
}

impl Reductions {
    fn from_factors(profile_factor: f64, reuse_factor: f64, tow_factor: f64) -> Self {
        let pct = |f: f64| if f < 1.0 { (1.0 - f) * 100.0 } else { 0.0 };
        Self {
            tow_pct: pct(tow_factor),
            reuse_pct: pct(reuse_factor),
            profile_pct: pct(profile_factor),
        }
    }
}

/// One member/interval contribution to a delivery-profile bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileContribution {
    pub member: String,
    pub month_start: u32,
    pub month_end: u32,
    /// Effective days after every reduction stage.
    pub days: f64,
    /// Days after the profile volume factor only.
    pub days_base: f64,
    /// Theoretical days before any reduction.
    pub days_raw: f64,
    pub rate: f64,
    pub cost: f64,
    pub profile_factor: f64,
    pub efficiency_factor: f64,
    pub reductions: Reductions,
}

/// One member/interval contribution to a TOW bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TowContribution {
    pub member: String,
    pub profile_label: String,
    pub month_start: u32,
    pub month_end: u32,
    pub days: f64,
    pub days_base: f64,
    pub days_raw: f64,
    pub rate: f64,
    pub cost: f64,
    pub allocation_pct: f64,
    pub profile_factor: f64,
    pub efficiency_factor: f64,
    pub reductions: Reductions,
}

/// Aggregate for one delivery profile, with full audit detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileBreakdown {
    pub label: String,
    pub practice: String,
    pub cost: f64,
    pub days: f64,
    pub days_base: f64,
    pub days_raw: f64,
    pub rate: f64,
    pub contributions: Vec<ProfileContribution>,
}

/// Aggregate for one TOW, with full audit detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TowBreakdown {
    pub label: String,
    pub cost: f64,
    pub days: f64,
    pub days_base: f64,
    pub days_raw: f64,
    pub contributions: Vec<TowContribution>,
}

/// One time slice of one member, before any breakdown distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalSlice {
    pub member: String,
    pub month_start: u32,
    pub month_end: u32,
    pub fte: f64,
    /// Combined multiplier: profile x reuse x tow factor.
    pub fte_factor: f64,
    pub rate: f64,
    pub days: f64,
    pub cost: f64,
}

/// Full team-cost output: total, both breakdowns, audit slices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamCostResult {
    pub total: f64,
    pub total_days: f64,
    /// Average blended rate over the whole team; fallback subcontractor rate.
    pub team_mix_rate: f64,
    pub by_tow: BTreeMap<String, TowBreakdown>,
    pub by_profile: BTreeMap<String, ProfileBreakdown>,
    pub intervals: Vec<IntervalSlice>,
}

/// Per-profile slice of one interval, the unit distributed to both
/// breakdowns.
struct Triplet {
    profile_key: String,
    profile_label: String,
    practice: String,
    span: MonthSpan,
    days_raw: f64,
    days_base: f64,
    days_eff: f64,
    rate: f64,
    cost: f64,
    profile_factor: f64,
    reuse_factor: f64,
    tow_factor: f64,
}

struct MemberOutcome {
    label: String,
    /// Active (pct > 0) allocations, or the synthetic unallocated bucket.
    allocations: Vec<(String, f64)>,
    allocation_sum: f64,
    slices: Vec<IntervalSlice>,
    triplets: Vec<Triplet>,
}

fn member_outcome(
    member: &TeamMember,
    plan: &BidPlan,
    resolver: &RateResolver<'_>,
) -> MemberOutcome {
    let params = &plan.params;
    let adjustments = &plan.adjustments;
    let fte = num(member.fte);
    let reuse_factor = params.reuse_multiplier();
    let empty = Vec::new();
    let mapping = plan
        .profile_mappings
        .get(&member.profile_id)
        .unwrap_or(&empty);
    let spans = partition(&adjustments.periods, mapping, params.duration_months);

    let mut slices = Vec::with_capacity(spans.len());
    let mut triplets = Vec::new();

    for span in spans {
        let profile_factor = adjustments.profile_factor_at(&member.profile_id, span.start);
        let rate = resolver.rate_at(&member.profile_id, span.start);
        let inflation = resolver.inflation_factor(span.start);
        let escalated_rate = rate * inflation;
        let tow_factor = adjustments.tow_factor_at(&member.tow_allocation, span.start);

        let raw_days = fte * params.days_per_fte * span.years();
        let base_days = raw_days * profile_factor;
        let effective_days = base_days * reuse_factor * tow_factor;

        slices.push(IntervalSlice {
            member: member.display_label().to_string(),
            month_start: span.start,
            month_end: span.end,
            fte,
            fte_factor: profile_factor * reuse_factor * tow_factor,
            rate: escalated_rate,
            days: effective_days,
            cost: effective_days * escalated_rate,
        });

        let mix: Vec<_> = resolver
            .mix_at(&member.profile_id, span.start)
            .unwrap_or(&[])
            .iter()
            .filter(|m| !m.profile.is_empty())
            .collect();

        if !mix.is_empty() {
            for entry in mix {
                let pct = num(entry.pct) / 100.0;
                let entry_rate =
                    resolver.card().rate_or(&entry.profile, resolver.default_rate()) * inflation;
                let days_eff = round2(effective_days * pct);
                triplets.push(Triplet {
                    profile_key: entry.profile.clone(),
                    profile_label: resolver.card().label(&entry.profile),
                    practice: resolver.card().practice(&entry.profile),
                    span,
                    days_raw: raw_days * pct,
                    days_base: base_days * pct,
                    days_eff,
                    rate: entry_rate,
                    cost: days_eff * entry_rate,
                    profile_factor,
                    reuse_factor,
                    tow_factor,
                });
            }
        } else {
            // No mapping covers this interval: whole slice lands in the
            // unmapped bucket at the unescalated default rate.
            let days_eff = round2(effective_days);
            triplets.push(Triplet {
                profile_key: UNMAPPED_PROFILE.to_string(),
                profile_label: "Unmapped".to_string(),
                practice: String::new(),
                span,
                days_raw: raw_days,
                days_base: base_days,
                days_eff,
                rate: resolver.default_rate(),
                cost: days_eff * resolver.default_rate(),
                profile_factor,
                reuse_factor,
                tow_factor,
            });
        }
    }

    let mut allocations: Vec<(String, f64)> = member
        .tow_allocation
        .iter()
        .filter(|(_, pct)| num(**pct) > 0.0)
        .map(|(id, pct)| (id.clone(), num(*pct)))
        .collect();
    let mut allocation_sum: f64 = allocations.iter().map(|(_, pct)| pct).sum();
    if allocation_sum <= 0.0 {
        allocations = vec![(UNALLOCATED_TOW.to_string(), 100.0)];
        allocation_sum = 100.0;
    }

    MemberOutcome {
        label: member.display_label().to_string(),
        allocations,
        allocation_sum,
        slices,
        triplets,
    }
}

/// Computes staffing cost over members x intervals and aggregates it along
/// two orthogonal dimensions: by TOW and by resolved delivery profile.
/// Per-member slices are independent and computed in parallel; the merge
/// runs in member order, so the output is deterministic.
pub fn compute_team_cost(plan: &BidPlan, card: &RateCard) -> TeamCostResult {
    if plan.team.is_empty() {
        return TeamCostResult::default();
    }
    let params = &plan.params;
    let resolver = RateResolver::new(
        card,
        &plan.profile_mappings,
        params.default_daily_rate,
        params.inflation_pct,
    );

    let tow_labels: BTreeMap<&str, &str> = plan
        .tows
        .iter()
        .map(|t| (t.id.as_str(), t.label.as_str()))
        .collect();

    let outcomes: Vec<MemberOutcome> = plan
        .team
        .par_iter()
        .map(|member| member_outcome(member, plan, &resolver))
        .collect();

    let mut result = TeamCostResult::default();
    let mut total_cost = 0.0;
    let mut total_days = 0.0;

    for outcome in outcomes {
        for triplet in &outcome.triplets {
            let bucket = result
                .by_profile
                .entry(triplet.profile_key.clone())
                .or_insert_with(|| ProfileBreakdown {
                    label: triplet.profile_label.clone(),
                    practice: triplet.practice.clone(),
                    cost: 0.0,
                    days: 0.0,
                    days_base: 0.0,
                    days_raw: 0.0,
                    rate: triplet.rate,
                    contributions: Vec::new(),
                });
            bucket.cost += triplet.cost;
            bucket.days += triplet.days_eff;
            bucket.days_base += triplet.days_base;
            bucket.days_raw += triplet.days_raw;
            bucket.contributions.push(ProfileContribution {
                member: outcome.label.clone(),
                month_start: triplet.span.start,
                month_end: triplet.span.end,
                days: triplet.days_eff,
                days_base: triplet.days_base,
                days_raw: triplet.days_raw,
                rate: triplet.rate,
                cost: triplet.cost,
                profile_factor: triplet.profile_factor,
                efficiency_factor: triplet.reuse_factor * triplet.tow_factor,
                reductions: Reductions::from_factors(
                    triplet.profile_factor,
                    triplet.reuse_factor,
                    triplet.tow_factor,
                ),
            });
        }

        for (tow_id, pct) in &outcome.allocations {
            let ratio = pct / outcome.allocation_sum;
            let bucket = result
                .by_tow
                .entry(tow_id.clone())
                .or_insert_with(|| TowBreakdown {
                    label: tow_labels
                        .get(tow_id.as_str())
                        .map(|l| l.to_string())
                        .unwrap_or_else(|| tow_id.clone()),
                    cost: 0.0,
                    days: 0.0,
                    days_base: 0.0,
                    days_raw: 0.0,
                    contributions: Vec::new(),
                });
            for triplet in &outcome.triplets {
                let days_raw = triplet.days_raw * ratio;
                let days_base = triplet.days_base * ratio;
                let days = round2(triplet.days_eff * ratio);
                let cost = days * triplet.rate;

                bucket.cost += cost;
                bucket.days += days;
                bucket.days_base += days_base;
                bucket.days_raw += days_raw;
                bucket.contributions.push(TowContribution {
                    member: outcome.label.clone(),
                    profile_label: triplet.profile_label.clone(),
                    month_start: triplet.span.start,
                    month_end: triplet.span.end,
                    days,
                    days_base,
                    days_raw,
                    rate: triplet.rate,
                    cost,
                    allocation_pct: *pct,
                    profile_factor: triplet.profile_factor,
                    efficiency_factor: triplet.reuse_factor * triplet.tow_factor,
                    reductions: Reductions::from_factors(
                        triplet.profile_factor,
                        triplet.reuse_factor,
                        triplet.tow_factor,
                    ),
                });
                total_cost += cost;
                total_days += days;
            }
        }

        result.intervals.extend(outcome.slices);
    }

    for bucket in result.by_tow.values_mut() {
        bucket.cost = round2(bucket.cost);
        bucket.days = round4(bucket.days);
        bucket.days_base = round4(bucket.days_base);
        bucket.days_raw = round4(bucket.days_raw);
    }
    for bucket in result.by_profile.values_mut() {
        bucket.cost = round2(bucket.cost);
        bucket.days = round4(bucket.days);
        bucket.days_base = round4(bucket.days_base);
        bucket.days_raw = round4(bucket.days_raw);
    }

    result.total = round2(total_cost);
    result.total_days = round4(total_days);
    result.team_mix_rate = if total_days > 0.0 {
        total_cost / total_days
    } else {
        0.0
    };
    result
}
