use crate::plan::BidPlan;
use crate::rates::RateMappingPeriod;
use std::collections::HashSet;
use std::fmt;

const EPSILON: f64 = 1e-6;

#[derive(Debug, Clone)]
pub struct PlanValidationError {
    message: String,
}

impl PlanValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for PlanValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for PlanValidationError {}

fn check_month_range(
    context: &str,
    month_start: u32,
    month_end: u32,
) -> Result<(), PlanValidationError> {
    if month_start == 0 {
        return Err(PlanValidationError::new(format!(
            "{context} has month_start 0 (months are 1-based)"
        )));
    }
    if month_end < month_start {
        return Err(PlanValidationError::new(format!(
            "{context} has inverted month range {month_start}-{month_end}"
        )));
    }
    Ok(())
}

fn check_mapping_periods(
    profile_id: &str,
    periods: &[RateMappingPeriod],
) -> Result<(), PlanValidationError> {
    for period in periods {
        check_month_range(
            &format!("rate mapping for profile '{profile_id}'"),
            period.month_start,
            period.month_end,
        )?;
    }
    for (i, a) in periods.iter().enumerate() {
        for b in periods.iter().skip(i + 1) {
            if a.month_start <= b.month_end && b.month_start <= a.month_end {
                return Err(PlanValidationError::new(format!(
                    "rate mapping periods for profile '{profile_id}' overlap: \
                     {}-{} and {}-{}",
                    a.month_start, a.month_end, b.month_start, b.month_end
                )));
            }
        }
    }
    Ok(())
}

/// Rejects structurally invalid input. Soft invariants (percentage sums,
/// FTE tolerance, cluster constraints) are reported on the results instead.
pub fn validate_plan(plan: &BidPlan) -> Result<(), PlanValidationError> {
    let params = &plan.params;
    if params.duration_months == 0 {
        return Err(PlanValidationError::new(
            "duration_months must be positive",
        ));
    }
    if !params.days_per_fte.is_finite() || params.days_per_fte <= 0.0 {
        return Err(PlanValidationError::new(format!(
            "days_per_fte must be positive (got {})",
            params.days_per_fte
        )));
    }
    if params.default_daily_rate < 0.0 {
        return Err(PlanValidationError::new(format!(
            "default_daily_rate must not be negative (got {})",
            params.default_daily_rate
        )));
    }
    if let Some(quota) = params.rti_quota {
        if !quota.is_finite() || quota < 0.0 || quota > 1.0 + EPSILON {
            return Err(PlanValidationError::new(format!(
                "rti_quota must be between 0 and 1 (got {quota})"
            )));
        }
    }

    for member in &plan.team {
        if member.profile_id.trim().is_empty() {
            return Err(PlanValidationError::new(
                "team member requires a non-empty profile_id",
            ));
        }
        if member.fte < -EPSILON {
            return Err(PlanValidationError::new(format!(
                "team member '{}' has negative fte {}",
                member.display_label(),
                member.fte
            )));
        }
        for (tow_id, pct) in &member.tow_allocation {
            if *pct < -EPSILON {
                return Err(PlanValidationError::new(format!(
                    "team member '{}' has negative allocation {pct} for TOW '{tow_id}'",
                    member.display_label()
                )));
            }
        }
    }

    for (profile_id, periods) in &plan.profile_mappings {
        check_mapping_periods(profile_id, periods)?;
    }

    for (idx, period) in plan.adjustments.periods.iter().enumerate() {
        check_month_range(
            &format!("adjustment period #{idx}"),
            period.month_start,
            period.month_end,
        )?;
    }

    let mut tow_ids = HashSet::with_capacity(plan.tows.len());
    for tow in &plan.tows {
        if !tow_ids.insert(tow.id.as_str()) {
            return Err(PlanValidationError::new(format!(
                "duplicate TOW id '{}'",
                tow.id
            )));
        }
        if let Some(catalog) = &tow.catalog {
            let mut item_ids = HashSet::with_capacity(catalog.items.len());
            for item in &catalog.items {
                if !item_ids.insert(item.id.as_str()) {
                    return Err(PlanValidationError::new(format!(
                        "TOW '{}' has duplicate catalog item id '{}'",
                        tow.id, item.id
                    )));
                }
            }
            for group in &catalog.groups {
                for item_id in &group.item_ids {
                    if !item_ids.contains(item_id.as_str()) {
                        return Err(PlanValidationError::new(format!(
                            "catalog group '{}' of TOW '{}' references unknown item '{}'",
                            group.id, tow.id, item_id
                        )));
                    }
                }
                if let Some(reuse) = group.reuse_factor {
                    if !(0.0..=1.0).contains(&reuse) {
                        return Err(PlanValidationError::new(format!(
                            "catalog group '{}' has reuse_factor {reuse} outside 0-1",
                            group.id
                        )));
                    }
                }
            }
        }
    }

    Ok(())
}
