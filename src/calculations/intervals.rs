use crate::adjustments::AdjustmentPeriod;
use crate::rates::RateMappingPeriod;
use serde::{Deserialize, Serialize};

/// A contiguous, inclusive month range over which every resolved value
/// (rate, mix, factors) is constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthSpan {
    pub start: u32,
    pub end: u32,
}

impl MonthSpan {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn months(&self) -> u32 {
        self.end - self.start + 1
    }

    pub fn years(&self) -> f64 {
        self.months() as f64 / 12.0
    }
}

/// Merges every boundary month from adjustment periods and rate-mapping
/// periods into a minimal set of contiguous intervals covering the whole
/// contract. Boundaries are each period's start and one month past its end,
/// clipped to `[1, duration_months + 1]`.
pub fn partition(
    adjustment_periods: &[AdjustmentPeriod],
    mapping_periods: &[RateMappingPeriod],
    duration_months: u32,
) -> Vec<MonthSpan> {
    if duration_months == 0 {
        return Vec::new();
    }
    let limit = duration_months + 1;
    let mut boundaries = vec![1, limit];
    for period in adjustment_periods {
        boundaries.push(period.month_start.max(1));
        boundaries.push(period.month_end.saturating_add(1));
    }
    for period in mapping_periods {
        boundaries.push(period.month_start.max(1));
        boundaries.push(period.month_end.saturating_add(1));
    }
    boundaries.retain(|b| *b >= 1 && *b <= limit);
    boundaries.sort_unstable();
    boundaries.dedup();

    boundaries
        .windows(2)
        .map(|pair| MonthSpan::new(pair[0], pair[1] - 1))
        .collect()
}
