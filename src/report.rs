//! Tabular views of computed results, for the CLI renderer and analysis.

use crate::calculations::catalog::CatalogResult;
use crate::calculations::team_cost::TeamCostResult;
use crate::plan::PlanMetadata;
use chrono::NaiveDate;
use polars::prelude::PlSmallStr;
use polars::prelude::*;

pub fn tow_breakdown_frame(result: &TeamCostResult) -> PolarsResult<DataFrame> {
    let mut tow_ids = Vec::with_capacity(result.by_tow.len());
    let mut labels = Vec::with_capacity(result.by_tow.len());
    let mut costs = Vec::with_capacity(result.by_tow.len());
    let mut days = Vec::with_capacity(result.by_tow.len());
    let mut days_base = Vec::with_capacity(result.by_tow.len());
    let mut days_raw = Vec::with_capacity(result.by_tow.len());
    for (tow_id, bucket) in &result.by_tow {
        tow_ids.push(tow_id.clone());
        labels.push(bucket.label.clone());
        costs.push(bucket.cost);
        days.push(bucket.days);
        days_base.push(bucket.days_base);
        days_raw.push(bucket.days_raw);
    }

    DataFrame::new(vec![
        Series::new(PlSmallStr::from_static("tow_id"), tow_ids).into_column(),
        Series::new(PlSmallStr::from_static("label"), labels).into_column(),
        Series::new(PlSmallStr::from_static("cost"), costs).into_column(),
        Series::new(PlSmallStr::from_static("days"), days).into_column(),
        Series::new(PlSmallStr::from_static("days_base"), days_base).into_column(),
        Series::new(PlSmallStr::from_static("days_raw"), days_raw).into_column(),
    ])
}

pub fn profile_breakdown_frame(result: &TeamCostResult) -> PolarsResult<DataFrame> {
    let size = result.by_profile.len();
    let mut keys = Vec::with_capacity(size);
    let mut labels = Vec::with_capacity(size);
    let mut practices = Vec::with_capacity(size);
    let mut rates = Vec::with_capacity(size);
    let mut costs = Vec::with_capacity(size);
    let mut days = Vec::with_capacity(size);
    for (key, bucket) in &result.by_profile {
        keys.push(key.clone());
        labels.push(bucket.label.clone());
        practices.push(bucket.practice.clone());
        rates.push(bucket.rate);
        costs.push(bucket.cost);
        days.push(bucket.days);
    }

    DataFrame::new(vec![
        Series::new(PlSmallStr::from_static("profile"), keys).into_column(),
        Series::new(PlSmallStr::from_static("label"), labels).into_column(),
        Series::new(PlSmallStr::from_static("practice"), practices).into_column(),
        Series::new(PlSmallStr::from_static("rate"), rates).into_column(),
        Series::new(PlSmallStr::from_static("cost"), costs).into_column(),
        Series::new(PlSmallStr::from_static("days"), days).into_column(),
    ])
}

/// Interval audit trail with calendar start dates resolved from the
/// contract start.
pub fn interval_frame(
    result: &TeamCostResult,
    metadata: &PlanMetadata,
) -> PolarsResult<DataFrame> {
    let size = result.intervals.len();
    let mut members = Vec::with_capacity(size);
    let mut month_starts = Vec::with_capacity(size);
    let mut month_ends = Vec::with_capacity(size);
    let mut start_dates = Vec::with_capacity(size);
    let mut ftes = Vec::with_capacity(size);
    let mut factors = Vec::with_capacity(size);
    let mut rates = Vec::with_capacity(size);
    let mut days = Vec::with_capacity(size);
    let mut costs = Vec::with_capacity(size);
    for slice in &result.intervals {
        members.push(slice.member.clone());
        month_starts.push(slice.month_start);
        month_ends.push(slice.month_end);
        start_dates.push(date_to_i32(metadata.month_date(slice.month_start)));
        ftes.push(slice.fte);
        factors.push(slice.fte_factor);
        rates.push(slice.rate);
        days.push(slice.days);
        costs.push(slice.cost);
    }

    let start_date_series =
        Series::new(PlSmallStr::from_static("start_date"), start_dates).cast(&DataType::Date)?;
    DataFrame::new(vec![
        Series::new(PlSmallStr::from_static("member"), members).into_column(),
        Series::new(PlSmallStr::from_static("month_start"), month_starts).into_column(),
        Series::new(PlSmallStr::from_static("month_end"), month_ends).into_column(),
        start_date_series.into_column(),
        Series::new(PlSmallStr::from_static("fte"), ftes).into_column(),
        Series::new(PlSmallStr::from_static("fte_factor"), factors).into_column(),
        Series::new(PlSmallStr::from_static("rate"), rates).into_column(),
        Series::new(PlSmallStr::from_static("days"), days).into_column(),
        Series::new(PlSmallStr::from_static("cost"), costs).into_column(),
    ])
}

pub fn catalog_items_frame(result: &CatalogResult) -> PolarsResult<DataFrame> {
    let size: usize = result.by_tow.iter().map(|t| t.items.len()).sum();
    let mut tow_ids = Vec::with_capacity(size);
    let mut labels = Vec::with_capacity(size);
    let mut ftes = Vec::with_capacity(size);
    let mut costs = Vec::with_capacity(size);
    let mut sells = Vec::with_capacity(size);
    let mut margins = Vec::with_capacity(size);
    let mut margin_pcts = Vec::with_capacity(size);
    let mut unit_prices = Vec::with_capacity(size);
    let mut discount_pcts = Vec::with_capacity(size);
    for tow in &result.by_tow {
        for item in &tow.items {
            tow_ids.push(tow.tow_id.clone());
            labels.push(item.label.clone());
            ftes.push(item.fte);
            costs.push(item.cost);
            sells.push(item.sell_price);
            margins.push(item.margin);
            margin_pcts.push(item.effective_margin_pct);
            unit_prices.push(item.unit_price);
            discount_pcts.push(item.discount_pct);
        }
    }

    DataFrame::new(vec![
        Series::new(PlSmallStr::from_static("tow_id"), tow_ids).into_column(),
        Series::new(PlSmallStr::from_static("label"), labels).into_column(),
        Series::new(PlSmallStr::from_static("fte"), ftes).into_column(),
        Series::new(PlSmallStr::from_static("cost"), costs).into_column(),
        Series::new(PlSmallStr::from_static("sell_price"), sells).into_column(),
        Series::new(PlSmallStr::from_static("margin"), margins).into_column(),
        Series::new(PlSmallStr::from_static("margin_pct"), margin_pcts).into_column(),
        Series::new(PlSmallStr::from_static("unit_price"), unit_prices).into_column(),
        Series::new(PlSmallStr::from_static("discount_pct"), discount_pcts).into_column(),
    ])
}

fn date_to_i32(date: NaiveDate) -> i32 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
    (date - epoch).num_days() as i32
}
