use super::PersistenceResult;
use crate::calculations::catalog::CatalogResult;
use crate::calculations::team_cost::TeamCostResult;
use crate::plan::BidPlan;
use crate::rates::RateCard;
use crate::validation::validate_plan;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// On-disk unit: the plan together with the rate card it prices against.
#[derive(Serialize, Deserialize)]
struct PlanSnapshot {
    plan: BidPlan,
    rate_card: RateCard,
}

pub fn save_plan_to_json<P: AsRef<Path>>(
    plan: &BidPlan,
    card: &RateCard,
    path: P,
) -> PersistenceResult<()> {
    validate_plan(plan)?;
    let snapshot = PlanSnapshot {
        plan: plan.clone(),
        rate_card: card.clone(),
    };
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    Ok(())
}

pub fn load_plan_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<(BidPlan, RateCard)> {
    let file = File::open(path)?;
    let snapshot: PlanSnapshot = serde_json::from_reader(file)?;
    validate_plan(&snapshot.plan)?;
    Ok((snapshot.plan, snapshot.rate_card))
}

#[derive(Serialize)]
struct TowCsvRecord<'a> {
    tow_id: &'a str,
    label: &'a str,
    cost: f64,
    days: f64,
    days_base: f64,
    days_raw: f64,
}

pub fn export_tow_breakdown_csv<P: AsRef<Path>>(
    result: &TeamCostResult,
    path: P,
) -> PersistenceResult<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for (tow_id, bucket) in &result.by_tow {
        writer.serialize(TowCsvRecord {
            tow_id,
            label: &bucket.label,
            cost: bucket.cost,
            days: bucket.days,
            days_base: bucket.days_base,
            days_raw: bucket.days_raw,
        })?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct ProfileCsvRecord<'a> {
    profile: &'a str,
    label: &'a str,
    practice: &'a str,
    rate: f64,
    cost: f64,
    days: f64,
}

pub fn export_profile_breakdown_csv<P: AsRef<Path>>(
    result: &TeamCostResult,
    path: P,
) -> PersistenceResult<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for (key, bucket) in &result.by_profile {
        writer.serialize(ProfileCsvRecord {
            profile: key,
            label: &bucket.label,
            practice: &bucket.practice,
            rate: bucket.rate,
            cost: bucket.cost,
            days: bucket.days,
        })?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct CatalogItemCsvRecord<'a> {
    tow_id: &'a str,
    item_id: &'a str,
    label: &'a str,
    fte: f64,
    cost: f64,
    sell_price: f64,
    margin: f64,
    margin_pct: f64,
    unit_price: f64,
    discount_pct: f64,
}

pub fn export_catalog_items_csv<P: AsRef<Path>>(
    result: &CatalogResult,
    path: P,
) -> PersistenceResult<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for tow in &result.by_tow {
        for item in &tow.items {
            writer.serialize(CatalogItemCsvRecord {
                tow_id: &tow.tow_id,
                item_id: &item.id,
                label: &item.label,
                fte: item.fte,
                cost: item.cost,
                sell_price: item.sell_price,
                margin: item.margin,
                margin_pct: item.effective_margin_pct,
                unit_price: item.unit_price,
                discount_pct: item.discount_pct,
            })?;
        }
    }
    writer.flush()?;
    Ok(())
}
