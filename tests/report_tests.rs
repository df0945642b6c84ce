use chrono::NaiveDate;
use polars::prelude::DataType;
use pricing_tool::calculations::catalog::compute_catalog_cost;
use pricing_tool::calculations::team_cost::compute_team_cost;
use pricing_tool::report;
use pricing_tool::tow::{CatalogConfig, CatalogGroup, CatalogItem};
use pricing_tool::{
    BidPlan, MixEntry, RateCard, RateMappingPeriod, TeamMember, Tow, TowKind,
};

fn sample() -> (BidPlan, RateCard) {
    let mut plan = BidPlan::default();
    plan.metadata.contract_start = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
    plan.params.duration_months = 12;
    plan.tows
        .push(Tow::new("tow-a", "Development", TowKind::Task));
    plan.team
        .push(TeamMember::new("dev", 1.0).with_allocation("tow-a", 100.0));
    plan.profile_mappings.insert(
        "dev".to_string(),
        vec![RateMappingPeriod::new(
            1,
            12,
            vec![MixEntry::new("apps:dev", 100.0)],
        )],
    );
    (plan, RateCard::new().with_rate("apps:dev", 300.0))
}

#[test]
fn tow_breakdown_frame_has_one_row_per_tow() {
    let (plan, card) = sample();
    let result = compute_team_cost(&plan, &card);
    let df = report::tow_breakdown_frame(&result).unwrap();

    assert_eq!(df.height(), 1);
    let cost = df.column("cost").unwrap().f64().unwrap();
    assert_eq!(cost.get(0), Some(66_000.0));
    let label = df.column("label").unwrap().str().unwrap();
    assert_eq!(label.get(0), Some("Development"));
}

#[test]
fn profile_breakdown_frame_carries_rates() {
    let (plan, card) = sample();
    let result = compute_team_cost(&plan, &card);
    let df = report::profile_breakdown_frame(&result).unwrap();

    assert_eq!(df.height(), 1);
    let rate = df.column("rate").unwrap().f64().unwrap();
    assert_eq!(rate.get(0), Some(300.0));
}

#[test]
fn interval_frame_resolves_calendar_dates() {
    let (plan, card) = sample();
    let result = compute_team_cost(&plan, &card);
    let df = report::interval_frame(&result, &plan.metadata).unwrap();

    assert_eq!(df.height(), 1);
    assert_eq!(df.column("start_date").unwrap().dtype(), &DataType::Date);
    let month_start = df.column("month_start").unwrap().u32().unwrap();
    assert_eq!(month_start.get(0), Some(1));
}

#[test]
fn catalog_items_frame_flattens_tows() {
    let (mut plan, card) = sample();
    let card = card.with_rate("apps:eng", 450.0);
    let mut tow = Tow::new("cat", "Service catalog", TowKind::Catalog);
    tow.catalog = Some(CatalogConfig {
        total_fte: 10.0,
        total_catalog_value: 1_000_000.0,
        target_margin_pct: 20.0,
        catalog_reuse_factor: 0.0,
        tender_discount_pct: 0.0,
        groups: vec![CatalogGroup {
            id: "g1".to_string(),
            label: "Platform services".to_string(),
            target_value: 1_000_000.0,
            reuse_factor: None,
            item_ids: vec!["i1".to_string()],
        }],
        items: vec![CatalogItem {
            id: "i1".to_string(),
            label: "Provisioning".to_string(),
            price_base: 1_000.0,
            profile_mix: vec![MixEntry::new("apps:eng", 100.0)],
            group_pct: 100.0,
            target_margin_pct: None,
        }],
        clusters: Vec::new(),
    });
    plan.tows.push(tow);

    let result = compute_catalog_cost(&plan.tows, &card, &plan.params);
    let df = report::catalog_items_frame(&result).unwrap();

    assert_eq!(df.height(), 1);
    let sell = df.column("sell_price").unwrap().f64().unwrap();
    assert_eq!(sell.get(0), Some(1_237_500.0));
}
