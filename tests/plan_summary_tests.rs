use pricing_tool::calculations::totals::generate_scenarios;
use pricing_tool::tow::{CatalogConfig, CatalogGroup, CatalogItem};
use pricing_tool::{
    BidPlan, GovernanceConfig, GovernanceMode, MixEntry, RateCard, RateMappingPeriod, TeamMember,
    Tow, TowKind, compute_plan,
};

fn card() -> RateCard {
    RateCard::new()
        .with_rate("apps:senior-dev", 400.0)
        .with_rate("apps:junior-dev", 200.0)
        .with_rate("apps:eng", 450.0)
}

/// A full bid: a delivery team, a catalog TOW and percentage governance.
fn full_plan() -> BidPlan {
    let mut plan = BidPlan::default();
    plan.params.duration_months = 12;
    plan.params.days_per_fte = 220.0;
    plan.params.reuse_pct = 10.0;
    plan.params.risk_contingency_pct = 3.0;
    plan.params.base_amount = 2_000_000.0;

    plan.tows.push(Tow::new("tow-a", "Development", TowKind::Task));
    plan.tows.push(Tow::new("tow-b", "Maintenance", TowKind::LumpSum));
    let mut catalog = Tow::new("cat", "Service catalog", TowKind::Catalog);
    catalog.catalog = Some(CatalogConfig {
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
    plan.tows.push(catalog);

    plan.team.push(
        TeamMember::new("dev", 1.0)
            .with_allocation("tow-a", 60.0)
            .with_allocation("tow-b", 40.0),
    );
    plan.profile_mappings.insert(
        "dev".to_string(),
        vec![RateMappingPeriod::new(
            1,
            12,
            vec![
                MixEntry::new("apps:senior-dev", 50.0),
                MixEntry::new("apps:junior-dev", 50.0),
            ],
        )],
    );

    plan.governance = GovernanceConfig {
        mode: GovernanceMode::Percentage,
        governance_pct: 5.0,
        apply_reuse: false,
    };
    plan
}

#[test]
fn full_pipeline_stacks_every_component() {
    let summary = compute_plan(&full_plan(), &card()).unwrap();

    assert_eq!(summary.costs.team, 59_400.0);
    assert_eq!(summary.costs.catalog, 990_000.0);
    // 5% of the 1,049,400 delivery base
    assert_eq!(summary.costs.governance, 52_470.0);
    // 3% risk over delivery + governance
    assert_eq!(summary.costs.risk, 33_056.1);
    assert_eq!(summary.costs.subcontract, 0.0);
    assert_eq!(summary.costs.total, 1_134_926.1);

    assert_eq!(summary.margin.revenue, 2_000_000.0);
    assert_eq!(summary.margin.margin, 865_073.9);
    assert_eq!(summary.margin.margin_pct, 43.25);
}

#[test]
fn invalid_plan_is_rejected_before_computation() {
    let mut plan = full_plan();
    plan.params.duration_months = 0;
    assert!(compute_plan(&plan, &card()).is_err());
}

#[test]
fn summary_serializes_to_json() {
    let summary = compute_plan(&full_plan(), &card()).unwrap();
    let json = serde_json::to_string(&summary).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["costs"]["team"], 59_400.0);
    assert_eq!(value["governance"]["explanation"]["method"], "percent_of_base");
}

#[test]
fn scenarios_shift_reuse_and_volume_but_not_catalog() {
    let plan = full_plan();
    let card = card();
    let summary = compute_plan(&plan, &card).unwrap();
    let scenarios = generate_scenarios(&plan, &card, summary.catalog.total);

    assert_eq!(scenarios.len(), 3);
    assert_eq!(scenarios[0].name, "Current/Balanced");
    assert_eq!(scenarios[1].name, "Conservative");
    assert_eq!(scenarios[2].name, "Aggressive");

    assert_eq!(scenarios[0].reuse_pct, 10.0);
    assert_eq!(scenarios[1].reuse_pct, 5.0);
    assert_eq!(scenarios[1].volume_factor, 1.05);
    assert_eq!(scenarios[2].reuse_pct, 15.0);
    assert_eq!(scenarios[2].volume_factor, 0.95);

    // Less reuse and more volume always cost more
    assert!(scenarios[1].total_cost > scenarios[0].total_cost);
    assert!(scenarios[2].total_cost < scenarios[0].total_cost);

    // The current scenario reproduces the plan's own cost stack
    assert_eq!(scenarios[0].total_cost, summary.costs.total);
}

#[test]
fn scenario_shifts_are_clamped() {
    let mut plan = full_plan();
    plan.params.reuse_pct = 78.0;
    plan.adjustments.global = 1.48;
    let card = card();
    let summary = compute_plan(&plan, &card).unwrap();
    let scenarios = generate_scenarios(&plan, &card, summary.catalog.total);

    assert_eq!(scenarios[2].reuse_pct, 80.0);
    assert_eq!(scenarios[1].volume_factor, 1.5);
}
