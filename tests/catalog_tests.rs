use pricing_tool::calculations::catalog::compute_catalog_cost;
use pricing_tool::tow::{
    CatalogConfig, CatalogGroup, CatalogItem, Cluster, ClusterConstraint,
};
use pricing_tool::{MixEntry, PlanParams, RateCard, Tow, TowKind};

fn card() -> RateCard {
    RateCard::new()
        .with_rate("apps:eng", 450.0)
        .with_rate("apps:arch", 600.0)
}

fn params() -> PlanParams {
    PlanParams {
        duration_months: 12,
        days_per_fte: 220.0,
        ..PlanParams::default()
    }
}

fn single_item_catalog() -> CatalogConfig {
    CatalogConfig {
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
    }
}

fn catalog_tow(config: CatalogConfig) -> Tow {
    let mut tow = Tow::new("cat", "Service catalog", TowKind::Catalog);
    tow.catalog = Some(config);
    tow
}

#[test]
fn single_item_margin_first_pricing() {
    let tows = vec![catalog_tow(single_item_catalog())];
    let result = compute_catalog_cost(&tows, &card(), &params());

    assert_eq!(result.total, 990_000.0);
    let tow = &result.by_tow[0];
    assert_eq!(tow.cost, 990_000.0);
    assert_eq!(tow.sell_price, 1_237_500.0);
    assert_eq!(tow.margin, 247_500.0);
    assert_eq!(tow.margin_pct, 20.0);

    let item = &tow.items[0];
    assert_eq!(item.fte, 10.0);
    assert_eq!(item.cost, 990_000.0);
    assert_eq!(item.sell_price, 1_237_500.0);
    assert_eq!(item.effective_margin_pct, 20.0);
    assert_eq!(item.poste_total, 1_000_000.0);
    assert_eq!(item.unit_price, 1_237.5);

    assert!(tow.fte_ok);
    assert!(tow.target_value_ok);
    assert!(tow.groups[0].group_pct_ok);
}

#[test]
fn group_fte_derives_from_its_value_share() {
    // The group covers half the catalog value, so it owns half the FTE
    let mut config = single_item_catalog();
    config.groups[0].target_value = 500_000.0;
    config.items[0].profile_mix = vec![MixEntry::new("apps:ops", 100.0)];
    let card = RateCard::new().with_rate("apps:ops", 300.0);
    let mut params = params();
    params.duration_months = 36;

    let result = compute_catalog_cost(&[catalog_tow(config)], &card, &params);
    let item = &result.by_tow[0].items[0];
    assert_eq!(item.fte, 5.0);
    assert_eq!(item.cost, 990_000.0);
    assert_eq!(item.sell_price, 1_237_500.0);
}

#[test]
fn item_margin_override_beats_catalog_default() {
    let mut config = single_item_catalog();
    config.items[0].target_margin_pct = Some(50.0);
    let tows = vec![catalog_tow(config)];
    let result = compute_catalog_cost(&tows, &card(), &params());
    assert_eq!(result.by_tow[0].items[0].sell_price, 1_980_000.0);
}

#[test]
fn group_reuse_factor_shrinks_the_fte_budget() {
    let mut config = single_item_catalog();
    config.groups[0].reuse_factor = Some(0.2);
    let tows = vec![catalog_tow(config)];
    let result = compute_catalog_cost(&tows, &card(), &params());
    let item = &result.by_tow[0].items[0];
    assert_eq!(item.fte, 8.0);
    assert_eq!(item.cost, 792_000.0);
}

#[test]
fn tender_discount_scales_reference_figures_only() {
    let undiscounted = compute_catalog_cost(
        &[catalog_tow(single_item_catalog())],
        &card(),
        &params(),
    );
    let mut config = single_item_catalog();
    config.tender_discount_pct = 10.0;
    let discounted = compute_catalog_cost(&[catalog_tow(config)], &card(), &params());

    let before = &undiscounted.by_tow[0].items[0];
    let after = &discounted.by_tow[0].items[0];

    assert_eq!(after.cost, before.cost);
    assert_eq!(after.sell_price, before.sell_price);
    // The discount cancels in the unit-price ratio
    assert_eq!(after.unit_price, before.unit_price);
    assert_eq!(after.poste_total, 900_000.0);
    assert_eq!(after.price_base, 900.0);
    assert!(after.discount_pct != before.discount_pct);
}

#[test]
fn fte_and_value_discrepancies_are_flagged_not_fatal() {
    let mut config = single_item_catalog();
    // The only group covers half the declared catalog value
    config.groups[0].target_value = 500_000.0;
    let result = compute_catalog_cost(&[catalog_tow(config)], &card(), &params());

    let tow = &result.by_tow[0];
    assert_eq!(tow.derived_fte, 5.0);
    assert_eq!(tow.declared_fte, 10.0);
    assert!(!tow.fte_ok);
    assert!(!tow.target_value_ok);
    assert_eq!(tow.cost, 495_000.0);
}

#[test]
fn incomplete_group_percentages_are_flagged() {
    let mut config = single_item_catalog();
    config.items[0].group_pct = 90.0;
    let result = compute_catalog_cost(&[catalog_tow(config)], &card(), &params());
    let group = &result.by_tow[0].groups[0];
    assert_eq!(group.group_pct_sum, 90.0);
    assert!(!group.group_pct_ok);
}

#[test]
fn cluster_constraints_check_the_weighted_mix() {
    let mut config = single_item_catalog();
    config.items[0].profile_mix = vec![
        MixEntry::new("apps:eng", 60.0),
        MixEntry::new("apps:arch", 40.0),
    ];
    config.clusters = vec![
        Cluster {
            id: "c-eng".to_string(),
            label: "Engineering".to_string(),
            required_pct: 50.0,
            constraint: ClusterConstraint::Minimum,
            profiles: vec!["apps:eng".to_string()],
        },
        Cluster {
            id: "c-eng-cap".to_string(),
            label: "Engineering cap".to_string(),
            required_pct: 50.0,
            constraint: ClusterConstraint::Maximum,
            profiles: vec!["apps:eng".to_string()],
        },
        Cluster {
            id: "c-arch".to_string(),
            label: "Architecture".to_string(),
            required_pct: 41.0,
            constraint: ClusterConstraint::Equality,
            profiles: vec!["apps:arch".to_string()],
        },
    ];
    let result = compute_catalog_cost(&[catalog_tow(config)], &card(), &params());
    let clusters = &result.by_tow[0].clusters;

    assert_eq!(clusters[0].actual_pct, 60.0);
    assert!(clusters[0].ok);
    assert!(!clusters[1].ok);
    // 40 is within the 2-point equality tolerance of 41
    assert!(clusters[2].ok);
}

#[test]
fn non_catalog_tows_are_ignored() {
    let tows = vec![
        Tow::new("t1", "Development", TowKind::Task),
        Tow::new("cat-empty", "No config", TowKind::Catalog),
    ];
    let result = compute_catalog_cost(&tows, &card(), &params());
    assert_eq!(result.total, 0.0);
    assert!(result.by_tow.is_empty());
}
