use crate::calculations::{num, round2};
use crate::plan::PlanParams;
use crate::rates::{RateCard, blended_mix_rate};
use crate::tow::{CatalogConfig, ClusterConstraint, Tow, TowKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Tolerance on percentage sums before the discrepancy is flagged.
const PCT_TOLERANCE: f64 = 0.1;
/// Derived total FTE may drift this far (percent) from the declared FTE.
const FTE_TOLERANCE_PCT: f64 = 5.0;
/// Equality clusters tolerate this many percentage points of drift.
const CLUSTER_TOLERANCE_PTS: f64 = 2.0;
/// Monetary tolerance on the group target-value sum.
const VALUE_TOLERANCE: f64 = 0.5;
/// Margins above ~99.9% would divide by nearly zero; price at cost instead.
const MIN_MARGIN_FACTOR: f64 = 0.001;

/// A priced catalog deliverable with its derived figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItemDetail {
    pub id: String,
    pub label: String,
    /// Tender reference unit price after the tender discount.
    pub price_base: f64,
    pub group_pct: f64,
    /// Reference value assigned to this item (post tender discount).
    pub poste_total: f64,
    pub fte: f64,
    pub cost: f64,
    pub sell_price: f64,
    pub margin: f64,
    pub effective_margin_pct: f64,
    /// Implied unit price at the computed sell price.
    pub unit_price: f64,
    /// Implied discount versus the reference unit price.
    pub discount_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogGroupDetail {
    pub id: String,
    pub label: String,
    pub target_value: f64,
    pub fte: f64,
    pub cost: f64,
    pub sell_price: f64,
    pub margin: f64,
    /// Sum of member items' group_pct; should be 100.
    pub group_pct_sum: f64,
    pub group_pct_ok: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterCheck {
    pub id: String,
    pub label: String,
    pub required_pct: f64,
    pub constraint: ClusterConstraint,
    pub actual_pct: f64,
    pub ok: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogTowDetail {
    pub tow_id: String,
    pub label: String,
    pub cost: f64,
    pub sell_price: f64,
    pub margin: f64,
    pub margin_pct: f64,
    /// Total FTE derived from the allocation hierarchy.
    pub derived_fte: f64,
    pub declared_fte: f64,
    pub fte_ok: bool,
    /// Sum of group target values; should equal the declared catalog value.
    pub target_value_sum: f64,
    pub target_value_ok: bool,
    pub items: Vec<CatalogItemDetail>,
    pub groups: Vec<CatalogGroupDetail>,
    pub clusters: Vec<ClusterCheck>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogResult {
    pub total: f64,
    pub by_tow: Vec<CatalogTowDetail>,
}

struct ItemFigures {
    fte: f64,
    cost: f64,
    sell_price: f64,
}

fn price_item(
    item: &crate::tow::CatalogItem,
    catalog: &CatalogConfig,
    group: Option<&crate::tow::CatalogGroup>,
    card: &RateCard,
    params: &PlanParams,
) -> (ItemFigures, CatalogItemDetail) {
    let group_target = group.map(|g| num(g.target_value)).unwrap_or(0.0);
    let group_fte = if catalog.total_catalog_value > 0.0 && group_target > 0.0 {
        (group_target / catalog.total_catalog_value) * num(catalog.total_fte)
    } else {
        0.0
    };
    let group_reuse = group
        .and_then(|g| g.reuse_factor)
        .unwrap_or(catalog.catalog_reuse_factor);
    let effective_group_fte = group_fte * (1.0 - group_reuse);

    let group_pct = num(item.group_pct);
    let fte = effective_group_fte * group_pct / 100.0;

    // Catalog rates are not inflation-escalated; escalation applies to the
    // standard team only.
    let rate = blended_mix_rate(card, &item.profile_mix, params.default_daily_rate);
    let cost = fte * rate * params.duration_years() * params.days_per_fte;

    let effective_margin_pct = item
        .target_margin_pct
        .unwrap_or(catalog.target_margin_pct);
    let margin_factor = 1.0 - effective_margin_pct / 100.0;
    let sell_price = if margin_factor > MIN_MARGIN_FACTOR {
        cost / margin_factor
    } else {
        cost
    };

    // Tender discount scales the reference figures only; it cancels in the
    // unit-price ratio and never touches cost or sell price.
    let discount_factor = 1.0 - catalog.tender_discount_pct / 100.0;
    let effective_price_base = num(item.price_base) * discount_factor;
    let effective_group_target = group_target * discount_factor;
    let poste_total = effective_group_target * group_pct / 100.0;
    let unit_price = if poste_total > 0.0 && effective_price_base > 0.0 {
        (sell_price / poste_total) * effective_price_base
    } else {
        0.0
    };
    let discount_pct = if effective_price_base > 0.0 && unit_price > 0.0 {
        (1.0 - unit_price / effective_price_base) * 100.0
    } else {
        0.0
    };

    let figures = ItemFigures {
        fte,
        cost,
        sell_price,
    };
    let detail = CatalogItemDetail {
        id: item.id.clone(),
        label: item.label.clone(),
        price_base: round2(effective_price_base),
        group_pct,
        poste_total: round2(poste_total),
        fte: round2(fte),
        cost: round2(cost),
        sell_price: round2(sell_price),
        margin: round2(sell_price - cost),
        effective_margin_pct,
        unit_price: round2(unit_price),
        discount_pct: round2(discount_pct),
    };
    (figures, detail)
}

fn cluster_checks(
    catalog: &CatalogConfig,
    item_ftes: &[f64],
) -> Vec<ClusterCheck> {
    if catalog.clusters.is_empty() {
        return Vec::new();
    }
    let mut profile_to_cluster: HashMap<&str, &str> = HashMap::new();
    for cluster in &catalog.clusters {
        for profile in &cluster.profiles {
            profile_to_cluster.insert(profile.as_str(), cluster.id.as_str());
        }
    }

    let total_fte: f64 = item_ftes.iter().sum();
    let mut accumulated: HashMap<&str, f64> = HashMap::new();
    if total_fte > 0.0 {
        for (item, fte) in catalog.items.iter().zip(item_ftes) {
            let weight = fte / total_fte;
            for entry in &item.profile_mix {
                if let Some(cluster_id) = profile_to_cluster.get(entry.profile.as_str()) {
                    *accumulated.entry(cluster_id).or_insert(0.0) += weight * num(entry.pct);
                }
            }
        }
    }

    catalog
        .clusters
        .iter()
        .map(|cluster| {
            let actual_pct = accumulated.get(cluster.id.as_str()).copied().unwrap_or(0.0);
            let required = num(cluster.required_pct);
            let ok = match cluster.constraint {
                ClusterConstraint::Maximum => actual_pct <= required,
                ClusterConstraint::Minimum => actual_pct >= required,
                ClusterConstraint::Equality => {
                    (actual_pct - required).abs() <= CLUSTER_TOLERANCE_PTS
                }
            };
            ClusterCheck {
                id: cluster.id.clone(),
                label: cluster.label.clone(),
                required_pct: required,
                constraint: cluster.constraint,
                actual_pct: round2(actual_pct),
                ok,
            }
        })
        .collect()
}

fn price_catalog_tow(
    tow: &Tow,
    catalog: &CatalogConfig,
    card: &RateCard,
    params: &PlanParams,
) -> CatalogTowDetail {
    let item_group: HashMap<&str, &crate::tow::CatalogGroup> = catalog
        .groups
        .iter()
        .flat_map(|g| g.item_ids.iter().map(move |id| (id.as_str(), g)))
        .collect();

    let mut tow_cost = 0.0;
    let mut tow_sell = 0.0;
    let mut item_details = Vec::with_capacity(catalog.items.len());
    let mut item_ftes = Vec::with_capacity(catalog.items.len());
    let mut derived_fte = 0.0;

    for item in &catalog.items {
        let group = item_group.get(item.id.as_str()).copied();
        let (figures, detail) = price_item(item, catalog, group, card, params);
        tow_cost += figures.cost;
        tow_sell += figures.sell_price;
        derived_fte += figures.fte;
        item_ftes.push(figures.fte);
        item_details.push(detail);
    }

    let groups = catalog
        .groups
        .iter()
        .map(|group| {
            let mut fte = 0.0;
            let mut cost = 0.0;
            let mut sell = 0.0;
            let mut pct_sum = 0.0;
            for (item, (figures_fte, detail)) in catalog
                .items
                .iter()
                .zip(item_ftes.iter().zip(&item_details))
            {
                if group.item_ids.contains(&item.id) {
                    fte += *figures_fte;
                    cost += detail.cost;
                    sell += detail.sell_price;
                    pct_sum += detail.group_pct;
                }
            }
            CatalogGroupDetail {
                id: group.id.clone(),
                label: group.label.clone(),
                target_value: num(group.target_value),
                fte: round2(fte),
                cost: round2(cost),
                sell_price: round2(sell),
                margin: round2(sell - cost),
                group_pct_sum: round2(pct_sum),
                group_pct_ok: (pct_sum - 100.0).abs() <= PCT_TOLERANCE,
            }
        })
        .collect();

    let clusters = cluster_checks(catalog, &item_ftes);

    let target_value_sum: f64 = catalog.groups.iter().map(|g| num(g.target_value)).sum();
    let declared_fte = num(catalog.total_fte);
    let fte_ok = if declared_fte > 0.0 {
        (derived_fte - declared_fte).abs() / declared_fte * 100.0 <= FTE_TOLERANCE_PCT
    } else {
        derived_fte == 0.0
    };

    let margin = tow_sell - tow_cost;
    CatalogTowDetail {
        tow_id: tow.id.clone(),
        label: tow.label.clone(),
        cost: round2(tow_cost),
        sell_price: round2(tow_sell),
        margin: round2(margin),
        margin_pct: if tow_sell > 0.0 {
            round2(margin / tow_sell * 100.0)
        } else {
            0.0
        },
        derived_fte: round2(derived_fte),
        declared_fte,
        fte_ok,
        target_value_sum: round2(target_value_sum),
        target_value_ok: (target_value_sum - catalog.total_catalog_value).abs() <= VALUE_TOLERANCE,
        items: item_details,
        groups,
        clusters,
    }
}

/// Prices every catalog TOW margin-first: per-item FTE and cost derived
/// top-down from the group -> item percentage hierarchy, sell price derived
/// from cost and the target margin.
pub fn compute_catalog_cost(tows: &[Tow], card: &RateCard, params: &PlanParams) -> CatalogResult {
    let mut result = CatalogResult::default();
    let mut total = 0.0;
    for tow in tows {
        if tow.kind != TowKind::Catalog {
            continue;
        }
        let Some(catalog) = &tow.catalog else {
            continue;
        };
        let detail = price_catalog_tow(tow, catalog, card, params);
        total += detail.cost;
        result.by_tow.push(detail);
    }
    result.total = round2(total);
    result
}
