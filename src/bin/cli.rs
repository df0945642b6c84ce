use std::io::{self, Write};

use chrono::{Duration, NaiveDate};
use polars::prelude::{AnyValue, DataFrame};
use pricing_tool::calculations::{self, PlanCostSummary};
use pricing_tool::persistence::{
    self, export_catalog_items_csv, export_profile_breakdown_csv, export_tow_breakdown_csv,
};
use pricing_tool::report;
use pricing_tool::{BidPlan, RateCard};

fn render_df_as_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let format_value = |av: &AnyValue| -> String {
        match av {
            AnyValue::Null => String::new(),
            AnyValue::Int32(v) => v.to_string(),
            AnyValue::Int64(v) => v.to_string(),
            AnyValue::UInt32(v) => v.to_string(),
            AnyValue::Float64(v) => format!("{v:.2}"),
            AnyValue::String(s) => s.to_string(),
            AnyValue::Date(days) => {
                let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
                (epoch + Duration::days(*days as i64))
                    .format("%Y-%m-%d")
                    .to_string()
            }
            other => other.to_string(),
        }
    };

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.len()).collect();
    for (ci, col) in columns.iter().enumerate() {
        for row_idx in 0..df.height() {
            if let Ok(ref av) = col.get(row_idx) {
                let s = format_value(av);
                if s.len() > widths[ci] {
                    widths[ci] = s.len();
                }
            }
        }
    }

    let mut sep = String::new();
    sep.push('+');
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');

    out.push('|');
    for (i, name) in col_names.iter().enumerate() {
        out.push(' ');
        out.push_str(name);
        let pad = widths[i] - name.len();
        if pad > 0 {
            out.push_str(&" ".repeat(pad));
        }
        out.push(' ');
        out.push('|');
    }
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');

    for row_idx in 0..df.height() {
        out.push('|');
        for (ci, col) in columns.iter().enumerate() {
            let s = match col.get(row_idx) {
                Ok(ref av) => format_value(av),
                Err(_) => String::new(),
            };
            out.push(' ');
            out.push_str(&s);
            let pad = widths[ci].saturating_sub(s.len());
            if pad > 0 {
                out.push_str(&" ".repeat(pad));
            }
            out.push(' ');
            out.push('|');
        }
        out.push('\n');
    }

    out.push_str(&sep);
    out.push('\n');
    out
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  load <path.json>                   Load plan + rate card snapshot\n  save <path.json>                   Save plan + rate card snapshot\n  show                               Show the full cost summary\n  tows                               Team cost broken down by TOW\n  profiles                           Team cost broken down by delivery profile\n  intervals                          Per-member interval audit trail\n  catalog                            Catalog item pricing\n  scenarios                          Reuse/volume what-if scenarios\n  discount <target_margin_pct>       Discount that hits a target margin\n  export <tows|profiles|catalog> <path.csv>\n                                     Export a breakdown as CSV\n  quit|exit                          Exit"
    );
}

fn print_summary(summary: &PlanCostSummary) {
    println!("Team cost:        {:>14.2}", summary.costs.team);
    println!("Catalog cost:     {:>14.2}", summary.costs.catalog);
    println!("Governance cost:  {:>14.2}", summary.costs.governance);
    println!("Risk contingency: {:>14.2}", summary.costs.risk);
    println!("Subcontracting:   {:>14.2}", summary.costs.subcontract);
    println!("Total cost:       {:>14.2}", summary.costs.total);
    println!("Revenue:          {:>14.2}", summary.margin.revenue);
    println!(
        "Margin:           {:>14.2} ({:.2}%)",
        summary.margin.margin, summary.margin.margin_pct
    );
}

fn compute_or_report(plan: &BidPlan, card: &RateCard) -> Option<PlanCostSummary> {
    match calculations::compute_plan(plan, card) {
        Ok(summary) => Some(summary),
        Err(e) => {
            println!("Error: {e}");
            None
        }
    }
}

fn main() {
    let mut plan = BidPlan::default();
    let mut card = RateCard::new();

    println!("Pricing Tool (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        if stdin.read_line(&mut line).is_err() {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => {
                print_help();
            }
            "quit" | "exit" => break,
            "load" => match parts.next() {
                Some(path) => match persistence::load_plan_from_json(path) {
                    Ok((loaded_plan, loaded_card)) => {
                        plan = loaded_plan;
                        card = loaded_card;
                        println!(
                            "Loaded '{}' ({} members, {} TOWs).",
                            plan.metadata.tender_name,
                            plan.team.len(),
                            plan.tows.len()
                        );
                    }
                    Err(e) => println!("Error: {e}"),
                },
                None => println!("Usage: load <path.json>"),
            },
            "save" => match parts.next() {
                Some(path) => match persistence::save_plan_to_json(&plan, &card, path) {
                    Ok(()) => println!("Saved."),
                    Err(e) => println!("Error: {e}"),
                },
                None => println!("Usage: save <path.json>"),
            },
            "show" => {
                if let Some(summary) = compute_or_report(&plan, &card) {
                    print_summary(&summary);
                }
            }
            "tows" => {
                if let Some(summary) = compute_or_report(&plan, &card) {
                    match report::tow_breakdown_frame(&summary.team) {
                        Ok(df) => println!("{}", render_df_as_text_table(&df)),
                        Err(e) => println!("Error: {e}"),
                    }
                }
            }
            "profiles" => {
                if let Some(summary) = compute_or_report(&plan, &card) {
                    match report::profile_breakdown_frame(&summary.team) {
                        Ok(df) => println!("{}", render_df_as_text_table(&df)),
                        Err(e) => println!("Error: {e}"),
                    }
                }
            }
            "intervals" => {
                if let Some(summary) = compute_or_report(&plan, &card) {
                    match report::interval_frame(&summary.team, &plan.metadata) {
                        Ok(df) => println!("{}", render_df_as_text_table(&df)),
                        Err(e) => println!("Error: {e}"),
                    }
                }
            }
            "catalog" => {
                if let Some(summary) = compute_or_report(&plan, &card) {
                    match report::catalog_items_frame(&summary.catalog) {
                        Ok(df) => println!("{}", render_df_as_text_table(&df)),
                        Err(e) => println!("Error: {e}"),
                    }
                }
            }
            "scenarios" => {
                if let Some(summary) = compute_or_report(&plan, &card) {
                    let scenarios = calculations::totals::generate_scenarios(
                        &plan,
                        &card,
                        summary.catalog.total,
                    );
                    for scenario in scenarios {
                        println!(
                            "{:<18} reuse={:>5.1}% volume={:.2} total={:>14.2} margin={:.2}%",
                            scenario.name,
                            scenario.reuse_pct,
                            scenario.volume_factor,
                            scenario.total_cost,
                            scenario.margin.margin_pct
                        );
                    }
                }
            }
            "discount" => match parts.next().and_then(|s| s.parse::<f64>().ok()) {
                Some(target) => {
                    if let Some(summary) = compute_or_report(&plan, &card) {
                        let discount = calculations::totals::discount_for_margin(
                            plan.params.base_amount,
                            summary.costs.total,
                            target,
                            plan.params.rti_quota,
                        );
                        println!("Discount for {target:.2}% margin: {discount:.2}%");
                    }
                }
                None => println!("Usage: discount <target_margin_pct>"),
            },
            "export" => {
                let what = parts.next();
                let path = parts.next();
                match (what, path) {
                    (Some(what), Some(path)) => {
                        let Some(summary) = compute_or_report(&plan, &card) else {
                            continue;
                        };
                        let result = match what {
                            "tows" => export_tow_breakdown_csv(&summary.team, path),
                            "profiles" => export_profile_breakdown_csv(&summary.team, path),
                            "catalog" => export_catalog_items_csv(&summary.catalog, path),
                            other => {
                                println!("Unknown export target '{other}'");
                                continue;
                            }
                        };
                        match result {
                            Ok(()) => println!("Exported to {path}."),
                            Err(e) => println!("Error: {e}"),
                        }
                    }
                    _ => println!("Usage: export <tows|profiles|catalog> <path.csv>"),
                }
            }
            _ => {
                println!("Unknown command. Type 'help'.");
            }
        }
    }
}
