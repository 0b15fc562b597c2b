//! # Price Policy Evaluation
//!
//! A pricing policy changed for one product category on 2022-08-23 at 22:00.
//! This demo estimates its effect two ways:
//!
//! - a difference-in-differences model (treated category vs. the rest, before
//!   vs. after the change)
//! - a quarterly event study with 2022Q2 as the reference quarter, drawn as a
//!   coefficient plot
//!
//! Run with: `RUST_LOG=causal_tools=debug cargo run --example price_policy`

use causal_tools::prelude::*;
use polars::prelude::*;
use tracing_subscriber::EnvFilter;

const CUTOFF: &str = "2022-08-23 22:00:00";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Price Policy Evaluation ===\n");

    let df = listings();
    println!("{df}\n");

    difference_in_differences(&df);
    event_study(&df);
}

/// Synthetic listings: the treated "tertiary" category gains 12 CHF after the cutoff.
fn listings() -> DataFrame {
    let times = [
        ("2021-11-03 09:12:00", 0.0),
        ("2022-01-20 14:30:00", 0.0),
        ("2022-02-11 08:00:00", 0.0),
        ("2022-04-29 17:45:00", 0.0),
        ("2022-06-07 11:05:00", 0.0),
        ("2022-08-01 19:20:00", 0.0),
        ("2022-09-14 10:00:00", 12.0),
        ("2022-10-02 16:40:00", 12.0),
        ("2022-12-19 07:55:00", 12.0),
    ];
    let categories = ["primary", "secondary", "tertiary"];

    let mut price = Vec::new();
    let mut category = Vec::new();
    let mut start_time = Vec::new();
    let mut rooms = Vec::new();
    for (k, (time, effect)) in times.iter().enumerate() {
        for (c, name) in categories.iter().enumerate() {
            for r in 1..=3 {
                let wobble = (((k * 7 + c * 3 + r) % 5) as f64 - 2.0) * 0.8;
                let treated = if *name == "tertiary" { *effect } else { 0.0 };
                price.push(80.0 + 5.0 * c as f64 + 1.5 * k as f64 + 9.0 * r as f64 + treated + wobble);
                category.push(*name);
                start_time.push(*time);
                rooms.push(r as f64);
            }
        }
    }

    df! {
        "price" => price,
        "category" => category,
        "start_time" => start_time,
        "rooms" => rooms,
    }
    .expect("columns have equal length")
}

fn difference_in_differences(df: &DataFrame) {
    println!("--- Difference-in-Differences ---\n");

    for hc3 in [true, false] {
        let model = DidEstimator::builder()
            .outcome("price")
            .treatment_column("category")
            .time_column("start_time")
            .treated_value("tertiary")
            .cutoff(CUTOFF)
            .controls(["rooms"])
            .hc3_se(hc3)
            .build()
            .expect("valid settings")
            .fit(df)
            .expect("fit should succeed");

        println!("{model}");
        if let Some(effect) = model.coefficient("post_treat") {
            println!(
                "Policy effect: {:.2} CHF (95% CI {:.2} to {:.2})\n",
                effect.estimate, effect.conf_low, effect.conf_high
            );
        }
    }
}

fn event_study(df: &DataFrame) {
    println!("--- Quarterly Event Study ---\n");

    let study = EventStudyEstimator::builder()
        .outcome("price")
        .treatment_column("category")
        .time_column("start_time")
        .treated_value("tertiary")
        .baseline("20222")
        .controls(["rooms"])
        .build()
        .expect("valid settings")
        .fit(df)
        .expect("fit should succeed");

    println!("{}", study.model);
    println!(
        "Quarters: {}",
        study
            .quarters
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );

    let chart = CoefPlot::builder()
        .prefix("inter")
        .tick_labels(study.tick_labels())
        .x_label("quarter")
        .y_label("price CHF")
        .build()
        .chart(&study.model)
        .expect("tick labels match the interactions");

    let path = std::env::temp_dir().join("price_policy_event_study.svg");
    std::fs::write(&path, chart.to_svg().expect("svg renders")).expect("write svg");
    println!("\nCoefficient plot written to {}", path.display());
}
