use eco_core::{Comparison, EcoSummary, Envelope};
use serde::Serialize;

type Extractor = (&'static str, fn(&EcoSummary) -> f64);

const EXTRACTORS: &[Extractor] = &[
    ("cash", |s| s.cash),
    ("eco", |s| s.eco),
    ("loan", |s| s.loan),
    ("farm_count", |s| f64::from(s.farm_count)),
    ("bank_balance", |s| s.bank_balance),
    ("boat_count", |s| f64::from(s.boat_count)),
    ("druid_count", |s| f64::from(s.druid_count)),
    ("supply_drop_count", |s| f64::from(s.supply_drop_count)),
    ("heli_count", |s| f64::from(s.heli_count)),
    ("farm_income", |s| s.farm_income),
    ("boat_income", |s| s.boat_income),
    ("total_revenue", |s| s.total_revenue),
    ("total_expenses", |s| s.total_expenses),
    ("warning_count", |s| f64::from(s.warning_count)),
];

#[derive(Debug, Serialize)]
pub struct StrategyRow {
    pub name: String,
    pub run_id: String,
    pub cash: f64,
    pub eco: f64,
    pub loan: f64,
    /// Farm plus boat income per round.
    pub income: f64,
    pub summary: EcoSummary,
}

/// Contents of `comparison.json`.
#[derive(Debug, Serialize)]
pub struct ComparisonReport {
    pub batch_schema_version: u32,
    pub batch_id: String,
    pub scenario_name: String,
    pub scenario_params: serde_json::Value,
    pub strategy_count: usize,
    pub best: Option<String>,
    pub envelope: Option<Envelope>,
    pub strategies: Vec<StrategyRow>,
    pub aggregated_metrics: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct MetricSummary {
    pub name: String,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub stddev: f64,
}

/// `run_ids` must line up with `comparison.outcomes`.
pub fn build_report(
    comparison: &Comparison,
    run_ids: &[String],
    batch_id: String,
    scenario_name: &str,
    scenario_params: &serde_json::Value,
) -> ComparisonReport {
    let strategies: Vec<StrategyRow> = comparison
        .outcomes
        .iter()
        .zip(run_ids)
        .map(|(outcome, run_id)| StrategyRow {
            name: outcome.name.clone(),
            run_id: run_id.clone(),
            cash: outcome.summary.cash,
            eco: outcome.summary.eco,
            loan: outcome.summary.loan,
            income: outcome.summary.farm_income + outcome.summary.boat_income,
            summary: outcome.summary.clone(),
        })
        .collect();
    let summaries: Vec<&EcoSummary> = comparison.outcomes.iter().map(|o| &o.summary).collect();

    ComparisonReport {
        batch_schema_version: 1,
        batch_id,
        scenario_name: scenario_name.to_string(),
        scenario_params: scenario_params.clone(),
        strategy_count: strategies.len(),
        best: comparison
            .best
            .map(|index| comparison.outcomes[index].name.clone()),
        envelope: comparison.envelope,
        strategies,
        aggregated_metrics: build_aggregated_metrics(&summaries),
    }
}

fn compute_metric_summary(name: &str, values: &[f64]) -> MetricSummary {
    let count = values.len() as f64;
    let mean = values.iter().sum::<f64>() / count;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count;
    let stddev = variance.sqrt();

    MetricSummary {
        name: name.to_string(),
        mean,
        min,
        max,
        stddev,
    }
}

/// Spread of each summary field across strategies:
/// `{ "key": { "mean": ..., "min": ..., "max": ..., "stddev": ... }, ... }`
pub fn build_aggregated_metrics(summaries: &[&EcoSummary]) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    if summaries.is_empty() {
        return serde_json::Value::Object(map);
    }
    for (name, extract) in EXTRACTORS {
        let values: Vec<f64> = summaries.iter().map(|s| extract(s)).collect();
        let summary = compute_metric_summary(name, &values);
        map.insert(
            (*name).to_string(),
            serde_json::json!({
                "mean": summary.mean,
                "min": summary.min,
                "max": summary.max,
                "stddev": summary.stddev,
            }),
        );
    }
    serde_json::Value::Object(map)
}

pub fn print_table(scenario_name: &str, target_round: f64, report: &ComparisonReport) {
    println!(
        "\n=== {} ({} strategies, to round {}) ===\n",
        scenario_name, report.strategy_count, target_round
    );
    println!(
        "{:<24} {:>10} {:>8} {:>8} {:>10} {:>6} {:>9}",
        "Strategy", "Cash", "Eco", "Loan", "Income", "Farms", "Warnings"
    );
    println!("{}", "-".repeat(81));
    for row in &report.strategies {
        let marker = if report.best.as_deref() == Some(row.name.as_str()) {
            " *"
        } else {
            ""
        };
        println!(
            "{:<24} {:>10.0} {:>8.1} {:>8.0} {:>10.0} {:>6} {:>9}{}",
            row.name,
            row.cash,
            row.eco,
            row.loan,
            row.income,
            row.summary.farm_count,
            row.summary.warning_count,
            marker
        );
    }
    if let Some(envelope) = report.envelope {
        println!(
            "\ncash range {:.0}..{:.0}, eco range {:.1}..{:.1}",
            envelope.cash_min, envelope.cash_max, envelope.eco_min, envelope.eco_max
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eco_core::compare::summarize;
    use eco_core::test_fixtures::{base_catalog, base_state};
    use eco_core::StrategyOutcome;

    fn make_summary(cash: f64, eco: f64, farm_count: u32) -> EcoSummary {
        EcoSummary {
            time: 300.0,
            round: 10,
            cash,
            eco,
            loan: 0.0,
            farm_count,
            bank_balance: 0.0,
            boat_count: 0,
            druid_count: 0,
            supply_drop_count: 0,
            heli_count: 0,
            farm_income: 100.0 * f64::from(farm_count),
            boat_income: 0.0,
            total_revenue: 0.0,
            total_expenses: 0.0,
            warning_count: 0,
        }
    }

    fn outcome(name: &str, summary: EcoSummary) -> StrategyOutcome {
        let catalog = base_catalog();
        let mut state = base_state(&catalog);
        state.trajectory.push(eco_core::TrajectorySample {
            time: summary.time,
            cash: summary.cash,
            eco: summary.eco,
        });
        StrategyOutcome {
            name: name.to_string(),
            summary,
            state,
        }
    }

    #[test]
    fn test_aggregated_metrics_values() {
        let a = make_summary(1000.0, 200.0, 4);
        let b = make_summary(3000.0, 400.0, 6);
        let agg = build_aggregated_metrics(&[&a, &b]);

        let farms = &agg["farm_count"];
        assert!((farms["mean"].as_f64().unwrap() - 5.0).abs() < 1e-9);
        assert!((farms["min"].as_f64().unwrap() - 4.0).abs() < 1e-9);
        assert!((farms["max"].as_f64().unwrap() - 6.0).abs() < 1e-9);
        assert!((agg["cash"]["stddev"].as_f64().unwrap() - 1000.0).abs() < 1e-9);
        assert_eq!(agg.as_object().unwrap().len(), EXTRACTORS.len());
    }

    #[test]
    fn test_stddev_zero_for_identical() {
        let a = make_summary(500.0, 50.0, 1);
        let b = make_summary(500.0, 50.0, 1);
        let agg = build_aggregated_metrics(&[&a, &b]);
        for (name, stats) in agg.as_object().unwrap() {
            let stddev = stats["stddev"].as_f64().unwrap();
            assert!(stddev.abs() < 1e-10, "stddev for {name} should be 0, got {stddev}");
        }
    }

    #[test]
    fn test_empty_aggregate_is_empty_object() {
        let agg = build_aggregated_metrics(&[]);
        assert!(agg.as_object().unwrap().is_empty());
    }

    #[test]
    fn test_report_names_the_best_strategy() {
        let comparison = summarize(vec![
            outcome("eco", make_summary(800.0, 600.0, 0)),
            outcome("farms", make_summary(2400.0, 250.0, 3)),
        ]);
        let run_ids = vec!["run-a".to_string(), "run-b".to_string()];
        let report = build_report(
            &comparison,
            &run_ids,
            "batch".to_string(),
            "test",
            &serde_json::json!({}),
        );

        assert_eq!(report.best.as_deref(), Some("farms"));
        assert_eq!(report.strategy_count, 2);
        assert_eq!(report.strategies[1].run_id, "run-b");
        assert!((report.strategies[1].income - 300.0).abs() < 1e-9);

        let envelope = report.envelope.unwrap();
        assert!((envelope.cash_min - 800.0).abs() < 1e-9);
        assert!((envelope.eco_max - 600.0).abs() < 1e-9);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["best"], "farms");
        assert_eq!(json["strategies"][0]["name"], "eco");
    }
}
