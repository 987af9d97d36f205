//! End-to-end pipeline tests: synthetic data through preprocessing, model
//! fit/predict, analysis, export, and report generation.

use chrono::{NaiveDate, Utc};
use costcast_core::export::JsonExport;
use costcast_core::provider::synthetic::{self, SyntheticConfig};
use costcast_core::{
    build_report, export_forecast_to_csv, export_forecast_to_json, CostModel, CostSeries,
    DataSource, ForecastAnalysis, ModelConfig, ReportMeta,
};

fn sample_config() -> SyntheticConfig {
    SyntheticConfig {
        end_date: NaiveDate::from_ymd_opt(2026, 8, 7).unwrap(),
        ..SyntheticConfig::default()
    }
}

fn run_pipeline(horizon: usize) -> (CostSeries, costcast_core::ForecastOutcome) {
    let raw = synthetic::generate(&sample_config()).unwrap();
    let series = CostSeries::from_raw(raw).unwrap();
    let model = CostModel::new(ModelConfig::default()).unwrap();
    let outcome = model.fit(&series).unwrap().predict(horizon).unwrap();
    (series, outcome)
}

#[test]
fn test_end_to_end_json_export() {
    let (_, outcome) = run_pipeline(30);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("aws_cost_forecast.json");

    export_forecast_to_json(
        outcome.future(),
        30,
        outcome.interval_width(),
        Utc::now(),
        &path,
    )
    .unwrap();

    let parsed: JsonExport =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

    assert_eq!(parsed.forecast.len(), 30, "one record per forecast day");
    assert_eq!(parsed.metadata.forecast_days, 30);
    assert_eq!(parsed.metadata.confidence_level, 0.95);
    for record in &parsed.forecast {
        assert!(record.ds.len() == 10, "ds should be YYYY-MM-DD");
        assert!(record.yhat_lower <= record.yhat);
        assert!(record.yhat <= record.yhat_upper);
    }
}

#[test]
fn test_end_to_end_csv_export() {
    let (_, outcome) = run_pipeline(14);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("aws_cost_forecast.csv");

    export_forecast_to_csv(outcome.future(), &path).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines[0], "ds,yhat,yhat_lower,yhat_upper");
    assert_eq!(lines.len(), 15, "header plus one row per forecast day");

    for (line, point) in lines[1..].iter().zip(outcome.future()) {
        let fields: Vec<&str> = line.split(',').collect();
        assert_eq!(fields[0], point.date.format("%Y-%m-%d").to_string());
        assert!((fields[1].parse::<f64>().unwrap() - point.point).abs() < 1e-9);
    }
}

#[test]
fn test_forecast_window_follows_history() {
    let (series, outcome) = run_pipeline(180);

    assert_eq!(series.len(), 365);
    assert_eq!(outcome.future().len(), 180);
    assert!(outcome
        .future()
        .iter()
        .all(|p| p.date > series.last_date()));
    assert!(outcome
        .points()
        .iter()
        .all(|p| p.lower <= p.point && p.point <= p.upper));
}

#[test]
fn test_synthetic_forecast_is_plausible() {
    // The sample series sits between 500 and ~800; a six-month forecast
    // should stay in the same neighborhood.
    let (series, outcome) = run_pipeline(180);
    let analysis = ForecastAnalysis::compute(&series, outcome.future());

    assert!(analysis.current_daily_avg > 600.0 && analysis.current_daily_avg < 850.0);
    assert!(analysis.forecast_daily_avg > 500.0 && analysis.forecast_daily_avg < 1000.0);
    assert!(analysis.change_rate.abs() < 50.0);
    assert!(analysis.avg_upper_margin >= 0.0);
    assert!(analysis.avg_lower_margin >= 0.0);
}

#[test]
fn test_report_contains_all_sections() {
    let (series, outcome) = run_pipeline(60);
    let analysis = ForecastAnalysis::compute(&series, outcome.future());
    let meta = ReportMeta {
        generated_at: chrono::Local::now(),
        source: DataSource::Synthetic,
    };

    let report = build_report(&series, &outcome, &analysis, &meta);

    assert!(report.contains("# AWS Cost Forecast Report"));
    assert!(report.contains("## Run Information"));
    assert!(report.contains("## Key Metrics"));
    assert!(report.contains("## Monthly Forecast"));
    assert!(report.contains("## Recommendations"));
    assert!(report.contains("synthetic sample"));

    // 60 days from early August span three calendar months
    let table_rows = report
        .lines()
        .filter(|l| l.starts_with("| 20"))
        .count();
    assert!(
        (2..=4).contains(&table_rows),
        "expected ~3 monthly rows, got {table_rows}"
    );
}
