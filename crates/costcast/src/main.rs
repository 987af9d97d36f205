//! costcast - Cloud cost forecasting CLI

use anyhow::Result;
use chrono::{Local, Utc};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

use costcast_core::{
    build_report, export_forecast_to_csv, export_forecast_to_json, load_series, render_chart,
    write_report, CostModel, CostSeries, ExportFormat, ForecastAnalysis, ForecastOutcome,
    ModelConfig, ProviderConfig, ReportMeta, SyntheticConfig, CSV_EXPORT_FILE, JSON_EXPORT_FILE,
    REPORT_FILE,
};

#[derive(Parser)]
#[command(
    name = "costcast",
    version,
    about = "Forecast daily cloud costs six months ahead",
    long_about = "Fits an additive time-series model to a year of daily cloud costs and\n\
                  forecasts the configured horizon, then renders a chart, optional CSV/JSON\n\
                  exports, and a Markdown report with threshold-based recommendations.\n\
                  \n\
                  Data comes from a billing API when an endpoint is configured; otherwise\n\
                  (or on any fetch failure) a reproducible synthetic sample is used.\n\
                  \n\
                  Examples:\n\
                    costcast --use-sample                 # Synthetic data, 180-day forecast\n\
                    costcast --days 90                    # Shorter horizon\n\
                    costcast --export both                # Also write CSV + JSON\n\
                    costcast --output charts/costs.png    # Custom chart path\n\
                  \n\
                  Environment Variables:\n\
                    COSTCAST_BILLING_URL                  # Billing API endpoint"
)]
struct Cli {
    /// Forecast horizon in days
    #[arg(long, default_value_t = 180)]
    days: u32,

    /// Use the synthetic sample series instead of the billing API
    #[arg(long)]
    use_sample: bool,

    /// Export the forecast window
    #[arg(long, value_parser = ["csv", "json", "both"])]
    export: Option<String>,

    /// Chart output path
    #[arg(long, default_value = "forecast_plot.png")]
    output: PathBuf,

    /// Billing API endpoint for live cost data
    #[arg(long, env = "COSTCAST_BILLING_URL")]
    billing_url: Option<String>,

    /// Seed for the synthetic generator
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    println!("costcast - Cloud Cost Forecast");
    println!("==============================");
    println!();

    let provider_config = ProviderConfig {
        billing_url: cli.billing_url.clone(),
        use_sample: cli.use_sample,
        synthetic: SyntheticConfig {
            seed: cli.seed,
            ..SyntheticConfig::default()
        },
    };

    let spinner = step_spinner("Loading cost data...");
    let (raw, source) = load_series(&provider_config).await?;
    let series = CostSeries::from_raw(raw)?;
    spinner.finish_and_clear();

    println!("Data source:      {source}");
    println!("Observations:     {}", series.len());
    println!(
        "Period:           {} to {}",
        series.first_date(),
        series.last_date()
    );
    println!("Average cost:     ${:.2}/day", series.mean());
    println!(
        "Min / max:        ${:.2} / ${:.2}",
        series.min_value(),
        series.max_value()
    );
    println!();

    let spinner = step_spinner("Fitting forecast model...");
    let model = CostModel::new(ModelConfig::default())?;
    let fitted = model.fit(&series)?;
    let outcome = fitted.predict(cli.days as usize)?;
    spinner.finish_and_clear();

    let future = outcome.future();
    if let (Some(first), Some(last)) = (future.first(), future.last()) {
        println!("Forecast window:  {} to {}", first.date, last.date);
    }

    let analysis = ForecastAnalysis::compute(&series, future);
    print_analysis(&analysis, &outcome);

    render_chart(&series, &outcome, &cli.output)?;
    println!("Chart saved:      {}", cli.output.display());

    if let Some(format) = &cli.export {
        let format: ExportFormat = format.parse().map_err(anyhow::Error::msg)?;
        run_export(format, &outcome, cli.days as usize)?;
    }

    let meta = ReportMeta {
        generated_at: Local::now(),
        source,
    };
    let report = build_report(&series, &outcome, &analysis, &meta);
    write_report(&report, Path::new(REPORT_FILE))?;
    println!("Report saved:     {REPORT_FILE}");

    println!();
    println!("Done.");

    Ok(())
}

fn print_analysis(analysis: &ForecastAnalysis, outcome: &ForecastOutcome) {
    println!();
    println!("Cost trend:");
    println!(
        "  Current average:   ${:.2}/day",
        analysis.current_daily_avg
    );
    println!(
        "  Forecast average:  ${:.2}/day",
        analysis.forecast_daily_avg
    );
    println!("  Change:            {:+.2}%", analysis.change_rate);
    println!();
    println!("Monthly estimate:");
    println!("  Current:           ${:.2}/month", analysis.current_monthly);
    println!(
        "  Forecast:          ${:.2}/month",
        analysis.forecast_monthly
    );
    println!("  Change:            ${:+.2}/month", analysis.monthly_delta);
    println!("  Annual change:     ${:+.2}/year", analysis.annual_delta);
    println!();
    println!("Confidence ({:.0}%):", outcome.interval_width() * 100.0);
    println!("  Mean upper bound:  ${:.2}/day", analysis.avg_upper);
    println!("  Mean lower bound:  ${:.2}/day", analysis.avg_lower);
    println!(
        "  Mean margin:       +/-${:.2}/day",
        (analysis.avg_upper_margin + analysis.avg_lower_margin) / 2.0
    );
    println!();
}

fn run_export(format: ExportFormat, outcome: &ForecastOutcome, horizon: usize) -> Result<()> {
    let future = outcome.future();
    let generated_at = Utc::now();

    if matches!(format, ExportFormat::Csv | ExportFormat::Both) {
        export_forecast_to_csv(future, Path::new(CSV_EXPORT_FILE))?;
        println!("CSV saved:        {CSV_EXPORT_FILE}");
    }
    if matches!(format, ExportFormat::Json | ExportFormat::Both) {
        export_forecast_to_json(
            future,
            horizon,
            outcome.interval_width(),
            generated_at,
            Path::new(JSON_EXPORT_FILE),
        )?;
        println!("JSON saved:       {JSON_EXPORT_FILE}");
    }

    Ok(())
}

fn step_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(message.to_string());
    spinner
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("costcast=warn,costcast_core=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
