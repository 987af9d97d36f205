//! Markdown report generation
//!
//! Renders the run summary: metadata, daily and monthly metric deltas,
//! confidence margins, a per-month forecast table, and a recommendation
//! block chosen by a three-way threshold policy on the change rate. The
//! +/-10% thresholds are fixed policy.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fmt::Write as _;
use std::path::Path;

use crate::analysis::{monthly_forecast, ForecastAnalysis};
use crate::model::ForecastOutcome;
use crate::provider::DataSource;
use crate::series::CostSeries;

/// Fixed report filename
pub const REPORT_FILE: &str = "aws_cost_forecast_report.md";

/// Change rate above which costs count as trending up (percent)
const INCREASE_THRESHOLD_PCT: f64 = 10.0;
/// Change rate below which costs count as trending down (percent)
const DECREASE_THRESHOLD_PCT: f64 = -10.0;

/// Run metadata shown in the report header
#[derive(Debug, Clone)]
pub struct ReportMeta {
    pub generated_at: DateTime<Local>,
    pub source: DataSource,
}

/// Render the full Markdown report and return it as text.
pub fn build_report(
    series: &CostSeries,
    outcome: &ForecastOutcome,
    analysis: &ForecastAnalysis,
    meta: &ReportMeta,
) -> String {
    let future = outcome.future();
    let mut report = String::new();

    // fmt::Write on a String never fails
    let _ = writeln!(report, "# AWS Cost Forecast Report");
    let _ = writeln!(report);
    let _ = writeln!(report, "## Run Information");
    let _ = writeln!(
        report,
        "- **Generated**: {}",
        meta.generated_at.format("%Y-%m-%d %H:%M:%S")
    );
    let _ = writeln!(
        report,
        "- **History**: {} to {}",
        series.first_date(),
        series.last_date()
    );
    if let (Some(first), Some(last)) = (future.first(), future.last()) {
        let _ = writeln!(report, "- **Forecast window**: {} to {}", first.date, last.date);
    }
    let _ = writeln!(report, "- **Model**: seasonal-adjusted ETS (augurs)");
    let _ = writeln!(
        report,
        "- **Confidence level**: {:.0}%",
        outcome.interval_width() * 100.0
    );
    let _ = writeln!(report, "- **Data source**: {}", meta.source);
    let _ = writeln!(report);

    let _ = writeln!(report, "## Key Metrics");
    let _ = writeln!(report);
    let _ = writeln!(report, "### Daily cost");
    let _ = writeln!(
        report,
        "- **Current average**: ${:.2}/day",
        analysis.current_daily_avg
    );
    let _ = writeln!(
        report,
        "- **Forecast average**: ${:.2}/day",
        analysis.forecast_daily_avg
    );
    let _ = writeln!(report, "- **Change**: {:+.2}%", analysis.change_rate);
    let _ = writeln!(report);
    let _ = writeln!(report, "### Monthly cost");
    let _ = writeln!(
        report,
        "- **Current estimate**: ${:.2}/month",
        analysis.current_monthly
    );
    let _ = writeln!(
        report,
        "- **Forecast estimate**: ${:.2}/month",
        analysis.forecast_monthly
    );
    let _ = writeln!(
        report,
        "- **Monthly change**: ${:+.2}/month",
        analysis.monthly_delta
    );
    let _ = writeln!(
        report,
        "- **Annual change**: ${:+.2}/year",
        analysis.annual_delta
    );
    let _ = writeln!(report);
    let _ = writeln!(
        report,
        "### Confidence ({:.0}%)",
        outcome.interval_width() * 100.0
    );
    let _ = writeln!(
        report,
        "- **Mean upper bound**: ${:.2}/day",
        analysis.avg_upper
    );
    let _ = writeln!(
        report,
        "- **Mean lower bound**: ${:.2}/day",
        analysis.avg_lower
    );
    let _ = writeln!(
        report,
        "- **Mean margin**: +/-${:.2}/day",
        (analysis.avg_upper_margin + analysis.avg_lower_margin) / 2.0
    );
    let _ = writeln!(report);

    let _ = writeln!(report, "## Monthly Forecast");
    let _ = writeln!(report);
    let _ = writeln!(report, "| Month | Forecast | Lower | Upper |");
    let _ = writeln!(report, "|-------|----------|-------|-------|");
    for month in monthly_forecast(future) {
        let _ = writeln!(
            report,
            "| {} | ${:.2} | ${:.2} | ${:.2} |",
            month.month, month.total, month.lower, month.upper
        );
    }
    let _ = writeln!(report);

    let _ = writeln!(report, "## Recommendations");
    let _ = writeln!(report);
    report.push_str(&recommendations(analysis));

    report
}

/// Recommendation block selected by the three-way threshold policy
fn recommendations(analysis: &ForecastAnalysis) -> String {
    let mut block = String::new();

    if analysis.change_rate > INCREASE_THRESHOLD_PCT {
        let _ = writeln!(block, "### Costs trending up");
        let _ = writeln!(
            block,
            "Forecast costs are {:.1}% above the current level.",
            analysis.change_rate
        );
        let _ = writeln!(block);
        let _ = writeln!(block, "**Suggested actions:**");
        let _ = writeln!(block, "1. Review autoscaling policies");
        let _ = writeln!(block, "2. Evaluate reserved capacity purchases");
        let _ = writeln!(block, "3. Clean up idle resources");
        let _ = writeln!(block, "4. Revisit the cost optimization strategy");
    } else if analysis.change_rate < DECREASE_THRESHOLD_PCT {
        let _ = writeln!(block, "### Costs trending down");
        let _ = writeln!(
            block,
            "Forecast costs are {:.1}% below the current level.",
            -analysis.change_rate
        );
        let _ = writeln!(block);
        let _ = writeln!(block, "**Suggested actions:**");
        let _ = writeln!(block, "1. Keep monitoring the savings");
        let _ = writeln!(block, "2. Identify what drove the reduction");
        let _ = writeln!(block, "3. Document what worked");
    } else {
        let _ = writeln!(block, "### Costs stable");
        let _ = writeln!(
            block,
            "Forecast costs stay near the current level ({:+.1}%).",
            analysis.change_rate
        );
        let _ = writeln!(block);
        let _ = writeln!(block, "**Suggested actions:**");
        let _ = writeln!(block, "1. Hold the current cost posture");
        let _ = writeln!(block, "2. Keep a regular monitoring cadence");
        let _ = writeln!(block, "3. Assess the impact before adding new services");
    }

    block
}

/// Write the report text to `path`, overwriting any existing file.
pub fn write_report(text: &str, path: &Path) -> Result<()> {
    std::fs::write(path, text)
        .with_context(|| format!("Failed to write report: {}", path.display()))
}
