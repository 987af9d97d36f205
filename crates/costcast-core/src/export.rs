//! Export functionality for the forecast window
//!
//! Serializes the future portion of a forecast to CSV or JSON with proper
//! error handling. Output files carry fixed names in the working directory
//! and are overwritten on every run.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use crate::model::ForecastPoint;

/// Fixed CSV export filename
pub const CSV_EXPORT_FILE: &str = "aws_cost_forecast.csv";
/// Fixed JSON export filename
pub const JSON_EXPORT_FILE: &str = "aws_cost_forecast.json";

/// Export format selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
    Both,
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "both" => Ok(ExportFormat::Both),
            other => Err(format!("unknown export format: {other}")),
        }
    }
}

/// One exported forecast row (field names match the wire format)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastRecord {
    /// Date, `YYYY-MM-DD`
    pub ds: String,
    /// Point estimate
    pub yhat: f64,
    /// Lower confidence bound
    pub yhat_lower: f64,
    /// Upper confidence bound
    pub yhat_upper: f64,
}

impl From<&ForecastPoint> for ForecastRecord {
    fn from(p: &ForecastPoint) -> Self {
        Self {
            ds: p.date.format("%Y-%m-%d").to_string(),
            yhat: p.point,
            yhat_lower: p.lower,
            yhat_upper: p.upper,
        }
    }
}

/// Metadata attached to the JSON export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    /// Generation timestamp, RFC 3339
    pub generated_at: String,
    /// Requested horizon in days
    pub forecast_days: usize,
    /// Interval coverage, e.g. 0.95
    pub confidence_level: f64,
}

/// Full JSON export document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonExport {
    pub forecast: Vec<ForecastRecord>,
    pub metadata: ExportMetadata,
}

/// Export the forecast window to CSV
///
/// Columns: `ds,yhat,yhat_lower,yhat_upper`, one row per forecast day.
///
/// # Errors
/// Returns an error if file creation or a write fails.
pub fn export_forecast_to_csv(future: &[ForecastPoint], path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "ds,yhat,yhat_lower,yhat_upper").context("Failed to write CSV header")?;

    for p in future {
        writeln!(
            writer,
            "{},{},{},{}",
            p.date.format("%Y-%m-%d"),
            p.point,
            p.lower,
            p.upper
        )
        .with_context(|| format!("Failed to write row for {}", p.date))?;
    }

    writer.flush().context("Failed to flush CSV writer")?;

    Ok(())
}

/// Export the forecast window to pretty-printed JSON with metadata
///
/// # Errors
/// Returns an error if serialization or the file write fails.
pub fn export_forecast_to_json(
    future: &[ForecastPoint],
    horizon: usize,
    confidence_level: f64,
    generated_at: DateTime<Utc>,
    path: &Path,
) -> Result<()> {
    let document = JsonExport {
        forecast: future.iter().map(ForecastRecord::from).collect(),
        metadata: ExportMetadata {
            generated_at: generated_at.to_rfc3339(),
            forecast_days: horizon,
            confidence_level,
        },
    };

    let json =
        serde_json::to_string_pretty(&document).context("Failed to serialize forecast to JSON")?;

    std::fs::write(path, json)
        .with_context(|| format!("Failed to write JSON file: {}", path.display()))?;

    Ok(())
}
