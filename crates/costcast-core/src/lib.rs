//! costcast-core - Core library for costcast
//!
//! Daily cost series loading and preprocessing, the forecast model adapter,
//! forecast analysis, chart rendering, export, and report generation.

pub mod analysis;
pub mod chart;
pub mod error;
pub mod export;
pub mod model;
pub mod provider;
pub mod report;
pub mod series;

pub use analysis::{monthly_actual, monthly_forecast, ForecastAnalysis};
pub use chart::render_chart;
pub use error::CoreError;
pub use export::{
    export_forecast_to_csv, export_forecast_to_json, ExportFormat, CSV_EXPORT_FILE,
    JSON_EXPORT_FILE,
};
pub use model::{CostModel, FittedModel, ForecastOutcome, ForecastPoint, ModelConfig};
pub use provider::{load_series, DataSource, ProviderConfig, SyntheticConfig, LOOKBACK_DAYS};
pub use report::{build_report, write_report, ReportMeta, REPORT_FILE};
pub use series::{CostSeries, Observation, RawObservation};
