//! Cost data providers
//!
//! Two sources feed the pipeline: a billing API queried over a fixed
//! lookback window, and a seeded synthetic generator. The billing API is
//! treated as unreliable; any fetch or parse failure is logged and the run
//! continues on synthetic data. Exactly one fallback, no retries.

pub mod billing;
pub mod synthetic;

use std::fmt;

use crate::error::CoreError;
use crate::series::RawObservation;

pub use synthetic::SyntheticConfig;

/// Historical lookback window queried from the billing API
pub const LOOKBACK_DAYS: u32 = 365;

/// Where the historical series actually came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    /// Live data from the billing API
    Billing,
    /// Seeded synthetic sample (requested or fallback)
    Synthetic,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Billing => write!(f, "billing API"),
            DataSource::Synthetic => write!(f, "synthetic sample"),
        }
    }
}

/// Provider configuration assembled by the CLI
#[derive(Debug, Clone, Default)]
pub struct ProviderConfig {
    /// Billing endpoint; live mode is only attempted when set
    pub billing_url: Option<String>,
    /// Force synthetic data even when an endpoint is configured
    pub use_sample: bool,
    /// Synthetic generator knobs (also used for the fallback)
    pub synthetic: SyntheticConfig,
}

/// Load the historical series, falling back to synthetic data when the
/// billing API is not configured or not reachable.
pub async fn load_series(
    config: &ProviderConfig,
) -> Result<(Vec<RawObservation>, DataSource), CoreError> {
    if config.use_sample {
        let series = synthetic::generate(&config.synthetic)?;
        return Ok((series, DataSource::Synthetic));
    }

    let Some(url) = &config.billing_url else {
        tracing::warn!("No billing endpoint configured, using synthetic data");
        let series = synthetic::generate(&config.synthetic)?;
        return Ok((series, DataSource::Synthetic));
    };

    match billing::fetch_daily_costs(url, LOOKBACK_DAYS).await {
        Ok(series) => Ok((series, DataSource::Billing)),
        Err(err) if err.is_recoverable() => {
            tracing::warn!(error = %err, "Billing fetch failed, falling back to synthetic data");
            let series = synthetic::generate(&config.synthetic)?;
            Ok((series, DataSource::Synthetic))
        }
        Err(err) => Err(err),
    }
}
