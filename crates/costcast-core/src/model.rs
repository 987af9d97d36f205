//! Forecast model adapter
//!
//! Wraps the `augurs` ETS trend model behind fit/predict. The adapter owns
//! the seasonal handling: additive weekly and yearly components are
//! estimated by period-position averaging of the detrended series, the
//! deseasonalized remainder is handed to `AutoETS`, and the components are
//! added back onto the returned point estimates and interval bounds.
//!
//! `trend_flexibility` controls how readily the trend bends to recent data:
//! it sets the detrending window used during seasonal estimation (higher
//! flexibility, shorter window).

use augurs::ets::AutoETS;
use augurs::prelude::*;
use chrono::{Duration, NaiveDate};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::error::CoreError;
use crate::series::CostSeries;

/// Minimum observations required to fit: two full weekly cycles
pub const MIN_OBSERVATIONS: usize = 14;

const WEEKLY_PERIOD: usize = 7;
const YEARLY_PERIOD: usize = 365;

/// Model configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    /// Model a 7-day seasonal component
    pub weekly_seasonality: bool,
    /// Model a 365-day seasonal component (requires two years of history)
    pub yearly_seasonality: bool,
    /// Coverage of the uncertainty interval, e.g. 0.95
    pub interval_width: f64,
    /// Trend adaptiveness; sets the detrending window (1 / flexibility days,
    /// clamped to [7, 91])
    pub trend_flexibility: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            weekly_seasonality: true,
            yearly_seasonality: true,
            interval_width: 0.95,
            trend_flexibility: 0.05,
        }
    }
}

impl ModelConfig {
    fn validate(&self) -> Result<(), CoreError> {
        if !self.interval_width.is_finite() || self.interval_width <= 0.0 || self.interval_width >= 1.0
        {
            return Err(CoreError::InvalidConfig {
                message: format!(
                    "interval width must be in (0, 1), got {}",
                    self.interval_width
                ),
            });
        }
        if !self.trend_flexibility.is_finite() || self.trend_flexibility <= 0.0 {
            return Err(CoreError::InvalidConfig {
                message: format!(
                    "trend flexibility must be positive, got {}",
                    self.trend_flexibility
                ),
            });
        }
        Ok(())
    }

    fn trend_window(&self) -> usize {
        (1.0 / self.trend_flexibility)
            .round()
            .clamp(WEEKLY_PERIOD as f64, 91.0) as usize
    }
}

/// One forecast row; `lower <= point <= upper` always holds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub point: f64,
    pub lower: f64,
    pub upper: f64,
}

impl ForecastPoint {
    fn ordered(date: NaiveDate, point: f64, lower: f64, upper: f64) -> Self {
        Self {
            date,
            point,
            lower: lower.min(point),
            upper: upper.max(point),
        }
    }
}

/// Full forecast: fitted values over the history plus the future window.
/// Immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastOutcome {
    points: Vec<ForecastPoint>,
    origin: NaiveDate,
    n_history: usize,
    interval_width: f64,
}

impl ForecastOutcome {
    /// All rows, fitted history first
    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    /// In-sample fitted rows
    pub fn fitted(&self) -> &[ForecastPoint] {
        &self.points[..self.n_history]
    }

    /// Rows strictly after the last historical date
    pub fn future(&self) -> &[ForecastPoint] {
        &self.points[self.n_history..]
    }

    /// Last historical date
    pub fn origin(&self) -> NaiveDate {
        self.origin
    }

    pub fn interval_width(&self) -> f64 {
        self.interval_width
    }

    pub fn horizon(&self) -> usize {
        self.points.len() - self.n_history
    }
}

/// Unfitted model carrying validated configuration
#[derive(Debug, Clone)]
pub struct CostModel {
    config: ModelConfig,
}

impl CostModel {
    pub fn new(config: ModelConfig) -> Result<Self, CoreError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Decompose the series and verify the trend model accepts it.
    ///
    /// # Errors
    /// [`CoreError::InsufficientData`] under [`MIN_OBSERVATIONS`] points;
    /// [`CoreError::ModelFit`] when the trend model rejects the series.
    pub fn fit(&self, series: &CostSeries) -> Result<FittedModel, CoreError> {
        let n = series.len();
        if n < MIN_OBSERVATIONS {
            return Err(CoreError::InsufficientData {
                points: n,
                required: MIN_OBSERVATIONS,
            });
        }

        let values = series.values();
        let trend = moving_average(&values, self.config.trend_window());
        let detrended: Vec<f64> = values.iter().zip(&trend).map(|(v, t)| v - t).collect();

        let weekly = if self.config.weekly_seasonality {
            seasonal_profile(&detrended, WEEKLY_PERIOD)
        } else {
            vec![0.0; WEEKLY_PERIOD]
        };

        let less_weekly: Vec<f64> = detrended
            .iter()
            .enumerate()
            .map(|(i, v)| v - weekly[i % WEEKLY_PERIOD])
            .collect();

        // A yearly component needs at least two full cycles to average over
        let yearly = if self.config.yearly_seasonality && n >= 2 * YEARLY_PERIOD {
            seasonal_profile(&less_weekly, YEARLY_PERIOD)
        } else {
            vec![0.0; YEARLY_PERIOD]
        };

        let deseasonalized: Vec<f64> = values
            .iter()
            .enumerate()
            .map(|(i, v)| v - weekly[i % WEEKLY_PERIOD] - yearly[i % YEARLY_PERIOD])
            .collect();

        let mut ets = AutoETS::non_seasonal();
        ets.fit(&deseasonalized)
            .map_err(|e| CoreError::ModelFit {
                message: e.to_string(),
            })?;

        Ok(FittedModel {
            deseasonalized,
            weekly,
            yearly,
            dates: series.observations().iter().map(|o| o.date).collect(),
            origin: series.last_date(),
            interval_width: self.config.interval_width,
        })
    }
}

/// Fitted model state: the decomposition plus the deseasonalized series the
/// trend model runs on
#[derive(Debug, Clone)]
pub struct FittedModel {
    deseasonalized: Vec<f64>,
    weekly: Vec<f64>,
    yearly: Vec<f64>,
    dates: Vec<NaiveDate>,
    origin: NaiveDate,
    interval_width: f64,
}

impl FittedModel {
    /// Forecast `horizon` days past the last historical date.
    ///
    /// Returns fitted in-sample rows followed by the future window. When the
    /// trend model yields no intervals, bounds are derived from the in-sample
    /// residual spread, widening with the horizon.
    pub fn predict(&self, horizon: usize) -> Result<ForecastOutcome, CoreError> {
        if horizon == 0 {
            return Err(CoreError::InvalidConfig {
                message: "forecast horizon must be at least 1 day".to_string(),
            });
        }

        let mut ets = AutoETS::non_seasonal();
        let fitted = ets
            .fit(&self.deseasonalized)
            .map_err(|e| CoreError::ModelFit {
                message: e.to_string(),
            })?;

        let in_sample = fitted
            .predict_in_sample(self.interval_width)
            .map_err(|e| CoreError::ModelFit {
                message: e.to_string(),
            })?;
        let future = fitted
            .predict(horizon, self.interval_width)
            .map_err(|e| CoreError::ModelFit {
                message: e.to_string(),
            })?;

        let residual_std = residual_std(&self.deseasonalized, &in_sample.point);
        let z = z_multiplier(self.interval_width);

        let n = self.dates.len();
        let mut points = Vec::with_capacity(n + horizon);

        let (is_lower, is_upper) = match &in_sample.intervals {
            Some(iv) => (iv.lower.clone(), iv.upper.clone()),
            None => {
                let margin = z * residual_std;
                (
                    in_sample.point.iter().map(|p| p - margin).collect(),
                    in_sample.point.iter().map(|p| p + margin).collect(),
                )
            }
        };
        for (i, (&date, &point)) in self.dates.iter().zip(&in_sample.point).enumerate() {
            let seasonal = self.seasonal_at(i);
            points.push(ForecastPoint::ordered(
                date,
                point + seasonal,
                is_lower.get(i).copied().unwrap_or(point) + seasonal,
                is_upper.get(i).copied().unwrap_or(point) + seasonal,
            ));
        }
        let n_history = points.len();

        let (fc_lower, fc_upper) = match &future.intervals {
            Some(iv) => (iv.lower.clone(), iv.upper.clone()),
            None => (
                future
                    .point
                    .iter()
                    .enumerate()
                    .map(|(j, p)| p - z * residual_std * ((j + 1) as f64).sqrt())
                    .collect(),
                future
                    .point
                    .iter()
                    .enumerate()
                    .map(|(j, p)| p + z * residual_std * ((j + 1) as f64).sqrt())
                    .collect(),
            ),
        };
        for (j, &point) in future.point.iter().enumerate() {
            let seasonal = self.seasonal_at(n_history + j);
            points.push(ForecastPoint::ordered(
                self.origin + Duration::days(j as i64 + 1),
                point + seasonal,
                fc_lower.get(j).copied().unwrap_or(point) + seasonal,
                fc_upper.get(j).copied().unwrap_or(point) + seasonal,
            ));
        }

        Ok(ForecastOutcome {
            points,
            origin: self.origin,
            n_history,
            interval_width: self.interval_width,
        })
    }

    fn seasonal_at(&self, position: usize) -> f64 {
        self.weekly[position % WEEKLY_PERIOD] + self.yearly[position % YEARLY_PERIOD]
    }
}

/// Centered moving-average trend with edge extension
fn moving_average(data: &[f64], window: usize) -> Vec<f64> {
    let n = data.len();
    let w = window.min(n).max(1);
    let half = w / 2;
    if half == 0 || n <= w {
        let mean = data.iter().sum::<f64>() / n as f64;
        return vec![mean; n];
    }

    let mut trend = vec![0.0; n];
    for i in half..(n - half) {
        let slice = &data[i - half..=i + half];
        trend[i] = slice.iter().sum::<f64>() / slice.len() as f64;
    }
    for i in 0..half {
        trend[i] = trend[half];
    }
    for i in (n - half)..n {
        trend[i] = trend[n - half - 1];
    }
    trend
}

/// Seasonal component by period-position averaging, centered to sum to zero
fn seasonal_profile(detrended: &[f64], period: usize) -> Vec<f64> {
    let mut sums = vec![0.0; period];
    let mut counts = vec![0usize; period];
    for (i, v) in detrended.iter().enumerate() {
        sums[i % period] += v;
        counts[i % period] += 1;
    }

    let mut profile: Vec<f64> = sums
        .iter()
        .zip(&counts)
        .map(|(s, &c)| if c > 0 { s / c as f64 } else { 0.0 })
        .collect();

    let mean = profile.iter().sum::<f64>() / period as f64;
    for p in profile.iter_mut() {
        *p -= mean;
    }
    profile
}

/// Standard deviation of the in-sample one-step residuals
fn residual_std(actual: &[f64], fitted: &[f64]) -> f64 {
    let residuals: Vec<f64> = actual
        .iter()
        .zip(fitted)
        .map(|(a, f)| a - f)
        .collect();
    if residuals.is_empty() {
        return 0.0;
    }
    let n = residuals.len() as f64;
    let mean = residuals.iter().sum::<f64>() / n;
    let variance = residuals.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

/// Normal quantile for a central interval of the given coverage
fn z_multiplier(interval_width: f64) -> f64 {
    // interval_width is validated to (0, 1) at model construction
    let standard = Normal::new(0.0, 1.0).expect("standard normal parameters are valid");
    standard.inverse_cdf(0.5 + interval_width / 2.0)
}
