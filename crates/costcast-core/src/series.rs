//! Daily cost series and preprocessing
//!
//! A [`CostSeries`] is the cleaned, sorted view of raw provider output.
//! Construction through [`CostSeries::from_raw`] enforces the invariants the
//! rest of the pipeline relies on: dates strictly ascending, no duplicates,
//! no missing values, no negative amounts.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::error::CoreError;

/// A single provider row before preprocessing; `value` is `None` when the
/// billing API returned no usable amount for that day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawObservation {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

/// A cleaned daily cost observation (USD)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

/// Cleaned daily cost series, sorted ascending by date
#[derive(Debug, Clone, PartialEq)]
pub struct CostSeries {
    observations: Vec<Observation>,
}

impl CostSeries {
    /// Preprocess raw provider output into a clean series.
    ///
    /// - sorts ascending by date
    /// - collapses duplicate dates (last occurrence wins)
    /// - fills missing values with the mean of the present values
    /// - floors values at zero
    ///
    /// Deterministic and idempotent on an already-clean series.
    ///
    /// # Errors
    /// [`CoreError::EmptySeries`] when the input is empty or every value is
    /// missing (no mean to fill with).
    pub fn from_raw(raw: Vec<RawObservation>) -> Result<Self, CoreError> {
        if raw.is_empty() {
            return Err(CoreError::EmptySeries);
        }

        // BTreeMap sorts by date and makes the last duplicate win
        let mut by_date: BTreeMap<NaiveDate, Option<f64>> = BTreeMap::new();
        for obs in raw {
            by_date.insert(obs.date, obs.value);
        }

        let present: Vec<f64> = by_date.values().filter_map(|v| *v).collect();
        if present.is_empty() {
            return Err(CoreError::EmptySeries);
        }
        let fill = present.iter().sum::<f64>() / present.len() as f64;

        let observations = by_date
            .into_iter()
            .map(|(date, value)| Observation {
                date,
                value: value.unwrap_or(fill).max(0.0),
            })
            .collect();

        Ok(Self { observations })
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// First observation date. The constructor guarantees a non-empty series.
    pub fn first_date(&self) -> NaiveDate {
        self.observations[0].date
    }

    /// Last observation date; the forecast origin.
    pub fn last_date(&self) -> NaiveDate {
        self.observations[self.observations.len() - 1].date
    }

    pub fn values(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.value).collect()
    }

    pub fn mean(&self) -> f64 {
        let sum: f64 = self.observations.iter().map(|o| o.value).sum();
        sum / self.observations.len() as f64
    }

    pub fn min_value(&self) -> f64 {
        self.observations
            .iter()
            .map(|o| o.value)
            .fold(f64::INFINITY, f64::min)
    }

    pub fn max_value(&self) -> f64 {
        self.observations
            .iter()
            .map(|o| o.value)
            .fold(f64::NEG_INFINITY, f64::max)
    }
}
