//! Forecast analysis
//!
//! Aggregate deltas between the historical window and the forecast window:
//! daily and monthly averages, percentage change, annualized delta, and mean
//! confidence margins. Pure functions of their inputs.

use std::collections::BTreeMap;

use crate::model::ForecastPoint;
use crate::series::CostSeries;

/// Aggregate comparison of history vs. forecast
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastAnalysis {
    /// Mean historical daily cost
    pub current_daily_avg: f64,
    /// Mean forecast daily cost over the future window
    pub forecast_daily_avg: f64,
    /// Percentage change of the forecast average vs. the current average
    pub change_rate: f64,
    /// Current monthly estimate (daily mean x 30)
    pub current_monthly: f64,
    /// Forecast monthly estimate (daily mean x 30)
    pub forecast_monthly: f64,
    /// Monthly delta (forecast - current)
    pub monthly_delta: f64,
    /// Annualized delta (monthly delta x 12)
    pub annual_delta: f64,
    /// Mean upper bound over the future window
    pub avg_upper: f64,
    /// Mean lower bound over the future window
    pub avg_lower: f64,
    /// Mean of (upper - point)
    pub avg_upper_margin: f64,
    /// Mean of (point - lower)
    pub avg_lower_margin: f64,
}

impl ForecastAnalysis {
    /// Compare the historical series against the future forecast window.
    pub fn compute(series: &CostSeries, future: &[ForecastPoint]) -> Self {
        let current_daily_avg = series.mean();

        let n = future.len().max(1) as f64;
        let forecast_daily_avg = future.iter().map(|p| p.point).sum::<f64>() / n;
        let avg_upper = future.iter().map(|p| p.upper).sum::<f64>() / n;
        let avg_lower = future.iter().map(|p| p.lower).sum::<f64>() / n;
        let avg_upper_margin = future.iter().map(|p| p.upper - p.point).sum::<f64>() / n;
        let avg_lower_margin = future.iter().map(|p| p.point - p.lower).sum::<f64>() / n;

        let change_rate = if current_daily_avg > 0.0 {
            (forecast_daily_avg - current_daily_avg) / current_daily_avg * 100.0
        } else {
            0.0
        };

        let current_monthly = current_daily_avg * 30.0;
        let forecast_monthly = forecast_daily_avg * 30.0;
        let monthly_delta = forecast_monthly - current_monthly;

        Self {
            current_daily_avg,
            forecast_daily_avg,
            change_rate,
            current_monthly,
            forecast_monthly,
            monthly_delta,
            annual_delta: monthly_delta * 12.0,
            avg_upper,
            avg_lower,
            avg_upper_margin,
            avg_lower_margin,
        }
    }
}

/// Actual cost total for one calendar month
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTotal {
    /// Month key, `YYYY-MM`
    pub month: String,
    pub total: f64,
}

/// Forecast cost total for one calendar month, with summed bounds
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyForecast {
    /// Month key, `YYYY-MM`
    pub month: String,
    pub total: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Sum historical costs per calendar month, chronological
pub fn monthly_actual(series: &CostSeries) -> Vec<MonthlyTotal> {
    let mut by_month: BTreeMap<String, f64> = BTreeMap::new();
    for obs in series.observations() {
        *by_month.entry(obs.date.format("%Y-%m").to_string()).or_default() += obs.value;
    }
    by_month
        .into_iter()
        .map(|(month, total)| MonthlyTotal { month, total })
        .collect()
}

/// Sum forecast points and bounds per calendar month, chronological
pub fn monthly_forecast(future: &[ForecastPoint]) -> Vec<MonthlyForecast> {
    #[derive(Default)]
    struct Acc {
        total: f64,
        lower: f64,
        upper: f64,
    }

    let mut by_month: BTreeMap<String, Acc> = BTreeMap::new();
    for p in future {
        let acc = by_month.entry(p.date.format("%Y-%m").to_string()).or_default();
        acc.total += p.point;
        acc.lower += p.lower;
        acc.upper += p.upper;
    }
    by_month
        .into_iter()
        .map(|(month, acc)| MonthlyForecast {
            month,
            total: acc.total,
            lower: acc.lower,
            upper: acc.upper,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::RawObservation;
    use chrono::{Duration, NaiveDate};

    fn flat_series(days: usize, value: f64) -> CostSeries {
        let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        CostSeries::from_raw(
            (0..days)
                .map(|i| RawObservation {
                    date: start + Duration::days(i as i64),
                    value: Some(value),
                })
                .collect(),
        )
        .unwrap()
    }

    fn flat_future(start: NaiveDate, days: usize, point: f64, margin: f64) -> Vec<ForecastPoint> {
        (0..days)
            .map(|i| ForecastPoint {
                date: start + Duration::days(i as i64),
                point,
                lower: point - margin,
                upper: point + margin,
            })
            .collect()
    }

    #[test]
    fn test_change_rate_concrete_case() {
        // 700 -> 780 is +11.43%
        let series = flat_series(30, 700.0);
        let future = flat_future(
            NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            30,
            780.0,
            20.0,
        );

        let analysis = ForecastAnalysis::compute(&series, &future);
        assert!((analysis.change_rate - 11.428571).abs() < 1e-4);
        assert_eq!(analysis.current_daily_avg, 700.0);
        assert_eq!(analysis.forecast_daily_avg, 780.0);
    }

    #[test]
    fn test_monthly_and_annual_deltas() {
        let series = flat_series(30, 700.0);
        let future = flat_future(
            NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            30,
            780.0,
            20.0,
        );

        let analysis = ForecastAnalysis::compute(&series, &future);
        assert_eq!(analysis.current_monthly, 21000.0);
        assert_eq!(analysis.forecast_monthly, 23400.0);
        assert_eq!(analysis.monthly_delta, 2400.0);
        assert_eq!(analysis.annual_delta, 28800.0);
    }

    #[test]
    fn test_confidence_margins() {
        let series = flat_series(30, 700.0);
        let future = flat_future(
            NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            10,
            780.0,
            25.0,
        );

        let analysis = ForecastAnalysis::compute(&series, &future);
        assert!((analysis.avg_upper - 805.0).abs() < 1e-9);
        assert!((analysis.avg_lower - 755.0).abs() < 1e-9);
        assert!((analysis.avg_upper_margin - 25.0).abs() < 1e-9);
        assert!((analysis.avg_lower_margin - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_future_window() {
        let series = flat_series(30, 700.0);
        let analysis = ForecastAnalysis::compute(&series, &[]);
        assert_eq!(analysis.forecast_daily_avg, 0.0);
        assert_eq!(analysis.change_rate, -100.0);
    }

    #[test]
    fn test_monthly_actual_groups_by_month() {
        // 31 days of January + 10 days of February
        let series = flat_series(41, 100.0);
        let months = monthly_actual(&series);

        assert_eq!(months.len(), 2);
        assert_eq!(months[0].month, "2026-01");
        assert_eq!(months[0].total, 3100.0);
        assert_eq!(months[1].month, "2026-02");
        assert_eq!(months[1].total, 1000.0);
    }

    #[test]
    fn test_monthly_forecast_sums_bounds() {
        let future = flat_future(
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            31,
            100.0,
            10.0,
        );
        let months = monthly_forecast(&future);

        assert_eq!(months.len(), 1);
        assert_eq!(months[0].month, "2026-03");
        assert_eq!(months[0].total, 3100.0);
        assert_eq!(months[0].lower, 2790.0);
        assert_eq!(months[0].upper, 3410.0);
    }

    #[test]
    fn test_monthly_forecast_chronological() {
        // Spans a year boundary; keys must sort chronologically
        let future = flat_future(
            NaiveDate::from_ymd_opt(2026, 12, 25).unwrap(),
            14,
            100.0,
            5.0,
        );
        let months = monthly_forecast(&future);

        assert_eq!(months.len(), 2);
        assert_eq!(months[0].month, "2026-12");
        assert_eq!(months[1].month, "2027-01");
    }
}
