//! Billing API client
//!
//! Fetches daily cost totals over the lookback window from a Cost
//! Explorer-compatible endpoint. The endpoint returns `ResultsByTime` rows
//! with one `UnblendedCost` amount per day; amounts arrive as decimal
//! strings. A day with no usable amount becomes a missing value for the
//! preprocessor to fill.

use chrono::{Duration, Local, NaiveDate};
use serde::Deserialize;

use crate::error::CoreError;
use crate::series::RawObservation;

/// Cost Explorer-shaped response body (only the fields we read)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CostResponse {
    #[serde(default)]
    results_by_time: Vec<ResultByTime>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ResultByTime {
    time_period: TimePeriod,
    #[serde(default)]
    total: Option<Totals>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TimePeriod {
    start: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Totals {
    #[serde(default)]
    unblended_cost: Option<CostAmount>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CostAmount {
    #[serde(default)]
    amount: Option<String>,
}

/// Fetch daily cost totals for the last `lookback_days` days.
///
/// Issues a single GET with `start`/`end`/`granularity` query parameters.
/// No retries; the provider falls back to synthetic data on any error.
pub async fn fetch_daily_costs(
    url: &str,
    lookback_days: u32,
) -> Result<Vec<RawObservation>, CoreError> {
    let end = Local::now().date_naive();
    let start = end - Duration::days(lookback_days as i64);

    tracing::info!(%url, %start, %end, "Fetching daily costs from billing API");

    let client = reqwest::Client::new();
    let body = client
        .get(url)
        .query(&[
            ("start", start.to_string()),
            ("end", end.to_string()),
            ("granularity", "DAILY".to_string()),
        ])
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    parse_cost_response(&body)
}

/// Parse a Cost Explorer-shaped JSON body into raw observations
fn parse_cost_response(body: &str) -> Result<Vec<RawObservation>, CoreError> {
    let response: CostResponse =
        serde_json::from_str(body).map_err(|e| CoreError::BillingParse {
            message: e.to_string(),
        })?;

    if response.results_by_time.is_empty() {
        return Err(CoreError::BillingParse {
            message: "response contains no daily results".to_string(),
        });
    }

    let mut observations = Vec::with_capacity(response.results_by_time.len());
    for row in response.results_by_time {
        let date = NaiveDate::parse_from_str(&row.time_period.start, "%Y-%m-%d").map_err(|e| {
            CoreError::BillingParse {
                message: format!("invalid period start {:?}: {e}", row.time_period.start),
            }
        })?;

        // Missing or unparseable amount -> missing value, filled later
        let value = row
            .total
            .and_then(|t| t.unblended_cost)
            .and_then(|c| c.amount)
            .and_then(|a| a.parse::<f64>().ok());

        observations.push(RawObservation { date, value });
    }

    tracing::info!("Parsed {} daily cost rows", observations.len());

    Ok(observations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cost_response() {
        let body = r#"{
            "ResultsByTime": [
                {
                    "TimePeriod": {"Start": "2026-08-01", "End": "2026-08-02"},
                    "Total": {"UnblendedCost": {"Amount": "712.34", "Unit": "USD"}}
                },
                {
                    "TimePeriod": {"Start": "2026-08-02", "End": "2026-08-03"},
                    "Total": {"UnblendedCost": {"Amount": "698.10", "Unit": "USD"}}
                }
            ]
        }"#;

        let rows = parse_cost_response(body).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].date,
            NaiveDate::from_ymd_opt(2026, 8, 1).unwrap()
        );
        assert_eq!(rows[0].value, Some(712.34));
        assert_eq!(rows[1].value, Some(698.10));
    }

    #[test]
    fn test_parse_missing_amount_becomes_none() {
        let body = r#"{
            "ResultsByTime": [
                {"TimePeriod": {"Start": "2026-08-01"}, "Total": {}},
                {"TimePeriod": {"Start": "2026-08-02"}},
                {
                    "TimePeriod": {"Start": "2026-08-03"},
                    "Total": {"UnblendedCost": {"Amount": "not-a-number"}}
                }
            ]
        }"#;

        let rows = parse_cost_response(body).unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.value.is_none()));
    }

    #[test]
    fn test_parse_malformed_body() {
        let err = parse_cost_response("not json").unwrap_err();
        assert!(matches!(err, CoreError::BillingParse { .. }));
    }

    #[test]
    fn test_parse_empty_results() {
        let err = parse_cost_response(r#"{"ResultsByTime": []}"#).unwrap_err();
        assert!(matches!(err, CoreError::BillingParse { .. }));
    }

    #[test]
    fn test_parse_invalid_date() {
        let body = r#"{
            "ResultsByTime": [
                {"TimePeriod": {"Start": "08/01/2026"}}
            ]
        }"#;
        let err = parse_cost_response(body).unwrap_err();
        assert!(matches!(err, CoreError::BillingParse { .. }));
    }
}
