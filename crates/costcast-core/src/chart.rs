//! Chart rendering
//!
//! Renders the forecast chart as a single PNG with two stacked panels: the
//! daily timeline with the confidence band on top, the monthly
//! actual-vs-forecast bars below. The only side effect is the file write.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;

use crate::analysis::{monthly_actual, monthly_forecast};
use crate::model::ForecastOutcome;
use crate::series::CostSeries;

const CHART_WIDTH: u32 = 1400;
const CHART_HEIGHT: u32 = 1000;

/// Render the two-panel forecast chart to `path`.
pub fn render_chart(series: &CostSeries, outcome: &ForecastOutcome, path: &Path) -> Result<()> {
    let root = BitMapBackend::new(path, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
    root.fill(&WHITE)?;

    let (top, bottom) = root.split_vertically((CHART_HEIGHT / 2) as i32);
    draw_timeline(&top, series, outcome)?;
    draw_monthly_bars(&bottom, series, outcome)?;

    root.present()
        .with_context(|| format!("Failed to write chart: {}", path.display()))?;

    Ok(())
}

/// Top panel: historical line, forecast line, confidence band, divider
fn draw_timeline(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    series: &CostSeries,
    outcome: &ForecastOutcome,
) -> Result<()> {
    let future = outcome.future();
    let origin = outcome.origin();

    let x_start = series.first_date();
    let x_end = future.last().map(|p| p.date).unwrap_or(origin);

    let upper_max = future.iter().map(|p| p.upper).fold(f64::MIN, f64::max);
    let lower_min = future.iter().map(|p| p.lower).fold(f64::MAX, f64::min);
    let y_max = series.max_value().max(upper_max) * 1.05;
    let y_min = (series.min_value().min(lower_min) * 0.95).max(0.0);

    let mut chart = ChartBuilder::on(area)
        .margin(12)
        .caption("Daily Cost Forecast", ("sans-serif", 26))
        .x_label_area_size(44)
        .y_label_area_size(64)
        .build_cartesian_2d(x_start..x_end, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_labels(12)
        .x_label_formatter(&|d: &NaiveDate| d.format("%Y-%m").to_string())
        .y_desc("Daily cost (USD)")
        .draw()?;

    if !future.is_empty() {
        let band: Vec<(NaiveDate, f64)> = future
            .iter()
            .map(|p| (p.date, p.upper))
            .chain(future.iter().rev().map(|p| (p.date, p.lower)))
            .collect();
        chart
            .draw_series(std::iter::once(Polygon::new(band, RED.mix(0.2).filled())))?
            .label(format!(
                "{:.0}% confidence",
                outcome.interval_width() * 100.0
            ))
            .legend(|(x, y)| {
                Rectangle::new([(x, y - 4), (x + 16, y + 4)], RED.mix(0.2).filled())
            });
    }

    chart
        .draw_series(LineSeries::new(
            series.observations().iter().map(|o| (o.date, o.value)),
            BLUE.stroke_width(2),
        ))?
        .label("Actual")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 16, y)], BLUE.stroke_width(2)));

    chart
        .draw_series(LineSeries::new(
            future.iter().map(|p| (p.date, p.point)),
            RED.stroke_width(2),
        ))?
        .label("Forecast")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 16, y)], RED.stroke_width(2)));

    // Boundary between history and forecast
    chart.draw_series(LineSeries::new(
        vec![(origin, y_min), (origin, y_max)],
        BLACK.mix(0.4).stroke_width(1),
    ))?;

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.85).filled())
        .border_style(BLACK.mix(0.4).stroke_width(1))
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;

    Ok(())
}

/// Bottom panel: monthly totals, actual months first, forecast months after
fn draw_monthly_bars(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    series: &CostSeries,
    outcome: &ForecastOutcome,
) -> Result<()> {
    let actual = monthly_actual(series);
    let forecast = monthly_forecast(outcome.future());
    let n = actual.len() + forecast.len();

    let labels: Vec<String> = actual
        .iter()
        .map(|m| m.month.clone())
        .chain(forecast.iter().map(|m| m.month.clone()))
        .collect();

    let y_max = actual
        .iter()
        .map(|m| m.total)
        .chain(forecast.iter().map(|m| m.upper))
        .fold(0.0, f64::max)
        * 1.1;

    let mut chart = ChartBuilder::on(area)
        .margin(12)
        .caption("Monthly Cost: Actual vs Forecast", ("sans-serif", 26))
        .x_label_area_size(56)
        .y_label_area_size(64)
        .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0f64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n.min(24))
        .x_label_formatter(&|x: &f64| {
            if *x < -0.25 {
                return String::new();
            }
            labels
                .get(x.round() as usize)
                .cloned()
                .unwrap_or_default()
        })
        .y_desc("Monthly cost (USD)")
        .draw()?;

    chart
        .draw_series(actual.iter().enumerate().map(|(i, m)| {
            Rectangle::new(
                [(i as f64 - 0.4, 0.0), (i as f64 + 0.4, m.total)],
                BLUE.mix(0.8).filled(),
            )
        }))?
        .label("Actual")
        .legend(|(x, y)| Rectangle::new([(x, y - 4), (x + 16, y + 4)], BLUE.mix(0.8).filled()));

    chart
        .draw_series(forecast.iter().enumerate().map(|(j, m)| {
            let i = (actual.len() + j) as f64;
            Rectangle::new([(i - 0.4, 0.0), (i + 0.4, m.total)], RED.mix(0.8).filled())
        }))?
        .label("Forecast")
        .legend(|(x, y)| Rectangle::new([(x, y - 4), (x + 16, y + 4)], RED.mix(0.8).filled()));

    // Boundary between the actual and forecast groups
    let split = actual.len() as f64 - 0.5;
    chart.draw_series(LineSeries::new(
        vec![(split, 0.0), (split, y_max)],
        BLACK.mix(0.4).stroke_width(1),
    ))?;

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.85).filled())
        .border_style(BLACK.mix(0.4).stroke_width(1))
        .position(SeriesLabelPosition::UpperRight)
        .draw()?;

    Ok(())
}
