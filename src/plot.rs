//! Chart Rendering Module
//!
//! Draws observed daily values and their fitted curves to an SVG file.

use std::path::Path;

use plotters::prelude::*;

use crate::error::{Result, SunfitError};
use crate::fitting::{Observation, QuantityFit};
use crate::report::Quantity;

// ===================== CONSTANTS =====================

/// Default chart caption.
pub const DEFAULT_TITLE: &str = "Sun Rise/Set/Noon";

const CHART_SIZE: (u32, u32) = (1024, 768);

/// Day axis covers leap years too.
const LAST_DAY: i32 = 366;

fn series_color(quantity: Quantity) -> RGBColor {
    match quantity {
        Quantity::Sunrise => RED,
        Quantity::Sunset => GREEN,
        Quantity::SolarNoon => BLUE,
        Quantity::DayLength => BLACK,
    }
}

// ===================== CHART =====================

/// Render every observed series as a marked line and every fitted curve as a
/// plain line in the same color.
pub fn draw_chart(
    path: &Path,
    title: &str,
    observations: &[Observation],
    fits: &[QuantityFit],
) -> Result<()> {
    let plot_err = |e: &dyn std::fmt::Display| SunfitError::plot(path, e.to_string());

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| plot_err(&e))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 50).into_font())
        .margin(5)
        .x_label_area_size(40)
        .y_label_area_size(40)
        .build_cartesian_2d(0..LAST_DAY, 0.0..24.0)
        .map_err(|e| plot_err(&e))?;

    chart
        .configure_mesh()
        .x_labels(28)
        .y_labels(5)
        .x_desc("Day")
        .y_desc("Time/Duration (h)")
        .draw()
        .map_err(|e| plot_err(&e))?;

    for quantity in Quantity::ALL {
        let color = series_color(quantity);
        let points = observations.iter().map(|o| (o.yday as i32, o.value(quantity)));
        chart
            .draw_series(LineSeries::new(points, &color).point_size(5))
            .map_err(|e| plot_err(&e))?
            .label(quantity.label())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    for f in fits {
        let curve = f.curve;
        let line = (0..LAST_DAY).map(move |day| (day, curve.evaluate(day as f64)));
        chart
            .draw_series(LineSeries::new(line, &series_color(f.quantity)))
            .map_err(|e| plot_err(&e))?
            .label(format!("{} Fitment", f.quantity.label()));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .position(SeriesLabelPosition::UpperRight)
        .draw()
        .map_err(|e| plot_err(&e))?;

    root.present().map_err(|e| plot_err(&e))?;
    tracing::info!(file = %path.display(), series = fits.len(), "wrote chart");
    Ok(())
}

// ===================== TESTS =====================
