//! Shared plotters plumbing.

use std::{fs, ops::Range, path::Path};

use plotters::prelude::*;
use polars::prelude::{DataFrame, DataType};
use stockcast_primitives::{columns, from_epoch_days};
use stockcast_stats::column_options;
use tracing::info;

use crate::{ChartConfig, VizError};

const CAPTION_FONT: (&str, u32) = ("sans-serif", 24);

/// One line of a time-series chart; `x` is days since 1970-01-01.
#[derive(Debug)]
pub(crate) struct Line {
    pub(crate) label: String,
    pub(crate) color: RGBColor,
    pub(crate) points: Vec<(f64, f64)>,
}

fn render_error(err: impl std::fmt::Display) -> VizError {
    VizError::Render(err.to_string())
}

fn check_size(config: &ChartConfig) -> Result<(), VizError> {
    if config.width == 0 || config.height == 0 {
        return Err(VizError::InvalidConfig(format!(
            "chart size {}x{} is empty",
            config.width, config.height
        )));
    }
    Ok(())
}

/// `(day, value)` pairs of `column` for rows with a finite value.
pub(crate) fn dated_values(df: &DataFrame, column: &str) -> Result<Vec<(f64, f64)>, VizError> {
    let dates = df
        .column(columns::DATE)
        .ok()
        .filter(|c| c.dtype() == &DataType::Date)
        .ok_or_else(|| VizError::MissingColumn(columns::DATE.to_string()))?
        .cast(&DataType::Int32)?;
    let values = column_options(df, column).map_err(|_| VizError::MissingColumn(column.to_string()))?;

    let points: Vec<(f64, f64)> = dates
        .i32()?
        .into_iter()
        .zip(values)
        .filter_map(|(d, v)| Some((f64::from(d?), v?)))
        .filter(|(_, v)| v.is_finite())
        .collect();
    if points.is_empty() {
        return Err(VizError::EmptyData(column.to_string()));
    }
    Ok(points)
}

fn padded(lo: f64, hi: f64) -> Range<f64> {
    let pad = if hi > lo { 0.05 * (hi - lo) } else { lo.abs().max(1.0) * 0.05 };
    (lo - pad)..(hi + pad)
}

fn format_day(x: &f64) -> String {
    from_epoch_days(x.round() as i32).map(|d| d.to_string()).unwrap_or_default()
}

/// Render lines sharing a date axis.
pub(crate) fn line_chart(
    title: &str,
    y_desc: &str,
    lines: &[Line],
    config: &ChartConfig,
) -> Result<String, VizError> {
    check_size(config)?;
    let points = || lines.iter().flat_map(|l| l.points.iter().copied());
    let (x_lo, x_hi) = points().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (x, _)| {
        (lo.min(x), hi.max(x))
    });
    let (y_lo, y_hi) = points().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, y)| {
        (lo.min(y), hi.max(y))
    });
    if !x_lo.is_finite() {
        return Err(VizError::EmptyData(title.to_string()));
    }
    let x_range = if x_hi > x_lo { x_lo..x_hi } else { (x_lo - 1.0)..(x_hi + 1.0) };

    let mut svg = String::new();
    {
        let root =
            SVGBackend::with_string(&mut svg, (config.width, config.height)).into_drawing_area();
        root.fill(&WHITE).map_err(render_error)?;
        let mut chart = ChartBuilder::on(&root)
            .caption(title, CAPTION_FONT)
            .margin(12)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(x_range, padded(y_lo, y_hi))
            .map_err(render_error)?;
        chart
            .configure_mesh()
            .x_desc("Date")
            .y_desc(y_desc)
            .x_labels(8)
            .x_label_formatter(&format_day)
            .draw()
            .map_err(render_error)?;

        for line in lines {
            let color = line.color;
            chart
                .draw_series(LineSeries::new(line.points.iter().copied(), color.stroke_width(2)))
                .map_err(render_error)?
                .label(line.label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(render_error)?;
        root.present().map_err(render_error)?;
    }
    Ok(svg)
}

/// Bin counts of `values` over `[lo, hi]` in `bins` equal-width bins.
pub(crate) fn bin_counts(values: &[f64], lo: f64, hi: f64, bins: usize) -> Vec<usize> {
    let mut counts = vec![0; bins];
    let width = (hi - lo) / bins as f64;
    for v in values {
        let idx = if width > 0.0 { ((v - lo) / width).floor() as usize } else { 0 };
        counts[idx.min(bins - 1)] += 1;
    }
    counts
}

/// Render a histogram with an optional labelled vertical marker.
pub(crate) fn histogram_chart(
    title: &str,
    values: &[f64],
    marker: Option<(String, f64)>,
    config: &ChartConfig,
) -> Result<String, VizError> {
    check_size(config)?;
    if config.bins == 0 {
        return Err(VizError::InvalidConfig("histogram needs at least one bin".to_string()));
    }
    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !lo.is_finite() {
        return Err(VizError::EmptyData(title.to_string()));
    }
    let counts = bin_counts(values, lo, hi, config.bins);
    let width = if hi > lo { (hi - lo) / config.bins as f64 } else { 1.0 };
    let y_max = counts.iter().copied().max().unwrap_or(0) as f64 * 1.1 + 1.0;

    let marker_x = marker.as_ref().map(|(_, x)| *x);
    let x_lo = marker_x.map_or(lo, |m| m.min(lo));
    let x_hi = marker_x.map_or(hi + width, |m| m.max(hi + width));

    let mut svg = String::new();
    {
        let root =
            SVGBackend::with_string(&mut svg, (config.width, config.height)).into_drawing_area();
        root.fill(&WHITE).map_err(render_error)?;
        let mut chart = ChartBuilder::on(&root)
            .caption(title, CAPTION_FONT)
            .margin(12)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(padded(x_lo, x_hi), 0.0..y_max)
            .map_err(render_error)?;
        chart
            .configure_mesh()
            .x_desc("Daily Return")
            .y_desc("Frequency")
            .draw()
            .map_err(render_error)?;

        chart
            .draw_series(counts.iter().enumerate().map(|(i, &count)| {
                let x0 = lo + i as f64 * width;
                Rectangle::new([(x0, 0.0), (x0 + width, count as f64)], BLUE.mix(0.6).filled())
            }))
            .map_err(render_error)?;

        if let Some((label, x)) = marker {
            chart
                .draw_series(LineSeries::new(vec![(x, 0.0), (x, y_max)], RED.stroke_width(2)))
                .map_err(render_error)?
                .label(label)
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));
            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()
                .map_err(render_error)?;
        }
        root.present().map_err(render_error)?;
    }
    Ok(svg)
}

/// Write `svg` to `out` when a path is given, creating parent directories.
pub(crate) fn persist(svg: String, out: Option<&Path>) -> Result<String, VizError> {
    if let Some(path) = out {
        let io = |source: std::io::Error| VizError::Io { path: path.to_path_buf(), source };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io)?;
        }
        fs::write(path, &svg).map_err(io)?;
        info!(path = %path.display(), "chart written");
    }
    Ok(svg)
}
