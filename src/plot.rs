// src/plot.rs
//
// PNG export of the two learning-curve artifacts:
// - by-episode final fitness for the whole run
// - (step, fitness) curve for one episode
//
// Rendering failures are surfaced as errors to the caller, which logs and
// keeps streaming; a broken plot must never stall aggregation.

use std::error::Error;
use std::path::{Path, PathBuf};

use chrono::Local;
use plotters::prelude::*;

use crate::types::EpisodeSummary;

/// Filename stamp layout: `<prefix><YYYY-MM-DD-HH-MM-SS><suffix>`.
const FILE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// Default image size for both artifacts.
const PLOT_SIZE: (u32, u32) = (800, 600);

/// Build a timestamped artifact filename.
pub fn timestamped_filename(prefix: &str, suffix: &str) -> String {
    format!(
        "{}{}{}",
        prefix,
        Local::now().format(FILE_TIMESTAMP_FORMAT),
        suffix
    )
}

/// Join a timestamped artifact filename onto an output directory.
pub fn timestamped_path(dir: &Path, prefix: &str, suffix: &str) -> PathBuf {
    dir.join(timestamped_filename(prefix, suffix))
}

fn value_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for v in values {
        if v.is_finite() {
            lo = lo.min(v);
            hi = hi.max(v);
        }
    }
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    if (hi - lo).abs() < f64::EPSILON {
        // Flat series: pad so the axis has height.
        return (lo - 1.0, hi + 1.0);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}

/// Render the by-episode final-fitness curve for a run.
///
/// X is the closure index of each episode, Y its final fitness. An empty
/// series renders nothing and reports success.
pub fn render_run_series(path: &Path, series: &[(usize, f64)]) -> Result<(), Box<dyn Error>> {
    if series.is_empty() {
        return Ok(());
    }

    let (y_min, y_max) = value_range(series.iter().map(|&(_, f)| f));
    let x_max = (series.len().saturating_sub(1)).max(1) as f64;

    let root = BitMapBackend::new(path, PLOT_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("By-episode fitness", ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc("episode")
        .y_desc("fitness")
        .draw()?;

    let points: Vec<(f64, f64)> = series.iter().map(|&(i, f)| (i as f64, f)).collect();
    chart.draw_series(LineSeries::new(points, &BLUE))?;

    root.present()?;
    Ok(())
}

/// Render the (step, fitness) curve of one closed episode.
pub fn render_episode_curve(path: &Path, summary: &EpisodeSummary) -> Result<(), Box<dyn Error>> {
    if summary.samples.is_empty() {
        return Ok(());
    }

    let (y_min, y_max) = value_range(summary.samples.iter().map(|&(_, f)| f));
    let x_max = summary
        .samples
        .iter()
        .map(|&(s, _)| s)
        .max()
        .unwrap_or(0)
        .max(1) as f64;

    let root = BitMapBackend::new(path, PLOT_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Episodes", ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc("step")
        .y_desc("fitness")
        .draw()?;

    let points: Vec<(f64, f64)> = summary
        .samples
        .iter()
        .map(|&(s, f)| (s as f64, f))
        .collect();
    chart.draw_series(LineSeries::new(points, &RED))?;

    root.present()?;
    Ok(())
}
