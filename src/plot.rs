//! PNG rendering of a finished flight with plotters.
//!
//! Two images per run: the coordinates against time, and the path in the
//! launch plane above the speed against time. Both mark the apex and the
//! ground impact.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;

use crate::core::trajectory::{FlightSummary, Trajectory};
use crate::core::window::{DISTANCE_TO_HEIGHT_RATIO, fixed_ratio_axis_window, padded_value_range};

pub type PlotResult<T> = Result<T, Box<dyn std::error::Error>>;

type TimeChart<'a, 'b> = ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

const FONT: &str = "sans-serif";
const MARKER_COLOR: RGBColor = RED;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlotFiles {
    pub position: PathBuf,
    pub trajectory: PathBuf,
}

/// File name prefix for a run started at `at`.
pub fn file_stamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%Y%m%d-%H%M%S").to_string()
}

pub fn render_plots(
    trajectory: &Trajectory,
    summary: &FlightSummary,
    output_dir: &Path,
    stamp: &str,
) -> PlotResult<PlotFiles> {
    fs::create_dir_all(output_dir)?;

    let files = PlotFiles {
        position: output_dir.join(format!("{stamp}_position.png")),
        trajectory: output_dir.join(format!("{stamp}_trajectory.png")),
    };
    draw_position_view(trajectory, summary, &files.position)?;
    draw_trajectory_view(trajectory, summary, &files.trajectory)?;

    Ok(files)
}

fn draw_position_view(trajectory: &Trajectory, summary: &FlightSummary, path: &Path) -> PlotResult<()> {
    let samples = trajectory.samples();
    let root = BitMapBackend::new(path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let t_max = time_axis_end(summary);
    let value_range = padded_value_range(samples.iter().flat_map(|s| [s.state.x, s.state.y]));
    let mut chart = ChartBuilder::on(&root)
        .caption("Projectile coordinates over time", (FONT, 26))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(0.0..t_max, value_range.0..value_range.1)?;

    chart
        .configure_mesh()
        .x_desc("Time (s)")
        .y_desc("Position (m)")
        .draw()?;

    chart
        .draw_series(LineSeries::new(samples.iter().map(|s| (s.t, s.state.x)), BLUE.stroke_width(2)))?
        .label("x(t): horizontal position")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));
    chart
        .draw_series(LineSeries::new(samples.iter().map(|s| (s.t, s.state.y)), GREEN.stroke_width(2)))?
        .label("y(t): height")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], GREEN));

    let label_height = summary.apex_height + 0.03 * (value_range.1 - value_range.0);
    draw_time_marker(
        &mut chart,
        summary.apex_time,
        value_range,
        &format!("{:.2} m/s (apex)", summary.apex_speed),
        label_height,
    )?;
    draw_time_marker(
        &mut chart,
        summary.impact_time,
        value_range,
        &format!("{:.2} m/s (impact)", summary.impact_speed),
        0.05 * (value_range.1 - value_range.0),
    )?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

fn draw_trajectory_view(trajectory: &Trajectory, summary: &FlightSummary, path: &Path) -> PlotResult<()> {
    let samples = trajectory.samples();
    let root = BitMapBackend::new(path, (1000, 900)).into_drawing_area();
    root.fill(&WHITE)?;
    let (upper, lower) = root.split_vertically(480);

    let max_x = samples.iter().map(|s| s.state.x).fold(0.0, f64::max);
    let max_y = samples.iter().map(|s| s.state.y).fold(0.0, f64::max);
    let (x_span, y_span) = fixed_ratio_axis_window(max_x, max_y, DISTANCE_TO_HEIGHT_RATIO);

    let mut path_chart = ChartBuilder::on(&upper)
        .caption("Trajectory", (FONT, 24))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(0.0..x_span, 0.0..y_span)?;
    path_chart
        .configure_mesh()
        .x_desc("Distance (m)")
        .y_desc("Height (m)")
        .draw()?;
    path_chart.draw_series(LineSeries::new(
        samples.iter().map(|s| (s.state.x, s.state.y.max(0.0))),
        BLUE.stroke_width(2),
    ))?;

    let marked = [
        (summary.apex_time, format!("{:.2} m/s (apex)", summary.apex_speed)),
        (summary.impact_time, format!("{:.2} m/s (impact)", summary.impact_speed)),
    ];
    for (t, label) in marked {
        if let Some(state) = trajectory.interpolate(t) {
            let point = (state.x, state.y.max(0.0));
            path_chart.draw_series(std::iter::once(Circle::new(point, 5, MARKER_COLOR.filled())))?;
            path_chart.draw_series(std::iter::once(Text::new(
                label,
                (state.x, state.y.max(0.0) + 0.04 * y_span),
                (FONT, 16).into_font().color(&MARKER_COLOR),
            )))?;
        }
    }

    let t_max = time_axis_end(summary);
    let speed_range = padded_value_range(samples.iter().map(|s| s.state.speed()));
    let mut speed_chart = ChartBuilder::on(&lower)
        .caption("Speed over time", (FONT, 24))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(0.0..t_max, speed_range.0..speed_range.1)?;
    speed_chart
        .configure_mesh()
        .x_desc("Time (s)")
        .y_desc("Speed (m/s)")
        .draw()?;
    speed_chart.draw_series(LineSeries::new(
        samples.iter().map(|s| (s.t, s.state.speed())),
        MAGENTA.stroke_width(2),
    ))?;

    let label_height = speed_range.0 + 0.9 * (speed_range.1 - speed_range.0);
    draw_time_marker(&mut speed_chart, summary.apex_time, speed_range, "apex", label_height)?;
    draw_time_marker(&mut speed_chart, summary.impact_time, speed_range, "impact", label_height)?;

    root.present()?;
    Ok(())
}

/// Dashed vertical line at `t` across `(lo, hi)` with a label to its right.
fn draw_time_marker(
    chart: &mut TimeChart<'_, '_>,
    t: f64,
    (lo, hi): (f64, f64),
    label: &str,
    label_y: f64,
) -> PlotResult<()> {
    chart.draw_series(DashedLineSeries::new(
        vec![(t, lo), (t, hi)],
        8,
        5,
        MARKER_COLOR.stroke_width(1),
    ))?;

    let (t_lo, t_hi) = {
        let range = chart.x_range();
        (range.start, range.end)
    };
    let offset = 0.005 * (t_hi - t_lo);
    chart.draw_series(std::iter::once(Text::new(
        label.to_string(),
        (t + offset, label_y),
        (FONT, 16).into_font().color(&MARKER_COLOR),
    )))?;
    Ok(())
}

fn time_axis_end(summary: &FlightSummary) -> f64 {
    (summary.impact_time * 1.12).max(1e-3)
}
