use std::path::Path;

use anyhow::Result;
use pathest::Trajectory;
use plotters::prelude::*;

const SIZE: (u32, u32) = (800, 800);

/// Axis extents shared by every plot of one run, so estimates line up with the input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlotBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl PlotBounds {
    pub fn from_trajectory(data: &Trajectory) -> Result<Self> {
        let (min_x, max_x) = widen(data.min_x()?, data.max_x()?);
        let (min_y, max_y) = widen(data.min_y()?, data.max_y()?);
        Ok(Self {
            min_x,
            max_x,
            min_y,
            max_y,
        })
    }
}

// An empty axis range can't be drawn
fn widen(min: f64, max: f64) -> (f64, f64) {
    if min < max {
        (min, max)
    } else {
        (min - 0.5, max + 0.5)
    }
}

/// Draws every sample as a dot, blue at the first timestamp and shading to red at the last. When
/// all samples share one timestamp, only the axes are drawn.
pub fn write_svg(path: &Path, title: &str, bounds: &PlotBounds, data: &Trajectory) -> Result<()> {
    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(bounds.min_x..bounds.max_x, bounds.min_y..bounds.max_y)
        .map_err(plot_error)?;
    chart.configure_mesh().draw().map_err(plot_error)?;

    if let (Ok(t_min), Ok(t_max)) = (data.min_t(), data.max_t()) {
        if t_max > t_min {
            chart
                .draw_series(data.iter().map(|s| {
                    let color = time_color((s.t - t_min) / (t_max - t_min));
                    Circle::new((s.x, s.y), 2, color.filled())
                }))
                .map_err(plot_error)?;
        }
    }
    root.present().map_err(plot_error)?;
    Ok(())
}

/// `progress` runs from 0 at the first timestamp to 1 at the last.
fn time_color(progress: f64) -> HSLColor {
    HSLColor((240.0 - 240.0 * progress) / 360.0, 0.8, 0.6)
}

fn plot_error<E: std::fmt::Debug>(err: E) -> anyhow::Error {
    anyhow!("Plotting failed: {:?}", err)
}
