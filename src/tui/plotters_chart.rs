//! Plotters-powered guess chart widget for Ratatui.
//!
//! Plotters output is rendered into the Ratatui buffer via
//! `plotters-ratatui-backend`. The plotting area fills the whole widget rect
//! (no margins, no label areas) so terminal cells map linearly onto data
//! coordinates; tick labels are drawn around it by the caller.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::domain::Shape;

/// Render-only chart description; all series and bounds are computed outside
/// the render call.
pub struct GuessPlottersChart<'a> {
    /// Observed data.
    pub data: &'a [(f64, f64)],
    /// Model curve on the plot grid. Non-finite values break the line.
    pub curve: &'a [(f64, f64)],
    /// Editable overlays, keyed by leaf component index.
    pub shapes: &'a [(usize, Shape)],
    /// Highlighted component.
    pub selected: Option<usize>,
    /// Highlighted vertex of the selected component.
    pub selected_vertex: Option<usize>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

impl<'a> Widget for GuessPlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to build a chart in a tiny area.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root).margin(0).build_cartesian_2d(x0..x1, y0..y1)?;

            let data_color = WHITE;
            let curve_color = RGBColor(0, 255, 255); // cyan
            let shape_color = RGBColor(255, 255, 0); // yellow
            let selected_color = RGBColor(0, 255, 0); // green
            let vertex_color = RGBColor(255, 0, 255); // magenta

            chart.draw_series(self.data.iter().map(|&(x, y)| Pixel::new((x, y), data_color)))?;

            for segment in finite_segments(self.curve) {
                chart.draw_series(LineSeries::new(segment.iter().copied(), &curve_color))?;
            }

            for (idx, shape) in self.shapes {
                let is_selected = self.selected == Some(*idx);
                let color = if is_selected { selected_color } else { shape_color };
                let vertices: Vec<(f64, f64)> = shape.vertices().collect();
                chart.draw_series(LineSeries::new(vertices.iter().copied(), &color))?;

                // `Circle` radii are mis-scaled by the backend; a pixel marker
                // renders reliably.
                chart.draw_series(vertices.iter().enumerate().map(|(v, &(x, y))| {
                    let marker = if is_selected && self.selected_vertex == Some(v) {
                        vertex_color
                    } else {
                        color
                    };
                    Pixel::new((x, y), marker)
                }))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

/// Split a polyline at non-finite points.
fn finite_segments(points: &[(f64, f64)]) -> Vec<&[(f64, f64)]> {
    points
        .split(|(x, y)| !(x.is_finite() && y.is_finite()))
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_break_at_non_finite_points() {
        let pts = [(0.0, 1.0), (1.0, f64::INFINITY), (2.0, 1.0), (3.0, 1.0), (4.0, f64::NAN)];
        let segs = finite_segments(&pts);
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[0].len(), 1);
        assert_eq!(segs[1].len(), 2);
    }
}
