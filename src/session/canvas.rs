//! Rendering boundary of the guess session.
//!
//! The session only ever issues the commands below; what they look like on
//! screen is up to the implementation. `Scene` keeps the latest picture in
//! memory, which is what the terminal UI draws from (and what tests inspect).

use crate::domain::Shape;

pub trait Canvas {
    /// Observed data. Drawn once when the session starts.
    fn draw_data(&mut self, x: &[f64], y: &[f64]);

    /// Model curve evaluated on the plot grid.
    fn draw_curve(&mut self, x: &[f64], y: &[f64]);

    /// Editable overlay for leaf component `component`.
    fn draw_shape(&mut self, component: usize, shape: &Shape);

    /// Remove the curve and all shape overlays (data stays).
    fn clear_overlay(&mut self);

    /// One-line status for the user.
    fn set_status(&mut self, status: &str) {
        let _ = status;
    }
}

impl<C: Canvas + ?Sized> Canvas for &mut C {
    fn draw_data(&mut self, x: &[f64], y: &[f64]) {
        (**self).draw_data(x, y);
    }

    fn draw_curve(&mut self, x: &[f64], y: &[f64]) {
        (**self).draw_curve(x, y);
    }

    fn draw_shape(&mut self, component: usize, shape: &Shape) {
        (**self).draw_shape(component, shape);
    }

    fn clear_overlay(&mut self) {
        (**self).clear_overlay();
    }

    fn set_status(&mut self, status: &str) {
        (**self).set_status(status);
    }
}

/// In-memory canvas: the current picture as plain data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub data: Vec<(f64, f64)>,
    pub curve: Vec<(f64, f64)>,
    pub shapes: Vec<(usize, Shape)>,
    pub status: String,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shape(&self, component: usize) -> Option<&Shape> {
        self.shapes
            .iter()
            .find(|(idx, _)| *idx == component)
            .map(|(_, s)| s)
    }

    /// Axis bounds covering data, curve and overlays, padded by 5% in y.
    ///
    /// Non-finite values (e.g. from a division model) are skipped.
    pub fn bounds(&self) -> ([f64; 2], [f64; 2]) {
        let mut x0 = f64::INFINITY;
        let mut x1 = f64::NEG_INFINITY;
        let mut y0 = f64::INFINITY;
        let mut y1 = f64::NEG_INFINITY;

        let points = self
            .data
            .iter()
            .chain(self.curve.iter())
            .copied()
            .chain(self.shapes.iter().flat_map(|(_, s)| s.vertices()));
        for (x, y) in points {
            if x.is_finite() {
                x0 = x0.min(x);
                x1 = x1.max(x);
            }
            if y.is_finite() {
                y0 = y0.min(y);
                y1 = y1.max(y);
            }
        }

        if !x0.is_finite() || !x1.is_finite() || x1 <= x0 {
            let mid = if x0.is_finite() { x0 } else { 0.0 };
            x0 = mid - 0.5;
            x1 = mid + 0.5;
        }
        if !y0.is_finite() || !y1.is_finite() || y1 <= y0 {
            let mid = if y0.is_finite() { y0 } else { 0.0 };
            y0 = mid - 0.5;
            y1 = mid + 0.5;
        }

        let pad = ((y1 - y0).abs() * 0.05).max(1e-12);
        ([x0, x1], [y0 - pad, y1 + pad])
    }
}

impl Canvas for Scene {
    fn draw_data(&mut self, x: &[f64], y: &[f64]) {
        self.data = x.iter().copied().zip(y.iter().copied()).collect();
    }

    fn draw_curve(&mut self, x: &[f64], y: &[f64]) {
        self.curve = x.iter().copied().zip(y.iter().copied()).collect();
    }

    fn draw_shape(&mut self, component: usize, shape: &Shape) {
        match self.shapes.iter_mut().find(|(idx, _)| *idx == component) {
            Some(slot) => slot.1 = shape.clone(),
            None => self.shapes.push((component, shape.clone())),
        }
    }

    fn clear_overlay(&mut self) {
        self.curve.clear();
        self.shapes.clear();
    }

    fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }
}
