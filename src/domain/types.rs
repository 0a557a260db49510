//! Shared domain types.
//!
//! These are the small value types that flow between the model layer, the
//! guess session and the front-ends:
//!
//! - `Shape`: the editable poly-selector overlay
//! - `Operator`: how a composite model combines its children
//! - `Capability`: which interactive operation a component was asked for
//! - `SessionConfig`: a full run's configuration as understood by the app

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A polyline overlay: vertices `(xs[i], ys[i])`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Shape {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
}

impl Shape {
    /// Build a shape from parallel coordinate vectors.
    ///
    /// Extra coordinates on the longer side are dropped so the invariant
    /// `xs.len() == ys.len()` always holds.
    pub fn new(mut xs: Vec<f64>, mut ys: Vec<f64>) -> Self {
        let n = xs.len().min(ys.len());
        xs.truncate(n);
        ys.truncate(n);
        Self { xs, ys }
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    pub fn vertex(&self, idx: usize) -> Option<(f64, f64)> {
        Some((*self.xs.get(idx)?, *self.ys.get(idx)?))
    }

    pub fn vertices(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.xs.iter().copied().zip(self.ys.iter().copied())
    }

    /// Copy of this shape with one vertex moved. `None` if `idx` is out of range.
    pub fn with_vertex(&self, idx: usize, x: f64, y: f64) -> Option<Shape> {
        if idx >= self.len() {
            return None;
        }
        let mut out = self.clone();
        out.xs[idx] = x;
        out.ys[idx] = y;
        Some(out)
    }
}

/// Binary operator of a composite model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    /// Apply pointwise. Division follows IEEE semantics (inf/NaN, no error).
    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            Operator::Add => a + b,
            Operator::Subtract => a - b,
            Operator::Multiply => a * b,
            Operator::Divide => a / b,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Subtract => '-',
            Operator::Multiply => '*',
            Operator::Divide => '/',
        }
    }

    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            '+' => Some(Operator::Add),
            '-' => Some(Operator::Subtract),
            '*' => Some(Operator::Multiply),
            '/' => Some(Operator::Divide),
            _ => None,
        }
    }
}

/// The three interactive operations a leaf component may implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    Scroll,
    ToShape,
    FromShape,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Capability::Scroll => "scroll-update",
            Capability::ToShape => "shape export",
            Capability::FromShape => "shape import",
        };
        f.write_str(label)
    }
}

/// Where the observed data comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    /// Two columns of a CSV file.
    Csv {
        path: PathBuf,
        x_col: String,
        y_col: String,
    },
    /// Synthetic multi-peak demo data.
    Demo { seed: u64, points: usize, noise: f64 },
}

/// A full run's configuration, derived from CLI flags, `.env` and defaults.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub data: DataSource,
    /// Model expression, e.g. `gaussian:g0_ + linear:bk_`.
    pub model_expr: String,
    /// Seed file providing the initial parameter set (skips `guess`).
    pub params_path: Option<PathBuf>,
    /// Explicit `name=value` overrides applied on top of the initial set.
    pub overrides: Vec<(String, f64)>,
    /// Number of points on the curve-rendering grid.
    pub grid_points: usize,
    /// Scroll ticks produced by one wheel notch.
    pub ticks_per_notch: i32,
    pub export_path: Option<PathBuf>,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
}
