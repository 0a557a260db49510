//! Interactive guess session.
//!
//! A session owns a model, the observed data and the live parameter set. It
//! keeps three things in sync on every gesture:
//!
//! - the parameter set
//! - the model curve on the plot grid
//! - one editable shape per leaf component that supports shapes
//!
//! Everything runs on the caller's thread; front-ends feed gestures into
//! `Session::handle` from their own event loop.
//!
//! Failure policy:
//! - a component reporting `Unsupported` gets that interaction disabled, the
//!   session stays active
//! - any other failure rejects the gesture and re-presents the last frame that
//!   rendered successfully; parameters are only adopted together with a frame

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::domain::{Capability, ParamSet, Shape};
use crate::error::ModelError;
use crate::models::Model;

pub mod canvas;
pub mod gesture;

pub use canvas::*;
pub use gesture::*;

/// Default number of points on the curve-rendering grid.
pub const DEFAULT_PLOT_POINTS: usize = 200;

/// What is on screen for one parameter set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    /// Model values on the plot grid.
    pub curve: Vec<f64>,
    /// Overlay per leaf component; `None` where the component has no shape.
    pub shapes: Vec<Option<Shape>>,
}

/// Nearest editable vertex to a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexHit {
    pub component: usize,
    pub vertex: usize,
    /// Distance in range-normalized data units (1.0 = full axis span).
    pub distance: f64,
}

pub struct Session<C: Canvas> {
    model: Model,
    x: Vec<f64>,
    y: Vec<f64>,
    plot_xs: Vec<f64>,
    seed: ParamSet,
    params: ParamSet,
    frame: Frame,
    state: SessionState,
    disabled: BTreeSet<(usize, Capability)>,
    status: String,
    canvas: C,
}

/// Start a guess session and render its first frame.
///
/// - `x` defaults to sample indices `0, 1, 2, ...`
/// - `params` defaults to `model.guess(x, y)`
/// - `plot_xs` defaults to a uniform grid of `DEFAULT_PLOT_POINTS` over `x`
///
/// Errors here are fatal: there is no earlier frame to fall back to.
pub fn start_interactive_session<C: Canvas>(
    model: Model,
    y: Vec<f64>,
    x: Option<Vec<f64>>,
    params: Option<ParamSet>,
    plot_xs: Option<Vec<f64>>,
    canvas: C,
) -> Result<Session<C>, ModelError> {
    if y.is_empty() {
        return Err(ModelError::EmptyData);
    }
    let x = x.unwrap_or_else(|| (0..y.len()).map(|i| i as f64).collect());
    if x.len() != y.len() {
        return Err(ModelError::LengthMismatch {
            expected: x.len(),
            actual: y.len(),
        });
    }
    let plot_xs = plot_xs.unwrap_or_else(|| plot_grid(&x, DEFAULT_PLOT_POINTS));

    let seed = match params {
        Some(p) => p,
        None => model.guess(&x, &y)?,
    };

    let mut session = Session {
        model,
        x,
        y,
        plot_xs,
        params: seed.clone(),
        seed,
        frame: Frame::default(),
        state: SessionState::Initializing,
        disabled: BTreeSet::new(),
        status: String::new(),
        canvas,
    };

    session.canvas.draw_data(&session.x, &session.y);

    let (frame, shapeless) = session.compute_frame(&session.params)?;
    for idx in shapeless {
        session.disabled.insert((idx, Capability::ToShape));
    }
    session.frame = frame;
    session.status = "scroll to resize, drag vertices to move; Enter commits, Esc cancels".to_string();
    session.present();
    session.state = SessionState::Active;

    info!(
        model = %session.model.describe(),
        points = session.x.len(),
        params = session.params.len(),
        "guess session started"
    );
    Ok(session)
}

/// Uniform grid of `n` points spanning the range of `x`.
///
/// A degenerate range is widened by ±0.5 so the grid always has extent.
pub fn plot_grid(x: &[f64], n: usize) -> Vec<f64> {
    let n = n.max(2);
    let (mut x0, mut x1) = x
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if !(x0.is_finite() && x1.is_finite()) {
        x0 = 0.0;
        x1 = 1.0;
    }
    if (x1 - x0).abs() < 1e-12 {
        x0 -= 0.5;
        x1 += 0.5;
    }
    (0..n)
        .map(|i| {
            let u = i as f64 / (n as f64 - 1.0);
            x0 + u * (x1 - x0)
        })
        .collect()
}

impl<C: Canvas> Session<C> {
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Current (live) parameter set.
    pub fn params(&self) -> &ParamSet {
        &self.params
    }

    /// The set the session started from.
    pub fn seed(&self) -> &ParamSet {
        &self.seed
    }

    /// Final parameters; only available after a commit.
    pub fn result(&self) -> Option<&ParamSet> {
        match self.state {
            SessionState::Committed => Some(&self.params),
            _ => None,
        }
    }

    pub fn into_result(self) -> Option<ParamSet> {
        match self.state {
            SessionState::Committed => Some(self.params),
            _ => None,
        }
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn plot_xs(&self) -> &[f64] {
        &self.plot_xs
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn shape(&self, component: usize) -> Option<&Shape> {
        self.frame.shapes.get(component).and_then(|s| s.as_ref())
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut C {
        &mut self.canvas
    }

    pub fn component_count(&self) -> usize {
        self.model.leaves().len()
    }

    /// `kind[prefix]` per leaf component.
    pub fn component_labels(&self) -> Vec<String> {
        self.model.leaves().iter().map(|c| c.label()).collect()
    }

    pub fn is_disabled(&self, component: usize, capability: Capability) -> bool {
        self.disabled.contains(&(component, capability))
    }

    /// Re-issue the current frame. Calling this repeatedly without a gesture
    /// in between leaves the canvas unchanged.
    pub fn redraw(&mut self) {
        self.present();
    }

    /// Feed one gesture through the session.
    pub fn handle(&mut self, gesture: Gesture) -> Outcome {
        if self.state.is_terminal() {
            debug!(state = self.state.label(), ?gesture, "gesture after termination ignored");
            return Outcome::Ignored;
        }

        match gesture {
            Gesture::Scroll { ticks, target } => self.on_scroll(ticks, &target),
            Gesture::Drag {
                target,
                vertex,
                x,
                y,
            } => self.on_drag(&target, vertex, x, y),
            Gesture::Commit => self.commit(),
            Gesture::Cancel => self.cancel(),
        }
    }

    /// Closest shape vertex to the data-space point `(x, y)`.
    ///
    /// Distances are measured after scaling each axis by the data span, so the
    /// result does not depend on the units of x and y.
    pub fn nearest_vertex(&self, x: f64, y: f64) -> Option<VertexHit> {
        let sx = span(&self.x);
        let sy = span(&self.y);

        let mut best: Option<VertexHit> = None;
        for (component, shape) in self.frame.shapes.iter().enumerate() {
            let Some(shape) = shape else { continue };
            for (vertex, (vx, vy)) in shape.vertices().enumerate() {
                let dx = (vx - x) / sx;
                let dy = (vy - y) / sy;
                let distance = (dx * dx + dy * dy).sqrt();
                if !distance.is_finite() {
                    continue;
                }
                if best.is_none_or(|b| distance < b.distance) {
                    best = Some(VertexHit {
                        component,
                        vertex,
                        distance,
                    });
                }
            }
        }
        best
    }

    fn resolve_target(&self, target: &Target) -> Result<usize, ModelError> {
        let leaves = self.model.leaves();
        match target {
            Target::Auto => {
                if leaves.len() == 1 {
                    return Ok(0);
                }
                let editable: Vec<usize> = self
                    .frame
                    .shapes
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| s.is_some())
                    .map(|(i, _)| i)
                    .collect();
                match editable.as_slice() {
                    [only] => Ok(*only),
                    _ => Err(ModelError::NoTarget(format!(
                        "model has {} components, pick one",
                        leaves.len()
                    ))),
                }
            }
            Target::Component(idx) if *idx < leaves.len() => Ok(*idx),
            Target::Component(idx) => Err(ModelError::NoTarget(format!(
                "component {idx} does not exist ({} components)",
                leaves.len()
            ))),
            Target::Prefix(prefix) => leaves
                .iter()
                .position(|c| c.prefix() == prefix)
                .ok_or_else(|| ModelError::NoTarget(format!("no component with prefix '{prefix}'"))),
            Target::Cursor { x, y } => self
                .nearest_vertex(*x, *y)
                .map(|hit| hit.component)
                .ok_or_else(|| ModelError::NoTarget("no editable shape on the plot".to_string())),
        }
    }

    fn on_scroll(&mut self, ticks: i32, target: &Target) -> Outcome {
        let idx = match self.resolve_target(target) {
            Ok(idx) => idx,
            Err(e) => return self.reject(e),
        };
        if self.is_disabled(idx, Capability::Scroll) {
            return self.reject_disabled(idx, Capability::Scroll);
        }

        let update = {
            let leaves = self.model.leaves();
            leaves[idx].scroll_update(ticks, &self.params, &ParamSet::new())
        };
        debug!(component = idx, ticks, "scroll");
        match update {
            Ok(update) => {
                let candidate = self.params.assign_values(&update);
                self.apply(candidate)
            }
            Err(e) => self.fail(idx, e),
        }
    }

    fn on_drag(&mut self, target: &Target, vertex: usize, x: f64, y: f64) -> Outcome {
        let idx = match self.resolve_target(target) {
            Ok(idx) => idx,
            Err(e) => return self.reject(e),
        };
        for capability in [Capability::ToShape, Capability::FromShape] {
            if self.is_disabled(idx, capability) {
                return self.reject_disabled(idx, capability);
            }
        }

        let Some(shape) = self.shape(idx).cloned() else {
            return self.reject(ModelError::NoTarget(format!("component {idx} has no shape")));
        };
        let Some(moved) = shape.with_vertex(vertex, x, y) else {
            return self.reject(ModelError::NoTarget(format!(
                "vertex {vertex} does not exist ({} vertices)",
                shape.len()
            )));
        };

        let update = {
            let leaves = self.model.leaves();
            leaves[idx].from_shape_within(&moved, &self.params)
        };
        debug!(component = idx, vertex, x, y, "drag");
        match update {
            Ok(update) => {
                let candidate = self.params.assign_values(&update);
                self.apply(candidate)
            }
            Err(e) => self.fail(idx, e),
        }
    }

    fn commit(&mut self) -> Outcome {
        if let Err(e) = self.params.check_fit_ready() {
            return self.reject(e);
        }
        self.state = SessionState::Committed;
        self.status = "committed".to_string();
        self.present();
        info!(params = self.params.len(), "guess session committed");
        Outcome::Committed
    }

    fn cancel(&mut self) -> Outcome {
        self.state = SessionState::Cancelled;
        self.params = self.seed.clone();
        match self.compute_frame(&self.params) {
            Ok((frame, _)) => self.frame = frame,
            Err(e) => warn!(error = %e, "seed no longer renders; keeping last frame"),
        }
        self.status = "cancelled".to_string();
        self.present();
        info!("guess session cancelled");
        Outcome::Cancelled
    }

    /// Adopt `candidate` if it renders; otherwise keep the last good frame.
    fn apply(&mut self, candidate: ParamSet) -> Outcome {
        match self.compute_frame(&candidate) {
            Ok((frame, shapeless)) => {
                for idx in shapeless {
                    self.disabled.insert((idx, Capability::ToShape));
                }
                self.params = candidate;
                self.frame = frame;
                self.status = "updated".to_string();
                self.present();
                Outcome::Updated
            }
            Err(e) => self.reject(e),
        }
    }

    fn fail(&mut self, idx: usize, err: ModelError) -> Outcome {
        if let ModelError::Unsupported { capability, .. } = &err {
            self.disabled.insert((idx, *capability));
        }
        self.reject(err)
    }

    fn reject_disabled(&mut self, idx: usize, capability: Capability) -> Outcome {
        let component = self
            .model
            .leaves()
            .get(idx)
            .map(|c| c.prefix().to_string())
            .unwrap_or_default();
        self.reject(ModelError::Unsupported {
            component,
            capability,
        })
    }

    fn reject(&mut self, err: ModelError) -> Outcome {
        if err.is_recoverable() {
            debug!(error = %err, "gesture rejected");
        } else {
            warn!(error = %err, "gesture rejected");
        }
        let message = err.to_string();
        self.status = message.clone();
        self.present();
        Outcome::Rejected(message)
    }

    /// Curve plus shapes for `params`. Also returns the components that turned
    /// out to have no shape support.
    fn compute_frame(&self, params: &ParamSet) -> Result<(Frame, Vec<usize>), ModelError> {
        let curve = self.model.evaluate(&self.plot_xs, params)?;

        let mut shapes = Vec::new();
        let mut shapeless = Vec::new();
        for (idx, leaf) in self.model.leaves().into_iter().enumerate() {
            if self.is_disabled(idx, Capability::ToShape) {
                shapes.push(None);
                continue;
            }
            match leaf.to_shape(params, &ParamSet::new()) {
                Ok(shape) => shapes.push(Some(shape)),
                Err(ModelError::Unsupported { .. }) => {
                    shapeless.push(idx);
                    shapes.push(None);
                }
                Err(e) => return Err(e),
            }
        }

        Ok((Frame { curve, shapes }, shapeless))
    }

    fn present(&mut self) {
        self.canvas.clear_overlay();
        self.canvas.draw_curve(&self.plot_xs, &self.frame.curve);
        for (idx, shape) in self.frame.shapes.iter().enumerate() {
            if let Some(shape) = shape {
                self.canvas.draw_shape(idx, shape);
            }
        }
        self.canvas.set_status(&self.status);
    }
}

fn span(values: &[f64]) -> f64 {
    let (lo, hi) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let s = hi - lo;
    if s.is_finite() && s > 0.0 { s } else { 1.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::gaussian;
    use crate::domain::Parameter;
    use crate::models::{add, Component, Linear, Peak, PeakValues};

    fn bump_data() -> (Vec<f64>, Vec<f64>) {
        let x: Vec<f64> = (0..81).map(|i| -4.0 + 0.1 * i as f64).collect();
        let y = x.iter().map(|&v| gaussian(v, 1.0, 0.0, 1.0)).collect();
        (x, y)
    }

    fn unit_seed() -> ParamSet {
        Peak::gaussian("g_").make_params(
            PeakValues {
                amplitude: 1.0,
                center: 0.0,
                sigma: 1.0,
            },
            None,
        )
    }

    fn single_peak() -> Session<Scene> {
        let (x, y) = bump_data();
        start_interactive_session(
            Model::leaf(Peak::gaussian("g_")),
            y,
            Some(x),
            Some(unit_seed()),
            None,
            Scene::new(),
        )
        .unwrap()
    }

    #[test]
    fn start_renders_data_curve_and_shape() {
        let s = single_peak();
        assert_eq!(s.state(), SessionState::Active);
        assert_eq!(s.canvas().data.len(), 81);
        assert_eq!(s.canvas().curve.len(), DEFAULT_PLOT_POINTS);
        assert_eq!(s.canvas().shape(0).unwrap().xs, vec![-1.0, 0.0]);
    }

    #[test]
    fn start_without_params_guesses() {
        let (x, y) = bump_data();
        let s = start_interactive_session(
            Model::leaf(Peak::gaussian("g_")),
            y,
            Some(x),
            None,
            None,
            Scene::new(),
        )
        .unwrap();
        assert_eq!(s.params().len(), 4);
        assert_eq!(s.seed(), s.params());
    }

    #[test]
    fn start_rejects_mismatched_data() {
        let err = start_interactive_session(
            Model::leaf(Peak::gaussian("g_")),
            vec![1.0, 2.0],
            Some(vec![0.0]),
            None,
            None,
            Scene::new(),
        )
        .err()
        .unwrap();
        assert_eq!(
            err,
            ModelError::LengthMismatch {
                expected: 1,
                actual: 2
            }
        );
    }

    #[test]
    fn missing_x_defaults_to_indices() {
        let s = start_interactive_session(
            Model::leaf(Linear::new("bk_")),
            vec![1.0, 2.0, 3.0],
            None,
            None,
            Some(vec![0.0, 2.0]),
            Scene::new(),
        )
        .unwrap();
        assert_eq!(s.x(), &[0.0, 1.0, 2.0]);
        assert_eq!(s.plot_xs(), &[0.0, 2.0]);
    }

    #[test]
    fn scroll_updates_params_and_shape() {
        let mut s = single_peak();
        let out = s.handle(Gesture::Scroll {
            ticks: 700,
            target: Target::Auto,
        });
        assert_eq!(out, Outcome::Updated);
        assert!((s.params().value("g_sigma").unwrap() - 2.0).abs() < 1e-12);
        assert_eq!(s.canvas().shape(0).unwrap().xs, vec![-2.0, 0.0]);
    }

    #[test]
    fn drag_moves_the_peak() {
        let mut s = single_peak();
        let peak_y = s.shape(0).unwrap().ys[1];
        let out = s.handle(Gesture::Drag {
            target: Target::Component(0),
            vertex: 1,
            x: 0.5,
            y: peak_y,
        });
        assert_eq!(out, Outcome::Updated);
        assert!((s.params().value("g_center").unwrap() - 0.5).abs() < 1e-12);
        assert!((s.params().value("g_sigma").unwrap() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn degenerate_drag_keeps_last_good_state() {
        let mut s = single_peak();
        let before = s.params().clone();
        let scene_before = s.canvas().clone();

        let out = s.handle(Gesture::Drag {
            target: Target::Auto,
            vertex: 1,
            x: -1.0,
            y: 0.3,
        });
        assert!(matches!(out, Outcome::Rejected(_)));
        assert_eq!(s.params(), &before);
        assert_eq!(s.canvas().curve, scene_before.curve);
        assert_eq!(s.canvas().shapes, scene_before.shapes);
        assert_eq!(s.state(), SessionState::Active);
        // Degenerate input is not a missing capability.
        assert!(!s.is_disabled(0, Capability::FromShape));
    }

    #[test]
    fn unsupported_component_is_disabled_not_fatal() {
        let (x, y) = bump_data();
        let model = add(
            Model::leaf(Peak::gaussian("g_")),
            Model::leaf(Linear::new("bk_")),
        )
        .unwrap();
        let mut s = start_interactive_session(model, y, Some(x), None, None, Scene::new()).unwrap();

        // The background never had a shape.
        assert!(s.is_disabled(1, Capability::ToShape));
        assert!(s.shape(1).is_none());

        let out = s.handle(Gesture::Scroll {
            ticks: 120,
            target: Target::Prefix("bk_".to_string()),
        });
        assert!(matches!(out, Outcome::Rejected(_)));
        assert!(s.is_disabled(1, Capability::Scroll));
        assert_eq!(s.state(), SessionState::Active);

        // Auto resolves to the only editable component.
        let out = s.handle(Gesture::Scroll {
            ticks: 120,
            target: Target::Auto,
        });
        assert_eq!(out, Outcome::Updated);
    }

    #[test]
    fn cursor_target_picks_nearest_component() {
        let x: Vec<f64> = (0..201).map(|i| -5.0 + 0.1 * i as f64).collect();
        let y: Vec<f64> = x
            .iter()
            .map(|&v| gaussian(v, 1.0, -2.0, 0.5) + gaussian(v, 1.0, 12.0, 0.5))
            .collect();
        let model = add(
            Model::leaf(Peak::gaussian("a_")),
            Model::leaf(Peak::gaussian("b_")),
        )
        .unwrap();
        let params = Peak::gaussian("a_")
            .make_params(
                PeakValues {
                    amplitude: 1.0,
                    center: -2.0,
                    sigma: 0.5,
                },
                None,
            )
            .merged(&Peak::gaussian("b_").make_params(
                PeakValues {
                    amplitude: 1.0,
                    center: 12.0,
                    sigma: 0.5,
                },
                None,
            ));
        let mut s =
            start_interactive_session(model, y, Some(x), Some(params), None, Scene::new()).unwrap();

        let hit = s.nearest_vertex(11.9, 0.8).unwrap();
        assert_eq!((hit.component, hit.vertex), (1, 1));

        s.handle(Gesture::Scroll {
            ticks: -350,
            target: Target::Cursor { x: 11.9, y: 0.8 },
        });
        assert!((s.params().value("b_sigma").unwrap() - 0.25).abs() < 1e-12);
        assert!((s.params().value("a_sigma").unwrap() - 0.5).abs() < 1e-12);

        let out = s.handle(Gesture::Scroll {
            ticks: 10,
            target: Target::Auto,
        });
        assert!(matches!(out, Outcome::Rejected(_)));
    }

    #[test]
    fn redraw_is_idempotent() {
        let mut s = single_peak();
        s.handle(Gesture::Scroll {
            ticks: 200,
            target: Target::Auto,
        });
        let first = s.canvas().clone();
        s.redraw();
        s.redraw();
        assert_eq!(s.canvas(), &first);
    }

    #[test]
    fn commit_finalizes_and_ignores_later_events() {
        let mut s = single_peak();
        s.handle(Gesture::Scroll {
            ticks: 700,
            target: Target::Auto,
        });
        assert_eq!(s.handle(Gesture::Commit), Outcome::Committed);
        let committed = s.result().unwrap().clone();

        assert_eq!(
            s.handle(Gesture::Scroll {
                ticks: 700,
                target: Target::Auto
            }),
            Outcome::Ignored
        );
        assert_eq!(s.handle(Gesture::Cancel), Outcome::Ignored);
        assert_eq!(s.result(), Some(&committed));
        assert_eq!(s.into_result().unwrap(), committed);
    }

    #[test]
    fn cancel_restores_seed_and_has_no_result() {
        let mut s = single_peak();
        s.handle(Gesture::Scroll {
            ticks: 700,
            target: Target::Auto,
        });
        assert_eq!(s.handle(Gesture::Cancel), Outcome::Cancelled);
        assert_eq!(s.params(), &unit_seed());
        assert!(s.result().is_none());
        assert_eq!(s.canvas().shape(0).unwrap().xs, vec![-1.0, 0.0]);
        assert_eq!(s.handle(Gesture::Commit), Outcome::Ignored);
    }

    #[test]
    fn commit_requires_fit_ready_params() {
        let (x, y) = bump_data();
        let mut seed = unit_seed();
        seed.set_value("g_center", f64::NAN);
        let mut s = start_interactive_session(
            Model::leaf(Peak::gaussian("g_")),
            y,
            Some(x),
            Some(seed),
            None,
            Scene::new(),
        )
        .unwrap();
        assert!(matches!(s.handle(Gesture::Commit), Outcome::Rejected(_)));
        assert_eq!(s.state(), SessionState::Active);
        assert!(s.result().is_none());
    }

    #[test]
    fn drag_past_sigma_bound_keeps_peak_on_the_vertex() {
        let (x, y) = bump_data();
        let mut seed = unit_seed();
        seed.insert(Parameter::bounded("g_sigma", 1.0, 0.1, 1.5));
        let mut s = start_interactive_session(
            Model::leaf(Peak::gaussian("g_")),
            y,
            Some(x),
            Some(seed),
            None,
            Scene::new(),
        )
        .unwrap();
        let peak_y = s.shape(0).unwrap().ys[1];

        let out = s.handle(Gesture::Drag {
            target: Target::Component(0),
            vertex: 0,
            x: -3.0,
            y: 0.0,
        });
        assert_eq!(out, Outcome::Updated);

        let params = s.params();
        assert_eq!(params.value("g_sigma").unwrap(), 1.5);
        let rendered = s.model().evaluate(&[0.0], params).unwrap()[0];
        assert!((rendered - peak_y).abs() < 1e-12);
        assert!((params.value("g_height").unwrap() - rendered).abs() < 1e-12);
        let shape = s.canvas().shape(0).unwrap();
        assert_eq!(shape.xs, vec![-1.5, 0.0]);
        assert!((shape.ys[1] - peak_y).abs() < 1e-12);
    }

    /// A component that refuses to evaluate once its level goes negative.
    #[derive(Debug)]
    struct Brittle;

    impl Component for Brittle {
        fn kind(&self) -> &'static str {
            "brittle"
        }

        fn prefix(&self) -> &str {
            "b_"
        }

        fn param_names(&self) -> Vec<String> {
            vec!["b_level".to_string()]
        }

        fn evaluate(&self, x: &[f64], params: &ParamSet) -> Result<Vec<f64>, ModelError> {
            let level = params.value("b_level")?;
            if level < 0.0 {
                return Err(ModelError::Numerical("negative level".to_string()));
            }
            Ok(vec![level; x.len()])
        }

        fn guess(&self, _x: &[f64], _y: &[f64]) -> Result<ParamSet, ModelError> {
            Ok(ParamSet::new().with(Parameter::new("b_level", 1.0)))
        }

        fn scroll_update(&self, ticks: i32, params: &ParamSet, overrides: &ParamSet) -> Result<ParamSet, ModelError> {
            let level = params.merged(overrides).value("b_level")?;
            Ok(ParamSet::new().with(Parameter::new("b_level", level + f64::from(ticks) / 100.0)))
        }
    }

    #[test]
    fn unrenderable_update_keeps_last_good_frame() {
        let mut s = start_interactive_session(Model::leaf(Brittle), vec![1.0; 5], None, None, None, Scene::new())
            .unwrap();
        assert_eq!(
            s.handle(Gesture::Scroll {
                ticks: 50,
                target: Target::Auto
            }),
            Outcome::Updated
        );
        let params = s.params().clone();
        let scene = s.canvas().clone();

        let out = s.handle(Gesture::Scroll {
            ticks: -400,
            target: Target::Auto,
        });
        assert!(matches!(out, Outcome::Rejected(ref m) if m.contains("negative level")));
        assert_eq!(s.params(), &params);
        assert_eq!(s.canvas().curve, scene.curve);
        assert_eq!(s.state(), SessionState::Active);
        assert!(!s.is_disabled(0, Capability::Scroll));

        // Still usable afterwards.
        assert_eq!(
            s.handle(Gesture::Scroll {
                ticks: -100,
                target: Target::Auto
            }),
            Outcome::Updated
        );
        assert!((s.params().value("b_level").unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn plot_grid_spans_data() {
        let grid = plot_grid(&[3.0, -1.0, 2.0], 5);
        assert_eq!(grid, vec![-1.0, 0.0, 1.0, 2.0, 3.0]);
        let flat = plot_grid(&[2.0, 2.0], 3);
        assert_eq!(flat, vec![1.5, 2.0, 2.5]);
    }
}
