//! Interactive peak components (Gaussian, Lorentzian).
//!
//! Parameters (all prefixed): `amplitude` (area), `center`, `sigma` (width,
//! `>= 0`) and the derived, fixed `height` (maximum value).
//!
//! Interactive editing:
//! - scroll scales `sigma` and `amplitude` by the same factor, which keeps the
//!   maximum value (`height`) unchanged
//! - the shape is two vertices: one width unit left of the peak, then the peak

use crate::domain::{ParamSet, Parameter, Shape};
use crate::error::ModelError;
use crate::math::{gaussian, guess_from_peak, lorentzian, scroll_scale, sqrt_two_pi, TINY};
use crate::models::Component;

/// Narrowest shape span accepted by `from_shape`.
pub const MIN_SHAPE_WIDTH: f64 = 1.0e-12;

/// Which line-shape a `Peak` evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeakKind {
    Gaussian,
    Lorentzian,
}

impl PeakKind {
    pub fn name(self) -> &'static str {
        match self {
            PeakKind::Gaussian => "gaussian",
            PeakKind::Lorentzian => "lorentzian",
        }
    }

    fn eval(self, x: f64, v: &PeakValues) -> f64 {
        match self {
            PeakKind::Gaussian => gaussian(x, v.amplitude, v.center, v.sigma),
            PeakKind::Lorentzian => lorentzian(x, v.amplitude, v.center, v.sigma),
        }
    }

    /// Maximum value per unit amplitude.
    fn height_per_amplitude(self, sigma: f64) -> f64 {
        let s = sigma.max(TINY);
        match self {
            PeakKind::Gaussian => 1.0 / (s * sqrt_two_pi()),
            PeakKind::Lorentzian => 1.0 / (std::f64::consts::PI * s),
        }
    }

    fn ampscale(self) -> f64 {
        match self {
            PeakKind::Gaussian => 1.0,
            PeakKind::Lorentzian => 1.25,
        }
    }
}

/// Current values of a peak's free parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakValues {
    pub amplitude: f64,
    pub center: f64,
    pub sigma: f64,
}

/// A single peak-shaped component.
#[derive(Debug, Clone)]
pub struct Peak {
    prefix: String,
    kind: PeakKind,
}

impl Peak {
    pub fn gaussian(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            kind: PeakKind::Gaussian,
        }
    }

    pub fn lorentzian(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            kind: PeakKind::Lorentzian,
        }
    }

    pub fn peak_kind(&self) -> PeakKind {
        self.kind
    }

    fn name(&self, base: &str) -> String {
        format!("{}{}", self.prefix, base)
    }

    /// Read this component's values from `params`.
    pub fn values(&self, params: &ParamSet) -> Result<PeakValues, ModelError> {
        Ok(PeakValues {
            amplitude: params.value(&self.name("amplitude"))?,
            center: params.value(&self.name("center"))?,
            sigma: params.value(&self.name("sigma"))?,
        })
    }

    /// Build a parameter set for `v`.
    ///
    /// Bounds and fixed flags come from `template` where it has the parameter,
    /// otherwise from the defaults (`sigma >= 0`). Values are clamped to the
    /// bounds before `height` is derived from them.
    pub fn make_params(&self, v: PeakValues, template: Option<&ParamSet>) -> ParamSet {
        let defaults = [
            Parameter::new(self.name("amplitude"), v.amplitude),
            Parameter::new(self.name("center"), v.center),
            Parameter::bounded(self.name("sigma"), v.sigma, 0.0, f64::INFINITY),
        ];
        let values = [v.amplitude, v.center, v.sigma];

        let mut out = ParamSet::new();
        for (default, value) in defaults.into_iter().zip(values) {
            let mut p = template
                .and_then(|t| t.get(&default.name))
                .cloned()
                .unwrap_or(default);
            p.set_value(value);
            out.insert(p);
        }

        // Values were just inserted above.
        let amplitude = out.get(&self.name("amplitude")).map_or(v.amplitude, |p| p.value);
        let sigma = out.get(&self.name("sigma")).map_or(v.sigma, |p| p.value);
        let height = amplitude * self.kind.height_per_amplitude(sigma);
        out.insert(Parameter::new(self.name("height"), height).fixed());
        out
    }

    fn eval_values(&self, x: &[f64], v: &PeakValues) -> Vec<f64> {
        x.iter().map(|&xv| self.kind.eval(xv, v)).collect()
    }
}

impl Component for Peak {
    fn kind(&self) -> &'static str {
        self.kind.name()
    }

    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn param_names(&self) -> Vec<String> {
        ["amplitude", "center", "sigma", "height"]
            .iter()
            .map(|base| self.name(base))
            .collect()
    }

    fn evaluate(&self, x: &[f64], params: &ParamSet) -> Result<Vec<f64>, ModelError> {
        let v = self.values(params)?;
        Ok(self.eval_values(x, &v))
    }

    fn guess(&self, x: &[f64], y: &[f64]) -> Result<ParamSet, ModelError> {
        if y.is_empty() {
            return Err(ModelError::EmptyData);
        }
        if x.len() != y.len() {
            return Err(ModelError::LengthMismatch {
                expected: x.len(),
                actual: y.len(),
            });
        }
        let g = guess_from_peak(x, y, self.kind.ampscale()).ok_or_else(|| {
            ModelError::Numerical(format!("no finite peak estimate for '{}'", self.prefix))
        })?;
        Ok(self.make_params(
            PeakValues {
                amplitude: g.amplitude,
                center: g.center,
                sigma: g.sigma,
            },
            None,
        ))
    }

    fn scroll_update(
        &self,
        ticks: i32,
        params: &ParamSet,
        overrides: &ParamSet,
    ) -> Result<ParamSet, ModelError> {
        let current = params.merged(overrides);
        let v = self.values(&current)?;
        let scale = scroll_scale(ticks);
        let next = PeakValues {
            amplitude: v.amplitude * scale,
            center: v.center,
            sigma: v.sigma * scale,
        };
        Ok(self.make_params(next, Some(&current)))
    }

    fn to_shape(&self, params: &ParamSet, overrides: &ParamSet) -> Result<Shape, ModelError> {
        let v = self.values(&params.merged(overrides))?;
        let xs = vec![v.center - v.sigma, v.center];
        let ys = self.eval_values(&xs, &v);
        Ok(Shape::new(xs, ys))
    }

    fn from_shape(&self, shape: &Shape) -> Result<ParamSet, ModelError> {
        self.solve_shape(shape, None)
    }

    fn from_shape_within(&self, shape: &Shape, current: &ParamSet) -> Result<ParamSet, ModelError> {
        self.solve_shape(shape, Some(current))
    }

    fn derived_names(&self) -> Vec<String> {
        vec![self.name("height")]
    }

    fn normalize(&self, params: &ParamSet) -> Result<ParamSet, ModelError> {
        Ok(self.make_params(self.values(params)?, Some(params)))
    }
}

impl Peak {
    /// Parameters whose shape passes through `shape`'s peak vertex.
    ///
    /// `center` and `sigma` are clamped to `template`'s bounds first, then
    /// `amplitude` is solved so the maximum still equals the dragged height.
    fn solve_shape(&self, shape: &Shape, template: Option<&ParamSet>) -> Result<ParamSet, ModelError> {
        if shape.len() != 2 {
            return Err(ModelError::ShapeVertexCount {
                expected: 2,
                actual: shape.len(),
            });
        }
        if shape.vertices().any(|(x, y)| !(x.is_finite() && y.is_finite())) {
            return Err(ModelError::DegenerateShape {
                reason: "non-finite vertex".to_string(),
            });
        }

        let x0 = shape.xs[0];
        let (x1, y1) = (shape.xs[1], shape.ys[1]);
        let sigma = (x1 - x0).abs();
        if sigma < MIN_SHAPE_WIDTH {
            return Err(ModelError::DegenerateShape {
                reason: format!("zero width for '{}'", self.prefix),
            });
        }

        let clamp = |base: &str, value: f64| match template.and_then(|t| t.get(&self.name(base))) {
            Some(p) => {
                let mut p = p.clone();
                p.set_value(value);
                p.value
            }
            None => value,
        };
        let center = clamp("center", x1);
        let sigma = clamp("sigma", sigma);
        if sigma < MIN_SHAPE_WIDTH {
            return Err(ModelError::DegenerateShape {
                reason: format!("zero width for '{}' after bounds", self.prefix),
            });
        }

        let amplitude = y1 / self.kind.height_per_amplitude(sigma);
        Ok(self.make_params(
            PeakValues {
                amplitude,
                center,
                sigma,
            },
            template,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(prefix: &str, amplitude: f64, center: f64, sigma: f64) -> ParamSet {
        Peak::gaussian(prefix).make_params(
            PeakValues {
                amplitude,
                center,
                sigma,
            },
            None,
        )
    }

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn unit_gaussian_shape_and_back() {
        let g = Peak::gaussian("");
        let params = seed("", 1.0, 0.0, 1.0);

        let shape = g.to_shape(&params, &ParamSet::new()).unwrap();
        assert_eq!(shape.xs, vec![-1.0, 0.0]);
        let expected_y = g.evaluate(&shape.xs, &params).unwrap();
        assert_eq!(shape.ys, expected_y);

        let back = g.from_shape(&shape).unwrap();
        assert!(close(back.value("center").unwrap(), 0.0, 1e-6));
        assert!(close(back.value("sigma").unwrap(), 1.0, 1e-6));
        assert!(close(back.value("amplitude").unwrap(), 1.0, 1e-6));
    }

    #[test]
    fn round_trip_holds_for_both_line_shapes() {
        let cases = [
            (3.0, -2.5, 0.4),
            (0.2, 10.0, 5.0),
            (-1.5, 0.3, 1e-3),
            (120.0, 1e4, 250.0),
        ];
        for peak in [Peak::lorentzian("l_"), Peak::gaussian("l_")] {
            for &(amplitude, center, sigma) in &cases {
                let params = peak.make_params(
                    PeakValues {
                        amplitude,
                        center,
                        sigma,
                    },
                    None,
                );
                let shape = peak.to_shape(&params, &ParamSet::new()).unwrap();
                let back = peak.from_shape(&shape).unwrap();
                for name in ["l_amplitude", "l_center", "l_sigma", "l_height"] {
                    let a = params.value(name).unwrap();
                    let b = back.value(name).unwrap();
                    let tol = 1e-9 * a.abs().max(1.0);
                    assert!(
                        close(a, b, tol),
                        "{} {name}: {a} vs {b}",
                        peak.kind()
                    );
                }
            }
        }
    }

    #[test]
    fn scroll_700_doubles_and_minus_700_halves() {
        let g = Peak::gaussian("g_");
        let params = seed("g_", 1.0, 0.0, 1.0);

        let up = g.scroll_update(700, &params, &ParamSet::new()).unwrap();
        assert!(close(up.value("g_sigma").unwrap(), 2.0, 1e-12));
        assert!(close(up.value("g_amplitude").unwrap(), 2.0, 1e-12));

        let down = g.scroll_update(-700, &params, &ParamSet::new()).unwrap();
        assert!(close(down.value("g_sigma").unwrap(), 0.5, 1e-12));
        assert!(close(down.value("g_amplitude").unwrap(), 0.5, 1e-12));

        let far = g.scroll_update(10_000, &params, &ParamSet::new()).unwrap();
        assert!(close(far.value("g_sigma").unwrap(), 2.0, 1e-12));
    }

    #[test]
    fn scroll_preserves_peak_value() {
        for peak in [Peak::gaussian("p_"), Peak::lorentzian("p_")] {
            let params = peak.make_params(
                PeakValues {
                    amplitude: 4.0,
                    center: 1.25,
                    sigma: 0.75,
                },
                None,
            );
            let before = peak.evaluate(&[1.25], &params).unwrap()[0];
            for ticks in [-5000, -350, -1, 1, 120, 699, 5000] {
                let next = peak.scroll_update(ticks, &params, &ParamSet::new()).unwrap();
                let center = next.value("p_center").unwrap();
                let after = peak.evaluate(&[center], &next).unwrap()[0];
                assert!(
                    close(before, after, 1e-12 * before.abs().max(1.0)),
                    "{} ticks={ticks}: {before} vs {after}",
                    peak.kind()
                );
                assert!(close(next.value("p_height").unwrap(), before, 1e-9));
            }
        }
    }

    #[test]
    fn scroll_does_not_touch_inputs_and_applies_overrides() {
        let g = Peak::gaussian("g_");
        let params = seed("g_", 1.0, 0.0, 1.0);
        let snapshot = params.clone();
        let overrides = ParamSet::new().with(Parameter::new("g_center", 3.0));

        let next = g.scroll_update(350, &params, &overrides).unwrap();
        assert_eq!(params, snapshot);
        assert_eq!(next.value("g_center").unwrap(), 3.0);
        assert!(close(next.value("g_sigma").unwrap(), 1.5, 1e-12));
    }

    #[test]
    fn scroll_keeps_existing_bounds() {
        let g = Peak::gaussian("g_");
        let mut params = seed("g_", 1.0, 0.0, 1.0);
        params.insert(Parameter::bounded("g_sigma", 1.0, 0.1, 1.5));

        let next = g.scroll_update(700, &params, &ParamSet::new()).unwrap();
        let sigma = next.get("g_sigma").unwrap();
        assert_eq!(sigma.max, 1.5);
        assert_eq!(sigma.value, 1.5);
    }

    #[test]
    fn bounded_sigma_is_clamped_before_amplitude_is_solved() {
        let g = Peak::gaussian("g_");
        let mut current = seed("g_", 1.0, 0.0, 1.0);
        current.insert(Parameter::bounded("g_sigma", 1.0, 0.1, 1.5));

        // Peak vertex at (0, y_peak); width vertex dragged to x = -3.
        let y_peak = gaussian(0.0, 1.0, 0.0, 1.0);
        let shape = Shape::new(vec![-3.0, 0.0], vec![0.0, y_peak]);
        let next = g.from_shape_within(&shape, &current).unwrap();

        assert_eq!(next.value("g_sigma").unwrap(), 1.5);
        assert_eq!(next.get("g_sigma").unwrap().max, 1.5);
        let rendered = g.evaluate(&[0.0], &next).unwrap()[0];
        assert!(close(rendered, y_peak, 1e-12));
        assert!(close(next.value("g_height").unwrap(), rendered, 1e-12));
    }

    #[test]
    fn normalize_rederives_height() {
        let g = Peak::gaussian("g_");
        let mut params = seed("g_", 1.0, 0.0, 1.0);
        params.set_value("g_sigma", 2.0);
        assert!(close(params.value("g_height").unwrap(), 1.0 / sqrt_two_pi(), 1e-12));

        let fixed = g.normalize(&params).unwrap();
        assert!(close(fixed.value("g_height").unwrap(), 0.5 / sqrt_two_pi(), 1e-12));
        assert!(fixed.get("g_height").unwrap().fixed);
        assert_eq!(g.derived_names(), vec!["g_height".to_string()]);
    }

    #[test]
    fn zero_width_shape_is_rejected() {
        let g = Peak::gaussian("g_");
        let shape = Shape::new(vec![2.0, 2.0], vec![0.1, 0.4]);
        assert!(matches!(
            g.from_shape(&shape),
            Err(ModelError::DegenerateShape { .. })
        ));

        let nan = Shape::new(vec![f64::NAN, 2.0], vec![0.1, 0.4]);
        assert!(matches!(
            g.from_shape(&nan),
            Err(ModelError::DegenerateShape { .. })
        ));
    }

    #[test]
    fn shape_needs_two_vertices() {
        let g = Peak::gaussian("g_");
        let shape = Shape::new(vec![0.0, 1.0, 2.0], vec![0.0, 1.0, 0.0]);
        assert_eq!(
            g.from_shape(&shape),
            Err(ModelError::ShapeVertexCount {
                expected: 2,
                actual: 3
            })
        );
    }

    #[test]
    fn guess_produces_all_four_parameters() {
        let g = Peak::lorentzian("l_");
        let x: Vec<f64> = (0..100).map(|i| i as f64 * 0.1).collect();
        let y: Vec<f64> = x.iter().map(|&v| lorentzian(v, 2.0, 4.0, 0.5)).collect();
        let params = g.guess(&x, &y).unwrap();
        let names: Vec<&str> = params.names().collect();
        assert_eq!(names, vec!["l_amplitude", "l_center", "l_sigma", "l_height"]);
        assert!(params.get("l_height").unwrap().fixed);
        assert!((params.value("l_center").unwrap() - 4.0).abs() < 0.2);
    }
}
