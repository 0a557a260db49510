//! The leaf-component contract.
//!
//! Every component can evaluate itself and guess starting values from data.
//! The three interactive operations are optional: the provided bodies report
//! `ModelError::Unsupported`, which the guess session turns into a disabled
//! interaction instead of an abort.

use crate::domain::{Capability, ParamSet, Shape};
use crate::error::ModelError;

pub trait Component: std::fmt::Debug {
    /// Short kind label, e.g. `"gaussian"`.
    fn kind(&self) -> &'static str;

    /// Name prefix shared by all parameters of this component.
    fn prefix(&self) -> &str;

    /// Full (prefixed) names of the parameters this component produces.
    fn param_names(&self) -> Vec<String>;

    /// Evaluate at every `x`. The output has the same length as `x`.
    fn evaluate(&self, x: &[f64], params: &ParamSet) -> Result<Vec<f64>, ModelError>;

    /// Estimate a parameter set from observed `(x, y)`.
    fn guess(&self, x: &[f64], y: &[f64]) -> Result<ParamSet, ModelError>;

    /// New parameters after `ticks` scroll-wheel ticks. `overrides` win over
    /// `params` before the update is applied; neither input is modified.
    fn scroll_update(
        &self,
        ticks: i32,
        params: &ParamSet,
        overrides: &ParamSet,
    ) -> Result<ParamSet, ModelError> {
        let _ = (ticks, params, overrides);
        Err(self.unsupported(Capability::Scroll))
    }

    /// Project parameters onto an editable shape.
    fn to_shape(&self, params: &ParamSet, overrides: &ParamSet) -> Result<Shape, ModelError> {
        let _ = (params, overrides);
        Err(self.unsupported(Capability::ToShape))
    }

    /// Inverse of `to_shape`.
    fn from_shape(&self, shape: &Shape) -> Result<ParamSet, ModelError> {
        let _ = shape;
        Err(self.unsupported(Capability::FromShape))
    }

    /// `from_shape` under the bounds of `current`. Derived values must be
    /// computed from the clamped free values, not from the raw shape.
    fn from_shape_within(&self, shape: &Shape, current: &ParamSet) -> Result<ParamSet, ModelError> {
        let _ = current;
        self.from_shape(shape)
    }

    /// Names of parameters computed from the others. They cannot be set
    /// directly.
    fn derived_names(&self) -> Vec<String> {
        Vec::new()
    }

    /// Recompute derived parameters from the free values in `params`.
    /// Returns this component's parameters only.
    fn normalize(&self, params: &ParamSet) -> Result<ParamSet, ModelError> {
        let mut out = ParamSet::new();
        for name in self.param_names() {
            if let Some(p) = params.get(&name) {
                out.insert(p.clone());
            }
        }
        Ok(out)
    }

    /// `"kind[prefix]"`, used in logs and model descriptions.
    fn label(&self) -> String {
        format!("{}[{}]", self.kind(), self.prefix())
    }

    fn unsupported(&self, capability: Capability) -> ModelError {
        ModelError::Unsupported {
            component: self.prefix().to_string(),
            capability,
        }
    }
}
