//! Straight-line background: `y = slope * x + intercept`.
//!
//! Not interactive: scrolling or dragging a background has no natural
//! geometric meaning, so all three interactive operations stay unsupported.

use crate::domain::{ParamSet, Parameter};
use crate::error::ModelError;
use crate::math::fit_line;
use crate::models::Component;

#[derive(Debug, Clone)]
pub struct Linear {
    prefix: String,
}

impl Linear {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn name(&self, base: &str) -> String {
        format!("{}{}", self.prefix, base)
    }

    pub fn make_params(&self, slope: f64, intercept: f64) -> ParamSet {
        ParamSet::new()
            .with(Parameter::new(self.name("slope"), slope))
            .with(Parameter::new(self.name("intercept"), intercept))
    }
}

impl Component for Linear {
    fn kind(&self) -> &'static str {
        "linear"
    }

    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn param_names(&self) -> Vec<String> {
        vec![self.name("slope"), self.name("intercept")]
    }

    fn evaluate(&self, x: &[f64], params: &ParamSet) -> Result<Vec<f64>, ModelError> {
        let slope = params.value(&self.name("slope"))?;
        let intercept = params.value(&self.name("intercept"))?;
        Ok(x.iter().map(|&v| slope * v + intercept).collect())
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

        let (intercept, slope) = match fit_line(x, y) {
            Some(line) => line,
            // No spread in x: a flat line through the mean.
            None => (y.iter().sum::<f64>() / y.len() as f64, 0.0),
        };
        Ok(self.make_params(slope, intercept))
    }
}
