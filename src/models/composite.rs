//! Composite models: binary trees of components joined by `+ - * /`.
//!
//! A composite never implements interactive editing itself. The guess session
//! reaches the leaves through `Model::leaves` and edits them one at a time.

use std::collections::HashSet;

use crate::domain::{Operator, ParamSet};
use crate::error::ModelError;
use crate::models::Component;

/// Either a single component or an operator node over two sub-models.
#[derive(Debug)]
pub enum Model {
    Leaf(Box<dyn Component>),
    Composite {
        left: Box<Model>,
        right: Box<Model>,
        op: Operator,
    },
}

impl Model {
    pub fn leaf(component: impl Component + 'static) -> Self {
        Model::Leaf(Box::new(component))
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, Model::Composite { .. })
    }

    /// Leaf components, left to right. Session component indices refer to
    /// positions in this list.
    pub fn leaves(&self) -> Vec<&dyn Component> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a dyn Component>) {
        match self {
            Model::Leaf(c) => out.push(c.as_ref()),
            Model::Composite { left, right, .. } => {
                left.collect_leaves(out);
                right.collect_leaves(out);
            }
        }
    }

    /// All parameter names across the tree, left to right.
    pub fn param_names(&self) -> Vec<String> {
        self.leaves()
            .into_iter()
            .flat_map(|c| c.param_names())
            .collect()
    }

    /// Derived (not directly settable) parameter names across the tree.
    pub fn derived_names(&self) -> Vec<String> {
        self.leaves()
            .into_iter()
            .flat_map(|c| c.derived_names())
            .collect()
    }

    /// Recompute every leaf's derived parameters from its free values.
    /// Bounds and fixed flags already in `params` are kept.
    pub fn normalize(&self, params: &ParamSet) -> Result<ParamSet, ModelError> {
        let mut out = params.clone();
        for leaf in self.leaves() {
            out = out.assign_values(&leaf.normalize(&out)?);
        }
        Ok(out)
    }

    /// Evaluate at every `x`, combining children pointwise.
    pub fn evaluate(&self, x: &[f64], params: &ParamSet) -> Result<Vec<f64>, ModelError> {
        match self {
            Model::Leaf(c) => {
                let y = c.evaluate(x, params)?;
                if y.len() != x.len() {
                    return Err(ModelError::LengthMismatch {
                        expected: x.len(),
                        actual: y.len(),
                    });
                }
                Ok(y)
            }
            Model::Composite { left, right, op } => {
                let a = left.evaluate(x, params)?;
                let b = right.evaluate(x, params)?;
                Ok(a.iter().zip(&b).map(|(&l, &r)| op.apply(l, r)).collect())
            }
        }
    }

    /// Guess every leaf from the same data and merge the results.
    ///
    /// Merge order is left then right, so on a name collision the right
    /// child's entry wins. `combine` rejects colliding trees, so this only
    /// matters for hand-built `Model::Composite` values.
    pub fn guess(&self, x: &[f64], y: &[f64]) -> Result<ParamSet, ModelError> {
        match self {
            Model::Leaf(c) => c.guess(x, y),
            Model::Composite { left, right, .. } => {
                let mut params = left.guess(x, y)?;
                params.update(&right.guess(x, y)?);
                Ok(params)
            }
        }
    }

    /// Human-readable form, e.g. `(gaussian[g0_] + linear[bk_])`.
    pub fn describe(&self) -> String {
        match self {
            Model::Leaf(c) => c.label(),
            Model::Composite { left, right, op } => {
                format!("({} {} {})", left.describe(), op.symbol(), right.describe())
            }
        }
    }
}

/// Join two models under `op`.
///
/// Fails with `NameCollision` if any parameter name appears in both trees.
pub fn combine(left: Model, right: Model, op: Operator) -> Result<Model, ModelError> {
    let left_names: HashSet<String> = left.param_names().into_iter().collect();
    if let Some(name) = right
        .param_names()
        .into_iter()
        .find(|n| left_names.contains(n))
    {
        return Err(ModelError::NameCollision { name });
    }

    Ok(Model::Composite {
        left: Box::new(left),
        right: Box::new(right),
        op,
    })
}

pub fn add(left: Model, right: Model) -> Result<Model, ModelError> {
    combine(left, right, Operator::Add)
}

pub fn sub(left: Model, right: Model) -> Result<Model, ModelError> {
    combine(left, right, Operator::Subtract)
}

pub fn mul(left: Model, right: Model) -> Result<Model, ModelError> {
    combine(left, right, Operator::Multiply)
}

pub fn div(left: Model, right: Model) -> Result<Model, ModelError> {
    combine(left, right, Operator::Divide)
}
