//! Named, bounded, optionally-fixed scalar parameters.
//!
//! `ParamSet` is the currency passed between the model components, the guess
//! session and (eventually) the fit engine. Sets are cheap to clone and most
//! operations return a new set instead of mutating the caller's.

use crate::error::ModelError;

/// One scalar parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub value: f64,
    pub min: f64,
    pub max: f64,
    /// Not varied by the fit engine (derived values, user-pinned values).
    pub fixed: bool,
}

impl Parameter {
    /// Unbounded, varied parameter.
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
            fixed: false,
        }
    }

    /// Bounded parameter; the value is clamped into `[min, max]`.
    pub fn bounded(name: impl Into<String>, value: f64, min: f64, max: f64) -> Self {
        let mut p = Self {
            name: name.into(),
            value,
            min,
            max,
            fixed: false,
        };
        p.set_value(value);
        p
    }

    pub fn fixed(mut self) -> Self {
        self.fixed = true;
        self
    }

    /// Set the value, clamped into the bounds.
    ///
    /// NaN is stored as-is so that `check_fit_ready` can report it.
    pub fn set_value(&mut self, value: f64) {
        self.value = if value.is_nan() {
            value
        } else {
            value.max(self.min).min(self.max)
        };
    }

    pub fn is_within_bounds(&self) -> bool {
        self.value >= self.min && self.value <= self.max
    }
}

/// Insertion-ordered mapping from name to `Parameter`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamSet {
    params: Vec<Parameter>,
}

impl ParamSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|p| p.name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        self.params.iter_mut().find(|p| p.name == name)
    }

    /// Value lookup that fails with `MissingParameter`.
    pub fn value(&self, name: &str) -> Result<f64, ModelError> {
        self.get(name)
            .map(|p| p.value)
            .ok_or_else(|| ModelError::MissingParameter {
                name: name.to_string(),
            })
    }

    /// Insert or replace (in place, keeping the original position).
    pub fn insert(&mut self, param: Parameter) {
        match self.get_mut(&param.name) {
            Some(slot) => *slot = param,
            None => self.params.push(param),
        }
    }

    /// Builder form of `insert`.
    pub fn with(mut self, param: Parameter) -> Self {
        self.insert(param);
        self
    }

    /// Set a value on an existing parameter (clamped to its bounds), or add an
    /// unbounded one.
    pub fn set_value(&mut self, name: &str, value: f64) {
        match self.get_mut(name) {
            Some(p) => p.set_value(value),
            None => self.params.push(Parameter::new(name, value)),
        }
    }

    /// Merge `other` into `self`; entries of `other` win on name conflicts.
    pub fn update(&mut self, other: &ParamSet) {
        for p in &other.params {
            self.insert(p.clone());
        }
    }

    /// Override-wins merge returning a new set.
    pub fn merged(&self, overrides: &ParamSet) -> ParamSet {
        let mut out = self.clone();
        out.update(overrides);
        out
    }

    /// Take values from `update` but keep this set's bounds and fixed flags
    /// for parameters it already has. New names are added as given.
    pub fn assign_values(&self, update: &ParamSet) -> ParamSet {
        let mut out = self.clone();
        for p in &update.params {
            match out.get_mut(&p.name) {
                Some(slot) => slot.set_value(p.value),
                None => out.params.push(p.clone()),
            }
        }
        out
    }

    /// Sub-set of parameters whose names start with `prefix`.
    pub fn with_prefix(&self, prefix: &str) -> ParamSet {
        ParamSet {
            params: self
                .params
                .iter()
                .filter(|p| p.name.starts_with(prefix))
                .cloned()
                .collect(),
        }
    }

    /// Check that every parameter can seed an optimizer run: finite and
    /// inside its bounds.
    pub fn check_fit_ready(&self) -> Result<(), ModelError> {
        for p in &self.params {
            if !p.value.is_finite() || !p.is_within_bounds() {
                return Err(ModelError::NotFitReady {
                    name: p.name.clone(),
                    value: p.value,
                    min: p.min,
                    max: p.max,
                });
            }
        }
        Ok(())
    }
}

impl FromIterator<Parameter> for ParamSet {
    fn from_iter<I: IntoIterator<Item = Parameter>>(iter: I) -> Self {
        let mut set = ParamSet::new();
        for p in iter {
            set.insert(p);
        }
        set
    }
}

impl<'a> IntoIterator for &'a ParamSet {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}
