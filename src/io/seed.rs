//! Read/write seed JSON files.
//!
//! A seed file is the hand-off to a downstream fit engine:
//! - the model expression the parameters belong to
//! - the parameter set (value, bounds, fixed flag)
//! - how the session ended
//! - the model curve on the plot grid, for quick plotting
//!
//! Infinite bounds are written as absent fields.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::domain::{ParamSet, Parameter};
use crate::error::AppError;

pub const SEED_TOOL: &str = "guess";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedFile {
    pub tool: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Local>>,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    /// `guessed`, `committed`, ...
    pub state: String,
    pub parameters: Vec<SeedParam>,
    pub grid: SeedGrid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedParam {
    pub name: String,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default)]
    pub fixed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedGrid {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl SeedFile {
    pub fn new(model: impl Into<String>, state: impl Into<String>, params: &ParamSet, grid: SeedGrid) -> Self {
        Self {
            tool: SEED_TOOL.to_string(),
            created: Some(Local::now()),
            model: model.into(),
            data: None,
            state: state.into(),
            parameters: params.iter().map(SeedParam::from).collect(),
            grid,
        }
    }

    pub fn with_data(mut self, label: impl Into<String>) -> Self {
        self.data = Some(label.into());
        self
    }

    pub fn to_params(&self) -> ParamSet {
        self.parameters.iter().map(Parameter::from).collect()
    }
}

impl From<&Parameter> for SeedParam {
    fn from(p: &Parameter) -> Self {
        Self {
            name: p.name.clone(),
            value: p.value,
            min: p.min.is_finite().then_some(p.min),
            max: p.max.is_finite().then_some(p.max),
            fixed: p.fixed,
        }
    }
}

impl From<&SeedParam> for Parameter {
    fn from(p: &SeedParam) -> Self {
        Parameter {
            name: p.name.clone(),
            value: p.value,
            min: p.min.unwrap_or(f64::NEG_INFINITY),
            max: p.max.unwrap_or(f64::INFINITY),
            fixed: p.fixed,
        }
    }
}

pub fn write_seed_json(path: &Path, seed: &SeedFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create seed JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, seed)
        .map_err(|e| AppError::new(2, format!("Failed to write seed JSON: {e}")))?;
    Ok(())
}

pub fn read_seed_json(path: &Path) -> Result<SeedFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open seed JSON '{}': {e}", path.display())))?;
    let seed: SeedFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid seed JSON: {e}")))?;
    if seed.tool != SEED_TOOL {
        return Err(AppError::new(
            2,
            format!("'{}' was written by '{}', not '{SEED_TOOL}'.", path.display(), seed.tool),
        ));
    }
    Ok(seed)
}
