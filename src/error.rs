//! Error types.
//!
//! - `ModelError` is what the library layers (params, models, session) return.
//! - `AppError` is what the binary reports: a message plus a process exit code.
//!
//! Exit codes: 2 = input/IO, 3 = model/data, 4 = terminal/runtime.

use thiserror::Error;

use crate::domain::Capability;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<ModelError> for AppError {
    fn from(err: ModelError) -> Self {
        AppError::new(3, err.to_string())
    }
}

/// Errors raised by parameter sets, model components and the guess session.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("component '{component}' does not support interactive {capability}")]
    Unsupported {
        component: String,
        capability: Capability,
    },

    #[error("parameter '{name}' not found")]
    MissingParameter { name: String },

    #[error("parameter name '{name}' is used by more than one model component")]
    NameCollision { name: String },

    #[error("length mismatch: expected {expected} values, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("no data to work with")]
    EmptyData,

    #[error("degenerate shape: {reason}")]
    DegenerateShape { reason: String },

    #[error("shape must have exactly {expected} vertices, got {actual}")]
    ShapeVertexCount { expected: usize, actual: usize },

    #[error("parameter '{name}' = {value} is not usable as a fit seed (bounds [{min}, {max}])")]
    NotFitReady {
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("invalid model expression: {0}")]
    Expression(String),

    #[error("no model component targeted: {0}")]
    NoTarget(String),

    #[error("numerical failure: {0}")]
    Numerical(String),
}

impl ModelError {
    /// True for the errors a session recovers from by disabling an interaction
    /// or rejecting a single gesture.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ModelError::Unsupported { .. }
                | ModelError::DegenerateShape { .. }
                | ModelError::ShapeVertexCount { .. }
                | ModelError::NoTarget(_)
        )
    }
}
