//! Mathematical utilities: peak line-shapes and least squares.

pub mod ols;
pub mod peak;

pub use ols::*;
pub use peak::*;
