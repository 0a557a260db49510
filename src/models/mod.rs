//! Fit-model components and their algebra.
//!
//! - `Component`: the leaf contract (evaluate, guess, and the optional
//!   interactive operations)
//! - `Peak` (Gaussian / Lorentzian) and `Linear` leaves
//! - `Model`: a tree of leaves joined by `+ - * /`
//! - `parse_model`: the command-line expression syntax

pub mod component;
pub mod composite;
pub mod expr;
pub mod linear;
pub mod peak;

pub use component::*;
pub use composite::*;
pub use expr::*;
pub use linear::*;
pub use peak::*;
