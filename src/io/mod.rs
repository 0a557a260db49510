//! Input/output helpers.
//!
//! - seed JSON read/write (`seed`)

pub mod seed;

pub use seed::*;
