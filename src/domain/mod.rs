//! Domain types used throughout the crate.
//!
//! This module defines:
//!
//! - the parameter container (`Parameter`, `ParamSet`)
//! - the editable overlay geometry (`Shape`)
//! - model composition and capability tags (`Operator`, `Capability`)
//! - run configuration (`SessionConfig`, `DataSource`)

pub mod params;
pub mod types;

pub use params::*;
pub use types::*;
