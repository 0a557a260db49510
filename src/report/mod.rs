//! Reporting utilities: parameter tables and run summaries.
//!
//! Formatting stays here so output changes are localized (the golden tests
//! pin the exact layout).

mod format;

pub use format::*;
