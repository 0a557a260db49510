//! `guess-curves` library crate.
//!
//! The binary (`guess`) is a thin wrapper around this library so that:
//!
//! - the session logic is testable without a terminal
//! - model components and the session can be embedded in other front-ends
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod debug;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
pub mod session;
pub mod tui;
