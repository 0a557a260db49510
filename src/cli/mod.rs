//! Command-line parsing for the interactive guess tool.
//!
//! Argument parsing and command dispatch stay separate from the model and
//! session code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "guess", version, about = "Interactive initial-parameter guessing for curve-fit models")]
pub struct Cli {
    /// Write logs to this file (the TUI owns the terminal).
    #[arg(long, global = true, env = "GUESS_LOG_FILE", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive guess session in the terminal.
    Tui(SessionArgs),
    /// Print the automatic guess (table + plot) without a session.
    Seed(SessionArgs),
    /// Print a saved seed file.
    Show(ShowArgs),
}

/// Options shared by `tui` and `seed`.
#[derive(Debug, Args, Clone)]
pub struct SessionArgs {
    /// CSV file with the observed data (synthetic demo data if omitted).
    #[arg(long, value_name = "CSV", env = "GUESS_DATA")]
    pub data: Option<PathBuf>,

    /// Column holding x values.
    #[arg(long, default_value = "x")]
    pub x_col: String,

    /// Column holding y values.
    #[arg(long, default_value = "y")]
    pub y_col: String,

    /// Random seed for the demo data.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Number of demo data points.
    #[arg(long, default_value_t = 225)]
    pub points: usize,

    /// Full width of the uniform noise added to the demo data.
    #[arg(long, default_value_t = 0.2)]
    pub noise: f64,

    /// Model expression, e.g. `gaussian:g0_ + gaussian:g1_ + linear:bk_`.
    #[arg(
        short = 'm',
        long,
        env = "GUESS_MODEL",
        default_value = "gaussian:g0_ + gaussian:g1_ + gaussian:g2_ + gaussian:bk_"
    )]
    pub model: String,

    /// Seed JSON providing the initial parameter set (skips the automatic guess).
    #[arg(long, value_name = "JSON")]
    pub params: Option<PathBuf>,

    /// Override one parameter value (repeatable).
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_override)]
    pub overrides: Vec<(String, f64)>,

    /// Number of points on the curve-rendering grid.
    #[arg(long, default_value_t = crate::session::DEFAULT_PLOT_POINTS)]
    pub grid: usize,

    /// Scroll ticks per mouse-wheel notch.
    #[arg(long, default_value_t = 120, env = "GUESS_TICKS_PER_NOTCH")]
    pub ticks_per_notch: i32,

    /// Write the resulting parameters to a seed JSON file.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,

    /// Disable the terminal plot (`seed` only).
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

/// Options for printing a saved seed file.
#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Seed JSON file produced by `guess tui --export` or `guess seed --export`.
    #[arg(long, value_name = "JSON")]
    pub params: PathBuf,

    /// Also plot the stored curve grid.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

/// Parse `name=value`.
pub fn parse_override(raw: &str) -> Result<(String, f64), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing parameter name in '{raw}'"));
    }
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", value.trim()))?;
    Ok((name.to_string(), value))
}
