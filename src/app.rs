//! Top-level application orchestration.
//!
//! `src/main.rs` is a thin wrapper; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - sets up logging
//! - prepares data, model and initial parameters
//! - runs the interactive session or prints the guess
//! - writes optional seed exports

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, SessionArgs, ShowArgs};
use crate::domain::{DataSource, SessionConfig, Shape};
use crate::error::AppError;
use crate::session::{plot_grid, SessionState};

pub mod pipeline;

/// Env var holding the log filter (`tracing_subscriber::EnvFilter` syntax).
pub const LOG_FILTER_ENV: &str = "GUESS_LOG";

/// Entry point for the `guess` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is fine; values may also come from the real environment.
    let _ = dotenvy::dotenv();

    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let interactive = matches!(cli.command, Command::Tui(_));
    init_tracing(cli.log_file.as_deref(), interactive)?;

    match cli.command {
        Command::Tui(args) => handle_tui(&args),
        Command::Seed(args) => handle_seed(&args),
        Command::Show(args) => handle_show(&args),
    }
}

fn handle_seed(args: &SessionArgs) -> Result<(), AppError> {
    let config = session_config_from_args(args);
    let prepared = pipeline::prepare(&config)?;

    print!(
        "{}",
        crate::report::format_run_summary(&prepared.data, &prepared.model.describe(), &prepared.origin)
    );
    println!("{}", crate::report::format_params(&prepared.params));

    if config.plot {
        let xs = plot_grid(&prepared.data.x, config.plot_width.max(2));
        let ys = prepared.model.evaluate(&xs, &prepared.params)?;
        let curve: Vec<(f64, f64)> = xs.into_iter().zip(ys).collect();
        // Components without shape support simply have no markers.
        let shapes: Vec<Shape> = prepared
            .model
            .leaves()
            .iter()
            .filter_map(|c| c.to_shape(&prepared.params, &Default::default()).ok())
            .collect();
        let plot = crate::plot::render_ascii_plot(
            &prepared.data.x,
            &prepared.data.y,
            &curve,
            &shapes,
            config.plot_width,
            config.plot_height,
        );
        println!("{plot}");
    }

    if let Some(path) = &config.export_path {
        export_seed(path, &prepared, &prepared.params, "guessed", config.grid_points)?;
    }
    Ok(())
}

fn handle_tui(args: &SessionArgs) -> Result<(), AppError> {
    let config = session_config_from_args(args);
    let prepared = pipeline::prepare(&config)?;

    let outcome = crate::tui::run(&prepared, &config)?;

    match outcome.state {
        SessionState::Committed => {
            let params = &outcome.params;
            println!("Committed parameters ({}):", prepared.model.describe());
            println!("{}", crate::report::format_params(params));
            if let Some(path) = &config.export_path {
                export_seed(path, &prepared, params, "committed", config.grid_points)?;
            }
        }
        _ => println!("Session cancelled; no parameters committed."),
    }
    Ok(())
}

fn handle_show(args: &ShowArgs) -> Result<(), AppError> {
    let seed = crate::io::read_seed_json(&args.params)?;
    println!("{}", crate::report::format_seed_file(&seed));
    if args.plot {
        println!(
            "{}",
            crate::plot::render_ascii_plot_from_seed(&seed, args.width, args.height)
        );
    }
    Ok(())
}

fn export_seed(
    path: &Path,
    prepared: &pipeline::Prepared,
    params: &crate::domain::ParamSet,
    state: &str,
    grid_points: usize,
) -> Result<(), AppError> {
    let seed = pipeline::build_seed_file(prepared, params, state, grid_points)?;
    crate::io::write_seed_json(path, &seed)?;
    info!(path = %path.display(), state, "exported seed file");
    println!("Wrote {}", path.display());
    Ok(())
}

/// Fold CLI arguments (already merged with env vars by clap) into the run
/// configuration.
pub fn session_config_from_args(args: &SessionArgs) -> SessionConfig {
    let data = match &args.data {
        Some(path) => DataSource::Csv {
            path: path.clone(),
            x_col: args.x_col.clone(),
            y_col: args.y_col.clone(),
        },
        None => DataSource::Demo {
            seed: args.seed,
            points: args.points,
            noise: args.noise,
        },
    };

    SessionConfig {
        data,
        model_expr: args.model.clone(),
        params_path: args.params.clone(),
        overrides: args.overrides.clone(),
        grid_points: args.grid.max(2),
        ticks_per_notch: args.ticks_per_notch,
        export_path: args.export.clone(),
        plot: !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
    }
}

/// Install the global subscriber.
///
/// With a log file everything goes there. Without one, the TUI logs nothing
/// (it owns the terminal) and the other commands log to stderr.
fn init_tracing(log_file: Option<&Path>, interactive: bool) -> Result<(), AppError> {
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                AppError::new(2, format!("Failed to create log file '{}': {e}", path.display()))
            })?;
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        None if interactive => {}
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init();
        }
    }
    Ok(())
}

/// Rewrite argv so `guess` defaults to `guess tui`.
///
/// Rules:
/// - `guess`                       -> `guess tui`
/// - `guess --model ... `          -> `guess tui --model ...`
/// - `guess --help/--version/-h`   -> unchanged (top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "tui" | "seed" | "show");
    if is_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}
