//! Debug bundle writer for inspecting a live guess session.
//!
//! The bundle is a markdown file with the model, the seed and current
//! parameter sets, the disabled interactions, the shapes and the curve on a
//! coarse grid.

use std::fmt::Write as _;
use std::fs::{create_dir_all, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::info;

use crate::domain::{Capability, ParamSet};
use crate::error::AppError;
use crate::session::{Canvas, Session};

/// Write a bundle under `./debug`.
pub fn write_debug_bundle<C: Canvas>(session: &Session<C>, data_label: &str) -> Result<PathBuf, AppError> {
    write_debug_bundle_in(Path::new("debug"), session, data_label)
}

pub fn write_debug_bundle_in<C: Canvas>(
    dir: &Path,
    session: &Session<C>,
    data_label: &str,
) -> Result<PathBuf, AppError> {
    create_dir_all(dir).map_err(|e| AppError::new(4, format!("Failed to create debug dir: {e}")))?;

    let ts = Local::now().format("%Y%m%d_%H%M%S%3f");
    let path = dir.join(format!("guess_debug_{ts}.md"));

    let body = render_bundle(session, data_label);
    let mut file = File::create(&path)
        .map_err(|e| AppError::new(4, format!("Failed to create debug file: {e}")))?;
    file.write_all(body.as_bytes())
        .map_err(|e| AppError::new(4, format!("Failed to write debug: {e}")))?;

    info!(path = %path.display(), "wrote debug bundle");
    Ok(path)
}

fn render_bundle<C: Canvas>(session: &Session<C>, data_label: &str) -> String {
    // Writing into a String cannot fail.
    let mut out = String::new();
    let _ = writeln!(out, "# guess debug bundle");
    let _ = writeln!(out, "- generated: {}", Local::now().to_rfc3339());
    let _ = writeln!(out, "- data: {data_label} (n={})", session.y().len());
    let _ = writeln!(out, "- model: {}", session.model().describe());
    let _ = writeln!(out, "- state: {}", session.state().label());
    let _ = writeln!(out, "- status: {}", session.status());

    let _ = writeln!(out, "\n## Components");
    let _ = writeln!(out, "| idx | component | scroll | shape export | shape import |");
    let _ = writeln!(out, "| - | - | - | - | - |");
    for (idx, label) in session.component_labels().iter().enumerate() {
        let flag = |cap| if session.is_disabled(idx, cap) { "disabled" } else { "ok" };
        let _ = writeln!(
            out,
            "| {idx} | {label} | {} | {} | {} |",
            flag(Capability::Scroll),
            flag(Capability::ToShape),
            flag(Capability::FromShape)
        );
    }

    let _ = writeln!(out, "\n## Parameters");
    write_param_rows(&mut out, session.seed(), session.params());

    let _ = writeln!(out, "\n## Shapes");
    for (idx, shape) in session.frame().shapes.iter().enumerate() {
        match shape {
            Some(s) => {
                let _ = writeln!(out, "- {idx}: xs={} ys={}", fmt_vec(&s.xs), fmt_vec(&s.ys));
            }
            None => {
                let _ = writeln!(out, "- {idx}: -");
            }
        }
    }

    let _ = writeln!(out, "\n## Curve grid");
    let _ = writeln!(out, "| x | model |");
    let _ = writeln!(out, "| - | - |");
    let xs = session.plot_xs();
    let ys = &session.frame().curve;
    let step = (xs.len() / 20).max(1);
    for (x, y) in xs.iter().zip(ys.iter()).step_by(step) {
        let _ = writeln!(out, "| {x:.4} | {} |", fmt_opt(Some(*y)));
    }

    out
}

fn write_param_rows(out: &mut String, seed: &ParamSet, current: &ParamSet) {
    let _ = writeln!(out, "| name | seed | current | min | max | fixed |");
    let _ = writeln!(out, "| - | - | - | - | - | - |");
    for p in current {
        let seed_value = seed.get(&p.name).map(|s| s.value);
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} | {} |",
            p.name,
            fmt_opt(seed_value),
            fmt_opt(Some(p.value)),
            p.min,
            p.max,
            p.fixed
        );
    }
}

fn fmt_vec(values: &[f64]) -> String {
    let parts: Vec<String> = values.iter().map(|v| format!("{v:.6}")).collect();
    format!("[{}]", parts.join(", "))
}

fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.6}"),
        _ => "-".to_string(),
    }
}
