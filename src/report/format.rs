//! Formatted terminal output for the non-interactive commands.

use crate::data::Dataset;
use crate::domain::{ParamSet, Parameter};
use crate::io::SeedFile;

/// Header block: data, model and how the parameters were obtained.
pub fn format_run_summary(data: &Dataset, model: &str, origin: &str) -> String {
    let mut out = String::new();

    out.push_str("=== guess - initial parameter estimate ===\n");
    out.push_str(&format!("Data: {}\n", data.label));
    match (data.x_range(), data.y_range()) {
        (Some((x0, x1)), Some((y0, y1))) => out.push_str(&format!(
            "Points: n={} | x=[{x0:.3}, {x1:.3}] | y=[{y0:.3}, {y1:.3}]\n",
            data.len()
        )),
        _ => out.push_str(&format!("Points: n={}\n", data.len())),
    }
    out.push_str(&format!("Model: {model}\n"));
    out.push_str(&format!("Parameters: {origin}\n"));
    out.push('\n');

    out
}

/// Parameter table: name, value, bounds, fixed flag.
pub fn format_params(params: &ParamSet) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<24} {:>14} {:>12} {:>12} {:<5}\n",
            "name", "value", "min", "max", "fixed"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<24} {:-<14} {:-<12} {:-<12} {:-<5}\n", "", "", "", "", "").trim_end());
    out.push('\n');

    for p in params {
        out.push_str(format_param_row(p).trim_end());
        out.push('\n');
    }

    out
}

/// Everything `guess show` prints for a seed file.
pub fn format_seed_file(seed: &SeedFile) -> String {
    let mut out = String::new();
    out.push_str(&format!("Tool: {}\n", seed.tool));
    if let Some(created) = &seed.created {
        out.push_str(&format!("Created: {}\n", created.format("%Y-%m-%d %H:%M:%S")));
    }
    if let Some(data) = &seed.data {
        out.push_str(&format!("Data: {data}\n"));
    }
    out.push_str(&format!("Model: {}\n", seed.model));
    out.push_str(&format!("State: {}\n", seed.state));
    out.push_str(&format!("Grid: {} points\n\n", seed.grid.x.len()));
    out.push_str(&format_params(&seed.to_params()));
    out
}

fn format_param_row(p: &Parameter) -> String {
    format!(
        "{:<24} {:>14} {:>12} {:>12} {:<5}\n",
        truncate(&p.name, 24),
        fmt_value(p.value),
        fmt_bound(p.min),
        fmt_bound(p.max),
        if p.fixed { "yes" } else { "" },
    )
}

fn fmt_value(v: f64) -> String {
    if v.is_finite() && v != 0.0 && (v.abs() >= 1e6 || v.abs() < 1e-4) {
        format!("{v:.6e}")
    } else {
        format!("{v:.6}")
    }
}

fn fmt_bound(v: f64) -> String {
    if v.is_infinite() {
        if v > 0.0 { "inf".to_string() } else { "-inf".to_string() }
    } else {
        format!("{v:.4}")
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_table_golden() {
        let params = ParamSet::new()
            .with(Parameter::new("g_center", 1.5))
            .with(Parameter::bounded("g_sigma", 0.25, 0.0, f64::INFINITY))
            .with(Parameter::new("g_height", 0.00001).fixed());

        let txt = format_params(&params);
        let expected = concat!(
            "name                              value          min          max fixed\n",
            "------------------------ -------------- ------------ ------------ -----\n",
            "g_center                       1.500000         -inf          inf\n",
            "g_sigma                        0.250000       0.0000          inf\n",
            "g_height                    1.000000e-5         -inf          inf yes\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn long_names_are_truncated() {
        assert_eq!(truncate("abcdef", 4), "abc.");
        assert_eq!(truncate("abc", 4), "abc");
    }

    #[test]
    fn summary_mentions_model_and_ranges() {
        let data = Dataset {
            x: vec![0.0, 2.0],
            y: vec![1.0, 3.0],
            label: "demo".to_string(),
        };
        let txt = format_run_summary(&data, "gaussian[g_]", "automatic guess");
        assert!(txt.contains("Model: gaussian[g_]"));
        assert!(txt.contains("x=[0.000, 2.000]"));
        assert!(txt.contains("automatic guess"));
    }
}
