//! Shared preparation used by both the CLI and the TUI front-ends.
//!
//! data -> model -> initial parameters (seed file or automatic guess) ->
//! `--set` overrides
//!
//! The front-ends then only differ in presentation.

use tracing::{debug, info, warn};

use crate::data::{load_dataset, Dataset};
use crate::domain::{ParamSet, SessionConfig};
use crate::error::AppError;
use crate::io::{read_seed_json, SeedFile, SeedGrid};
use crate::models::{parse_model, Model};
use crate::session::plot_grid;

/// Everything a session needs, ready to start.
#[derive(Debug)]
pub struct Prepared {
    pub data: Dataset,
    pub model: Model,
    /// The expression the model was parsed from.
    pub model_expr: String,
    pub params: ParamSet,
    /// Human-readable origin of `params`.
    pub origin: String,
}

pub fn prepare(config: &SessionConfig) -> Result<Prepared, AppError> {
    let data = load_dataset(&config.data)?;
    let model = parse_model(&config.model_expr)?;
    info!(data = %data.label, model = %model.describe(), "prepared inputs");

    let (mut params, mut origin) = match &config.params_path {
        Some(path) => {
            let seed = read_seed_json(path)?;
            if seed.model != config.model_expr {
                warn!(file_model = %seed.model, model = %config.model_expr, "seed file was written for another model");
            }
            let loaded = seed.to_params();
            check_covers_model(&model, &loaded)?;
            (model.normalize(&loaded)?, format!("loaded from {}", path.display()))
        }
        None => (model.guess(&data.x, &data.y)?, "automatic guess".to_string()),
    };

    if !config.overrides.is_empty() {
        apply_overrides(&model, &mut params, &config.overrides)?;
        origin.push_str(&format!(" + {} override(s)", config.overrides.len()));
    }

    Ok(Prepared {
        data,
        model_expr: config.model_expr.clone(),
        model,
        params,
        origin,
    })
}

/// Set `name=value` pairs, then re-derive dependent parameters.
///
/// Names must belong to the model and must not be derived ones.
pub fn apply_overrides(model: &Model, params: &mut ParamSet, overrides: &[(String, f64)]) -> Result<(), AppError> {
    let known = model.param_names();
    let derived = model.derived_names();
    for (name, value) in overrides {
        if !known.iter().any(|k| k == name) {
            return Err(AppError::new(
                3,
                format!("Unknown parameter '{name}' (model has: {}).", known.join(", ")),
            ));
        }
        if derived.iter().any(|d| d == name) {
            return Err(AppError::new(
                3,
                format!("Parameter '{name}' is derived from the others and cannot be set."),
            ));
        }
        debug!(name = %name, value, "override");
        params.set_value(name, *value);
    }
    *params = model.normalize(params)?;
    Ok(())
}

fn check_covers_model(model: &Model, params: &ParamSet) -> Result<(), AppError> {
    let missing: Vec<String> = model
        .param_names()
        .into_iter()
        .filter(|n| !params.contains(n))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::new(
            3,
            format!("Seed file lacks parameters: {}.", missing.join(", ")),
        ))
    }
}

/// Build the seed file for `params`, including the model curve on a grid.
pub fn build_seed_file(
    prepared: &Prepared,
    params: &ParamSet,
    state: &str,
    grid_points: usize,
) -> Result<SeedFile, AppError> {
    let x = plot_grid(&prepared.data.x, grid_points);
    let y = prepared.model.evaluate(&x, params)?;
    Ok(SeedFile::new(&prepared.model_expr, state, params, SeedGrid { x, y }).with_data(&prepared.data.label))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DataSource;
    use crate::models::{Peak, PeakValues};

    fn demo_config(model: &str) -> SessionConfig {
        SessionConfig {
            data: DataSource::Demo {
                seed: 1,
                points: 90,
                noise: 0.0,
            },
            model_expr: model.to_string(),
            params_path: None,
            overrides: Vec::new(),
            grid_points: 50,
            ticks_per_notch: 120,
            export_path: None,
            plot: false,
            plot_width: 80,
            plot_height: 20,
        }
    }

    #[test]
    fn prepare_guesses_and_applies_overrides() {
        let mut config = demo_config("gaussian:g_ + linear:bk_");
        config.overrides = vec![("g_center".to_string(), 3.0)];
        let prepared = prepare(&config).unwrap();
        assert_eq!(prepared.params.value("g_center").unwrap(), 3.0);
        assert!(prepared.params.contains("bk_slope"));
        assert!(prepared.origin.contains("override"));
    }

    #[test]
    fn unknown_override_is_a_model_error() {
        let mut config = demo_config("gaussian:g_");
        config.overrides = vec![("nope".to_string(), 1.0)];
        let err = prepare(&config).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn overrides_rederive_peak_height() {
        let model = parse_model("gaussian:g_").unwrap();
        let mut params = Peak::gaussian("g_").make_params(
            PeakValues {
                amplitude: 1.0,
                center: 0.0,
                sigma: 1.0,
            },
            None,
        );

        apply_overrides(&model, &mut params, &[("g_sigma".to_string(), 2.0)]).unwrap();
        let peak = model.evaluate(&[0.0], &params).unwrap()[0];
        assert!((params.value("g_height").unwrap() - peak).abs() < 1e-12);
        assert!((peak - 0.5 / crate::math::sqrt_two_pi()).abs() < 1e-12);
        assert!(params.get("g_height").unwrap().fixed);
    }

    #[test]
    fn derived_override_is_refused() {
        let mut config = demo_config("gaussian:g_");
        config.overrides = vec![("g_height".to_string(), 5.0)];
        let err = prepare(&config).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("derived"));
    }

    #[test]
    fn stale_height_in_seed_file_is_rederived() {
        let prepared = prepare(&demo_config("gaussian:g_")).unwrap();
        let mut stale = prepared.params.clone();
        stale.set_value("g_height", 123.0);
        let path = std::env::temp_dir().join(format!("guess_pipeline_stale_{}.json", std::process::id()));
        let seed = SeedFile::new("gaussian:g_", "guessed", &stale, SeedGrid::default());
        crate::io::write_seed_json(&path, &seed).unwrap();

        let mut config = demo_config("gaussian:g_");
        config.params_path = Some(path.clone());
        let loaded = prepare(&config);
        let _ = std::fs::remove_file(&path);
        let loaded = loaded.unwrap();
        let expected = prepared.params.value("g_height").unwrap();
        assert!((loaded.params.value("g_height").unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn bad_expression_is_a_model_error() {
        let err = prepare(&demo_config("gaussian:a_ + gaussian:a_")).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn seed_file_grid_matches_model() {
        let prepared = prepare(&demo_config("gaussian:g_")).unwrap();
        let seed = build_seed_file(&prepared, &prepared.params, "guessed", 11).unwrap();
        assert_eq!(seed.grid.x.len(), 11);
        let direct = prepared.model.evaluate(&seed.grid.x, &prepared.params).unwrap();
        assert_eq!(seed.grid.y, direct);
        assert_eq!(seed.to_params(), prepared.params);
    }
}
