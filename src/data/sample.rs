//! Synthetic multi-peak demo data.
//!
//! Three unit-width Gaussian bumps of height 1, 2 and 3 laid side by side
//! over `[-5, 25]`, on top of a broad Gaussian background, plus uniform noise.
//! A fixed `seed` always reproduces the same data.

use rand::prelude::*;
use rand::rngs::StdRng;

use crate::data::Dataset;
use crate::error::AppError;

pub const DEMO_X_MIN: f64 = -5.0;
pub const DEMO_X_MAX: f64 = 25.0;
pub const DEMO_PEAK_HEIGHTS: [f64; 3] = [1.0, 2.0, 3.0];

/// Each bump spans `[-4, 4]` in its own local coordinate.
const BUMP_HALF_SPAN: f64 = 4.0;
/// Local coordinate range of the background.
const BACKGROUND_SPAN: (f64, f64) = (-1.0, 3.0);

/// Generate the demo set.
///
/// - `points`: total sample count, rounded down to a multiple of three
/// - `noise`: full width of the uniform noise, centered on zero
pub fn generate_demo(seed: u64, points: usize, noise: f64) -> Result<Dataset, AppError> {
    let per_peak = points / DEMO_PEAK_HEIGHTS.len();
    if per_peak < 2 {
        return Err(AppError::new(2, "Demo data needs at least 6 points."));
    }
    if !(noise.is_finite() && noise >= 0.0) {
        return Err(AppError::new(2, "Demo noise must be a finite, non-negative number."));
    }

    let n = per_peak * DEMO_PEAK_HEIGHTS.len();
    let x = linspace(DEMO_X_MIN, DEMO_X_MAX, n);
    let local = linspace(-BUMP_HALF_SPAN, BUMP_HALF_SPAN, per_peak);
    let background = linspace(BACKGROUND_SPAN.0, BACKGROUND_SPAN.1, n);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut y = Vec::with_capacity(n);
    for (peak, height) in DEMO_PEAK_HEIGHTS.iter().enumerate() {
        for (i, u) in local.iter().enumerate() {
            let idx = peak * per_peak + i;
            let jitter = if noise > 0.0 {
                (rng.r#gen::<f64>() - 0.5) * noise
            } else {
                0.0
            };
            let bg = (-background[idx] * background[idx]).exp();
            y.push(height * (-u * u).exp() + jitter + bg);
        }
    }

    Ok(Dataset {
        x,
        y,
        label: format!("demo (seed={seed}, n={n}, noise={noise})"),
    })
}

fn linspace(a: f64, b: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![a],
        _ => (0..n)
            .map(|i| a + (b - a) * i as f64 / (n as f64 - 1.0))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_is_reproducible_per_seed() {
        let a = generate_demo(7, 225, 0.2).unwrap();
        let b = generate_demo(7, 225, 0.2).unwrap();
        let c = generate_demo(8, 225, 0.2).unwrap();
        assert_eq!(a, b);
        assert_ne!(a.y, c.y);
    }

    #[test]
    fn demo_without_noise_has_three_peaks() {
        let data = generate_demo(0, 225, 0.0).unwrap();
        assert_eq!(data.len(), 225);
        assert_eq!(data.x[0], DEMO_X_MIN);
        assert!((data.x[224] - DEMO_X_MAX).abs() < 1e-12);

        // Peak centers fall in the middle of each 75-point block.
        for (k, height) in DEMO_PEAK_HEIGHTS.iter().enumerate() {
            let block = &data.y[k * 75..(k + 1) * 75];
            let max = block.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            assert!(max > *height, "block {k} max {max} below {height}");
            assert!(max < height + 1.0 + 1e-9, "block {k} max {max}");
        }
    }

    #[test]
    fn noise_stays_within_its_width() {
        let clean = generate_demo(3, 30, 0.0).unwrap();
        let noisy = generate_demo(3, 30, 0.2).unwrap();
        for (a, b) in clean.y.iter().zip(noisy.y.iter()) {
            assert!((a - b).abs() <= 0.1 + 1e-12);
        }
    }

    #[test]
    fn too_few_points_is_rejected() {
        assert!(generate_demo(0, 5, 0.1).is_err());
        assert!(generate_demo(0, 30, -1.0).is_err());
    }
}
