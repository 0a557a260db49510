//! Peak line-shapes and the numeric rules shared by the peak components.
//!
//! Both line-shapes are area-normalized, i.e. `amplitude` is the area under
//! the peak and the maximum value is:
//!
//! - Gaussian:   `amplitude / (sigma * sqrt(2π))`
//! - Lorentzian: `amplitude / (π * sigma)`

use std::f64::consts::PI;

/// Floor for width parameters in evaluation, so `sigma = 0` yields a finite
/// (very narrow) peak instead of NaN.
pub const TINY: f64 = 1.0e-15;

/// Scroll ticks that double (or, negated, halve towards the floor) a width.
pub const TICKS_PER_DOUBLING: f64 = 700.0;

pub const SCROLL_SCALE_MIN: f64 = 0.5;
pub const SCROLL_SCALE_MAX: f64 = 2.0;

/// `sqrt(2π)`
pub fn sqrt_two_pi() -> f64 {
    (2.0 * PI).sqrt()
}

pub fn gaussian(x: f64, amplitude: f64, center: f64, sigma: f64) -> f64 {
    let s = sigma.max(TINY);
    let z = (x - center) / s;
    amplitude / (s * sqrt_two_pi()) * (-0.5 * z * z).exp()
}

pub fn lorentzian(x: f64, amplitude: f64, center: f64, sigma: f64) -> f64 {
    let s = sigma.max(TINY);
    let d = x - center;
    amplitude / PI * s / (d * d + s * s)
}

/// Multiplicative width/amplitude factor for a scroll of `ticks`.
///
/// Monotone in `ticks` and always inside `[0.5, 2.0]`.
pub fn scroll_scale(ticks: i32) -> f64 {
    (1.0 + f64::from(ticks) / TICKS_PER_DOUBLING).clamp(SCROLL_SCALE_MIN, SCROLL_SCALE_MAX)
}

/// Starting values for a single-peak component estimated from raw data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakGuess {
    pub amplitude: f64,
    pub center: f64,
    pub sigma: f64,
}

/// Estimate a peak from data.
///
/// - center at the maximum of `y`
/// - width from the span of points above half-maximum (falls back to a sixth
///   of the x range when fewer than three points qualify)
/// - amplitude as `3 · (max y − min y) · sigma · ampscale`
///
/// Returns `None` for empty or mismatched input.
pub fn guess_from_peak(x: &[f64], y: &[f64], ampscale: f64) -> Option<PeakGuess> {
    if x.is_empty() || x.len() != y.len() {
        return None;
    }

    let mut max_y = f64::NEG_INFINITY;
    let mut min_y = f64::INFINITY;
    let mut argmax = 0usize;
    for (i, &v) in y.iter().enumerate() {
        if v > max_y {
            max_y = v;
            argmax = i;
        }
        min_y = min_y.min(v);
    }
    let (min_x, max_x) = x
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));

    if !(max_y.is_finite() && min_y.is_finite() && min_x.is_finite() && max_x.is_finite()) {
        return None;
    }

    let height = (max_y - min_y) * 3.0;
    let mut center = x[argmax];
    let mut sigma = (max_x - min_x) / 6.0;

    let half_max = (max_y + min_y) / 2.0;
    let above: Vec<f64> = x
        .iter()
        .zip(y)
        .filter(|&(_, &v)| v > half_max)
        .map(|(&xv, _)| xv)
        .collect();
    if above.len() > 2 {
        let lo = above.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = above.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        sigma = (hi - lo) / 2.0;
        center = above.iter().sum::<f64>() / above.len() as f64;
    }

    Some(PeakGuess {
        amplitude: height * sigma * ampscale,
        center,
        sigma,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gaussian_peak_value_matches_normalization() {
        let peak = gaussian(0.0, 1.0, 0.0, 1.0);
        assert!((peak - 1.0 / sqrt_two_pi()).abs() < 1e-12);
    }

    #[test]
    fn lorentzian_peak_value_matches_normalization() {
        let peak = lorentzian(2.0, 3.0, 2.0, 0.5);
        assert!((peak - 3.0 / (PI * 0.5)).abs() < 1e-12);
    }

    #[test]
    fn zero_width_evaluates_finite() {
        assert!(gaussian(0.0, 1.0, 0.0, 0.0).is_finite());
        assert!(lorentzian(0.0, 1.0, 0.0, 0.0).is_finite());
    }

    #[test]
    fn scroll_scale_is_clamped_and_monotone() {
        assert_eq!(scroll_scale(700), 2.0);
        assert_eq!(scroll_scale(-700), 0.5);
        assert_eq!(scroll_scale(0), 1.0);
        assert_eq!(scroll_scale(i32::MAX), 2.0);
        assert_eq!(scroll_scale(i32::MIN), 0.5);

        let mut prev = scroll_scale(0);
        for ticks in (0..2000).step_by(7) {
            let s = scroll_scale(ticks);
            assert!(s >= prev, "scale must not decrease: {prev} -> {s} at {ticks}");
            assert!((SCROLL_SCALE_MIN..=SCROLL_SCALE_MAX).contains(&s));
            prev = s;
        }
        let mut prev = scroll_scale(0);
        for ticks in (0..2000).step_by(7) {
            let s = scroll_scale(-ticks);
            assert!(s <= prev, "scale must not increase: {prev} -> {s} at -{ticks}");
            assert!((SCROLL_SCALE_MIN..=SCROLL_SCALE_MAX).contains(&s));
            prev = s;
        }
    }

    #[test]
    fn guess_from_peak_finds_a_single_bump() {
        let x: Vec<f64> = (0..201).map(|i| -10.0 + 0.1 * i as f64).collect();
        let y: Vec<f64> = x.iter().map(|&v| gaussian(v, 2.0, 1.5, 0.8)).collect();

        let g = guess_from_peak(&x, &y, 1.0).unwrap();
        assert!((g.center - 1.5).abs() < 0.1, "center {}", g.center);
        assert!(g.sigma > 0.3 && g.sigma < 2.0, "sigma {}", g.sigma);
        assert!(g.amplitude > 0.0);
    }

    #[test]
    fn guess_from_peak_rejects_bad_input() {
        assert!(guess_from_peak(&[], &[], 1.0).is_none());
        assert!(guess_from_peak(&[1.0, 2.0], &[1.0], 1.0).is_none());
    }
}
