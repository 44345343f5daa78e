//! Shape and normality diagnostics.
//!
//! Capability indices assume the measured concentrations are roughly
//! normal. This module provides the moment-based shape statistics and the
//! Shapiro–Wilk test used to check that assumption.
//!
//! Skewness and kurtosis use the biased (population) moment estimators,
//! g₁ = m₃ / m₂^{3/2} and g₂ = m₄ / m₂² − 3, from
//! [`u_numflow::stats::skewness_moment`] and
//! [`u_numflow::stats::kurtosis_moment`]. These match SciPy's defaults, not
//! the bias-adjusted `SKEW`/`KURT` of spreadsheets.
//!
//! # References
//!
//! - Shapiro & Wilk (1965). "An analysis of variance test for normality".
//!   Biometrika, 52(3–4), 591–611.
//! - Royston (1995). "Remark AS R94: A remark on Algorithm AS 181".
//!   Applied Statistics, 44(4), 547–551.
//! - Joanes & Gill (1998). "Comparing measures of sample skewness and
//!   kurtosis". The Statistician, 47(1), 183–189.

use serde::Serialize;
use u_numflow::{special, stats};

/// Identical values have no shape even when their mean rounds off them.
fn has_spread(values: &[f64]) -> bool {
    values.first().is_some_and(|&first| values.iter().any(|&v| v != first))
}

/// Biased sample skewness g₁ = m₃ / m₂^{3/2}.
///
/// `None` for fewer than 3 values, non-finite input or identical values.
///
/// # Examples
///
/// ```
/// use conc_capability::normality::skewness;
///
/// assert!(skewness(&[1.0, 2.0, 3.0]).unwrap().abs() < 1e-12);
/// assert!(skewness(&[1.0, 1.0, 1.0, 10.0]).unwrap() > 1.0);
/// assert!(skewness(&[2.0, 2.0, 2.0]).is_none());
/// ```
pub fn skewness(values: &[f64]) -> Option<f64> {
    if !has_spread(values) {
        return None;
    }
    stats::skewness_moment(values)
}

/// Biased excess kurtosis g₂ = m₄ / m₂² − 3 (0 for a normal distribution).
///
/// `None` for fewer than 4 values, non-finite input or identical values.
pub fn excess_kurtosis(values: &[f64]) -> Option<f64> {
    if !has_spread(values) {
        return None;
    }
    stats::kurtosis_moment(values)
}

// ---------------------------------------------------------------------------
// Shapiro–Wilk
// ---------------------------------------------------------------------------

/// Outcome of the Shapiro–Wilk test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShapiroWilk {
    /// The W statistic, in (0, 1]. Values near 1 are consistent with normality.
    pub w: f64,
    /// p-value for H₀: the data are normally distributed.
    pub p_value: f64,
}

impl ShapiroWilk {
    /// True when normality is not rejected at significance `alpha`.
    pub fn is_normal(&self, alpha: f64) -> bool {
        self.p_value > alpha
    }
}

/// Shapiro–Wilk normality test (Royston AS R94 approximation).
///
/// # Returns
///
/// `None` if n < 3, n > 5000, the values are all identical, or any value is
/// non-finite.
///
/// # Examples
///
/// ```
/// use conc_capability::normality::shapiro_wilk;
///
/// let data = [-1.5, -1.0, -0.5, 0.0, 0.5, 1.0, 1.5];
/// let r = shapiro_wilk(&data).unwrap();
/// assert!(r.w > 0.9);
/// assert!(r.is_normal(0.05));
/// ```
pub fn shapiro_wilk(values: &[f64]) -> Option<ShapiroWilk> {
    let n = values.len();
    if !(3..=5000).contains(&n) || values.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let mut x = values.to_vec();
    x.sort_by(f64::total_cmp);
    if x[n - 1] - x[0] < 1e-300 {
        return None;
    }

    let mean = stats::mean(&x)?;
    let ss: f64 = x.iter().map(|&v| (v - mean).powi(2)).sum();
    if ss < 1e-300 {
        return None;
    }

    if n == 3 {
        let a = std::f64::consts::FRAC_1_SQRT_2;
        let w = (a * (x[2] - x[0])).powi(2) / ss;
        let w = w.clamp(0.75, 1.0);
        let p = 1.0 - (6.0 / std::f64::consts::PI) * w.sqrt().acos();
        return Some(ShapiroWilk {
            w,
            p_value: p.clamp(0.0, 1.0),
        });
    }

    let weights = royston_weights(n)?;
    let numerator: f64 = weights
        .iter()
        .enumerate()
        .map(|(i, a)| a * (x[n - 1 - i] - x[i]))
        .sum();
    let w = numerator * numerator / ss;
    if !(0.0..=1.0 + 1e-10).contains(&w) {
        return None;
    }
    let w = w.min(1.0);

    Some(ShapiroWilk {
        w,
        p_value: royston_p_value(w, n).clamp(0.0, 1.0),
    })
}

const C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.07119, 4.434685, -2.706056];
const C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];
const C3: [f64; 4] = [0.544, -0.39978, 0.025054, -6.714e-4];
const C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
const C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
const C6: [f64; 3] = [-0.4803, -0.082676, 0.0030302];
const G: [f64; 2] = [-2.273, 0.459];

// c[0] + c[1]·x + c[2]·x² + …
fn horner(c: &[f64], x: f64) -> f64 {
    c.iter().rev().fold(0.0, |acc, &ci| acc * x + ci)
}

/// Antisymmetric weights a₁..a_{n/2} for the sorted sample, n ≥ 4.
fn royston_weights(n: usize) -> Option<Vec<f64>> {
    let half = n / 2;
    let nf = n as f64;

    // Blom scores for the expected normal order statistics.
    let m: Vec<f64> = (1..=half)
        .map(|i| special::inverse_normal_cdf((i as f64 - 0.375) / (nf + 0.25)))
        .collect();
    let summ2 = 2.0 * m.iter().map(|v| v * v).sum::<f64>();
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / nf.sqrt();

    let corrected = if n <= 5 { 1 } else { 2 };
    let mut a = vec![0.0; half];
    a[0] = horner(&C1, rsn) - m[0] / ssumm2;
    if corrected == 2 {
        a[1] = horner(&C2, rsn) - m[1] / ssumm2;
    }

    let fac_sq = summ2 - 2.0 * m[..corrected].iter().map(|v| v * v).sum::<f64>();
    let rest = 1.0 - 2.0 * a[..corrected].iter().map(|v| v * v).sum::<f64>();
    if fac_sq <= 0.0 || rest <= 0.0 {
        return None;
    }
    let fac = (fac_sq / rest).sqrt();
    for i in corrected..half {
        a[i] = -m[i] / fac;
    }
    Some(a)
}

fn royston_p_value(w: f64, n: usize) -> f64 {
    let w1 = 1.0 - w;
    if w1 <= 0.0 {
        return 1.0;
    }
    let y = w1.ln();
    let nf = n as f64;

    let z = if n <= 11 {
        let gamma = horner(&G, nf);
        if y >= gamma {
            return 0.0;
        }
        let s = horner(&C4, nf).exp();
        (-(gamma - y).ln() - horner(&C3, nf)) / s
    } else {
        let ln_n = nf.ln();
        let s = horner(&C6, ln_n).exp();
        (y - horner(&C5, ln_n)) / s
    };
    1.0 - special::standard_normal_cdf(z)
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Moments
    // -----------------------------------------------------------------------

    #[test]
    fn symmetric_data_has_zero_skew() {
        let data = [0.09, 0.095, 0.10, 0.105, 0.11];
        assert!(skewness(&data).unwrap().abs() < 1e-9);
    }

    #[test]
    fn skewness_matches_hand_computation() {
        // mean 2.5; deviations -1.5, -1.5, -1.5, 4.5
        // m2 = (3·2.25 + 20.25)/4 = 6.75, m3 = (3·-3.375 + 91.125)/4 = 20.25
        let g1 = skewness(&[1.0, 1.0, 1.0, 7.0]).unwrap();
        let expected = 20.25 / 6.75_f64.powf(1.5);
        assert!((g1 - expected).abs() < 1e-12, "g1 = {g1}");
    }

    #[test]
    fn kurtosis_of_two_point_distribution() {
        // Symmetric two-point distribution: m4/m2² = 1, so g2 = -2.
        let k = excess_kurtosis(&[-1.0, 1.0, -1.0, 1.0]).unwrap();
        assert!((k + 2.0).abs() < 1e-12, "k = {k}");
    }

    #[test]
    fn moments_undefined_without_spread() {
        assert!(skewness(&[]).is_none());
        assert!(skewness(&[0.1]).is_none());
        assert!(excess_kurtosis(&[0.1, 0.1, 0.1, 0.1]).is_none());
        // The mean of repeated 0.1 is not exactly 0.1.
        let repeated = [0.1; 9];
        assert!(skewness(&repeated).is_none());
        assert!(excess_kurtosis(&repeated).is_none());
    }

    #[test]
    fn moments_need_enough_values() {
        assert!(skewness(&[0.09, 0.11]).is_none());
        assert!(skewness(&[0.09, 0.10, 0.12]).is_some());
        assert!(excess_kurtosis(&[0.09, 0.10, 0.12]).is_none());
        assert!(excess_kurtosis(&[0.09, 0.10, 0.11, 0.13]).is_some());
    }

    #[test]
    fn kurtosis_matches_hand_computation() {
        // mean 2.5; m2 = 6.75, m4 = (3·5.0625 + 410.0625)/4 = 106.3125
        let g2 = excess_kurtosis(&[1.0, 1.0, 1.0, 7.0]).unwrap();
        let expected = 106.3125 / (6.75 * 6.75) - 3.0;
        assert!((g2 - expected).abs() < 1e-12, "g2 = {g2}");
    }

    // -----------------------------------------------------------------------
    // Shapiro–Wilk
    // -----------------------------------------------------------------------

    #[test]
    fn normal_quantiles_pass() {
        let data: Vec<f64> = (1..=30)
            .map(|i| special::inverse_normal_cdf((i as f64 - 0.5) / 30.0))
            .collect();
        let r = shapiro_wilk(&data).unwrap();
        assert!(r.w > 0.97, "W = {}", r.w);
        assert!(r.p_value > 0.5, "p = {}", r.p_value);
        assert!(r.is_normal(0.05));
    }

    #[test]
    fn heavy_outlier_fails() {
        let mut data = vec![0.10; 19];
        for (i, v) in data.iter_mut().enumerate() {
            *v += i as f64 * 1e-4;
        }
        data.push(0.5);
        let r = shapiro_wilk(&data).unwrap();
        assert!(r.p_value < 0.01, "p = {}", r.p_value);
        assert!(!r.is_normal(0.05));
    }

    #[test]
    fn three_points_use_exact_form() {
        let r = shapiro_wilk(&[1.0, 2.0, 3.0]).unwrap();
        assert!((r.w - 1.0).abs() < 1e-12);
        assert!((r.p_value - 1.0).abs() < 1e-9);
    }

    #[test]
    fn small_samples_in_range() {
        for data in [
            vec![0.09, 0.10, 0.11, 0.10],
            vec![0.08, 0.09, 0.10, 0.11, 0.125],
            vec![0.07, 0.10, 0.13, 0.09, 0.10, 0.11],
        ] {
            let r = shapiro_wilk(&data).expect("should compute");
            assert!(r.w > 0.0 && r.w <= 1.0, "W = {}", r.w);
            assert!((0.0..=1.0).contains(&r.p_value), "p = {}", r.p_value);
        }
    }

    #[test]
    fn rejects_out_of_range_input() {
        assert!(shapiro_wilk(&[1.0, 2.0]).is_none());
        assert!(shapiro_wilk(&[0.1; 10]).is_none());
        assert!(shapiro_wilk(&[1.0, f64::NAN, 2.0, 3.0]).is_none());
    }
}
