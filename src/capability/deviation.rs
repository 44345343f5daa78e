//! Within-subgroup (pooled) and overall standard deviation.
//!
//! The pooled deviation isolates the variation inside each subgroup and
//! drives Cp/Cpk. The overall deviation treats every valid value as one
//! sample, so it also absorbs shifts between subgroups, and drives Pp/Ppk.
//!
//! # Pooled estimate
//!
//! For the k subgroups holding at least two valid values, with sizes nᵢ and
//! Bessel-corrected deviations sᵢ:
//!
//! ```text
//! s_p = √( Σ (nᵢ − 1) · sᵢ²  /  (N − k) ),   N = Σ nᵢ
//! ```
//!
//! # References
//!
//! - Montgomery (2019), *Introduction to Statistical Quality Control*,
//!   8th ed., §6.4.
//! - ASTM E2281, *Standard Practice for Process Capability and Performance
//!   Measurement*.

use serde::Serialize;
use u_numflow::stats;

use crate::matrix::ConcentrationMatrix;

/// How a [`PooledDeviation`] was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PooledMethod {
    /// Degrees-of-freedom weighted pooling, N − k > 0.
    DegreesOfFreedom,
    /// Fallback: arithmetic mean of the per-subgroup deviations.
    MeanOfSubgroups,
    /// No subgroup had two valid values; the estimate is 0.
    NoSubgroups,
}

/// Within-subgroup standard deviation with its provenance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PooledDeviation {
    /// The estimate.
    pub value: f64,
    /// Which formula produced `value`.
    pub method: PooledMethod,
    /// Subgroups with at least two valid values (k).
    pub subgroups_used: usize,
    /// Valid values across those subgroups (N).
    pub total_points: usize,
}

/// Estimates the within-subgroup standard deviation of `matrix`.
///
/// Subgroups with fewer than two valid values are ignored. When N − k is
/// not positive the mean of the per-subgroup deviations is returned
/// instead, and 0 when no subgroup qualifies.
///
/// # Examples
///
/// ```
/// use conc_capability::capability::{estimate_pooled_deviation, PooledMethod};
/// use conc_capability::matrix::ConcentrationMatrix;
///
/// let m = ConcentrationMatrix::new(
///     vec!["S1".into(), "S2".into()],
///     vec!["A".into(), "B".into(), "C".into()],
///     vec![
///         vec![Some(0.09), Some(0.10), Some(0.11)],
///         vec![Some(0.07), Some(0.10), Some(0.13)],
///     ],
/// )
/// .unwrap();
/// let pooled = estimate_pooled_deviation(&m);
/// assert_eq!(pooled.method, PooledMethod::DegreesOfFreedom);
/// assert!((pooled.value - 0.0005_f64.sqrt()).abs() < 1e-9);
/// ```
pub fn estimate_pooled_deviation(matrix: &ConcentrationMatrix) -> PooledDeviation {
    let mut weighted_ss = 0.0;
    let mut deviations = Vec::new();
    let mut total_points = 0usize;

    for row in 0..matrix.n_subgroups() {
        let values = matrix.subgroup_values(row);
        // std_dev is None below two values
        let Some(sd) = stats::std_dev(&values) else {
            continue;
        };
        let n = values.len();
        log::trace!(
            "subgroup {:?}: n = {n}, s = {sd:.6}",
            matrix.subgroups()[row]
        );
        weighted_ss += (n - 1) as f64 * sd * sd;
        deviations.push(sd);
        total_points += n;
    }

    let k = deviations.len();
    if k == 0 {
        log::warn!("no subgroup has two valid values; pooled deviation set to 0");
        return PooledDeviation {
            value: 0.0,
            method: PooledMethod::NoSubgroups,
            subgroups_used: 0,
            total_points: 0,
        };
    }

    if total_points <= k {
        let value = stats::mean(&deviations).unwrap_or(0.0);
        log::warn!("pooled deviation degenerate (N = {total_points}, k = {k}); using mean of subgroup deviations");
        return PooledDeviation {
            value,
            method: PooledMethod::MeanOfSubgroups,
            subgroups_used: k,
            total_points,
        };
    }

    let variance = weighted_ss / (total_points - k) as f64;
    let value = variance.sqrt();
    log::debug!(
        "pooled deviation: k = {k}, N = {total_points}, Σ(nᵢ-1)sᵢ² = {weighted_ss:.6e}, \
         variance = {variance:.6e}, s_p = {value:.6}"
    );

    PooledDeviation {
        value,
        method: PooledMethod::DegreesOfFreedom,
        subgroups_used: k,
        total_points,
    }
}

/// Within-subgroup standard deviation of `matrix`; see
/// [`estimate_pooled_deviation`].
pub fn pooled_deviation(matrix: &ConcentrationMatrix) -> f64 {
    estimate_pooled_deviation(matrix).value
}

/// Bessel-corrected standard deviation of every valid value in `matrix`.
///
/// Returns 0 when fewer than two values are present: no spread can be
/// observed, and downstream indices treat a zero deviation as undefined.
pub fn overall_deviation(matrix: &ConcentrationMatrix) -> f64 {
    stats::std_dev(&matrix.valid_values()).unwrap_or(0.0)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn single_row_pooled_equals_overall(
            row in proptest::collection::vec(0.0_f64..1.0, 2..=30)
        ) {
            let labels = (0..row.len()).map(|j| format!("L{j}")).collect();
            let m = ConcentrationMatrix::new(
                vec!["S1".into()],
                labels,
                vec![row.into_iter().map(Some).collect()],
            ).unwrap();
            let pooled = pooled_deviation(&m);
            let overall = overall_deviation(&m);
            prop_assert!((pooled - overall).abs() < 1e-9, "{pooled} vs {overall}");
        }

        #[test]
        fn row_shifts_keep_pooled_below_overall(
            noise in proptest::collection::vec(0.0_f64..0.01, 12),
            gap in 0.05_f64..1.0,
        ) {
            // Row i sits i·gap above row 0; within-row spread stays below 0.01.
            let rows = noise
                .chunks(4)
                .enumerate()
                .map(|(i, c)| c.iter().map(|&v| Some(v + i as f64 * gap)).collect())
                .collect();
            let m = ConcentrationMatrix::new(
                vec!["S1".into(), "S2".into(), "S3".into()],
                vec!["A".into(), "B".into(), "C".into(), "D".into()],
                rows,
            ).unwrap();
            let pooled = pooled_deviation(&m);
            let overall = overall_deviation(&m);
            prop_assert!(pooled < overall, "pooled {pooled} >= overall {overall}");
        }

        #[test]
        fn pooled_is_non_negative(
            cells in proptest::collection::vec(
                proptest::option::of(0.0_f64..1.0), 12
            )
        ) {
            let rows = cells.chunks(4).map(<[_]>::to_vec).collect();
            let m = ConcentrationMatrix::new(
                vec!["S1".into(), "S2".into(), "S3".into()],
                vec!["A".into(), "B".into(), "C".into(), "D".into()],
                rows,
            ).unwrap();
            let pooled = pooled_deviation(&m);
            prop_assert!(pooled >= 0.0 && pooled.is_finite());
        }
    }
}
