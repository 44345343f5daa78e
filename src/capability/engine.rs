//! Full capability study of a concentration matrix.

use serde::Serialize;
use u_numflow::stats;

use crate::config::{AnalysisConfig, DEFAULT_NORMALITY_ALPHA};
use crate::error::CapabilityError;
use crate::matrix::ConcentrationMatrix;
use crate::normality::{self, ShapiroWilk};

use super::deviation::{estimate_pooled_deviation, PooledMethod};
use super::{
    capability_index, defect_rate, overall_deviation, potential_capability, CpkRating,
    ImprovementPriority, SpecificationLimits, SubgroupConsistency,
};

/// Snapshot of every statistic derived from one matrix.
///
/// Index fields are `None` when the corresponding deviation is zero, so a
/// perfectly constant process reports "undefined" rather than infinity.
/// Shape statistics are `None` when the data have no spread, and the
/// normality test is `None` outside 3..=5000 values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapabilityResult {
    /// Limits the indices were computed against.
    pub limits: SpecificationLimits,
    /// Number of valid measurements.
    pub n_values: usize,
    /// Number of subgroups (matrix rows).
    pub n_subgroups: usize,
    /// Number of batches (matrix columns).
    pub n_batches: usize,

    /// Arithmetic mean.
    pub mean: f64,
    /// Median.
    pub median: f64,
    /// Overall (long-term) standard deviation, divisor n − 1.
    pub overall_deviation: f64,
    /// Pooled within-subgroup (short-term) standard deviation.
    pub pooled_deviation: f64,
    /// Formula behind `pooled_deviation`.
    pub pooled_method: PooledMethod,
    /// Overall variance, divisor n − 1.
    pub variance: f64,
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
    /// `max − min`.
    pub range: f64,
    /// 25th percentile (linear interpolation).
    pub q1: f64,
    /// 75th percentile (linear interpolation).
    pub q3: f64,
    /// `q3 − q1`.
    pub iqr: f64,
    /// Biased sample skewness.
    pub skewness: Option<f64>,
    /// Biased excess kurtosis.
    pub kurtosis: Option<f64>,

    /// (USL − LSL) / 6σ_pooled.
    pub cp: Option<f64>,
    /// min(Cpu, Cpl).
    pub cpk: Option<f64>,
    /// (USL − μ) / 3σ_pooled.
    pub cpu: Option<f64>,
    /// (μ − LSL) / 3σ_pooled.
    pub cpl: Option<f64>,
    /// (USL − LSL) / 6σ_overall.
    pub pp: Option<f64>,
    /// min(Ppu, Ppl).
    pub ppk: Option<f64>,
    /// (USL − μ) / 3σ_overall.
    pub ppu: Option<f64>,
    /// (μ − LSL) / 3σ_overall.
    pub ppl: Option<f64>,

    /// Observed parts per million outside the limits.
    pub ppm: f64,
    /// Share of values below LSL.
    pub fraction_below: f64,
    /// Share of values above USL.
    pub fraction_above: f64,
    /// Share of values inside `[LSL, USL]`.
    pub fraction_within: f64,

    /// Shapiro–Wilk W.
    pub normality_w: Option<f64>,
    /// Shapiro–Wilk p-value.
    pub normality_p_value: Option<f64>,
    /// Whether normality is accepted at the engine's significance level.
    pub is_normal: Option<bool>,
}

impl CapabilityResult {
    /// Rating of Cpk.
    pub fn cpk_rating(&self) -> Option<CpkRating> {
        CpkRating::from_cpk(self.cpk)
    }

    /// Between-subgroup shift judged from Cp − Pp.
    pub fn subgroup_consistency(&self) -> Option<SubgroupConsistency> {
        SubgroupConsistency::from_indices(self.cp, self.pp)
    }

    /// Where to reduce variation first.
    pub fn improvement_priority(&self) -> Option<ImprovementPriority> {
        ImprovementPriority::from_indices(self.cp, self.pp)
    }

    /// `fraction_within` as a percentage.
    pub fn percent_within(&self) -> f64 {
        self.fraction_within * 100.0
    }
}

/// Computes capability studies against fixed specification limits.
///
/// The engine holds only immutable parameters, so one instance can serve
/// any number of matrices from any number of threads.
///
/// # Examples
///
/// ```
/// use conc_capability::capability::{CapabilityEngine, SpecificationLimits};
/// use conc_capability::matrix::ConcentrationMatrix;
///
/// let m = ConcentrationMatrix::new(
///     vec!["S1".into(), "S2".into()],
///     vec!["A".into(), "B".into(), "C".into()],
///     vec![
///         vec![Some(0.099), Some(0.101), Some(0.100)],
///         vec![Some(0.102), Some(0.098), Some(0.100)],
///     ],
/// )
/// .unwrap();
///
/// let engine = CapabilityEngine::new(SpecificationLimits::default());
/// let result = engine.compute_full_statistics(&m).unwrap();
/// assert_eq!(result.n_values, 6);
/// assert!(result.cpk.unwrap() <= result.cp.unwrap());
/// assert_eq!(result.ppm, 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapabilityEngine {
    limits: SpecificationLimits,
    normality_alpha: f64,
}

impl Default for CapabilityEngine {
    fn default() -> Self {
        Self::new(SpecificationLimits::default())
    }
}

impl CapabilityEngine {
    /// An engine for `limits`, judging normality at α = 0.05.
    pub fn new(limits: SpecificationLimits) -> Self {
        Self {
            limits,
            normality_alpha: DEFAULT_NORMALITY_ALPHA,
        }
    }

    /// An engine using the limits and significance level of `config`.
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            limits: config.limits,
            normality_alpha: config.normality_alpha,
        }
    }

    /// The limits this engine evaluates against.
    pub fn limits(&self) -> &SpecificationLimits {
        &self.limits
    }

    /// Runs the full study on `matrix`.
    ///
    /// # Errors
    ///
    /// [`CapabilityError::InsufficientData`] if the matrix has no valid
    /// value. Every other degenerate case (single value, zero deviation, no
    /// subgroup with two values) completes with `None` fields or the
    /// documented fallback estimate.
    pub fn compute_full_statistics(
        &self,
        matrix: &ConcentrationMatrix,
    ) -> Result<CapabilityResult, CapabilityError> {
        let values = matrix.valid_values();
        let n_values = values.len();
        let insufficient = || CapabilityError::InsufficientData { valid: n_values };

        let mean = stats::mean(&values).ok_or_else(insufficient)?;
        let median = stats::median(&values).ok_or_else(insufficient)?;
        let min = stats::min(&values).ok_or_else(insufficient)?;
        let max = stats::max(&values).ok_or_else(insufficient)?;
        let q1 = stats::quantile(&values, 0.25).ok_or_else(insufficient)?;
        let q3 = stats::quantile(&values, 0.75).ok_or_else(insufficient)?;
        let variance = stats::variance(&values).unwrap_or(0.0);

        let overall = overall_deviation(matrix);
        let pooled = estimate_pooled_deviation(matrix);

        let cp = potential_capability(&self.limits, pooled.value);
        let pp = potential_capability(&self.limits, overall);
        let cpk = capability_index(&values, &self.limits, pooled.value);
        let ppk = capability_index(&values, &self.limits, overall);
        if cp.is_none() || pp.is_none() {
            log::warn!(
                "deviation is zero (pooled = {}, overall = {overall}); affected indices undefined",
                pooled.value
            );
        }

        let defects = defect_rate(&values, &self.limits).ok_or_else(insufficient)?;
        let normality: Option<ShapiroWilk> = normality::shapiro_wilk(&values);

        log::debug!(
            "n = {n_values}, mean = {mean:.6}, Cp = {cp:?}, Cpk = {:?}, Pp = {pp:?}, Ppk = {:?}, PPM = {:.0}",
            cpk.map(|c| c.index),
            ppk.map(|c| c.index),
            defects.ppm
        );

        Ok(CapabilityResult {
            limits: self.limits,
            n_values,
            n_subgroups: matrix.n_subgroups(),
            n_batches: matrix.n_batches(),
            mean,
            median,
            overall_deviation: overall,
            pooled_deviation: pooled.value,
            pooled_method: pooled.method,
            variance,
            min,
            max,
            range: max - min,
            q1,
            q3,
            iqr: q3 - q1,
            skewness: normality::skewness(&values),
            kurtosis: normality::excess_kurtosis(&values),
            cp,
            cpk: cpk.map(|c| c.index),
            cpu: cpk.map(|c| c.upper),
            cpl: cpk.map(|c| c.lower),
            pp,
            ppk: ppk.map(|c| c.index),
            ppu: ppk.map(|c| c.upper),
            ppl: ppk.map(|c| c.lower),
            ppm: defects.ppm,
            fraction_below: defects.fraction_below,
            fraction_above: defects.fraction_above,
            fraction_within: defects.fraction_within(),
            normality_w: normality.map(|r| r.w),
            normality_p_value: normality.map(|r| r.p_value),
            is_normal: normality.map(|r| r.is_normal(self.normality_alpha)),
        })
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn cpk_never_exceeds_cp(
            cells in proptest::collection::vec(0.05_f64..0.15, 12)
        ) {
            let rows = cells.chunks(4).map(|c| c.iter().map(|&v| Some(v)).collect()).collect();
            let m = ConcentrationMatrix::new(
                vec!["S1".into(), "S2".into(), "S3".into()],
                vec!["A".into(), "B".into(), "C".into(), "D".into()],
                rows,
            ).unwrap();
            let r = CapabilityEngine::default().compute_full_statistics(&m).unwrap();
            if let (Some(cp), Some(cpk)) = (r.cp, r.cpk) {
                prop_assert!(cpk <= cp + 1e-9, "Cpk {cpk} > Cp {cp}");
            }
            if let (Some(pp), Some(ppk)) = (r.pp, r.ppk) {
                prop_assert!(ppk <= pp + 1e-9, "Ppk {ppk} > Pp {pp}");
            }
            prop_assert!((r.fraction_within + r.fraction_below + r.fraction_above - 1.0).abs() < 1e-12);
        }
    }
}
