//! Per-batch quality summary.
//!
//! Each batch (matrix column) is judged on its coefficient of variation
//! across subgroups. A batch is approved when its CV% is strictly below
//! the configured threshold.

use serde::Serialize;
use u_numflow::stats;

use crate::config::AnalysisConfig;
use crate::matrix::ConcentrationMatrix;

/// Verdict for one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    /// CV% below the threshold.
    Approved,
    /// CV% at or above the threshold.
    Review,
}

/// Statistics of the valid values in one batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    /// Batch label.
    pub batch: String,
    /// Number of valid values.
    pub n: usize,
    /// Mean concentration.
    pub mean: f64,
    /// Population standard deviation (divisor n).
    pub std_dev: f64,
    /// `std_dev / mean × 100`, or 0 when the mean is not positive.
    pub cv_percent: f64,
    /// Approval verdict.
    pub status: BatchStatus,
}

/// Summaries of every batch that has data, with roll-up figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    /// One entry per batch with at least one valid value, in column order.
    pub summaries: Vec<BatchSummary>,
    /// Number of approved batches.
    pub approved: usize,
    /// Percentage of summarized batches that were approved.
    pub efficiency: Option<f64>,
    /// Valid values across all summarized batches.
    pub total_samples: usize,
    /// Mean of the batch means.
    pub mean_of_means: Option<f64>,
    /// Lowest batch mean.
    pub min_mean: Option<f64>,
    /// Highest batch mean.
    pub max_mean: Option<f64>,
}

impl BatchReport {
    /// Summarizes `matrix` against the configured CV threshold.
    ///
    /// # Examples
    ///
    /// ```
    /// use conc_capability::batch::{BatchReport, BatchStatus};
    /// use conc_capability::config::AnalysisConfig;
    /// use conc_capability::matrix::ConcentrationMatrix;
    ///
    /// let m = ConcentrationMatrix::new(
    ///     vec!["S1".into(), "S2".into()],
    ///     vec!["A".into()],
    ///     vec![vec![Some(0.097)], vec![Some(0.103)]],
    /// )
    /// .unwrap();
    ///
    /// let cfg = AnalysisConfig::from_json_str(r#"{"batch_cv_threshold": 2.0}"#).unwrap();
    /// let report = BatchReport::from_config(&m, &cfg);
    /// assert_eq!(report.summaries[0].status, BatchStatus::Review);
    /// ```
    pub fn from_config(matrix: &ConcentrationMatrix, config: &AnalysisConfig) -> Self {
        summarize_batches(matrix, config.batch_cv_threshold)
    }
}

/// Summarizes each batch of `matrix` and approves those whose CV% is
/// below `cv_threshold`.
///
/// Batches without any valid value are left out of the report.
///
/// # Examples
///
/// ```
/// use conc_capability::batch::{summarize_batches, BatchStatus};
/// use conc_capability::matrix::ConcentrationMatrix;
///
/// let m = ConcentrationMatrix::new(
///     vec!["S1".into(), "S2".into()],
///     vec!["A".into(), "B".into()],
///     vec![vec![Some(0.10), Some(0.08)], vec![Some(0.10), Some(0.12)]],
/// )
/// .unwrap();
///
/// let report = summarize_batches(&m, 5.0);
/// assert_eq!(report.summaries[0].status, BatchStatus::Approved);
/// assert_eq!(report.summaries[1].status, BatchStatus::Review);
/// assert_eq!(report.efficiency, Some(50.0));
/// ```
pub fn summarize_batches(matrix: &ConcentrationMatrix, cv_threshold: f64) -> BatchReport {
    let mut summaries = Vec::with_capacity(matrix.n_batches());

    for (col, label) in matrix.batches().iter().enumerate() {
        let values = matrix.batch_values(col);
        let Some(mean) = stats::mean(&values) else {
            log::debug!("batch {label}: no valid values, skipped");
            continue;
        };
        let std_dev = stats::population_std_dev(&values).unwrap_or(0.0);
        let cv_percent = if mean > 0.0 {
            std_dev / mean * 100.0
        } else {
            0.0
        };
        let status = if cv_percent < cv_threshold {
            BatchStatus::Approved
        } else {
            BatchStatus::Review
        };
        log::trace!(
            "batch {label}: n = {}, mean = {mean:.6}, CV = {cv_percent:.2}% → {status:?}",
            values.len()
        );
        summaries.push(BatchSummary {
            batch: label.clone(),
            n: values.len(),
            mean,
            std_dev,
            cv_percent,
            status,
        });
    }

    let approved = summaries
        .iter()
        .filter(|s| s.status == BatchStatus::Approved)
        .count();
    let efficiency =
        (!summaries.is_empty()).then(|| approved as f64 / summaries.len() as f64 * 100.0);
    let means: Vec<f64> = summaries.iter().map(|s| s.mean).collect();

    BatchReport {
        approved,
        efficiency,
        total_samples: summaries.iter().map(|s| s.n).sum(),
        mean_of_means: stats::mean(&means),
        min_mean: stats::min(&means),
        max_mean: stats::max(&means),
        summaries,
    }
}
