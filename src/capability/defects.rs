//! Observed out-of-specification rate.
//!
//! Defect fractions are counted directly from the data; no distribution is
//! fitted to the tails. A value exactly on a limit is inside the
//! specification.

use serde::Serialize;

use super::SpecificationLimits;

/// Observed defect fractions and the equivalent parts-per-million.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DefectRate {
    /// (fraction_below + fraction_above) × 1,000,000.
    pub ppm: f64,
    /// Share of values strictly below the lower limit.
    pub fraction_below: f64,
    /// Share of values strictly above the upper limit.
    pub fraction_above: f64,
}

impl DefectRate {
    /// Share of values inside `[lower, upper]`.
    pub fn fraction_within(&self) -> f64 {
        1.0 - (self.fraction_below + self.fraction_above)
    }
}

/// Counts the values of `values` outside `limits`.
///
/// `None` for an empty slice.
///
/// # Examples
///
/// ```
/// use conc_capability::capability::{defect_rate, SpecificationLimits};
///
/// let spec = SpecificationLimits::default();
/// let rate = defect_rate(&[0.07, 0.10, 0.10, 0.13], &spec).unwrap();
/// assert_eq!(rate.fraction_below, 0.25);
/// assert_eq!(rate.fraction_above, 0.25);
/// assert_eq!(rate.ppm, 500_000.0);
/// assert_eq!(rate.fraction_within(), 0.5);
/// ```
pub fn defect_rate(values: &[f64], limits: &SpecificationLimits) -> Option<DefectRate> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let below = values.iter().filter(|&&v| v < limits.lower()).count() as f64;
    let above = values.iter().filter(|&&v| v > limits.upper()).count() as f64;

    let fraction_below = below / n;
    let fraction_above = above / n;
    Some(DefectRate {
        ppm: (fraction_below + fraction_above) * 1_000_000.0,
        fraction_below,
        fraction_above,
    })
}
