//! Process capability indices (Cp, Cpk, Pp, Ppk).
//!
//! The same two formulas serve both families; only the deviation changes.
//! Short-term indices (Cp, Cpk) take the pooled within-subgroup deviation,
//! long-term indices (Pp, Ppk) take the overall deviation.
//!
//! ```text
//! potential  = (USL − LSL) / 6σ
//! upper      = (USL − μ) / 3σ
//! lower      = (μ − LSL) / 3σ
//! actual     = min(upper, lower)
//! ```
//!
//! The potential index ignores centring. The actual index is never larger
//! than the potential one and equals it exactly when μ sits at the midpoint
//! of the tolerance band.
//!
//! # Zero deviation
//!
//! A deviation that is zero, negligible against the tolerance width, or not
//! finite leaves every index undefined (`None`) rather than infinite.
//!
//! # References
//!
//! - Montgomery (2019), *Introduction to Statistical Quality Control*, 8th ed.,
//!   Chapter 8.
//! - Kane (1986), "Process Capability Indices", *Journal of Quality Technology*
//!   18(1), pp. 41--52.

use serde::Serialize;
use u_numflow::stats;

use super::SpecificationLimits;

/// Deviations at or below this fraction of the tolerance width count as zero.
const NEGLIGIBLE_SIGMA_RATIO: f64 = 1e-12;

/// A centring-aware capability index and its one-sided components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SidedCapability {
    /// min(`upper`, `lower`): Cpk or Ppk.
    pub index: f64,
    /// (USL − μ) / 3σ: Cpu or Ppu.
    pub upper: f64,
    /// (μ − LSL) / 3σ: Cpl or Ppl.
    pub lower: f64,
}

fn usable_sigma(limits: &SpecificationLimits, deviation: f64) -> Option<f64> {
    (deviation.is_finite() && deviation > limits.tolerance() * NEGLIGIBLE_SIGMA_RATIO)
        .then_some(deviation)
}

/// Computes the centring-aware index of `values` for the given deviation.
///
/// Pass the pooled deviation for Cpk, the overall deviation for Ppk.
///
/// # Returns
///
/// `None` if `values` is empty or non-finite, or the deviation is not a
/// usable positive number.
///
/// # Examples
///
/// ```
/// use conc_capability::capability::{capability_index, SpecificationLimits};
///
/// let spec = SpecificationLimits::new(200.0, 210.0, 220.0).unwrap();
/// let data = [214.0, 215.0, 216.0];
/// let cpk = capability_index(&data, &spec, 2.0).unwrap();
/// assert!((cpk.upper - 5.0 / 6.0).abs() < 1e-12);
/// assert!((cpk.lower - 2.5).abs() < 1e-12);
/// assert_eq!(cpk.index, cpk.upper);
/// ```
pub fn capability_index(
    values: &[f64],
    limits: &SpecificationLimits,
    deviation: f64,
) -> Option<SidedCapability> {
    let sigma = usable_sigma(limits, deviation)?;
    let mean = stats::mean(values)?;

    let upper = (limits.upper() - mean) / (3.0 * sigma);
    let lower = (mean - limits.lower()) / (3.0 * sigma);
    Some(SidedCapability {
        index: upper.min(lower),
        upper,
        lower,
    })
}

/// Computes the potential index (USL − LSL) / 6σ: Cp for the pooled
/// deviation, Pp for the overall deviation.
///
/// `None` when the deviation is not a usable positive number.
///
/// # Examples
///
/// ```
/// use conc_capability::capability::{potential_capability, SpecificationLimits};
///
/// let spec = SpecificationLimits::default();
/// let cp = potential_capability(&spec, 0.005).unwrap();
/// assert!((cp - 0.04 / 0.03).abs() < 1e-12);
/// assert!(potential_capability(&spec, 0.0).is_none());
/// ```
pub fn potential_capability(limits: &SpecificationLimits, deviation: f64) -> Option<f64> {
    let sigma = usable_sigma(limits, deviation)?;
    Some(limits.tolerance() / (6.0 * sigma))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn actual_never_exceeds_potential(
            data in proptest::collection::vec(0.0_f64..0.2, 1..=40),
            sigma in 1e-4_f64..0.1,
        ) {
            let spec = SpecificationLimits::default();
            let cp = potential_capability(&spec, sigma).unwrap();
            let cpk = capability_index(&data, &spec, sigma).unwrap();
            prop_assert!(cpk.index <= cp + 1e-9, "Cpk {} > Cp {cp}", cpk.index);
            prop_assert!(cpk.index <= cpk.upper && cpk.index <= cpk.lower);
        }

        #[test]
        fn sided_indices_sum_to_twice_potential(
            data in proptest::collection::vec(0.0_f64..0.2, 1..=40),
            sigma in 1e-4_f64..0.1,
        ) {
            // (USL − μ)/3σ + (μ − LSL)/3σ = (USL − LSL)/3σ
            let spec = SpecificationLimits::default();
            let cp = potential_capability(&spec, sigma).unwrap();
            let cpk = capability_index(&data, &spec, sigma).unwrap();
            prop_assert!((cpk.upper + cpk.lower - 2.0 * cp).abs() < 1e-6 * cp.max(1.0));
        }
    }
}
