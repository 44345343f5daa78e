//! Specification limits.

use serde::{Deserialize, Serialize};

use crate::error::CapabilityError;

/// Lower limit, target and upper limit of the measured characteristic.
///
/// # Invariants
///
/// - All three values are finite
/// - `lower < target < upper`
///
/// # Examples
///
/// ```
/// use conc_capability::capability::SpecificationLimits;
///
/// let spec = SpecificationLimits::default();
/// assert_eq!((spec.lower(), spec.target(), spec.upper()), (0.08, 0.10, 0.12));
///
/// assert!(SpecificationLimits::new(0.12, 0.10, 0.08).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLimits", into = "RawLimits")]
pub struct SpecificationLimits {
    lower: f64,
    target: f64,
    upper: f64,
}

/// Unchecked wire form of [`SpecificationLimits`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawLimits {
    lower: f64,
    target: f64,
    upper: f64,
}

impl SpecificationLimits {
    /// Validates and builds a limit triple.
    ///
    /// # Errors
    ///
    /// - [`CapabilityError::NonFiniteLimit`] if any value is NaN or infinite
    /// - [`CapabilityError::InvalidLimits`] unless `lower < target < upper`
    pub fn new(lower: f64, target: f64, upper: f64) -> Result<Self, CapabilityError> {
        if !(lower.is_finite() && target.is_finite() && upper.is_finite()) {
            return Err(CapabilityError::NonFiniteLimit);
        }
        if !(lower < target && target < upper) {
            return Err(CapabilityError::InvalidLimits {
                lower,
                target,
                upper,
            });
        }
        Ok(Self {
            lower,
            target,
            upper,
        })
    }

    /// Lower specification limit (LSL).
    pub fn lower(&self) -> f64 {
        self.lower
    }

    /// Nominal target value.
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Upper specification limit (USL).
    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// Width of the tolerance band, USL − LSL.
    pub fn tolerance(&self) -> f64 {
        self.upper - self.lower
    }

    /// Centre of the tolerance band, (LSL + USL) / 2.
    ///
    /// Cp and Cpk coincide exactly when the process mean sits here, which
    /// need not be the nominal target.
    pub fn midpoint(&self) -> f64 {
        (self.lower + self.upper) / 2.0
    }

    /// True when `value` lies inside `[lower, upper]`.
    pub fn contains(&self, value: f64) -> bool {
        (self.lower..=self.upper).contains(&value)
    }
}

impl Default for SpecificationLimits {
    /// The laboratory's concentration requirement: 0.08 – 0.10 – 0.12.
    fn default() -> Self {
        Self {
            lower: 0.08,
            target: 0.10,
            upper: 0.12,
        }
    }
}

impl TryFrom<RawLimits> for SpecificationLimits {
    type Error = CapabilityError;

    fn try_from(raw: RawLimits) -> Result<Self, Self::Error> {
        Self::new(raw.lower, raw.target, raw.upper)
    }
}

impl From<SpecificationLimits> for RawLimits {
    fn from(limits: SpecificationLimits) -> Self {
        Self {
            lower: limits.lower,
            target: limits.target,
            upper: limits.upper,
        }
    }
}
