//! Classification of capability results.
//!
//! Turns the numeric indices into the categories a quality engineer acts on.
//! Rendering those categories as text is left to the caller.

use serde::Serialize;

/// Rating of a Cpk (or Ppk) value.
///
/// | Band | Cpk |
/// |------|-----|
/// | `WorldClass` | ≥ 1.67 |
/// | `Adequate` | ≥ 1.33 |
/// | `Marginal` | ≥ 1.00 |
/// | `Inadequate` | ≥ 0.67 |
/// | `Unacceptable` | < 0.67 |
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CpkRating {
    /// Process out of control; immediate containment.
    Unacceptable,
    /// Requires immediate corrective action.
    Inadequate,
    /// Capable on paper, needs improvement.
    Marginal,
    /// Capable.
    Adequate,
    /// Capable with a wide margin.
    WorldClass,
}

impl CpkRating {
    /// Rates a Cpk value; `None` when the index is undefined or NaN.
    ///
    /// # Examples
    ///
    /// ```
    /// use conc_capability::capability::CpkRating;
    ///
    /// assert_eq!(CpkRating::from_cpk(Some(1.5)), Some(CpkRating::Adequate));
    /// assert_eq!(CpkRating::from_cpk(Some(-0.2)), Some(CpkRating::Unacceptable));
    /// assert_eq!(CpkRating::from_cpk(None), None);
    /// ```
    pub fn from_cpk(cpk: Option<f64>) -> Option<Self> {
        let cpk = cpk.filter(|v| !v.is_nan())?;
        Some(if cpk >= 1.67 {
            Self::WorldClass
        } else if cpk >= 1.33 {
            Self::Adequate
        } else if cpk >= 1.00 {
            Self::Marginal
        } else if cpk >= 0.67 {
            Self::Inadequate
        } else {
            Self::Unacceptable
        })
    }

    /// True for `Adequate` and `WorldClass`.
    pub fn is_capable(self) -> bool {
        self >= Self::Adequate
    }
}

/// How much of the total variation comes from shifts between subgroups,
/// judged by the gap Cp − Pp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubgroupConsistency {
    /// Gap ≤ 0.1.
    Consistent,
    /// 0.1 < gap ≤ 0.2.
    ModerateShift,
    /// Gap > 0.2.
    LargeShift,
}

impl SubgroupConsistency {
    /// Classifies the gap between short- and long-term potential capability.
    ///
    /// `None` when either index is undefined.
    pub fn from_indices(cp: Option<f64>, pp: Option<f64>) -> Option<Self> {
        let gap = cp? - pp?;
        if gap.is_nan() {
            return None;
        }
        Some(if gap > 0.2 {
            Self::LargeShift
        } else if gap > 0.1 {
            Self::ModerateShift
        } else {
            Self::Consistent
        })
    }
}

/// Where improvement effort pays off first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImprovementPriority {
    /// Reduce drift between subgroups (Cp > Pp).
    BetweenSubgroups,
    /// Reduce spread inside subgroups (Cp ≤ Pp).
    WithinSubgroups,
}

impl ImprovementPriority {
    /// `None` when either index is undefined.
    pub fn from_indices(cp: Option<f64>, pp: Option<f64>) -> Option<Self> {
        let (cp, pp) = (cp?, pp?);
        Some(if cp > pp {
            Self::BetweenSubgroups
        } else {
            Self::WithinSubgroups
        })
    }
}
