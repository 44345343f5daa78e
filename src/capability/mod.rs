//! Process capability analysis.
//!
//! Compares the spread of a concentration matrix against a fixed
//! lower/target/upper specification.
//!
//! # Indices
//!
//! - **Cp**, **Cpk**: short-term, from the pooled within-subgroup deviation
//! - **Pp**, **Ppk**: long-term, from the overall deviation
//! - **PPM**: observed parts per million outside the limits
//!
//! [`CapabilityEngine`] runs all of these together with descriptive and
//! normality statistics. [`interpretation`] maps the indices to ratings.
//!
//! # References
//!
//! - Montgomery (2019), *Introduction to Statistical Quality Control*, 8th ed.
//! - AIAG (2005), *Statistical Process Control (SPC) Reference Manual*, 2nd ed.

mod defects;
mod deviation;
mod engine;
mod indices;
pub mod interpretation;
mod limits;

pub use defects::{defect_rate, DefectRate};
pub use deviation::{
    estimate_pooled_deviation, overall_deviation, pooled_deviation, PooledDeviation, PooledMethod,
};
pub use engine::{CapabilityEngine, CapabilityResult};
pub use indices::{capability_index, potential_capability, SidedCapability};
pub use interpretation::{CpkRating, ImprovementPriority, SubgroupConsistency};
pub use limits::SpecificationLimits;
