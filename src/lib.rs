//! # conc-capability
//!
//! Process capability analysis for a laboratory concentration process:
//! absorbance readings are converted to concentrations through a linear
//! calibration curve, then the subgroup × batch matrix is evaluated for
//! short- and long-term capability.
//!
//! ## Modules
//!
//! - [`table`]: delimited tables with a label column and a header row
//! - [`calibration`]: least-squares calibration curve and absorbance conversion
//! - [`matrix`]: subgroup × batch concentration matrix with missing cells
//! - [`capability`]: pooled/overall deviation, Cp, Cpk, Pp, Ppk, PPM
//! - [`normality`]: skewness, kurtosis, Shapiro–Wilk
//! - [`batch`]: per-batch CV and approval
//! - [`config`]: JSON analysis configuration
//! - [`error`]: error types
//!
//! ## Design Philosophy
//!
//! - **Pure computation**: no I/O, plotting or report rendering
//! - **Numerical stability**: Leverages `u-numflow` for stable statistics
//! - **Explicit sentinels**: undefined indices are `None`, never infinite

pub mod batch;
pub mod calibration;
pub mod capability;
pub mod config;
pub mod error;
pub mod matrix;
pub mod normality;
pub mod table;
