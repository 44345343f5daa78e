//! Absorbance-to-concentration conversion.
//!
//! The first stage of the laboratory workflow: fit a straight calibration
//! line through standards of known concentration, then invert it for every
//! sample absorbance in a subgroup × batch sheet.
//!
//! # Model
//!
//! Beer–Lambert behaviour over the working range is assumed, so absorbance
//! is linear in concentration:
//!
//! ```text
//! A = slope · C + intercept      C = (A - intercept) / slope
//! ```
//!
//! # Examples
//!
//! ```
//! use conc_capability::calibration::{AbsorbanceCell, AbsorbanceMatrix, CalibrationCurve};
//!
//! let curve = CalibrationCurve::fit(&[0.05, 0.10, 0.15], &[0.25, 0.50, 0.75]).unwrap();
//! let samples = AbsorbanceMatrix::new(
//!     vec!["S1".into()],
//!     vec!["Lote_A".into(), "Lote_B".into()],
//!     vec![vec![AbsorbanceCell::Value(0.5), AbsorbanceCell::Missing]],
//! )
//! .unwrap();
//! let conc = samples.to_concentrations(&curve);
//! assert!((conc.get(0, 0).unwrap() - 0.10).abs() < 1e-12);
//! assert_eq!(conc.get(0, 1), None);
//! ```

mod absorbance;
mod curve;

pub use absorbance::{AbsorbanceCell, AbsorbanceMatrix};
pub use curve::CalibrationCurve;
