//! Least-squares calibration line.

use serde::Serialize;
use u_numflow::stats;

use crate::error::{CalibrationError, LoadError};
use crate::matrix::parse_numeric_cell;
use crate::table::RawTable;

/// Accepted header spellings for the concentration column.
const CONCENTRATION_HEADERS: [&str; 2] = ["concentration", "concentracion"];
/// Accepted header spellings for the absorbance column.
const ABSORBANCE_HEADERS: [&str; 2] = ["absorbance", "absorbancia"];

/// A fitted calibration line `A = slope · C + intercept`.
///
/// # Invariants
///
/// - `slope` is finite and non-zero, so the line can be inverted
/// - `n >= 2`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalibrationCurve {
    /// Absorbance per unit concentration.
    pub slope: f64,
    /// Absorbance at zero concentration.
    pub intercept: f64,
    /// Coefficient of determination of the fit.
    pub r_squared: f64,
    /// Number of standards used.
    pub n: usize,
}

impl CalibrationCurve {
    /// Fits the calibration line by ordinary least squares.
    ///
    /// # Algorithm
    ///
    /// slope = cov(C, A) / var(C), intercept = Ā − slope · C̄,
    /// R² = 1 − SS_res / SS_tot (1.0 when every absorbance is equal).
    ///
    /// # Errors
    ///
    /// - [`CalibrationError::LengthMismatch`] if the columns differ in length
    /// - [`CalibrationError::TooFewPoints`] for fewer than 2 standards
    /// - [`CalibrationError::NonFinite`] for NaN or infinite input
    /// - [`CalibrationError::ConstantConcentration`] if every concentration is equal
    /// - [`CalibrationError::FlatSlope`] if the fitted slope is zero
    ///
    /// # Examples
    ///
    /// ```
    /// use conc_capability::calibration::CalibrationCurve;
    ///
    /// let c = [0.02, 0.04, 0.06, 0.08, 0.10];
    /// let a = [0.11, 0.21, 0.31, 0.41, 0.51];
    /// let curve = CalibrationCurve::fit(&c, &a).unwrap();
    /// assert!((curve.slope - 5.0).abs() < 1e-9);
    /// assert!((curve.intercept - 0.01).abs() < 1e-9);
    /// assert!((curve.r_squared - 1.0).abs() < 1e-12);
    /// ```
    pub fn fit(concentrations: &[f64], absorbances: &[f64]) -> Result<Self, CalibrationError> {
        let n = concentrations.len();
        if n != absorbances.len() {
            return Err(CalibrationError::LengthMismatch {
                concentrations: n,
                absorbances: absorbances.len(),
            });
        }
        if n < 2 {
            return Err(CalibrationError::TooFewPoints { found: n });
        }
        if concentrations
            .iter()
            .chain(absorbances)
            .any(|v| !v.is_finite())
        {
            return Err(CalibrationError::NonFinite);
        }

        let c_mean = stats::mean(concentrations).ok_or(CalibrationError::NonFinite)?;
        let a_mean = stats::mean(absorbances).ok_or(CalibrationError::NonFinite)?;
        let c_var = stats::variance(concentrations).ok_or(CalibrationError::NonFinite)?;
        let a_var = stats::variance(absorbances).ok_or(CalibrationError::NonFinite)?;
        let cov = stats::covariance(concentrations, absorbances).ok_or(CalibrationError::NonFinite)?;

        if c_var < 1e-300 {
            return Err(CalibrationError::ConstantConcentration);
        }

        let slope = cov / c_var;
        if a_var < 1e-300 || slope == 0.0 || !slope.is_finite() {
            return Err(CalibrationError::FlatSlope);
        }
        let intercept = a_mean - slope * c_mean;

        let ss_res: f64 = concentrations
            .iter()
            .zip(absorbances)
            .map(|(&c, &a)| (a - (slope * c + intercept)).powi(2))
            .sum();
        let ss_tot: f64 = absorbances.iter().map(|&a| (a - a_mean).powi(2)).sum();
        // a_var > 0 above, so ss_tot > 0
        let r_squared = 1.0 - ss_res / ss_tot;

        log::debug!("calibration A = {slope:.6}C + {intercept:.6}, R² = {r_squared:.6}, n = {n}");

        Ok(Self {
            slope,
            intercept,
            r_squared,
            n,
        })
    }

    /// Reads the standards from a sheet with `concentration` and
    /// `absorbance` columns (case-insensitive, Spanish spellings accepted)
    /// and fits the line.
    ///
    /// Rows where either value is missing are skipped.
    ///
    /// # Errors
    ///
    /// [`LoadError::MissingColumn`] when a column is absent,
    /// [`LoadError::BadCell`] for a malformed value, and
    /// [`LoadError::Calibration`] when the fit itself fails.
    pub fn from_table(table: &RawTable) -> Result<Self, LoadError> {
        let c_col = find_column(table, &CONCENTRATION_HEADERS)?;
        let a_col = find_column(table, &ABSORBANCE_HEADERS)?;

        let mut concentrations = Vec::with_capacity(table.rows().len());
        let mut absorbances = Vec::with_capacity(table.rows().len());
        for row in table.rows() {
            let read = |col: usize| {
                parse_numeric_cell(&row.cells[col]).map_err(|source| LoadError::BadCell {
                    row: row.label.clone(),
                    column: table.columns()[col].clone(),
                    source,
                })
            };
            match (read(c_col)?, read(a_col)?) {
                (Some(c), Some(a)) => {
                    concentrations.push(c);
                    absorbances.push(a);
                }
                _ => log::warn!("calibration row {:?} is incomplete, skipped", row.label),
            }
        }

        Ok(Self::fit(&concentrations, &absorbances)?)
    }

    /// Concentration that produces `absorbance` on this line.
    pub fn concentration(&self, absorbance: f64) -> f64 {
        (absorbance - self.intercept) / self.slope
    }

    /// Predicted absorbance at `concentration`.
    pub fn absorbance(&self, concentration: f64) -> f64 {
        self.slope * concentration + self.intercept
    }
}

fn find_column(table: &RawTable, names: &[&str]) -> Result<usize, LoadError> {
    names
        .iter()
        .find_map(|name| table.column_index(name))
        .ok_or_else(|| LoadError::MissingColumn {
            name: names[0].to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Fit
    // -----------------------------------------------------------------------

    #[test]
    fn exact_line_is_recovered() {
        let c = [0.0, 0.05, 0.10, 0.15, 0.20];
        let a: Vec<f64> = c.iter().map(|&x| 4.2 * x + 0.03).collect();
        let curve = CalibrationCurve::fit(&c, &a).unwrap();
        assert!((curve.slope - 4.2).abs() < 1e-10);
        assert!((curve.intercept - 0.03).abs() < 1e-10);
        assert!((curve.r_squared - 1.0).abs() < 1e-12);
        assert_eq!(curve.n, 5);
    }

    #[test]
    fn two_points_are_enough() {
        let curve = CalibrationCurve::fit(&[0.0, 1.0], &[0.1, 2.1]).unwrap();
        assert!((curve.slope - 2.0).abs() < 1e-12);
        assert!((curve.intercept - 0.1).abs() < 1e-12);
    }

    #[test]
    fn noisy_fit_matches_closed_form() {
        let x = [0.0, 1.0, 2.0, 3.0, 4.0];
        let y = [0.1, 2.0, 4.1, 6.0, 8.3];
        let curve = CalibrationCurve::fit(&x, &y).unwrap();

        let x_mean = 2.0;
        let y_mean = y.iter().sum::<f64>() / 5.0;
        let sxy: f64 = x.iter().zip(&y).map(|(a, b)| (a - x_mean) * (b - y_mean)).sum();
        let sxx: f64 = x.iter().map(|a| (a - x_mean).powi(2)).sum();
        let slope = sxy / sxx;
        let intercept = y_mean - slope * x_mean;

        assert!((curve.slope - slope).abs() < 1e-10);
        assert!((curve.intercept - intercept).abs() < 1e-10);
        assert!(curve.r_squared > 0.99 && curve.r_squared < 1.0);
    }

    #[test]
    fn inversion_round_trips_through_the_line() {
        let curve = CalibrationCurve::fit(&[0.05, 0.10, 0.15], &[0.26, 0.51, 0.74]).unwrap();
        let c = 0.0937;
        assert!((curve.concentration(curve.absorbance(c)) - c).abs() < 1e-12);
    }

    #[test]
    fn weak_but_nonzero_slope_has_finite_r_squared() {
        let c = [0.05, 0.10, 0.15, 0.20];
        let a = [0.300, 0.302, 0.299, 0.303];
        let curve = CalibrationCurve::fit(&c, &a).unwrap();
        assert!(curve.r_squared.is_finite());
        assert!((0.0..1.0).contains(&curve.r_squared), "R² = {}", curve.r_squared);
    }

    #[test]
    fn constant_absorbance_gives_flat_slope() {
        let err = CalibrationCurve::fit(&[0.1, 0.2, 0.3], &[0.5, 0.5, 0.5]).unwrap_err();
        assert_eq!(err, CalibrationError::FlatSlope);
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(
            CalibrationCurve::fit(&[0.1], &[0.5]),
            Err(CalibrationError::TooFewPoints { found: 1 })
        );
        assert_eq!(
            CalibrationCurve::fit(&[0.1, 0.2], &[0.5]),
            Err(CalibrationError::LengthMismatch {
                concentrations: 2,
                absorbances: 1
            })
        );
        assert_eq!(
            CalibrationCurve::fit(&[0.1, f64::NAN], &[0.5, 0.6]),
            Err(CalibrationError::NonFinite)
        );
        assert_eq!(
            CalibrationCurve::fit(&[0.1, 0.1, 0.1], &[0.5, 0.6, 0.7]),
            Err(CalibrationError::ConstantConcentration)
        );
    }

    // -----------------------------------------------------------------------
    // Table input
    // -----------------------------------------------------------------------

    #[test]
    fn from_table_accepts_spanish_headers() {
        let table = RawTable::parse(
            "Patron;Concentracion;Absorbancia\nP1;0.05;0.25\nP2;0.10;0.50\nP3;0.15;0.75\n",
            ';',
        )
        .unwrap();
        let curve = CalibrationCurve::from_table(&table).unwrap();
        assert!((curve.slope - 5.0).abs() < 1e-10);
        assert!(curve.intercept.abs() < 1e-10);
    }

    #[test]
    fn from_table_skips_incomplete_rows() {
        let table = RawTable::parse(
            "id;absorbance;concentration\na;0.2;0.1\nb;;0.2\nc;0.6;0.3\n",
            ';',
        )
        .unwrap();
        let curve = CalibrationCurve::from_table(&table).unwrap();
        assert_eq!(curve.n, 2);
        assert!((curve.slope - 2.0).abs() < 1e-10);
    }

    #[test]
    fn from_table_requires_both_columns() {
        let table = RawTable::parse("id;concentration\na;0.1\n", ';').unwrap();
        assert_eq!(
            CalibrationCurve::from_table(&table),
            Err(LoadError::MissingColumn {
                name: "absorbance".into()
            })
        );
    }

    #[test]
    fn from_table_surfaces_fit_failure() {
        let table = RawTable::parse("id;concentration;absorbance\na;0.1;0.2\n", ';').unwrap();
        assert_eq!(
            CalibrationCurve::from_table(&table),
            Err(LoadError::Calibration(CalibrationError::TooFewPoints {
                found: 1
            }))
        );
    }
}
