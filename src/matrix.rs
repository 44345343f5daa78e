//! Subgroup × batch concentration matrix.
//!
//! Rows are subgroups (measurements taken together under presumed
//! homogeneous conditions), columns are batches (production lots). A cell
//! is either a finite measurement or missing.
//!
//! # Examples
//!
//! ```
//! use conc_capability::matrix::ConcentrationMatrix;
//!
//! let m = ConcentrationMatrix::new(
//!     vec!["S1".into(), "S2".into()],
//!     vec!["Lote_A".into(), "Lote_B".into()],
//!     vec![vec![Some(0.10), Some(0.11)], vec![None, Some(0.09)]],
//! )
//! .unwrap();
//! assert_eq!(m.valid_count(), 3);
//! assert_eq!(m.valid_values(), vec![0.10, 0.11, 0.09]);
//! ```

use u_numflow::stats;

use crate::error::{CapabilityError, CellParseError, LoadError};
use crate::table::RawTable;

/// Measured concentrations indexed by subgroup (row) and batch (column).
///
/// # Invariants
///
/// - `cells.len() == subgroups.len() * batches.len()` (row-major)
/// - Every present cell is finite
#[derive(Debug, Clone, PartialEq)]
pub struct ConcentrationMatrix {
    subgroups: Vec<String>,
    batches: Vec<String>,
    cells: Vec<Option<f64>>,
}

impl ConcentrationMatrix {
    /// Builds a matrix from one row of cells per subgroup.
    ///
    /// Non-finite cell values are stored as missing.
    ///
    /// # Errors
    ///
    /// [`CapabilityError::ShapeMismatch`] if the number of rows differs from
    /// the number of subgroup labels, or a row does not hold exactly one cell
    /// per batch label.
    pub fn new(
        subgroups: Vec<String>,
        batches: Vec<String>,
        rows: Vec<Vec<Option<f64>>>,
    ) -> Result<Self, CapabilityError> {
        if rows.len() != subgroups.len() {
            return Err(CapabilityError::ShapeMismatch {
                expected: subgroups.len(),
                found: rows.len(),
                row: rows.len().min(subgroups.len()),
            });
        }

        let mut cells = Vec::with_capacity(subgroups.len() * batches.len());
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != batches.len() {
                return Err(CapabilityError::ShapeMismatch {
                    expected: batches.len(),
                    found: row.len(),
                    row: i,
                });
            }
            cells.extend(row.into_iter().map(|c| c.filter(|v| v.is_finite())));
        }

        Ok(Self {
            subgroups,
            batches,
            cells,
        })
    }

    /// Builds a matrix from rows whose shape the caller has already checked.
    pub(crate) fn from_validated_rows(
        subgroups: Vec<String>,
        batches: Vec<String>,
        rows: Vec<Vec<Option<f64>>>,
    ) -> Self {
        debug_assert_eq!(rows.len(), subgroups.len());
        let cells = rows
            .into_iter()
            .flatten()
            .map(|c| c.filter(|v| v.is_finite()))
            .collect();
        Self {
            subgroups,
            batches,
            cells,
        }
    }

    /// Parses a concentration sheet: subgroup labels in the first column,
    /// batch labels in the header.
    ///
    /// Blank, `nan`, `na` and `n/a` cells are missing.
    ///
    /// # Errors
    ///
    /// [`LoadError::BadCell`] for any other non-numeric cell.
    pub fn from_table(table: &RawTable) -> Result<Self, LoadError> {
        let batches = table.columns().to_vec();
        let mut rows = Vec::with_capacity(table.rows().len());
        for raw in table.rows() {
            let row = raw
                .cells
                .iter()
                .zip(&batches)
                .map(|(cell, batch)| {
                    parse_numeric_cell(cell).map_err(|source| LoadError::BadCell {
                        row: raw.label.clone(),
                        column: batch.clone(),
                        source,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(row);
        }
        Ok(Self::new(table.row_labels(), batches, rows)?)
    }

    /// Subgroup labels, in row order.
    pub fn subgroups(&self) -> &[String] {
        &self.subgroups
    }

    /// Batch labels, in column order.
    pub fn batches(&self) -> &[String] {
        &self.batches
    }

    /// Number of rows.
    pub fn n_subgroups(&self) -> usize {
        self.subgroups.len()
    }

    /// Number of columns.
    pub fn n_batches(&self) -> usize {
        self.batches.len()
    }

    /// The cell at (`row`, `col`); `None` if missing or out of range.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.n_subgroups() || col >= self.n_batches() {
            return None;
        }
        self.cells[row * self.n_batches() + col]
    }

    /// Valid values of one subgroup, in batch order.
    pub fn subgroup_values(&self, row: usize) -> Vec<f64> {
        (0..self.n_batches())
            .filter_map(|col| self.get(row, col))
            .collect()
    }

    /// Valid values of one batch, in subgroup order.
    pub fn batch_values(&self, col: usize) -> Vec<f64> {
        (0..self.n_subgroups())
            .filter_map(|row| self.get(row, col))
            .collect()
    }

    /// All valid values, row by row.
    pub fn valid_values(&self) -> Vec<f64> {
        self.cells.iter().flatten().copied().collect()
    }

    /// Number of non-missing cells.
    pub fn valid_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Mean of each subgroup's valid values; `None` for an all-missing row.
    ///
    /// These are the points of the subgroup-means control chart.
    pub fn subgroup_means(&self) -> Vec<Option<f64>> {
        (0..self.n_subgroups())
            .map(|row| stats::mean(&self.subgroup_values(row)))
            .collect()
    }
}

/// Markers that denote "no measurement" in a sheet cell.
const MISSING_MARKERS: [&str; 4] = ["", "nan", "na", "n/a"];

/// Parses one numeric sheet cell; `Ok(None)` for a missing marker.
pub(crate) fn parse_numeric_cell(raw: &str) -> Result<Option<f64>, CellParseError> {
    let text = raw.trim();
    if MISSING_MARKERS.iter().any(|m| text.eq_ignore_ascii_case(m)) {
        return Ok(None);
    }
    let value: f64 = text.parse().map_err(|_| CellParseError::Malformed {
        raw: raw.to_string(),
    })?;
    if !value.is_finite() {
        return Err(CellParseError::NonFinite {
            raw: raw.to_string(),
        });
    }
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(prefix: &str, n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("{prefix}{i}")).collect()
    }

    fn sample() -> ConcentrationMatrix {
        ConcentrationMatrix::new(
            labels("S", 3),
            labels("L", 2),
            vec![
                vec![Some(1.0), Some(2.0)],
                vec![None, Some(4.0)],
                vec![None, None],
            ],
        )
        .unwrap()
    }

    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    #[test]
    fn rejects_wrong_row_count() {
        let err = ConcentrationMatrix::new(labels("S", 2), labels("L", 1), vec![vec![Some(1.0)]])
            .unwrap_err();
        assert!(matches!(
            err,
            CapabilityError::ShapeMismatch {
                expected: 2,
                found: 1,
                ..
            }
        ));
    }

    #[test]
    fn rejects_ragged_row() {
        let err = ConcentrationMatrix::new(
            labels("S", 2),
            labels("L", 2),
            vec![vec![Some(1.0), Some(2.0)], vec![Some(3.0)]],
        )
        .unwrap_err();
        assert_eq!(
            err,
            CapabilityError::ShapeMismatch {
                expected: 2,
                found: 1,
                row: 1
            }
        );
    }

    #[test]
    fn non_finite_cells_become_missing() {
        let m = ConcentrationMatrix::new(
            labels("S", 1),
            labels("L", 3),
            vec![vec![Some(f64::NAN), Some(f64::INFINITY), Some(0.1)]],
        )
        .unwrap();
        assert_eq!(m.valid_count(), 1);
        assert_eq!(m.get(0, 0), None);
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    #[test]
    fn row_and_column_views() {
        let m = sample();
        assert_eq!(m.n_subgroups(), 3);
        assert_eq!(m.n_batches(), 2);
        assert_eq!(m.subgroup_values(0), vec![1.0, 2.0]);
        assert_eq!(m.subgroup_values(2), Vec::<f64>::new());
        assert_eq!(m.batch_values(1), vec![2.0, 4.0]);
        assert_eq!(m.valid_values(), vec![1.0, 2.0, 4.0]);
        assert_eq!(m.valid_count(), 3);
        assert_eq!(m.get(5, 0), None);
    }

    #[test]
    fn subgroup_means_skip_missing() {
        let means = sample().subgroup_means();
        assert_eq!(means.len(), 3);
        assert!((means[0].unwrap() - 1.5).abs() < 1e-12);
        assert!((means[1].unwrap() - 4.0).abs() < 1e-12);
        assert!(means[2].is_none());
    }

    // -----------------------------------------------------------------------
    // Parsing
    // -----------------------------------------------------------------------

    #[test]
    fn parse_cell_variants() {
        assert_eq!(parse_numeric_cell("0.105"), Ok(Some(0.105)));
        assert_eq!(parse_numeric_cell("  -1e-3 "), Ok(Some(-0.001)));
        assert_eq!(parse_numeric_cell(""), Ok(None));
        assert_eq!(parse_numeric_cell("NaN"), Ok(None));
        assert_eq!(parse_numeric_cell("N/A"), Ok(None));
        assert!(matches!(
            parse_numeric_cell("abc"),
            Err(CellParseError::Malformed { .. })
        ));
        assert!(matches!(
            parse_numeric_cell("inf"),
            Err(CellParseError::NonFinite { .. })
        ));
    }

    #[test]
    fn from_table_keeps_labels_and_gaps() {
        let table = RawTable::parse(
            "Subgroup;Lote_A;Lote_B\nS1;0.10;0.11\nS2;;0.09\n",
            ';',
        )
        .unwrap();
        let m = ConcentrationMatrix::from_table(&table).unwrap();
        assert_eq!(m.subgroups(), ["S1", "S2"]);
        assert_eq!(m.batches(), ["Lote_A", "Lote_B"]);
        assert_eq!(m.get(1, 0), None);
        assert_eq!(m.get(1, 1), Some(0.09));
    }

    #[test]
    fn from_table_reports_bad_cell_location() {
        let table = RawTable::parse("Subgroup;Lote_A\nS1;x\n", ';').unwrap();
        let err = ConcentrationMatrix::from_table(&table).unwrap_err();
        match err {
            LoadError::BadCell { row, column, .. } => {
                assert_eq!(row, "S1");
                assert_eq!(column, "Lote_A");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
