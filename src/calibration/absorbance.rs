//! Sample absorbance sheet and its conversion to concentrations.

use crate::error::{CapabilityError, CellParseError, LoadError};
use crate::matrix::{parse_numeric_cell, ConcentrationMatrix};
use crate::table::RawTable;

use super::CalibrationCurve;

/// One cell of the absorbance sheet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AbsorbanceCell {
    /// A finite absorbance reading.
    Value(f64),
    /// No reading for this subgroup/batch pair.
    Missing,
}

impl AbsorbanceCell {
    /// Parses a sheet cell.
    ///
    /// A cell may hold several comma-separated replicate readings; only the
    /// first is used. Blank, `nan`, `na` and `n/a` cells are missing.
    ///
    /// # Errors
    ///
    /// [`CellParseError`] when the (first) reading is not a finite number.
    ///
    /// # Examples
    ///
    /// ```
    /// use conc_capability::calibration::AbsorbanceCell;
    ///
    /// assert_eq!(AbsorbanceCell::parse("0.512"), Ok(AbsorbanceCell::Value(0.512)));
    /// assert_eq!(AbsorbanceCell::parse("0.51, 0.53"), Ok(AbsorbanceCell::Value(0.51)));
    /// assert_eq!(AbsorbanceCell::parse(""), Ok(AbsorbanceCell::Missing));
    /// assert!(AbsorbanceCell::parse("high").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, CellParseError> {
        let first = raw.split(',').next().unwrap_or("");
        let parsed = parse_numeric_cell(first).map_err(|err| match err {
            CellParseError::Malformed { .. } => CellParseError::Malformed {
                raw: raw.to_string(),
            },
            CellParseError::NonFinite { .. } => CellParseError::NonFinite {
                raw: raw.to_string(),
            },
        })?;
        Ok(parsed.map_or(Self::Missing, Self::Value))
    }

    /// The reading, if present.
    pub fn value(self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(v),
            Self::Missing => None,
        }
    }
}

/// Sample absorbances indexed by subgroup (row) and batch (column).
#[derive(Debug, Clone, PartialEq)]
pub struct AbsorbanceMatrix {
    subgroups: Vec<String>,
    batches: Vec<String>,
    rows: Vec<Vec<AbsorbanceCell>>,
}

impl AbsorbanceMatrix {
    /// Builds the matrix from one row of cells per subgroup.
    ///
    /// # Errors
    ///
    /// [`CapabilityError::ShapeMismatch`] if the row count or any row length
    /// disagrees with the labels.
    pub fn new(
        subgroups: Vec<String>,
        batches: Vec<String>,
        rows: Vec<Vec<AbsorbanceCell>>,
    ) -> Result<Self, CapabilityError> {
        if rows.len() != subgroups.len() {
            return Err(CapabilityError::ShapeMismatch {
                expected: subgroups.len(),
                found: rows.len(),
                row: rows.len().min(subgroups.len()),
            });
        }
        if let Some((row, cells)) = rows
            .iter()
            .enumerate()
            .find(|(_, cells)| cells.len() != batches.len())
        {
            return Err(CapabilityError::ShapeMismatch {
                expected: batches.len(),
                found: cells.len(),
                row,
            });
        }
        Ok(Self {
            subgroups,
            batches,
            rows,
        })
    }

    /// Parses a sample sheet: subgroup labels in the first column, batch
    /// labels in the header.
    ///
    /// # Errors
    ///
    /// [`LoadError::BadCell`] naming the first cell that fails to parse.
    pub fn from_table(table: &RawTable) -> Result<Self, LoadError> {
        let batches = table.columns().to_vec();
        let rows = table
            .rows()
            .iter()
            .map(|raw| {
                raw.cells
                    .iter()
                    .zip(&batches)
                    .map(|(cell, batch)| {
                        AbsorbanceCell::parse(cell).map_err(|source| LoadError::BadCell {
                            row: raw.label.clone(),
                            column: batch.clone(),
                            source,
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
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

    /// The cell at (`row`, `col`), or `None` when out of range.
    pub fn cell(&self, row: usize, col: usize) -> Option<AbsorbanceCell> {
        self.rows.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Converts every reading through `curve`, keeping labels and shape.
    /// Missing readings stay missing.
    pub fn to_concentrations(&self, curve: &CalibrationCurve) -> ConcentrationMatrix {
        let rows: Vec<Vec<Option<f64>>> = self
            .rows
            .iter()
            .map(|cells| {
                cells
                    .iter()
                    .map(|cell| cell.value().map(|a| curve.concentration(a)))
                    .collect()
            })
            .collect();
        log::trace!(
            "converted {}x{} absorbance matrix",
            self.subgroups.len(),
            self.batches.len()
        );
        ConcentrationMatrix::from_validated_rows(self.subgroups.clone(), self.batches.clone(), rows)
    }
}
