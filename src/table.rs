//! Tabular text boundary.
//!
//! The laboratory keeps one matrix per sheet: a header line with a corner
//! label followed by column labels, then one line per row label. This
//! module splits such text into labelled string cells without interpreting
//! them; typed parsing happens in [`matrix`](crate::matrix) and
//! [`calibration`](crate::calibration).
//!
//! # Examples
//!
//! ```
//! use conc_capability::table::RawTable;
//!
//! let text = "Subgroup;Lote_A;Lote_B\nS1;0.101;0.099\nS2;0.098;\n";
//! let table = RawTable::parse(text, ';').unwrap();
//! assert_eq!(table.columns(), ["Lote_A", "Lote_B"]);
//! assert_eq!(table.rows().len(), 2);
//! assert_eq!(table.rows()[1].cells[1], "");
//! ```

use std::collections::HashSet;

use crate::error::LoadError;

/// One labelled data row of a [`RawTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// Row label (first field).
    pub label: String,
    /// Remaining fields, trimmed, one per column.
    pub cells: Vec<String>,
}

/// A rectangular table of unparsed, trimmed string cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    corner: String,
    columns: Vec<String>,
    rows: Vec<RawRow>,
}

impl RawTable {
    /// Reads `text` as delimited records: a header and labelled rows.
    ///
    /// Fields may be double-quoted, so a cell can hold the delimiter itself
    /// (`"0.50, 0.52"` under `,`). Blank lines are skipped. Every field is
    /// trimmed.
    ///
    /// # Errors
    ///
    /// - [`LoadError::EmptyTable`] if there is no non-blank line
    /// - [`LoadError::MissingHeader`] if the header has no column labels
    /// - [`LoadError::RaggedRow`] if a row's field count differs from the header's
    /// - [`LoadError::DuplicateLabel`] if a column or row label repeats
    /// - [`LoadError::Csv`] if the text is not valid delimited data
    pub fn parse(text: &str, delimiter: char) -> Result<Self, LoadError> {
        let delimiter =
            u8::try_from(delimiter).map_err(|_| LoadError::Delimiter(delimiter))?;
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let mut records = reader.records().filter(|record| {
            !matches!(record, Ok(r) if r.iter().all(str::is_empty))
        });

        let header = records.next().ok_or(LoadError::EmptyTable)??;
        let mut header_fields = fields(&header);
        if header_fields.len() < 2 {
            return Err(LoadError::MissingHeader);
        }
        let corner = header_fields.remove(0);
        ensure_unique(&header_fields)?;

        let expected = header_fields.len() + 1;
        let mut rows = Vec::new();
        for record in records {
            let record = record?;
            if record.len() != expected {
                return Err(LoadError::RaggedRow {
                    row: record.position().map_or(0, |p| p.line() as usize),
                    expected,
                    found: record.len(),
                });
            }
            let mut cells = fields(&record);
            let label = cells.remove(0);
            rows.push(RawRow { label, cells });
        }

        let labels: Vec<String> = rows.iter().map(|r| r.label.clone()).collect();
        ensure_unique(&labels)?;

        Ok(Self {
            corner,
            columns: header_fields,
            rows,
        })
    }

    /// The header's first field (the label of the row-label column).
    pub fn corner(&self) -> &str {
        &self.corner
    }

    /// Column labels, in header order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Data rows, in text order.
    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    /// Row labels, in text order.
    pub fn row_labels(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.label.clone()).collect()
    }

    /// Position of the column whose label matches `name`, ignoring ASCII case.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
    }
}

fn fields(record: &csv::StringRecord) -> Vec<String> {
    record.iter().map(str::to_string).collect()
}

fn ensure_unique(labels: &[String]) -> Result<(), LoadError> {
    let mut seen = HashSet::with_capacity(labels.len());
    for label in labels {
        if !seen.insert(label.as_str()) {
            return Err(LoadError::DuplicateLabel {
                label: label.clone(),
            });
        }
    }
    Ok(())
}
