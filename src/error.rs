//! Error types.
//!
//! Each failure domain has its own enum: capability computation, the
//! calibration fit, the tabular text boundary, single-cell parsing, and
//! configuration. Numeric edge cases that have a defined fallback (zero
//! deviation, degenerate subgroups) are not errors; they surface as `None`
//! or as a documented degraded estimate instead.

use thiserror::Error;

/// Failures of the capability engine and of matrix construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CapabilityError {
    /// The matrix holds no valid measurement at all.
    #[error("insufficient data: {valid} valid measurements, at least 1 required")]
    InsufficientData {
        /// Number of valid (non-missing) values found.
        valid: usize,
    },
    /// The limit triple does not satisfy `lower < target < upper`.
    #[error("invalid specification limits: lower={lower}, target={target}, upper={upper}")]
    InvalidLimits {
        /// Lower specification limit.
        lower: f64,
        /// Target value.
        target: f64,
        /// Upper specification limit.
        upper: f64,
    },
    /// One of the limits is NaN or infinite.
    #[error("specification limits must be finite")]
    NonFiniteLimit,
    /// A matrix row does not have one cell per batch.
    #[error("row {row} has {found} cells, expected {expected}")]
    ShapeMismatch {
        /// Number of batch labels.
        expected: usize,
        /// Number of cells in the offending row.
        found: usize,
        /// Zero-based index of the offending row.
        row: usize,
    },
}

/// Failures of the linear calibration fit.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalibrationError {
    /// Fewer than two calibration standards.
    #[error("calibration needs at least 2 points, found {found}")]
    TooFewPoints {
        /// Number of points supplied.
        found: usize,
    },
    /// Concentration and absorbance columns differ in length.
    #[error("{concentrations} concentrations but {absorbances} absorbances")]
    LengthMismatch {
        /// Length of the concentration column.
        concentrations: usize,
        /// Length of the absorbance column.
        absorbances: usize,
    },
    /// A calibration value is NaN or infinite.
    #[error("calibration data contains non-finite values")]
    NonFinite,
    /// All standards share one concentration, so no line can be fitted.
    #[error("calibration concentrations have zero variance")]
    ConstantConcentration,
    /// The fitted slope is zero; absorbance cannot be inverted.
    #[error("calibration slope is zero, absorbance cannot be inverted")]
    FlatSlope,
}

/// Failure to interpret one absorbance or concentration cell.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CellParseError {
    /// The cell text is not a number.
    #[error("malformed numeric cell {raw:?}")]
    Malformed {
        /// Original cell text.
        raw: String,
    },
    /// The cell parsed to NaN or infinity through a spelling that is not a
    /// recognised missing marker.
    #[error("non-finite numeric cell {raw:?}")]
    NonFinite {
        /// Original cell text.
        raw: String,
    },
}

/// Failures at the tabular text boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    /// The text contains no non-blank line.
    #[error("table is empty")]
    EmptyTable,
    /// The delimiter is not a single-byte character.
    #[error("delimiter {0:?} is not a single-byte character")]
    Delimiter(char),
    /// The delimited reader rejected the text (e.g. invalid UTF-8).
    #[error("unreadable delimited text at line {line:?}: {message}")]
    Csv {
        /// One-based line of the record, when known.
        line: Option<u64>,
        /// Reader diagnostic.
        message: String,
    },
    /// The header line has no column labels after the corner label.
    #[error("table header has no data columns")]
    MissingHeader,
    /// A data row has a different number of fields than the header.
    #[error("row {row} has {found} fields, expected {expected}")]
    RaggedRow {
        /// One-based line number of the offending row.
        row: usize,
        /// Field count of the header.
        expected: usize,
        /// Field count of the row.
        found: usize,
    },
    /// A row or column label appears twice.
    #[error("duplicate label {label:?}")]
    DuplicateLabel {
        /// The repeated label.
        label: String,
    },
    /// A required column is absent.
    #[error("missing column {name:?}")]
    MissingColumn {
        /// Expected column name.
        name: String,
    },
    /// A cell could not be parsed.
    #[error("cell at row {row}, column {column:?}: {source}")]
    BadCell {
        /// Row label of the cell.
        row: String,
        /// Column label of the cell.
        column: String,
        /// Underlying parse failure.
        #[source]
        source: CellParseError,
    },
    /// The calibration table loaded but could not be fitted.
    #[error(transparent)]
    Calibration(#[from] CalibrationError),
    /// The loaded matrix is inconsistent.
    #[error(transparent)]
    Capability(#[from] CapabilityError),
}

impl From<csv::Error> for LoadError {
    fn from(err: csv::Error) -> Self {
        Self::Csv {
            line: err.position().map(csv::Position::line),
            message: err.to_string(),
        }
    }
}

/// Failures while reading an [`AnalysisConfig`](crate::config::AnalysisConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The JSON document is malformed or holds invalid limits.
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
    /// `normality_alpha` is outside `(0, 1)`.
    #[error("normality_alpha must lie in (0, 1), got {0}")]
    Alpha(f64),
    /// `batch_cv_threshold` is negative or non-finite.
    #[error("batch_cv_threshold must be a finite non-negative percentage, got {0}")]
    CvThreshold(f64),
}
