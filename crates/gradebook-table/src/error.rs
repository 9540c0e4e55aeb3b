//! Error types for grade tables
//!
//! Every fallible gradebook operation returns [`GradeError`]. Each variant
//! maps to one of three [`ErrorCode`]s:
//! - `BAD_ARG`: structural caller mistakes, detected before any I/O
//! - `RANGE`: a score outside its declared bounds
//! - `DB`: an underlying storage failure

use crate::types::{ColId, CourseId, RowId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse error classification carried by every failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Caller-supplied structural error
    BadArg,
    /// Score value outside its declared range
    Range,
    /// Underlying storage failure
    Db,
}

impl ErrorCode {
    /// Wire name of the code
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BadArg => "BAD_ARG",
            Self::Range => "RANGE",
            Self::Db => "DB",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gradebook operation error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GradeError {
    /// Course id not present in the catalog
    #[error("unknown course id '{0}'")]
    UnknownCourse(CourseId),

    /// Column id not declared in the course schema
    #[error("unknown column '{0}'")]
    UnknownColumn(ColId),

    /// Column already present in the table (or repeated in one request)
    #[error("column '{0}' is already in the table")]
    DuplicateColumn(ColId),

    /// Column exists but may not be written directly
    #[error("column '{col_id}' of kind {kind} is not writable")]
    NotWritable { col_id: ColId, kind: &'static str },

    /// Row column set differs from the schema's non-computed columns
    #[error("row '{row_id}' is missing columns {missing:?}")]
    IncompleteRow { row_id: RowId, missing: Vec<ColId> },

    /// Row has no usable value for the id column
    #[error("row is missing a value for id column '{0}'")]
    MissingRowId(ColId),

    /// Stored row key disagrees with the row's id-column value
    #[error("row key '{key}' does not match id value '{value}'")]
    RowIdMismatch { key: RowId, value: String },

    /// Patch addresses a row that does not exist
    #[error("unknown row '{0}'")]
    UnknownRow(RowId),

    /// Patch addresses a cell that does not exist in its row
    #[error("row '{row_id}' has no column '{col_id}'")]
    UnknownCell { row_id: RowId, col_id: ColId },

    /// Score value is neither numeric nor the ungraded marker
    #[error("value '{value}' for column '{col_id}' is not a number")]
    NotANumber { col_id: ColId, value: String },

    /// Score value outside `[min, max]`
    #[error("value {value} for column '{col_id}' is out of range [{min}, {max}]")]
    OutOfRange {
        col_id: ColId,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Storage failure; message preserved from the underlying cause
    #[error("{0}")]
    Db(String),
}

impl GradeError {
    /// Classification code for this error
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::OutOfRange { .. } => ErrorCode::Range,
            Self::Db(_) => ErrorCode::Db,
            _ => ErrorCode::BadArg,
        }
    }

    /// Human-readable message
    #[inline]
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Check if error is a caller mistake rather than a storage failure
    #[inline]
    #[must_use]
    pub fn is_caller_error(&self) -> bool {
        self.code() != ErrorCode::Db
    }
}

/// Invalid course schema or catalog document
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Schema must declare exactly one id column
    #[error("course '{course}' must have exactly one id column, found {found}")]
    IdColumnCount { course: CourseId, found: usize },

    /// Column ids must be unique
    #[error("course '{course}' declares column '{col_id}' more than once")]
    DuplicateColumn { course: CourseId, col_id: ColId },

    /// Score range with `min > max`
    #[error("column '{col_id}' has empty range [{min}, {max}]")]
    InvalidRange { col_id: ColId, min: f64, max: f64 },

    /// Formula refers to a missing or non-score column
    #[error("formula of '{calc}' refers to '{target}', which is not a score column")]
    BadFormulaReference { calc: ColId, target: ColId },

    /// Catalog document could not be parsed
    #[error("catalog parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Catalog file could not be read
    #[error("io error reading catalog: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for gradebook operations
pub type GradeResult<T> = Result<T, GradeError>;
