//! Core value types for grade tables
//!
//! Defines the identifiers and cell containers shared by every crate:
//! - Course identifiers
//! - Raw cell values (number or text)
//! - Raw rows/tables (persisted form) and grade rows (derived view)
//! - Patches (sparse cell overwrites)

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Column identifier
pub type ColId = String;

/// Row identifier (value of the schema's id column)
pub type RowId = String;

/// One stored row: column id → value, in insertion order
pub type RawRow = IndexMap<ColId, RawValue>;

/// Canonical persisted table: row id → row, in insertion order
pub type RawTable = IndexMap<RowId, RawRow>;

/// A row of the full table: stored cells plus computed columns
pub type GradeRow = IndexMap<ColId, RawValue>;

/// Sparse cell overwrites addressed by row id then column id
pub type Patches = IndexMap<RowId, IndexMap<ColId, RawValue>>;

/// Stable course identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseId(String);

impl CourseId {
    /// Create course id from any string-like value
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the underlying string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for CourseId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CourseId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for CourseId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A single cell value
///
/// Scores are usually numbers; the empty string marks an ungraded cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    /// Numeric value
    Num(f64),
    /// Text value (may be a numeric string sent by a client)
    Text(String),
}

impl RawValue {
    /// The ungraded marker
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self::Text(String::new())
    }

    /// True for the empty string (ungraded) marker
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Text(s) if s.trim().is_empty())
    }

    /// Numeric interpretation, if any
    ///
    /// Text is trimmed and parsed; the empty marker and non-finite numbers
    /// have no numeric value.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Num(n) => Some(*n).filter(|n| n.is_finite()),
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }
}

impl Default for RawValue {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for RawValue {
    fn from(n: f64) -> Self {
        Self::Num(n)
    }
}

impl From<i32> for RawValue {
    fn from(n: i32) -> Self {
        Self::Num(f64::from(n))
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}
