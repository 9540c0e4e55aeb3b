//! Course schemas and the course catalog
//!
//! A [`CourseSchema`] is the validated column layout of one course. Column
//! kinds are a tagged variant, so the score range and the calc formula only
//! exist where they are meaningful. Schemas are checked once when built and
//! never re-derived afterwards.

use crate::error::SchemaError;
use crate::formula::Formula;
use crate::types::{ColId, CourseId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Column kind with its kind-specific data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ColumnKind {
    /// Row identifier; exactly one per course
    Id,
    /// Numeric score within `[min, max]`
    Score {
        /// Lowest accepted value
        min: f64,
        /// Highest accepted value
        max: f64,
    },
    /// Free-form informational value
    Info,
    /// Derived at read time, never stored
    Calc {
        /// Derivation rule
        formula: Formula,
    },
}

impl ColumnKind {
    /// Kind name as used in documents and messages
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Score { .. } => "score",
            Self::Info => "info",
            Self::Calc { .. } => "calc",
        }
    }

    /// Whether cells of this kind may be edited directly
    #[inline]
    #[must_use]
    pub fn is_writable(&self) -> bool {
        matches!(self, Self::Score { .. } | Self::Info)
    }

    /// Whether cells of this kind are persisted
    #[inline]
    #[must_use]
    pub fn is_stored(&self) -> bool {
        !matches!(self, Self::Calc { .. })
    }
}

/// Column definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDef {
    /// Column identifier
    pub col_id: ColId,
    /// Kind and kind-specific data
    #[serde(flatten)]
    pub kind: ColumnKind,
}

impl ColumnDef {
    /// Identifier column
    #[must_use]
    pub fn id(col_id: impl Into<ColId>) -> Self {
        Self {
            col_id: col_id.into(),
            kind: ColumnKind::Id,
        }
    }

    /// Score column with inclusive range
    #[must_use]
    pub fn score(col_id: impl Into<ColId>, min: f64, max: f64) -> Self {
        Self {
            col_id: col_id.into(),
            kind: ColumnKind::Score { min, max },
        }
    }

    /// Informational column
    #[must_use]
    pub fn info(col_id: impl Into<ColId>) -> Self {
        Self {
            col_id: col_id.into(),
            kind: ColumnKind::Info,
        }
    }

    /// Computed column
    #[must_use]
    pub fn calc(col_id: impl Into<ColId>, formula: Formula) -> Self {
        Self {
            col_id: col_id.into(),
            kind: ColumnKind::Calc { formula },
        }
    }
}

/// Validated column layout of one course
#[derive(Debug, Clone, PartialEq)]
pub struct CourseSchema {
    course_id: CourseId,
    columns: IndexMap<ColId, ColumnDef>,
    id_col: ColId,
}

impl CourseSchema {
    /// Build and validate a schema
    ///
    /// # Errors
    /// - `SchemaError::IdColumnCount` unless exactly one id column
    /// - `SchemaError::DuplicateColumn` if a column id repeats
    /// - `SchemaError::InvalidRange` if a score range is empty or not finite
    /// - `SchemaError::BadFormulaReference` if a formula refers to anything
    ///   other than a score column
    pub fn new(
        course_id: impl Into<CourseId>,
        defs: impl IntoIterator<Item = ColumnDef>,
    ) -> Result<Self, SchemaError> {
        let course_id = course_id.into();
        let mut columns = IndexMap::new();

        for def in defs {
            if let ColumnKind::Score { min, max } = def.kind {
                if !(min.is_finite() && max.is_finite() && min <= max) {
                    return Err(SchemaError::InvalidRange {
                        col_id: def.col_id,
                        min,
                        max,
                    });
                }
            }
            if columns.contains_key(&def.col_id) {
                return Err(SchemaError::DuplicateColumn {
                    course: course_id,
                    col_id: def.col_id,
                });
            }
            columns.insert(def.col_id.clone(), def);
        }

        let ids: Vec<&ColId> = columns
            .values()
            .filter(|d| d.kind == ColumnKind::Id)
            .map(|d| &d.col_id)
            .collect();
        if ids.len() != 1 {
            return Err(SchemaError::IdColumnCount {
                found: ids.len(),
                course: course_id,
            });
        }
        let id_col = ids[0].clone();

        // Calc inputs must be score columns; this also rules out calc cycles.
        for def in columns.values() {
            if let ColumnKind::Calc { formula } = &def.kind {
                for target in formula.references() {
                    let is_score = matches!(
                        columns.get(target).map(|d| &d.kind),
                        Some(ColumnKind::Score { .. })
                    );
                    if !is_score {
                        return Err(SchemaError::BadFormulaReference {
                            calc: def.col_id.clone(),
                            target: target.to_string(),
                        });
                    }
                }
            }
        }

        Ok(Self {
            course_id,
            columns,
            id_col,
        })
    }

    /// Course this schema belongs to
    #[inline]
    #[must_use]
    pub fn course_id(&self) -> &CourseId {
        &self.course_id
    }

    /// Designated row-id column
    #[inline]
    #[must_use]
    pub fn id_col(&self) -> &str {
        &self.id_col
    }

    /// Look up a column definition
    #[inline]
    #[must_use]
    pub fn column(&self, col_id: &str) -> Option<&ColumnDef> {
        self.columns.get(col_id)
    }

    /// All columns in declaration order
    pub fn columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.values()
    }

    /// Persisted (non-calc) column ids in declaration order
    pub fn stored_columns(&self) -> impl Iterator<Item = &ColId> {
        self.columns
            .values()
            .filter(|d| d.kind.is_stored())
            .map(|d| &d.col_id)
    }

    /// Score column ids in declaration order
    pub fn score_columns(&self) -> impl Iterator<Item = &ColId> {
        self.columns
            .values()
            .filter(|d| matches!(d.kind, ColumnKind::Score { .. }))
            .map(|d| &d.col_id)
    }

    /// Calc columns with their formulas in declaration order
    pub fn calc_columns(&self) -> impl Iterator<Item = (&ColId, &Formula)> {
        self.columns.values().filter_map(|d| match &d.kind {
            ColumnKind::Calc { formula } => Some((&d.col_id, formula)),
            _ => None,
        })
    }
}

/// On-disk catalog document
#[derive(Debug, Deserialize)]
struct CatalogDocument {
    courses: IndexMap<CourseId, Vec<ColumnDef>>,
}

/// Read-only map from course id to schema
///
/// The set of known courses is defined by whoever builds the catalog; the
/// gradebook only consults it.
#[derive(Debug, Clone, Default)]
pub struct CourseCatalog {
    courses: HashMap<CourseId, Arc<CourseSchema>>,
}

impl CourseCatalog {
    /// Create empty catalog
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a course schema, replacing any previous one with the same id
    #[must_use]
    pub fn with_course(mut self, schema: CourseSchema) -> Self {
        self.courses
            .insert(schema.course_id().clone(), Arc::new(schema));
        self
    }

    /// Parse a YAML catalog, validating every schema
    ///
    /// ```yaml
    /// courses:
    ///   cs544:
    ///     - { colId: studentId, kind: id }
    ///     - { colId: hw1, kind: score, min: 0, max: 100 }
    ///     - { colId: avg, kind: calc, formula: { op: average } }
    /// ```
    ///
    /// # Errors
    /// `SchemaError::Parse` for malformed YAML, or any schema validation error.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SchemaError> {
        let doc: CatalogDocument = serde_yaml::from_str(yaml)?;
        let mut catalog = Self::new();
        for (course_id, defs) in doc.courses {
            catalog = catalog.with_course(CourseSchema::new(course_id, defs)?);
        }
        tracing::debug!("Loaded catalog with {} courses", catalog.len());
        Ok(catalog)
    }

    /// Read and parse a YAML catalog file
    ///
    /// # Errors
    /// `SchemaError::Io` if the file cannot be read, otherwise as
    /// [`CourseCatalog::from_yaml_str`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Schema for a course, if known
    #[inline]
    #[must_use]
    pub fn get(&self, course_id: &str) -> Option<Arc<CourseSchema>> {
        self.courses.get(course_id).cloned()
    }

    /// Check if course is known
    #[inline]
    #[must_use]
    pub fn contains(&self, course_id: &str) -> bool {
        self.courses.contains_key(course_id)
    }

    /// Known course ids, sorted
    #[must_use]
    pub fn course_ids(&self) -> Vec<&CourseId> {
        let mut ids: Vec<&CourseId> = self.courses.keys().collect();
        ids.sort();
        ids
    }

    /// Number of known courses
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.courses.len()
    }

    /// Check if catalog is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}
