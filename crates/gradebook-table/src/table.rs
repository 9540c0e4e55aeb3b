//! In-memory grade table for one course
//!
//! [`GradeTable`] pairs a course schema with its raw table. Every mutation
//! takes `&self`, validates the complete request first and returns a new
//! table, so a rejected request can never leave a half-applied edit behind.

use crate::error::{GradeError, GradeResult};
use crate::schema::{ColumnKind, CourseSchema};
use crate::types::{ColId, GradeRow, Patches, RawRow, RawTable, RawValue, RowId};
use crate::validation::{
    check_column_writable, check_range, check_row_complete, check_row_values, normalize,
    row_id_of,
};
use indexmap::IndexSet;
use serde::Serialize;
use std::sync::Arc;

/// Summary statistics for one numeric column of the full table
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnStats {
    /// Column summarized
    pub col_id: ColId,
    /// Number of graded cells
    pub count: usize,
    /// Lowest graded value
    pub min: Option<f64>,
    /// Highest graded value
    pub max: Option<f64>,
    /// Mean of graded values
    pub avg: Option<f64>,
}

/// One course's grades: schema plus validated raw table
#[derive(Debug, Clone, PartialEq)]
pub struct GradeTable {
    schema: Arc<CourseSchema>,
    raw: RawTable,
}

impl GradeTable {
    /// Create an empty table for a course
    #[inline]
    #[must_use]
    pub fn new(schema: Arc<CourseSchema>) -> Self {
        Self {
            schema,
            raw: RawTable::new(),
        }
    }

    /// Wrap existing data, validating it against the schema
    ///
    /// # Errors
    /// - `GradeError::MissingRowId` / `RowIdMismatch` if a row's id value is
    ///   absent or disagrees with its key
    /// - `GradeError::UnknownColumn` / `NotWritable` for undeclared or calc
    ///   columns
    /// - `GradeError::NotANumber` / `OutOfRange` for invalid scores
    /// - `GradeError::IncompleteRow` if rows carry different column sets
    pub fn with_data(schema: Arc<CourseSchema>, raw: RawTable) -> GradeResult<Self> {
        let mut normalized = RawTable::with_capacity(raw.len());
        for (key, row) in raw {
            let value = row_id_of(&schema, &row);
            if value.is_empty() {
                return Err(GradeError::MissingRowId(schema.id_col().to_string()));
            }
            if value != key {
                return Err(GradeError::RowIdMismatch { key, value });
            }
            for col_id in row.keys() {
                let def = schema
                    .column(col_id)
                    .ok_or_else(|| GradeError::UnknownColumn(col_id.clone()))?;
                if !def.kind.is_stored() {
                    return Err(GradeError::NotWritable {
                        col_id: col_id.clone(),
                        kind: def.kind.name(),
                    });
                }
            }
            check_row_values(&schema, &row)?;
            let row = Self::normalize_row(&schema, row);
            normalized.insert(key, row);
        }
        let table = Self {
            schema,
            raw: normalized,
        };
        table.check_uniform()?;
        Ok(table)
    }

    /// Course schema
    #[inline]
    #[must_use]
    pub fn schema(&self) -> &Arc<CourseSchema> {
        &self.schema
    }

    /// Canonical persisted form (no calc columns)
    #[inline]
    #[must_use]
    pub fn get_raw_table(&self) -> &RawTable {
        &self.raw
    }

    /// Consume the table, returning its raw data
    #[inline]
    #[must_use]
    pub fn into_raw_table(self) -> RawTable {
        self.raw
    }

    /// Number of rows
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Check if table has no rows
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Columns currently present in the table, in schema order
    ///
    /// The id column is always present; other stored columns appear once
    /// any row carries them.
    #[must_use]
    pub fn columns(&self) -> Vec<&ColId> {
        self.schema
            .stored_columns()
            .filter(|c| {
                c.as_str() == self.schema.id_col()
                    || self.raw.values().any(|row| row.contains_key(c.as_str()))
            })
            .collect()
    }

    /// Full view: stored cells plus computed columns
    ///
    /// Rows come back in insertion order; cells follow schema order. Each
    /// call builds a fresh snapshot.
    #[must_use]
    pub fn get_full_table(&self) -> Vec<GradeRow> {
        let present = self.columns();
        self.raw
            .values()
            .map(|row| {
                let mut full = GradeRow::with_capacity(present.len());
                for col_id in &present {
                    let value = row.get(col_id.as_str()).cloned().unwrap_or_default();
                    full.insert((*col_id).clone(), value);
                }
                for (col_id, formula) in self.schema.calc_columns() {
                    full.insert(col_id.clone(), formula.evaluate(&self.schema, row, &self.raw));
                }
                full
            })
            .collect()
    }

    /// Add empty columns to every row
    ///
    /// # Errors
    /// - `GradeError::DuplicateColumn` if a column is already in the table or
    ///   repeated in `col_ids`
    /// - `GradeError::UnknownColumn` / `NotWritable` unless the column is a
    ///   declared score or info column
    pub fn add_columns<I, S>(&self, col_ids: I) -> GradeResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let existing: IndexSet<&str> = self.columns().into_iter().map(String::as_str).collect();
        let mut added: IndexSet<ColId> = IndexSet::new();
        for col_id in col_ids {
            let col_id = col_id.as_ref();
            if existing.contains(col_id) || added.contains(col_id) {
                return Err(GradeError::DuplicateColumn(col_id.to_string()));
            }
            check_column_writable(&self.schema, col_id)?;
            added.insert(col_id.to_string());
        }

        let mut next = self.clone();
        for row in next.raw.values_mut() {
            for col_id in &added {
                row.insert(col_id.clone(), RawValue::empty());
            }
        }
        Ok(next)
    }

    /// Insert or fully replace one row
    ///
    /// # Errors
    /// As [`GradeTable::upsert_rows`].
    pub fn upsert_row(&self, row: RawRow) -> GradeResult<Self> {
        self.upsert_rows([row])
    }

    /// Insert or fully replace several rows, all or nothing
    ///
    /// Every row is validated before any is applied; the first invalid row's
    /// error is returned and the table is left as it was. Rows of a sparse
    /// table gain empty cells for any column an upserted row brings in.
    ///
    /// # Errors
    /// - `GradeError::MissingRowId` if a row lacks an id value
    /// - `GradeError::UnknownColumn` / `NotWritable` / `IncompleteRow` if the
    ///   row's columns differ from the schema's stored columns
    /// - `GradeError::NotANumber` / `OutOfRange` for invalid scores
    pub fn upsert_rows<I>(&self, rows: I) -> GradeResult<Self>
    where
        I: IntoIterator<Item = RawRow>,
    {
        let mut validated: Vec<(RowId, RawRow)> = Vec::new();
        for row in rows {
            check_row_complete(&self.schema, &row)?;
            check_row_values(&self.schema, &row)?;
            let row_id = row_id_of(&self.schema, &row);
            validated.push((row_id, Self::normalize_row(&self.schema, row)));
        }

        let mut next = self.clone();
        for (row_id, row) in validated {
            next.raw.insert(row_id, row);
        }
        next.fill_missing_cells();
        Ok(next)
    }

    /// Overwrite individual cells, all or nothing
    ///
    /// # Errors
    /// - `GradeError::UnknownRow` if a row id is not in the table
    /// - `GradeError::UnknownColumn` / `NotWritable` unless the column is a
    ///   declared score or info column
    /// - `GradeError::UnknownCell` if the row does not carry the column
    /// - `GradeError::NotANumber` / `OutOfRange` for invalid scores
    pub fn patch(&self, patches: &Patches) -> GradeResult<Self> {
        let mut writes: Vec<(&RowId, &ColId, RawValue)> = Vec::new();
        for (row_id, cells) in patches {
            let row = self
                .raw
                .get(row_id)
                .ok_or_else(|| GradeError::UnknownRow(row_id.clone()))?;
            for (col_id, value) in cells {
                let def = check_column_writable(&self.schema, col_id)?;
                if !row.contains_key(col_id) {
                    return Err(GradeError::UnknownCell {
                        row_id: row_id.clone(),
                        col_id: col_id.clone(),
                    });
                }
                check_range(def, value)?;
                writes.push((row_id, col_id, normalize(def, value.clone())));
            }
        }

        let mut next = self.clone();
        for (row_id, col_id, value) in writes {
            if let Some(cell) = next.raw.get_mut(row_id).and_then(|r| r.get_mut(col_id)) {
                *cell = value;
            }
        }
        Ok(next)
    }

    /// Statistics for every score and calc column over the full table
    #[must_use]
    pub fn column_stats(&self) -> Vec<ColumnStats> {
        let full = self.get_full_table();
        self.schema
            .columns()
            .filter(|d| matches!(d.kind, ColumnKind::Score { .. } | ColumnKind::Calc { .. }))
            .map(|d| {
                let values: Vec<f64> = full
                    .iter()
                    .filter_map(|row| row.get(&d.col_id).and_then(RawValue::as_number))
                    .collect();
                let count = values.len();
                let min = values.iter().copied().reduce(f64::min);
                let max = values.iter().copied().reduce(f64::max);
                #[allow(clippy::cast_precision_loss)]
                let avg = (count > 0).then(|| values.iter().sum::<f64>() / count as f64);
                ColumnStats {
                    col_id: d.col_id.clone(),
                    count,
                    min,
                    max,
                    avg,
                }
            })
            .collect()
    }

    /// Every row must carry the same column set
    fn check_uniform(&self) -> GradeResult<()> {
        let present = self.columns();
        for (row_id, row) in &self.raw {
            let missing: Vec<ColId> = present
                .iter()
                .filter(|c| !row.contains_key(c.as_str()))
                .map(|c| (*c).clone())
                .collect();
            if !missing.is_empty() {
                return Err(GradeError::IncompleteRow {
                    row_id: row_id.clone(),
                    missing,
                });
            }
        }
        Ok(())
    }

    fn fill_missing_cells(&mut self) {
        let present: Vec<ColId> = self.columns().into_iter().cloned().collect();
        for row in self.raw.values_mut() {
            for col_id in &present {
                if !row.contains_key(col_id) {
                    row.insert(col_id.clone(), RawValue::empty());
                }
            }
        }
    }

    fn normalize_row(schema: &CourseSchema, row: RawRow) -> RawRow {
        row.into_iter()
            .map(|(col_id, value)| match schema.column(&col_id) {
                Some(def) => {
                    let value = normalize(def, value);
                    (col_id, value)
                }
                None => (col_id, value),
            })
            .collect()
    }
}
