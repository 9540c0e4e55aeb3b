//! Validation rules shared by every table mutation
//!
//! Pure functions over a schema and candidate values. They never touch a
//! table, so a batch can be checked completely before anything is written.

use crate::error::{GradeError, GradeResult};
use crate::schema::{ColumnDef, ColumnKind, CourseSchema};
use crate::types::{ColId, RawRow, RawValue};

/// Check that a column exists and may be written directly
///
/// # Errors
/// - `GradeError::UnknownColumn` if the schema does not declare `col_id`
/// - `GradeError::NotWritable` for id and calc columns
pub fn check_column_writable<'a>(
    schema: &'a CourseSchema,
    col_id: &str,
) -> GradeResult<&'a ColumnDef> {
    let def = schema
        .column(col_id)
        .ok_or_else(|| GradeError::UnknownColumn(col_id.to_string()))?;
    if def.kind.is_writable() {
        Ok(def)
    } else {
        Err(GradeError::NotWritable {
            col_id: col_id.to_string(),
            kind: def.kind.name(),
        })
    }
}

/// Check a value against its column's constraints
///
/// Non-finite numbers are rejected in every column, since they cannot be
/// persisted. Otherwise only score columns are constrained: the empty
/// string (ungraded) passes, other text must parse as a number, and numbers
/// must lie in `[min, max]`.
///
/// # Errors
/// - `GradeError::NotANumber` for non-finite numbers and for non-numeric,
///   non-empty score values
/// - `GradeError::OutOfRange` for numbers outside the declared range
pub fn check_range(def: &ColumnDef, value: &RawValue) -> GradeResult<()> {
    if matches!(value, RawValue::Num(n) if !n.is_finite()) {
        return Err(GradeError::NotANumber {
            col_id: def.col_id.clone(),
            value: value.to_string(),
        });
    }
    let ColumnKind::Score { min, max } = def.kind else {
        return Ok(());
    };
    if value.is_empty() {
        return Ok(());
    }
    let n = value.as_number().ok_or_else(|| GradeError::NotANumber {
        col_id: def.col_id.clone(),
        value: value.to_string(),
    })?;
    if n < min || n > max {
        return Err(GradeError::OutOfRange {
            col_id: def.col_id.clone(),
            value: n,
            min,
            max,
        });
    }
    Ok(())
}

/// Check that a row carries exactly the schema's stored columns
///
/// # Errors
/// - `GradeError::MissingRowId` if the id value is absent or empty
/// - `GradeError::UnknownColumn` for undeclared columns
/// - `GradeError::NotWritable` for calc columns
/// - `GradeError::IncompleteRow` if any stored column is missing
pub fn check_row_complete(schema: &CourseSchema, row: &RawRow) -> GradeResult<()> {
    let id_col = schema.id_col();
    match row.get(id_col) {
        Some(v) if !v.is_empty() => {}
        _ => return Err(GradeError::MissingRowId(id_col.to_string())),
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

    let missing: Vec<ColId> = schema
        .stored_columns()
        .filter(|c| !row.contains_key(c.as_str()))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(GradeError::IncompleteRow {
            row_id: row_id_of(schema, row),
            missing,
        });
    }
    Ok(())
}

/// Check every cell of a row against its column's range
///
/// # Errors
/// `GradeError::UnknownColumn` for undeclared columns, otherwise as
/// [`check_range`].
pub fn check_row_values(schema: &CourseSchema, row: &RawRow) -> GradeResult<()> {
    for (col_id, value) in row {
        let def = schema
            .column(col_id)
            .ok_or_else(|| GradeError::UnknownColumn(col_id.clone()))?;
        check_range(def, value)?;
    }
    Ok(())
}

/// Row id carried by a row's id column (empty if absent)
#[must_use]
pub fn row_id_of(schema: &CourseSchema, row: &RawRow) -> String {
    row.get(schema.id_col())
        .map(ToString::to_string)
        .unwrap_or_default()
}

/// Store numeric text in score columns as numbers
///
/// Only called on values that already passed [`check_range`].
#[must_use]
pub(crate) fn normalize(def: &ColumnDef, value: RawValue) -> RawValue {
    if matches!(def.kind, ColumnKind::Score { .. }) && matches!(value, RawValue::Text(_)) {
        if value.is_empty() {
            return RawValue::empty();
        }
        if let Some(n) = value.as_number() {
            return RawValue::Num(n);
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::Formula;

    fn schema() -> CourseSchema {
        CourseSchema::new(
            "cs544",
            vec![
                ColumnDef::id("studentId"),
                ColumnDef::info("name"),
                ColumnDef::score("hw1", 0.0, 100.0),
                ColumnDef::calc("avg", Formula::average_of_all()),
            ],
        )
        .unwrap()
    }

    fn row(pairs: &[(&str, RawValue)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn writable_columns() {
        let schema = schema();
        assert!(check_column_writable(&schema, "hw1").is_ok());
        assert!(check_column_writable(&schema, "name").is_ok());
        assert!(matches!(
            check_column_writable(&schema, "avg"),
            Err(GradeError::NotWritable { kind: "calc", .. })
        ));
        assert!(matches!(
            check_column_writable(&schema, "studentId"),
            Err(GradeError::NotWritable { kind: "id", .. })
        ));
        assert!(matches!(
            check_column_writable(&schema, "hw9"),
            Err(GradeError::UnknownColumn(_))
        ));
    }

    #[test]
    fn range_checks() {
        let schema = schema();
        let hw1 = schema.column("hw1").unwrap();
        assert!(check_range(hw1, &RawValue::from(0)).is_ok());
        assert!(check_range(hw1, &RawValue::from(100)).is_ok());
        assert!(check_range(hw1, &RawValue::from("75")).is_ok());
        assert!(check_range(hw1, &RawValue::empty()).is_ok());

        let err = check_range(hw1, &RawValue::from(100.5)).unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::Range);
        let err = check_range(hw1, &RawValue::from("abc")).unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::BadArg);

        // Info columns are unconstrained
        let name = schema.column("name").unwrap();
        assert!(check_range(name, &RawValue::from(-5)).is_ok());
    }

    #[test]
    fn non_finite_numbers_are_rejected() {
        let schema = schema();
        for col in ["hw1", "name"] {
            let def = schema.column(col).unwrap();
            for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
                let err = check_range(def, &RawValue::Num(bad)).unwrap_err();
                assert!(matches!(err, GradeError::NotANumber { .. }));
                assert_eq!(err.code(), crate::error::ErrorCode::BadArg);
            }
        }
    }

    #[test]
    fn complete_rows() {
        let schema = schema();
        let ok = row(&[
            ("studentId", "s1".into()),
            ("name", "Ann".into()),
            ("hw1", 85.into()),
        ]);
        assert!(check_row_complete(&schema, &ok).is_ok());

        let missing = row(&[("studentId", "s1".into()), ("hw1", 85.into())]);
        assert!(matches!(
            check_row_complete(&schema, &missing),
            Err(GradeError::IncompleteRow { missing, .. }) if missing == vec!["name".to_string()]
        ));

        let no_id = row(&[("studentId", "".into()), ("name", "Ann".into()), ("hw1", 85.into())]);
        assert!(matches!(
            check_row_complete(&schema, &no_id),
            Err(GradeError::MissingRowId(_))
        ));

        let mut with_calc = ok.clone();
        with_calc.insert("avg".into(), 85.into());
        assert!(matches!(
            check_row_complete(&schema, &with_calc),
            Err(GradeError::NotWritable { .. })
        ));

        let mut extra = ok;
        extra.insert("bonus".into(), 1.into());
        assert!(matches!(
            check_row_complete(&schema, &extra),
            Err(GradeError::UnknownColumn(c)) if c == "bonus"
        ));
    }

    #[test]
    fn normalize_numeric_text() {
        let schema = schema();
        let hw1 = schema.column("hw1").unwrap();
        assert_eq!(normalize(hw1, " 85 ".into()), RawValue::Num(85.0));
        assert_eq!(normalize(hw1, "".into()), RawValue::empty());
        let name = schema.column("name").unwrap();
        assert_eq!(normalize(name, "85".into()), RawValue::from("85"));
    }
}
