//! Behavioural tests for grade tables.
//!
//! These exercise the table operations the gradebook service relies on:
//! - upsert validity is decided exactly by the score range
//! - add_columns rejects repeats and leaves the table unchanged
//! - batch upserts and patches are all-or-nothing
//! - every row carries the same column set

use gradebook_table::{CourseCatalog, ErrorCode, GradeError, GradeTable, RawTable, RawValue};
use gradebook_test_utils::{
    patch_of, raw_row, sample_schema, shared_schema, small_row, small_schema, student,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn small_table() -> GradeTable {
    GradeTable::new(shared_schema(small_schema()))
}

proptest! {
    #[test]
    fn prop_upsert_accepts_exactly_in_range(v in -50.0f64..150.0) {
        let result = small_table().upsert_row(small_row("s1", v));
        if (0.0..=100.0).contains(&v) {
            prop_assert!(result.is_ok());
        } else {
            let err = result.unwrap_err();
            prop_assert_eq!(err.code(), ErrorCode::Range);
        }
    }

    #[test]
    fn prop_patch_accepts_exactly_in_range(v in -50i32..150) {
        let table = small_table().upsert_row(small_row("s1", 50)).unwrap();
        let result = table.patch(&patch_of("s1", "hw1", v));
        if (0..=100).contains(&v) {
            prop_assert!(result.is_ok());
        } else {
            prop_assert_eq!(result.unwrap_err().code(), ErrorCode::Range);
            prop_assert_eq!(&table.get_raw_table()["s1"]["hw1"], &RawValue::Num(50.0));
        }
    }
}

#[test]
fn ungraded_marker_is_accepted() {
    let table = small_table().upsert_row(small_row("s1", "")).unwrap();
    let full = table.get_full_table();
    assert!(full[0]["hw1"].is_empty());
    assert!(full[0]["avg"].is_empty());
}

#[test]
fn example_average_and_range_rejection() {
    let table = small_table().upsert_row(small_row("s1", 85)).unwrap();

    let full = table.get_full_table();
    assert_eq!(full.len(), 1);
    let cells: Vec<(&str, &RawValue)> = full[0].iter().map(|(k, v)| (k.as_str(), v)).collect();
    assert_eq!(
        cells,
        vec![
            ("studentId", &RawValue::from("s1")),
            ("hw1", &RawValue::Num(85.0)),
            ("avg", &RawValue::Num(85.0)),
        ]
    );

    let err = table.patch(&patch_of("s1", "hw1", 150)).unwrap_err();
    assert_eq!(err.code(), ErrorCode::Range);
}

#[test]
fn add_columns_twice_is_rejected_and_harmless() {
    let schema = shared_schema(sample_schema());
    let mut raw = gradebook_table::RawTable::new();
    let mut row = student("s1", "Ann", 90.into(), 80.into(), 40.into());
    row.shift_remove("prj1");
    raw.insert("s1".into(), row);
    let table = GradeTable::with_data(schema, raw).unwrap();

    let first = table.add_columns(["prj1"]).unwrap();
    let second = first.add_columns(["prj1"]);
    assert!(matches!(second, Err(GradeError::DuplicateColumn(ref c)) if c == "prj1"));
    assert_eq!(second.unwrap_err().code(), ErrorCode::BadArg);
    assert!(first.get_raw_table()["s1"]["prj1"].is_empty());
}

#[test]
fn add_columns_rejects_calc_and_unknown() {
    let table = GradeTable::new(shared_schema(sample_schema()));
    assert!(matches!(
        table.add_columns(["hwAvg"]),
        Err(GradeError::NotWritable { .. })
    ));
    assert!(matches!(
        table.add_columns(["bogus"]),
        Err(GradeError::UnknownColumn(_))
    ));
}

#[test]
fn batch_failure_in_third_row_changes_nothing() {
    let base = GradeTable::new(shared_schema(sample_schema()))
        .upsert_row(student("s0", "Zed", 10.into(), 10.into(), 10.into()))
        .unwrap();
    let before = base.get_raw_table().clone();

    let rows = vec![
        student("s1", "Ann", 90.into(), 80.into(), 40.into()),
        student("s2", "Bob", 70.into(), 60.into(), 30.into()),
        student("s3", "Cat", 70.into(), 60.into(), 51.into()),
        student("s4", "Dan", 70.into(), 60.into(), 30.into()),
        student("s5", "Eve", 70.into(), 60.into(), 30.into()),
    ];
    let err = base.upsert_rows(rows).unwrap_err();
    assert!(matches!(err, GradeError::OutOfRange { ref col_id, .. } if col_id == "prj1"));
    assert_eq!(base.get_raw_table(), &before);
    assert!(!base.get_raw_table().contains_key("s1"));
}

#[test]
fn incomplete_row_is_bad_arg() {
    let table = GradeTable::new(shared_schema(sample_schema()));
    let mut row = student("s1", "Ann", 90.into(), 80.into(), 40.into());
    row.shift_remove("hw2");
    let err = table.upsert_row(row).unwrap_err();
    assert_eq!(err.code(), ErrorCode::BadArg);
}

#[test]
fn patch_missing_row_or_column_leaves_table() {
    let table = small_table().upsert_row(small_row("s1", 85)).unwrap();
    let before = table.clone();

    let err = table.patch(&patch_of("s2", "hw1", 90)).unwrap_err();
    assert_eq!(err.code(), ErrorCode::BadArg);
    let err = table.patch(&patch_of("s1", "hw9", 90)).unwrap_err();
    assert_eq!(err.code(), ErrorCode::BadArg);
    assert_eq!(table, before);
}

#[test]
fn class_average_tracks_table() {
    let table = GradeTable::new(shared_schema(sample_schema()))
        .upsert_rows([
            student("s1", "Ann", 90.into(), 80.into(), 40.into()),
            student("s2", "Bob", 70.into(), RawValue::empty(), 30.into()),
        ])
        .unwrap();
    let full = table.get_full_table();
    assert_eq!(full[0]["hwAvg"], RawValue::Num(85.0));
    assert_eq!(full[1]["hwAvg"], RawValue::Num(70.0));
    assert_eq!(full[0]["hw1Class"], RawValue::Num(80.0));
    assert_eq!(full[1]["hw1Class"], RawValue::Num(80.0));
}

#[test]
fn demo_catalog_weighted_total() {
    let catalog = CourseCatalog::from_yaml_str(include_str!("../../../demos/courses.yaml")).unwrap();
    let ids: Vec<&str> = catalog.course_ids().into_iter().map(|c| c.as_str()).collect();
    assert_eq!(ids, vec!["cs101", "cs544"]);

    let schema = catalog.get("cs544").unwrap();
    let table = GradeTable::new(schema)
        .upsert_row(student("s1", "Ann", 85.into(), 90.into(), 45.into()))
        .unwrap();
    let full = table.get_full_table();
    let total = full[0]["total"].as_number().unwrap();
    assert!((total - 88.5).abs() < 1e-9);
    assert_eq!(full[0]["hwAvg"], RawValue::Num(87.5));
}

#[test]
fn ragged_table_is_rejected() {
    let mut raw = RawTable::new();
    raw.insert(
        "s1".into(),
        raw_row(&[("studentId", "s1".into()), ("hw1", 70.into())]),
    );
    raw.insert(
        "s2".into(),
        raw_row(&[("studentId", "s2".into()), ("hw1", 60.into()), ("hw2", 50.into())]),
    );
    let err = GradeTable::with_data(shared_schema(sample_schema()), raw).unwrap_err();
    assert_eq!(
        err,
        GradeError::IncompleteRow {
            row_id: "s1".into(),
            missing: vec!["hw2".into()],
        }
    );
    assert_eq!(err.code(), ErrorCode::BadArg);
}

#[test]
fn upsert_into_sparse_table_keeps_cells_editable() {
    let mut raw = RawTable::new();
    raw.insert(
        "s1".into(),
        raw_row(&[("studentId", "s1".into()), ("hw1", 70.into())]),
    );
    let table = GradeTable::with_data(shared_schema(sample_schema()), raw)
        .unwrap()
        .upsert_row(student("s2", "Bob", 60.into(), 50.into(), 40.into()))
        .unwrap();

    let s1 = &table.get_raw_table()["s1"];
    assert_eq!(s1["hw1"], RawValue::Num(70.0));
    assert!(s1["hw2"].is_empty());
    assert!(s1["name"].is_empty());

    let patched = table.patch(&patch_of("s1", "hw2", 95)).unwrap();
    assert_eq!(patched.get_raw_table()["s1"]["hw2"], RawValue::Num(95.0));
    assert!(GradeTable::with_data(patched.schema().clone(), patched.into_raw_table()).is_ok());
}

#[test]
fn non_finite_scores_are_rejected() {
    let table = small_table();
    let err = table
        .upsert_row(small_row("s1", RawValue::Num(f64::NAN)))
        .unwrap_err();
    assert!(matches!(err, GradeError::NotANumber { .. }));
    assert_eq!(err.code(), ErrorCode::BadArg);

    let table = table.upsert_row(small_row("s1", 50)).unwrap();
    let err = table
        .patch(&patch_of("s1", "hw1", RawValue::Num(f64::INFINITY)))
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::BadArg);
    assert_eq!(table.get_raw_table()["s1"]["hw1"], RawValue::Num(50.0));
}

#[test]
fn add_columns_on_empty_table_records_nothing() {
    // Column presence is derived from rows, so an empty table has nothing
    // to remember and a repeated add is accepted.
    let table = small_table();
    let first = table.add_columns(["hw1"]).unwrap();
    assert!(first.is_empty());
    assert_eq!(first, table);
    let second = first.add_columns(["hw1"]).unwrap();
    assert_eq!(second, table);
}
