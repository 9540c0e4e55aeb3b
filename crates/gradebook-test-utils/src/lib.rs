//! Testing utilities for the gradebook workspace
//!
//! Shared fixtures: course schemas, a catalog and row/patch builders.

#![allow(missing_docs)]

use gradebook_table::{
    ColumnDef, CourseCatalog, CourseSchema, Formula, Patches, RawRow, RawValue,
};
use std::sync::Arc;

/// Course with names, two homeworks, a project and computed columns
pub const SAMPLE_COURSE: &str = "cs544";

/// Minimal course: id, one homework and its average
pub const SMALL_COURSE: &str = "cs101";

pub fn sample_schema() -> CourseSchema {
    CourseSchema::new(
        SAMPLE_COURSE,
        vec![
            ColumnDef::id("studentId"),
            ColumnDef::info("name"),
            ColumnDef::score("hw1", 0.0, 100.0),
            ColumnDef::score("hw2", 0.0, 100.0),
            ColumnDef::score("prj1", 0.0, 50.0),
            ColumnDef::calc("hwAvg", Formula::average(["hw1", "hw2"])),
            ColumnDef::calc("hw1Class", Formula::ClassAverage { col: "hw1".into() }),
        ],
    )
    .unwrap()
}

pub fn small_schema() -> CourseSchema {
    CourseSchema::new(
        SMALL_COURSE,
        vec![
            ColumnDef::id("studentId"),
            ColumnDef::score("hw1", 0.0, 100.0),
            ColumnDef::calc("avg", Formula::average_of_all()),
        ],
    )
    .unwrap()
}

pub fn sample_catalog() -> CourseCatalog {
    CourseCatalog::new()
        .with_course(sample_schema())
        .with_course(small_schema())
}

pub fn shared_schema(schema: CourseSchema) -> Arc<CourseSchema> {
    Arc::new(schema)
}

pub fn raw_row(pairs: &[(&str, RawValue)]) -> RawRow {
    pairs
        .iter()
        .map(|(col, value)| ((*col).to_string(), value.clone()))
        .collect()
}

/// Complete row for [`sample_schema`]
pub fn student(id: &str, name: &str, hw1: RawValue, hw2: RawValue, prj1: RawValue) -> RawRow {
    raw_row(&[
        ("studentId", id.into()),
        ("name", name.into()),
        ("hw1", hw1),
        ("hw2", hw2),
        ("prj1", prj1),
    ])
}

/// Complete row for [`small_schema`]
pub fn small_row(id: &str, hw1: impl Into<RawValue>) -> RawRow {
    raw_row(&[("studentId", id.into()), ("hw1", hw1.into())])
}

pub fn patch_of(row_id: &str, col_id: &str, value: impl Into<RawValue>) -> Patches {
    let mut patches = Patches::new();
    patches
        .entry(row_id.to_string())
        .or_default()
        .insert(col_id.to_string(), value.into());
    patches
}
