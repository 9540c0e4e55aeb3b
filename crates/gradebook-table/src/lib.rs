//! Gradebook Table - typed grade tables for one course
//!
//! The part of the gradebook with real invariants:
//! - Column kinds (`id`, `score`, `info`, `calc`) as a tagged variant
//! - Range and completeness validation shared by every edit
//! - All-or-nothing batch upserts and patches
//! - Computed columns derived on read, never stored
//!
//! # Architecture
//!
//! ```text
//! CourseCatalog ──▶ CourseSchema ──┐
//!                                  ▼
//! RawTable ──with_data──▶ GradeTable ──add_columns / upsert_rows / patch──▶ GradeTable'
//!                                  │            ▲
//!                                  │       validation
//!                                  └──get_full_table──▶ Vec<GradeRow> (+ calc values)
//! ```
//!
//! # Example
//!
//! ```rust
//! use gradebook_table::{ColumnDef, CourseSchema, Formula, GradeTable, RawRow, RawValue};
//! use std::sync::Arc;
//!
//! let schema = CourseSchema::new(
//!     "cs544",
//!     vec![
//!         ColumnDef::id("studentId"),
//!         ColumnDef::score("hw1", 0.0, 100.0),
//!         ColumnDef::calc("avg", Formula::average_of_all()),
//!     ],
//! )
//! .unwrap();
//!
//! let mut row = RawRow::new();
//! row.insert("studentId".into(), "s1".into());
//! row.insert("hw1".into(), 85.into());
//!
//! let table = GradeTable::new(Arc::new(schema)).upsert_row(row).unwrap();
//! assert_eq!(table.get_full_table()[0]["avg"], RawValue::Num(85.0));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

// Core modules
pub mod error;
pub mod formula;
pub mod schema;
pub mod table;
pub mod types;
pub mod validation;

// Re-exports for convenience
pub use error::{ErrorCode, GradeError, GradeResult, SchemaError};
pub use formula::{Formula, WeightedTerm};
pub use schema::{ColumnDef, ColumnKind, CourseCatalog, CourseSchema};
pub use table::{ColumnStats, GradeTable};
pub use types::{ColId, CourseId, GradeRow, Patches, RawRow, RawTable, RawValue, RowId};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with grade tables
    pub use crate::error::{ErrorCode, GradeError, GradeResult};
    pub use crate::schema::{ColumnDef, CourseCatalog, CourseSchema};
    pub use crate::table::GradeTable;
    pub use crate::types::{CourseId, Patches, RawRow, RawTable, RawValue};
}
