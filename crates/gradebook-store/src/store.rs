//! Persistence trait for course raw tables
//!
//! The one stateful boundary of the gradebook. Implementations map a course
//! id to that course's raw table document and are injected into the service
//! as `Arc<dyn GradeStore>`.

use crate::error::StoreResult;
use gradebook_table::{CourseId, RawTable};

/// Keyed document store for raw tables
///
/// Writes are whole-document, last-writer-wins replacements. There is no
/// compare-and-swap: two concurrent read-modify-write cycles on one course
/// can lose an update.
#[async_trait::async_trait]
pub trait GradeStore: Send + Sync {
    /// Read a course's table; an unseen course yields an empty table
    async fn read(&self, course_id: &CourseId) -> StoreResult<RawTable>;

    /// Replace a course's table, returning the value as persisted
    async fn write(&self, course_id: &CourseId, raw: &RawTable) -> StoreResult<RawTable>;

    /// Remove every stored document
    async fn clear(&self) -> StoreResult<()>;

    /// Release the underlying connection; closing twice is a no-op
    async fn close(&self) -> StoreResult<()>;
}
