//! Grade service
//!
//! Thin orchestration over the catalog, the grade table and the store.
//! Every course-scoped operation follows one template:
//! 1. Check the course id against the catalog
//! 2. Read the raw table and rebuild a `GradeTable`
//! 3. Apply the validated table operation
//! 4. Write the result and rebuild the view from the persisted value
//!
//! Validation failures return before any write. There is no per-course lock:
//! concurrent operations on one course race and the last write wins.

use crate::config::{ConfigError, GradebookConfig};
use gradebook_store::GradeStore;
use gradebook_table::{
    ColumnStats, CourseCatalog, CourseId, CourseSchema, GradeError, GradeResult, GradeTable,
    Patches, RawRow, RawTable,
};
use std::sync::Arc;

/// Gradebook operations for every course in a catalog
#[derive(Clone)]
pub struct GradeService {
    catalog: Arc<CourseCatalog>,
    store: Arc<dyn GradeStore>,
}

impl std::fmt::Debug for GradeService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GradeService")
            .field("courses", &self.catalog.len())
            .finish_non_exhaustive()
    }
}

impl GradeService {
    /// Create service over a catalog and an injected store
    #[inline]
    #[must_use]
    pub fn new(catalog: impl Into<Arc<CourseCatalog>>, store: Arc<dyn GradeStore>) -> Self {
        Self {
            catalog: catalog.into(),
            store,
        }
    }

    /// Build catalog and store from configuration
    ///
    /// # Errors
    /// `ConfigError` if the catalog cannot be loaded or the store opened.
    pub fn from_config(config: &GradebookConfig) -> Result<Self, ConfigError> {
        let catalog = config.load_catalog()?;
        let store = config.open_store()?;
        tracing::info!("Gradebook ready with {} courses", catalog.len());
        Ok(Self::new(catalog, store))
    }

    /// Course catalog in use
    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &CourseCatalog {
        &self.catalog
    }

    /// Replace a course's table wholesale
    ///
    /// The table is validated against the course schema before it is
    /// written.
    ///
    /// # Errors
    /// `BAD_ARG`/`RANGE` for an unknown course or invalid table, `DB` for
    /// storage failures.
    pub async fn load(&self, course_id: &CourseId, raw: RawTable) -> GradeResult<GradeTable> {
        let schema = self.schema(course_id)?;
        let table = GradeTable::with_data(schema, raw).map_err(|e| rejected(course_id, e))?;
        tracing::info!("Loading {} rows into course {}", table.len(), course_id);
        self.write_table(course_id, table).await
    }

    /// Current grades; an unseen course yields an empty table
    ///
    /// # Errors
    /// `BAD_ARG` for an unknown course, `DB` for storage failures.
    pub async fn get_grades(&self, course_id: &CourseId) -> GradeResult<GradeTable> {
        let schema = self.schema(course_id)?;
        self.read_table(course_id, schema).await
    }

    /// Add one empty column
    ///
    /// # Errors
    /// As [`GradeService::add_columns`].
    pub async fn add_column(&self, course_id: &CourseId, col_id: &str) -> GradeResult<GradeTable> {
        self.add_columns(course_id, &[col_id]).await
    }

    /// Add empty columns to every row
    ///
    /// # Errors
    /// `BAD_ARG` for an unknown course or a column that is already present
    /// or not a declared score/info column, `DB` for storage failures.
    pub async fn add_columns<S>(&self, course_id: &CourseId, col_ids: &[S]) -> GradeResult<GradeTable>
    where
        S: AsRef<str> + Sync,
    {
        self.modify(course_id, |table| table.add_columns(col_ids))
            .await
    }

    /// Insert or replace one row
    ///
    /// # Errors
    /// As [`GradeService::upsert_rows`].
    pub async fn upsert_row(&self, course_id: &CourseId, row: RawRow) -> GradeResult<GradeTable> {
        self.upsert_rows(course_id, vec![row]).await
    }

    /// Insert or replace several rows, all or nothing
    ///
    /// # Errors
    /// `BAD_ARG` for an unknown course or structurally invalid row, `RANGE`
    /// for out-of-range scores, `DB` for storage failures.
    pub async fn upsert_rows(
        &self,
        course_id: &CourseId,
        rows: Vec<RawRow>,
    ) -> GradeResult<GradeTable> {
        self.modify(course_id, move |table| table.upsert_rows(rows))
            .await
    }

    /// Overwrite individual cells, all or nothing
    ///
    /// # Errors
    /// `BAD_ARG` for an unknown course or a patch addressing a missing row,
    /// missing cell or non-writable column, `RANGE` for out-of-range scores,
    /// `DB` for storage failures.
    pub async fn patch(&self, course_id: &CourseId, patches: &Patches) -> GradeResult<GradeTable> {
        self.modify(course_id, |table| table.patch(patches)).await
    }

    /// Per-column statistics of the current full table
    ///
    /// # Errors
    /// As [`GradeService::get_grades`].
    pub async fn column_stats(&self, course_id: &CourseId) -> GradeResult<Vec<ColumnStats>> {
        Ok(self.get_grades(course_id).await?.column_stats())
    }

    /// Remove every stored course table
    ///
    /// # Errors
    /// `DB` for storage failures.
    pub async fn clear(&self) -> GradeResult<()> {
        self.store.clear().await?;
        tracing::info!("Cleared all course tables");
        Ok(())
    }

    /// Release the store connection
    ///
    /// # Errors
    /// `DB` for storage failures.
    pub async fn close(&self) -> GradeResult<()> {
        Ok(self.store.close().await?)
    }

    fn schema(&self, course_id: &CourseId) -> GradeResult<Arc<CourseSchema>> {
        self.catalog
            .get(course_id.as_str())
            .ok_or_else(|| rejected(course_id, GradeError::UnknownCourse(course_id.clone())))
    }

    /// Read, apply `op`, write
    async fn modify<F>(&self, course_id: &CourseId, op: F) -> GradeResult<GradeTable>
    where
        F: FnOnce(&GradeTable) -> GradeResult<GradeTable> + Send,
    {
        let schema = self.schema(course_id)?;
        let current = self.read_table(course_id, schema).await?;
        let next = op(&current).map_err(|e| rejected(course_id, e))?;
        self.write_table(course_id, next).await
    }

    async fn read_table(
        &self,
        course_id: &CourseId,
        schema: Arc<CourseSchema>,
    ) -> GradeResult<GradeTable> {
        let raw = self.store.read(course_id).await?;
        GradeTable::with_data(schema, raw).map_err(|e| {
            GradeError::Db(format!("stored table for course {course_id} is invalid: {e}"))
        })
    }

    async fn write_table(&self, course_id: &CourseId, table: GradeTable) -> GradeResult<GradeTable> {
        let schema = Arc::clone(table.schema());
        let stored = self.store.write(course_id, table.get_raw_table()).await?;
        tracing::info!("Wrote {} rows for course {}", stored.len(), course_id);
        GradeTable::with_data(schema, stored).map_err(|e| {
            GradeError::Db(format!("store returned an invalid table for course {course_id}: {e}"))
        })
    }
}

fn rejected(course_id: &CourseId, err: GradeError) -> GradeError {
    tracing::warn!("Rejected request for course {}: {} ({})", course_id, err, err.code());
    err
}
