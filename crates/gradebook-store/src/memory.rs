//! In-process grade store backed by `DashMap`
//!
//! Documents are kept as JSON text, so `write` hands back the decoded
//! post-write value exactly like a database round trip would.

use crate::error::{StoreError, StoreResult};
use crate::store::GradeStore;
use dashmap::DashMap;
use gradebook_table::{CourseId, RawTable};
use std::sync::atomic::{AtomicBool, Ordering};

/// Concurrent in-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: DashMap<CourseId, String>,
    closed: AtomicBool,
}

impl MemoryStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored course documents
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Check if no documents are stored
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if self.closed.load(Ordering::Acquire) {
            Err(StoreError::Closed)
        } else {
            Ok(())
        }
    }
}

#[async_trait::async_trait]
impl GradeStore for MemoryStore {
    async fn read(&self, course_id: &CourseId) -> StoreResult<RawTable> {
        self.ensure_open()?;
        match self.documents.get(course_id) {
            Some(doc) => Ok(serde_json::from_str(doc.value())?),
            None => Ok(RawTable::new()),
        }
    }

    async fn write(&self, course_id: &CourseId, raw: &RawTable) -> StoreResult<RawTable> {
        self.ensure_open()?;
        let doc = serde_json::to_string(raw)?;
        self.documents.insert(course_id.clone(), doc);
        tracing::debug!("Stored {} rows for course {}", raw.len(), course_id);

        let stored: Option<RawTable> = self
            .documents
            .get(course_id)
            .map(|doc| serde_json::from_str(doc.value()))
            .transpose()?;
        Ok(stored.unwrap_or_default())
    }

    async fn clear(&self) -> StoreResult<()> {
        self.ensure_open()?;
        self.documents.clear();
        Ok(())
    }

    async fn close(&self) -> StoreResult<()> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            tracing::debug!("Memory store closed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gradebook_table::{RawRow, RawValue};

    fn table() -> RawTable {
        let mut row = RawRow::new();
        row.insert("studentId".into(), "s1".into());
        row.insert("hw1".into(), RawValue::Num(85.0));
        let mut raw = RawTable::new();
        raw.insert("s1".into(), row);
        raw
    }

    #[tokio::test]
    async fn unseen_course_reads_empty() {
        let store = MemoryStore::new();
        let raw = store.read(&CourseId::new("cs544")).await.unwrap();
        assert!(raw.is_empty());
    }

    #[tokio::test]
    async fn write_then_read() {
        let store = MemoryStore::new();
        let course = CourseId::new("cs544");
        let written = store.write(&course, &table()).await.unwrap();
        assert_eq!(written, table());
        assert_eq!(store.read(&course).await.unwrap(), table());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn clear_removes_all() {
        let store = MemoryStore::new();
        store.write(&CourseId::new("a"), &table()).await.unwrap();
        store.write(&CourseId::new("b"), &table()).await.unwrap();
        store.clear().await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn closed_store_rejects_use() {
        let store = MemoryStore::new();
        store.close().await.unwrap();
        store.close().await.unwrap();
        let err = store.read(&CourseId::new("a")).await.unwrap_err();
        assert!(matches!(err, StoreError::Closed));
    }
}
