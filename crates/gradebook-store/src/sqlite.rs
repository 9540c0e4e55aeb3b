//! Durable grade store backed by SQLite
//!
//! One row per course in `grades(course_id TEXT PRIMARY KEY, raw_table TEXT)`,
//! the table stored as JSON. Blocking SQLite calls run on tokio's blocking
//! pool; the connection lives behind a mutex until `close` takes it.

use crate::error::{StoreError, StoreResult};
use crate::store::GradeStore;
use gradebook_table::{CourseId, RawTable};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS grades (
    course_id TEXT PRIMARY KEY,
    raw_table TEXT NOT NULL
)";

const SELECT_TABLE: &str = "SELECT raw_table FROM grades WHERE course_id = ?1";

const UPSERT_TABLE: &str = "INSERT INTO grades (course_id, raw_table) VALUES (?1, ?2)
    ON CONFLICT(course_id) DO UPDATE SET raw_table = excluded.raw_table
    RETURNING raw_table";

/// SQLite-backed store
#[derive(Debug, Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Option<Connection>>>,
}

impl SqliteStore {
    /// Open (or create) a database file
    ///
    /// Enables WAL journaling and creates the `grades` table if missing.
    ///
    /// # Errors
    /// `StoreError::Sqlite` if the file cannot be opened or initialized.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;

        let journal_mode: String = conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;
        if !journal_mode.eq_ignore_ascii_case("wal") {
            tracing::warn!(
                "WAL mode unavailable for {}; journal mode is {}",
                path.display(),
                journal_mode
            );
        }

        let store = Self::from_connection(conn)?;
        tracing::info!("Opened grade store at {}", path.display());
        Ok(store)
    }

    /// Open a private in-memory database
    ///
    /// # Errors
    /// `StoreError::Sqlite` if SQLite cannot initialize.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute(CREATE_TABLE, [])?;
        Ok(Self {
            conn: Arc::new(Mutex::new(Some(conn))),
        })
    }

    /// Run a blocking closure against the open connection
    async fn with_conn<T, F>(&self, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> StoreResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock();
            let conn = guard.as_ref().ok_or(StoreError::Closed)?;
            f(conn)
        })
        .await?
    }
}

#[async_trait::async_trait]
impl GradeStore for SqliteStore {
    async fn read(&self, course_id: &CourseId) -> StoreResult<RawTable> {
        let key = course_id.to_string();
        let raw = self
            .with_conn(move |conn| {
                let doc: Option<String> = conn
                    .query_row(SELECT_TABLE, params![key], |row| row.get(0))
                    .optional()?;
                match doc {
                    Some(doc) => Ok(serde_json::from_str(&doc)?),
                    None => Ok(RawTable::new()),
                }
            })
            .await?;
        tracing::debug!("Read {} rows for course {}", raw.len(), course_id);
        Ok(raw)
    }

    async fn write(&self, course_id: &CourseId, raw: &RawTable) -> StoreResult<RawTable> {
        let key = course_id.to_string();
        let doc = serde_json::to_string(raw)?;
        let stored = self
            .with_conn(move |conn| {
                let stored: String =
                    conn.query_row(UPSERT_TABLE, params![key, doc], |row| row.get(0))?;
                Ok(serde_json::from_str::<RawTable>(&stored)?)
            })
            .await?;
        tracing::debug!("Wrote {} rows for course {}", stored.len(), course_id);
        Ok(stored)
    }

    async fn clear(&self) -> StoreResult<()> {
        let removed = self
            .with_conn(|conn| Ok(conn.execute("DELETE FROM grades", [])?))
            .await?;
        tracing::info!("Cleared {} course documents", removed);
        Ok(())
    }

    async fn close(&self) -> StoreResult<()> {
        let conn = self.conn.lock().take();
        if let Some(conn) = conn {
            conn.close().map_err(|(_, err)| StoreError::Sqlite(err))?;
            tracing::info!("Closed grade store");
        }
        Ok(())
    }
}
