//! Gradebook Store - keyed persistence for raw tables
//!
//! Maps a course id to that course's raw table document.
//!
//! # Implementations
//!
//! - [`MemoryStore`]: `DashMap`-backed, for tests and ephemeral use
//! - [`SqliteStore`]: durable, one JSON document per course
//!
//! # Example
//!
//! ```rust,ignore
//! use gradebook_store::{GradeStore, SqliteStore};
//! use gradebook_table::CourseId;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteStore::open("grades.db")?;
//! let raw = store.read(&CourseId::new("cs544")).await?;
//! store.write(&CourseId::new("cs544"), &raw).await?;
//! store.close().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod memory;
pub mod sqlite;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use store::GradeStore;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
