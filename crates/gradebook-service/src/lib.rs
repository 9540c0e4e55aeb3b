//! Gradebook Service - course-scoped grade operations
//!
//! Ties the course catalog, the validated [`GradeTable`] operations and a
//! [`GradeStore`] together. Each call names a course; the service checks it
//! against the catalog, reads the stored table, applies the edit and writes
//! the result back.
//!
//! # Example
//!
//! ```rust,ignore
//! use gradebook_service::{GradeService, GradebookConfig};
//! use gradebook_table::CourseId;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GradebookConfig::from_path("gradebook.toml")?;
//! let service = GradeService::from_config(&config)?;
//!
//! let grades = service.get_grades(&CourseId::new("cs544")).await?;
//! for row in grades.get_full_table() {
//!     println!("{row:?}");
//! }
//! service.close().await?;
//! # Ok(())
//! # }
//! ```
//!
//! [`GradeTable`]: gradebook_table::GradeTable
//! [`GradeStore`]: gradebook_store::GradeStore

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod service;

pub use config::{ConfigError, GradebookConfig, StoreConfig};
pub use service::GradeService;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for gradebook callers
    pub use crate::config::GradebookConfig;
    pub use crate::service::GradeService;
    pub use gradebook_table::prelude::*;
}
