//! Gradebook configuration
//!
//! Loaded from TOML:
//!
//! ```toml
//! catalog_path = "courses.yaml"
//! log_filter = "gradebook=debug,info"
//!
//! [store]
//! backend = "sqlite"
//! path = "grades.db"
//! ```

use gradebook_store::{GradeStore, MemoryStore, SqliteStore, StoreError};
use gradebook_table::{CourseCatalog, SchemaError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Storage backend selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StoreConfig {
    /// Ephemeral in-process store
    Memory,
    /// SQLite database file
    Sqlite {
        /// Database file path
        path: PathBuf,
    },
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::Sqlite {
            path: PathBuf::from("grades.db"),
        }
    }
}

/// Gradebook configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradebookConfig {
    /// Storage backend
    pub store: StoreConfig,
    /// YAML course catalog
    pub catalog_path: PathBuf,
    /// Default `tracing` filter when `RUST_LOG` is unset
    pub log_filter: String,
}

impl GradebookConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With storage backend
    #[inline]
    #[must_use]
    pub fn with_store(mut self, store: StoreConfig) -> Self {
        self.store = store;
        self
    }

    /// With catalog file
    #[inline]
    #[must_use]
    pub fn with_catalog_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.catalog_path = path.into();
        self
    }

    /// With default log filter
    #[inline]
    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    /// Parse TOML configuration; missing keys take defaults
    ///
    /// # Errors
    /// `ConfigError::Parse` for malformed TOML.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML configuration file
    ///
    /// # Errors
    /// `ConfigError::Io` if the file cannot be read, otherwise as
    /// [`GradebookConfig::from_toml_str`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Load the configured course catalog
    ///
    /// # Errors
    /// `ConfigError::Catalog` if the catalog is unreadable or invalid.
    pub fn load_catalog(&self) -> Result<CourseCatalog, ConfigError> {
        Ok(CourseCatalog::from_path(&self.catalog_path)?)
    }

    /// Open the configured store
    ///
    /// # Errors
    /// `ConfigError::Store` if the database cannot be opened.
    pub fn open_store(&self) -> Result<Arc<dyn GradeStore>, ConfigError> {
        let store: Arc<dyn GradeStore> = match &self.store {
            StoreConfig::Memory => Arc::new(MemoryStore::new()),
            StoreConfig::Sqlite { path } => Arc::new(SqliteStore::open(path)?),
        };
        Ok(store)
    }
}

impl Default for GradebookConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            catalog_path: PathBuf::from("courses.yaml"),
            log_filter: "info".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file unreadable
    #[error("io error reading {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Malformed TOML
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Catalog unreadable or invalid
    #[error("catalog error: {0}")]
    Catalog(#[from] SchemaError),

    /// Store could not be opened
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
