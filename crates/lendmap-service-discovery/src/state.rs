//! Application state for the discovery service.
//!
//! Handlers access the record store through a cheaply cloneable state wrapper
//! shared via axum's `State` extractor.

use std::path::Path;
use std::sync::Arc;

use lendmap_lib::{Error as LibError, RecordStore, SqliteStore};

/// Error during application state initialization.
#[derive(Debug)]
pub enum AppStateError {
    /// Database file not found.
    DatabaseNotFound(String),

    /// Failed to open the record store.
    StoreOpen(LibError),
}

impl std::fmt::Display for AppStateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DatabaseNotFound(path) => write!(f, "database not found: {}", path),
            Self::StoreOpen(e) => write!(f, "failed to open record store: {}", e),
        }
    }
}

impl std::error::Error for AppStateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::StoreOpen(e) => Some(e),
            _ => None,
        }
    }
}

/// Shared application state for all axum handlers.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn RecordStore>,
}

impl AppState {
    /// Load application state from an existing SQLite database file.
    ///
    /// The service refuses to create an empty store: it serves an existing
    /// dataset, so a missing file is a deployment error.
    pub fn load(db_path: impl AsRef<Path>) -> Result<Self, AppStateError> {
        let db_path = db_path.as_ref();

        if !db_path.exists() {
            return Err(AppStateError::DatabaseNotFound(
                db_path.display().to_string(),
            ));
        }

        tracing::info!(path = %db_path.display(), "opening record store");
        let store = SqliteStore::open(db_path).map_err(AppStateError::StoreOpen)?;

        Ok(Self {
            store: Arc::new(store),
        })
    }

    /// Create application state from a pre-built store.
    ///
    /// This is useful for testing with an in-memory store.
    pub fn from_store(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Access the record store.
    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
