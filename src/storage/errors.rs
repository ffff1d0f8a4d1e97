//! Record store error types
//!
//! Store failures are never retried by the engine. Whether one is fatal
//! depends on where it happens (bootstrap vs background load), which the
//! session decides.

use thiserror::Error;

/// Result type for record store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Record store errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// Bulk insert carried a primary key that already exists
    #[error("Duplicate {entity} key: {id}")]
    DuplicateKey { entity: &'static str, id: String },

    /// Relation table was never created
    #[error("Unknown relation table: {0}")]
    UnknownRelation(String),

    /// Backend could not serve the request
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::DuplicateKey { .. } => "LINELIST_STORE_DUPLICATE_KEY",
            StoreError::UnknownRelation(_) => "LINELIST_STORE_UNKNOWN_RELATION",
            StoreError::Unavailable(_) => "LINELIST_STORE_UNAVAILABLE",
        }
    }
}
