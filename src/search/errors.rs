//! Search error types

use thiserror::Error;

use crate::storage::StoreError;

/// Result type for search operations
pub type SearchResult<T> = Result<T, SearchError>;

/// Search errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    // ==================
    // Validation Errors
    // ==================
    /// Range query without exactly two endpoints
    #[error("Invalid range query: {0}")]
    InvalidRange(String),

    /// Query part that is not a finite number
    #[error("Invalid number in query: {0}")]
    InvalidNumber(String),

    // ==================
    // Store Errors
    // ==================
    /// Index or relation table could not be read
    #[error("Search store access failed: {0}")]
    Store(#[from] StoreError),
}

impl SearchError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            SearchError::InvalidRange(_) => "LINELIST_SEARCH_INVALID_RANGE",
            SearchError::InvalidNumber(_) => "LINELIST_SEARCH_INVALID_NUMBER",
            SearchError::Store(_) => "LINELIST_SEARCH_STORE",
        }
    }

    /// Validation errors are raised before any store access
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SearchError::InvalidRange(_) | SearchError::InvalidNumber(_)
        )
    }
}
