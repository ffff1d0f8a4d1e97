//! Browse session error types
//!
//! Only a failed bootstrap is FATAL. Every other error leaves the session
//! usable with the state it had before the failing operation.

use thiserror::Error;

use crate::observability::Severity;
use crate::search::SearchError;
use crate::storage::StoreError;

/// Result type for browse session operations
pub type BrowseResult<T> = Result<T, BrowseError>;

/// Browse session errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BrowseError {
    /// First chunk, count or first-page merge failed
    #[error("Session bootstrap failed: {0}")]
    Bootstrap(StoreError),

    /// Search input rejected before store access
    #[error("Invalid search query: {0}")]
    Validation(SearchError),

    /// Store access failed during a user operation
    #[error("Store access failed: {0}")]
    Store(StoreError),

    /// Configuration could not be read or is out of range
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl BrowseError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            BrowseError::Bootstrap(_) => "LINELIST_SESSION_BOOTSTRAP",
            BrowseError::Validation(_) => "LINELIST_SESSION_VALIDATION",
            BrowseError::Store(_) => "LINELIST_SESSION_STORE",
            BrowseError::Config(_) => "LINELIST_SESSION_CONFIG",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            BrowseError::Bootstrap(_) => Severity::Fatal,
            _ => Severity::Error,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        BrowseError::Config(msg.into())
    }
}

impl From<StoreError> for BrowseError {
    fn from(err: StoreError) -> Self {
        BrowseError::Store(err)
    }
}

impl From<SearchError> for BrowseError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::Store(store) => BrowseError::Store(store),
            other => BrowseError::Validation(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_bootstrap_is_fatal() {
        assert!(BrowseError::Bootstrap(StoreError::Unavailable("x".into())).is_fatal());
        assert!(!BrowseError::Store(StoreError::Unavailable("x".into())).is_fatal());
        assert!(!BrowseError::config("bad").is_fatal());
    }

    #[test]
    fn test_search_error_mapping() {
        let err: BrowseError = SearchError::InvalidRange("1-2-3".into()).into();
        assert!(matches!(err, BrowseError::Validation(_)));

        let err: BrowseError = SearchError::Store(StoreError::UnknownRelation("t".into())).into();
        assert_eq!(err, BrowseError::Store(StoreError::UnknownRelation("t".into())));
        assert_eq!(err.code(), "LINELIST_SESSION_STORE");
    }
}
