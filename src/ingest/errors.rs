//! Ingestion error types

use thiserror::Error;

use crate::storage::StoreError;

/// Result type for ingestion
pub type IngestResult<T> = Result<T, IngestError>;

/// Ingestion errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IngestError {
    /// Specimen names a case that is not part of the dataset
    #[error("Specimen {specimen_id} references unknown case {case_id}")]
    DanglingForeignKey {
        specimen_id: String,
        case_id: String,
    },

    /// Store rejected a bulk write
    #[error("Ingest write failed: {0}")]
    Store(#[from] StoreError),
}

impl IngestError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            IngestError::DanglingForeignKey { .. } => "LINELIST_INGEST_DANGLING_FK",
            IngestError::Store(_) => "LINELIST_INGEST_STORE",
        }
    }
}
