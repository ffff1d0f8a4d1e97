//! Observable events for linelist
//!
//! Events are explicit and typed.

use std::fmt;

/// Observable events in a browsing session's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Ingestion
    /// Dataset written to the store
    IngestComplete,

    // Session lifecycle
    /// Session bootstrap finished, first page available
    SessionReady,
    /// Session bootstrap failed (FATAL)
    BootstrapFailed,

    // Incremental loading
    /// Background chunk read from the store
    ChunkLoaded,
    /// Background chunk appended to the pipeline
    ChunkApplied,
    /// Background chunk could not be read
    ChunkFailed,
    /// Every planned chunk was delivered
    LoadComplete,

    // Filtering
    /// Direct filter replaced
    FilterApplied,
    /// Search produced an id set or cleared it
    SearchExecuted,
    /// Search input rejected before any store access
    SearchRejected,

    // Pagination
    /// Page index changed
    PageChanged,
    /// Filtered set grew while the user is past page 1
    NewDataSignalled,
    /// User accepted pending data
    NewDataAccepted,
    /// Page window enriched with specimens and area
    RelationsMerged,
    /// Page window enrichment failed
    RelationsFailed,
}

impl Event {
    /// Returns the event name as used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::IngestComplete => "INGEST_COMPLETE",
            Event::SessionReady => "SESSION_READY",
            Event::BootstrapFailed => "BOOTSTRAP_FAILED",
            Event::ChunkLoaded => "CHUNK_LOADED",
            Event::ChunkApplied => "CHUNK_APPLIED",
            Event::ChunkFailed => "CHUNK_FAILED",
            Event::LoadComplete => "LOAD_COMPLETE",
            Event::FilterApplied => "FILTER_APPLIED",
            Event::SearchExecuted => "SEARCH_EXECUTED",
            Event::SearchRejected => "SEARCH_REJECTED",
            Event::PageChanged => "PAGE_CHANGED",
            Event::NewDataSignalled => "NEW_DATA_SIGNALLED",
            Event::NewDataAccepted => "NEW_DATA_ACCEPTED",
            Event::RelationsMerged => "RELATIONS_MERGED",
            Event::RelationsFailed => "RELATIONS_FAILED",
        }
    }

    /// Only a failed bootstrap ends a session
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::BootstrapFailed)
    }

    /// Events logged above INFO
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Event::BootstrapFailed | Event::ChunkFailed | Event::RelationsFailed
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
