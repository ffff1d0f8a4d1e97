//! Observability subsystem for linelist
//!
//! - Structured logging (JSON lines)
//! - Per-session counters
//! - Typed lifecycle events
//!
//! # Principles
//!
//! 1. Observability is read-only: it never changes pipeline state
//! 2. Logging failures are swallowed, never surfaced
//! 3. Deterministic output: fixed key ordering
//!
//! # Usage
//!
//! ```ignore
//! use linelist::observability::{log_event_with_fields, Event, ObservationScope};
//!
//! log_event_with_fields(Event::ChunkLoaded, &[("records", "10000")]);
//!
//! let scope = ObservationScope::new("INGEST");
//! // ... do work ...
//! scope.complete();
//! ```

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{BrowseMetrics, MetricsSnapshot};
pub use scope::{ObservationScope, Timer};

fn severity_of(event: Event) -> Severity {
    if event.is_fatal() {
        Severity::Fatal
    } else if event.is_failure() {
        Severity::Error
    } else {
        Severity::Info
    }
}

/// Log a lifecycle event
pub fn log_event(event: Event) {
    Logger::log(severity_of(event), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(severity_of(event), event.as_str(), fields);
}

/// Log a lifecycle event at TRACE level, for high-frequency events
pub fn trace_event(event: Event, fields: &[(&str, &str)]) {
    Logger::trace(event.as_str(), fields);
}
