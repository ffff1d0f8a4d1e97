//! ObservationScope for bracketing long operations
//!
//! - Logs `{name}_BEGIN` on creation
//! - Logs `{name}_COMPLETE` (with elapsed ms) or `{name}_FAILED` when closed
//! - Logs `{name}_INCOMPLETE` if dropped without being closed, which happens
//!   when an async operation is abandoned mid-way

use std::time::Instant;

use super::logger::{Logger, Severity};

/// A scope that logs begin and end events for one operation
pub struct ObservationScope {
    name: &'static str,
    fields: Vec<(&'static str, String)>,
    timer: Timer,
    closed: bool,
}

impl ObservationScope {
    /// Open a scope, logging `{name}_BEGIN`
    pub fn new(name: &'static str) -> Self {
        Self::with_fields(name, Vec::new())
    }

    /// Open a scope whose fields are repeated on every line it logs
    pub fn with_fields(name: &'static str, fields: Vec<(&'static str, String)>) -> Self {
        let scope = Self {
            name,
            fields,
            timer: Timer::new(),
            closed: false,
        };
        scope.emit(Severity::Info, "BEGIN", &[]);
        scope
    }

    fn emit(&self, severity: Severity, suffix: &str, extra: &[(&str, &str)]) {
        let event = format!("{}_{}", self.name, suffix);
        let mut fields: Vec<(&str, &str)> =
            self.fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
        fields.extend(extra.iter().copied());
        Logger::log(severity, &event, &fields);
    }

    /// Close successfully, logging `{name}_COMPLETE` with extra fields
    pub fn complete_with_fields(mut self, extra: &[(&str, &str)]) {
        self.closed = true;
        let elapsed = self.timer.elapsed_ms();
        let mut fields: Vec<(&str, &str)> = vec![("elapsed_ms", elapsed.as_str())];
        fields.extend(extra.iter().copied());
        self.emit(Severity::Info, "COMPLETE", &fields);
    }

    /// Close successfully, logging `{name}_COMPLETE`
    pub fn complete(self) {
        self.complete_with_fields(&[]);
    }

    /// Close as failed at ERROR level
    pub fn fail(mut self, reason: &str) {
        self.closed = true;
        self.emit(Severity::Error, "FAILED", &[("reason", reason)]);
    }

    /// Close as failed at FATAL level
    pub fn fail_fatal(mut self, reason: &str) {
        self.closed = true;
        self.emit(Severity::Fatal, "FAILED", &[("reason", reason)]);
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for ObservationScope {
    fn drop(&mut self) {
        if !self.closed {
            self.emit(
                Severity::Warn,
                "INCOMPLETE",
                &[("reason", "scope dropped without completion")],
            );
        }
    }
}

/// A simple duration timer for logging elapsed time
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Elapsed milliseconds as a string
    pub fn elapsed_ms(&self) -> String {
        self.start.elapsed().as_millis().to_string()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
