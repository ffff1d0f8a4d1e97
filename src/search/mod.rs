//! Search subsystem for linelist
//!
//! Turns a user query into the id set consumed by the filter pipeline's
//! id-preservation stage.
//!
//! # Invariants
//!
//! - Malformed numeric queries are rejected before any store access
//! - A blank query clears the id filter without touching the index
//! - Text tokens never answer numeric queries and vice versa

mod engine;
mod errors;
mod query;

pub use engine::{SearchEngine, SearchRequest};
pub use errors::{SearchError, SearchResult};
pub use query::parse_numeric_query;
