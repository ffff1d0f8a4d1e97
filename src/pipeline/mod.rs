//! Filter pipeline subsystem for linelist
//!
//! # Stages (strict order)
//!
//! 1. Direct filter: exact/set-membership criteria on case fields
//! 2. Id-preservation filter: ids produced by a search
//! 3. Page window: a slice of the visible filtered set
//!
//! # Invariants
//!
//! - Pure in-memory work, never awaits
//! - Re-filtering with unchanged filters is a no-op on the result
//! - A chunk arriving while the user is past page 1 never shifts their page

mod filters;
mod pipeline;

pub use filters::{DirectFilter, FilterValue, IdSet};
pub use pipeline::{AppendOutcome, FilterPipeline};
