//! Ingestion for linelist
//!
//! Writes a dataset into a record store once, deriving the token index from
//! a declared plan on the way.
//!
//! # Invariants
//!
//! - Specimens must reference a case of the same dataset
//! - Only declared properties are tokenized
//! - Entities are never rewritten after ingestion

mod dataset;
mod errors;
mod ingestor;
mod plan;

pub use dataset::Dataset;
pub use errors::{IngestError, IngestResult};
pub use ingestor::{IngestReport, Ingestor};
pub use plan::{IndexPlan, IndexedProperty, PropertySource};
