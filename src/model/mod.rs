//! Data model for linelist
//!
//! Entities are written once at ingestion and only read afterwards.
//!
//! # Entities
//!
//! - `Case`: the primary record browsed by a session
//! - `Specimen`: child record owned by a case through `case_id`
//! - `Area`: parent record referenced by a case through `area_id`
//! - `RelationEdge`: many-to-many join row in a named relation table
//!
//! Parent/child links are foreign-key ids only. They are resolved on demand
//! for the page window, never embedded.

mod types;

pub use types::{Area, Case, FieldBag, RelationEdge, Scalar, Specimen};
