//! Search index subsystem for linelist
//!
//! The index is derived state written once at ingestion.
//!
//! # Design Principles
//!
//! - Additive: entries are never rewritten or de-duplicated
//! - Deterministic: BTreeMap iteration order, positions sorted ascending
//! - Typed tokens: numeric tokens only answer numeric queries, text tokens
//!   only answer prefix queries

mod token;
mod tokenizer;
mod tree;

pub use token::{IndexEntry, Token};
pub use tokenizer::{index, tokenize};
pub use tree::{TokenIndex, TokenQuery};
