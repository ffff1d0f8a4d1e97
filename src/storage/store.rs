//! Record store contract
//!
//! The engine consumes an ordered store with secondary indexes. Every call
//! is a suspension point; nothing else in the engine awaits.

use std::collections::HashSet;
use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::index::{IndexEntry, TokenQuery};
use crate::model::{Area, Case, RelationEdge, Scalar, Specimen};

use super::errors::StoreResult;

/// Scan direction over a sort key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// Sort key and direction for ordered case scans
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrder {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortOrder {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        Self::descending("created")
    }
}

/// Equality restriction on a case field, e.g. `year = 2024`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldScope {
    pub field: String,
    pub value: Scalar,
}

impl FieldScope {
    pub fn new(field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Checks whether a case falls inside the scope
    pub fn contains(&self, case: &Case) -> bool {
        case.field(&self.field)
            .map(|v| *v == self.value)
            .unwrap_or(false)
    }
}

/// Ordered store of cases, specimens, areas, relation tables and index entries.
pub trait RecordStore: Send + Sync + 'static {
    /// Bulk insert cases
    fn insert_cases(&self, cases: Vec<Case>) -> impl Future<Output = StoreResult<()>> + Send;

    /// Bulk insert specimens
    fn insert_specimens(
        &self,
        specimens: Vec<Specimen>,
    ) -> impl Future<Output = StoreResult<()>> + Send;

    /// Bulk insert areas
    fn insert_areas(&self, areas: Vec<Area>) -> impl Future<Output = StoreResult<()>> + Send;

    /// Bulk insert edges into a named relation table, creating it if needed
    fn insert_relations(
        &self,
        table: &str,
        edges: Vec<RelationEdge>,
    ) -> impl Future<Output = StoreResult<()>> + Send;

    /// Bulk insert index entries
    fn insert_index_entries(
        &self,
        entries: Vec<IndexEntry>,
    ) -> impl Future<Output = StoreResult<()>> + Send;

    /// Ordered range scan of cases, optionally restricted to a scope.
    ///
    /// Descending order reverses the scan; `offset` and `limit` apply after it.
    fn scan_cases(
        &self,
        scope: Option<&FieldScope>,
        order: &SortOrder,
        offset: usize,
        limit: usize,
    ) -> impl Future<Output = StoreResult<Vec<Case>>> + Send;

    /// Number of cases, optionally restricted to a scope
    fn count_cases(
        &self,
        scope: Option<&FieldScope>,
    ) -> impl Future<Output = StoreResult<usize>> + Send;

    /// Equality scan of specimens on their owning case id
    fn specimens_of(
        &self,
        case_id: &str,
    ) -> impl Future<Output = StoreResult<Vec<Specimen>>> + Send;

    /// Primary key lookup of an area
    fn get_area(&self, id: &str) -> impl Future<Output = StoreResult<Option<Area>>> + Send;

    /// Edges of a relation table whose `fk_id` is in `fk_ids`
    fn scan_relations(
        &self,
        table: &str,
        fk_ids: &HashSet<String>,
    ) -> impl Future<Output = StoreResult<Vec<RelationEdge>>> + Send;

    /// Index entries answering a token query, in insertion order
    fn scan_index(
        &self,
        query: &TokenQuery,
    ) -> impl Future<Output = StoreResult<Vec<IndexEntry>>> + Send;
}
