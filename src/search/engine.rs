//! Search query engine
//!
//! Executes prefix-text and numeric queries against the token index and
//! reduces the hits to a set of case ids. With a relation table the hit
//! object ids are foreign keys, resolved to the edges' reference ids.

use std::collections::HashSet;

use crate::index::{IndexEntry, TokenQuery};
use crate::pipeline::IdSet;
use crate::storage::RecordStore;

use super::errors::SearchResult;
use super::query::parse_numeric_query;

/// One search as issued by the user
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    /// Restrict hits to these index properties. `None` means all.
    pub properties: Option<Vec<String>>,
    /// Relation table mapping hit object ids to case ids
    pub relation_table: Option<String>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn with_properties<P: Into<String>>(mut self, properties: impl IntoIterator<Item = P>) -> Self {
        self.properties = Some(properties.into_iter().map(Into::into).collect());
        self
    }

    pub fn through_relation(mut self, table: impl Into<String>) -> Self {
        self.relation_table = Some(table.into());
        self
    }

    /// Blank queries clear the search instead of running it
    pub fn is_blank(&self) -> bool {
        self.query.trim().is_empty()
    }
}

/// Stateless query executor over a record store.
pub struct SearchEngine<'a, S: RecordStore> {
    store: &'a S,
}

impl<'a, S: RecordStore> SearchEngine<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Case-insensitive prefix search over text tokens.
    ///
    /// Returns `None` for a blank query, meaning "no id filter".
    pub async fn full_text(&self, request: &SearchRequest) -> SearchResult<Option<IdSet>> {
        if request.is_blank() {
            return Ok(None);
        }
        let query = TokenQuery::Prefix(request.query.clone());
        self.execute(&query, request).await.map(Some)
    }

    /// Exact, list or inclusive range search over numeric tokens.
    ///
    /// The query is validated before the store is touched. Returns `None`
    /// for a blank query.
    pub async fn by_range(&self, request: &SearchRequest) -> SearchResult<Option<IdSet>> {
        if request.is_blank() {
            return Ok(None);
        }
        let query = parse_numeric_query(&request.query)?;
        self.execute(&query, request).await.map(Some)
    }

    async fn execute(&self, query: &TokenQuery, request: &SearchRequest) -> SearchResult<IdSet> {
        let entries = self.store.scan_index(query).await?;
        let object_ids = restrict(entries, request.properties.as_deref());

        match &request.relation_table {
            None => Ok(object_ids),
            Some(table) => {
                let edges = self.store.scan_relations(table, &object_ids).await?;
                Ok(edges.into_iter().map(|edge| edge.reference_id).collect())
            }
        }
    }
}

fn restrict(entries: Vec<IndexEntry>, properties: Option<&[String]>) -> IdSet {
    match properties {
        None => entries.into_iter().map(|e| e.object_id).collect(),
        Some(properties) => {
            let allowed: HashSet<&str> = properties.iter().map(String::as_str).collect();
            entries
                .into_iter()
                .filter(|e| allowed.contains(e.property.as_str()))
                .map(|e| e.object_id)
                .collect()
        }
    }
}
