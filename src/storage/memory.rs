//! In-memory record store
//!
//! Reference implementation of `RecordStore`. Tables live behind one
//! `tokio::sync::RwLock`; nothing is persisted.
//!
//! Ordered case scans use a cached sort permutation per sort field, built on
//! first use and dropped whenever cases are inserted. Ordering is by the
//! field's token (missing values first), ties broken by case id.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::index::{IndexEntry, Token, TokenIndex, TokenQuery};
use crate::model::{Area, Case, RelationEdge, Specimen};

use super::errors::{StoreError, StoreResult};
use super::store::{FieldScope, RecordStore, SortDirection, SortOrder};

/// A named relation table with an `fk_id` secondary index
#[derive(Debug, Default)]
struct RelationTable {
    edges: Vec<RelationEdge>,
    by_fk: BTreeMap<String, Vec<usize>>,
}

impl RelationTable {
    fn insert(&mut self, edge: RelationEdge) {
        let pos = self.edges.len();
        self.by_fk.entry(edge.fk_id.clone()).or_default().push(pos);
        self.edges.push(edge);
    }
}

#[derive(Debug, Default)]
struct Tables {
    cases: Vec<Case>,
    case_pos: HashMap<String, usize>,
    sorted: HashMap<String, Arc<Vec<usize>>>,
    specimens: Vec<Specimen>,
    specimen_ids: HashSet<String>,
    specimens_by_case: HashMap<String, Vec<usize>>,
    areas: BTreeMap<String, Area>,
    relations: HashMap<String, RelationTable>,
    index: TokenIndex,
}

impl Tables {
    fn build_permutation(&self, field: &str) -> Vec<usize> {
        let mut keyed: Vec<(Option<Token>, &str, usize)> = self
            .cases
            .iter()
            .enumerate()
            .map(|(pos, case)| {
                let key = case.field(field).map(|v| Token::from_scalar(&v));
                (key, case.id.as_str(), pos)
            })
            .collect();
        keyed.sort();
        keyed.into_iter().map(|(_, _, pos)| pos).collect()
    }
}

/// Takes one page of scoped cases from an ordered position iterator
fn page_of<'a>(
    cases: &[Case],
    positions: impl Iterator<Item = &'a usize>,
    scope: Option<&FieldScope>,
    offset: usize,
    limit: usize,
) -> Vec<Case> {
    positions
        .map(|&pos| &cases[pos])
        .filter(|case| scope.map_or(true, |s| s.contains(case)))
        .skip(offset)
        .take(limit)
        .cloned()
        .collect()
}

/// In-memory `RecordStore`
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of index entries held
    pub async fn index_len(&self) -> usize {
        self.tables.read().await.index.len()
    }

    async fn sort_permutation(&self, field: &str) -> Arc<Vec<usize>> {
        {
            let tables = self.tables.read().await;
            if let Some(perm) = tables.sorted.get(field) {
                return Arc::clone(perm);
            }
        }
        let mut tables = self.tables.write().await;
        let perm = Arc::new(tables.build_permutation(field));
        tables.sorted.insert(field.to_string(), Arc::clone(&perm));
        perm
    }
}

impl RecordStore for MemoryStore {
    async fn insert_cases(&self, cases: Vec<Case>) -> StoreResult<()> {
        let mut tables = self.tables.write().await;

        let mut batch_ids = HashSet::with_capacity(cases.len());
        for case in &cases {
            if tables.case_pos.contains_key(&case.id) || !batch_ids.insert(case.id.as_str()) {
                return Err(StoreError::DuplicateKey {
                    entity: "case",
                    id: case.id.clone(),
                });
            }
        }

        for case in cases {
            let pos = tables.cases.len();
            tables.case_pos.insert(case.id.clone(), pos);
            tables.cases.push(case);
        }
        tables.sorted.clear();
        Ok(())
    }

    async fn insert_specimens(&self, specimens: Vec<Specimen>) -> StoreResult<()> {
        let mut tables = self.tables.write().await;

        let mut batch_ids = HashSet::with_capacity(specimens.len());
        for specimen in &specimens {
            if tables.specimen_ids.contains(&specimen.id)
                || !batch_ids.insert(specimen.id.as_str())
            {
                return Err(StoreError::DuplicateKey {
                    entity: "specimen",
                    id: specimen.id.clone(),
                });
            }
        }

        for specimen in specimens {
            let pos = tables.specimens.len();
            tables.specimen_ids.insert(specimen.id.clone());
            tables
                .specimens_by_case
                .entry(specimen.case_id.clone())
                .or_default()
                .push(pos);
            tables.specimens.push(specimen);
        }
        Ok(())
    }

    async fn insert_areas(&self, areas: Vec<Area>) -> StoreResult<()> {
        let mut tables = self.tables.write().await;

        let mut batch_ids = HashSet::with_capacity(areas.len());
        for area in &areas {
            if tables.areas.contains_key(&area.id) || !batch_ids.insert(area.id.as_str()) {
                return Err(StoreError::DuplicateKey {
                    entity: "area",
                    id: area.id.clone(),
                });
            }
        }

        for area in areas {
            tables.areas.insert(area.id.clone(), area);
        }
        Ok(())
    }

    async fn insert_relations(&self, table: &str, edges: Vec<RelationEdge>) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let relation = tables.relations.entry(table.to_string()).or_default();
        for edge in edges {
            relation.insert(edge);
        }
        Ok(())
    }

    async fn insert_index_entries(&self, entries: Vec<IndexEntry>) -> StoreResult<()> {
        self.tables.write().await.index.extend(entries);
        Ok(())
    }

    async fn scan_cases(
        &self,
        scope: Option<&FieldScope>,
        order: &SortOrder,
        offset: usize,
        limit: usize,
    ) -> StoreResult<Vec<Case>> {
        let perm = self.sort_permutation(&order.field).await;
        let tables = self.tables.read().await;

        let page = match order.direction {
            SortDirection::Asc => page_of(&tables.cases, perm.iter(), scope, offset, limit),
            SortDirection::Desc => page_of(&tables.cases, perm.iter().rev(), scope, offset, limit),
        };
        Ok(page)
    }

    async fn count_cases(&self, scope: Option<&FieldScope>) -> StoreResult<usize> {
        let tables = self.tables.read().await;
        let count = match scope {
            Some(scope) => tables.cases.iter().filter(|c| scope.contains(c)).count(),
            None => tables.cases.len(),
        };
        Ok(count)
    }

    async fn specimens_of(&self, case_id: &str) -> StoreResult<Vec<Specimen>> {
        let tables = self.tables.read().await;
        let specimens = tables
            .specimens_by_case
            .get(case_id)
            .map(|positions| {
                positions
                    .iter()
                    .map(|&pos| tables.specimens[pos].clone())
                    .collect()
            })
            .unwrap_or_default();
        Ok(specimens)
    }

    async fn get_area(&self, id: &str) -> StoreResult<Option<Area>> {
        Ok(self.tables.read().await.areas.get(id).cloned())
    }

    async fn scan_relations(
        &self,
        table: &str,
        fk_ids: &HashSet<String>,
    ) -> StoreResult<Vec<RelationEdge>> {
        let tables = self.tables.read().await;
        let relation = tables
            .relations
            .get(table)
            .ok_or_else(|| StoreError::UnknownRelation(table.to_string()))?;

        let mut positions: Vec<usize> = fk_ids
            .iter()
            .filter_map(|fk| relation.by_fk.get(fk))
            .flat_map(|positions| positions.iter().copied())
            .collect();
        positions.sort_unstable();

        Ok(positions
            .into_iter()
            .map(|pos| relation.edges[pos].clone())
            .collect())
    }

    async fn scan_index(&self, query: &TokenQuery) -> StoreResult<Vec<IndexEntry>> {
        let tables = self.tables.read().await;
        Ok(tables.index.query(query).into_iter().cloned().collect())
    }
}
