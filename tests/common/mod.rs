//! Shared helpers for linelist integration tests

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use linelist::index::{IndexEntry, TokenQuery};
use linelist::ingest::{Dataset, Ingestor};
use linelist::model::{Area, Case, RelationEdge, Specimen};
use linelist::storage::{
    FieldScope, MemoryStore, RecordStore, SortOrder, StoreError, StoreResult,
};

pub const AREA_RELATION: &str = "casesRelation";

// =============================================================================
// Fixtures
// =============================================================================

/// Final result of case `i`: Negative every 4th, WPV1 the next, ...
pub fn final_result(i: usize) -> &'static str {
    match i % 4 {
        0 => "Negative",
        1 => "WPV1",
        2 => "SL1 / SL3",
        _ => "VDPV2",
    }
}

/// Line list of `n` cases, `created = i`, three areas, one specimen per case
pub fn line_list(n: usize) -> Dataset {
    let areas = vec![
        Area::new("area_0", "Kano North", 0),
        Area::new("area_1", "Kano South", 0),
        Area::new("area_2", "Lagos", 0),
    ];

    let cases = (0..n)
        .map(|i| {
            let patient = if i == 6 {
                "Wpvan Kirk".to_string()
            } else {
                format!("Patient {}", i)
            };
            Case::new(case_id(i), i as i64)
                .with_area(format!("area_{}", i % 3))
                .with_field("bid", format!("BID-{:04}", i))
                .with_field("year", if i % 2 == 0 { 2024 } else { 2023 })
                .with_field("finalResult", final_result(i))
                .with_field("patientName", patient)
                .with_field("age", (i * 100) as i64)
                .with_field("adeq", if i % 3 == 0 { "INADEQ" } else { "ADEQ" })
        })
        .collect();

    let specimens = (0..n)
        .map(|i| Specimen::new(format!("spec_{:03}", i), case_id(i), i as i64))
        .collect();

    let mut dataset = Dataset {
        cases,
        specimens,
        areas,
        ..Dataset::default()
    };
    dataset.derive_area_relations(AREA_RELATION);
    dataset
}

pub fn case_id(i: usize) -> String {
    format!("case_{:03}", i)
}

/// Ids `case_{i}` for every `i` in `0..n` satisfying `pred`, sorted
pub fn ids_where(n: usize, pred: impl Fn(usize) -> bool) -> Vec<String> {
    (0..n).filter(|&i| pred(i)).map(case_id).collect()
}

/// Ingest `line_list(n)` into a fresh instrumented store
pub async fn ingested_store(n: usize) -> Arc<InstrumentedStore> {
    let store = InstrumentedStore::new();
    Ingestor::default()
        .ingest(&store, line_list(n))
        .await
        .expect("ingest fixture");
    store.reset_counters();
    Arc::new(store)
}

// =============================================================================
// Instrumented Store
// =============================================================================

/// `MemoryStore` that counts reads and can be told to fail them
#[derive(Default)]
pub struct InstrumentedStore {
    inner: MemoryStore,
    pub case_scans: AtomicUsize,
    pub counts: AtomicUsize,
    pub specimen_lookups: AtomicUsize,
    pub area_lookups: AtomicUsize,
    pub index_scans: AtomicUsize,
    pub relation_scans: AtomicUsize,
    /// Case scans at or past this offset fail
    fail_scans_from: AtomicUsize,
    fail_counts: AtomicBool,
    fail_specimens: AtomicBool,
}

impl InstrumentedStore {
    pub fn new() -> Self {
        Self {
            fail_scans_from: AtomicUsize::new(usize::MAX),
            ..Self::default()
        }
    }

    pub fn reset_counters(&self) {
        for counter in [
            &self.case_scans,
            &self.counts,
            &self.specimen_lookups,
            &self.area_lookups,
            &self.index_scans,
            &self.relation_scans,
        ] {
            counter.store(0, Ordering::SeqCst);
        }
    }

    pub fn fail_scans_from(&self, offset: usize) {
        self.fail_scans_from.store(offset, Ordering::SeqCst);
    }

    pub fn fail_counts(&self) {
        self.fail_counts.store(true, Ordering::SeqCst);
    }

    pub fn fail_specimens(&self, fail: bool) {
        self.fail_specimens.store(fail, Ordering::SeqCst);
    }

    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    fn injected(what: &str) -> StoreError {
        StoreError::Unavailable(format!("injected {} failure", what))
    }
}

impl RecordStore for InstrumentedStore {
    async fn insert_cases(&self, cases: Vec<Case>) -> StoreResult<()> {
        self.inner.insert_cases(cases).await
    }

    async fn insert_specimens(&self, specimens: Vec<Specimen>) -> StoreResult<()> {
        self.inner.insert_specimens(specimens).await
    }

    async fn insert_areas(&self, areas: Vec<Area>) -> StoreResult<()> {
        self.inner.insert_areas(areas).await
    }

    async fn insert_relations(&self, table: &str, edges: Vec<RelationEdge>) -> StoreResult<()> {
        self.inner.insert_relations(table, edges).await
    }

    async fn insert_index_entries(&self, entries: Vec<IndexEntry>) -> StoreResult<()> {
        self.inner.insert_index_entries(entries).await
    }

    async fn scan_cases(
        &self,
        scope: Option<&FieldScope>,
        order: &SortOrder,
        offset: usize,
        limit: usize,
    ) -> StoreResult<Vec<Case>> {
        self.case_scans.fetch_add(1, Ordering::SeqCst);
        if offset >= self.fail_scans_from.load(Ordering::SeqCst) {
            return Err(Self::injected("scan"));
        }
        self.inner.scan_cases(scope, order, offset, limit).await
    }

    async fn count_cases(&self, scope: Option<&FieldScope>) -> StoreResult<usize> {
        self.counts.fetch_add(1, Ordering::SeqCst);
        if self.fail_counts.load(Ordering::SeqCst) {
            return Err(Self::injected("count"));
        }
        self.inner.count_cases(scope).await
    }

    async fn specimens_of(&self, case_id: &str) -> StoreResult<Vec<Specimen>> {
        self.specimen_lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail_specimens.load(Ordering::SeqCst) {
            return Err(Self::injected("specimen"));
        }
        self.inner.specimens_of(case_id).await
    }

    async fn get_area(&self, id: &str) -> StoreResult<Option<Area>> {
        self.area_lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.get_area(id).await
    }

    async fn scan_relations(
        &self,
        table: &str,
        fk_ids: &HashSet<String>,
    ) -> StoreResult<Vec<RelationEdge>> {
        self.relation_scans.fetch_add(1, Ordering::SeqCst);
        self.inner.scan_relations(table, fk_ids).await
    }

    async fn scan_index(&self, query: &TokenQuery) -> StoreResult<Vec<IndexEntry>> {
        self.index_scans.fetch_add(1, Ordering::SeqCst);
        self.inner.scan_index(query).await
    }
}
