//! Browse Session Tests
//!
//! End-to-end behavior of a session over an ingested store:
//! - Bootstrap, background chunks and completion
//! - Direct filters staying valid while chunks arrive
//! - New-data signalling past page 1
//! - Relation merging bounded by the page size
//! - Failure handling during bootstrap and background loading

mod common;

use std::sync::Arc;

use common::{ids_where, ingested_store, InstrumentedStore};
use linelist::pipeline::DirectFilter;
use linelist::session::{BrowseConfig, BrowseError, BrowseSession, TotalCount};
use linelist::storage::{FieldScope, SortOrder};

// =============================================================================
// Helper Functions
// =============================================================================

fn config(first: usize, chunk: usize) -> BrowseConfig {
    BrowseConfig::default().with_chunks(first, chunk)
}

fn page_ids(session: &BrowseSession<InstrumentedStore>) -> Vec<String> {
    session.page().iter().map(|e| e.case.id.clone()).collect()
}

fn sorted(mut ids: Vec<String>) -> Vec<String> {
    ids.sort();
    ids
}

// =============================================================================
// Loading Tests
// =============================================================================

/// Default order is newest first, read as a descending scan.
#[tokio::test]
async fn test_first_page_newest_first() {
    let store = ingested_store(30).await;
    let session = BrowseSession::open(store, config(10, 10)).await.unwrap();

    assert_eq!(session.loaded_len(), 10);
    assert_eq!(session.total(), TotalCount::Exact(30));
    assert_eq!(page_ids(&session)[0], "case_029");
    assert_eq!(page_ids(&session)[9], "case_020");
}

/// Ascending order starts from the oldest case.
#[tokio::test]
async fn test_ascending_order() {
    let store = ingested_store(30).await;
    let config = config(10, 10).with_sort(SortOrder::ascending("created"));
    let session = BrowseSession::open(store, config).await.unwrap();

    assert_eq!(page_ids(&session)[0], "case_000");
}

/// All chunks are read once, in order, and completion is flagged.
#[tokio::test]
async fn test_load_to_completion() {
    let store = ingested_store(45).await;
    let mut session = BrowseSession::open(Arc::clone(&store), config(10, 10)).await.unwrap();
    assert!(!session.all_data_loaded());

    assert_eq!(session.finish_loading().await, 4);
    assert!(session.all_data_loaded());
    assert_eq!(session.loaded_len(), 45);

    // first chunk + 4 background chunks, never re-read
    assert_eq!(InstrumentedStore::get(&store.case_scans), 5);
    assert_eq!(session.metrics().chunks_loaded, 5);
}

/// Ready chunks can be applied without waiting for the rest.
#[tokio::test]
async fn test_drain_ready_chunks() {
    let store = ingested_store(40).await;
    let mut session = BrowseSession::open(store, config(10, 10)).await.unwrap();

    let mut applied = 0;
    while !session.all_data_loaded() {
        applied += session.drain_ready_chunks().await;
        tokio::task::yield_now().await;
    }
    assert_eq!(applied, 3);
    assert_eq!(session.loaded_len(), 40);
}

/// Scoped sessions load and count only the scope.
#[tokio::test]
async fn test_scoped_session() {
    let store = ingested_store(30).await;
    let config = config(5, 5).with_scope(FieldScope::new("year", 2024));
    let mut session = BrowseSession::open(store, config).await.unwrap();

    assert_eq!(session.total(), TotalCount::Exact(15));
    session.finish_loading().await;
    assert_eq!(session.loaded_len(), 15);
    assert!(session
        .page()
        .iter()
        .all(|e| e.case.fields.get("year").and_then(|v| v.as_number()) == Some(2024.0)));
}

// =============================================================================
// Filter Tests
// =============================================================================

/// 12 records, chunks of 10, filter before the last chunk arrives.
#[tokio::test]
async fn test_filter_stays_valid_across_chunks() {
    let store = ingested_store(12).await;
    let mut session = BrowseSession::open(store, config(10, 10)).await.unwrap();

    let filter = DirectFilter::new().equals("finalResult", "Negative");
    session.apply_direct_filter(Some(filter)).await.unwrap();
    assert_eq!(session.total().to_string(), "2");

    assert!(session.next_chunk().await);
    assert_eq!(session.total().to_string(), "3");
    assert_eq!(
        sorted(page_ids(&session)),
        ids_where(12, |i| i % 4 == 0)
    );
}

/// Set-membership filter with type-strict matching.
#[tokio::test]
async fn test_set_membership_filter() {
    let store = ingested_store(20).await;
    let mut session = BrowseSession::open(store, config(100, 100)).await.unwrap();

    let filter = DirectFilter::new().any_of("finalResult", ["WPV1", "VDPV2"]);
    session.apply_direct_filter(Some(filter)).await.unwrap();
    assert_eq!(session.total(), TotalCount::Exact(10));

    let filter = DirectFilter::new().equals("year", "2024");
    session.apply_direct_filter(Some(filter)).await.unwrap();
    assert_eq!(session.total(), TotalCount::Exact(0));
}

/// Removing the filter restores the store count.
#[tokio::test]
async fn test_clear_filter_restores_store_total() {
    let store = ingested_store(30).await;
    let mut session = BrowseSession::open(Arc::clone(&store), config(10, 10)).await.unwrap();

    let filter = DirectFilter::new().equals("adeq", "INADEQ");
    session.apply_direct_filter(Some(filter)).await.unwrap();
    assert!(session.filter_active());

    let counts_before = InstrumentedStore::get(&store.counts);
    session.apply_direct_filter(Some(DirectFilter::new())).await.unwrap();
    assert!(!session.filter_active());
    assert_eq!(session.total(), TotalCount::Exact(30));
    assert_eq!(InstrumentedStore::get(&store.counts), counts_before + 1);
}

// =============================================================================
// Pagination Tests
// =============================================================================

/// Chunks arriving while on page 1 never reorder what is shown.
#[tokio::test]
async fn test_first_page_stable_while_loading() {
    let store = ingested_store(40).await;
    let mut session = BrowseSession::open(store, config(20, 10)).await.unwrap();
    let before = page_ids(&session);

    session.finish_loading().await;
    assert_eq!(page_ids(&session), before);
    assert!(!session.new_data_available());
}

/// Chunks arriving past page 1 are signalled, not shown.
#[tokio::test]
async fn test_new_data_signalled_past_first_page() {
    let store = ingested_store(50).await;
    let mut session = BrowseSession::open(store, config(20, 10)).await.unwrap();
    let mut view = session.subscribe();

    session.set_page(2).await.unwrap();
    let before = page_ids(&session);
    let pages_before = session.page_count();

    assert!(session.next_chunk().await);
    assert!(session.new_data_available());
    assert_eq!(page_ids(&session), before);
    assert_eq!(session.page_count(), pages_before);
    assert!(view.borrow_and_update().new_data_available);

    session.accept_new_data().await.unwrap();
    assert!(!session.new_data_available());
    assert_eq!(session.page_index(), 1);
    assert_eq!(session.page_count(), 3);
}

/// Page windows follow min(P, max(0, S - (page - 1) * P)).
#[tokio::test]
async fn test_page_window_lengths() {
    let store = ingested_store(23).await;
    let mut session = BrowseSession::open(store, config(100, 100)).await.unwrap();

    for (page, expected) in [(1, 10), (2, 10), (3, 3), (4, 0)] {
        session.set_page(page).await.unwrap();
        assert_eq!(session.page().len(), expected, "page {}", page);
    }
}

// =============================================================================
// Relation Merge Tests
// =============================================================================

/// Merging touches the page window only, whatever the filtered size.
#[tokio::test]
async fn test_merge_bounded_by_page_size() {
    let store = ingested_store(200).await;
    let mut session = BrowseSession::open(Arc::clone(&store), config(200, 100)).await.unwrap();
    assert_eq!(InstrumentedStore::get(&store.specimen_lookups), 10);

    store.reset_counters();
    let filter = DirectFilter::new().any_of("finalResult", ["Negative", "WPV1", "VDPV2"]);
    session.apply_direct_filter(Some(filter)).await.unwrap();
    assert_eq!(session.total(), TotalCount::Exact(150));
    assert_eq!(InstrumentedStore::get(&store.specimen_lookups), 10);
    assert_eq!(InstrumentedStore::get(&store.area_lookups), 10);

    let entry = &session.page()[0];
    assert_eq!(entry.specimens.len(), 1);
    assert!(entry.area.is_some());
}

/// A merge failure during a user operation is returned; the page keeps its
/// cases without relations.
#[tokio::test]
async fn test_merge_failure_returned_to_caller() {
    let store = ingested_store(30).await;
    let mut session = BrowseSession::open(Arc::clone(&store), config(30, 10)).await.unwrap();

    store.fail_specimens(true);
    let err = session.set_page(2).await.unwrap_err();
    assert!(matches!(err, BrowseError::Store(_)));
    assert!(!err.is_fatal());
    assert_eq!(session.page().len(), 10);
    assert!(session.page().iter().all(|e| e.specimens.is_empty()));
    assert!(!session.loading());

    store.fail_specimens(false);
    session.set_page(2).await.unwrap();
    assert!(session.page().iter().all(|e| e.specimens.len() == 1));
}

// =============================================================================
// Failure Tests
// =============================================================================

/// First chunk failure is fatal.
#[tokio::test]
async fn test_first_chunk_failure_is_fatal() {
    let store = ingested_store(30).await;
    store.fail_scans_from(0);

    let err = BrowseSession::open(store, config(10, 10)).await.err().unwrap();
    assert!(matches!(err, BrowseError::Bootstrap(_)));
    assert!(err.is_fatal());
}

/// Count failure is fatal.
#[tokio::test]
async fn test_count_failure_is_fatal() {
    let store = ingested_store(30).await;
    store.fail_counts();

    let err = BrowseSession::open(store, config(10, 10)).await.err().unwrap();
    assert_eq!(err.code(), "LINELIST_SESSION_BOOTSTRAP");
}

/// First-page merge failure is fatal.
#[tokio::test]
async fn test_first_page_merge_failure_is_fatal() {
    let store = ingested_store(30).await;
    store.fail_specimens(true);

    let err = BrowseSession::open(store, config(10, 10)).await.err().unwrap();
    assert!(matches!(err, BrowseError::Bootstrap(_)));
    assert!(err.is_fatal());
}

/// A failed recount keeps the last known total.
#[tokio::test]
async fn test_count_failure_keeps_previous_total() {
    let store = ingested_store(30).await;
    let mut session = BrowseSession::open(Arc::clone(&store), config(10, 10))
        .await
        .unwrap();
    assert_eq!(session.total(), TotalCount::Exact(30));

    store.fail_counts();
    let err = session.apply_direct_filter(None).await.err().unwrap();
    assert!(matches!(err, BrowseError::Store(_)));
    assert!(!err.is_fatal());
    assert_eq!(session.total(), TotalCount::Exact(30));
}

/// Background chunk failure stops loading; the session keeps working.
#[tokio::test]
async fn test_background_failure_keeps_session() {
    let store = ingested_store(35).await;
    store.fail_scans_from(20);
    let mut session = BrowseSession::open(store, config(10, 10)).await.unwrap();

    assert_eq!(session.finish_loading().await, 1);
    assert!(!session.all_data_loaded());
    assert!(session.load_error().is_some());
    assert_eq!(session.loaded_len(), 20);
    assert_eq!(session.metrics().chunk_failures, 1);

    session.set_page(2).await.unwrap();
    assert_eq!(session.page().len(), 10);
}
