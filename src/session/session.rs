//! Browse session
//!
//! Owns one filter pipeline and drives it:
//! - bootstrap: first chunk, count, first page
//! - background chunks, applied when the caller asks
//! - direct filter, search and page transitions
//!
//! Every transition ends by publishing a `ViewSnapshot` on a watch channel.
//! Mutations take `&mut self`; the background loader only ever talks to the
//! session through its channel.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, watch};
use uuid::Uuid;

use crate::loader::{IncrementalLoader, LoadEvent, LoadedChunk};
use crate::observability::{
    log_event_with_fields, trace_event, BrowseMetrics, Event, MetricsSnapshot, ObservationScope,
};
use crate::pipeline::{DirectFilter, FilterPipeline, IdSet};
use crate::relations::{PageEntry, RelationMerger};
use crate::search::{SearchEngine, SearchRequest, SearchResult};
use crate::storage::{RecordStore, StoreError, StoreResult};

use super::config::BrowseConfig;
use super::errors::{BrowseError, BrowseResult};
use super::view::{TotalCount, ViewSnapshot};

/// Which query shape a search runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchMode {
    FullText,
    Range,
}

impl SearchMode {
    fn as_str(&self) -> &'static str {
        match self {
            SearchMode::FullText => "full_text",
            SearchMode::Range => "range",
        }
    }
}

/// One user's browsing session over a record store
pub struct BrowseSession<S: RecordStore> {
    id: String,
    opened_at: DateTime<Utc>,
    store: Arc<S>,
    config: BrowseConfig,
    pipeline: FilterPipeline,
    page: Vec<PageEntry>,
    unfiltered_total: TotalCount,
    events: Option<mpsc::Receiver<LoadEvent>>,
    all_data_loaded: bool,
    load_error: Option<StoreError>,
    loading: bool,
    view_tx: watch::Sender<ViewSnapshot>,
    metrics: BrowseMetrics,
}

impl<S: RecordStore> BrowseSession<S> {
    /// Open a session: read the first chunk and the count, merge the first
    /// page, then start loading the rest in the background.
    ///
    /// Any store failure here is fatal.
    pub async fn open(store: Arc<S>, config: BrowseConfig) -> BrowseResult<Self> {
        config.validate()?;

        let id = Uuid::new_v4().to_string();
        let scope = ObservationScope::with_fields("SESSION_OPEN", vec![("session", id.clone())]);
        let (view_tx, _) = watch::channel(ViewSnapshot::empty());

        let mut session = Self {
            id: id.clone(),
            opened_at: Utc::now(),
            store: Arc::clone(&store),
            pipeline: FilterPipeline::new(config.page_size),
            page: Vec::new(),
            unfiltered_total: TotalCount::Pending,
            events: None,
            all_data_loaded: false,
            load_error: None,
            loading: true,
            view_tx,
            metrics: BrowseMetrics::new(),
            config,
        };

        let loader = IncrementalLoader::new(store, session.config.load_plan(), id);

        let first = match loader.first_chunk().await {
            Ok(cases) => cases,
            Err(err) => return Err(session.bootstrap_failed(scope, err)),
        };
        session.metrics.record_chunk(first.len() as u64);
        session.pipeline.append(first);
        session.pipeline.recompute_full();
        session.metrics.increment_full_recomputes();
        session.publish();

        let total = match loader.count().await {
            Ok(total) => total,
            Err(err) => return Err(session.bootstrap_failed(scope, err)),
        };
        session.unfiltered_total = TotalCount::Exact(total);

        if let Err(err) = session.refresh_page().await {
            return Err(session.bootstrap_failed(scope, err));
        }

        if loader.plan().chunk_offsets(total).is_empty() {
            session.all_data_loaded = true;
        } else {
            let (events, _handle) = loader.spawn(total, session.config.prefetch_chunks);
            session.events = Some(events);
        }

        session.loading = false;
        session.publish();

        let total_str = total.to_string();
        let loaded = session.pipeline.loaded_len().to_string();
        let opened_at = session.opened_at.to_rfc3339();
        session.log(
            Event::SessionReady,
            &[
                ("loaded", loaded.as_str()),
                ("opened_at", opened_at.as_str()),
                ("total", total_str.as_str()),
            ],
        );
        scope.complete_with_fields(&[("total", total_str.as_str())]);

        Ok(session)
    }

    fn bootstrap_failed(&self, scope: ObservationScope, err: StoreError) -> BrowseError {
        let reason = err.to_string();
        scope.fail_fatal(&reason);
        self.log(
            Event::BootstrapFailed,
            &[("code", err.code()), ("reason", reason.as_str())],
        );
        BrowseError::Bootstrap(err)
    }

    // =========================================================================
    // Background loading
    // =========================================================================

    /// Wait for the next loader event and apply it.
    ///
    /// Returns false once loading is over, whether complete or failed.
    pub async fn next_chunk(&mut self) -> bool {
        let event = match self.events.as_mut() {
            Some(events) => events.recv().await,
            None => return false,
        };
        self.apply_event(event).await
    }

    /// Apply every loader event that is already waiting, without blocking.
    ///
    /// Returns the number of chunks applied.
    pub async fn drain_ready_chunks(&mut self) -> usize {
        let mut applied = 0;
        loop {
            let event = match self.events.as_mut().map(|events| events.try_recv()) {
                Some(Ok(event)) => Some(event),
                Some(Err(mpsc::error::TryRecvError::Empty)) | None => break,
                Some(Err(mpsc::error::TryRecvError::Disconnected)) => None,
            };
            if !self.apply_event(event).await {
                break;
            }
            applied += 1;
        }
        applied
    }

    /// Apply loader events until loading is over. Returns chunks applied.
    pub async fn finish_loading(&mut self) -> usize {
        let mut applied = 0;
        while self.next_chunk().await {
            applied += 1;
        }
        applied
    }

    /// Returns true if a chunk was applied
    async fn apply_event(&mut self, event: Option<LoadEvent>) -> bool {
        match event {
            Some(LoadEvent::Chunk(chunk)) => {
                self.apply_chunk(chunk).await;
                true
            }
            Some(LoadEvent::Complete) => {
                self.events = None;
                self.all_data_loaded = true;
                let loaded = self.pipeline.loaded_len().to_string();
                self.log(Event::LoadComplete, &[("loaded", loaded.as_str())]);
                self.publish();
                false
            }
            Some(LoadEvent::Failed { error, .. }) => {
                self.events = None;
                self.metrics.increment_chunk_failures();
                self.load_error = Some(error);
                self.publish();
                false
            }
            None => {
                self.events = None;
                self.metrics.increment_chunk_failures();
                self.load_error = Some(StoreError::Unavailable(
                    "loader stopped without completing".to_string(),
                ));
                self.publish();
                false
            }
        }
    }

    async fn apply_chunk(&mut self, chunk: LoadedChunk) {
        let was_signalled = self.pipeline.new_data_available();
        self.metrics.record_chunk(chunk.cases.len() as u64);

        let outcome = self.pipeline.append(chunk.cases);
        self.metrics.increment_incremental_appends();

        let offset = chunk.offset.to_string();
        let matched = outcome.matched.to_string();
        self.trace(
            Event::ChunkApplied,
            &[("offset", offset.as_str()), ("matched", matched.as_str())],
        );

        if outcome.new_data_signalled && !was_signalled {
            let filtered = self.pipeline.filtered_len().to_string();
            self.log(Event::NewDataSignalled, &[("filtered", filtered.as_str())]);
        }

        if outcome.window_changed {
            // logged as RELATIONS_FAILED, the chunk itself is kept
            let _ = self.refresh_page().await;
        }

        self.publish();
    }

    // =========================================================================
    // User operations
    // =========================================================================

    /// Replace the direct filter. `None` or an empty filter removes it.
    pub async fn apply_direct_filter(&mut self, filter: Option<DirectFilter>) -> BrowseResult<()> {
        self.begin();
        let criteria = filter.as_ref().map_or(0, DirectFilter::len).to_string();
        self.pipeline.set_direct_filter(filter);
        self.metrics.increment_full_recomputes();
        self.log(Event::FilterApplied, &[("criteria", criteria.as_str())]);

        let result = self.after_recompute().await;
        self.end(result)
    }

    /// Prefix search over text tokens. A blank query clears the search.
    pub async fn search_full_text(&mut self, request: SearchRequest) -> BrowseResult<()> {
        self.search(request, SearchMode::FullText).await
    }

    /// Exact, list or range search over numeric tokens. A blank query clears
    /// the search; a malformed one is rejected and changes nothing.
    pub async fn search_by_range(&mut self, request: SearchRequest) -> BrowseResult<()> {
        self.search(request, SearchMode::Range).await
    }

    async fn search(&mut self, request: SearchRequest, mode: SearchMode) -> BrowseResult<()> {
        self.begin();

        let ids = match self.run_search(&request, mode).await {
            Ok(ids) => ids,
            Err(err) => {
                let err = BrowseError::from(err);
                if let BrowseError::Validation(_) = &err {
                    self.metrics.increment_searches_rejected();
                    let reason = err.to_string();
                    self.log(
                        Event::SearchRejected,
                        &[("mode", mode.as_str()), ("reason", reason.as_str())],
                    );
                }
                return self.end(Err(err));
            }
        };

        self.metrics.increment_searches_executed();
        let hits = ids
            .as_ref()
            .map_or_else(|| "cleared".to_string(), |ids| ids.len().to_string());
        self.log(
            Event::SearchExecuted,
            &[("hits", hits.as_str()), ("mode", mode.as_str())],
        );

        self.pipeline.set_id_preserve(ids);
        self.metrics.increment_full_recomputes();

        let result = self.after_recompute().await;
        self.end(result)
    }

    async fn run_search(
        &self,
        request: &SearchRequest,
        mode: SearchMode,
    ) -> SearchResult<Option<IdSet>> {
        let engine = SearchEngine::new(&*self.store);
        match mode {
            SearchMode::FullText => engine.full_text(request).await,
            SearchMode::Range => engine.by_range(request).await,
        }
    }

    /// Move relative to the current page, never below page 1
    pub async fn change_page(&mut self, delta: isize) -> BrowseResult<()> {
        self.pipeline.change_page(delta);
        self.after_page_move().await
    }

    /// Jump to a 1-based page; 0 is treated as 1
    pub async fn set_page(&mut self, index: usize) -> BrowseResult<()> {
        self.pipeline.set_page(index);
        self.after_page_move().await
    }

    async fn after_page_move(&mut self) -> BrowseResult<()> {
        self.begin();
        let page = self.pipeline.page_index().to_string();
        self.log(Event::PageChanged, &[("page", page.as_str())]);
        let result = self.refresh_page().await.map_err(BrowseError::from);
        self.end(result)
    }

    /// Go back to page 1 with everything loaded so far visible
    pub async fn accept_new_data(&mut self) -> BrowseResult<()> {
        self.begin();
        self.pipeline.accept_new_data();
        self.metrics.increment_full_recomputes();
        let visible = self.pipeline.visible_len().to_string();
        self.log(Event::NewDataAccepted, &[("visible", visible.as_str())]);

        let result = self.after_recompute().await;
        self.end(result)
    }

    // =========================================================================
    // Transition helpers
    // =========================================================================

    fn begin(&mut self) {
        self.loading = true;
        self.publish();
    }

    fn end(&mut self, result: BrowseResult<()>) -> BrowseResult<()> {
        self.loading = false;
        self.publish();
        result
    }

    /// Refresh the page, then the unfiltered total if no filter is active.
    /// Both are attempted; the first error is returned.
    async fn after_recompute(&mut self) -> BrowseResult<()> {
        let page = self.refresh_page().await;
        let count = if self.pipeline.filter_active() {
            Ok(())
        } else {
            self.refresh_unfiltered_total().await
        };
        page?;
        count?;
        Ok(())
    }

    /// On failure the previous total is kept
    async fn refresh_unfiltered_total(&mut self) -> StoreResult<()> {
        let previous = self.unfiltered_total;
        self.unfiltered_total = TotalCount::Pending;
        self.publish();
        match self.store.count_cases(self.config.scope.as_ref()).await {
            Ok(total) => {
                self.unfiltered_total = TotalCount::Exact(total);
                Ok(())
            }
            Err(err) => {
                self.unfiltered_total = previous;
                Err(err)
            }
        }
    }

    /// Re-merge relations for the current page window.
    ///
    /// On failure the page keeps its cases without relations.
    async fn refresh_page(&mut self) -> StoreResult<()> {
        let window = self.pipeline.page_window();
        let merged = RelationMerger::new(&*self.store).merge(&window).await;
        match merged {
            Ok(entries) => {
                self.metrics.record_merge(entries.len() as u64);
                let records = entries.len().to_string();
                self.trace(Event::RelationsMerged, &[("records", records.as_str())]);
                self.page = entries;
                Ok(())
            }
            Err(err) => {
                let reason = err.to_string();
                self.log(
                    Event::RelationsFailed,
                    &[("code", err.code()), ("reason", reason.as_str())],
                );
                self.page = window.into_iter().map(PageEntry::bare).collect();
                Err(err)
            }
        }
    }

    fn publish(&self) {
        self.view_tx.send_replace(self.snapshot());
    }

    fn log(&self, event: Event, fields: &[(&str, &str)]) {
        let mut all = vec![("session", self.id.as_str())];
        all.extend_from_slice(fields);
        log_event_with_fields(event, &all);
    }

    fn trace(&self, event: Event, fields: &[(&str, &str)]) {
        let mut all = vec![("session", self.id.as_str())];
        all.extend_from_slice(fields);
        trace_event(event, &all);
    }

    // =========================================================================
    // View
    // =========================================================================

    /// Subscribe to view snapshots; the receiver starts at the current view
    pub fn subscribe(&self) -> watch::Receiver<ViewSnapshot> {
        self.view_tx.subscribe()
    }

    /// The current view
    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            page: self.page.clone(),
            page_index: self.pipeline.page_index(),
            page_count: self.pipeline.page_count(),
            total: self.total(),
            loaded_records: self.pipeline.loaded_len(),
            all_data_loaded: self.all_data_loaded,
            new_data_available: self.pipeline.new_data_available(),
            filter_active: self.pipeline.filter_active(),
            loading: self.loading,
        }
    }

    /// Cases of the current page with their relations
    pub fn page(&self) -> &[PageEntry] {
        &self.page
    }

    /// Filtered count while any filter is active, store count otherwise
    pub fn total(&self) -> TotalCount {
        if self.pipeline.filter_active() {
            TotalCount::Exact(self.pipeline.filtered_len())
        } else {
            self.unfiltered_total
        }
    }

    pub fn page_index(&self) -> usize {
        self.pipeline.page_index()
    }

    pub fn page_count(&self) -> usize {
        self.pipeline.page_count()
    }

    pub fn all_data_loaded(&self) -> bool {
        self.all_data_loaded
    }

    pub fn new_data_available(&self) -> bool {
        self.pipeline.new_data_available()
    }

    pub fn filter_active(&self) -> bool {
        self.pipeline.filter_active()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn loaded_len(&self) -> usize {
        self.pipeline.loaded_len()
    }

    pub fn filtered_len(&self) -> usize {
        self.pipeline.filtered_len()
    }

    /// Error that stopped background loading, if any
    pub fn load_error(&self) -> Option<&StoreError> {
        self.load_error.as_ref()
    }

    pub fn config(&self) -> &BrowseConfig {
        &self.config
    }

    pub fn session_id(&self) -> &str {
        &self.id
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}
