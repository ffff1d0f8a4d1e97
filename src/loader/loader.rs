//! Incremental loader
//!
//! The first chunk and the count are read in the caller's task. The remaining
//! chunks are read by a background task and handed over through a bounded
//! channel; the receiver decides when to apply them. The background task
//! never touches pipeline state.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::model::Case;
use crate::observability::{log_event_with_fields, trace_event, Event};
use crate::storage::{RecordStore, StoreError, StoreResult};

use super::plan::LoadPlan;

/// One background chunk as read from the store
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedChunk {
    /// Position in the chunk plan, 0-based
    pub index: usize,
    pub offset: usize,
    pub cases: Vec<Case>,
}

/// Messages from the background loader
#[derive(Debug, Clone, PartialEq)]
pub enum LoadEvent {
    Chunk(LoadedChunk),
    /// A chunk read failed. No further events follow.
    Failed { offset: usize, error: StoreError },
    /// Every planned chunk was delivered. No further events follow.
    Complete,
}

/// Streams the primary collection from a store in bounded chunks.
pub struct IncrementalLoader<S: RecordStore> {
    store: Arc<S>,
    plan: LoadPlan,
    label: String,
}

impl<S: RecordStore> IncrementalLoader<S> {
    /// `label` tags the background task's log lines, typically a session id
    pub fn new(store: Arc<S>, plan: LoadPlan, label: impl Into<String>) -> Self {
        Self {
            store,
            plan,
            label: label.into(),
        }
    }

    pub fn plan(&self) -> &LoadPlan {
        &self.plan
    }

    /// Read the first `first_chunk_size` cases in sort order
    pub async fn first_chunk(&self) -> StoreResult<Vec<Case>> {
        self.store
            .scan_cases(
                self.plan.scope.as_ref(),
                &self.plan.order,
                0,
                self.plan.first_chunk_size,
            )
            .await
    }

    /// Count the (scoped) collection
    pub async fn count(&self) -> StoreResult<usize> {
        self.store.count_cases(self.plan.scope.as_ref()).await
    }

    /// Start reading the chunks that follow the first one.
    ///
    /// `capacity` bounds how many chunks are read ahead of the receiver. The
    /// task stops at its next send once the receiver is dropped.
    pub fn spawn(self, total: usize, capacity: usize) -> (mpsc::Receiver<LoadEvent>, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let offsets = self.plan.chunk_offsets(total);
        let handle = tokio::spawn(async move {
            self.run(offsets, tx).await;
        });
        (rx, handle)
    }

    async fn run(self, offsets: Vec<usize>, tx: mpsc::Sender<LoadEvent>) {
        for (index, offset) in offsets.into_iter().enumerate() {
            let result = self
                .store
                .scan_cases(
                    self.plan.scope.as_ref(),
                    &self.plan.order,
                    offset,
                    self.plan.chunk_size,
                )
                .await;

            let event = match result {
                Ok(cases) => {
                    let records = cases.len().to_string();
                    let offset_str = offset.to_string();
                    trace_event(
                        Event::ChunkLoaded,
                        &[
                            ("session", self.label.as_str()),
                            ("offset", offset_str.as_str()),
                            ("records", records.as_str()),
                        ],
                    );
                    LoadEvent::Chunk(LoadedChunk {
                        index,
                        offset,
                        cases,
                    })
                }
                Err(error) => {
                    let offset_str = offset.to_string();
                    let reason = error.to_string();
                    log_event_with_fields(
                        Event::ChunkFailed,
                        &[
                            ("session", self.label.as_str()),
                            ("offset", offset_str.as_str()),
                            ("code", error.code()),
                            ("reason", reason.as_str()),
                        ],
                    );
                    let _ = tx.send(LoadEvent::Failed { offset, error }).await;
                    return;
                }
            };

            if tx.send(event).await.is_err() {
                return;
            }
        }

        let _ = tx.send(LoadEvent::Complete).await;
    }
}
