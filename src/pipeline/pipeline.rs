//! Filter pipeline
//!
//! Stages, in strict order:
//! 1. Direct filter (field criteria)
//! 2. Id-preservation filter (search result ids)
//! 3. Pagination window over the visible prefix of the filtered set
//!
//! Two code paths keep the stages current:
//! - Full recompute, on any filter change: every loaded case is re-tested
//! - Incremental append, on chunk arrival: only the new cases are tested
//!
//! The filtered set is a list of positions into `records`. Appends only ever
//! add positions at the end, so the set materialized for viewing is always a
//! prefix of it (`visible_len`).

use std::sync::Arc;

use crate::model::Case;

use super::filters::{DirectFilter, IdSet};

/// What an incremental append changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AppendOutcome {
    /// Cases added to `records`
    pub appended: usize,
    /// Of those, cases that passed both filters
    pub matched: usize,
    /// The current page window now holds different cases
    pub window_changed: bool,
    /// Growth was held back and signalled instead
    pub new_data_signalled: bool,
}

/// In-memory filtered and paginated view over loaded cases.
#[derive(Debug)]
pub struct FilterPipeline {
    records: Vec<Arc<Case>>,
    direct_filter: Option<DirectFilter>,
    id_preserve: Option<IdSet>,
    filtered: Vec<usize>,
    visible_len: usize,
    page_index: usize,
    page_size: usize,
    new_data_available: bool,
}

impl FilterPipeline {
    /// Creates an empty pipeline. A zero page size is treated as 1.
    pub fn new(page_size: usize) -> Self {
        Self {
            records: Vec::new(),
            direct_filter: None,
            id_preserve: None,
            filtered: Vec::new(),
            visible_len: 0,
            page_index: 1,
            page_size: page_size.max(1),
            new_data_available: false,
        }
    }

    fn matches(&self, case: &Case) -> bool {
        let direct_ok = self
            .direct_filter
            .as_ref()
            .map_or(true, |filter| filter.matches(case));
        let ids_ok = self
            .id_preserve
            .as_ref()
            .map_or(true, |ids| ids.contains(&case.id));
        direct_ok && ids_ok
    }

    // =========================================================================
    // Filter transitions (full recompute)
    // =========================================================================

    /// Replace the direct filter. An empty filter counts as none.
    pub fn set_direct_filter(&mut self, filter: Option<DirectFilter>) {
        self.direct_filter = filter.filter(|f| !f.is_empty());
        self.page_index = 1;
        self.recompute_full();
    }

    /// Replace the id-preservation set
    pub fn set_id_preserve(&mut self, ids: Option<IdSet>) {
        self.id_preserve = ids;
        self.page_index = 1;
        self.recompute_full();
    }

    /// Re-test every loaded case and make the whole filtered set visible.
    ///
    /// Keeps the page index; filter transitions reset it themselves.
    pub fn recompute_full(&mut self) {
        let filtered: Vec<usize> = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, case)| self.matches(case))
            .map(|(pos, _)| pos)
            .collect();
        self.filtered = filtered;
        self.visible_len = self.filtered.len();
        self.new_data_available = false;
    }

    /// Go back to page 1 with everything loaded so far visible
    pub fn accept_new_data(&mut self) {
        self.page_index = 1;
        self.recompute_full();
    }

    // =========================================================================
    // Chunk arrival (incremental append)
    // =========================================================================

    /// Append loaded cases, testing only the new ones.
    ///
    /// Growth of the filtered set becomes visible immediately while nothing is
    /// visible yet or while on page 1, which also clears `new_data_available`.
    /// On any later page the visible prefix is frozen and the flag is raised
    /// instead.
    pub fn append(&mut self, cases: Vec<Case>) -> AppendOutcome {
        let start = self.records.len();
        self.records.extend(cases.into_iter().map(Arc::new));

        let mut outcome = AppendOutcome {
            appended: self.records.len() - start,
            ..AppendOutcome::default()
        };

        for pos in start..self.records.len() {
            if self.matches(&self.records[pos]) {
                self.filtered.push(pos);
                outcome.matched += 1;
            }
        }

        if self.visible_len == self.filtered.len() {
            return outcome;
        }

        if self.visible_len == 0 || self.page_index == 1 {
            let before = self.window_bounds();
            self.visible_len = self.filtered.len();
            self.new_data_available = false;
            outcome.window_changed = self.window_bounds() != before;
        } else {
            self.new_data_available = true;
            outcome.new_data_signalled = true;
        }

        outcome
    }

    // =========================================================================
    // Pagination
    // =========================================================================

    /// Move to a 1-based page. Indices below 1 clamp to 1.
    pub fn set_page(&mut self, index: usize) {
        self.page_index = index.max(1);
    }

    /// Move relative to the current page, never below page 1
    pub fn change_page(&mut self, delta: isize) {
        let target = if delta < 0 {
            self.page_index.saturating_sub(delta.unsigned_abs())
        } else {
            self.page_index.saturating_add(delta.unsigned_abs())
        };
        self.set_page(target);
    }

    /// Bounds of the current page within the visible prefix
    fn window_bounds(&self) -> (usize, usize) {
        let start = (self.page_index - 1)
            .saturating_mul(self.page_size)
            .min(self.visible_len);
        let end = self
            .page_index
            .saturating_mul(self.page_size)
            .min(self.visible_len);
        (start, end)
    }

    /// Cases of the current page; empty past the last page
    pub fn page_window(&self) -> Vec<Arc<Case>> {
        let (start, end) = self.window_bounds();
        self.filtered[start..end]
            .iter()
            .map(|&pos| Arc::clone(&self.records[pos]))
            .collect()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of visible pages (at least 1)
    pub fn page_count(&self) -> usize {
        self.visible_len.div_ceil(self.page_size).max(1)
    }

    /// Cases loaded so far
    pub fn loaded_len(&self) -> usize {
        self.records.len()
    }

    /// Cases passing both filters
    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    /// Filtered cases materialized for viewing
    pub fn visible_len(&self) -> usize {
        self.visible_len
    }

    pub fn new_data_available(&self) -> bool {
        self.new_data_available
    }

    /// True when either filter stage narrows the loaded cases
    pub fn filter_active(&self) -> bool {
        self.direct_filter.is_some() || self.id_preserve.is_some()
    }

    pub fn direct_filter(&self) -> Option<&DirectFilter> {
        self.direct_filter.as_ref()
    }

    pub fn id_preserve(&self) -> Option<&IdSet> {
        self.id_preserve.as_ref()
    }

    /// Ids of every filtered case, in load order
    pub fn filtered_ids(&self) -> Vec<&str> {
        self.filtered
            .iter()
            .map(|&pos| self.records[pos].id.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cases(range: std::ops::Range<usize>) -> Vec<Case> {
        range
            .map(|i| {
                let result = if i % 4 == 0 { "Negative" } else { "SL1" };
                Case::new(format!("c{}", i), i as i64).with_field("finalResult", result)
            })
            .collect()
    }

    fn ids(window: &[Arc<Case>]) -> Vec<String> {
        window.iter().map(|c| c.id.clone()).collect()
    }

    fn negative() -> Option<DirectFilter> {
        Some(DirectFilter::new().equals("finalResult", "Negative"))
    }

    #[test]
    fn test_first_append_becomes_visible() {
        let mut pipeline = FilterPipeline::new(10);
        let outcome = pipeline.append(cases(0..25));

        assert_eq!(outcome.appended, 25);
        assert!(outcome.window_changed);
        assert_eq!(pipeline.visible_len(), 25);
        assert_eq!(pipeline.page_window().len(), 10);
    }

    #[test]
    fn test_direct_filter_full_recompute() {
        let mut pipeline = FilterPipeline::new(10);
        pipeline.append(cases(0..12));
        pipeline.set_direct_filter(negative());

        assert!(pipeline.filter_active());
        assert_eq!(pipeline.filtered_ids(), vec!["c0", "c4", "c8"]);
        assert_eq!(ids(&pipeline.page_window()), vec!["c0", "c4", "c8"]);
    }

    #[test]
    fn test_empty_direct_filter_is_none() {
        let mut pipeline = FilterPipeline::new(10);
        pipeline.append(cases(0..5));
        pipeline.set_direct_filter(Some(DirectFilter::new()));

        assert!(!pipeline.filter_active());
        assert_eq!(pipeline.filtered_len(), 5);
    }

    #[test]
    fn test_id_preserve_intersects_direct_filter() {
        let mut pipeline = FilterPipeline::new(10);
        pipeline.append(cases(0..12));
        pipeline.set_direct_filter(negative());
        pipeline.set_id_preserve(Some(
            ["c4", "c5", "c8"].iter().map(|s| s.to_string()).collect(),
        ));

        assert_eq!(pipeline.filtered_ids(), vec!["c4", "c8"]);

        pipeline.set_id_preserve(None);
        assert_eq!(pipeline.filtered_ids(), vec!["c0", "c4", "c8"]);
    }

    #[test]
    fn test_filter_change_resets_page() {
        let mut pipeline = FilterPipeline::new(5);
        pipeline.append(cases(0..30));
        pipeline.set_page(3);
        pipeline.set_direct_filter(negative());

        assert_eq!(pipeline.page_index(), 1);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let mut pipeline = FilterPipeline::new(10);
        pipeline.append(cases(0..40));
        pipeline.set_direct_filter(negative());
        let first: Vec<String> = pipeline.filtered_ids().iter().map(|s| s.to_string()).collect();

        pipeline.recompute_full();
        pipeline.recompute_full();
        let again: Vec<String> = pipeline.filtered_ids().iter().map(|s| s.to_string()).collect();

        assert_eq!(first, again);
        assert_eq!(pipeline.loaded_len(), 40);
    }

    #[test]
    fn test_append_refilters_only_new_cases() {
        let mut pipeline = FilterPipeline::new(10);
        pipeline.append(cases(0..8));
        pipeline.set_direct_filter(negative());

        let outcome = pipeline.append(cases(8..16));
        assert_eq!(outcome.appended, 8);
        assert_eq!(outcome.matched, 2);
        assert_eq!(pipeline.filtered_ids(), vec!["c0", "c4", "c8", "c12"]);
    }

    #[test]
    fn test_append_on_full_first_page_keeps_window() {
        let mut pipeline = FilterPipeline::new(10);
        pipeline.append(cases(0..10));
        let before = ids(&pipeline.page_window());

        let outcome = pipeline.append(cases(10..20));
        assert!(!outcome.window_changed);
        assert!(!outcome.new_data_signalled);
        assert_eq!(pipeline.visible_len(), 20);
        assert_eq!(ids(&pipeline.page_window()), before);
    }

    #[test]
    fn test_append_fills_partial_first_page() {
        let mut pipeline = FilterPipeline::new(10);
        pipeline.append(cases(0..4));

        let outcome = pipeline.append(cases(4..8));
        assert!(outcome.window_changed);
        assert_eq!(pipeline.page_window().len(), 8);
    }

    #[test]
    fn test_append_past_first_page_signals_new_data() {
        let mut pipeline = FilterPipeline::new(10);
        pipeline.append(cases(0..25));
        pipeline.set_page(3);
        let before = ids(&pipeline.page_window());

        let outcome = pipeline.append(cases(25..40));
        assert!(outcome.new_data_signalled);
        assert!(!outcome.window_changed);
        assert!(pipeline.new_data_available());
        assert_eq!(pipeline.visible_len(), 25);
        assert_eq!(pipeline.filtered_len(), 40);
        assert_eq!(ids(&pipeline.page_window()), before);
    }

    #[test]
    fn test_append_with_no_matches_signals_nothing() {
        let mut pipeline = FilterPipeline::new(10);
        pipeline.append(cases(0..25));
        pipeline.set_id_preserve(Some(["c1".to_string()].into_iter().collect()));
        pipeline.set_page(2);

        let outcome = pipeline.append(cases(25..30));
        assert_eq!(outcome.matched, 0);
        assert!(!outcome.new_data_signalled);
        assert!(!pipeline.new_data_available());
    }

    #[test]
    fn test_accept_new_data() {
        let mut pipeline = FilterPipeline::new(10);
        pipeline.append(cases(0..25));
        pipeline.set_page(2);
        pipeline.append(cases(25..40));
        assert!(pipeline.new_data_available());

        pipeline.accept_new_data();
        assert!(!pipeline.new_data_available());
        assert_eq!(pipeline.page_index(), 1);
        assert_eq!(pipeline.visible_len(), 40);
    }

    #[test]
    fn test_pagination_invariant() {
        for size in [0usize, 1, 9, 10, 11, 35] {
            let mut pipeline = FilterPipeline::new(10);
            pipeline.append(cases(0..size));
            for page in 1..=6 {
                pipeline.set_page(page);
                let expected = 10usize.min(size.saturating_sub((page - 1) * 10));
                assert_eq!(pipeline.page_window().len(), expected, "size {} page {}", size, page);
            }
        }
    }

    #[test]
    fn test_change_page_clamps_at_one() {
        let mut pipeline = FilterPipeline::new(10);
        pipeline.append(cases(0..30));
        pipeline.change_page(2);
        assert_eq!(pipeline.page_index(), 3);
        assert_eq!(ids(&pipeline.page_window())[0], "c20");

        pipeline.change_page(-10);
        assert_eq!(pipeline.page_index(), 1);
    }

    #[test]
    fn test_return_to_first_page_clears_signal_on_next_append() {
        let mut pipeline = FilterPipeline::new(10);
        pipeline.append(cases(0..20));
        pipeline.set_page(2);
        pipeline.append(cases(20..30));
        assert!(pipeline.new_data_available());
        assert_eq!(pipeline.visible_len(), 20);

        pipeline.set_page(1);
        let outcome = pipeline.append(cases(30..40));
        assert!(!outcome.new_data_signalled);
        assert!(!pipeline.new_data_available());
        assert_eq!(pipeline.visible_len(), pipeline.filtered_len());
        assert_eq!(pipeline.page_count(), 4);
    }

    #[test]
    fn test_change_page_extreme_deltas() {
        let mut pipeline = FilterPipeline::new(10);
        pipeline.append(cases(0..30));
        pipeline.change_page(isize::MIN);
        assert_eq!(pipeline.page_index(), 1);

        pipeline.change_page(isize::MAX);
        pipeline.change_page(isize::MAX);
        assert_eq!(pipeline.page_index(), usize::MAX);
        assert!(pipeline.page_window().is_empty());
    }

    #[test]
    fn test_page_count() {
        let mut pipeline = FilterPipeline::new(10);
        assert_eq!(pipeline.page_count(), 1);
        pipeline.append(cases(0..21));
        assert_eq!(pipeline.page_count(), 3);
    }
}
