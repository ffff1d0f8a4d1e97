//! Chunk plan
//!
//! A load reads `first_chunk_size` cases, then the remainder in chunks of
//! `chunk_size` at offsets `K + i·M`, for `i` in `0..ceil((total − K) / M)`.

use crate::storage::{FieldScope, SortOrder};

/// What to load and in which slices
#[derive(Debug, Clone, PartialEq)]
pub struct LoadPlan {
    pub first_chunk_size: usize,
    pub chunk_size: usize,
    pub order: SortOrder,
    pub scope: Option<FieldScope>,
}

impl LoadPlan {
    /// Offsets of the background chunks for a collection of `total` cases
    pub fn chunk_offsets(&self, total: usize) -> Vec<usize> {
        let chunk_size = self.chunk_size.max(1);
        let remaining = total.saturating_sub(self.first_chunk_size);
        let count = remaining.div_ceil(chunk_size);
        (0..count)
            .map(|i| self.first_chunk_size + i * chunk_size)
            .collect()
    }
}

impl Default for LoadPlan {
    fn default() -> Self {
        Self {
            first_chunk_size: 1000,
            chunk_size: 10_000,
            order: SortOrder::default(),
            scope: None,
        }
    }
}
