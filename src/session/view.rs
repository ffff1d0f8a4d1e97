//! Published view state

use std::fmt;

use crate::relations::PageEntry;

/// Total shown next to the page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalCount {
    /// Store count not resolved yet
    Pending,
    Exact(usize),
}

impl TotalCount {
    pub fn value(&self) -> Option<usize> {
        match self {
            TotalCount::Pending => None,
            TotalCount::Exact(n) => Some(*n),
        }
    }
}

impl fmt::Display for TotalCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TotalCount::Pending => write!(f, "..."),
            TotalCount::Exact(n) => write!(f, "{}", n),
        }
    }
}

/// Everything the presentation layer renders, as of one transition
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSnapshot {
    pub page: Vec<PageEntry>,
    /// 1-based
    pub page_index: usize,
    pub page_count: usize,
    pub total: TotalCount,
    pub loaded_records: usize,
    pub all_data_loaded: bool,
    pub new_data_available: bool,
    pub filter_active: bool,
    pub loading: bool,
}

impl ViewSnapshot {
    /// The view before anything was loaded
    pub fn empty() -> Self {
        Self {
            page: Vec::new(),
            page_index: 1,
            page_count: 1,
            total: TotalCount::Pending,
            loaded_records: 0,
            all_data_loaded: false,
            new_data_available: false,
            filter_active: false,
            loading: true,
        }
    }

    /// Ids of the cases on the page, in order
    pub fn page_ids(&self) -> Vec<&str> {
        self.page.iter().map(|e| e.case.id.as_str()).collect()
    }
}
