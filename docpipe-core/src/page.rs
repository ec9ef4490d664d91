//! Paged result shape for list reads.

use serde::{Deserialize, Serialize};

/// One page of items together with the collection-wide total.
///
/// Handlers assemble this from a windowed read plus a count so the boundary
/// layer can render paging metadata without a second round trip.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// The items in this window.
    pub items: Vec<T>,
    /// Total number of matching items across all windows.
    pub total: u64,
}

impl<T> Page<T> {
    /// Creates a page from a window of items and the overall total.
    pub fn new(items: Vec<T>, total: u64) -> Self {
        Self { items, total }
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self { items: Vec::new(), total: 0 }
    }
}
