//! Offset windowing for search results.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Next,
    Prev,
}

impl Direction {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Next => "next",
            Self::Prev => "prev",
        }
    }
}

/// Moves `offset` one page in `direction`.
///
/// The offset is first snapped to the start of its page and clamped to the
/// last page, so the result always lies in `[0, max(0, total - 1)]`. `Next`
/// on the last page and `Prev` on the first page return the same offset.
#[must_use]
pub fn step(total: usize, page_size: usize, offset: usize, direction: Direction) -> usize {
    let page_size = page_size.max(1);
    let last_page = last_page_start(total, page_size);
    let current = (offset / page_size * page_size).min(last_page);

    match direction {
        Direction::Next if current < last_page => current + page_size,
        Direction::Next => current,
        Direction::Prev => current.saturating_sub(page_size),
    }
}

/// Number of pages needed for `total` items (at least one).
#[must_use]
pub fn page_count(total: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    total.div_ceil(page_size).max(1)
}

/// One-based page number of `offset`.
#[must_use]
pub fn page_number(offset: usize, page_size: usize) -> usize {
    offset / page_size.max(1) + 1
}

fn last_page_start(total: usize, page_size: usize) -> usize {
    if total == 0 {
        0
    } else {
        (total - 1) / page_size * page_size
    }
}
