/// Current page and page count of the live preview.
///
/// Non-paginated previews have exactly one page. Moves past either end are
/// no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    index: usize,
    page_count: usize,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            index: 0,
            page_count: 1,
        }
    }
}

impl PaginationState {
    /// Start over at page 0 of `page_count` pages (at least one).
    pub fn reset(&mut self, page_count: usize) {
        self.page_count = page_count.max(1);
        self.index = 0;
    }

    /// Advance one page. Returns whether the index moved.
    pub fn next(&mut self) -> bool {
        if self.index + 1 < self.page_count {
            self.index += 1;
            true
        } else {
            false
        }
    }

    /// Go back one page. Returns whether the index moved.
    pub fn prev(&mut self) -> bool {
        if self.index > 0 {
            self.index -= 1;
            true
        } else {
            false
        }
    }

    pub fn can_go_prev(&self) -> bool {
        self.index > 0
    }

    pub fn can_go_next(&self) -> bool {
        self.index < self.page_count - 1
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn is_paginated(&self) -> bool {
        self.page_count > 1
    }

    /// One-based "Page i/n" label.
    pub fn label(&self) -> String {
        format!("Page {}/{}", self.index + 1, self.page_count)
    }
}
