/// Page size meaning "no paging, show everything".
pub const ALL_ROWS: usize = 0;

/// Paging position. `1 <= current_page <= total_pages` holds after every
/// transition; out-of-range requests clamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    page_size: usize,
    current_page: usize,
    total_pages: usize,
}

impl Default for PageState {
    fn default() -> Self {
        Self::new(10)
    }
}

impl PageState {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size,
            current_page: 1,
            total_pages: 1,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn shows_all(&self) -> bool {
        self.page_size == ALL_ROWS
    }

    /// Recompute `total_pages` for a locally held row count and pull the
    /// current page back into range.
    pub fn recompute(&mut self, row_count: usize) {
        self.total_pages = total_pages_for(row_count, self.page_size);
        self.clamp();
    }

    /// Trust a server-reported page count.
    pub fn set_reported_total(&mut self, total_pages: usize) {
        self.total_pages = total_pages.max(1);
        self.clamp();
    }

    /// Jump to `page`, clamped into `[1, total_pages]`.
    pub fn set_page(&mut self, page: usize) {
        self.current_page = page.clamp(1, self.total_pages);
    }

    pub fn next(&mut self) {
        self.set_page(self.current_page.saturating_add(1));
    }

    pub fn prev(&mut self) {
        self.set_page(self.current_page.saturating_sub(1));
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    /// Change page size and go back to page 1. `total_pages` is left to the
    /// caller: [`recompute`](Self::recompute) locally or a fresh server report.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size;
        self.current_page = 1;
    }

    pub fn reset(&mut self) {
        self.current_page = 1;
    }

    fn clamp(&mut self) {
        self.current_page = self.current_page.clamp(1, self.total_pages);
    }
}

/// `max(1, ceil(rows / size))`, or 1 for [`ALL_ROWS`].
pub fn total_pages_for(row_count: usize, page_size: usize) -> usize {
    if page_size == ALL_ROWS {
        1
    } else {
        row_count.div_ceil(page_size).max(1)
    }
}

/// Slice the current page out of `rows`. Never panics on a page past the end;
/// that yields an empty slice.
pub fn paginate<'a, T>(rows: &'a [T], state: &PageState) -> &'a [T] {
    if state.shows_all() {
        return rows;
    }
    let start = (state.current_page - 1)
        .saturating_mul(state.page_size)
        .min(rows.len());
    let end = start.saturating_add(state.page_size).min(rows.len());
    &rows[start..end]
}

/// Zero-based offset of the first row on the current page.
pub fn page_offset(state: &PageState) -> usize {
    if state.shows_all() {
        0
    } else {
        (state.current_page - 1).saturating_mul(state.page_size)
    }
}
