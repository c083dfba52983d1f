//! Pagination: immutable offset/size cursor over an ordered result set.

/// Page size used when the client does not request one.
pub const DEFAULT_PAGE_SIZE: usize = 50;
/// Hard ceiling on requested page size, to bound response size.
pub const MAX_PAGE_SIZE: usize = 100;

/// An offset/size window into an ordered sequence of works.
///
/// The cursor itself is immutable; [`next_page`](Self::next_page),
/// [`previous_page`](Self::previous_page) and [`first_page`](Self::first_page)
/// derive new cursors and return `None` at the respective boundary. The total
/// result count is learned after the query runs, via
/// [`page_loaded`](Self::page_loaded), which is what makes
/// `has_next_page` and the beyond-the-end behavior of `previous_page`
/// decidable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    offset: usize,
    size: usize,
    total_size: Option<usize>,
    this_page_size: Option<usize>,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_SIZE)
    }
}

impl Pagination {
    /// Cursor at `offset` with the given page size, clamped to
    /// `1..=MAX_PAGE_SIZE`.
    pub fn new(offset: usize, size: usize) -> Self {
        Self {
            offset,
            size: size.clamp(1, MAX_PAGE_SIZE),
            total_size: None,
            this_page_size: None,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Total result count, if a page has been loaded through this cursor.
    pub fn total_size(&self) -> Option<usize> {
        self.total_size
    }

    /// Record what the query actually returned for this window.
    pub fn page_loaded(&mut self, page_len: usize, total: Option<usize>) {
        self.this_page_size = Some(page_len);
        self.total_size = total;
    }

    /// Whether rows exist past this window.
    ///
    /// When the total is unknown, a completely full page is taken to imply a
    /// next page; the worst case is one trailing empty page.
    pub fn has_next_page(&self) -> bool {
        match self.total_size {
            Some(total) => self.offset + self.size < total,
            None => self.this_page_size == Some(self.size),
        }
    }

    /// Cursor for the next window, or `None` on the last page.
    pub fn next_page(&self) -> Option<Self> {
        self.has_next_page().then(|| Self {
            offset: self.offset + self.size,
            size: self.size,
            total_size: self.total_size,
            this_page_size: None,
        })
    }

    /// Cursor for the previous window, or `None` on the first page.
    ///
    /// An offset beyond the total result count points back at the last
    /// populated page rather than at `offset - size`, so a stale deep link
    /// still recovers to real content.
    pub fn previous_page(&self) -> Option<Self> {
        if self.offset == 0 {
            return None;
        }
        let offset = match self.total_size {
            Some(total) if self.offset >= total => {
                if total == 0 { 0 } else { ((total - 1) / self.size) * self.size }
            },
            _ => self.offset.saturating_sub(self.size),
        };
        Some(Self {
            offset,
            size: self.size,
            total_size: self.total_size,
            this_page_size: None,
        })
    }

    /// Cursor for the first window, or `None` if this already is it.
    pub fn first_page(&self) -> Option<Self> {
        (self.offset != 0).then(|| Self {
            offset: 0,
            size: self.size,
            total_size: self.total_size,
            this_page_size: None,
        })
    }

    /// Slice the requested window out of a full ordered sequence.
    ///
    /// An offset beyond the end yields an empty slice, not a panic.
    pub fn window<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.offset.min(items.len());
        let end = (self.offset + self.size).min(items.len());
        &items[start..end]
    }

    /// Canonical query string: `after=…&size=…`.
    pub fn query_string(&self) -> String {
        format!("after={}&size={}", self.offset, self.size)
    }
}
