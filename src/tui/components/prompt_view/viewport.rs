//! Vertical scroll state for the PromptView.
//!
//! The viewport follows the caret by default. Wheel and page scrolling
//! detach it so the user can read back through the transcript; the next
//! editing event re-attaches it.

/// Scroll offset and follow mode. Must persist across frames.
#[derive(Debug)]
pub(super) struct ViewportState {
    /// First visible row
    pub offset: usize,
    /// When true, the offset is adjusted every frame to keep the caret visible
    pub follow_caret: bool,
    /// Last known viewport height (for page size and clamping between frames)
    pub height: usize,
    /// Last known total row count
    pub total_rows: usize,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            offset: 0,
            follow_caret: true,
            height: 0,
            total_rows: 0,
        }
    }
}

impl ViewportState {
    fn max_offset(&self) -> usize {
        self.total_rows.saturating_sub(self.height)
    }

    fn page_size(&self) -> usize {
        self.height.saturating_sub(1).max(1)
    }

    /// Recompute the offset for a new frame.
    pub fn update(&mut self, height: usize, total_rows: usize, caret_row: usize) {
        self.height = height;
        self.total_rows = total_rows;

        if self.follow_caret && height > 0 {
            if caret_row < self.offset {
                self.offset = caret_row;
            } else if caret_row >= self.offset + height {
                self.offset = caret_row + 1 - height;
            }
        }
        self.offset = self.offset.min(self.max_offset());
    }

    pub fn scroll_up(&mut self, rows: usize) {
        self.offset = self.offset.saturating_sub(rows);
        self.follow_caret = false;
    }

    pub fn scroll_down(&mut self, rows: usize) {
        self.offset = (self.offset + rows).min(self.max_offset());
        self.follow_caret = false;
    }

    pub fn page_up(&mut self) {
        self.scroll_up(self.page_size());
    }

    pub fn page_down(&mut self) {
        self.scroll_down(self.page_size());
    }

    /// Whether `row` is currently on screen.
    pub fn shows(&self, row: usize) -> bool {
        row >= self.offset && row < self.offset + self.height
    }
}
