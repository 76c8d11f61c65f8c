//! Hard-wrapping of the buffer into screen rows.
//!
//! Unlike word wrapping, rows break at exactly the area width (by display
//! width), so every byte of the buffer maps to exactly one row and column.
//! That keeps caret placement exact.

use std::ops::Range;
use unicode_width::UnicodeWidthChar;

/// Display width of a character as drawn by the PromptView.
///
/// Tabs are drawn as a single space; other control characters take no room.
pub(super) fn char_width(c: char) -> usize {
    if c == '\t' { 1 } else { c.width().unwrap_or(0) }
}

/// Split one logical line into row byte ranges no wider than `width`.
///
/// Always returns at least one range (an empty line is one empty row). A
/// character wider than `width` still gets a row of its own.
pub(super) fn wrap_line(line: &str, width: usize) -> Vec<Range<usize>> {
    let mut rows = Vec::new();
    let mut row_start = 0;
    let mut row_width = 0;

    for (i, c) in line.char_indices() {
        let w = char_width(c);
        if row_width + w > width && i > row_start {
            rows.push(row_start..i);
            row_start = i;
            row_width = 0;
        }
        row_width += w;
    }
    rows.push(row_start..line.len());
    rows
}

/// Screen-row layout of a whole buffer for one width.
#[derive(Debug, Default)]
pub(super) struct RowLayout {
    /// Absolute byte ranges of every row, top to bottom
    pub rows: Vec<Range<usize>>,
    /// Row holding the caret
    pub caret_row: usize,
    /// Column of the caret within `caret_row`, in display cells
    pub caret_col: usize,
}

impl RowLayout {
    pub fn build(text: &str, width: usize, caret: usize) -> Self {
        let width = width.max(1);
        let mut layout = RowLayout::default();
        let mut line_start = 0;

        for line in text.split('\n') {
            let line_end = line_start + line.len();
            for range in wrap_line(line, width) {
                let row = line_start + range.start..line_start + range.end;
                // The caret belongs to the row it falls inside, or to the
                // last row of its line when it sits at the line end.
                let holds_caret = (row.start <= caret && caret < row.end)
                    || (caret == line_end && row.end == line_end);
                if holds_caret {
                    layout.caret_row = layout.rows.len();
                    layout.caret_col = text[row.start..caret].chars().map(char_width).sum();
                }
                layout.rows.push(row);
            }
            line_start = line_end + 1;
        }

        // Caret after a full-width row: clamp onto the last cell
        layout.caret_col = layout.caret_col.min(width - 1);
        layout
    }

    pub fn total_rows(&self) -> usize {
        self.rows.len()
    }
}
