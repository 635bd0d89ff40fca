//! Row-unit scrolling and the scroll region
//!
//! `scroll` works in whole rows. An empty `scroll_area` means the region
//! is the whole screen and the fast whole-bounds primitive applies;
//! otherwise the derived pixel band scrolls and the exposed rows are
//! filled with the background.

use rasterm_core::Rect;

use crate::term::Term;

impl Term {
    /// Scroll the active region by `row_amount` rows; positive moves
    /// content up. The vacated band is cleared to the background.
    pub fn scroll(&mut self, row_amount: i32) {
        if row_amount == 0 {
            return;
        }
        let cell_h = self.render.cell.dy();
        let (cols, rows) = (self.cols as i32, self.rows as i32);

        if self.scroll_area.is_empty() {
            self.render.scroll_px(row_amount * cell_h);
            if row_amount > 0 {
                self.clear_cells(0, rows - row_amount, cols, rows);
            } else {
                self.clear_cells(0, 0, cols, -row_amount);
            }
            return;
        }

        let area = self.scroll_area;
        self.render.region_scroll(area, row_amount * cell_h);

        let (top, bottom) = (self.scroll_region[0] as i32, self.scroll_region[1] as i32);
        if row_amount > 0 {
            self.clear_cells(0, bottom - row_amount + 1, cols, bottom + 1);
        } else {
            self.clear_cells(0, top, cols, top - row_amount);
        }
    }

    /// Set the scroll region from 1-based inclusive row numbers, deriving
    /// the pixel band. Degenerate input (0;0, start >= end, or the whole
    /// screen) clears the region so the fast path applies.
    pub fn set_scroll_region(&mut self, start: i32, end: i32) {
        let rows = self.rows as i32;
        let cell_h = self.render.cell.dy();
        let bounds = self.render.bounds;

        let top = (start - 1).clamp(0, rows - 1);
        let bottom = (end - 1).clamp(0, rows - 1);
        self.scroll_region = [top as usize, bottom as usize];

        self.scroll_area = Rect::new(
            bounds.min.x,
            top * cell_h + bounds.min.y,
            bounds.max.x,
            (bottom + 1) * cell_h + bounds.min.y,
        );

        if (start == 0 && end == 0) || start >= end || self.scroll_area == bounds {
            self.scroll_area = Rect::default();
            self.scroll_region = [0, self.rows - 1];
        }
    }
}
