//! Cursor state
//!
//! Tracks the cell position, logical and physical visibility, the saved
//! position, and the alternate-screen position. Terminal dimensions are
//! passed in by the caller; the cursor itself holds no reference to the
//! device.

use serde::{Deserialize, Serialize};

use crate::geom::{Point, Rect};

/// Cursor shape used when painting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CursorStyle {
    /// Filled cell
    #[default]
    Block,
    /// One-pixel-wide vertical bar at the left edge
    Beam,
    /// One-pixel-tall line at the bottom edge
    Underscore,
}

impl CursorStyle {
    /// The rectangle to invert for a cell of `cell` dimensions whose top-left
    /// corner sits at `pt`.
    pub fn rect(self, cell: Rect, pt: Point) -> Rect {
        match self {
            CursorStyle::Block => cell.translate(pt),
            CursorStyle::Beam => Rect::new(0, 0, 1, cell.max.y).translate(pt),
            CursorStyle::Underscore => {
                Rect::new(0, cell.max.y - 1, cell.max.x, cell.max.y).translate(pt)
            }
        }
    }
}

/// Cursor position and visibility state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    /// Column, 0-indexed. May transiently equal the column count after a
    /// glyph is rendered in the last column.
    pub col: usize,
    /// Row, 0-indexed.
    pub row: usize,
    /// Whether the cursor should be shown at all.
    pub show: bool,
    /// Whether the cursor is physically painted right now.
    pub visible: bool,
    /// Saved position (col, row) for save/restore escapes.
    saved: (usize, usize),
    /// Position held for whichever screen (main/alt) is inactive.
    alt: (usize, usize),
}

impl Cursor {
    pub fn new() -> Self {
        Cursor {
            col: 0,
            row: 0,
            show: true,
            visible: false,
            saved: (0, 0),
            alt: (0, 0),
        }
    }

    /// Columns remaining to the right edge, counting the cursor's own cell.
    pub fn cols_remaining(&self, cols: usize) -> usize {
        cols.saturating_sub(self.col)
    }

    /// Relative move, clamped to the cell grid.
    pub fn move_rel(&mut self, dx: isize, dy: isize, cols: usize, rows: usize) {
        self.col = clamp_add(self.col, dx, cols.saturating_sub(1));
        self.row = clamp_add(self.row, dy, rows.saturating_sub(1));
    }

    /// Absolute move, clamped to the cell grid.
    pub fn move_abs(&mut self, col: isize, row: isize, cols: usize, rows: usize) {
        self.col = clamp_add(0, col, cols.saturating_sub(1));
        self.row = clamp_add(0, row, rows.saturating_sub(1));
    }

    pub fn save_pos(&mut self) {
        self.saved = (self.col, self.row);
    }

    pub fn restore_pos(&mut self) {
        self.col = self.saved.0;
        self.row = self.saved.1;
    }

    /// Swap the live position with the inactive screen's position, used when
    /// entering or leaving the alternate screen.
    pub fn toggle_alt_pos(&mut self) {
        std::mem::swap(&mut self.col, &mut self.alt.0);
        std::mem::swap(&mut self.row, &mut self.alt.1);
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}

fn clamp_add(base: usize, delta: isize, max: usize) -> usize {
    let v = base as isize + delta;
    v.clamp(0, max as isize) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_rel_clamps() {
        let mut c = Cursor::new();
        c.move_rel(-5, -5, 80, 24);
        assert_eq!((c.col, c.row), (0, 0));

        c.move_rel(100, 100, 80, 24);
        assert_eq!((c.col, c.row), (79, 23));
    }

    #[test]
    fn test_move_abs_clamps() {
        let mut c = Cursor::new();
        c.move_abs(10, 5, 80, 24);
        assert_eq!((c.col, c.row), (10, 5));

        c.move_abs(200, -3, 80, 24);
        assert_eq!((c.col, c.row), (79, 0));
    }

    #[test]
    fn test_save_restore() {
        let mut c = Cursor::new();
        c.move_abs(12, 7, 80, 24);
        c.save_pos();
        c.move_abs(0, 0, 80, 24);
        c.restore_pos();
        assert_eq!((c.col, c.row), (12, 7));
    }

    #[test]
    fn test_toggle_alt_pos() {
        let mut c = Cursor::new();
        c.move_abs(3, 4, 80, 24);
        c.toggle_alt_pos();
        assert_eq!((c.col, c.row), (0, 0));
        c.move_abs(9, 9, 80, 24);
        c.toggle_alt_pos();
        assert_eq!((c.col, c.row), (3, 4));
    }

    #[test]
    fn test_cursor_style_rects() {
        let cell = Rect::new(0, 0, 8, 16);
        let pt = Point::new(16, 32);
        assert_eq!(CursorStyle::Block.rect(cell, pt), Rect::new(16, 32, 24, 48));
        assert_eq!(CursorStyle::Beam.rect(cell, pt), Rect::new(16, 32, 17, 48));
        assert_eq!(
            CursorStyle::Underscore.rect(cell, pt),
            Rect::new(16, 47, 24, 48)
        );
    }

    #[test]
    fn test_cols_remaining() {
        let mut c = Cursor::new();
        c.move_abs(75, 0, 80, 24);
        assert_eq!(c.cols_remaining(80), 5);
    }
}
