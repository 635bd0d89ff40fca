//! Rendering state and glyph composition
//!
//! [`Render`] owns the pixel surface, the terminal's render bounds within
//! it (centered when the surface is larger than the cell grid), the tile
//! sets, and the scroll/fill bindings probed from the surface at
//! construction. The glyph, overlay and cursor painting routines live
//! here as `Term` methods.

use std::sync::Arc;

use unicode_width::UnicodeWidthChar;

use rasterm_core::{Attr, CharsetSlot, CharsetState, CursorStyle, Point, Rect, Rgb};

use crate::surface::{soft_fill, soft_vector_scroll, Caps, Surface};
use crate::term::Term;
use crate::tiles::{MultiTileSet, TileSets, Tiler, UserTileSet};
use crate::xform::{blur_region, invert_region};

/// How whole-region scrolls reach the surface, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScrollMode {
    /// The surface scrolls natively and the terminal owns all of it.
    Hardware,
    /// Full-width band scroll of the render bounds.
    Region,
    /// General vector scroll of the render bounds.
    Vector,
}

/// The active rendering context derived from the attribute state.
pub(crate) struct Active {
    pub tile_set: Arc<dyn Tiler>,
    pub fg: Rgb,
    pub bg: Rgb,
    pub charset: CharsetState,
}

/// Everything that touches pixels.
pub(crate) struct Render {
    pub surface: Box<dyn Surface>,
    /// The pixel region the terminal owns, already offset for centering.
    pub bounds: Rect,
    /// Cell geometry; `(0, 0, cell_width, cell_height)`.
    pub cell: Rect,

    pub char_set: Arc<dyn Tiler>,
    pub alt_char_set: Arc<dyn Tiler>,
    pub bold_char_set: Arc<dyn Tiler>,
    pub italic_char_set: Arc<dyn Tiler>,
    pub user_set: Option<Arc<UserTileSet>>,

    pub active: Active,
    pub cursor_style: CursorStyle,

    scroll_mode: ScrollMode,
    hw_fill: bool,
    hw_region_scroll: bool,
    hw_vector_scroll: bool,

    /// Invoked after each drained write, for deferred framebuffers.
    pub display_fn: Option<Box<dyn FnMut() + Send>>,
}

impl Render {
    pub fn new(surface: Box<dyn Surface>, cols: usize, rows: usize, tiles: TileSets) -> Self {
        let (cell_w, cell_h) = tiles.regular.cell_size();
        let cell = Rect::from_size(cell_w, cell_h);
        let surf_bounds = surface.bounds();

        // center the cell grid in whatever is left over
        let offset = Point::new(
            (surf_bounds.dx() % cell_w) / 2,
            (surf_bounds.dy() % cell_h) / 2,
        );
        let bounds = Rect::from_size(cell_w * cols as i32, cell_h * rows as i32)
            .translate(surf_bounds.min)
            .translate(offset);

        let caps = surface.caps();
        // Hardware whole-surface scroll only applies when the terminal owns
        // the full surface; an X offset rules out band scrolls too.
        let scroll_mode = if caps.contains(Caps::SCROLL) && offset == Point::default() && bounds == surf_bounds {
            ScrollMode::Hardware
        } else if offset.x == 0 {
            ScrollMode::Region
        } else {
            ScrollMode::Vector
        };

        let active = Active {
            tile_set: tiles.regular.clone(),
            fg: Rgb::WHITE,
            bg: Rgb::BLACK,
            charset: CharsetState::new(),
        };

        Render {
            surface,
            bounds,
            cell,
            char_set: tiles.regular,
            alt_char_set: tiles.alt,
            bold_char_set: tiles.bold,
            italic_char_set: tiles.italic,
            user_set: None,
            active,
            cursor_style: CursorStyle::Block,
            scroll_mode,
            hw_fill: caps.contains(Caps::FILL),
            hw_region_scroll: caps.contains(Caps::REGION_SCROLL) && offset.x == 0,
            hw_vector_scroll: caps.contains(Caps::VECTOR_SCROLL),
            display_fn: None,
        }
    }

    /// Recompute the active tile set and colors from the attribute state.
    ///
    /// The shifted-in slot picks regular or alternate; bold and italic
    /// override the regular face, and layer over the alternate one.
    pub fn update_active(&mut self, attr: &Attr) {
        let (fg, bg) = attr.active_colors();
        self.active.fg = fg;
        self.active.bg = bg;

        self.active.tile_set = match self.active.charset.current() {
            CharsetSlot::Regular => {
                if attr.bold {
                    self.bold_char_set.clone()
                } else if attr.italic {
                    self.italic_char_set.clone()
                } else {
                    self.char_set.clone()
                }
            }
            CharsetSlot::Alt => {
                if attr.bold {
                    Arc::new(MultiTileSet::new(vec![
                        self.alt_char_set.clone(),
                        self.bold_char_set.clone(),
                    ]))
                } else if attr.italic {
                    Arc::new(MultiTileSet::new(vec![
                        self.alt_char_set.clone(),
                        self.italic_char_set.clone(),
                    ]))
                } else {
                    self.alt_char_set.clone()
                }
            }
        };
    }

    /// Fill a rectangle given in terminal-local pixels (0,0 = top-left of
    /// the render bounds).
    pub fn fill(&mut self, region: Rect, c: Rgb) {
        self.fill_abs(region.translate(self.bounds.min), c);
    }

    /// Fill a rectangle given in absolute surface pixels, clipped to the
    /// render bounds.
    pub fn fill_abs(&mut self, region: Rect, c: Rgb) {
        let region = region.canon().intersect(self.bounds);
        if region.is_empty() {
            return;
        }
        if self.hw_fill {
            self.surface.fill(region, c);
        } else {
            soft_fill(self.surface.as_mut(), region, c);
        }
    }

    /// Set one absolute pixel, clipped to the render bounds.
    pub fn set_pixel(&mut self, x: i32, y: i32, c: Rgb) {
        if Point::new(x, y).in_rect(self.bounds) {
            self.surface.set(x, y, c);
        }
    }

    pub fn get_pixel(&self, x: i32, y: i32) -> Rgb {
        self.surface.get(x, y)
    }

    /// Scroll the whole render bounds vertically by `dy_px`.
    pub fn scroll_px(&mut self, dy_px: i32) {
        match self.scroll_mode {
            ScrollMode::Hardware => self.surface.scroll(dy_px),
            ScrollMode::Region => self.region_scroll(self.bounds, dy_px),
            ScrollMode::Vector => self.vector_scroll(self.bounds, Point::new(0, dy_px)),
        }
    }

    /// Scroll a full-width band vertically.
    pub fn region_scroll(&mut self, region: Rect, dy_px: i32) {
        if self.hw_region_scroll {
            self.surface.region_scroll(region, dy_px);
        } else {
            self.vector_scroll(region, Point::new(0, dy_px));
        }
    }

    /// Scroll an arbitrary region by a vector, edges wrapping.
    pub fn vector_scroll(&mut self, region: Rect, vector: Point) {
        if self.hw_vector_scroll {
            self.surface.vector_scroll(region, vector);
        } else {
            soft_vector_scroll(self.surface.as_mut(), region, vector);
        }
    }

    /// Snapshot a rectangle of pixels (row-major).
    pub fn read_rect(&self, region: Rect) -> Vec<Rgb> {
        let mut out = Vec::with_capacity((region.dx() * region.dy()).max(0) as usize);
        for y in region.min.y..region.max.y {
            for x in region.min.x..region.max.x {
                out.push(self.surface.get(x, y));
            }
        }
        out
    }

    /// Write a snapshot back.
    pub fn write_rect(&mut self, region: Rect, pix: &[Rgb]) {
        let mut i = 0;
        for y in region.min.y..region.max.y {
            for x in region.min.x..region.max.x {
                if let Some(&c) = pix.get(i) {
                    self.surface.set(x, y, c);
                }
                i += 1;
            }
        }
    }
}

/// Display width of a code point in cells: 1 for Latin-1, otherwise by
/// East-Asian-width classification; 0 for combining marks.
pub(crate) fn rune_width(c: char) -> usize {
    if (c as u32) <= 0xFF {
        1
    } else {
        c.width().unwrap_or(1)
    }
}

impl Term {
    /// Pixel origin of the cursor's cell (top-left corner).
    pub(crate) fn cursor_pt(&self) -> Point {
        Point::new(
            self.render.bounds.min.x + self.render.cell.dx() * self.cursor.col as i32,
            self.render.bounds.min.y + self.render.cell.dy() * self.cursor.row as i32,
        )
    }

    /// Render one code point at the cursor and return its width in cells.
    ///
    /// No control-character interpretation happens here; the caller owns
    /// wrap and motion. Zero-width marks compose onto the previous cell
    /// without painting a background.
    pub(crate) fn render_rune(&mut self, sym: char) -> usize {
        let width = rune_width(sym);
        let pt = self.cursor_pt();
        let cell_w = self.render.cell.dx();
        let cell_h = self.render.cell.dy();
        let (fg, bg) = (self.render.active.fg, self.render.active.bg);

        let tile_set = self.render.active.tile_set.clone();
        if width == 0 {
            tile_set.draw_tile(
                sym,
                self.render.surface.as_mut(),
                pt.add(Point::new(-cell_w, 0)),
                fg,
                None,
            );
            return 0;
        }
        tile_set.draw_tile(sym, self.render.surface.as_mut(), pt, fg, Some(bg));

        let span = cell_w * width as i32;
        if self.attr.strike {
            let y = self.config.strikethrough_height;
            self.render.fill_abs(Rect::new(0, y, span, y + 1).translate(pt), fg);
        }
        if self.attr.underline {
            self.render
                .fill_abs(Rect::new(0, cell_h - 1, span, cell_h).translate(pt), fg);
            if self.attr.double_underline {
                self.render
                    .fill_abs(Rect::new(0, cell_h - 3, span, cell_h - 2).translate(pt), fg);
            }
        }
        if self.attr.conceal {
            blur_region(
                self.render.surface.as_mut(),
                Rect::new(0, 0, span, cell_h).translate(pt),
            );
        }

        width
    }

    /// Invert the cursor rectangle; the same operation paints and erases.
    pub(crate) fn toggle_cursor(&mut self) {
        let rect = self
            .render
            .cursor_style
            .rect(self.render.cell, self.cursor_pt());
        self.cursor.visible = !self.cursor.visible;
        invert_region(self.render.surface.as_mut(), rect.intersect(self.render.bounds));
    }

    pub(crate) fn hide_cursor(&mut self) {
        if self.cursor.visible {
            self.toggle_cursor();
        }
    }

    pub(crate) fn show_cursor(&mut self) {
        if self.cursor.show && !self.cursor.visible {
            self.toggle_cursor();
        }
    }

    /// Change the cursor shape, repainting in place.
    pub fn set_cursor_style(&mut self, style: CursorStyle) {
        self.hide_cursor();
        self.render.cursor_style = style;
        self.show_cursor();
    }

    /// Fill a cell-unit rectangle with the attribute background.
    /// `(0, 0, cols, rows)` clears the whole screen.
    pub(crate) fn clear_cells(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        let (cw, ch) = (self.render.cell.dx(), self.render.cell.dy());
        let rect = Rect::new(x1 * cw, y1 * ch, x2 * cw, y2 * ch);
        let bg = self.attr.bg;
        self.render.fill(rect, bg);
    }

    pub(crate) fn clear_all(&mut self) {
        let bounds = self.render.bounds;
        let bg = self.attr.bg;
        self.render.fill_abs(bounds, bg);
    }

    /// Propagate attribute changes into the active rendering context.
    pub(crate) fn update_attr(&mut self) {
        let attr = self.attr;
        self.render.update_active(&attr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rune_width() {
        assert_eq!(rune_width('A'), 1);
        assert_eq!(rune_width('é'), 1);
        assert_eq!(rune_width('中'), 2);
        // combining acute accent
        assert_eq!(rune_width('\u{0301}'), 0);
    }
}
