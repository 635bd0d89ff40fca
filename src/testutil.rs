//! Test fixtures
//!
//! The test tile set encodes each code point's identity into its glyph:
//! row 0 is a solid marker line, row 1 carries the low byte of the code
//! point as a bit pattern, and bold faces add a second marker on row 3.
//! `cell_byte` reads that encoding back out of the pixels, letting tests
//! assert "cell (c, r) shows glyph X" without a real font.

use std::io;
use std::sync::{Arc, Mutex};

use rasterm_core::Rgb;

use crate::surface::BufferSurface;
use crate::term::Term;
use crate::tiles::{FontTileSet, TileSets};

const CELL_W: i32 = 8;
const CELL_H: i32 = 16;

fn identity_mask(ch: char, bold: bool) -> Vec<u8> {
    let mut mask = vec![0u8; (CELL_W * CELL_H) as usize];
    for x in 0..CELL_W {
        mask[x as usize] = 0xFF;
    }
    let byte = (ch as u32 & 0xFF) as u8;
    for x in 0..CELL_W {
        if (byte >> (7 - x)) & 1 == 1 {
            mask[(CELL_W + x) as usize] = 0xFF;
        }
    }
    if bold {
        for x in 0..CELL_W {
            mask[(3 * CELL_W + x) as usize] = 0xFF;
        }
    }
    mask
}

fn identity_set(bold: bool) -> FontTileSet {
    let mut set = FontTileSet::new(CELL_W, CELL_H);
    for code in 0x20u32..=0x7E {
        if let Some(ch) = char::from_u32(code) {
            set.set_tile(ch, identity_mask(ch, bold));
        }
    }
    for code in 0xA0u32..=0xFF {
        if let Some(ch) = char::from_u32(code) {
            set.set_tile(ch, identity_mask(ch, bold));
        }
    }
    for ch in [
        '─', '│', '┌', '┐', '└', '┘', '┼', '├', '┤', '┬', '┴', '█', '░', '▒', '中',
    ] {
        set.set_tile(ch, identity_mask(ch, bold));
    }
    set
}

pub(crate) fn test_tiles() -> TileSets {
    TileSets::new(Arc::new(identity_set(false)), Arc::new(identity_set(true)))
}

/// A terminal over an exactly-fitting buffer surface, so cell (0, 0)
/// starts at pixel (0, 0).
pub(crate) fn test_term(cols: usize, rows: usize) -> Term {
    let surface = BufferSurface::new(cols as i32 * CELL_W, rows as i32 * CELL_H);
    Term::new(cols, rows, Box::new(surface), test_tiles())
}

fn px(t: &Term, x: i32, y: i32) -> Rgb {
    t.with_surface_ref(|s| s.get(x, y))
}

/// Decode the identity glyph at a cell: `Some(low byte)` when a marker
/// glyph is present, `None` for an empty (pure background) cell.
pub(crate) fn cell_byte(t: &Term, col: usize, row: usize) -> Option<u8> {
    let origin = t.render.bounds.min;
    let x0 = origin.x + col as i32 * CELL_W;
    let y0 = origin.y + row as i32 * CELL_H;

    let fg = px(t, x0, y0);
    let bg = px(t, x0, y0 + 2);
    if fg == bg {
        return None;
    }
    for x in 1..CELL_W {
        if px(t, x0 + x, y0) != fg {
            return None;
        }
    }
    let mut byte = 0u8;
    for x in 0..CELL_W {
        if px(t, x0 + x, y0 + 1) == fg {
            byte |= 1 << (7 - x);
        }
    }
    Some(byte)
}

/// Whether the glyph at a cell came from the bold face.
pub(crate) fn cell_is_bold(t: &Term, col: usize, row: usize) -> bool {
    let origin = t.render.bounds.min;
    let x0 = origin.x + col as i32 * CELL_W;
    let y0 = origin.y + row as i32 * CELL_H;
    cell_byte(t, col, row).is_some() && px(t, x0, y0 + 3) == px(t, x0, y0)
}

/// The foreground color the glyph at a cell was drawn with.
pub(crate) fn cell_fg(t: &Term, col: usize, row: usize) -> Option<Rgb> {
    cell_byte(t, col, row)?;
    let origin = t.render.bounds.min;
    Some(px(
        t,
        origin.x + col as i32 * CELL_W,
        origin.y + row as i32 * CELL_H,
    ))
}

/// The background color at a cell (sampled from an always-empty row of
/// the identity glyphs).
pub(crate) fn cell_bg(t: &Term, col: usize, row: usize) -> Rgb {
    let origin = t.render.bounds.min;
    px(
        t,
        origin.x + col as i32 * CELL_W,
        origin.y + row as i32 * CELL_H + 2,
    )
}

/// A cloneable reply sink for asserting on escape responses.
#[derive(Clone, Default)]
pub(crate) struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    pub(crate) fn take(&self) -> String {
        let mut buf = self.0.lock().unwrap();
        let s = String::from_utf8_lossy(&buf).into_owned();
        buf.clear();
        s
    }
}

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
