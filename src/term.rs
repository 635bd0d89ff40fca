//! The terminal interpreter
//!
//! [`Term`] owns all terminal state and interprets a byte stream
//! synchronously: C0 controls and printables inline, escape sequences via
//! the framer. Incomplete UTF-8 and incomplete escape sequences are
//! buffered across calls, so the stream can be fed in arbitrary chunks.
//!
//! Hosts that want the queued, interrupt-friendly entry point wrap a
//! `Term` in a [`crate::Device`]; driving `Term::process` directly gives
//! the same semantics without the worker thread.

use std::io::{self, Write};

use log::debug;

use rasterm_core::{Attr, ColorMode, ColorSystem, Config, Cursor, Rect};
use rasterm_parser::{classify, sequence_end, Sequence};

use crate::render::Render;
use crate::surface::Surface;
use crate::tiles::TileSets;
use crate::xform::invert_region;

/// A virtual terminal rendering into a pixel surface.
pub struct Term {
    pub(crate) config: Config,
    pub(crate) cols: usize,
    pub(crate) rows: usize,

    pub(crate) cursor: Cursor,
    pub(crate) attr: Attr,
    pub(crate) attr_default: Attr,
    pub(crate) colors: ColorSystem,

    /// Scroll region rows, inclusive, 0-indexed.
    pub(crate) scroll_region: [usize; 2],
    /// Pixel rectangle of the scroll region; empty means "whole screen,
    /// use the fast path".
    pub(crate) scroll_area: Rect,

    pub(crate) render: Render,

    /// Tail of an incomplete escape sequence, carried between writes.
    input_buf: Vec<char>,
    /// Tail of an incomplete UTF-8 sequence, carried between writes.
    partial_utf8: Vec<u8>,

    /// Main-screen pixel snapshot while the alternate screen is active.
    save_buf: Option<Vec<rasterm_core::Rgb>>,

    /// Reply channel for escapes that answer (DSR, DA, size and color
    /// queries). Defaults to discard.
    pub(crate) output: Box<dyn Write + Send>,

    pub(crate) bell_fn: Option<Box<dyn FnMut(&str) + Send>>,
    pub(crate) config_fn: Option<Box<dyn FnMut(&Config) + Send>>,
    reset_fn: Option<Box<dyn FnMut() + Send>>,
}

impl Term {
    /// Create a terminal of `cols` x `rows` cells rendering into
    /// `surface` with the supplied tile sets.
    ///
    /// Panics if either dimension is zero; that is a precondition
    /// violation, not a runtime error.
    pub fn new(cols: usize, rows: usize, surface: Box<dyn Surface>, tiles: TileSets) -> Self {
        assert!(cols > 0 && rows > 0, "terminal dimensions must be nonzero");

        let colors = ColorSystem::new(ColorMode::default());
        let attr_default = Attr::with_colors(colors.default_fg(), colors.default_bg());

        let mut term = Term {
            config: Config::default(),
            cols,
            rows,
            cursor: Cursor::new(),
            attr: attr_default,
            attr_default,
            colors,
            scroll_region: [0, rows - 1],
            scroll_area: Rect::default(),
            render: Render::new(surface, cols, rows, tiles),
            input_buf: Vec::new(),
            partial_utf8: Vec::new(),
            save_buf: None,
            output: Box::new(io::sink()),
            bell_fn: None,
            config_fn: None,
            reset_fn: None,
        };
        term.render.cursor_style = term.config.cursor_style;
        term.reset();
        term
    }

    /// Create a terminal sized to fill `surface`, deriving the cell grid
    /// from the tile geometry and centering the leftover pixels.
    pub fn with_surface(surface: Box<dyn Surface>, tiles: TileSets) -> Self {
        let (cell_w, cell_h) = tiles.regular.cell_size();
        let b = surface.bounds();
        let cols = (b.dx() / cell_w).max(1) as usize;
        let rows = (b.dy() / cell_h).max(1) as usize;
        Term::new(cols, rows, surface, tiles)
    }

    /// Terminal size as (rows, cols).
    pub fn size(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Replace the reply channel.
    pub fn set_output(&mut self, output: Box<dyn Write + Send>) {
        self.output = output;
    }

    /// Install the bell callback, invoked on `BEL` and the private bell
    /// escape (which carries an id payload).
    pub fn set_bell_fn(&mut self, f: impl FnMut(&str) + Send + 'static) {
        self.bell_fn = Some(Box::new(f));
    }

    /// Install the config-change callback, invoked after an escape
    /// mutates an option.
    pub fn set_config_fn(&mut self, f: impl FnMut(&Config) + Send + 'static) {
        self.config_fn = Some(Box::new(f));
    }

    /// Install the hardware-reset callback, invoked by `ESC c`.
    pub fn set_reset_fn(&mut self, f: impl FnMut() + Send + 'static) {
        self.reset_fn = Some(Box::new(f));
    }

    /// Install the display callback, invoked after each processed write.
    pub fn set_display_fn(&mut self, f: impl FnMut() + Send + 'static) {
        self.render.display_fn = Some(Box::new(f));
    }

    /// Replace the default attribute (the SGR 0 / `ESC c` target).
    pub fn set_attr_default(&mut self, attr: Attr) {
        self.attr_default = attr;
    }

    /// Read access to the surface, e.g. to blit or encode the screen.
    pub fn with_surface_ref<R>(&self, f: impl FnOnce(&dyn Surface) -> R) -> R {
        f(self.render.surface.as_ref())
    }

    pub(crate) fn config_changed(&mut self) {
        if let Some(f) = self.config_fn.as_mut() {
            f(&self.config);
        }
    }

    /// Full reset: default attribute, default G0/G1, clear screen, cursor
    /// home, scroll region to the whole screen. `ESC c` lands here.
    pub fn reset(&mut self) {
        if let Some(f) = self.reset_fn.as_mut() {
            f();
        }
        self.attr = self.attr_default;
        self.render.active.charset.reset();
        self.clear_all();
        self.cursor.move_abs(0, 0, self.cols, self.rows);
        self.scroll_area = Rect::default();
        self.scroll_region = [0, self.rows - 1];
        self.update_attr();
    }

    /// Interpret a chunk of the byte stream. Bytes are consumed in order;
    /// incomplete escape or UTF-8 sequences are buffered for the next
    /// call.
    pub fn process(&mut self, data: &[u8]) {
        let runes = self.decode_input(data);

        self.hide_cursor();

        let mut i = 0;
        while i < runes.len() {
            match runes[i] {
                '\x07' => {
                    if let Some(f) = self.bell_fn.as_mut() {
                        f("bel");
                    }
                }
                '\x08' => {
                    // motion only; erasing needs "\b \b" from the host
                    self.cursor.col = self.cursor.col.saturating_sub(1);
                }
                '\t' => {
                    let tab = self.config.tab_size.max(1);
                    self.cursor.col =
                        (self.cols - 1).min(self.cursor.col + tab - self.cursor.col % tab);
                }
                '\r' => self.cursor.col = 0,
                '\n' => {
                    self.cursor.col = 0;
                    self.vertical_motion();
                }
                '\x0b' | '\x0c' => self.vertical_motion(),
                '\x0e' => {
                    self.render.active.charset.shift_out();
                    self.update_attr();
                }
                '\x0f' => {
                    self.render.active.charset.shift_in();
                    self.update_attr();
                }
                '\x1b' => match sequence_end(&runes[i..]) {
                    None => {
                        self.input_buf = runes[i..].to_vec();
                        break;
                    }
                    Some(n) => {
                        self.handle_sequence(&runes[i..i + n]);
                        i += n;
                        continue;
                    }
                },
                sym => {
                    // past the right edge from the previous glyph: wrap
                    // (or saturate) before drawing
                    if self.cursor.col >= self.cols {
                        if self.config.wraparound {
                            self.cursor.col = 0;
                            self.vertical_motion();
                        } else {
                            self.cursor.col = self.cols - 1;
                        }
                    }
                    let width = self.render_rune(sym);
                    self.cursor.col = (self.cursor.col + width).min(self.cols);
                    if !self.config.wraparound {
                        self.cursor.col = self.cursor.col.min(self.cols - 1);
                    }
                }
            }
            i += 1;
        }

        self.show_cursor();
        if let Some(f) = self.render.display_fn.as_mut() {
            f();
        }
    }

    /// Write at the i'th cell on screen without disturbing the cursor:
    /// the offset is clamped, the cursor is moved, `data` is interpreted,
    /// and the previous position is restored.
    pub fn write_at(&mut self, data: &[u8], offset: i64) {
        let (col, row) = (self.cursor.col, self.cursor.row);
        let max = (self.rows * self.cols) as i64 - 1;
        let off = offset.clamp(0, max) as usize;
        self.hide_cursor();
        self.cursor.row = off / self.cols;
        self.cursor.col = off % self.cols;
        self.process(data);
        self.hide_cursor();
        self.cursor.col = col;
        self.cursor.row = row;
        self.show_cursor();
    }

    /// Invert the screen for a tenth of a second. The one blocking
    /// operation in the interpreter.
    pub fn visual_bell(&mut self) {
        let bounds = self.render.bounds;
        invert_region(self.render.surface.as_mut(), bounds);
        std::thread::sleep(std::time::Duration::from_millis(100));
        invert_region(self.render.surface.as_mut(), bounds);
    }

    /// Toggle the painted cursor; the blink tick lands here.
    pub fn blink_cursor(&mut self) {
        if !self.cursor.show {
            return;
        }
        self.toggle_cursor();
        if let Some(f) = self.render.display_fn.as_mut() {
            f();
        }
    }

    /// LF/VT/FF vertical motion: scroll at the region bottom, otherwise
    /// step down within the screen.
    pub(crate) fn vertical_motion(&mut self) {
        if self.cursor.row == self.scroll_region[1] {
            self.scroll(1);
        } else if self.cursor.row < self.rows - 1 {
            self.cursor.row += 1;
        }
    }

    /// Decode `data` as UTF-8, prepending any buffered partial sequence
    /// and escape-sequence tail; keeps an incomplete trailing sequence
    /// for the next call.
    fn decode_input(&mut self, data: &[u8]) -> Vec<char> {
        let mut bytes = std::mem::take(&mut self.partial_utf8);
        bytes.extend_from_slice(data);

        let mut runes = std::mem::take(&mut self.input_buf);
        let mut rest = bytes.as_slice();
        loop {
            match std::str::from_utf8(rest) {
                Ok(s) => {
                    runes.extend(s.chars());
                    break;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    // safe: validated prefix
                    if let Ok(s) = std::str::from_utf8(&rest[..valid]) {
                        runes.extend(s.chars());
                    }
                    match e.error_len() {
                        // malformed byte run: emit a replacement and move on
                        Some(len) => {
                            runes.push('\u{FFFD}');
                            rest = &rest[valid + len..];
                        }
                        // truncated sequence: keep the tail for later
                        None => {
                            self.partial_utf8 = rest[valid..].to_vec();
                            break;
                        }
                    }
                }
            }
        }
        runes
    }

    /// Dispatch one complete escape sequence.
    fn handle_sequence(&mut self, seq: &[char]) {
        match classify(seq) {
            Some(Sequence::Csi(body)) => self.handle_csi(body),
            Some(Sequence::Osc(body)) => self.handle_osc(body),
            Some(Sequence::Graphics(body)) => self.handle_graphics(body),
            Some(Sequence::Dcs(_)) | Some(Sequence::Sos(_)) => {}
            Some(Sequence::Designate { slot, final_byte }) => {
                self.render.active.charset.designate(slot, final_byte);
            }
            Some(Sequence::Esc(c)) => self.handle_esc(c),
            None => {}
        }
        self.update_attr();
    }

    fn handle_esc(&mut self, c: char) {
        match c {
            '7' => self.cursor.save_pos(),
            '8' => self.cursor.restore_pos(),
            'c' => self.reset(),
            'M' => {
                // reverse index
                if self.cursor.row == 0 {
                    self.scroll(-1);
                } else {
                    self.cursor.row -= 1;
                }
            }
            // keypad modes, accepted and ignored
            '=' | '>' => {}
            other => debug!("unhandled ESC sequence: ESC {}", other),
        }
    }

    /// Enter the alternate screen: snapshot the render bounds and swap
    /// the cursor to the alternate position.
    pub(crate) fn enter_alt_screen(&mut self) {
        if !self.config.alt_screen {
            return;
        }
        let bounds = self.render.bounds;
        self.save_buf = Some(self.render.read_rect(bounds));
        self.clear_all();
        self.cursor.toggle_alt_pos();
    }

    /// Leave the alternate screen: restore the snapshot and cursor.
    pub(crate) fn exit_alt_screen(&mut self) {
        if !self.config.alt_screen {
            return;
        }
        if let Some(saved) = self.save_buf.take() {
            let bounds = self.render.bounds;
            self.render.write_rect(bounds, &saved);
            self.cursor.toggle_alt_pos();
        }
    }

    #[cfg(test)]
    pub(crate) fn cursor_pos(&self) -> (usize, usize) {
        (self.cursor.col, self.cursor.row)
    }
}
