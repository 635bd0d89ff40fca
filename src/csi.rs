//! CSI dispatch and the SGR engine
//!
//! The final byte selects the operation; arguments are semicolon-
//! separated decimals, 1-based where they address the grid. Cursor motion
//! clamps to the cell grid. Unknown finals and SGR codes are logged and
//! ignored.

use std::io::Write;

use log::debug;

use rasterm_core::{Point, Rect, Rgb};
use rasterm_parser::Args;

use crate::term::Term;

impl Term {
    pub(crate) fn handle_csi(&mut self, body: &[char]) {
        let Some((&final_byte, params)) = body.split_last() else {
            return;
        };
        let args = Args::parse(params, 1);
        let (cols, rows) = (self.cols as i32, self.rows as i32);

        match final_byte {
            '@' => {
                // open a gap at the cursor by shifting the rest of the row
                // right, then blank it
                let n = args.first_or(1);
                let curs = self.cursor_pt();
                let (cw, ch) = (self.render.cell.dx(), self.render.cell.dy());
                let remaining = self.cursor.cols_remaining(self.cols) as i32;
                let region = Rect {
                    min: curs,
                    max: curs.add(Point::new(remaining * cw, ch)),
                };
                self.render.vector_scroll(region, Point::new(-cw * n, 0));
                let (col, row) = (self.cursor.col as i32, self.cursor.row as i32);
                self.clear_cells(col, row, (col + n).min(cols), row + 1);
            }
            'A' => {
                let n = args.first_or(1) as isize;
                self.cursor.move_rel(0, -n, self.cols, self.rows);
            }
            'B' => {
                let n = args.first_or(1) as isize;
                self.cursor.move_rel(0, n, self.cols, self.rows);
            }
            'C' => {
                let n = args.first_or(1) as isize;
                self.cursor.move_rel(n, 0, self.cols, self.rows);
            }
            'D' => {
                let n = args.first_or(1) as isize;
                self.cursor.move_rel(-n, 0, self.cols, self.rows);
            }
            'E' => {
                let n = args.first_or(1) as isize;
                self.cursor
                    .move_rel(-(cols as isize), n, self.cols, self.rows);
            }
            'F' => {
                let n = args.first_or(1) as isize;
                self.cursor
                    .move_rel(-(cols as isize), -n, self.cols, self.rows);
            }
            'G' => {
                let n = args.first_or(1) as isize;
                let row = self.cursor.row as isize;
                self.cursor.move_abs(n - 1, row, self.cols, self.rows);
            }
            'H' | 'f' => {
                let n = args.get_or(0, 1) as isize;
                let m = args.get_or(1, 1) as isize;
                self.cursor.move_abs(m - 1, n - 1, self.cols, self.rows);
            }
            'J' => {
                let args = Args::parse(params, 0);
                let (col, row) = (self.cursor.col as i32, self.cursor.row as i32);
                match args.first_or(0) {
                    0 => {
                        self.clear_cells(col, row, cols, row + 1);
                        self.clear_cells(0, row + 1, cols, rows);
                    }
                    1 => {
                        self.clear_cells(0, row, col, row + 1);
                        self.clear_cells(0, 0, cols, row);
                    }
                    2 => self.clear_cells(0, 0, cols, rows),
                    _ => {}
                }
            }
            'K' => {
                let args = Args::parse(params, 0);
                let (col, row) = (self.cursor.col as i32, self.cursor.row as i32);
                match args.first_or(0) {
                    0 => self.clear_cells(col, row, cols, row + 1),
                    1 => self.clear_cells(0, row, col, row + 1),
                    2 => self.clear_cells(0, row, cols, row + 1),
                    _ => {}
                }
            }
            'L' | 'M' => {
                // shift lines below the cursor through a transient scroll
                // region reaching the current region's bottom
                let n = args.first_or(1);
                let (saved_region, saved_area) = (self.scroll_region, self.scroll_area);
                self.set_scroll_region(
                    self.cursor.row as i32 + 1,
                    self.scroll_region[1] as i32 + 1,
                );
                self.scroll(if final_byte == 'L' { -n } else { n });
                self.scroll_region = saved_region;
                self.scroll_area = saved_area;
            }
            'P' => {
                // pull the rest of the row left over the deleted cells
                let n = args.first_or(1);
                let curs = self.cursor_pt();
                let (cw, ch) = (self.render.cell.dx(), self.render.cell.dy());
                let remaining = self.cursor.cols_remaining(self.cols) as i32;
                let region = Rect {
                    min: curs,
                    max: curs.add(Point::new(remaining * cw, ch)),
                };
                self.render.vector_scroll(region, Point::new(cw * n, 0));
                let row = self.cursor.row as i32;
                self.clear_cells(cols - n, row, cols, row + 1);
            }
            'S' => self.scroll(args.first_or(1)),
            'T' => self.scroll(-args.first_or(1)),
            'X' => {
                let n = args.first_or(1);
                let (col, row) = (self.cursor.col as i32, self.cursor.row as i32);
                let end = (col + n).max(col + 1).min(cols);
                self.clear_cells(col, row, end, row + 1);
            }
            'c' => {
                // device attributes: claim VT100 with AVO
                let _ = write!(self.output, "\x1b[?1;2c");
            }
            'd' => {
                let n = args.first_or(1);
                self.cursor.row = ((n - 1).clamp(0, rows - 1)) as usize;
            }
            'm' => {
                let args = Args::parse(params, 0);
                self.sgr(args.as_slice());
            }
            'n' => match args.first_or(0) {
                5 => {
                    let _ = write!(self.output, "\x1b[0n");
                }
                6 => {
                    let row = (self.cursor.row as i32 + 1).clamp(1, rows);
                    let col = (self.cursor.col as i32 + 1).clamp(1, cols);
                    let _ = write!(self.output, "\x1b[{};{}R", row, col);
                }
                _ => {}
            },
            'h' | 'l' => self.private_mode(params, final_byte == 'h'),
            'r' => {
                if args.len() == 2 {
                    self.set_scroll_region(args.get_or(0, 1), args.get_or(1, 1));
                }
            }
            's' => self.cursor.save_pos(),
            'u' => self.cursor.restore_pos(),
            't' => match args.first_or(0) {
                18 => {
                    let _ = write!(self.output, "\x1b[8;{};{}t", self.rows, self.cols);
                }
                19 => {
                    let b = self.render.bounds;
                    let _ = write!(self.output, "\x1b[9;{};{}t", b.dy(), b.dx());
                }
                _ => {}
            },
            other => {
                let body: String = body.iter().collect();
                debug!("unhandled CSI: {:?} (final {:?})", body, other);
            }
        }
    }

    /// Private set/reset modes (`CSI ? n h` / `CSI ? n l`).
    fn private_mode(&mut self, params: &[char], set: bool) {
        if params.first() != Some(&'?') || params.len() < 2 {
            return;
        }
        let args = Args::parse(&params[1..], 0);
        match args.first_or(0) {
            0 | 1 => {
                // cursor-key application mode; the input path reads this
                self.config.cursor_key_application_mode = set;
                self.config_changed();
            }
            7 => {
                self.config.wraparound = set;
                self.config_changed();
            }
            12 => {
                self.config.local_echo = set;
                self.config_changed();
            }
            25 => {
                if set {
                    self.cursor.show = true;
                } else {
                    self.cursor.show = false;
                    self.hide_cursor();
                }
            }
            47 | 1049 => {
                // same thing here: snapshot in, restore out
                if set {
                    self.enter_alt_screen();
                } else {
                    self.exit_alt_screen();
                }
            }
            1000 => {
                self.config.mouse_events = if set { 1000 } else { 0 };
                self.config_changed();
            }
            1006 => {
                self.config.mouse_sgr = set;
                self.config_changed();
            }
            2004 => {} // bracketed paste, accepted and ignored
            other => debug!("unhandled private mode: {} (set={})", other, set),
        }
    }

    /// Select Graphic Rendition.
    fn sgr(&mut self, vals: &[i32]) {
        let mut i = 0;
        while i < vals.len() {
            match vals[i] {
                0 => self.attr = self.attr_default,
                1 => {
                    self.attr.bold = true;
                    if self.config.bold_colors {
                        // bold rebinds a base ANSI fg to its bright half
                        for idx in 0..8 {
                            if self.attr.fg == self.colors.ansi(idx) {
                                self.attr.fg = self.colors.ansi(idx + 8);
                                break;
                            }
                        }
                    }
                }
                22 => {
                    self.attr.bold = false;
                    if self.config.bold_colors {
                        for idx in 0..8 {
                            if self.attr.fg == self.colors.ansi(idx + 8) {
                                self.attr.fg = self.colors.ansi(idx);
                                break;
                            }
                        }
                    }
                }
                3 => self.attr.italic = true,
                23 => self.attr.italic = false,
                4 => self.attr.underline = true,
                21 => {
                    self.attr.underline = true;
                    self.attr.double_underline = true;
                }
                24 => {
                    self.attr.underline = false;
                    self.attr.double_underline = false;
                }
                5 => self.attr.blink = true,
                25 => self.attr.blink = false,
                7 => self.attr.reversed = true,
                27 => self.attr.reversed = false,
                8 => self.attr.conceal = true,
                28 => self.attr.conceal = false,
                9 => self.attr.strike = true,
                29 => self.attr.strike = false,
                30..=37 => {
                    let mut idx = (vals[i] - 30) as usize;
                    if self.config.bold_colors && self.attr.bold {
                        idx += 8;
                    }
                    self.attr.fg = self.colors.ansi(idx);
                }
                39 => self.attr.fg = self.attr_default.fg,
                40..=47 => self.attr.bg = self.colors.ansi((vals[i] - 40) as usize),
                49 => self.attr.bg = self.attr_default.bg,
                90..=97 => self.attr.fg = self.colors.ansi((vals[i] - 90 + 8) as usize),
                100..=107 => self.attr.bg = self.colors.ansi((vals[i] - 100 + 8) as usize),
                38 | 48 => {
                    let is_fg = vals[i] == 38;
                    match vals.get(i + 1) {
                        Some(5) => {
                            if let Some(&idx) = vals.get(i + 2) {
                                let c = self.colors.indexed_256(
                                    idx.rem_euclid(256) as u8,
                                    self.attr.fg,
                                    self.attr.bg,
                                );
                                if is_fg {
                                    self.attr.fg = c;
                                } else {
                                    self.attr.bg = c;
                                }
                            }
                            i += 2;
                        }
                        Some(2) => {
                            let chan = |off: usize| {
                                vals.get(i + 2 + off).copied().unwrap_or(0).clamp(0, 255) as u8
                            };
                            let c = self.colors.convert(Rgb::new(chan(0), chan(1), chan(2)));
                            if is_fg {
                                self.attr.fg = c;
                            } else {
                                self.attr.bg = c;
                            }
                            i += 4;
                        }
                        _ => {}
                    }
                }
                other => debug!("unhandled SGR code: {}", other),
            }
            i += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{cell_bg, cell_byte, cell_fg, cell_is_bold, test_term, Capture};

    #[test]
    fn test_cursor_position_is_one_based() {
        let mut t = test_term(80, 24);
        t.process(b"\x1b[5;10H");
        assert_eq!(t.cursor_pos(), (9, 4));
        // CSI ;5H reads as CSI 1;5H
        t.process(b"\x1b[;5H");
        assert_eq!(t.cursor_pos(), (4, 0));
    }

    #[test]
    fn test_cursor_motion_clamps() {
        let mut t = test_term(10, 5);
        t.process(b"\x1b[99C");
        assert_eq!(t.cursor_pos(), (9, 0));
        t.process(b"\x1b[99B");
        assert_eq!(t.cursor_pos(), (9, 4));
        t.process(b"\x1b[99A\x1b[99D");
        assert_eq!(t.cursor_pos(), (0, 0));
    }

    #[test]
    fn test_cursor_next_prev_line() {
        let mut t = test_term(10, 5);
        t.process(b"\x1b[3;6H\x1b[E");
        assert_eq!(t.cursor_pos(), (0, 3));
        t.process(b"\x1b[3;6H\x1b[2F");
        assert_eq!(t.cursor_pos(), (0, 0));
    }

    #[test]
    fn test_column_and_row_absolute() {
        let mut t = test_term(10, 5);
        t.process(b"\x1b[7G");
        assert_eq!(t.cursor_pos(), (6, 0));
        t.process(b"\x1b[4d");
        assert_eq!(t.cursor_pos(), (6, 3));
    }

    #[test]
    fn test_erase_screen_keeps_cursor() {
        let mut t = test_term(10, 5);
        t.process(b"AB\x1b[4;8H");
        t.process(b"\x1b[2J");
        assert_eq!(t.cursor_pos(), (7, 3));
        assert_eq!(cell_byte(&t, 0, 0), None);
        assert_eq!(cell_byte(&t, 1, 0), None);
    }

    #[test]
    fn test_erase_below_and_above() {
        let mut t = test_term(4, 3);
        t.process(b"AAAA\nBBBB\nCCCC");
        t.process(b"\x1b[2;3H\x1b[0J");
        assert_eq!(cell_byte(&t, 0, 0), Some(b'A'));
        assert_eq!(cell_byte(&t, 1, 1), Some(b'B'));
        assert_eq!(cell_byte(&t, 2, 1), None);
        assert_eq!(cell_byte(&t, 0, 2), None);

        let mut t = test_term(4, 3);
        t.process(b"AAAA\nBBBB\nCCCC");
        t.process(b"\x1b[2;3H\x1b[1J");
        assert_eq!(cell_byte(&t, 0, 0), None);
        assert_eq!(cell_byte(&t, 0, 1), None);
        assert_eq!(cell_byte(&t, 1, 1), None);
        assert_eq!(cell_byte(&t, 2, 1), Some(b'B'));
        assert_eq!(cell_byte(&t, 0, 2), Some(b'C'));
    }

    #[test]
    fn test_erase_line_variants() {
        let mut t = test_term(6, 2);
        t.process(b"XXXXXX");
        t.process(b"\x1b[1;4H\x1b[K");
        assert_eq!(cell_byte(&t, 2, 0), Some(b'X'));
        assert_eq!(cell_byte(&t, 3, 0), None);

        t.process(b"\x1b[1;4H\x1b[1K");
        assert_eq!(cell_byte(&t, 0, 0), None);
        assert_eq!(cell_byte(&t, 2, 0), None);
    }

    #[test]
    fn test_erase_chars() {
        let mut t = test_term(8, 2);
        t.process(b"ABCDEFGH\x1b[1;3H\x1b[2X");
        assert_eq!(cell_byte(&t, 1, 0), Some(b'B'));
        assert_eq!(cell_byte(&t, 2, 0), None);
        assert_eq!(cell_byte(&t, 3, 0), None);
        assert_eq!(cell_byte(&t, 4, 0), Some(b'E'));
    }

    #[test]
    fn test_delete_chars_shifts_left() {
        let mut t = test_term(6, 2);
        t.process(b"ABCDEF\x1b[1;2H\x1b[2P");
        assert_eq!(cell_byte(&t, 0, 0), Some(b'A'));
        assert_eq!(cell_byte(&t, 1, 0), Some(b'D'));
        assert_eq!(cell_byte(&t, 2, 0), Some(b'E'));
        assert_eq!(cell_byte(&t, 3, 0), Some(b'F'));
        // vacated tail is cleared
        assert_eq!(cell_byte(&t, 4, 0), None);
        assert_eq!(cell_byte(&t, 5, 0), None);
    }

    #[test]
    fn test_insert_chars_opens_blank_gap() {
        let mut t = test_term(6, 2);
        t.process(b"ABCDEF\x1b[1;2H\x1b[2@");
        assert_eq!(cell_byte(&t, 0, 0), Some(b'A'));
        assert_eq!(cell_byte(&t, 1, 0), None);
        assert_eq!(cell_byte(&t, 2, 0), None);
        assert_eq!(cell_byte(&t, 3, 0), Some(b'B'));
        assert_eq!(cell_byte(&t, 4, 0), Some(b'C'));
        assert_eq!(cell_byte(&t, 5, 0), Some(b'D'));
    }

    #[test]
    fn test_insert_delete_lines() {
        let mut t = test_term(4, 5);
        t.process(b"A\nB\nC\nD\nE");
        t.process(b"\x1b[2;1H\x1b[2L");
        assert_eq!(cell_byte(&t, 0, 0), Some(b'A'));
        assert_eq!(cell_byte(&t, 0, 1), None);
        assert_eq!(cell_byte(&t, 0, 2), None);
        assert_eq!(cell_byte(&t, 0, 3), Some(b'B'));
        assert_eq!(cell_byte(&t, 0, 4), Some(b'C'));

        t.process(b"\x1b[2;1H\x1b[2M");
        assert_eq!(cell_byte(&t, 0, 0), Some(b'A'));
        assert_eq!(cell_byte(&t, 0, 1), Some(b'B'));
        assert_eq!(cell_byte(&t, 0, 2), Some(b'C'));
        assert_eq!(cell_byte(&t, 0, 3), None);
    }

    #[test]
    fn test_device_attributes_reply() {
        let out = Capture::default();
        let mut t = test_term(10, 5);
        t.set_output(Box::new(out.clone()));
        t.process(b"\x1b[c");
        assert_eq!(out.take(), "\x1b[?1;2c");
    }

    #[test]
    fn test_dsr_replies() {
        let out = Capture::default();
        let mut t = test_term(80, 24);
        t.set_output(Box::new(out.clone()));

        t.process(b"\x1b[5n");
        assert_eq!(out.take(), "\x1b[0n");

        t.process(b"\x1b[3;40H\x1b[6n");
        assert_eq!(out.take(), "\x1b[3;40R");
    }

    #[test]
    fn test_window_size_reports() {
        let out = Capture::default();
        let mut t = test_term(40, 12);
        t.set_output(Box::new(out.clone()));

        t.process(b"\x1b[18t");
        assert_eq!(out.take(), "\x1b[8;12;40t");

        t.process(b"\x1b[19t");
        assert_eq!(out.take(), "\x1b[9;192;320t");
    }

    #[test]
    fn test_save_restore_cursor_csi() {
        let mut t = test_term(10, 5);
        t.process(b"\x1b[2;3H\x1b[s\x1b[5;9H\x1b[u");
        assert_eq!(t.cursor_pos(), (2, 1));
    }

    #[test]
    fn test_sgr_foreground_and_reset() {
        let mut t = test_term(10, 2);
        t.process(b"\x1b[31mX\x1b[mY");
        assert_eq!(cell_fg(&t, 0, 0), Some(t.colors.ansi(1)));
        assert_eq!(cell_fg(&t, 1, 0), Some(t.attr_default.fg));
    }

    #[test]
    fn test_sgr_bold_colors_rebind() {
        let mut t = test_term(10, 2);
        // with bold_colors on (the default), 31 while bold lands on the
        // bright half
        t.process(b"\x1b[1;31m");
        assert_eq!(t.attr.fg, t.colors.ansi(9));
        t.process(b"\x1b[22m");
        assert_eq!(t.attr.fg, t.colors.ansi(1));
    }

    #[test]
    fn test_sgr_plain_red_without_bold() {
        let mut t = test_term(10, 2);
        t.config_mut().bold_colors = false;
        t.process(b"\x1b[31mX");
        assert_eq!(cell_fg(&t, 0, 0), Some(t.colors.ansi(1)));
    }

    #[test]
    fn test_sgr_bold_selects_bold_face() {
        let mut t = test_term(10, 2);
        t.process(b"A\x1b[1mB");
        assert!(!cell_is_bold(&t, 0, 0));
        assert!(cell_is_bold(&t, 1, 0));
    }

    #[test]
    fn test_sgr_reverse_swaps_cell_colors() {
        let mut t = test_term(10, 2);
        t.process(b"\x1b[7mX");
        assert_eq!(cell_fg(&t, 0, 0), Some(t.attr_default.bg));
        assert_eq!(cell_bg(&t, 0, 0), t.attr_default.fg);
    }

    #[test]
    fn test_sgr_256_and_truecolor() {
        let mut t = test_term(10, 2);
        t.process(b"\x1b[38;5;196m");
        assert_eq!(t.attr.fg, Rgb::new(255, 0, 0));
        t.process(b"\x1b[48;2;1;2;3m");
        assert_eq!(t.attr.bg, Rgb::new(1, 2, 3));
        // following codes in the same sequence still apply
        t.process(b"\x1b[38;5;21;4m");
        assert!(t.attr.underline);
    }

    #[test]
    fn test_sgr_toggles() {
        let mut t = test_term(10, 2);
        t.process(b"\x1b[3;4;5;7;8;9m");
        assert!(t.attr.italic && t.attr.underline && t.attr.blink);
        assert!(t.attr.reversed && t.attr.conceal && t.attr.strike);
        t.process(b"\x1b[23;24;25;27;28;29m");
        assert_eq!(t.attr, t.attr_default);
        t.process(b"\x1b[21m");
        assert!(t.attr.underline && t.attr.double_underline);
        t.process(b"\x1b[24m");
        assert!(!t.attr.underline && !t.attr.double_underline);
    }

    #[test]
    fn test_private_mode_flags() {
        let mut t = test_term(10, 5);
        t.process(b"\x1b[?1h");
        assert!(t.config().cursor_key_application_mode);
        t.process(b"\x1b[?1l");
        assert!(!t.config().cursor_key_application_mode);

        t.process(b"\x1b[?7l");
        assert!(!t.config().wraparound);
        t.process(b"\x1b[?7h");
        assert!(t.config().wraparound);

        t.process(b"\x1b[?12h");
        assert!(t.config().local_echo);

        t.process(b"\x1b[?1000h\x1b[?1006h");
        assert_eq!(t.config().mouse_events, 1000);
        assert!(t.config().mouse_sgr);
    }

    #[test]
    fn test_cursor_show_hide() {
        let mut t = test_term(10, 5);
        t.process(b"A");
        assert!(t.cursor.visible);
        t.process(b"\x1b[?25l");
        assert!(!t.cursor.show);
        assert!(!t.cursor.visible);
        t.process(b"\x1b[?25h");
        assert!(t.cursor.show);
    }

    #[test]
    fn test_alt_screen_round_trip() {
        let mut t = test_term(10, 3);
        t.process(b"main\x1b[?1049h");
        // alternate screen starts clear, cursor position is its own
        assert_eq!(cell_byte(&t, 0, 0), None);
        t.process(b"ALT");
        assert_eq!(cell_byte(&t, 0, 0), Some(b'A'));
        t.process(b"\x1b[?1049l");
        // main content and cursor return
        assert_eq!(cell_byte(&t, 0, 0), Some(b'm'));
        assert_eq!(t.cursor_pos(), (4, 0));
    }

    #[test]
    fn test_alt_screen_disabled_by_config() {
        let mut t = test_term(10, 3);
        t.config_mut().alt_screen = false;
        t.process(b"main\x1b[?1049h");
        assert_eq!(cell_byte(&t, 0, 0), Some(b'm'));
    }

    #[test]
    fn test_config_change_notification() {
        use std::sync::{Arc, Mutex};
        let seen = Arc::new(Mutex::new(0));
        let mut t = test_term(10, 3);
        let counter = seen.clone();
        t.set_config_fn(move |_| *counter.lock().unwrap() += 1);
        t.process(b"\x1b[?7l\x1b[?1h");
        assert_eq!(*seen.lock().unwrap(), 2);
    }

    #[test]
    fn test_scroll_region_with_linefeeds() {
        // ESC[1;3r then four linefeeds from (0,0): the cursor gets trapped
        // on the region's bottom row while the region scrolls
        let mut t = test_term(10, 5);
        t.process(b"\x1b[1;3r\n\n\n\n");
        assert_eq!(t.cursor_pos(), (0, 2));
        assert_eq!(t.scroll_region, [0, 2]);
    }

    #[test]
    fn test_unknown_final_is_ignored() {
        let mut t = test_term(10, 5);
        t.process(b"\x1b[1;2;3~X");
        assert_eq!(cell_byte(&t, 0, 0), Some(b'X'));
        assert_eq!(t.attr, t.attr_default);
    }
}
