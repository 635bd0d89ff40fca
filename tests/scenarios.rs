//! End-to-end byte-stream scenarios
//!
//! Each test feeds a byte stream into a terminal over an in-memory
//! surface and asserts on the resulting pixels and cursor. The tile set
//! encodes each code point's identity into its glyph (a marker line on
//! row 0, the low byte of the code point as a bit pattern on row 1), so
//! "which glyph is in this cell" can be read back out of raw pixels.

use std::io;
use std::sync::{Arc, Mutex};

use rasterm::{BufferSurface, FontTileSet, Rgb, Term, TileSets};

const CELL_W: i32 = 8;
const CELL_H: i32 = 16;

fn identity_mask(ch: char) -> Vec<u8> {
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
    mask
}

fn tiles() -> TileSets {
    let mut set = FontTileSet::new(CELL_W, CELL_H);
    for code in 0x20u32..=0x7E {
        if let Some(ch) = char::from_u32(code) {
            set.set_tile(ch, identity_mask(ch));
        }
    }
    for ch in ['─', '│', '┌', '┐', '└', '┘', '┼'] {
        set.set_tile(ch, identity_mask(ch));
    }
    let bold = set.clone();
    TileSets::new(Arc::new(set), Arc::new(bold))
}

/// A terminal over an exactly-fitting surface, cursor hidden so pixel
/// assertions see only glyphs.
fn term(cols: usize, rows: usize) -> Term {
    let surface = BufferSurface::new(cols as i32 * CELL_W, rows as i32 * CELL_H);
    let mut t = Term::new(cols, rows, Box::new(surface), tiles());
    t.process(b"\x1b[?25l");
    t
}

fn px(t: &Term, x: i32, y: i32) -> Rgb {
    t.with_surface_ref(|s| s.get(x, y))
}

/// Read the identity glyph back out of a cell; `None` for an empty cell.
fn cell(t: &Term, col: usize, row: usize) -> Option<u8> {
    let x0 = col as i32 * CELL_W;
    let y0 = row as i32 * CELL_H;
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

fn cursor(t: &mut Term) -> (usize, usize) {
    // read the cursor back through the terminal's own status report
    let out = Capture::default();
    t.set_output(Box::new(out.clone()));
    t.process(b"\x1b[6n");
    let reply = out.take();
    let body = reply
        .strip_prefix("\x1b[")
        .and_then(|s| s.strip_suffix('R'))
        .expect("DSR reply");
    let (row, col) = body.split_once(';').expect("row;col");
    (
        col.parse::<usize>().expect("col") - 1,
        row.parse::<usize>().expect("row") - 1,
    )
}

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    fn take(&self) -> String {
        let mut buf = self.0.lock().expect("capture lock");
        let s = String::from_utf8_lossy(&buf).into_owned();
        buf.clear();
        s
    }
}

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("capture lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn print_and_linefeed() {
    // "A\nB" from (0,0): A at cell (0,0), B at cell (0,1), cursor (1,1)
    let mut t = term(80, 24);
    t.process(b"A\nB");
    assert_eq!(cell(&t, 0, 0), Some(b'A'));
    assert_eq!(cell(&t, 0, 1), Some(b'B'));
    assert_eq!(cursor(&mut t), (1, 1));
}

#[test]
fn sgr_color_and_reset() {
    // X in ANSI red, Y back in the default foreground
    let mut t = term(80, 24);
    t.process(b"\x1b[31mX\x1b[mY");
    let x_fg = px(&t, 0, 0);
    let y_fg = px(&t, CELL_W, 0);
    assert_ne!(x_fg, y_fg);
    assert_eq!(x_fg, Rgb::new(127, 0, 0));
    assert_eq!(cell(&t, 0, 0), Some(b'X'));
    assert_eq!(cell(&t, 1, 0), Some(b'Y'));
}

#[test]
fn cursor_position_is_one_based() {
    let mut t = term(80, 24);
    t.process(b"\x1b[5;10H");
    assert_eq!(cursor(&mut t), (9, 4));
}

#[test]
fn erase_screen_keeps_cursor() {
    let mut t = term(80, 24);
    t.process(b"hello\x1b[4;8H");
    t.process(b"\x1b[2J");
    for col in 0..5 {
        assert_eq!(cell(&t, col, 0), None);
    }
    assert_eq!(cursor(&mut t), (7, 3));
}

#[test]
fn device_status_report() {
    let out = Capture::default();
    let mut t = term(80, 24);
    t.set_output(Box::new(out.clone()));
    t.process(b"\x1b[3;40H\x1b[6n");
    assert_eq!(out.take(), "\x1b[3;40R");
}

#[test]
fn scroll_region_linefeeds() {
    // region rows 1..3 (1-based); four linefeeds from the top leave the
    // cursor trapped on the region's bottom row
    let mut t = term(80, 24);
    t.process(b"\x1b[1;3r\n\n\n\n");
    assert_eq!(cursor(&mut t), (0, 2));
}

#[test]
fn shift_out_line_drawing() {
    // SO 'q' SI renders the horizontal box-drawing rune, not ASCII 'q'
    let mut t = term(80, 24);
    t.process(b"\x0e q\x0f");
    assert_eq!(cell(&t, 1, 0), Some((0x2500u32 & 0xFF) as u8));
    assert_ne!(cell(&t, 1, 0), Some(b'q'));
}

#[test]
fn wrap_round_trip() {
    let cols = 10;

    // wraparound on: the last printable leaves the transient past-end
    // state; the next one lands at the start of the next row
    let mut t = term(cols, 4);
    for _ in 0..cols {
        t.process(b"x");
    }
    t.process(b"y");
    assert_eq!(cell(&t, 0, 1), Some(b'y'));
    assert_eq!(cursor(&mut t), (1, 1));

    // wraparound off: the cursor saturates in the last column
    let mut t = term(cols, 4);
    t.process(b"\x1b[?7l");
    for _ in 0..cols {
        t.process(b"x");
    }
    t.process(b"y");
    assert_eq!(cursor(&mut t), (cols - 1, 0));
    assert_eq!(cell(&t, cols - 1, 0), Some(b'y'));
    assert_eq!(cell(&t, 0, 1), None);
}

#[test]
fn attribute_reset_is_idempotent() {
    let mut t = term(20, 5);
    t.process(b"\x1b[1;4;31;44m\x1bcA");
    let plain = px(&t, 0, 0);

    let mut u = term(20, 5);
    u.process(b"A");
    assert_eq!(px(&u, 0, 0), plain);

    // SGR 0 alone restores the same defaults
    let mut v = term(20, 5);
    v.process(b"\x1b[31;44m\x1b[0mA");
    assert_eq!(px(&v, 0, 0), plain);
}

#[test]
fn undefined_code_point_draws_empty_tile() {
    let mut t = term(20, 5);
    // U+0107 is not in the tile set: pure background, cursor advances
    t.process("ć".as_bytes());
    assert_eq!(cell(&t, 0, 0), None);
    assert_eq!(cursor(&mut t), (1, 0));
}

#[test]
fn chunked_escape_equals_whole_escape() {
    let stream = b"\x1b[2;2H\x1b[1;32mok";
    let mut whole = term(20, 5);
    whole.process(stream);

    let mut chunked = term(20, 5);
    for byte in stream {
        chunked.process(&[*byte]);
    }

    for col in 0..4 {
        assert_eq!(cell(&whole, col, 1), cell(&chunked, col, 1), "col {}", col);
        assert_eq!(
            px(&whole, col as i32 * CELL_W, CELL_H),
            px(&chunked, col as i32 * CELL_W, CELL_H)
        );
    }
}

#[test]
fn centered_when_surface_is_larger() {
    // a surface with 6 spare pixels each way centers the cell grid by 3
    let surface = BufferSurface::new(2 * CELL_W + 6, CELL_H + 6);
    let mut t = Term::new(2, 1, Box::new(surface), tiles());
    t.process(b"\x1b[?25lA");
    // marker row of the glyph sits at the centering offset
    let probe = px(&t, 3, 3);
    assert_ne!(probe, px(&t, 3, 5));
    assert_eq!(px(&t, 0, 0), Rgb::BLACK);
}

#[test]
fn graphics_rectangle_and_query() {
    let out = Capture::default();
    let mut t = term(20, 5);
    t.set_output(Box::new(out.clone()));
    t.process(b"\x1b/F1,1;4,4;#336699\x07\x1b/A2,2\x07");
    assert_eq!(out.take(), "\x1b/A2,2;#336699\x07");
}

#[test]
fn bell_and_title_callbacks() {
    let events: Arc<Mutex<Vec<String>>> = Arc::default();
    let mut t = term(20, 5);

    let sink = events.clone();
    t.set_bell_fn(move |id| sink.lock().expect("events").push(format!("bell:{}", id)));
    t.process(b"\x07\x1b]0;demo\x07\x1b/dding\x07");

    assert_eq!(
        events.lock().expect("events").as_slice(),
        &["bell:bel".to_string(), "bell:ding".to_string()]
    );
    assert_eq!(
        t.config()
            .properties
            .get(&rasterm::Property::WindowTitle)
            .map(String::as_str),
        Some("demo")
    );
}
