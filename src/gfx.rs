//! Private `ESC /` pixel-graphics protocol
//!
//! Pixel-addressed drawing on the terminal surface: point/line/rectangle/
//! circle primitives, image blits, per-cell bitmaps, user-defined tiles,
//! and a raw vector scroll. Coordinates are terminal-local pixels and get
//! translated by the render origin; colors arrive as `#RRGGBB` or
//! `R,G,B`, defaulting to the active foreground. A malformed operation is
//! skipped without disturbing cursor or attributes.

use std::io::Write;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use log::debug;

use rasterm_core::{Point, Rect, Rgb};
use rasterm_parser::{split_params, trim_st};

use crate::term::Term;
use crate::tiles::{MultiTileSet, Tile, UserTileSet};
use crate::xform::invert_region;

impl Term {
    pub(crate) fn handle_graphics(&mut self, body: &[char]) {
        let body = trim_st(body);
        if body.len() <= 1 {
            return;
        }
        let op = body[0];
        let params = split_params(&body[1..]);

        match op {
            'A' | 'a' => self.gfx_color_at(op, &params),
            'B' => self.gfx_blit(&params),
            'C' => self.gfx_cell_image(&params),
            'c' => self.gfx_cell_bitmap(&params),
            'd' => {
                let id: String = body[1..].iter().collect();
                if let Some(f) = self.bell_fn.as_mut() {
                    f(&id);
                }
            }
            'F' => self.gfx_fill_rect(&params),
            'I' => self.gfx_invert(&params),
            'L' => self.gfx_line(&params),
            'P' => self.gfx_palette(&params),
            'R' => self.gfx_circle_filled(&params),
            'r' => self.gfx_circle_outline(&params),
            'b' => self.gfx_box(&params),
            'S' | 's' => self.gfx_set_pixel(op, &params),
            'u' => self.gfx_user_tile(&params),
            'V' => self.gfx_vector_scroll(&params),
            other => debug!("unhandled graphics op: {:?}", other),
        }
    }

    /// `A x,y` / `a x,y`: report the color at a pixel, absolute or
    /// cursor-relative.
    fn gfx_color_at(&mut self, op: char, params: &[&[char]]) {
        let Some(pt) = params.first().and_then(|p| parse_point(p)) else {
            return;
        };
        let origin = if op == 'A' {
            self.render.bounds.min
        } else {
            self.cursor_pt()
        };
        let loc = pt.add(origin);
        let c = self.render.get_pixel(loc.x, loc.y);
        let _ = write!(
            self.output,
            "\x1b/{}{},{};#{:02x}{:02x}{:02x}\x07",
            op, loc.x, loc.y, c.r, c.g, c.b
        );
    }

    /// `B [x,y;][x2,y2;]<base64 image>`: decode and blit an image at the
    /// cursor, at a point, or into a rectangle; the cursor advances by
    /// the blit width in cells.
    fn gfx_blit(&mut self, params: &[&[char]]) {
        let (target, image) = match params.len() {
            1 => {
                let Some(img) = decode_image(params[0]) else {
                    return;
                };
                let target =
                    Rect::from_size(img.width, img.height).translate(self.cursor_pt());
                (target, img)
            }
            2 => {
                let Some(pt) = parse_point(params[0]) else {
                    return;
                };
                let Some(img) = decode_image(params[1]) else {
                    return;
                };
                let target = Rect::from_size(img.width, img.height)
                    .translate(self.render.bounds.min)
                    .translate(pt);
                (target, img)
            }
            3 => {
                let (Some(p1), Some(p2)) = (parse_point(params[0]), parse_point(params[1]))
                else {
                    return;
                };
                let Some(img) = decode_image(params[2]) else {
                    return;
                };
                let target = Rect { min: p1, max: p2 }
                    .canon()
                    .translate(self.render.bounds.min);
                (target, img)
            }
            _ => return,
        };

        self.draw_rgba_over(target, target.min, Point::default(), &image);

        let cell_w = self.render.cell.dx();
        let mut cells = target.dx() / cell_w;
        if target.dx() % cell_w != 0 {
            cells += 1;
        }
        self.cursor
            .move_rel(cells as isize, 0, self.cols, self.rows);
    }

    /// `C [x,y;]<data>`: paint the cursor's cell from an encoded image
    /// (with optional source offset), or from raw RGB bytes sized to one
    /// cell when the payload is not a decodable image.
    fn gfx_cell_image(&mut self, params: &[&[char]]) {
        let mut src_offset = Point::default();
        if params.len() == 2 {
            let Some(pt) = parse_point(params[0]) else {
                return;
            };
            src_offset = pt;
        }
        let Some(&payload) = params.last() else {
            return;
        };

        let cell = self.render.cell;
        let target = cell.translate(self.cursor_pt());

        if let Some(img) = decode_image(payload) {
            self.draw_rgba_over(target, target.min, src_offset, &img);
            return;
        }

        // raw fallback: base64 of one cell of RGB bytes
        let text: String = payload.iter().collect();
        let Ok(raw) = BASE64.decode(text.trim()) else {
            return;
        };
        if raw.len() < (cell.dx() * cell.dy() * 3) as usize {
            return;
        }
        for y in 0..cell.dy() {
            for x in 0..cell.dx() {
                let i = ((y * cell.dx() + x) * 3) as usize;
                self.render.set_pixel(
                    target.min.x + x,
                    target.min.y + y,
                    Rgb::new(raw[i], raw[i + 1], raw[i + 2]),
                );
            }
        }
        self.advance_one_cell();
    }

    /// `c <32 hex | 24 base64>`: a 1-bit cell bitmap drawn in the active
    /// colors; the cursor advances one cell.
    fn gfx_cell_bitmap(&mut self, params: &[&[char]]) {
        let Some(&data) = params.first() else {
            return;
        };
        let mut rows = [0u8; 16];
        match data.len() {
            32 => {
                for (i, row) in rows.iter_mut().enumerate() {
                    let pair: String = data[i * 2..i * 2 + 2].iter().collect();
                    match u8::from_str_radix(&pair, 16) {
                        Ok(v) => *row = v,
                        Err(_) => return,
                    }
                }
            }
            24 => {
                let text: String = data.iter().collect();
                let Ok(buf) = BASE64.decode(text) else {
                    return;
                };
                if buf.len() < 16 {
                    return;
                }
                rows.copy_from_slice(&buf[..16]);
            }
            _ => return,
        }

        let tile = Tile::from_bits(rows);
        let pt = self.cursor_pt();
        let (fg, bg) = (self.render.active.fg, self.render.active.bg);
        tile.draw(self.render.surface.as_mut(), pt, fg, Some(bg));
        self.advance_one_cell();
    }

    /// `F x1,y1;x2,y2[;color]`: filled rectangle.
    fn gfx_fill_rect(&mut self, params: &[&[char]]) {
        let Some((rect, color)) = self.parse_rect_and_color(params) else {
            return;
        };
        self.render.fill(rect, color);
    }

    /// `I x1,y1;x2,y2`: invert a region.
    fn gfx_invert(&mut self, params: &[&[char]]) {
        if params.len() < 2 {
            return;
        }
        let (Some(p1), Some(p2)) = (parse_point(params[0]), parse_point(params[1])) else {
            return;
        };
        let region = Rect { min: p1, max: p2 }
            .canon()
            .translate(self.render.bounds.min)
            .intersect(self.render.bounds);
        invert_region(self.render.surface.as_mut(), region);
    }

    /// `L x1,y1;x2,y2[;color]`: Bresenham line.
    fn gfx_line(&mut self, params: &[&[char]]) {
        if params.len() < 2 {
            return;
        }
        let (Some(p1), Some(p2)) = (parse_point(params[0]), parse_point(params[1])) else {
            return;
        };
        let color = params
            .get(2)
            .and_then(|p| parse_color(p))
            .unwrap_or(self.render.active.fg);

        let origin = self.render.bounds.min;
        let (mut a, mut b) = (p1.add(origin), p2.add(origin));

        let mut dx = (a.x - b.x).abs();
        let mut dy = (a.y - b.y).abs();
        let mut swapped = false;
        if dy > dx {
            std::mem::swap(&mut dx, &mut dy);
            std::mem::swap(&mut a.x, &mut a.y);
            std::mem::swap(&mut b.x, &mut b.y);
            swapped = true;
        }
        let x_step = if a.x < b.x { 1 } else { -1 };
        let y_step = if a.y < b.y { 1 } else { -1 };
        let mut p = 2 * dy - dx;
        let (mut x, mut y) = (a.x, a.y);
        for _ in 0..=dx {
            if swapped {
                self.render.set_pixel(y, x, color);
            } else {
                self.render.set_pixel(x, y, color);
            }
            if p >= 0 {
                y += y_step;
                p -= 2 * dx;
            }
            x += x_step;
            p += 2 * dy;
        }
    }

    /// `P a<id>;#RGB`: rewrite an ANSI palette entry (truecolor builds);
    /// `P p<id>;#RGB` (256-palette) is accepted and ignored.
    fn gfx_palette(&mut self, params: &[&[char]]) {
        if params.len() < 2 {
            return;
        }
        let selector = params[0];
        let Some(&kind) = selector.first() else {
            return;
        };
        let id: String = selector[1..].iter().collect();
        let Ok(id) = id.parse::<usize>() else {
            return;
        };
        let Some(color) = parse_color(params[1]) else {
            return;
        };
        match kind {
            'a' => {
                if id < 16 && self.colors.mode == rasterm_core::ColorMode::TrueColor {
                    self.colors.palette_ansi[id] = color;
                }
            }
            'p' => {} // computed palette, not rewritable
            _ => {}
        }
    }

    /// `R x,y,r[;color]`: filled circle.
    fn gfx_circle_filled(&mut self, params: &[&[char]]) {
        let Some((cx, cy, r)) = params.first().and_then(|p| parse_triple(p)) else {
            return;
        };
        let r = r.clamp(0, self.render.bounds.dx().max(self.render.bounds.dy()));
        let color = params
            .get(1)
            .and_then(|p| parse_color(p))
            .unwrap_or(self.render.active.fg);
        let origin = self.render.bounds.min;
        for yp in -r..=r {
            for xp in -r..=r {
                if xp * xp + yp * yp <= r * r {
                    self.render
                        .set_pixel(cx + xp + origin.x, cy + yp + origin.y, color);
                }
            }
        }
    }

    /// `r x,y,r[;color]`: circle outline by the midpoint algorithm.
    fn gfx_circle_outline(&mut self, params: &[&[char]]) {
        let Some((cx, cy, r)) = params.first().and_then(|p| parse_triple(p)) else {
            return;
        };
        let r = r.clamp(0, self.render.bounds.dx().max(self.render.bounds.dy()));
        let color = params
            .get(1)
            .and_then(|p| parse_color(p))
            .unwrap_or(self.render.active.fg);
        let origin = self.render.bounds.min;
        let (x0, y0) = (cx + origin.x, cy + origin.y);

        let mut xp = 0;
        let mut yp = r;
        let mut de = 3 - 2 * r;
        while xp <= yp {
            for (px, py) in [
                (xp, yp),
                (xp, -yp),
                (-xp, yp),
                (-xp, -yp),
                (yp, xp),
                (yp, -xp),
                (-yp, xp),
                (-yp, -xp),
            ] {
                self.render.set_pixel(x0 + px, y0 + py, color);
            }
            if de < 0 {
                de += 4 * xp + 6;
            } else {
                de += 4 * (xp - yp) + 10;
                yp -= 1;
            }
            xp += 1;
        }
    }

    /// `b x1,y1;x2,y2[;color]`: rectangle outline, edges inclusive.
    fn gfx_box(&mut self, params: &[&[char]]) {
        let Some((rect, color)) = self.parse_rect_and_color(params) else {
            return;
        };
        let rect = rect.translate(self.render.bounds.min);
        for x in rect.min.x..=rect.max.x {
            self.render.set_pixel(x, rect.min.y, color);
            self.render.set_pixel(x, rect.max.y, color);
        }
        for y in rect.min.y..=rect.max.y {
            self.render.set_pixel(rect.min.x, y, color);
            self.render.set_pixel(rect.max.x, y, color);
        }
    }

    /// `S x,y[;color]` / `s x,y[;color]`: set one pixel, absolute or
    /// cursor-relative, wrapped into the render bounds.
    fn gfx_set_pixel(&mut self, op: char, params: &[&[char]]) {
        let Some(pt) = params.first().and_then(|p| parse_point(p)) else {
            return;
        };
        let color = params
            .get(1)
            .and_then(|p| parse_color(p))
            .unwrap_or(self.render.active.fg);
        let origin = if op == 'S' {
            self.render.bounds.min
        } else {
            self.cursor_pt()
        };
        let loc = pt.add(origin).wrap(self.render.bounds);
        self.render.set_pixel(loc.x, loc.y, color);
    }

    /// `u <codepoint>;<base64 image>`: install a full-color tile for a
    /// code point, layered in front of the alternate charset.
    fn gfx_user_tile(&mut self, params: &[&[char]]) {
        if params.len() < 2 {
            return;
        }
        let Some(&ch) = params[0].first() else {
            return;
        };
        let Some(img) = decode_image(params[1]) else {
            return;
        };

        if self.render.user_set.is_none() {
            let (cw, chh) = (self.render.cell.dx(), self.render.cell.dy());
            let user = Arc::new(UserTileSet::new(cw, chh));
            self.render.alt_char_set = Arc::new(MultiTileSet::new(vec![
                user.clone(),
                self.render.alt_char_set.clone(),
            ]));
            self.render.user_set = Some(user);
        }
        if let Some(user) = &self.render.user_set {
            user.insert(ch, Tile::rgba(img.width, img.height, img.pix));
        }
    }

    /// `V x1,y1;x2,y2;dx,dy`: raw vector scroll of a region.
    fn gfx_vector_scroll(&mut self, params: &[&[char]]) {
        if params.len() < 3 {
            return;
        }
        let (Some(p1), Some(p2), Some(v)) = (
            parse_point(params[0]),
            parse_point(params[1]),
            parse_point(params[2]),
        ) else {
            return;
        };
        let region = Rect { min: p1, max: p2 }
            .canon()
            .translate(self.render.bounds.min)
            .intersect(self.render.bounds);
        self.render.vector_scroll(region, v);
    }

    /// Shared `x1,y1;x2,y2[;color]` parsing for the rectangle ops; the
    /// rectangle is canonicalized and stays terminal-local.
    fn parse_rect_and_color(&self, params: &[&[char]]) -> Option<(Rect, Rgb)> {
        if params.len() < 2 {
            return None;
        }
        let p1 = parse_point(params[0])?;
        let p2 = parse_point(params[1])?;
        let color = params
            .get(2)
            .and_then(|p| parse_color(p))
            .unwrap_or(self.render.active.fg);
        Some((Rect { min: p1, max: p2 }.canon(), color))
    }

    /// Alpha-over composite of decoded RGBA pixels into `clip`, with the
    /// image origin at `at` and sampling shifted by `src_offset`.
    fn draw_rgba_over(&mut self, clip: Rect, at: Point, src_offset: Point, img: &DecodedImage) {
        let clip = clip.intersect(self.render.bounds);
        for y in clip.min.y..clip.max.y {
            for x in clip.min.x..clip.max.x {
                let sx = x - at.x + src_offset.x;
                let sy = y - at.y + src_offset.y;
                if sx < 0 || sy < 0 || sx >= img.width || sy >= img.height {
                    continue;
                }
                let i = ((sy * img.width + sx) * 4) as usize;
                let (r, g, b, a) = (img.pix[i], img.pix[i + 1], img.pix[i + 2], img.pix[i + 3]);
                match a {
                    0 => {}
                    255 => self.render.set_pixel(x, y, Rgb::new(r, g, b)),
                    a => {
                        let under = self.render.get_pixel(x, y);
                        let blend = |u: u8, f: u8| crate::tiles::alpha_blend(u, f, a);
                        self.render.set_pixel(
                            x,
                            y,
                            Rgb::new(blend(under.r, r), blend(under.g, g), blend(under.b, b)),
                        );
                    }
                }
            }
        }
    }

    /// Cursor advance for the cell-painting ops, same policy as a glyph.
    fn advance_one_cell(&mut self) {
        self.cursor.col = (self.cursor.col + 1).min(self.cols);
        if !self.config.wraparound {
            self.cursor.col = self.cursor.col.min(self.cols - 1);
        }
    }
}

/// A decoded raster image as straight RGBA bytes.
struct DecodedImage {
    width: i32,
    height: i32,
    pix: Vec<u8>,
}

/// Base64-decode and decode an encoded (PNG/JPEG) image payload.
fn decode_image(data: &[char]) -> Option<DecodedImage> {
    let text: String = data.iter().collect();
    let bytes = BASE64.decode(text.trim()).ok()?;
    let img = image::load_from_memory(&bytes).ok()?;
    let rgba = img.to_rgba8();
    Some(DecodedImage {
        width: rgba.width() as i32,
        height: rgba.height() as i32,
        pix: rgba.into_raw(),
    })
}

/// Parse `x,y`.
fn parse_point(field: &[char]) -> Option<Point> {
    let text: String = field.iter().collect();
    let (x, y) = text.split_once(',')?;
    Some(Point::new(
        x.trim().parse().ok()?,
        y.trim().parse().ok()?,
    ))
}

/// Parse `x,y,r`.
fn parse_triple(field: &[char]) -> Option<(i32, i32, i32)> {
    let text: String = field.iter().collect();
    let mut it = text.split(',');
    let x = it.next()?.trim().parse().ok()?;
    let y = it.next()?.trim().parse().ok()?;
    let r = it.next()?.trim().parse().ok()?;
    Some((x, y, r))
}

/// Parse `#RRGGBB` or `R,G,B`.
fn parse_color(field: &[char]) -> Option<Rgb> {
    let text: String = field.iter().collect();
    let text = text.trim();
    if let Some(hex) = text.strip_prefix('#') {
        if hex.len() != 6 {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        return Some(Rgb::new(r, g, b));
    }
    let mut it = text.split(',');
    let r = it.next()?.trim().parse().ok()?;
    let g = it.next()?.trim().parse().ok()?;
    let b = it.next()?.trim().parse().ok()?;
    Some(Rgb::new(r, g, b))
}
