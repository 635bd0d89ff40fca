//! Tile sets
//!
//! A tile is the pixel data for one glyph; a tile set maps code points to
//! tiles. Sets compose: [`MultiTileSet`] searches an ordered list,
//! [`Remap`] rewrites code points in front of another set, [`Italics`]
//! resamples with a slight rotation, and [`UserTileSet`] holds full-color
//! glyphs installed at runtime by the private graphics escape.

pub mod drawing;
pub mod font;

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use rasterm_core::{Point, Rgb};

use crate::surface::Surface;
use crate::xform::rotate_alpha;

/// Blend a foreground over a background channel by an 8-bit alpha.
pub(crate) fn alpha_blend(bg: u8, fg: u8, alpha: u8) -> u8 {
    let (bg, fg, a) = (bg as u32, fg as u32, alpha as u32);
    ((bg * (255 - a) + fg * a) / 255) as u8
}

/// Pixel data for a single glyph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    width: i32,
    height: i32,
    pix: TilePix,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TilePix {
    /// 8-bit coverage mask, row-major.
    Alpha(Vec<u8>),
    /// 1-bit rows, one byte per row, most significant bit leftmost.
    /// Fixed 8x16 geometry.
    Bits([u8; 16]),
    /// Pre-rendered RGBA, row-major.
    Rgba(Vec<u8>),
}

impl Tile {
    pub fn alpha(width: i32, height: i32, pix: Vec<u8>) -> Self {
        debug_assert_eq!(pix.len(), (width * height) as usize);
        Tile {
            width,
            height,
            pix: TilePix::Alpha(pix),
        }
    }

    /// A 1-bit 8x16 cell, one byte per row, MSB on the left.
    pub fn from_bits(rows: [u8; 16]) -> Self {
        Tile {
            width: 8,
            height: 16,
            pix: TilePix::Bits(rows),
        }
    }

    pub fn rgba(width: i32, height: i32, pix: Vec<u8>) -> Self {
        debug_assert_eq!(pix.len(), (width * height * 4) as usize);
        Tile {
            width,
            height,
            pix: TilePix::Rgba(pix),
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Coverage at (x, y); 0 outside the tile.
    pub fn alpha_at(&self, x: i32, y: i32) -> u8 {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return 0;
        }
        match &self.pix {
            TilePix::Alpha(p) => p[(y * self.width + x) as usize],
            TilePix::Bits(rows) => {
                if (rows[y as usize] >> (7 - x)) & 1 == 1 {
                    0xFF
                } else {
                    0
                }
            }
            TilePix::Rgba(p) => p[(y * self.width + x) as usize * 4 + 3],
        }
    }

    /// The tile's own color at (x, y), for full-color tiles.
    fn own_color(&self, x: i32, y: i32) -> Option<Rgb> {
        match &self.pix {
            TilePix::Rgba(p) => {
                let i = (y * self.width + x) as usize * 4;
                Some(Rgb::new(p[i], p[i + 1], p[i + 2]))
            }
            _ => None,
        }
    }

    /// The coverage mask as a flat 8-bit vector.
    pub fn to_alpha_mask(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity((self.width * self.height) as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                out.push(self.alpha_at(x, y));
            }
        }
        out
    }

    /// Composite the tile at `pt`. Opaque pixels take the foreground (or
    /// the tile's own color), transparent pixels take `bg`, partial
    /// coverage blends. A `None` background paints nothing behind the
    /// glyph: transparent pixels are skipped and partial coverage blends
    /// over the existing destination.
    pub fn draw(&self, dst: &mut dyn Surface, pt: Point, fg: Rgb, bg: Option<Rgb>) {
        for y in 0..self.height {
            for x in 0..self.width {
                let (px, py) = (pt.x + x, pt.y + y);
                let alpha = self.alpha_at(x, y);
                let fg = self.own_color(x, y).unwrap_or(fg);
                match (alpha, bg) {
                    (0, Some(bg)) => dst.set(px, py, bg),
                    (0, None) => {}
                    (0xFF, _) => dst.set(px, py, fg),
                    (a, bg) => {
                        let under = bg.unwrap_or_else(|| dst.get(px, py));
                        dst.set(
                            px,
                            py,
                            Rgb::new(
                                alpha_blend(under.r, fg.r, a),
                                alpha_blend(under.g, fg.g, a),
                                alpha_blend(under.b, fg.b, a),
                            ),
                        );
                    }
                }
            }
        }
    }
}

/// A glyph source: anything that can look up and composite tiles.
pub trait Tiler: Send + Sync {
    /// Cell dimensions in pixels.
    fn cell_size(&self) -> (i32, i32);

    /// The tile for a code point, or `None` if this set does not cover it.
    fn get_tile(&self, ch: char) -> Option<Tile>;

    /// Composite the tile for `ch` at `pt`. An uncovered code point draws
    /// the empty tile: pure background.
    fn draw_tile(&self, ch: char, dst: &mut dyn Surface, pt: Point, fg: Rgb, bg: Option<Rgb>) {
        match self.get_tile(ch) {
            Some(tile) => tile.draw(dst, pt, fg, bg),
            None => draw_empty(self.cell_size(), dst, pt, bg),
        }
    }
}

fn draw_empty(cell: (i32, i32), dst: &mut dyn Surface, pt: Point, bg: Option<Rgb>) {
    if let Some(bg) = bg {
        for y in 0..cell.1 {
            for x in 0..cell.0 {
                dst.set(pt.x + x, pt.y + y, bg);
            }
        }
    }
}

/// A direct map from code point to alpha-mask glyph.
#[derive(Debug, Clone, Default)]
pub struct FontTileSet {
    width: i32,
    height: i32,
    glyphs: HashMap<char, Vec<u8>>,
}

impl FontTileSet {
    pub fn new(width: i32, height: i32) -> Self {
        FontTileSet {
            width,
            height,
            glyphs: HashMap::new(),
        }
    }

    /// Insert or replace the mask for a code point. The mask must be
    /// `width * height` coverage bytes.
    pub fn set_tile(&mut self, ch: char, mask: Vec<u8>) {
        debug_assert_eq!(mask.len(), (self.width * self.height) as usize);
        self.glyphs.insert(ch, mask);
    }

    /// Copy every glyph of `src` into this set, displacing overlaps.
    pub fn merge(&mut self, src: &FontTileSet) {
        for (ch, mask) in &src.glyphs {
            self.glyphs.insert(*ch, mask.clone());
        }
    }

    pub fn contains(&self, ch: char) -> bool {
        self.glyphs.contains_key(&ch)
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

impl Tiler for FontTileSet {
    fn cell_size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    fn get_tile(&self, ch: char) -> Option<Tile> {
        self.glyphs
            .get(&ch)
            .map(|mask| Tile::alpha(self.width, self.height, mask.clone()))
    }
}

/// Rewrites code points before delegating to another set.
pub struct Remap {
    base: Arc<dyn Tiler>,
    map: HashMap<char, char>,
}

impl Remap {
    pub fn new(base: Arc<dyn Tiler>, map: HashMap<char, char>) -> Self {
        Remap { base, map }
    }
}

impl Tiler for Remap {
    fn cell_size(&self) -> (i32, i32) {
        self.base.cell_size()
    }

    fn get_tile(&self, ch: char) -> Option<Tile> {
        let ch = self.map.get(&ch).copied().unwrap_or(ch);
        self.base.get_tile(ch)
    }
}

/// An ordered list of sets; the first set covering a code point wins.
/// A miss across every member draws the empty tile.
pub struct MultiTileSet {
    sets: Vec<Arc<dyn Tiler>>,
}

impl MultiTileSet {
    pub fn new(sets: Vec<Arc<dyn Tiler>>) -> Self {
        debug_assert!(!sets.is_empty());
        MultiTileSet { sets }
    }
}

impl Tiler for MultiTileSet {
    fn cell_size(&self) -> (i32, i32) {
        self.sets[0].cell_size()
    }

    fn get_tile(&self, ch: char) -> Option<Tile> {
        self.sets.iter().find_map(|s| s.get_tile(ch))
    }
}

/// Fakes an italic face by rotating the base glyphs a few degrees.
pub struct Italics {
    base: Arc<dyn Tiler>,
    degrees: f64,
}

impl Italics {
    pub fn new(base: Arc<dyn Tiler>) -> Self {
        Italics {
            base,
            degrees: -10.0,
        }
    }
}

impl Tiler for Italics {
    fn cell_size(&self) -> (i32, i32) {
        self.base.cell_size()
    }

    fn get_tile(&self, ch: char) -> Option<Tile> {
        let tile = self.base.get_tile(ch)?;
        let (w, h) = (tile.width(), tile.height());
        let mask = rotate_alpha(&tile.to_alpha_mask(), w, h, self.degrees);
        Some(Tile::alpha(w, h, mask))
    }
}

/// Full-color glyphs loaded at runtime through the `ESC / u` escape.
/// Interior mutability lets the device install glyphs while the set sits
/// layered inside the alternate charset.
pub struct UserTileSet {
    width: i32,
    height: i32,
    glyphs: RwLock<HashMap<char, Tile>>,
}

impl UserTileSet {
    pub fn new(width: i32, height: i32) -> Self {
        UserTileSet {
            width,
            height,
            glyphs: RwLock::new(HashMap::new()),
        }
    }

    pub fn insert(&self, ch: char, tile: Tile) {
        if let Ok(mut glyphs) = self.glyphs.write() {
            glyphs.insert(ch, tile);
        }
    }
}

impl Tiler for UserTileSet {
    fn cell_size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    fn get_tile(&self, ch: char) -> Option<Tile> {
        self.glyphs.read().ok()?.get(&ch).cloned()
    }
}

/// The tile-set bundle a device renders with: regular, bold and italic
/// faces plus the legacy alternate charset (a Unicode remap over the
/// regular face).
pub struct TileSets {
    pub regular: Arc<dyn Tiler>,
    pub bold: Arc<dyn Tiler>,
    pub italic: Arc<dyn Tiler>,
    pub alt: Arc<dyn Tiler>,
}

impl TileSets {
    /// Build the bundle from a regular and a bold face. The regular face
    /// is layered over the procedural drawing set, the italic face is a
    /// rotation of it, and the alternate charset remaps the legacy
    /// line-drawing code points onto it.
    pub fn new(regular: Arc<dyn Tiler>, bold: Arc<dyn Tiler>) -> Self {
        let (w, h) = regular.cell_size();
        let base: Arc<dyn Tiler> = Arc::new(MultiTileSet::new(vec![
            regular,
            Arc::new(drawing::tile_set(w, h)),
        ]));
        TileSets {
            regular: base.clone(),
            bold,
            italic: Arc::new(Italics::new(base.clone())),
            alt: Arc::new(Remap::new(base, rasterm_core::alt_charset_map())),
        }
    }

    /// Build the bundle by rasterizing regular and bold TTF faces.
    pub fn from_fonts(
        regular_ttf: &[u8],
        bold_ttf: &[u8],
        cell_width: i32,
        cell_height: i32,
    ) -> Result<Self, font::FontError> {
        let regular = font::rasterize_font(regular_ttf, cell_width, cell_height)?;
        let bold = font::rasterize_font(bold_ttf, cell_width, cell_height)?;
        Ok(TileSets::new(Arc::new(regular), Arc::new(bold)))
    }
}
