//! Color system
//!
//! Colors are plain RGB triples everywhere; the active [`ColorMode`]
//! decides how palette references and truecolor values collapse before
//! they reach the surface:
//! - `Mono`: everything becomes full-on or full-off
//! - `Ansi16`: nearest entry of the 16-color palette
//! - `TrueColor`: passed through unchanged
//!
//! The default mode is picked at build time via the `color-mono` /
//! `color-ansi` cargo features, with truecolor as the fallback.

use serde::{Deserialize, Serialize};

/// An opaque RGB pixel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    /// Channel-inverted value, used for cursor and region inversion.
    pub fn invert(self) -> Rgb {
        Rgb::new(255 - self.r, 255 - self.g, 255 - self.b)
    }

    /// Squared distance in RGB space.
    fn dist2(self, other: Rgb) -> u32 {
        let d = |a: u8, b: u8| {
            let d = a as i32 - b as i32;
            (d * d) as u32
        };
        d(self.r, other.r) + d(self.g, other.g) + d(self.b, other.b)
    }
}

/// Active color representation, fixed at device construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorMode {
    /// 1-bit: a pixel is either the default foreground or background.
    Mono,
    /// 16-color ANSI palette.
    Ansi16,
    /// 24-bit RGB.
    TrueColor,
}

impl Default for ColorMode {
    fn default() -> Self {
        if cfg!(feature = "color-mono") {
            ColorMode::Mono
        } else if cfg!(feature = "color-ansi") {
            ColorMode::Ansi16
        } else {
            ColorMode::TrueColor
        }
    }
}

/// The VGA-ish ANSI-16 palette (SGR 30-37, 90-97 and the bg equivalents).
pub const PALETTE_ANSI: [Rgb; 16] = [
    Rgb::new(0, 0, 0),
    Rgb::new(127, 0, 0),
    Rgb::new(0, 170, 0),
    Rgb::new(170, 85, 0),
    Rgb::new(0, 0, 170),
    Rgb::new(170, 0, 170),
    Rgb::new(0, 170, 170),
    Rgb::new(200, 200, 200),
    Rgb::new(85, 85, 85),
    Rgb::new(255, 0, 0),
    Rgb::new(85, 255, 85),
    Rgb::new(255, 255, 85),
    Rgb::new(85, 85, 255),
    Rgb::new(255, 85, 255),
    Rgb::new(85, 255, 255),
    Rgb::new(255, 255, 255),
];

/// xterm 256-color palette entry.
///
/// 0-15 are the widely used xterm values (not [`PALETTE_ANSI`]), 16-231 the
/// 6x6x6 cube, 232-255 the grayscale ramp.
pub fn palette_256(index: u8) -> Rgb {
    const BASE: [Rgb; 16] = [
        Rgb::new(0, 0, 0),
        Rgb::new(128, 0, 0),
        Rgb::new(0, 128, 0),
        Rgb::new(128, 128, 0),
        Rgb::new(0, 0, 128),
        Rgb::new(128, 0, 128),
        Rgb::new(0, 128, 128),
        Rgb::new(192, 192, 192),
        Rgb::new(128, 128, 128),
        Rgb::new(255, 0, 0),
        Rgb::new(0, 255, 0),
        Rgb::new(255, 255, 0),
        Rgb::new(0, 0, 255),
        Rgb::new(255, 0, 255),
        Rgb::new(0, 255, 255),
        Rgb::new(255, 255, 255),
    ];

    match index {
        0..=15 => BASE[index as usize],
        16..=231 => {
            let idx = index - 16;
            let r = idx / 36;
            let g = (idx % 36) / 6;
            let b = idx % 6;
            let to_val = |v: u8| if v == 0 { 0 } else { 55 + v * 40 };
            Rgb::new(to_val(r), to_val(g), to_val(b))
        }
        232..=255 => {
            let gray = 8 + (index - 232) * 10;
            Rgb::new(gray, gray, gray)
        }
    }
}

/// Palette state plus the conversion rules for the active [`ColorMode`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorSystem {
    pub mode: ColorMode,
    /// Mutable copy of the ANSI palette; the private palette escape can
    /// rewrite entries, and `ESC ] R` restores the defaults.
    pub palette_ansi: [Rgb; 16],
}

impl ColorSystem {
    pub fn new(mode: ColorMode) -> Self {
        ColorSystem {
            mode,
            palette_ansi: PALETTE_ANSI,
        }
    }

    /// Default foreground for this mode.
    pub fn default_fg(&self) -> Rgb {
        match self.mode {
            ColorMode::Mono => Rgb::WHITE,
            _ => self.palette_ansi[7],
        }
    }

    /// Default background for this mode.
    pub fn default_bg(&self) -> Rgb {
        match self.mode {
            ColorMode::Mono => Rgb::BLACK,
            _ => self.palette_ansi[0],
        }
    }

    /// ANSI palette entry, collapsed for the active mode.
    pub fn ansi(&self, index: usize) -> Rgb {
        self.convert(self.palette_ansi[index & 0xF])
    }

    /// Collapse an arbitrary RGB value into the active mode.
    pub fn convert(&self, c: Rgb) -> Rgb {
        match self.mode {
            ColorMode::TrueColor => c,
            ColorMode::Ansi16 => {
                let mut best = self.palette_ansi[0];
                let mut best_d = u32::MAX;
                for p in self.palette_ansi {
                    let d = c.dist2(p);
                    if d < best_d {
                        best_d = d;
                        best = p;
                    }
                }
                best
            }
            ColorMode::Mono => {
                if c.r.max(c.g).max(c.b) > 127 {
                    Rgb::WHITE
                } else {
                    Rgb::BLACK
                }
            }
        }
    }

    /// Resolve a 256-palette reference. Under mono and 16-color modes the
    /// palette is not rendered as such; the reference collapses to whichever
    /// of the supplied fg/bg pair is closer.
    pub fn indexed_256(&self, index: u8, fg: Rgb, bg: Rgb) -> Rgb {
        let c = palette_256(index);
        match self.mode {
            ColorMode::TrueColor => c,
            _ => {
                if c.dist2(fg) <= c.dist2(bg) {
                    fg
                } else {
                    bg
                }
            }
        }
    }

    pub fn reset_palette(&mut self) {
        self.palette_ansi = PALETTE_ANSI;
    }
}

impl Default for ColorSystem {
    fn default() -> Self {
        Self::new(ColorMode::default())
    }
}
