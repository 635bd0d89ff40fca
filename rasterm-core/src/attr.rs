//! Rendering attributes
//!
//! The active SGR state. Every glyph draw reads the derived colors after
//! the reverse-video swap; the attribute struct itself stores the logical
//! fg/bg.

use serde::{Deserialize, Serialize};

use crate::color::Rgb;

/// The active set of text attributes (SGR state).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Attr {
    /// Bold text (SGR 1)
    pub bold: bool,
    /// Italic text (SGR 3)
    pub italic: bool,
    /// Underlined text (SGR 4)
    pub underline: bool,
    /// Double underline (SGR 21); implies `underline`
    pub double_underline: bool,
    /// Strikethrough (SGR 9)
    pub strike: bool,
    /// Blink flag (SGR 5) - stored, not animated
    pub blink: bool,
    /// Reverse video (SGR 7)
    pub reversed: bool,
    /// Concealed text (SGR 8)
    pub conceal: bool,
    /// Foreground color
    pub fg: Rgb,
    /// Background color
    pub bg: Rgb,
}

impl Attr {
    pub fn with_colors(fg: Rgb, bg: Rgb) -> Self {
        Attr {
            fg,
            bg,
            ..Attr::default()
        }
    }

    /// Foreground and background after the reverse-video swap.
    pub fn active_colors(&self) -> (Rgb, Rgb) {
        if self.reversed {
            (self.bg, self.fg)
        } else {
            (self.fg, self.bg)
        }
    }
}
