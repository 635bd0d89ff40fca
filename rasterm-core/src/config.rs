//! Runtime configuration
//!
//! Options that escapes or the host can flip at runtime. Fields toggled by
//! private mode escapes (`CSI ? n h/l`) are advisory to whatever feeds the
//! terminal input; the interpreter itself only acts on `wraparound`,
//! `alt_screen`, and the rendering-related fields.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::cursor::CursorStyle;

/// Typed keys for the miscellaneous string properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Property {
    WindowTitle,
}

/// Runtime settings for a terminal device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Cells per horizontal tab stop.
    pub tab_size: usize,
    /// Pixel row of the strikethrough line within a cell.
    pub strikethrough_height: i32,
    /// Default cursor shape.
    pub cursor_style: CursorStyle,
    /// Bold also bumps a base ANSI fg color to its bright counterpart.
    pub bold_colors: bool,
    /// Enable the alternate-screen snapshot (costs a full-region buffer).
    pub alt_screen: bool,
    /// Wrap to the next line at the right margin; when off the cursor
    /// saturates in the last column and glyphs overstrike.
    pub wraparound: bool,
    /// Set by `CSI ? 1 h/l`; advisory to the input path.
    pub cursor_key_application_mode: bool,
    /// Set by `CSI ? 12 h/l`; advisory to the input path.
    pub local_echo: bool,
    /// Mouse reporting mode flag (0, 1000, 1002 or 1003). Reporting itself
    /// is not implemented.
    pub mouse_events: u16,
    /// Mouse reports would use SGR encoding.
    pub mouse_sgr: bool,
    /// Miscellaneous properties, like the window title.
    pub properties: HashMap<Property, String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            tab_size: 8,
            strikethrough_height: 7,
            cursor_style: CursorStyle::Block,
            bold_colors: true,
            alt_screen: true,
            wraparound: true,
            cursor_key_application_mode: false,
            local_echo: false,
            mouse_events: 0,
            mouse_sgr: false,
            properties: HashMap::new(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }
}
