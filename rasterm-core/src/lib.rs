//! rasterm-core - platform-independent terminal state
//!
//! This crate provides the pure data types behind the rasterm device:
//! - Pixel-space geometry (points, rectangles)
//! - The color system with ANSI/xterm palettes and build-selected collapse
//! - Text attributes (the SGR state)
//! - Cursor position and visibility
//! - Character-set designation slots
//! - Runtime configuration
//!
//! Everything here is deterministic and free of I/O; the rendering and
//! escape interpretation live in the `rasterm` crate.

mod attr;
mod charset;
mod color;
mod config;
mod cursor;
mod geom;

pub use attr::Attr;
pub use charset::{alt_charset_map, CharsetSlot, CharsetState};
pub use color::{palette_256, ColorMode, ColorSystem, Rgb, PALETTE_ANSI};
pub use config::{Config, Property};
pub use cursor::{Cursor, CursorStyle};
pub use geom::{Point, Rect};
