//! rasterm - a virtual ANSI/VT terminal that renders into a pixel buffer
//!
//! rasterm consumes a byte stream the way a TTY would and rasterizes the
//! terminal display straight onto an abstract pixel surface: an in-memory
//! buffer, a framebuffer, or a display driver. It targets everything from
//! microcontroller screens to desktop windows; the host supplies the
//! surface and the input path, rasterm does the interpretation and the
//! pixels.
//!
//! Supported: the common C0 controls, CSI (cursor motion, erase,
//! insert/delete, scroll regions, SGR including 256-color and truecolor),
//! OSC title and color queries, G0/G1 charset designation with the legacy
//! line-drawing remap, an alternate screen, and a private `ESC /` escape
//! family for pixel graphics (shapes, image blits, user-defined tiles).
//!
//! Two entry points:
//! - [`Term`] interprets synchronously on the caller's thread.
//! - [`Device`] adds a bounded write queue and a worker thread with a
//!   cursor-blink tick, safe to feed from interrupt-ish producers.
//!
//! ```no_run
//! use rasterm::{BufferSurface, Device, TileSets};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let regular = std::fs::read("fonts/mono.ttf")?;
//! let bold = std::fs::read("fonts/mono-bold.ttf")?;
//! let tiles = TileSets::from_fonts(&regular, &bold, 8, 16)?;
//! let dev = Device::new(80, 24, Box::new(BufferSurface::new(640, 384)), tiles);
//! dev.write(b"\x1b[1;31mhello\x1b[m world\r\n");
//! # Ok(())
//! # }
//! ```

mod csi;
mod device;
mod gfx;
mod osc;
mod render;
mod scroll;
mod surface;
mod term;
#[cfg(test)]
mod testutil;
pub mod tiles;
mod xform;

pub use device::Device;
pub use surface::{soft_fill, soft_vector_scroll, BufferSurface, Caps, Surface};
pub use term::Term;
pub use tiles::font::FontError;
pub use tiles::{FontTileSet, MultiTileSet, Remap, Tile, TileSets, Tiler, UserTileSet};

pub use rasterm_core::{
    alt_charset_map, palette_256, Attr, CharsetSlot, CharsetState, ColorMode, ColorSystem,
    Config, Cursor, CursorStyle, Point, Property, Rect, Rgb, PALETTE_ANSI,
};
