//! Pixel surface adapter
//!
//! The terminal renders into anything implementing [`Surface`]: an
//! in-memory buffer, a memory-mapped framebuffer, or a display driver.
//! Only `bounds`/`set`/`get` are required. Drivers that can fill or
//! scroll in hardware advertise it through [`Caps`]; the renderer probes
//! the capability set once at construction and binds the best available
//! primitive, falling back to the software implementations here.

use bitflags::bitflags;

use rasterm_core::{Point, Rect, Rgb};

bitflags! {
    /// Optional operations a surface implements natively.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Caps: u8 {
        /// `fill` is accelerated.
        const FILL = 1 << 0;
        /// `scroll` moves the whole surface vertically.
        const SCROLL = 1 << 1;
        /// `region_scroll` moves a full-width band vertically.
        const REGION_SCROLL = 1 << 2;
        /// `vector_scroll` moves an arbitrary region by an (x, y) vector.
        const VECTOR_SCROLL = 1 << 3;
    }
}

/// A mutable pixel target.
///
/// The optional methods are only invoked when the corresponding [`Caps`]
/// bit is advertised; the defaults are unreachable no-ops kept so simple
/// surfaces only write the three required methods.
pub trait Surface: Send {
    fn bounds(&self) -> Rect;
    fn set(&mut self, x: i32, y: i32, c: Rgb);
    fn get(&self, x: i32, y: i32) -> Rgb;

    fn caps(&self) -> Caps {
        Caps::empty()
    }

    fn fill(&mut self, _region: Rect, _c: Rgb) {}

    fn scroll(&mut self, _dy_px: i32) {}

    fn region_scroll(&mut self, _region: Rect, _dy_px: i32) {}

    fn vector_scroll(&mut self, _region: Rect, _vector: Point) {}
}

/// Software fill: clip to the surface and set every pixel.
pub fn soft_fill(surface: &mut dyn Surface, region: Rect, c: Rgb) {
    let region = region.canon().intersect(surface.bounds());
    for y in region.min.y..region.max.y {
        for x in region.min.x..region.max.x {
            surface.set(x, y, c);
        }
    }
}

/// Software vector scroll: shift pixels within `region` by `vector`,
/// wrapping at the region edges by modulus. The copy order follows the
/// vector sign so in-place copies do not read already-written pixels.
pub fn soft_vector_scroll(surface: &mut dyn Surface, region: Rect, vector: Point) {
    let region = surface.bounds().intersect(region);
    if region.is_empty() {
        return;
    }
    for y in 0..region.dy() {
        let dst_y = if vector.y >= 0 {
            region.min.y + y
        } else {
            region.max.y - (y + 1)
        };
        for x in 0..region.dx() {
            let dst_x = if vector.x >= 0 {
                region.min.x + x
            } else {
                region.max.x - (x + 1)
            };
            let src = Point::new(dst_x, dst_y).add(vector).wrap(region);
            let c = surface.get(src.x, src.y);
            surface.set(dst_x, dst_y, c);
        }
    }
}

/// A plain in-memory RGB surface, the default backing store when the host
/// does not supply hardware.
pub struct BufferSurface {
    width: i32,
    height: i32,
    pix: Vec<Rgb>,
}

impl BufferSurface {
    pub fn new(width: i32, height: i32) -> Self {
        let (w, h) = (width.max(0), height.max(0));
        BufferSurface {
            width: w,
            height: h,
            pix: vec![Rgb::BLACK; (w * h) as usize],
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            None
        } else {
            Some((y * self.width + x) as usize)
        }
    }

    /// The buffer as packed RGBA bytes, for blitting or encoding.
    pub fn rgba_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pix.len() * 4);
        for p in &self.pix {
            out.extend_from_slice(&[p.r, p.g, p.b, 255]);
        }
        out
    }
}

impl Surface for BufferSurface {
    fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    fn set(&mut self, x: i32, y: i32, c: Rgb) {
        if let Some(i) = self.index(x, y) {
            self.pix[i] = c;
        }
    }

    fn get(&self, x: i32, y: i32) -> Rgb {
        self.index(x, y).map(|i| self.pix[i]).unwrap_or(Rgb::BLACK)
    }

    fn caps(&self) -> Caps {
        Caps::FILL
    }

    fn fill(&mut self, region: Rect, c: Rgb) {
        let region = region.canon().intersect(self.bounds());
        for y in region.min.y..region.max.y {
            let row = (y * self.width) as usize;
            for x in region.min.x..region.max.x {
                self.pix[row + x as usize] = c;
            }
        }
    }
}
