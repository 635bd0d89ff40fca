//! Pixel-space geometry
//!
//! The renderer speaks in points and rectangles: the render bounds, the
//! scroll area, cell rectangles, blit targets. Rectangles are half-open on
//! the max edge, so `Rect::new(0, 0, 8, 16)` covers pixels x in 0..8 and
//! y in 0..16.

use serde::{Deserialize, Serialize};

/// A point in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }

    pub fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    /// Wrap the point into `rect` by modulus on each axis.
    pub fn wrap(self, rect: Rect) -> Point {
        let (w, h) = (rect.dx(), rect.dy());
        if w <= 0 || h <= 0 {
            return self;
        }
        let mut x = (self.x - rect.min.x) % w;
        let mut y = (self.y - rect.min.y) % h;
        if x < 0 {
            x += w;
        }
        if y < 0 {
            y += h;
        }
        Point::new(x + rect.min.x, y + rect.min.y)
    }

    pub fn in_rect(self, rect: Rect) -> bool {
        self.x >= rect.min.x && self.x < rect.max.x && self.y >= rect.min.y && self.y < rect.max.y
    }
}

/// An axis-aligned rectangle, min-inclusive and max-exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub min: Point,
    pub max: Point,
}

impl Rect {
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Rect {
            min: Point::new(x0, y0),
            max: Point::new(x1, y1),
        }
    }

    pub fn from_size(width: i32, height: i32) -> Self {
        Rect::new(0, 0, width, height)
    }

    pub fn dx(&self) -> i32 {
        self.max.x - self.min.x
    }

    pub fn dy(&self) -> i32 {
        self.max.y - self.min.y
    }

    pub fn is_empty(&self) -> bool {
        self.min.x >= self.max.x || self.min.y >= self.max.y
    }

    /// Swap edges as needed so min <= max on both axes.
    pub fn canon(self) -> Rect {
        let mut r = self;
        if r.min.x > r.max.x {
            std::mem::swap(&mut r.min.x, &mut r.max.x);
        }
        if r.min.y > r.max.y {
            std::mem::swap(&mut r.min.y, &mut r.max.y);
        }
        r
    }

    pub fn translate(self, offset: Point) -> Rect {
        Rect {
            min: self.min.add(offset),
            max: self.max.add(offset),
        }
    }

    pub fn intersect(self, other: Rect) -> Rect {
        let r = Rect {
            min: Point::new(self.min.x.max(other.min.x), self.min.y.max(other.min.y)),
            max: Point::new(self.max.x.min(other.max.x), self.max.y.min(other.max.y)),
        };
        if r.is_empty() {
            Rect::default()
        } else {
            r
        }
    }
}
