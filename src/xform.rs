//! Pixel transforms
//!
//! The three sampling transforms the renderer needs: channel inversion
//! (cursor painting, region invert, visual bell), a 3x3 box blur
//! (conceal), and nearest-neighbor rotation (synthesized italics).

use rasterm_core::{Rect, Rgb};

use crate::surface::Surface;

/// Invert every pixel in `region` (clipped to the surface). Applying it
/// twice restores the original content, which is how the cursor toggles.
pub fn invert_region(surface: &mut dyn Surface, region: Rect) {
    let region = region.canon().intersect(surface.bounds());
    for y in region.min.y..region.max.y {
        for x in region.min.x..region.max.x {
            let c = surface.get(x, y).invert();
            surface.set(x, y, c);
        }
    }
}

/// Replace `region` with a 3x3 box blur of itself. Samples are taken from
/// a snapshot so the blur does not feed on its own output.
pub fn blur_region(surface: &mut dyn Surface, region: Rect) {
    let region = region.canon().intersect(surface.bounds());
    if region.is_empty() {
        return;
    }

    // snapshot with a 1px apron
    let apron = Rect::new(
        region.min.x - 1,
        region.min.y - 1,
        region.max.x + 1,
        region.max.y + 1,
    );
    let w = apron.dx();
    let mut snap = Vec::with_capacity((w * apron.dy()) as usize);
    for y in apron.min.y..apron.max.y {
        for x in apron.min.x..apron.max.x {
            snap.push(surface.get(x, y));
        }
    }
    let sample = |x: i32, y: i32| -> Rgb {
        let i = ((y - apron.min.y) * w + (x - apron.min.x)) as usize;
        snap[i]
    };

    for y in region.min.y..region.max.y {
        for x in region.min.x..region.max.x {
            let (mut r, mut g, mut b) = (0u32, 0u32, 0u32);
            for sy in -1..=1 {
                for sx in -1..=1 {
                    let c = sample(x + sx, y + sy);
                    r += c.r as u32;
                    g += c.g as u32;
                    b += c.b as u32;
                }
            }
            surface.set(x, y, Rgb::new((r / 9) as u8, (g / 9) as u8, (b / 9) as u8));
        }
    }
}

/// Sample an alpha mask rotated about its center by `degrees`.
/// Coordinates falling outside the source read as transparent.
pub fn rotate_alpha(pix: &[u8], width: i32, height: i32, degrees: f64) -> Vec<u8> {
    let mid_x = (width / 2) as f64;
    let mid_y = (height / 2) as f64;
    let rot = degrees.to_radians();

    let mut out = vec![0u8; (width * height) as usize];
    for y in 0..height {
        for x in 0..width {
            let theta = (y as f64 - mid_y).atan2(x as f64 - mid_x) + rot;
            let r = ((y as f64 - mid_y).powi(2) + (x as f64 - mid_x).powi(2)).sqrt();
            let sx = (r * theta.cos()).round() as i32 + mid_x as i32;
            let sy = (r * theta.sin()).round() as i32 + mid_y as i32;
            if sx >= 0 && sx < width && sy >= 0 && sy < height {
                out[(y * width + x) as usize] = pix[(sy * width + sx) as usize];
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::BufferSurface;

    #[test]
    fn test_invert_twice_is_identity() {
        let mut s = BufferSurface::new(4, 4);
        s.set(1, 1, Rgb::new(10, 20, 30));
        let region = Rect::new(0, 0, 4, 4);
        invert_region(&mut s, region);
        assert_eq!(s.get(1, 1), Rgb::new(245, 235, 225));
        invert_region(&mut s, region);
        assert_eq!(s.get(1, 1), Rgb::new(10, 20, 30));
    }

    #[test]
    fn test_blur_flattens_point() {
        let mut s = BufferSurface::new(5, 5);
        s.set(2, 2, Rgb::new(255, 0, 0));
        blur_region(&mut s, Rect::new(1, 1, 4, 4));
        // the lone red pixel spreads to a ninth of its neighbors
        assert_eq!(s.get(2, 2).r, 255 / 9);
        assert_eq!(s.get(1, 1).r, 255 / 9);
    }

    #[test]
    fn test_rotate_zero_degrees() {
        let mut pix = vec![0u8; 8 * 16];
        pix[3 * 8 + 4] = 255;
        let out = rotate_alpha(&pix, 8, 16, 0.0);
        assert_eq!(out[3 * 8 + 4], 255);
    }

    #[test]
    fn test_rotate_moves_mass() {
        // a full column, rotated 90 degrees, should put coverage on the
        // center row
        let mut pix = vec![0u8; 16 * 16];
        for y in 0..16 {
            pix[y * 16 + 8] = 255;
        }
        let out = rotate_alpha(&pix, 16, 16, 90.0);
        assert!(out[8 * 16 + 4] == 255 || out[8 * 16 + 12] == 255);
    }
}
