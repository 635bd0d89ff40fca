//! Procedural drawing glyphs
//!
//! Box-drawing, block and shade tiles generated at startup for whatever
//! cell geometry the font uses. Layered behind the text face so fonts
//! that carry their own box-drawing glyphs win.

use super::FontTileSet;

const UP: u8 = 1 << 0;
const DOWN: u8 = 1 << 1;
const LEFT: u8 = 1 << 2;
const RIGHT: u8 = 1 << 3;

/// Build the drawing tile set for a `width` x `height` cell.
pub fn tile_set(width: i32, height: i32) -> FontTileSet {
    let mut set = FontTileSet::new(width, height);

    let boxes: &[(char, u8)] = &[
        ('─', LEFT | RIGHT),
        ('│', UP | DOWN),
        ('┌', DOWN | RIGHT),
        ('┐', DOWN | LEFT),
        ('└', UP | RIGHT),
        ('┘', UP | LEFT),
        ('┼', UP | DOWN | LEFT | RIGHT),
        ('├', UP | DOWN | RIGHT),
        ('┤', UP | DOWN | LEFT),
        ('┬', DOWN | LEFT | RIGHT),
        ('┴', UP | LEFT | RIGHT),
    ];
    for &(ch, segments) in boxes {
        set.set_tile(ch, box_tile(width, height, segments));
    }

    set.set_tile('█', vec![0xFF; (width * height) as usize]);
    set.set_tile('░', shade_tile(width, height, 1));
    set.set_tile('▒', shade_tile(width, height, 2));
    set.set_tile('▓', shade_tile(width, height, 3));
    set.set_tile('\u{25D6}', half_circle_tile(width, height, false));
    set.set_tile('\u{25D7}', half_circle_tile(width, height, true));

    set
}

/// Line segments from the cell center toward the named edges.
fn box_tile(width: i32, height: i32, segments: u8) -> Vec<u8> {
    let mut pix = vec![0u8; (width * height) as usize];
    let mid_x = width / 2;
    let mid_y = height / 2;
    let mut on = |x: i32, y: i32| pix[(y * width + x) as usize] = 0xFF;

    if segments & UP != 0 {
        for y in 0..=mid_y {
            on(mid_x, y);
        }
    }
    if segments & DOWN != 0 {
        for y in mid_y..height {
            on(mid_x, y);
        }
    }
    if segments & LEFT != 0 {
        for x in 0..=mid_x {
            on(x, mid_y);
        }
    }
    if segments & RIGHT != 0 {
        for x in mid_x..width {
            on(x, mid_y);
        }
    }
    pix
}

/// Dither patterns for the shade blocks; `level` is quarters of coverage.
fn shade_tile(width: i32, height: i32, level: u8) -> Vec<u8> {
    let mut pix = vec![0u8; (width * height) as usize];
    for y in 0..height {
        for x in 0..width {
            let on = match level {
                1 => (x + 2 * y) % 4 == 0,
                2 => (x + y) % 2 == 0,
                _ => (x + 2 * y) % 4 != 0,
            };
            if on {
                pix[(y * width + x) as usize] = 0xFF;
            }
        }
    }
    pix
}

/// A filled half-disk, flat side on the right (`right = false`) or
/// left (`right = true`).
fn half_circle_tile(width: i32, height: i32, right: bool) -> Vec<u8> {
    let mut pix = vec![0u8; (width * height) as usize];
    let r = (width.min(height / 2)) / 2;
    let cx = if right { 0 } else { width - 1 };
    let cy = height / 2;
    for y in 0..height {
        for x in 0..width {
            let (dx, dy) = (x - cx, y - cy);
            if dx * dx + dy * dy <= r * r {
                pix[(y * width + x) as usize] = 0xFF;
            }
        }
    }
    pix
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::Tiler;

    #[test]
    fn test_covers_box_drawing() {
        let set = tile_set(8, 16);
        for ch in ['─', '│', '┌', '┐', '└', '┘', '┼', '├', '┤', '┬', '┴'] {
            assert!(set.get_tile(ch).is_some(), "missing {:?}", ch);
        }
    }

    #[test]
    fn test_horizontal_line_shape() {
        let set = tile_set(8, 16);
        let tile = set.get_tile('─').expect("tile");
        // full-width line on the middle row, nothing on the top row
        for x in 0..8 {
            assert_eq!(tile.alpha_at(x, 8), 0xFF);
            assert_eq!(tile.alpha_at(x, 0), 0);
        }
    }

    #[test]
    fn test_vertical_line_shape() {
        let set = tile_set(8, 16);
        let tile = set.get_tile('│').expect("tile");
        for y in 0..16 {
            assert_eq!(tile.alpha_at(4, y), 0xFF);
            assert_eq!(tile.alpha_at(0, y), 0);
        }
    }

    #[test]
    fn test_corner_meets_center() {
        let set = tile_set(8, 16);
        let tile = set.get_tile('┌').expect("tile");
        // down and right segments share the center pixel
        assert_eq!(tile.alpha_at(4, 8), 0xFF);
        assert_eq!(tile.alpha_at(4, 15), 0xFF);
        assert_eq!(tile.alpha_at(7, 8), 0xFF);
        assert_eq!(tile.alpha_at(0, 0), 0);
    }

    #[test]
    fn test_shades_are_ordered() {
        let count = |ch: char| {
            let tile = tile_set(8, 16).get_tile(ch).expect("tile");
            (0..16)
                .flat_map(|y| (0..8).map(move |x| (x, y)))
                .filter(|&(x, y)| tile.alpha_at(x, y) == 0xFF)
                .count()
        };
        let (light, medium, dark, full) = (count('░'), count('▒'), count('▓'), count('█'));
        assert!(light < medium && medium < dark && dark < full);
        assert_eq!(full, 8 * 16);
    }
}
