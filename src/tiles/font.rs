//! Font rasterization
//!
//! Turns a monospace TTF/OTF into a [`FontTileSet`] of cell-sized alpha
//! masks using fontdue. This is a convenience for hosts that want a text
//! face without shipping pre-rendered tiles; the device itself only ever
//! sees the finished tile set.

use fontdue::{Font, FontSettings};
use thiserror::Error;

use super::{FontTileSet, Tiler};

/// Errors from font loading; construction-time only.
#[derive(Debug, Error)]
pub enum FontError {
    #[error("font parse error: {0}")]
    Parse(String),
    #[error("font has no horizontal line metrics")]
    NoLineMetrics,
}

/// Rasterize the printable ASCII and Latin-1 ranges of `data` into a
/// tile set with `cell_width` x `cell_height` cells.
pub fn rasterize_font(
    data: &[u8],
    cell_width: i32,
    cell_height: i32,
) -> Result<FontTileSet, FontError> {
    let font = Font::from_bytes(data, FontSettings::default()).map_err(|e| {
        FontError::Parse(e.to_string())
    })?;

    // Size the face a touch under the cell so ascenders and descenders
    // stay inside it.
    let px = cell_height as f32 * 0.85;
    let line = font
        .horizontal_line_metrics(px)
        .ok_or(FontError::NoLineMetrics)?;
    let baseline = line.ascent.round() as i32;

    let mut set = FontTileSet::new(cell_width, cell_height);
    let ranges = [0x20u32..=0x7E, 0xA0..=0xFF];
    for range in ranges {
        for code in range {
            if let Some(ch) = char::from_u32(code) {
                set.set_tile(ch, rasterize_glyph(&font, ch, px, cell_width, cell_height, baseline));
            }
        }
    }
    Ok(set)
}

/// Rasterize extra code points into an existing set, skipping characters
/// the font has no outline for.
pub fn extend_with_chars(
    set: &mut FontTileSet,
    data: &[u8],
    chars: impl IntoIterator<Item = char>,
) -> Result<(), FontError> {
    let font = Font::from_bytes(data, FontSettings::default()).map_err(|e| {
        FontError::Parse(e.to_string())
    })?;
    let (cell_width, cell_height) = set.cell_size();
    let px = cell_height as f32 * 0.85;
    let line = font
        .horizontal_line_metrics(px)
        .ok_or(FontError::NoLineMetrics)?;
    let baseline = line.ascent.round() as i32;

    for ch in chars {
        if font.lookup_glyph_index(ch) != 0 {
            set.set_tile(ch, rasterize_glyph(&font, ch, px, cell_width, cell_height, baseline));
        }
    }
    Ok(())
}

/// Rasterize one glyph and place it on the baseline inside a cell mask.
fn rasterize_glyph(
    font: &Font,
    ch: char,
    px: f32,
    cell_width: i32,
    cell_height: i32,
    baseline: i32,
) -> Vec<u8> {
    let (metrics, bitmap) = font.rasterize(ch, px);
    let mut mask = vec![0u8; (cell_width * cell_height) as usize];

    let origin_x = metrics.xmin;
    // fontdue's ymin is the offset of the bitmap bottom from the baseline,
    // positive upward; flip into top-down cell coordinates.
    let origin_y = baseline - metrics.ymin - metrics.height as i32;

    for gy in 0..metrics.height as i32 {
        let cy = origin_y + gy;
        if cy < 0 || cy >= cell_height {
            continue;
        }
        for gx in 0..metrics.width as i32 {
            let cx = origin_x + gx;
            if cx < 0 || cx >= cell_width {
                continue;
            }
            mask[(cy * cell_width + cx) as usize] = bitmap[(gy * metrics.width as i32 + gx) as usize];
        }
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_font_data_is_an_error() {
        assert!(matches!(
            rasterize_font(&[0u8; 16], 8, 16),
            Err(FontError::Parse(_))
        ));
    }
}
