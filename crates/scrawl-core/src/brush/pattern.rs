//! Pattern brushes: a small tile built once per stroke and repeated along
//! the stroke path.

use super::BrushKind;
use crate::color::Rgba;
use image::{Rgba as Pixel, RgbaImage};

/// Tile edge length in CSS pixels.
pub const PATTERN_TILE_SIZE: u32 = 10;

/// Build the repeating tile for a pattern brush, sized for the device pixel ratio.
///
/// Non-pattern kinds get a solid tile.
pub fn build_tile(kind: BrushKind, color: Rgba, dpr: f64) -> RgbaImage {
    let size = ((PATTERN_TILE_SIZE as f64 * dpr).round() as u32).max(2);
    let half = size / 2;
    let line = (size / 10).max(1);
    let ink = color.to_pixel();
    let clear = Pixel([0, 0, 0, 0]);

    RgbaImage::from_fn(size, size, |x, y| {
        let inked = match kind {
            BrushKind::Checkerboard => (x < half) == (y < half),
            BrushKind::LinePattern => x + line >= half && x < half + line,
            BrushKind::SquarePattern => {
                let pad = size / 4;
                (pad..size - pad).contains(&x) && (pad..size - pad).contains(&y)
            }
            BrushKind::DiamondPattern => {
                let c = half as i64;
                (x as i64 - c).abs() + (y as i64 - c).abs() <= c
            }
            _ => true,
        };
        if inked { ink } else { clear }
    })
}
