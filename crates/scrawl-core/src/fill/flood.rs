//! Tolerance-bounded 4-connected flood fill over a raw pixel buffer.

use crate::color::{Rgba, within_tolerance};
use image::RgbaImage;
use kurbo::Point;
use std::collections::VecDeque;

/// Outcome of one flood fill: inclusive bounds of the repainted pixels and
/// the recolored buffer cropped to those bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct FillRegion {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
    pub pixels: RgbaImage,
}

impl FillRegion {
    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }
}

/// Row-major offset, widened before multiplying.
fn pixel_index(x: u32, y: u32, width: u32) -> usize {
    y as usize * width as usize + x as usize
}

/// Repaint every pixel connected to `seed` (through up/down/left/right
/// neighbours) whose channels are all within `tolerance` of `target`.
///
/// Pixels are compared against `target`, never against already repainted
/// neighbours. Returns `None` when the seed is outside the buffer or
/// nothing matched.
pub fn flood_fill(
    buffer: &mut RgbaImage,
    seed: Point,
    target: Rgba,
    replacement: Rgba,
    tolerance: u8,
) -> Option<FillRegion> {
    let (w, h) = buffer.dimensions();
    if !(seed.x >= 0.0 && seed.y >= 0.0) {
        return None;
    }
    let (sx, sy) = (seed.x.floor() as u32, seed.y.floor() as u32);
    if sx >= w || sy >= h {
        return None;
    }

    let target = target.channels();
    let paint = replacement.to_pixel();
    let mut visited = vec![false; (w as usize) * (h as usize)];
    let mut queue = VecDeque::with_capacity(1024);
    visited[pixel_index(sx, sy, w)] = true;
    queue.push_back((sx, sy));

    let (mut min_x, mut min_y, mut max_x, mut max_y) = (u32::MAX, u32::MAX, 0, 0);
    let mut repainted = 0usize;

    while let Some((px, py)) = queue.pop_front() {
        if !within_tolerance(buffer.get_pixel(px, py).0, target, tolerance) {
            continue;
        }
        buffer.put_pixel(px, py, paint);
        repainted += 1;
        min_x = min_x.min(px);
        min_y = min_y.min(py);
        max_x = max_x.max(px);
        max_y = max_y.max(py);

        let neighbors = [
            (px.wrapping_sub(1), py),
            (px + 1, py),
            (px, py.wrapping_sub(1)),
            (px, py + 1),
        ];
        for (nx, ny) in neighbors {
            if nx >= w || ny >= h {
                continue;
            }
            let idx = pixel_index(nx, ny, w);
            if visited[idx] {
                continue;
            }
            visited[idx] = true;
            queue.push_back((nx, ny));
        }
    }

    if repainted == 0 {
        return None;
    }
    let pixels = image::imageops::crop_imm(&*buffer, min_x, min_y, max_x - min_x + 1, max_y - min_y + 1).to_image();
    Some(FillRegion {
        min_x,
        min_y,
        max_x,
        max_y,
        pixels,
    })
}
