//! Ink-amount brushes.
//!
//! `Ink` throws splash dots around fast moves; `Marker` widens its stroke
//! on fast moves. "Fast" means the move covered more than
//! [`SPLASH_THRESHOLD`] pixels since the previous sample.

use super::BrushKind;
use crate::geometry::{distance, polar};
use crate::raster::{Overlay, Paint};
use kurbo::Point;
use rand::Rng;
use std::f64::consts::TAU;

/// Maximum splash dots thrown by one ink move.
pub const INK_AMOUNT: usize = 7;
/// Extra width a fast marker move gains, as a fraction of the brush width.
pub const MARKER_INK_AMOUNT: f64 = 0.7;
/// Distance a move must cover before ink effects kick in.
pub const SPLASH_THRESHOLD: f64 = 8.0;

/// Splash dots for one ink move: (center, radius), at most [`INK_AMOUNT`].
pub(super) fn splashes(from: Point, to: Point, width: f64, rng: &mut impl Rng) -> Vec<(Point, f64)> {
    let covered = distance(from, to);
    if covered <= SPLASH_THRESHOLD || !(width > 0.0) {
        return Vec::new();
    }
    let count = rng.random_range(1..=INK_AMOUNT);
    let reach = width + covered * 0.5;
    (0..count)
        .map(|_| {
            let angle = rng.random::<f64>() * TAU;
            let center = polar(to, angle, rng.random::<f64>() * reach);
            let radius = width * rng.random_range(0.1..0.5);
            (center, radius)
        })
        .collect()
}

/// Width the marker uses for a move.
pub(super) fn marker_width(from: Point, to: Point, width: f64) -> f64 {
    if distance(from, to) > SPLASH_THRESHOLD {
        width * (1.0 + MARKER_INK_AMOUNT)
    } else {
        width
    }
}

pub(super) fn paint(
    kind: BrushKind,
    from: Point,
    to: Point,
    overlay: &mut Overlay,
    rng: &mut impl Rng,
) -> bool {
    let style = overlay.style().clone();
    match kind {
        BrushKind::Marker => {
            let width = marker_width(from, to, style.width);
            overlay.stroke_segment_with(from, to, width, Paint::Solid(style.color))
        }
        _ => {
            let mut painted = overlay.stroke_segment(from, to);
            for (center, radius) in splashes(from, to, style.width, rng) {
                painted |= overlay.fill_circle(center, radius, Paint::Solid(style.color));
            }
            painted
        }
    }
}
