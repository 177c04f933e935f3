//! Whisker brushes: a primary segment plus random connecting strokes to
//! nearby earlier samples.

use super::BrushKind;
use crate::raster::{Overlay, Paint};
use kurbo::{Point, Vec2};
use rand::Rng;

/// How many trailing samples are considered as whisker anchors.
pub const ANCHOR_WINDOW: usize = 256;

const WHISKER_OPACITY: f64 = 0.35;
const WHISKER_WIDTH_SCALE: f64 = 0.5;
const CRAYON_GRAINS: usize = 6;

/// Squared-distance cutoff per kind. Anchors further away never whisker.
fn threshold(kind: BrushKind) -> f64 {
    match kind {
        BrushKind::Crayon => 1000.0,
        BrushKind::Fur => 2000.0,
        BrushKind::Web => 2500.0,
        BrushKind::Sketchy | BrushKind::Longfur => 4000.0,
        _ => 0.0,
    }
}

/// Whisker segments from `current` against the trailing anchors.
///
/// An anchor qualifies when its squared distance is under the kind's
/// threshold and a uniform draw passes the kind's falloff: closer anchors
/// are more likely, except for `Web` which uses a flat 10% chance.
pub(super) fn whiskers(
    kind: BrushKind,
    anchors: &[Point],
    current: Point,
    rng: &mut impl Rng,
) -> Vec<(Point, Point)> {
    let limit = threshold(kind);
    let start = anchors.len().saturating_sub(ANCHOR_WINDOW);
    let mut out = Vec::new();

    for &anchor in &anchors[start..] {
        let delta: Vec2 = anchor - current;
        let d = delta.hypot2();
        if d < f64::EPSILON || d >= limit {
            continue;
        }
        let draw: f64 = rng.random();
        match kind {
            BrushKind::Sketchy if draw > d / limit => {
                out.push((current + delta * 0.3, anchor - delta * 0.3));
            }
            BrushKind::Fur if draw > d / limit => {
                out.push((current + delta * 0.5, current - delta * 0.5));
            }
            BrushKind::Longfur if draw > d / limit => {
                let size = -rng.random::<f64>();
                let wobble = Vec2::new(rng.random::<f64>() * 2.0, rng.random::<f64>() * 2.0);
                out.push((current + delta * size, anchor - delta * size + wobble));
            }
            BrushKind::Web if draw > 0.9 => {
                out.push((current, anchor));
            }
            BrushKind::Crayon if draw > d / limit => {
                out.push((current, current + delta * 0.2));
            }
            _ => {}
        }
    }
    out
}

/// Paint one move for a whisker brush.
pub(super) fn paint(
    kind: BrushKind,
    anchors: &[Point],
    current: Point,
    overlay: &mut Overlay,
    rng: &mut impl Rng,
) -> bool {
    let Some(&last) = anchors.last() else {
        return false;
    };
    let style = overlay.style().clone();
    let mut painted = overlay.stroke_segment(last, current);

    let whisker_width = style.width * WHISKER_WIDTH_SCALE;
    let whisker_paint = Paint::Solid(style.color.with_opacity(WHISKER_OPACITY));
    for (a, b) in whiskers(kind, anchors, current, rng) {
        painted |= overlay.stroke_segment_with(a, b, whisker_width, whisker_paint);
    }

    if kind == BrushKind::Crayon {
        // Grain: small dots scattered around the segment.
        for _ in 0..CRAYON_GRAINS {
            let along = last.lerp(current, rng.random::<f64>());
            let scatter = Vec2::new(
                rng.random_range(-1.0..=1.0) * style.width,
                rng.random_range(-1.0..=1.0) * style.width,
            );
            let radius = style.width * rng.random_range(0.1..0.3);
            painted |= overlay.fill_circle(along + scatter, radius, whisker_paint);
        }
    }
    painted
}
